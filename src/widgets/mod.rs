//! This module contains user interface components which are commonly reused
//! between different parts of the user interface.

pub mod actions;
pub mod alert;
pub mod non_public;
pub mod podium;
