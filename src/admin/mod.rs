//! The admin dashboard.

pub mod dashboard;
