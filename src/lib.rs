//! A small contest server: signed-in users vote for their favourite entries
//! of the active challenge, and an admin decides when the tally becomes
//! public.

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod admin;
pub mod api;
pub mod auth;
pub mod categories;
pub mod challenges;
pub mod config;
pub mod error;
pub mod permission;
pub mod results;
pub mod schema;
pub mod settings;
pub mod state;
pub mod template;
pub mod util_resp;
pub mod validation;
pub mod votes;
pub mod widgets;

#[cfg(test)]
mod test;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
