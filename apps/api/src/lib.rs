//! Career assistant backend.
//!
//! The `api` binary serves [`routes::build_router`] over the Postgres document
//! store and the Firebase identity provider. Embedding clients use
//! [`identity::session::SessionManager`] to observe sign-in state.

pub mod ai;
pub mod config;
pub mod data;
pub mod db;
pub mod errors;
pub mod identity;
pub mod llm_client;
pub mod models;
pub mod routes;
pub mod schema;
pub mod state;
pub mod store;

/// Log target prefix of this library, for the default `EnvFilter`.
pub const LOG_TARGET: &str = env!("CARGO_CRATE_NAME");
