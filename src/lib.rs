//! Show Catalog Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod auth;
pub mod config;
pub mod server;
pub mod show_store;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use show_store::{ShowStore, SqliteShowStore};
