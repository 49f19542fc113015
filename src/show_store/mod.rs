mod error;
mod models;
mod query;
mod schema;
mod store;
mod trait_def;

pub use error::{ShowStoreError, ShowStoreResult};
pub use models::*;
pub use query::{BuiltQuery, SearchQuery, ShowField, SortDirection, MAX_LIMIT_EXCLUSIVE};
pub use schema::{SHOWS_TABLE_NAME, SHOWS_VERSIONED_SCHEMAS};
pub use store::SqliteShowStore;
pub use trait_def::ShowStore;
