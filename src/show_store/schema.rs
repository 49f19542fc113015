//! SQLite schema for the shows database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

pub const SHOWS_TABLE_NAME: &str = "shows";

/// Column order must match `ShowField::ALL`.
const SHOWS_TABLE: Table = Table {
    name: SHOWS_TABLE_NAME,
    columns: &[
        sqlite_column!("show_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("type", &SqlType::Text),
        sqlite_column!("title", &SqlType::Text),
        sqlite_column!("director", &SqlType::Text),
        sqlite_column!("cast", &SqlType::Text),
        sqlite_column!("country", &SqlType::Text),
        sqlite_column!("date_added", &SqlType::Text), // free text, source dates come in mixed formats
        sqlite_column!("release_year", &SqlType::Integer),
        sqlite_column!("rating", &SqlType::Text),
        sqlite_column!("duration", &SqlType::Text),
        sqlite_column!("listed_in", &SqlType::Text),
        sqlite_column!("description", &SqlType::Text),
    ],
    indices: &[("idx_shows_title", "title")],
};

pub const SHOWS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[SHOWS_TABLE],
}];
