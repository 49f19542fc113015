//! SQLite-backed show store.

use super::error::{ShowStoreError, ShowStoreResult};
use super::models::{NewShow, Show, ShowUpdate};
use super::query::{SearchQuery, ShowField};
use super::schema::{SHOWS_TABLE_NAME, SHOWS_VERSIONED_SCHEMAS};
use super::trait_def::ShowStore;
use crate::sqlite_persistence::{quote_ident, BASE_DB_VERSION};
use anyhow::{bail, Context, Result};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Show store over a single SQLite file.
///
/// Writes go through one dedicated connection so they are serialized; reads
/// rotate over a small pool of read-only connections.
#[derive(Clone)]
pub struct SqliteShowStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn initialize_schema(conn: &Connection) -> Result<()> {
    let latest_schema = SHOWS_VERSIONED_SCHEMAS
        .last()
        .context("No shows schema declared")?;

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating shows db schema at version {}", latest_schema.version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    let expected_version = (BASE_DB_VERSION + latest_schema.version) as i64;
    if db_version != expected_version {
        bail!(
            "Shows db is at user_version {}, expected {}",
            db_version,
            expected_version
        );
    }
    latest_schema.validate(conn)
}

fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(PoisonError::into_inner)
}

fn show_from_row(row: &rusqlite::Row) -> rusqlite::Result<Show> {
    Ok(Show {
        show_id: row.get(0)?,
        show_type: row.get(1)?,
        title: row.get(2)?,
        director: row.get(3)?,
        cast: row.get(4)?,
        country: row.get(5)?,
        date_added: row.get(6)?,
        release_year: row.get(7)?,
        rating: row.get(8)?,
        duration: row.get(9)?,
        listed_in: row.get(10)?,
        description: row.get(11)?,
    })
}

/// Values in `ShowField::ALL` order.
fn new_show_values(show: NewShow) -> Vec<Value> {
    vec![
        show.show_id.into(),
        show.show_type.into(),
        show.title.into(),
        show.director.into(),
        show.cast.into(),
        show.country.into(),
        show.date_added.into(),
        show.release_year.into(),
        show.rating.into(),
        show.duration.into(),
        show.listed_in.into(),
        show.description.into(),
    ]
}

/// Columns to overwrite. An explicit `Some(None)` writes NULL.
fn update_assignments(update: ShowUpdate) -> Vec<(ShowField, Value)> {
    let ShowUpdate {
        show_type,
        title,
        director,
        cast,
        country,
        date_added,
        release_year,
        rating,
        duration,
        listed_in,
        description,
    } = update;

    [
        (ShowField::Type, show_type.map(Value::from)),
        (ShowField::Title, title.map(Value::from)),
        (ShowField::Director, director.map(Value::from)),
        (ShowField::Cast, cast.map(Value::from)),
        (ShowField::Country, country.map(Value::from)),
        (ShowField::DateAdded, date_added.map(Value::from)),
        (ShowField::ReleaseYear, release_year.map(Value::from)),
        (ShowField::Rating, rating.map(Value::from)),
        (ShowField::Duration, duration.map(Value::from)),
        (ShowField::ListedIn, listed_in.map(Value::from)),
        (ShowField::Description, description.map(Value::from)),
    ]
    .into_iter()
    .filter_map(|(field, value)| value.map(|v| (field, v)))
    .collect()
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn table() -> String {
    quote_ident(SHOWS_TABLE_NAME)
}

impl SqliteShowStore {
    /// Open (or create) the shows database at `db_path`.
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path = db_path.as_ref();

        let write_conn = Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open shows database at {:?}", db_path))?;
        write_conn.busy_timeout(BUSY_TIMEOUT)?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;
        initialize_schema(&write_conn)?;

        let shows_count: i64 =
            write_conn.query_row(&format!("SELECT COUNT(*) FROM {}", table()), [], |r| r.get(0))?;
        info!("Opened shows db at {:?}: {} shows", db_path, shows_count);

        let mut read_pool = Vec::with_capacity(read_pool_size.max(1));
        for _ in 0..read_pool_size.max(1) {
            let read_conn = Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.busy_timeout(BUSY_TIMEOUT)?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteShowStore {
            read_pool,
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// A private in-memory database behind a single connection.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        let conn = Arc::new(Mutex::new(conn));
        Ok(SqliteShowStore {
            read_pool: vec![conn.clone()],
            write_conn: conn,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn read_conn(&self) -> &Mutex<Connection> {
        let index = self.read_index.fetch_add(1, Ordering::Relaxed) % self.read_pool.len();
        &self.read_pool[index]
    }

    fn fetch_show(conn: &Connection, show_id: i64) -> rusqlite::Result<Option<Show>> {
        conn.query_row(
            &format!(
                "SELECT {} FROM {} WHERE {} = ?1",
                ShowField::select_list(),
                table(),
                ShowField::ShowId.column()
            ),
            params![show_id],
            show_from_row,
        )
        .optional()
    }
}

impl ShowStore for SqliteShowStore {
    fn create_show(&self, show: NewShow) -> ShowStoreResult<Show> {
        show.validate()?;
        let requested_id = show.show_id;

        let conn = lock(&self.write_conn);
        let placeholders = vec!["?"; ShowField::ALL.len()].join(", ");
        let inserted = conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table(),
                ShowField::select_list(),
                placeholders
            ),
            params_from_iter(new_show_values(show)),
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_constraint_violation(&err) => match requested_id {
                Some(id) => return Err(ShowStoreError::Conflict(id)),
                None => return Err(err.into()),
            },
            Err(err) => return Err(err.into()),
        }

        let show_id = conn.last_insert_rowid();
        debug!("Created show {}", show_id);
        Self::fetch_show(&conn, show_id)?.ok_or(ShowStoreError::NotFound(show_id))
    }

    fn get_show(&self, show_id: i64) -> ShowStoreResult<Option<Show>> {
        let conn = lock(self.read_conn());
        Ok(Self::fetch_show(&conn, show_id)?)
    }

    fn update_show(&self, show_id: i64, update: ShowUpdate) -> ShowStoreResult<Show> {
        let assignments = update_assignments(update);
        let conn = lock(&self.write_conn);

        if !assignments.is_empty() {
            let set_clause = assignments
                .iter()
                .map(|(field, _)| format!("{} = ?", field.column()))
                .collect::<Vec<_>>()
                .join(", ");
            let mut values: Vec<Value> = assignments.into_iter().map(|(_, v)| v).collect();
            values.push(Value::Integer(show_id));

            let changed = conn.execute(
                &format!(
                    "UPDATE {} SET {} WHERE {} = ?",
                    table(),
                    set_clause,
                    ShowField::ShowId.column()
                ),
                params_from_iter(values),
            )?;
            if changed == 0 {
                return Err(ShowStoreError::NotFound(show_id));
            }
            debug!("Updated show {}", show_id);
        }

        Self::fetch_show(&conn, show_id)?.ok_or(ShowStoreError::NotFound(show_id))
    }

    fn delete_show(&self, show_id: i64) -> ShowStoreResult<()> {
        let conn = lock(&self.write_conn);
        let changed = conn.execute(
            &format!(
                "DELETE FROM {} WHERE {} = ?1",
                table(),
                ShowField::ShowId.column()
            ),
            params![show_id],
        )?;
        if changed == 0 {
            return Err(ShowStoreError::NotFound(show_id));
        }
        debug!("Deleted show {}", show_id);
        Ok(())
    }

    fn search_shows(&self, query: &SearchQuery) -> ShowStoreResult<Vec<Show>> {
        let built = query.build()?;
        debug!("Searching shows: {}", built.sql);

        let conn = lock(self.read_conn());
        let mut stmt = conn.prepare(&built.sql)?;
        let shows = stmt
            .query_map(params_from_iter(built.params), show_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(shows)
    }

    fn count_shows(&self) -> ShowStoreResult<usize> {
        let conn = lock(self.read_conn());
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table()), [], |r| r.get(0))?;
        Ok(count as usize)
    }

    fn count_distinct(&self, field: Option<ShowField>) -> ShowStoreResult<usize> {
        let columns = match field {
            Some(field) => field.column(),
            None => ShowField::select_list(),
        };
        let conn = lock(self.read_conn());
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM (SELECT DISTINCT {} FROM {})",
                columns,
                table()
            ),
            [],
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }
}
