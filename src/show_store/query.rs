//! Search query construction for the shows table.
//!
//! A [`SearchQuery`] is turned into a single `SELECT` by walking the static
//! field registry in [`ShowField::ALL`]: every non-empty filter value becomes
//! a case-sensitive substring clause, the optional order column is checked
//! against the same registry, and pagination is appended last. User values
//! only ever travel as bound parameters.

use super::error::{ShowStoreError, ShowStoreResult};
use super::models::ShowFilter;
use super::schema::SHOWS_TABLE_NAME;
use crate::sqlite_persistence::quote_ident;
use rusqlite::types::Value;
use std::fmt;
use std::str::FromStr;

/// Exclusive upper bound for `limit`.
pub const MAX_LIMIT_EXCLUSIVE: i64 = 1000;

/// Every column of the shows table, in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShowField {
    ShowId,
    Type,
    Title,
    Director,
    Cast,
    Country,
    DateAdded,
    ReleaseYear,
    Rating,
    Duration,
    ListedIn,
    Description,
}

impl ShowField {
    pub const ALL: [ShowField; 12] = [
        ShowField::ShowId,
        ShowField::Type,
        ShowField::Title,
        ShowField::Director,
        ShowField::Cast,
        ShowField::Country,
        ShowField::DateAdded,
        ShowField::ReleaseYear,
        ShowField::Rating,
        ShowField::Duration,
        ShowField::ListedIn,
        ShowField::Description,
    ];

    /// Column name, also the name used on the wire.
    pub fn name(self) -> &'static str {
        match self {
            ShowField::ShowId => "show_id",
            ShowField::Type => "type",
            ShowField::Title => "title",
            ShowField::Director => "director",
            ShowField::Cast => "cast",
            ShowField::Country => "country",
            ShowField::DateAdded => "date_added",
            ShowField::ReleaseYear => "release_year",
            ShowField::Rating => "rating",
            ShowField::Duration => "duration",
            ShowField::ListedIn => "listed_in",
            ShowField::Description => "description",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, ShowField::ShowId | ShowField::ReleaseYear)
    }

    pub fn column(self) -> String {
        quote_ident(self.name())
    }

    /// Comma separated list of all columns, in declaration order.
    pub fn select_list() -> String {
        ShowField::ALL
            .iter()
            .map(|f| f.column())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ShowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShowField {
    type Err = ShowStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShowField::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| {
                ShowStoreError::invalid_parameter(format!("Unknown orderBy field '{}'", s))
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ShowStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Ascending),
            "desc" => Ok(SortDirection::Descending),
            _ => Err(ShowStoreError::invalid_parameter(format!(
                "Unknown sort value '{}', expected 'asc' or 'desc'",
                s
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SearchQuery {
    pub filter: ShowFilter,
    pub order_by: Option<ShowField>,
    pub sort: Option<SortDirection>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// A ready to run statement with its positional parameters.
#[derive(Debug)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SearchQuery {
    pub fn validate(&self) -> ShowStoreResult<()> {
        if self.sort.is_some() && self.order_by.is_none() {
            return Err(ShowStoreError::invalid_parameter(
                "Cannot use the sort parameter without the orderBy parameter.",
            ));
        }
        if let Some(skip) = self.skip {
            if skip < 0 {
                return Err(ShowStoreError::invalid_parameter(format!(
                    "skip must be greater than or equal to 0, got {}",
                    skip
                )));
            }
        }
        if let Some(limit) = self.limit {
            if limit <= 0 || limit >= MAX_LIMIT_EXCLUSIVE {
                return Err(ShowStoreError::invalid_parameter(format!(
                    "limit must be greater than 0 and less than {}, got {}",
                    MAX_LIMIT_EXCLUSIVE, limit
                )));
            }
        }
        Ok(())
    }

    pub fn build(&self) -> ShowStoreResult<BuiltQuery> {
        self.validate()?;

        let mut sql = format!(
            "SELECT {} FROM {}",
            ShowField::select_list(),
            quote_ident(SHOWS_TABLE_NAME)
        );
        let mut params = Vec::new();

        let mut clauses = Vec::new();
        for field in ShowField::ALL {
            if let Some(value) = self.filter.value_of(field) {
                // instr() is case-sensitive, unlike LIKE, and needs no escaping.
                clauses.push(format!("instr(CAST({} AS TEXT), ?) > 0", field.column()));
                params.push(Value::Text(value.to_string()));
            }
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let id_column = ShowField::ShowId.column();
        match self.order_by {
            Some(ShowField::ShowId) => {
                let direction = self.sort.unwrap_or_default();
                sql.push_str(&format!(" ORDER BY {} {}", id_column, direction.as_sql()));
            }
            Some(field) => {
                let direction = self.sort.unwrap_or_default();
                sql.push_str(&format!(
                    " ORDER BY {} {}, {} ASC",
                    field.column(),
                    direction.as_sql(),
                    id_column
                ));
            }
            None => sql.push_str(&format!(" ORDER BY {} ASC", id_column)),
        }

        if self.limit.is_some() || self.skip.is_some() {
            // SQLite only accepts OFFSET after LIMIT, -1 means unbounded.
            sql.push_str(" LIMIT ? OFFSET ?");
            params.push(Value::Integer(self.limit.unwrap_or(-1)));
            params.push(Value::Integer(self.skip.unwrap_or(0)));
        }

        Ok(BuiltQuery { sql, params })
    }
}
