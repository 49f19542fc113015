use thiserror::Error;

/// Errors surfaced by show store operations.
#[derive(Debug, Error)]
pub enum ShowStoreError {
    #[error("{0}")]
    InvalidParameter(String),

    #[error("Show already exists with given show_id {0}.")]
    Conflict(i64),

    #[error("Show {0} not found.")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl ShowStoreError {
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        ShowStoreError::InvalidParameter(message.into())
    }
}

pub type ShowStoreResult<T> = Result<T, ShowStoreError>;
