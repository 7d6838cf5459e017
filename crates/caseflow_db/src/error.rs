//! Errors raised by the Caseflow store.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Cannot prepare database location: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database not found: {}", .0.display())]
    MissingDatabase(PathBuf),

    /// An update addressed a row that does not exist.
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: i64 },

    /// A stored column holds a value that does not map onto its domain type.
    #[error("Stored {entity} {column} is unreadable: {detail}")]
    CorruptValue {
        entity: &'static str,
        column: &'static str,
        detail: String,
    },

    #[error("Task parameters are not valid JSON: {0}")]
    Parameters(#[from] serde_json::Error),
}

impl DbError {
    pub fn not_found(entity: &'static str, key: i64) -> Self {
        Self::NotFound { entity, key }
    }

    pub fn corrupt(entity: &'static str, column: &'static str, detail: impl Into<String>) -> Self {
        Self::CorruptValue {
            entity,
            column,
            detail: detail.into(),
        }
    }
}
