//! Unified database layer for Caseflow
//!
//! This crate provides a single source of truth for all persistence: the task
//! queue and its in-progress mirror, the file upload log, the case store and
//! the incident store.
//!
//! # Usage
//!
//! ```rust,ignore
//! use caseflow_db::{CaseflowDb, Result};
//!
//! let db = CaseflowDb::open("~/.caseflow/caseflow.sqlite3").await?;
//!
//! // Task queue
//! let tasks = db.task_list_open(&[1]).await?;
//!
//! // Case store
//! let case = db.case_find_one(&query).await?;
//! ```

mod error;
mod schema;
mod types;

// Method implementations organized by domain
mod cases;
mod incidents;
mod tasks;

pub use error::{DbError, Result};
pub use types::*;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

/// Unified database for all Caseflow operations.
///
/// This is the ONLY way to access the database. Do not use raw sqlx elsewhere.
#[derive(Clone)]
pub struct CaseflowDb {
    pool: SqlitePool,
}

impl CaseflowDb {
    /// Open or create a database at the given path.
    ///
    /// Creates all tables if they don't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let url = format!("sqlite:{}?mode=rwc", path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let db = Self { pool };
        db.ensure_schema().await?;

        info!(path = %path.display(), "Database opened");

        Ok(db)
    }

    /// Open an existing database (fails if not exists).
    pub async fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DbError::MissingDatabase(path.to_path_buf()));
        }

        let url = format!("sqlite:{}?mode=rw", path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        Ok(Self { pool })
    }

    /// Get the underlying connection pool (escape hatch for complex queries).
    ///
    /// Prefer using the typed methods instead.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

// Timestamp utilities
impl CaseflowDb {
    /// Current local time in the storage format.
    pub fn now() -> String {
        format_timestamp(&chrono::Local::now().naive_local())
    }
}
