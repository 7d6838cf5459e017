//! Error types for task and row processing.

use caseflow_db::DbError;
use std::path::PathBuf;
use thiserror::Error;

use crate::services::ServiceError;

/// File-level or task-level failure. Aborts the task, which is then reported
/// as `Failed` with this error's text as the description.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Source file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid file_upload_seq: {0}")]
    InvalidUploadSeq(String),

    #[error("No open file upload log entry for file_upload_seq {0}")]
    MissingLogEntry(i64),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Task {task_id} is missing {field}")]
    MissingTaskContext { task_id: i64, field: &'static str },

    #[error(transparent)]
    Db(#[from] DbError),
}

impl TaskError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Infrastructure failure raised while a single row was being processed.
///
/// Never escapes the row boundary: the batch aggregator records it as a
/// rejected row and moves on.
#[derive(Debug, Error)]
pub enum RowFailure {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}
