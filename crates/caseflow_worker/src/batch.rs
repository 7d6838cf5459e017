//! Batch aggregator: drives a row handler over one uploaded file.
//!
//! Counts every non-blank row exactly once, writes each rejected row to the
//! error artifact with a `|reason` column appended, and produces the summary
//! handed to the completion reporter. Row failures never abort the batch;
//! only file-level errors do.

use caseflow_db::RecordCounts;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::TaskError;
use crate::handlers::{RowHandler, RowOutcome, TaskContext};
use crate::record::{self, Record, ROW_FORMAT_MESSAGE};
use crate::validators::RowError;

/// Result of one pass over a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub counts: RecordCounts,
    /// Present only when at least one row was rejected.
    pub error_file: Option<PathBuf>,
    pub description: String,
}

/// Error artifact, created on the first rejected row.
struct ErrorArtifact<'a> {
    path: &'a Path,
    writer: Option<csv::Writer<std::fs::File>>,
}

impl<'a> ErrorArtifact<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, writer: None }
    }

    fn write(&mut self, raw: &csv::StringRecord, reason: &str) -> Result<(), TaskError> {
        if self.writer.is_none() {
            let writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_path(self.path)
                .map_err(|e| TaskError::csv(self.path, e))?;
            self.writer = Some(writer);
        }
        if let Some(writer) = self.writer.as_mut() {
            let mut row: Vec<String> = raw.iter().map(str::to_string).collect();
            row.push(format!("|{}", reason));
            writer
                .write_record(&row)
                .map_err(|e| TaskError::csv(self.path, e))?;
        }
        Ok(())
    }

    fn finish(self) -> Result<Option<PathBuf>, TaskError> {
        match self.writer {
            Some(mut writer) => {
                writer.flush().map_err(|e| TaskError::io(self.path, e))?;
                Ok(Some(self.path.to_path_buf()))
            }
            None => Ok(None),
        }
    }
}

/// Process every row of `source` with `handler`.
pub async fn run_batch(
    handler: &dyn RowHandler,
    ctx: &TaskContext,
    source: &Path,
    error_path: &Path,
) -> Result<BatchSummary, TaskError> {
    let content = tokio::fs::read_to_string(source).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TaskError::FileNotFound(source.to_path_buf())
        } else {
            TaskError::io(source, e)
        }
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(record::strip_bom(&content).as_bytes());

    let arity = handler.arity();
    let mut counts = RecordCounts::default();
    let mut artifact = ErrorArtifact::new(error_path);

    for (index, result) in reader.records().enumerate() {
        let raw = result.map_err(|e| TaskError::csv(source, e))?;
        let line = raw
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 1);

        if record::is_blank(&raw) {
            debug!(row = line, "Skipping blank row");
            continue;
        }
        counts.total += 1;

        let outcome = match Record::parse(line, &raw, arity) {
            Err(_) => RowOutcome::Rejected(RowError::new("row", ROW_FORMAT_MESSAGE)),
            Ok(record) => match handler.process_row(&record, ctx).await {
                Ok(outcome) => outcome,
                Err(failure) => {
                    error!(task_id = ctx.task_id, row = line, error = %failure, "Row failed");
                    RowOutcome::Rejected(RowError::new("row", failure.to_string()))
                }
            },
        };

        match outcome {
            RowOutcome::Success => {
                counts.success += 1;
                debug!(task_id = ctx.task_id, row = line, "Row processed");
            }
            RowOutcome::Rejected(err) => {
                counts.error += 1;
                warn!(task_id = ctx.task_id, row = line, field = err.field, reason = %err.message, "Row rejected");
                artifact.write(&raw, &err.message)?;
            }
        }
    }

    let error_file = artifact.finish()?;
    let description = if counts.error == 0 {
        handler.completion_message().to_string()
    } else {
        format!("Completed with {} errors", counts.error)
    };

    info!(
        task_id = ctx.task_id,
        file_upload_seq = ctx.file_upload_seq,
        file_type = %handler.file_type(),
        total = counts.total,
        success = counts.success,
        errors = counts.error,
        "Batch finished"
    );

    Ok(BatchSummary {
        counts,
        error_file,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RowFailure;
    use async_trait::async_trait;
    use caseflow_db::DbError;
    use caseflow_protocol::FileType;
    use tempfile::TempDir;

    /// Accepts rows whose first field is "ok", fails the store on "boom".
    struct ScriptedHandler;

    #[async_trait]
    impl RowHandler for ScriptedHandler {
        fn file_type(&self) -> FileType {
            FileType::IncidentReject
        }

        fn completion_message(&self) -> &'static str {
            "all good"
        }

        async fn process_row(
            &self,
            record: &Record,
            _ctx: &TaskContext,
        ) -> Result<RowOutcome, RowFailure> {
            match record.field(0) {
                "ok" => Ok(RowOutcome::Success),
                "boom" => Err(DbError::not_found("Case", 99).into()),
                _ => Ok(RowOutcome::Rejected(RowError::new("first", "not ok"))),
            }
        }
    }

    #[tokio::test]
    async fn test_counts_and_error_artifact() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("in.csv");
        let error_path = tmp.path().join("in.err.csv");
        std::fs::write(&source, "\u{feff}ok,a\nbad,b\n\nshort\nboom,c\nok,d\n").unwrap();

        let summary = run_batch(&ScriptedHandler, &TaskContext::default(), &source, &error_path)
            .await
            .unwrap();

        assert_eq!(summary.counts, RecordCounts { total: 5, success: 2, error: 3 });
        assert_eq!(summary.description, "Completed with 3 errors");
        assert_eq!(summary.error_file.as_deref(), Some(error_path.as_path()));

        let artifact = std::fs::read_to_string(&error_path).unwrap();
        let lines: Vec<&str> = artifact.lines().collect();
        assert_eq!(
            lines,
            vec![
                "bad,b,|not ok",
                "short,|Row Format",
                "boom,c,|Case 99 not found",
            ]
        );
    }

    #[tokio::test]
    async fn test_whitespace_rows_are_counted_as_row_format() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("in.csv");
        let error_path = tmp.path().join("in.err.csv");
        std::fs::write(&source, "ok,a\n   \n\"\"\n").unwrap();

        let summary = run_batch(&ScriptedHandler, &TaskContext::default(), &source, &error_path)
            .await
            .unwrap();

        assert_eq!(summary.counts, RecordCounts { total: 3, success: 1, error: 2 });
        let artifact = std::fs::read_to_string(&error_path).unwrap();
        let lines: Vec<&str> = artifact.lines().collect();
        assert_eq!(lines, vec!["   ,|Row Format", ",|Row Format"]);
    }

    #[tokio::test]
    async fn test_clean_file_has_no_artifact() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("in.csv");
        let error_path = tmp.path().join("in.err.csv");
        std::fs::write(&source, "ok,1\nok,2\n").unwrap();

        let summary = run_batch(&ScriptedHandler, &TaskContext::default(), &source, &error_path)
            .await
            .unwrap();

        assert_eq!(summary.counts, RecordCounts { total: 2, success: 2, error: 0 });
        assert_eq!(summary.description, "all good");
        assert!(summary.error_file.is_none());
        assert!(!error_path.exists());
    }

    #[tokio::test]
    async fn test_missing_source_is_file_level_error() {
        let tmp = TempDir::new().unwrap();
        let err = run_batch(
            &ScriptedHandler,
            &TaskContext::default(),
            &tmp.path().join("missing.csv"),
            &tmp.path().join("missing.err.csv"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TaskError::FileNotFound(_)));
    }
}
