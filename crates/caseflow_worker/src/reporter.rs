//! Completion reporter: the only writer of task and upload log status.

use caseflow_db::{CaseflowDb, DbError, TaskOutcome};
use caseflow_protocol::TaskStatus;
use tracing::{info, warn};

use crate::batch::BatchSummary;

/// Updates the task, its in-progress mirror and the upload log entry together.
#[derive(Clone)]
pub struct CompletionReporter {
    db: CaseflowDb,
}

impl CompletionReporter {
    pub fn new(db: CaseflowDb) -> Self {
        Self { db }
    }

    pub async fn mark_in_progress(&self, task_id: i64, file_upload_seq: i64) -> Result<(), DbError> {
        self.db
            .task_apply_outcome(task_id, Some(file_upload_seq), &TaskOutcome::in_progress())
            .await
    }

    pub async fn complete(
        &self,
        task_id: i64,
        file_upload_seq: i64,
        summary: &BatchSummary,
    ) -> Result<(), DbError> {
        let outcome = TaskOutcome {
            status: TaskStatus::Completed,
            description: Some(summary.description.clone()),
            counts: Some(summary.counts),
            error_file_path: summary
                .error_file
                .as_ref()
                .map(|p| p.display().to_string()),
        };
        self.db
            .task_apply_outcome(task_id, Some(file_upload_seq), &outcome)
            .await?;

        info!(task_id, file_upload_seq, description = %summary.description, "Task completed");
        Ok(())
    }

    /// Terminal failure. `file_upload_seq` is `None` when the task never
    /// resolved to a log entry.
    pub async fn fail(
        &self,
        task_id: i64,
        file_upload_seq: Option<i64>,
        description: &str,
    ) -> Result<(), DbError> {
        let outcome = TaskOutcome {
            status: TaskStatus::Failed,
            description: Some(description.to_string()),
            counts: None,
            error_file_path: None,
        };
        self.db
            .task_apply_outcome(task_id, file_upload_seq, &outcome)
            .await?;

        warn!(task_id, ?file_upload_seq, description, "Task failed");
        Ok(())
    }
}
