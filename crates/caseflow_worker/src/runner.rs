//! Sequential task runner.
//!
//! One pass purges finished tasks from the in-progress mirror, then takes
//! every open upload task in `task_id` order and processes it start to
//! finish before touching the next. A task-level error fails that task only.

use caseflow_db::{CaseflowDb, DbError, SystemTask};
use caseflow_protocol::AppConfig;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

use crate::batch::{self, BatchSummary};
use crate::error::TaskError;
use crate::files;
use crate::handlers::{HandlerRegistry, TaskContext};
use crate::reporter::CompletionReporter;
use crate::services::{HttpCasePhaseService, HttpIncidentService, ServiceError};

/// Tally of one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
}

pub struct TaskRunner {
    db: CaseflowDb,
    config: AppConfig,
    registry: HandlerRegistry,
    reporter: CompletionReporter,
}

impl TaskRunner {
    pub fn new(db: CaseflowDb, config: AppConfig, registry: HandlerRegistry) -> Self {
        let reporter = CompletionReporter::new(db.clone());
        Self {
            db,
            config,
            registry,
            reporter,
        }
    }

    /// Runner wired to the HTTP services named in `config.endpoints`.
    pub fn from_config(db: CaseflowDb, config: AppConfig) -> Result<Self, ServiceError> {
        let incidents = Arc::new(HttpIncidentService::from_config(&config.endpoints)?);
        let phases = Arc::new(HttpCasePhaseService::from_config(&config.endpoints)?);
        let registry = HandlerRegistry::standard(&config, Arc::new(db.clone()), incidents, phases);
        Ok(Self::new(db, config, registry))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Process every open upload task once.
    ///
    /// Only database failures while reading the queue or writing status
    /// abort the pass.
    pub async fn run_once(&self) -> Result<RunSummary, DbError> {
        self.db.task_purge_finished().await?;

        let tasks = self
            .db
            .task_list_open(&self.config.tasks.upload_template_task_ids)
            .await?;
        info!(count = tasks.len(), "Open upload tasks");

        let mut summary = RunSummary::default();
        for task in &tasks {
            let seq = match parse_upload_seq(task.raw_file_upload_seq()) {
                Ok(Some(seq)) => seq,
                Ok(None) => {
                    warn!(task_id = task.task_id, "Task has no file_upload_seq, skipping");
                    summary.skipped += 1;
                    continue;
                }
                Err(err) => {
                    self.reporter.fail(task.task_id, None, &err.to_string()).await?;
                    summary.failed += 1;
                    continue;
                }
            };

            let span = info_span!("task", task_id = task.task_id, file_upload_seq = seq);
            match self.process_task(task, seq).instrument(span).await {
                Ok(batch) => {
                    self.reporter.complete(task.task_id, seq, &batch).await?;
                    summary.completed += 1;
                }
                Err(err) => {
                    error!(task_id = task.task_id, file_upload_seq = seq, error = %err, "Task failed");
                    self.reporter.fail(task.task_id, Some(seq), &err.to_string()).await?;
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn process_task(&self, task: &SystemTask, seq: i64) -> Result<BatchSummary, TaskError> {
        let entry = self
            .db
            .upload_log_find_open(seq)
            .await?
            .ok_or(TaskError::MissingLogEntry(seq))?;
        let handler = self.registry.resolve(&entry.file_type)?;

        let ctx = TaskContext {
            task_id: task.task_id,
            file_upload_seq: seq,
            created_by: task.created_by.clone(),
            contact_number: task.contact_number.clone(),
        };
        handler.check_task(&ctx)?;

        info!(
            task_id = task.task_id,
            file_upload_seq = seq,
            file_type = %handler.file_type(),
            file_name = %entry.file_name,
            "Processing upload"
        );
        self.reporter.mark_in_progress(task.task_id, seq).await?;

        let source = self.config.paths.uploaded_file_dir.join(&entry.file_name);
        let dest_dir = self.config.paths.storage_dir(handler.file_type());
        let stored = files::move_to_storage(&source, dest_dir, handler.file_type()).await?;
        self.db
            .upload_log_set_forwarded_path(seq, &stored.display().to_string())
            .await?;

        let error_path = files::error_artifact_path(&stored);
        batch::run_batch(handler.as_ref(), &ctx, &stored, &error_path).await
    }
}

/// `file_upload_seq` may be stored as a number or a numeric string.
pub fn parse_upload_seq(raw: Option<&serde_json::Value>) -> Result<Option<i64>, TaskError> {
    let Some(value) = raw else {
        return Ok(None);
    };
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| TaskError::InvalidUploadSeq(n.to_string())),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(None),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| TaskError::InvalidUploadSeq(s.clone())),
        other => Err(TaskError::InvalidUploadSeq(other.to_string())),
    }
}
