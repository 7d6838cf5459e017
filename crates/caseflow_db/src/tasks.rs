//! Task queue and file upload log operations.

use crate::error::{DbError, Result};
use crate::types::*;
use crate::CaseflowDb;
use caseflow_protocol::TaskStatus;
use sqlx::Row;
use tracing::debug;

impl CaseflowDb {
    // ========================================================================
    // Task Queue Operations
    // ========================================================================

    /// Queue a new task. The task is written to both the task table and the
    /// in-progress mirror with status `Open`.
    pub async fn task_insert(&self, task: &NewTask) -> Result<()> {
        let parameters = serde_json::to_string(&task.parameters)?;
        let now = Self::now();
        let mut tx = self.pool.begin().await?;

        for table in ["system_tasks", "system_tasks_inprogress"] {
            let sql = format!(
                r#"
                INSERT INTO {table} (
                    task_id, template_task_id, task_status, parameters,
                    created_by, contact_number, created_dtm, last_updated
                ) VALUES (?, ?, 'Open', ?, ?, ?, ?, ?)
                "#
            );
            sqlx::query(&sql)
                .bind(task.task_id)
                .bind(task.template_task_id)
                .bind(&parameters)
                .bind(&task.created_by)
                .bind(&task.contact_number)
                .bind(&now)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Remove finished tasks from the in-progress mirror. Returns rows removed.
    pub async fn task_purge_finished(&self) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM system_tasks_inprogress WHERE task_status IN ('Completed', 'Failed')",
        )
        .execute(&self.pool)
        .await?;

        let purged = result.rows_affected();
        if purged > 0 {
            debug!(purged, "Purged finished tasks from in-progress mirror");
        }
        Ok(purged)
    }

    /// Open tasks in the in-progress mirror for the given templates, oldest first.
    pub async fn task_list_open(&self, template_task_ids: &[i64]) -> Result<Vec<SystemTask>> {
        if template_task_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; template_task_ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT * FROM system_tasks_inprogress
            WHERE task_status = 'Open' AND template_task_id IN ({placeholders})
            ORDER BY task_id ASC
            "#
        );

        let mut query = sqlx::query(&sql);
        for id in template_task_ids {
            query = query.bind(*id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(|row| self.row_to_task(row)).collect()
    }

    /// Get a task from the task table.
    pub async fn task_get(&self, task_id: i64) -> Result<Option<SystemTask>> {
        self.task_get_from("system_tasks", task_id).await
    }

    /// Get a task from the in-progress mirror.
    pub async fn task_get_inprogress(&self, task_id: i64) -> Result<Option<SystemTask>> {
        self.task_get_from("system_tasks_inprogress", task_id).await
    }

    async fn task_get_from(&self, table: &str, task_id: i64) -> Result<Option<SystemTask>> {
        let sql = format!("SELECT * FROM {table} WHERE task_id = ?");
        let row = sqlx::query(&sql)
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.row_to_task(&row)?)),
            None => Ok(None),
        }
    }

    /// Write a status change to the task, its mirror and (when known) the
    /// upload log entry in one transaction.
    pub async fn task_apply_outcome(
        &self,
        task_id: i64,
        file_upload_seq: Option<i64>,
        outcome: &TaskOutcome,
    ) -> Result<()> {
        let now = Self::now();
        let counts = outcome.counts.map(|c| {
            (
                to_count(c.total),
                to_count(c.success),
                to_count(c.error),
            )
        });
        let (total, success, error) = match counts {
            Some((t, s, e)) => (Some(t), Some(s), Some(e)),
            None => (None, None, None),
        };

        let mut tx = self.pool.begin().await?;

        for table in ["system_tasks", "system_tasks_inprogress"] {
            let sql = format!(
                r#"
                UPDATE {table} SET
                    task_status = ?,
                    task_status_description = ?,
                    total_record_count = COALESCE(?, total_record_count),
                    success_count = COALESCE(?, success_count),
                    error_count = COALESCE(?, error_count),
                    last_updated = ?
                WHERE task_id = ?
                "#
            );
            sqlx::query(&sql)
                .bind(outcome.status.as_str())
                .bind(&outcome.description)
                .bind(total)
                .bind(success)
                .bind(error)
                .bind(&now)
                .bind(task_id)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(seq) = file_upload_seq {
            sqlx::query(
                r#"
                UPDATE file_upload_log SET
                    log_status = ?,
                    log_status_description = ?,
                    total_record_count = COALESCE(?, total_record_count),
                    success_count = COALESCE(?, success_count),
                    error_count = COALESCE(?, error_count),
                    error_file_path = COALESCE(?, error_file_path),
                    last_updated = ?
                WHERE file_upload_seq = ?
                "#,
            )
            .bind(outcome.status.as_str())
            .bind(&outcome.description)
            .bind(total)
            .bind(success)
            .bind(error)
            .bind(&outcome.error_file_path)
            .bind(&now)
            .bind(seq)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(task_id, ?file_upload_seq, status = %outcome.status, "Task status written");
        Ok(())
    }

    /// Task counts by status, read from the in-progress mirror.
    pub async fn task_counts_by_status(&self) -> Result<StatusCounts> {
        self.counts_by_status("system_tasks_inprogress", "task_status")
            .await
    }

    // ========================================================================
    // File Upload Log Operations
    // ========================================================================

    /// Register an uploaded file with status `Open`.
    pub async fn upload_log_insert(&self, entry: &NewFileUploadLog) -> Result<()> {
        let now = Self::now();
        sqlx::query(
            r#"
            INSERT INTO file_upload_log (
                file_upload_seq, file_name, file_type, log_status, uploaded_dtm, last_updated
            ) VALUES (?, ?, ?, 'Open', ?, ?)
            "#,
        )
        .bind(entry.file_upload_seq)
        .bind(&entry.file_name)
        .bind(&entry.file_type)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The log entry for `file_upload_seq`, only while it is still `Open`.
    pub async fn upload_log_find_open(&self, file_upload_seq: i64) -> Result<Option<FileUploadLogEntry>> {
        let row = sqlx::query(
            "SELECT * FROM file_upload_log WHERE file_upload_seq = ? AND log_status = 'Open'",
        )
        .bind(file_upload_seq)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.row_to_upload_log(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn upload_log_get(&self, file_upload_seq: i64) -> Result<Option<FileUploadLogEntry>> {
        let row = sqlx::query("SELECT * FROM file_upload_log WHERE file_upload_seq = ?")
            .bind(file_upload_seq)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.row_to_upload_log(&row)?)),
            None => Ok(None),
        }
    }

    /// Record where the uploaded file was moved to.
    pub async fn upload_log_set_forwarded_path(&self, file_upload_seq: i64, path: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE file_upload_log SET forwarded_file_path = ?, last_updated = ? WHERE file_upload_seq = ?",
        )
        .bind(path)
        .bind(Self::now())
        .bind(file_upload_seq)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("File upload log entry", file_upload_seq));
        }
        Ok(())
    }

    pub async fn upload_log_counts_by_status(&self) -> Result<StatusCounts> {
        self.counts_by_status("file_upload_log", "log_status").await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn counts_by_status(&self, table: &str, column: &str) -> Result<StatusCounts> {
        let sql = format!(
            "SELECT {column} AS status, COUNT(*) AS cnt FROM {table} GROUP BY {column} ORDER BY {column}"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let entries = rows
            .iter()
            .map(|row| {
                let status: String = row.get("status");
                let count: i64 = row.get("cnt");
                (status, count.max(0) as u64)
            })
            .collect();

        Ok(StatusCounts { entries })
    }

    fn row_to_task(&self, row: &sqlx::sqlite::SqliteRow) -> Result<SystemTask> {
        let status_str: String = row.get("task_status");
        let task_status = status_str
            .parse::<TaskStatus>()
            .map_err(|e| DbError::corrupt("task", "task_status", e))?;
        let parameters_raw: String = row.get("parameters");
        let parameters = serde_json::from_str(&parameters_raw)?;

        Ok(SystemTask {
            task_id: row.get("task_id"),
            template_task_id: row.get("template_task_id"),
            task_status,
            task_status_description: row.get("task_status_description"),
            parameters,
            created_by: row.get("created_by"),
            contact_number: row.get("contact_number"),
        })
    }

    fn row_to_upload_log(&self, row: &sqlx::sqlite::SqliteRow) -> Result<FileUploadLogEntry> {
        let status_str: String = row.get("log_status");
        let log_status = status_str
            .parse::<TaskStatus>()
            .map_err(|e| DbError::corrupt("upload log", "log_status", e))?;

        Ok(FileUploadLogEntry {
            file_upload_seq: row.get("file_upload_seq"),
            file_name: row.get("file_name"),
            file_type: row.get("file_type"),
            log_status,
            log_status_description: row.get("log_status_description"),
            forwarded_file_path: row.get("forwarded_file_path"),
            error_file_path: row.get("error_file_path"),
            total_record_count: row.get("total_record_count"),
            success_count: row.get("success_count"),
            error_count: row.get("error_count"),
        })
    }
}

fn to_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
