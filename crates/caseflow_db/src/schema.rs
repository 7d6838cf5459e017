//! Database schema creation for all Caseflow tables.
//!
//! All CREATE TABLE statements live here - single source of truth.

use crate::error::Result;
use crate::CaseflowDb;
use tracing::info;

impl CaseflowDb {
    /// Ensure all tables exist.
    pub(crate) async fn ensure_schema(&self) -> Result<()> {
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&self.pool)
            .await?;
        sqlx::query("PRAGMA synchronous=NORMAL")
            .execute(&self.pool)
            .await?;
        sqlx::query("PRAGMA foreign_keys=ON")
            .execute(&self.pool)
            .await?;

        self.create_task_tables().await?;
        self.create_case_tables().await?;
        self.create_incident_tables().await?;

        info!("Database schema verified");
        Ok(())
    }

    /// Task queue, its in-progress mirror and the upload log.
    async fn create_task_tables(&self) -> Result<()> {
        for table in ["system_tasks", "system_tasks_inprogress"] {
            let sql = format!(
                r#"CREATE TABLE IF NOT EXISTS {table} (
                    task_id INTEGER PRIMARY KEY,
                    template_task_id INTEGER NOT NULL,
                    task_status TEXT NOT NULL DEFAULT 'Open',
                    task_status_description TEXT,
                    parameters TEXT NOT NULL DEFAULT '{{}}',
                    created_by TEXT,
                    contact_number TEXT,
                    total_record_count INTEGER,
                    success_count INTEGER,
                    error_count INTEGER,
                    created_dtm TEXT NOT NULL,
                    last_updated TEXT NOT NULL
                )"#
            );
            sqlx::query(&sql).execute(&self.pool).await?;
        }

        sqlx::query(
            r#"CREATE INDEX IF NOT EXISTS idx_tasks_inprogress_status
               ON system_tasks_inprogress(task_status, template_task_id)"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS file_upload_log (
                file_upload_seq INTEGER PRIMARY KEY,
                file_name TEXT NOT NULL,
                file_type TEXT NOT NULL,
                log_status TEXT NOT NULL DEFAULT 'Open',
                log_status_description TEXT,
                forwarded_file_path TEXT,
                error_file_path TEXT,
                total_record_count INTEGER,
                success_count INTEGER,
                error_count INTEGER,
                uploaded_dtm TEXT NOT NULL,
                last_updated TEXT NOT NULL
            )"#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Case store: cases and their product labels (telephone numbers).
    async fn create_case_tables(&self) -> Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS case_details (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                case_id INTEGER NOT NULL UNIQUE,
                account_no INTEGER,
                case_current_status TEXT,
                status_reason TEXT,
                case_status_description TEXT,
                status_dtm TEXT,
                monitor_months INTEGER NOT NULL DEFAULT 0,
                expire_dtm TEXT
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS case_ref_products (
                case_id INTEGER NOT NULL REFERENCES case_details(case_id),
                product_label TEXT NOT NULL,
                PRIMARY KEY (case_id, product_label)
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_case_details_account ON case_details(account_no)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_case_products_label ON case_ref_products(product_label)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create_incident_tables(&self) -> Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS incidents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_num TEXT NOT NULL,
                incident_status TEXT,
                incident_status_dtm TEXT,
                status_description TEXT,
                proceed_dtm TEXT
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_incidents_account ON incidents(account_num)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
