//! Incident store operations.

use crate::error::{DbError, Result};
use crate::types::*;
use crate::CaseflowDb;
use sqlx::Row;

impl CaseflowDb {
    /// First incident raised for `account_num`.
    pub async fn incident_find_by_account(&self, account_num: &str) -> Result<Option<IncidentRecord>> {
        let row = sqlx::query("SELECT * FROM incidents WHERE account_num = ? ORDER BY id ASC LIMIT 1")
            .bind(account_num)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_incident))
    }

    pub async fn incident_get(&self, id: i64) -> Result<Option<IncidentRecord>> {
        let row = sqlx::query("SELECT * FROM incidents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_incident))
    }

    pub async fn incident_insert(&self, incident: &NewIncident) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO incidents (account_num, incident_status, proceed_dtm) VALUES (?, ?, ?)",
        )
        .bind(&incident.account_num)
        .bind(&incident.incident_status)
        .bind(&incident.proceed_dtm)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Set an incident's status, status timestamp and description.
    pub async fn incident_set_status(
        &self,
        id: i64,
        status: &str,
        status_dtm: &str,
        description: &str,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE incidents SET
                incident_status = ?,
                incident_status_dtm = ?,
                status_description = ?
            WHERE id = ?
            "#,
        )
        .bind(status)
        .bind(status_dtm)
        .bind(description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Incident", id));
        }
        Ok(())
    }
}

fn row_to_incident(row: &sqlx::sqlite::SqliteRow) -> IncidentRecord {
    IncidentRecord {
        id: row.get("id"),
        account_num: row.get("account_num"),
        incident_status: row.get("incident_status"),
        incident_status_dtm: row.get("incident_status_dtm"),
        status_description: row.get("status_description"),
        proceed_dtm: row.get("proceed_dtm"),
    }
}
