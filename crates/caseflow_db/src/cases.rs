//! Case store operations.

use crate::error::{DbError, Result};
use crate::types::*;
use crate::CaseflowDb;
use sqlx::Row;

impl CaseflowDb {
    /// First case matching ANY condition of `query`, ordered by row id.
    pub async fn case_find_one(&self, query: &CaseQuery) -> Result<Option<CaseRecord>> {
        let sql = format!(
            "SELECT * FROM case_details WHERE {} ORDER BY id ASC LIMIT 1",
            query.where_clause()
        );

        let mut q = sqlx::query(&sql);
        for condition in query.conditions() {
            q = match condition {
                CaseCondition::CaseId(id) => q.bind(*id),
                CaseCondition::AccountNo(no) => q.bind(*no),
                CaseCondition::ProductLabel(label) => q.bind(label.clone()),
            };
        }

        let row = q.fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(Some(row_to_case(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn case_get(&self, id: i64) -> Result<Option<CaseRecord>> {
        let row = sqlx::query("SELECT * FROM case_details WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_case(&row)?)),
            None => Ok(None),
        }
    }

    /// Insert a case with its product labels. Returns the row id.
    pub async fn case_insert(&self, case: &NewCase) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO case_details (
                case_id, account_no, case_current_status, monitor_months, expire_dtm
            ) VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(case.case_id)
        .bind(case.account_no)
        .bind(&case.case_current_status)
        .bind(i64::from(case.monitor_months))
        .bind(&case.expire_dtm)
        .execute(&mut *tx)
        .await?;

        for label in &case.product_labels {
            sqlx::query("INSERT OR IGNORE INTO case_ref_products (case_id, product_label) VALUES (?, ?)")
                .bind(case.case_id)
                .bind(label)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(result.last_insert_rowid())
    }

    /// Move a case to a new status with the operator's reason.
    pub async fn case_set_status(&self, id: i64, status: &str, reason: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE case_details SET
                case_current_status = ?,
                status_reason = ?,
                status_dtm = ?
            WHERE id = ?
            "#,
        )
        .bind(status)
        .bind(reason)
        .bind(Self::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        ensure_updated(result.rows_affected(), id)
    }

    /// Record an extended monitoring period.
    pub async fn case_extend_validity(
        &self,
        id: i64,
        monitor_months: u32,
        expire_dtm: &str,
        description: &str,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE case_details SET
                monitor_months = ?,
                expire_dtm = ?,
                case_status_description = ?
            WHERE id = ?
            "#,
        )
        .bind(i64::from(monitor_months))
        .bind(expire_dtm)
        .bind(description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        ensure_updated(result.rows_affected(), id)
    }
}

/// Product labels stay in `case_ref_products`; lookups match them with an
/// `EXISTS` clause and nothing downstream needs them on the record.
fn row_to_case(row: &sqlx::sqlite::SqliteRow) -> Result<CaseRecord> {
    let case_id: i64 = row.get("case_id");
    let monitor_months: i64 = row.get("monitor_months");
    let monitor_months = u32::try_from(monitor_months).map_err(|_| {
        DbError::corrupt(
            "case",
            "monitor_months",
            format!("case {} has {}", case_id, monitor_months),
        )
    })?;

    Ok(CaseRecord {
        id: row.get("id"),
        case_id,
        account_no: row.get("account_no"),
        case_current_status: row.get("case_current_status"),
        status_reason: row.get("status_reason"),
        case_status_description: row.get("case_status_description"),
        monitor_months,
        expire_dtm: row.get("expire_dtm"),
    })
}

fn ensure_updated(rows_affected: u64, id: i64) -> Result<()> {
    if rows_affected == 0 {
        return Err(DbError::not_found("Case", id));
    }
    Ok(())
}
