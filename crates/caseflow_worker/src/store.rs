//! Case and incident store interface used by the row handlers.

use async_trait::async_trait;
use caseflow_db::{CaseQuery, CaseRecord, CaseflowDb, DbError, IncidentRecord};

/// Reads and single-record updates the handlers need. Updates are not
/// transactional across rows.
#[async_trait]
pub trait CaseStore: Send + Sync {
    async fn find_case(&self, query: &CaseQuery) -> Result<Option<CaseRecord>, DbError>;

    async fn set_case_status(&self, id: i64, status: &str, reason: &str) -> Result<(), DbError>;

    async fn extend_case_validity(
        &self,
        id: i64,
        monitor_months: u32,
        expire_dtm: &str,
        description: &str,
    ) -> Result<(), DbError>;

    async fn find_incident(&self, account_num: &str) -> Result<Option<IncidentRecord>, DbError>;

    async fn set_incident_status(
        &self,
        id: i64,
        status: &str,
        status_dtm: &str,
        description: &str,
    ) -> Result<(), DbError>;
}

#[async_trait]
impl CaseStore for CaseflowDb {
    async fn find_case(&self, query: &CaseQuery) -> Result<Option<CaseRecord>, DbError> {
        self.case_find_one(query).await
    }

    async fn set_case_status(&self, id: i64, status: &str, reason: &str) -> Result<(), DbError> {
        self.case_set_status(id, status, reason).await
    }

    async fn extend_case_validity(
        &self,
        id: i64,
        monitor_months: u32,
        expire_dtm: &str,
        description: &str,
    ) -> Result<(), DbError> {
        self.case_extend_validity(id, monitor_months, expire_dtm, description)
            .await
    }

    async fn find_incident(&self, account_num: &str) -> Result<Option<IncidentRecord>, DbError> {
        self.incident_find_by_account(account_num).await
    }

    async fn set_incident_status(
        &self,
        id: i64,
        status: &str,
        status_dtm: &str,
        description: &str,
    ) -> Result<(), DbError> {
        self.incident_set_status(id, status, status_dtm, description)
            .await
    }
}
