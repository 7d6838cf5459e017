use async_trait::async_trait;
use caseflow_db::CaseflowDb;
use caseflow_protocol::{status, FileType};
use std::sync::Arc;
use tracing::debug;

use super::{try_row, RowHandler, RowOutcome, TaskContext};
use crate::error::RowFailure;
use crate::record::Record;
use crate::store::CaseStore;
use crate::validators::{self, RowError};

/// Incident reject files: `account_no, reject_reason`.
///
/// Only incidents that have not proceeded to a case may be rejected.
pub struct IncidentRejectHandler {
    store: Arc<dyn CaseStore>,
}

impl IncidentRejectHandler {
    pub fn new(store: Arc<dyn CaseStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RowHandler for IncidentRejectHandler {
    fn file_type(&self) -> FileType {
        FileType::IncidentReject
    }

    fn completion_message(&self) -> &'static str {
        "Incident reject process completed"
    }

    async fn process_row(&self, record: &Record, _ctx: &TaskContext) -> Result<RowOutcome, RowFailure> {
        let reason = try_row!(validators::required_text(
            record.field(1),
            "reject_reason",
            "Reject reason is missing"
        ));
        let account_num = try_row!(validators::required_account(
            record.field(0),
            "Invalid or missing account number"
        ));

        let incident = try_row!(self
            .store
            .find_incident(&account_num)
            .await?
            .ok_or_else(|| RowError::new(
                "account_no",
                "No incident found for this account number"
            )));

        if incident.proceed_dtm.is_some() {
            return Ok(RowOutcome::Rejected(RowError::new(
                "incident",
                "Case is created. Cannot reject",
            )));
        }

        self.store
            .set_incident_status(incident.id, status::INCIDENT_REJECT, &CaseflowDb::now(), &reason)
            .await?;

        debug!(row = record.line, incident_id = incident.id, "Incident rejected");
        Ok(RowOutcome::Success)
    }
}
