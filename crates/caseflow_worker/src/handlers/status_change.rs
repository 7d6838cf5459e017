use async_trait::async_trait;
use caseflow_protocol::{status, FileType};
use std::sync::Arc;
use tracing::debug;

use super::{try_row, RowHandler, RowOutcome, TaskContext};
use crate::error::RowFailure;
use crate::query::build_case_query;
use crate::record::Record;
use crate::store::CaseStore;
use crate::validators::{self, RowError, Validation};

const NO_IDENTIFIER: &str =
    "At least one of Valid Case ID, Account Number, or Telephone Number must be present";
const NO_MATCH: &str = "No matching case found";

/// Discard and hold files: `case_id, account_no, telephone_no, reason`.
/// A matched case moves to a fixed status carrying the row's reason.
pub struct StatusChangeHandler {
    store: Arc<dyn CaseStore>,
    file_type: FileType,
    target_status: &'static str,
    missing_reason: &'static str,
    completion_message: &'static str,
}

struct ValidRow {
    case_id: Option<i64>,
    account_no: Option<i64>,
    telephone_no: Option<String>,
    reason: String,
}

impl StatusChangeHandler {
    pub fn discard(store: Arc<dyn CaseStore>) -> Self {
        Self {
            store,
            file_type: FileType::CaseDiscard,
            target_status: status::CASE_DISCARD,
            missing_reason: "Discard Reason is missing",
            completion_message: "Case discard process completed",
        }
    }

    pub fn hold(store: Arc<dyn CaseStore>) -> Self {
        Self {
            store,
            file_type: FileType::CaseHold,
            target_status: status::CASE_HOLD,
            missing_reason: "Hold Reason is missing",
            completion_message: "Case hold process completed",
        }
    }

    fn validate(&self, record: &Record) -> Validation<ValidRow> {
        let reason = validators::required_text(record.field(3), "reason", self.missing_reason)?;
        let case_id = validators::case_id(record.field(0))?;
        let account_no = validators::account_number(record.field(1))?;
        let telephone_no = validators::telephone_number(record.field(2))?;

        if case_id.is_none() && account_no.is_none() && telephone_no.is_none() {
            return Err(RowError::new("identifiers", NO_IDENTIFIER));
        }

        Ok(ValidRow {
            case_id,
            account_no,
            telephone_no,
            reason,
        })
    }
}

#[async_trait]
impl RowHandler for StatusChangeHandler {
    fn file_type(&self) -> FileType {
        self.file_type
    }

    fn completion_message(&self) -> &'static str {
        self.completion_message
    }

    async fn process_row(&self, record: &Record, _ctx: &TaskContext) -> Result<RowOutcome, RowFailure> {
        let row = try_row!(self.validate(record));

        let query = try_row!(build_case_query(
            row.case_id,
            row.account_no,
            row.telephone_no.as_deref()
        )
        .ok_or_else(|| RowError::new("case", NO_MATCH)));

        let case = try_row!(self
            .store
            .find_case(&query)
            .await?
            .ok_or_else(|| RowError::new("case", NO_MATCH)));

        self.store
            .set_case_status(case.id, self.target_status, &row.reason)
            .await?;

        debug!(
            row = record.line,
            case_id = case.case_id,
            status = self.target_status,
            "Case status updated"
        );
        Ok(RowOutcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::*;
    use caseflow_db::{CaseflowDb, NewCase};
    use tempfile::TempDir;

    async fn seeded_db(tmp: &TempDir) -> CaseflowDb {
        let db = CaseflowDb::open(tmp.path().join("status.db")).await.unwrap();
        db.case_insert(&NewCase {
            case_id: 12345,
            account_no: Some(5228103529),
            case_current_status: Some("Open With Agent".to_string()),
            product_labels: vec!["0112177442".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_discard_matched_case() {
        let tmp = TempDir::new().unwrap();
        let db = seeded_db(&tmp).await;
        let handler = StatusChangeHandler::discard(Arc::new(db.clone()));

        // Unknown case id, phone matches: any identifier is enough.
        let outcome = handler
            .process_row(
                &record(&["99999", "", "0112177442", "Customer paid"]),
                &TaskContext::default(),
            )
            .await
            .unwrap();
        assert!(outcome.is_success());

        let case = db.case_get(1).await.unwrap().unwrap();
        assert_eq!(case.case_current_status.as_deref(), Some("Discard"));
        assert_eq!(case.status_reason.as_deref(), Some("Customer paid"));
    }

    #[tokio::test]
    async fn test_validation_order_and_messages() {
        let tmp = TempDir::new().unwrap();
        let db = seeded_db(&tmp).await;
        let handler = StatusChangeHandler::discard(Arc::new(db));
        let ctx = TaskContext::default();

        let cases: &[(&[&str], &str)] = &[
            // Reason is checked before identifier formats.
            (&["12a", "", "", ""], "Discard Reason is missing"),
            (&["12a", "", "", "r"], "Invalid case ID"),
            (&["", "123", "", "r"], "Invalid account number"),
            (&["", "", "0112", "r"], "Invalid telephone number"),
            (&["", "", "", "r"], NO_IDENTIFIER),
            (&["4242", "", "", "r"], NO_MATCH),
        ];

        for (fields, message) in cases {
            let outcome = handler.process_row(&record(fields), &ctx).await.unwrap();
            assert!(rejected(message)(&outcome), "{:?} -> {:?}", fields, outcome);
        }
    }

    #[tokio::test]
    async fn test_hold_sets_case_hold() {
        let tmp = TempDir::new().unwrap();
        let db = seeded_db(&tmp).await;
        let handler = StatusChangeHandler::hold(Arc::new(db.clone()));
        assert_eq!(handler.file_type(), FileType::CaseHold);

        let outcome = handler
            .process_row(&record(&["", "", "", ""]), &TaskContext::default())
            .await
            .unwrap();
        assert!(rejected("Hold Reason is missing")(&outcome));

        let outcome = handler
            .process_row(
                &record(&["", "5228103529", "", "Legal review"]),
                &TaskContext::default(),
            )
            .await
            .unwrap();
        assert!(outcome.is_success());

        let case = db.case_get(1).await.unwrap().unwrap();
        assert_eq!(case.case_current_status.as_deref(), Some("Case Hold"));
        assert_eq!(case.status_reason.as_deref(), Some("Legal review"));
    }
}
