use async_trait::async_trait;
use caseflow_db::StoredTimestamp;
use caseflow_protocol::{status, CasePhase, FileType};
use std::sync::Arc;
use tracing::debug;

use super::{try_row, RowHandler, RowOutcome, TaskContext};
use crate::error::RowFailure;
use crate::query::build_case_query;
use crate::record::Record;
use crate::services::{CasePhaseService, PhaseLookup};
use crate::store::CaseStore;
use crate::validators::{self, RowError, Validation};

const NO_IDENTIFIER: &str = "All Case ID, Account No, and Telephone No missing";
const NO_MATCH: &str = "No case found";
const INVALID_STATUS: &str = "Invalid case status";

/// Validity period extension files: `case_id, account_no, telephone_no, months`.
///
/// The matched case must sit in an extendable phase (asked of the case-phase
/// service) and stay within the monitor-months ceiling after the extension.
pub struct ValidityExtendHandler {
    store: Arc<dyn CaseStore>,
    phases: Arc<dyn CasePhaseService>,
    max_monitor_months: u32,
    extendable_phases: Vec<CasePhase>,
}

struct ValidRow {
    case_id: Option<i64>,
    account_no: Option<i64>,
    telephone_no: Option<String>,
    months: u32,
}

impl ValidityExtendHandler {
    pub fn new(
        store: Arc<dyn CaseStore>,
        phases: Arc<dyn CasePhaseService>,
        max_monitor_months: u32,
        extendable_phases: Vec<CasePhase>,
    ) -> Self {
        Self {
            store,
            phases,
            max_monitor_months,
            extendable_phases,
        }
    }

    fn validate(&self, record: &Record) -> Validation<ValidRow> {
        let case_id = validators::case_id(record.field(0))?;
        let account_no = validators::account_number(record.field(1))?;
        let telephone_no = validators::telephone_number(record.field(2))?;

        if case_id.is_none() && account_no.is_none() && telephone_no.is_none() {
            return Err(RowError::new("identifiers", NO_IDENTIFIER));
        }

        let months = validators::requested_months(record.field(3))?;

        Ok(ValidRow {
            case_id,
            account_no,
            telephone_no,
            months,
        })
    }

    fn check_phase(&self, lookup: PhaseLookup) -> Validation<CasePhase> {
        match lookup {
            PhaseLookup::Rejected { .. } => {
                Err(RowError::new("case_phase", "Error in get-case-phase API"))
            }
            PhaseLookup::Missing => Err(RowError::new("case_phase", INVALID_STATUS)),
            PhaseLookup::Phase(phase) if self.extendable_phases.contains(&phase) => Ok(phase),
            PhaseLookup::Phase(_) => Err(RowError::new("case_phase", INVALID_STATUS)),
        }
    }
}

#[async_trait]
impl RowHandler for ValidityExtendHandler {
    fn file_type(&self) -> FileType {
        FileType::ValidityPeriodExtend
    }

    fn completion_message(&self) -> &'static str {
        "Validity period extension completed"
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

        let case_status = try_row!(case
            .case_current_status
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RowError::new("case_status", INVALID_STATUS)));

        let lookup = self.phases.case_phase(case_status).await?;
        let phase = try_row!(self.check_phase(lookup));

        let total = try_row!(validators::within_ceiling(
            row.months,
            case.monitor_months,
            self.max_monitor_months
        ));

        let expire_raw = try_row!(case
            .expire_dtm
            .as_deref()
            .ok_or_else(|| RowError::new("expire_dtm", "Expire date missing")));
        // Months are added on the stored wall clock, in the stored offset.
        let extended = try_row!(StoredTimestamp::parse(expire_raw)
            .and_then(|expire| expire.checked_add_months(row.months))
            .ok_or_else(|| RowError::new("expire_dtm", "Invalid expire date")));

        self.store
            .extend_case_validity(
                case.id,
                total,
                &extended.to_string(),
                status::PERIOD_EXTENDED,
            )
            .await?;

        debug!(
            row = record.line,
            case_id = case.case_id,
            %phase,
            monitor_months = total,
            "Validity period extended"
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

    fn plus_months(raw: &str, months: u32) -> String {
        StoredTimestamp::parse(raw)
            .and_then(|ts| ts.checked_add_months(months))
            .unwrap()
            .to_string()
    }

    async fn seeded_db(tmp: &TempDir, monitor_months: u32, expire: Option<&str>) -> CaseflowDb {
        let db = CaseflowDb::open(tmp.path().join("extend.db")).await.unwrap();
        db.case_insert(&NewCase {
            case_id: 12345,
            account_no: Some(5228103529),
            case_current_status: Some("Negotiation Settle Pending".to_string()),
            monitor_months,
            expire_dtm: expire.map(str::to_string),
            product_labels: vec!["0112177442".to_string()],
        })
        .await
        .unwrap();
        db
    }

    fn handler(db: &CaseflowDb, phase: PhaseLookup) -> ValidityExtendHandler {
        ValidityExtendHandler::new(
            Arc::new(db.clone()),
            Arc::new(FixedPhaseService(phase)),
            5,
            vec![CasePhase::Negotiation, CasePhase::MediationBoard],
        )
    }

    #[test]
    fn test_calendar_months_not_days() {
        assert_eq!(plus_months("2025-01-15T00:00:00", 2), "2025-03-15T00:00:00");
        assert_eq!(plus_months("2025-01-31T00:00:00", 1), "2025-02-28T00:00:00");
        assert_eq!(plus_months("2024-01-31T00:00:00", 1), "2024-02-29T00:00:00");
    }

    #[tokio::test]
    async fn test_offset_expiry_keeps_its_offset() {
        let tmp = TempDir::new().unwrap();
        let db = seeded_db(&tmp, 0, Some("2025-01-31T00:00:00+05:30")).await;
        let handler = handler(&db, PhaseLookup::Phase(CasePhase::Negotiation));

        let outcome = handler
            .process_row(&record(&["12345", "", "", "1"]), &TaskContext::default())
            .await
            .unwrap();
        assert!(outcome.is_success());

        let case = db.case_get(1).await.unwrap().unwrap();
        assert_eq!(case.expire_dtm.as_deref(), Some("2025-02-28T00:00:00+05:30"));
    }

    #[tokio::test]
    async fn test_unparsable_expiry_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let db = seeded_db(&tmp, 0, Some("31/01/2025")).await;
        let handler = handler(&db, PhaseLookup::Phase(CasePhase::Negotiation));

        let outcome = handler
            .process_row(&record(&["12345", "", "", "1"]), &TaskContext::default())
            .await
            .unwrap();
        assert!(rejected("Invalid expire date")(&outcome));
    }

    #[tokio::test]
    async fn test_extension_at_ceiling_is_accepted() {
        let tmp = TempDir::new().unwrap();
        let db = seeded_db(&tmp, 3, Some("2025-01-31T00:00:00")).await;
        let handler = handler(&db, PhaseLookup::Phase(CasePhase::Negotiation));

        let outcome = handler
            .process_row(&record(&["12345", "", "", "2"]), &TaskContext::default())
            .await
            .unwrap();
        assert!(outcome.is_success());

        let case = db.case_get(1).await.unwrap().unwrap();
        assert_eq!(case.monitor_months, 5);
        assert_eq!(case.expire_dtm.as_deref(), Some("2025-03-31T00:00:00"));
        assert_eq!(
            case.case_status_description.as_deref(),
            Some("Validity period extended successfully")
        );
    }

    #[tokio::test]
    async fn test_extension_over_ceiling_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let db = seeded_db(&tmp, 3, Some("2025-01-31T00:00:00")).await;
        let handler = handler(&db, PhaseLookup::Phase(CasePhase::MediationBoard));

        let outcome = handler
            .process_row(&record(&["", "5228103529", "", "3"]), &TaskContext::default())
            .await
            .unwrap();
        assert!(rejected("Exceeds 5 months")(&outcome));

        let case = db.case_get(1).await.unwrap().unwrap();
        assert_eq!(case.monitor_months, 3);
    }

    #[tokio::test]
    async fn test_row_and_phase_failures() {
        let tmp = TempDir::new().unwrap();
        let db = seeded_db(&tmp, 0, Some("2025-01-31T00:00:00")).await;
        let ctx = TaskContext::default();
        let ok_phase = handler(&db, PhaseLookup::Phase(CasePhase::Negotiation));

        let cases: &[(&[&str], &str)] = &[
            (&["x1", "", "", "2"], "Invalid case ID"),
            (&["", "", "", "2"], NO_IDENTIFIER),
            (&["12345", "", "", ""], "No of months missing"),
            (&["4242", "", "", "2"], NO_MATCH),
        ];
        for (fields, message) in cases {
            let outcome = ok_phase.process_row(&record(fields), &ctx).await.unwrap();
            assert!(rejected(message)(&outcome), "{:?} -> {:?}", fields, outcome);
        }

        let row = record(&["", "", "0112177442", "1"]);
        let api_down = handler(&db, PhaseLookup::Rejected { status: 500 });
        let outcome = api_down.process_row(&row, &ctx).await.unwrap();
        assert!(rejected("Error in get-case-phase API")(&outcome));

        let no_phase = handler(&db, PhaseLookup::Missing);
        let outcome = no_phase.process_row(&row, &ctx).await.unwrap();
        assert!(rejected(INVALID_STATUS)(&outcome));

        let wrong_phase = handler(&db, PhaseLookup::Phase(CasePhase::Other("Closed".to_string())));
        let outcome = wrong_phase.process_row(&row, &ctx).await.unwrap();
        assert!(rejected(INVALID_STATUS)(&outcome));
    }

    #[tokio::test]
    async fn test_missing_expiry_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let db = seeded_db(&tmp, 0, None).await;
        let handler = handler(&db, PhaseLookup::Phase(CasePhase::Negotiation));

        let outcome = handler
            .process_row(&record(&["12345", "", "", "1"]), &TaskContext::default())
            .await
            .unwrap();
        assert!(rejected("Expire date missing")(&outcome));
    }

    #[tokio::test]
    async fn test_non_numeric_months_default_to_three() {
        let tmp = TempDir::new().unwrap();
        let db = seeded_db(&tmp, 0, Some("2025-01-10T08:30:00")).await;
        let handler = handler(&db, PhaseLookup::Phase(CasePhase::Negotiation));

        let outcome = handler
            .process_row(&record(&["12345", "", "", "abc"]), &TaskContext::default())
            .await
            .unwrap();
        assert!(outcome.is_success());

        let case = db.case_get(1).await.unwrap().unwrap();
        assert_eq!(case.monitor_months, 3);
        assert_eq!(case.expire_dtm.as_deref(), Some("2025-04-10T08:30:00"));
    }
}
