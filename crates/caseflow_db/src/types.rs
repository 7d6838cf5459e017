//! Types for every Caseflow database entity.
//!
//! These types are the single source of truth for stored shapes. The worker
//! reads them and hands mutations back through the typed methods on
//! [`crate::CaseflowDb`].

use caseflow_protocol::TaskStatus;
use chrono::{DateTime, FixedOffset, Months, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Task queue
// ============================================================================

/// A system task, as stored in `system_tasks` and its in-progress mirror.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemTask {
    pub task_id: i64,
    pub template_task_id: i64,
    pub task_status: TaskStatus,
    pub task_status_description: Option<String>,
    /// Free-form task parameters; upload tasks carry `file_upload_seq`.
    pub parameters: serde_json::Value,
    pub created_by: Option<String>,
    /// Callback number used by incident creation for equipment collection.
    pub contact_number: Option<String>,
}

impl SystemTask {
    /// Raw `parameters.file_upload_seq`, which producers write as either a
    /// number or a numeric string.
    pub fn raw_file_upload_seq(&self) -> Option<&serde_json::Value> {
        self.parameters
            .get("file_upload_seq")
            .filter(|value| !value.is_null())
    }
}

/// Insert shape for a new task (written to both task tables).
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub task_id: i64,
    pub template_task_id: i64,
    pub parameters: serde_json::Value,
    pub created_by: Option<String>,
    pub contact_number: Option<String>,
}

/// Per-file record counters attached to a terminal status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub total: u64,
    pub success: u64,
    pub error: u64,
}

/// Status change applied to the task, its mirror and the upload log at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub status: TaskStatus,
    pub description: Option<String>,
    pub counts: Option<RecordCounts>,
    pub error_file_path: Option<String>,
}

impl TaskOutcome {
    pub fn in_progress() -> Self {
        Self {
            status: TaskStatus::InProgress,
            description: None,
            counts: None,
            error_file_path: None,
        }
    }
}

// ============================================================================
// File upload log
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileUploadLogEntry {
    pub file_upload_seq: i64,
    pub file_name: String,
    /// Raw literal; mapped onto `FileType` by the runner so unknown types
    /// fail the task instead of the read.
    pub file_type: String,
    pub log_status: TaskStatus,
    pub log_status_description: Option<String>,
    pub forwarded_file_path: Option<String>,
    pub error_file_path: Option<String>,
    pub total_record_count: Option<i64>,
    pub success_count: Option<i64>,
    pub error_count: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewFileUploadLog {
    pub file_upload_seq: i64,
    pub file_name: String,
    pub file_type: String,
}

// ============================================================================
// Case store
// ============================================================================

/// One identifier condition of a case lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CaseCondition {
    CaseId(i64),
    AccountNo(i64),
    /// Membership test against the case's product labels (telephone numbers).
    ProductLabel(String),
}

impl CaseCondition {
    fn sql(&self) -> &'static str {
        match self {
            CaseCondition::CaseId(_) => "case_id = ?",
            CaseCondition::AccountNo(_) => "account_no = ?",
            CaseCondition::ProductLabel(_) => {
                "EXISTS (SELECT 1 FROM case_ref_products p \
                 WHERE p.case_id = case_details.case_id AND p.product_label = ?)"
            }
        }
    }
}

/// Disjunctive case lookup: matches a case when ANY condition holds.
///
/// A query always carries at least one condition; "no identifiers" is
/// represented by the absence of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseQuery {
    conditions: Vec<CaseCondition>,
}

impl CaseQuery {
    /// Returns `None` when `conditions` is empty.
    pub fn any_of(conditions: Vec<CaseCondition>) -> Option<Self> {
        if conditions.is_empty() {
            None
        } else {
            Some(Self { conditions })
        }
    }

    pub fn conditions(&self) -> &[CaseCondition] {
        &self.conditions
    }

    /// Parameterised WHERE body, one placeholder per condition in order.
    pub fn where_clause(&self) -> String {
        self.conditions
            .iter()
            .map(|c| format!("({})", c.sql()))
            .collect::<Vec<_>>()
            .join(" OR ")
    }
}

/// A case_details row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: i64,
    pub case_id: i64,
    pub account_no: Option<i64>,
    pub case_current_status: Option<String>,
    pub status_reason: Option<String>,
    pub case_status_description: Option<String>,
    pub monitor_months: u32,
    /// ISO-8601 expiry timestamp of the current DRC assignment.
    pub expire_dtm: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewCase {
    pub case_id: i64,
    pub account_no: Option<i64>,
    pub case_current_status: Option<String>,
    pub monitor_months: u32,
    pub expire_dtm: Option<String>,
    pub product_labels: Vec<String>,
}

// ============================================================================
// Incident store
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub id: i64,
    pub account_num: String,
    pub incident_status: Option<String>,
    pub incident_status_dtm: Option<String>,
    pub status_description: Option<String>,
    /// Set once the incident has been turned into a case.
    pub proceed_dtm: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewIncident {
    pub account_num: String,
    pub incident_status: Option<String>,
    pub proceed_dtm: Option<String>,
}

// ============================================================================
// Statistics
// ============================================================================

/// Count of rows per status literal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusCounts {
    pub entries: Vec<(String, u64)>,
}

impl StatusCounts {
    pub fn get(&self, status: &str) -> u64 {
        self.entries
            .iter()
            .find(|(name, _)| name == status)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

/// Storage format for timestamps written by this crate.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A timestamp read from a record, kept in the shape it was stored in.
///
/// Offset-carrying values stay in their own offset so calendar arithmetic
/// happens on local wall-clock time, and they are written back with the same
/// offset. Fractional seconds survive a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredTimestamp {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl StoredTimestamp {
    /// Accepts RFC 3339 and naive ISO-8601 with a `T` or space separator,
    /// with or without fractional seconds.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self::Zoned(dt));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(Self::Naive)
    }

    /// Whole calendar months later, clamped to the end of a shorter month.
    pub fn checked_add_months(self, months: u32) -> Option<Self> {
        let months = Months::new(months);
        match self {
            Self::Zoned(dt) => dt.checked_add_months(months).map(Self::Zoned),
            Self::Naive(dt) => dt.checked_add_months(months).map(Self::Naive),
        }
    }
}

impl fmt::Display for StoredTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zoned(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            Self::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_is_none() {
        assert!(CaseQuery::any_of(Vec::new()).is_none());
    }

    #[test]
    fn test_where_clause_joins_with_or() {
        let query = CaseQuery::any_of(vec![
            CaseCondition::CaseId(12345),
            CaseCondition::ProductLabel("0112177442".to_string()),
        ])
        .unwrap();
        let clause = query.where_clause();
        assert!(clause.starts_with("(case_id = ?) OR (EXISTS"));
        assert_eq!(clause.matches('?').count(), 2);
    }

    #[test]
    fn test_raw_file_upload_seq() {
        let task = SystemTask {
            task_id: 1,
            template_task_id: 1,
            task_status: TaskStatus::Open,
            task_status_description: None,
            parameters: serde_json::json!({ "file_upload_seq": "42" }),
            created_by: None,
            contact_number: None,
        };
        assert_eq!(task.raw_file_upload_seq(), Some(&serde_json::json!("42")));

        let empty = SystemTask {
            parameters: serde_json::json!({ "file_upload_seq": null }),
            ..task
        };
        assert!(empty.raw_file_upload_seq().is_none());
    }

    #[test]
    fn test_stored_timestamp_formats() {
        let naive = NaiveDateTime::parse_from_str("2025-03-01 10:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        for raw in ["2025-03-01T10:00:00", "2025-03-01T10:00:00.000", "2025-03-01 10:00:00"] {
            assert_eq!(StoredTimestamp::parse(raw), Some(StoredTimestamp::Naive(naive)));
        }
        assert_eq!(StoredTimestamp::parse("not a date"), None);
        assert_eq!(format_timestamp(&naive), "2025-03-01T10:00:00");

        let zoned = StoredTimestamp::parse("2025-03-01T10:00:00+05:30").unwrap();
        assert!(matches!(zoned, StoredTimestamp::Zoned(_)));
        assert_eq!(zoned.to_string(), "2025-03-01T10:00:00+05:30");
        assert_eq!(
            StoredTimestamp::parse("2025-03-01T10:00:00.250").unwrap().to_string(),
            "2025-03-01T10:00:00.250"
        );
    }

    #[test]
    fn test_months_are_added_in_the_stored_offset() {
        let extended = StoredTimestamp::parse("2025-01-31T00:00:00+05:30")
            .and_then(|ts| ts.checked_add_months(1))
            .unwrap();
        assert_eq!(extended.to_string(), "2025-02-28T00:00:00+05:30");

        let extended = StoredTimestamp::parse("2024-12-31T23:15:00.5Z")
            .and_then(|ts| ts.checked_add_months(2))
            .unwrap();
        assert_eq!(extended.to_string(), "2025-02-28T23:15:00.500+00:00");

        let extended = StoredTimestamp::parse("2025-01-31 08:00:00")
            .and_then(|ts| ts.checked_add_months(1))
            .unwrap();
        assert_eq!(extended.to_string(), "2025-02-28T08:00:00");
    }
}
