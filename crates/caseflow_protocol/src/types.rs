//! Canonical domain enums shared by every Caseflow crate.
//!
//! Each enum maps 1:1 to the literal stored in the task queue, the upload log
//! or the uploaded CSV. Parsing goes through a lookup table so the accepted
//! literals live in exactly one place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Upload file types
// ============================================================================

/// Kind of uploaded file, as recorded on the file upload log entry.
/// This is the CANONICAL definition - handlers are registered against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "Incident Creation")]
    IncidentCreation,
    #[serde(rename = "Incident Reject")]
    IncidentReject,
    #[serde(rename = "Validity Period Extend")]
    ValidityPeriodExtend,
    #[serde(rename = "Hold")]
    CaseHold,
    #[serde(rename = "Discard")]
    CaseDiscard,
}

const FILE_TYPES: &[(FileType, &str)] = &[
    (FileType::IncidentCreation, "Incident Creation"),
    (FileType::IncidentReject, "Incident Reject"),
    (FileType::ValidityPeriodExtend, "Validity Period Extend"),
    (FileType::CaseHold, "Hold"),
    (FileType::CaseDiscard, "Discard"),
];

impl FileType {
    pub const ALL: [FileType; 5] = [
        FileType::IncidentCreation,
        FileType::IncidentReject,
        FileType::ValidityPeriodExtend,
        FileType::CaseHold,
        FileType::CaseDiscard,
    ];

    pub fn as_str(&self) -> &'static str {
        lookup_literal(FILE_TYPES, self)
    }

    /// Number of CSV columns a row of this file type must carry.
    pub fn arity(&self) -> usize {
        match self {
            FileType::IncidentReject => 2,
            FileType::IncidentCreation
            | FileType::ValidityPeriodExtend
            | FileType::CaseHold
            | FileType::CaseDiscard => 4,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup_variant(FILE_TYPES, s.trim())
            .ok_or_else(|| format!("Unsupported file type: '{}'", s))
    }
}

// ============================================================================
// Task / log lifecycle
// ============================================================================

/// Status of a system task (and its in-progress mirror).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    Open,
    #[serde(rename = "InProgress")]
    InProgress,
    Completed,
    Failed,
    Error,
}

const TASK_STATUSES: &[(TaskStatus, &str)] = &[
    (TaskStatus::Open, "Open"),
    (TaskStatus::InProgress, "InProgress"),
    (TaskStatus::Completed, "Completed"),
    (TaskStatus::Failed, "Failed"),
    (TaskStatus::Error, "Error"),
];

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        lookup_literal(TASK_STATUSES, self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Error)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Legacy rows were written as "inProgress".
        if s.eq_ignore_ascii_case("inprogress") {
            return Ok(TaskStatus::InProgress);
        }
        lookup_variant(TASK_STATUSES, s).ok_or_else(|| format!("Invalid task status: '{}'", s))
    }
}

/// Status of a file upload log entry. Shares the task lifecycle literals.
pub type LogStatus = TaskStatus;

// ============================================================================
// Incident creation vocabulary
// ============================================================================

/// Debt-recovery action requested for a new incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrcAction {
    #[serde(rename = "collect arrears")]
    CollectArrears,
    #[serde(rename = "collect arrears and CPE")]
    CollectArrearsAndCpe,
    #[serde(rename = "collect CPE")]
    CollectCpe,
}

const DRC_ACTIONS: &[(DrcAction, &str)] = &[
    (DrcAction::CollectArrears, "collect arrears"),
    (DrcAction::CollectArrearsAndCpe, "collect arrears and CPE"),
    (DrcAction::CollectCpe, "collect CPE"),
];

impl DrcAction {
    pub const ALL: [DrcAction; 3] = [
        DrcAction::CollectArrears,
        DrcAction::CollectArrearsAndCpe,
        DrcAction::CollectCpe,
    ];

    pub fn as_str(&self) -> &'static str {
        lookup_literal(DRC_ACTIONS, self)
    }

    /// Equipment collection needs a callback number on the incident.
    pub fn requires_contact_number(&self) -> bool {
        matches!(self, DrcAction::CollectCpe)
    }
}

impl fmt::Display for DrcAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DrcAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup_variant(DRC_ACTIONS, s).ok_or_else(|| format!("Invalid DRC action: '{}'", s))
    }
}

/// Origin of the arrears that triggered an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "Pilot Suspended")]
    PilotSuspended,
    #[serde(rename = "Product Terminate")]
    ProductTerminate,
    #[serde(rename = "Special")]
    Special,
}

const SOURCE_TYPES: &[(SourceType, &str)] = &[
    (SourceType::PilotSuspended, "Pilot Suspended"),
    (SourceType::ProductTerminate, "Product Terminate"),
    (SourceType::Special, "Special"),
];

impl SourceType {
    pub const ALL: [SourceType; 3] = [
        SourceType::PilotSuspended,
        SourceType::ProductTerminate,
        SourceType::Special,
    ];

    pub fn as_str(&self) -> &'static str {
        lookup_literal(SOURCE_TYPES, self)
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup_variant(SOURCE_TYPES, s).ok_or_else(|| format!("Invalid source type: '{}'", s))
    }
}

// ============================================================================
// Case vocabulary
// ============================================================================

/// Case phase as reported by the case-phase service.
///
/// Only the phases that matter to this pipeline are named; anything else is
/// carried verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CasePhase {
    Negotiation,
    MediationBoard,
    Other(String),
}

impl CasePhase {
    pub fn as_str(&self) -> &str {
        match self {
            CasePhase::Negotiation => "Negotiation",
            CasePhase::MediationBoard => "Mediation Board",
            CasePhase::Other(raw) => raw,
        }
    }
}

impl From<String> for CasePhase {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Negotiation" => CasePhase::Negotiation,
            "Mediation Board" => CasePhase::MediationBoard,
            _ => CasePhase::Other(raw),
        }
    }
}

impl From<CasePhase> for String {
    fn from(phase: CasePhase) -> Self {
        phase.as_str().to_string()
    }
}

impl fmt::Display for CasePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status literals written onto case and incident records.
pub mod status {
    pub const CASE_DISCARD: &str = "Discard";
    pub const CASE_HOLD: &str = "Case Hold";
    pub const INCIDENT_REJECT: &str = "Incident Reject";
    pub const PERIOD_EXTENDED: &str = "Validity period extended successfully";
}

fn lookup_literal<T: PartialEq>(table: &[(T, &'static str)], value: &T) -> &'static str {
    table
        .iter()
        .find(|(variant, _)| variant == value)
        .map(|(_, literal)| *literal)
        .unwrap_or("")
}

fn lookup_variant<T: Copy>(table: &[(T, &'static str)], literal: &str) -> Option<T> {
    table
        .iter()
        .find(|(_, candidate)| *candidate == literal)
        .map(|(variant, _)| *variant)
}
