//! Canonical default values shared across the runner and the binary.

pub const DEFAULT_CONFIG_FILE: &str = "caseflow.toml";
pub const DEFAULT_DATABASE_FILE: &str = "caseflow.sqlite3";
pub const DEFAULT_UPLOAD_TEMPLATE_TASK_ID: i64 = 1;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_MAX_MONITOR_MONTHS: u32 = 5;
pub const DEFAULT_INCIDENT_MAX_MONITOR_MONTHS: u32 = 3;
/// Monitor months applied when a row carries `0` or a non-numeric value.
pub const DEFAULT_MONITOR_MONTHS: u32 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_INCIDENT_CREATION_ENDPOINT: &str = "http://127.0.0.1:5000/api/incident/create";
pub const DEFAULT_CASE_PHASE_ENDPOINT: &str = "http://127.0.0.1:5000/api/case/phase";
