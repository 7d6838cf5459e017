//! Application configuration.
//!
//! One `AppConfig` is loaded at startup and handed by reference to every
//! component. Every field carries a serde default so a partial file loads.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::defaults::*;
use crate::paths;
use crate::types::{CasePhase, DrcAction, FileType, SourceType};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tasks: TaskConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "paths::default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: paths::default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Template task ids that mark a system task as a file upload.
    #[serde(default = "default_upload_template_task_ids")]
    pub upload_template_task_ids: Vec<i64>,

    /// Delay between passes in watch mode.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_upload_template_task_ids() -> Vec<i64> {
    vec![DEFAULT_UPLOAD_TEMPLATE_TASK_ID]
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            upload_template_task_ids: default_upload_template_task_ids(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Ceiling on accrued monitor months for a period extension.
    #[serde(default = "default_max_monitor_months")]
    pub max_monitor_months: u32,

    /// Ceiling on monitor months requested for a new incident.
    #[serde(default = "default_incident_max_monitor_months")]
    pub incident_max_monitor_months: u32,
}

fn default_max_monitor_months() -> u32 {
    DEFAULT_MAX_MONITOR_MONTHS
}

fn default_incident_max_monitor_months() -> u32 {
    DEFAULT_INCIDENT_MAX_MONITOR_MONTHS
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_monitor_months: default_max_monitor_months(),
            incident_max_monitor_months: default_incident_max_monitor_months(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_incident_creation_endpoint")]
    pub incident_creation: String,

    #[serde(default = "default_case_phase_endpoint")]
    pub case_phase: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_incident_creation_endpoint() -> String {
    DEFAULT_INCIDENT_CREATION_ENDPOINT.to_string()
}

fn default_case_phase_endpoint() -> String {
    DEFAULT_CASE_PHASE_ENDPOINT.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl EndpointConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            incident_creation: default_incident_creation_endpoint(),
            case_phase: default_case_phase_endpoint(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Where uploaded files wait to be picked up.
    #[serde(default = "paths::default_upload_dir")]
    pub uploaded_file_dir: PathBuf,

    #[serde(default = "default_incident_creation_dir")]
    pub incident_creation_dir: PathBuf,

    #[serde(default = "default_incident_reject_dir")]
    pub incident_reject_dir: PathBuf,

    #[serde(default = "default_validity_period_extend_dir")]
    pub validity_period_extend_dir: PathBuf,

    #[serde(default = "default_case_hold_dir")]
    pub case_hold_dir: PathBuf,

    #[serde(default = "default_case_discard_dir")]
    pub case_discard_dir: PathBuf,
}

fn default_incident_creation_dir() -> PathBuf {
    paths::default_storage_dir(FileType::IncidentCreation)
}

fn default_incident_reject_dir() -> PathBuf {
    paths::default_storage_dir(FileType::IncidentReject)
}

fn default_validity_period_extend_dir() -> PathBuf {
    paths::default_storage_dir(FileType::ValidityPeriodExtend)
}

fn default_case_hold_dir() -> PathBuf {
    paths::default_storage_dir(FileType::CaseHold)
}

fn default_case_discard_dir() -> PathBuf {
    paths::default_storage_dir(FileType::CaseDiscard)
}

impl PathsConfig {
    /// Directory that receives moved uploads and error artifacts of `file_type`.
    pub fn storage_dir(&self, file_type: FileType) -> &Path {
        match file_type {
            FileType::IncidentCreation => &self.incident_creation_dir,
            FileType::IncidentReject => &self.incident_reject_dir,
            FileType::ValidityPeriodExtend => &self.validity_period_extend_dir,
            FileType::CaseHold => &self.case_hold_dir,
            FileType::CaseDiscard => &self.case_discard_dir,
        }
    }

    /// Point every directory below `root`. Handy for tests and sandboxes.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            uploaded_file_dir: root.join("uploads"),
            incident_creation_dir: root.join("incident_creation"),
            incident_reject_dir: root.join("incident_reject"),
            validity_period_extend_dir: root.join("validity_period_extend"),
            case_hold_dir: root.join("case_hold"),
            case_discard_dir: root.join("case_discard"),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            uploaded_file_dir: paths::default_upload_dir(),
            incident_creation_dir: default_incident_creation_dir(),
            incident_reject_dir: default_incident_reject_dir(),
            validity_period_extend_dir: default_validity_period_extend_dir(),
            case_hold_dir: default_case_hold_dir(),
            case_discard_dir: default_case_discard_dir(),
        }
    }
}

/// Accepted literals for enumerated CSV columns.
///
/// Values are deserialized straight into the domain enums, so an unknown
/// literal in the file fails at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_drc_actions")]
    pub drc_actions: Vec<DrcAction>,

    #[serde(default = "default_source_types")]
    pub source_types: Vec<SourceType>,

    /// Case phases in which the validity period may be extended.
    #[serde(default = "default_extendable_phases")]
    pub extendable_phases: Vec<CasePhase>,
}

fn default_drc_actions() -> Vec<DrcAction> {
    DrcAction::ALL.to_vec()
}

fn default_source_types() -> Vec<SourceType> {
    SourceType::ALL.to_vec()
}

fn default_extendable_phases() -> Vec<CasePhase> {
    vec![CasePhase::Negotiation, CasePhase::MediationBoard]
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            drc_actions: default_drc_actions(),
            source_types: default_source_types(),
            extendable_phases: default_extendable_phases(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_monitor_months == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_monitor_months must be at least 1".to_string(),
            ));
        }
        if self.limits.incident_max_monitor_months == 0 {
            return Err(ConfigError::Invalid(
                "limits.incident_max_monitor_months must be at least 1".to_string(),
            ));
        }
        if self.tasks.upload_template_task_ids.is_empty() {
            return Err(ConfigError::Invalid(
                "tasks.upload_template_task_ids must not be empty".to_string(),
            ));
        }
        if self.validation.drc_actions.is_empty() || self.validation.source_types.is_empty() {
            return Err(ConfigError::Invalid(
                "validation lists must name at least one accepted value".to_string(),
            ));
        }
        if self.validation.extendable_phases.is_empty() {
            return Err(ConfigError::Invalid(
                "validation.extendable_phases must name at least one phase".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [limits]
            max_monitor_months = 6

            [endpoints]
            case_phase = "http://phase.internal/api/phase"
            "#,
        )
        .unwrap();

        assert_eq!(config.limits.max_monitor_months, 6);
        assert_eq!(config.limits.incident_max_monitor_months, 3);
        assert_eq!(config.endpoints.case_phase, "http://phase.internal/api/phase");
        assert_eq!(config.endpoints.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.tasks.upload_template_task_ids, vec![1]);
        assert_eq!(config.validation.drc_actions.len(), 3);
        assert_eq!(
            config.validation.extendable_phases,
            vec![CasePhase::Negotiation, CasePhase::MediationBoard]
        );
    }

    #[test]
    fn test_validation_lists_parse_into_enums() {
        let config = AppConfig::from_toml(
            r#"
            [validation]
            drc_actions = ["collect arrears", "collect CPE"]
            source_types = ["Special"]
            "#,
        )
        .unwrap();
        assert_eq!(
            config.validation.drc_actions,
            vec![DrcAction::CollectArrears, DrcAction::CollectCpe]
        );
        assert_eq!(config.validation.source_types, vec![SourceType::Special]);
    }

    #[test]
    fn test_unknown_drc_action_is_rejected() {
        let err = AppConfig::from_toml(
            r#"
            [validation]
            drc_actions = ["collect everything"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_ceiling_is_invalid() {
        let err = AppConfig::from_toml("[limits]\nmax_monitor_months = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = AppConfig::from_toml("[limits]\nincident_max_monitor_months = 0\n").unwrap_err();
        assert!(err.to_string().contains("incident_max_monitor_months"));
    }

    #[test]
    fn test_empty_extendable_phases_is_invalid() {
        let err = AppConfig::from_toml("[validation]\nextendable_phases = []\n").unwrap_err();
        assert!(err.to_string().contains("extendable_phases"));
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("caseflow.toml");
        std::fs::write(&path, "[tasks]\nupload_template_task_ids = [1, 7]\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.tasks.upload_template_task_ids, vec![1, 7]);

        let missing = AppConfig::load(&tmp.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }

    #[test]
    fn test_storage_dir_per_file_type() {
        let paths = PathsConfig::rooted_at(Path::new("/srv/caseflow"));
        assert_eq!(
            paths.storage_dir(FileType::CaseDiscard),
            Path::new("/srv/caseflow/case_discard")
        );
        assert_eq!(
            paths.storage_dir(FileType::IncidentReject),
            Path::new("/srv/caseflow/incident_reject")
        );
    }
}
