//! Shared vocabulary for the Caseflow upload pipeline.
//!
//! Every crate in the workspace speaks in these types: the file types a task
//! can carry, the task/log lifecycle, the enumerated CSV literals and the
//! application configuration.

pub mod config;
pub mod defaults;
pub mod paths;
pub mod types;

pub use config::{
    AppConfig, ConfigError, DatabaseConfig, EndpointConfig, LimitsConfig, PathsConfig,
    TaskConfig, ValidationConfig,
};
pub use types::{status, CasePhase, DrcAction, FileType, LogStatus, SourceType, TaskStatus};
