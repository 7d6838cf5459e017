use std::path::{Path, PathBuf};
use std::sync::Once;

use crate::types::FileType;

static CREATE_DIR_WARNED: Once = Once::new();

/// Resolve the Caseflow home directory.
///
/// Priority:
/// 1) CASEFLOW_HOME
/// 2) HOME/USERPROFILE
/// 3) ./.caseflow
pub fn caseflow_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("CASEFLOW_HOME") {
        return PathBuf::from(override_path);
    }
    if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        return PathBuf::from(home).join(".caseflow");
    }
    PathBuf::from(".").join(".caseflow")
}

fn ensure_home_dir(home: &Path) {
    if let Err(err) = std::fs::create_dir_all(home) {
        CREATE_DIR_WARNED.call_once(|| {
            eprintln!(
                "Warning: failed to create Caseflow home directory {}: {}. Set CASEFLOW_HOME or pass --database.",
                home.display(),
                err
            );
        });
    }
}

/// Default database path: ~/.caseflow/caseflow.sqlite3
pub fn default_database_path() -> PathBuf {
    let home = caseflow_home();
    ensure_home_dir(&home);
    home.join(crate::defaults::DEFAULT_DATABASE_FILE)
}

/// Default directory where the upload front-end drops files.
pub fn default_upload_dir() -> PathBuf {
    caseflow_home().join("uploads")
}

/// Default per-type storage directory, e.g. ~/.caseflow/files/discard
pub fn default_storage_dir(file_type: FileType) -> PathBuf {
    let leaf = match file_type {
        FileType::IncidentCreation => "incident_creation",
        FileType::IncidentReject => "incident_reject",
        FileType::ValidityPeriodExtend => "validity_period_extend",
        FileType::CaseHold => "case_hold",
        FileType::CaseDiscard => "case_discard",
    };
    caseflow_home().join("files").join(leaf)
}
