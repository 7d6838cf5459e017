//! Moving uploaded files into per-type storage.

use caseflow_protocol::FileType;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::TaskError;

const NAME_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

fn stored_file_name(file_type: FileType) -> String {
    format!(
        "{}_{}.csv",
        file_type.as_str(),
        chrono::Local::now().format(NAME_TIMESTAMP_FORMAT)
    )
}

/// Move `source` into `dest_dir` as `{file_type}_{timestamp}.csv`.
///
/// The timestamp has one-second resolution; on a name collision we wait a
/// second and generate a fresh one. Falls back to copy + remove when a plain
/// rename cannot cross filesystems.
pub async fn move_to_storage(
    source: &Path,
    dest_dir: &Path,
    file_type: FileType,
) -> Result<PathBuf, TaskError> {
    if !tokio::fs::try_exists(source)
        .await
        .map_err(|e| TaskError::io(source, e))?
    {
        return Err(TaskError::FileNotFound(source.to_path_buf()));
    }

    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| TaskError::io(dest_dir, e))?;

    let dest = loop {
        let candidate = dest_dir.join(stored_file_name(file_type));
        if !tokio::fs::try_exists(&candidate)
            .await
            .map_err(|e| TaskError::io(&candidate, e))?
        {
            break candidate;
        }
        debug!(path = %candidate.display(), "Stored file name taken, retrying");
        tokio::time::sleep(Duration::from_secs(1)).await;
    };

    if let Err(rename_err) = tokio::fs::rename(source, &dest).await {
        debug!(error = %rename_err, "Rename failed, copying instead");
        tokio::fs::copy(source, &dest)
            .await
            .map_err(|e| TaskError::io(&dest, e))?;
        tokio::fs::remove_file(source)
            .await
            .map_err(|e| TaskError::io(source, e))?;
    }

    info!(from = %source.display(), to = %dest.display(), "Uploaded file moved");
    Ok(dest)
}

/// `Discard_20250101120000.csv` -> `Discard_20250101120000.err.csv`, beside it.
pub fn error_artifact_path(stored: &Path) -> PathBuf {
    let stem = stored
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stored.with_file_name(format!("{}.err.csv", stem))
}
