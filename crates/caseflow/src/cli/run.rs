//! Run command - process open upload tasks

use anyhow::{Context, Result};
use caseflow_db::CaseflowDb;
use caseflow_protocol::AppConfig;
use caseflow_worker::TaskRunner;
use std::time::Duration;
use tracing::info;

#[derive(Debug)]
pub struct RunArgs {
    pub watch: bool,
}

pub async fn run(args: RunArgs, config: AppConfig) -> Result<()> {
    let db = CaseflowDb::open(&config.database.path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.path.display()))?;
    let poll_interval = Duration::from_secs(config.tasks.poll_interval_secs.max(1));
    let runner = TaskRunner::from_config(db.clone(), config)
        .context("Failed to build service clients")?;

    loop {
        let summary = runner.run_once().await.context("Task pass failed")?;
        info!(
            completed = summary.completed,
            failed = summary.failed,
            skipped = summary.skipped,
            "Task pass finished"
        );
        if !args.watch {
            println!(
                "Completed: {}  Failed: {}  Skipped: {}",
                summary.completed, summary.failed, summary.skipped
            );
            break;
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                break;
            }
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }

    db.close().await;
    Ok(())
}
