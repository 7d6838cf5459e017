//! Stats command - task and upload log counts by status

use anyhow::{Context, Result};
use caseflow_db::{CaseflowDb, StatusCounts};
use caseflow_protocol::AppConfig;
use serde::Serialize;

use crate::cli::output::{print_table_colored, status_color};

#[derive(Debug)]
pub struct StatsArgs {
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StatsOutput {
    tasks: StatusCounts,
    upload_log: StatusCounts,
}

pub async fn run(args: StatsArgs, config: AppConfig) -> Result<()> {
    let db = CaseflowDb::open_existing(&config.database.path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.path.display()))?;

    let output = StatsOutput {
        tasks: db.task_counts_by_status().await?,
        upload_log: db.upload_log_counts_by_status().await?,
    };
    db.close().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Tasks (in progress mirror)");
    print_counts(&output.tasks);
    println!();
    println!("File upload log");
    print_counts(&output.upload_log);
    Ok(())
}

fn print_counts(counts: &StatusCounts) {
    let rows = counts
        .entries
        .iter()
        .map(|(status, count)| {
            vec![
                (status.clone(), status_color(status)),
                (count.to_string(), None),
            ]
        })
        .collect();
    print_table_colored(&["STATUS", "COUNT"], rows);
}
