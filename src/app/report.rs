use std::path::PathBuf;

use chrono::Utc;

use crate::args::{ExportArgs, SummaryArgs};
use crate::dashboard::{summary_lines, visual_lines};
use crate::error::{AppError, AppResult, ValidationError};
use crate::export::{export, write_export};
use crate::metrics::MetricRecord;
use crate::summary::{records_in_window, summarize};

use super::Workspace;

pub(super) fn run_summary(workspace: &Workspace, args: &SummaryArgs) -> AppResult<()> {
    let window = args.window.unwrap_or_default();
    let records = workspace.store.read_all()?;
    let now = Utc::now();
    let summary = summarize(&records, window, now);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for line in summary_lines(&summary, window) {
        println!("{}", line);
    }
    if args.visuals {
        let in_window = records_in_window(&records, window, now);
        for line in visual_lines(in_window.last().copied()) {
            println!("  {}", line);
        }
    }
    Ok(())
}

pub(super) async fn run_export(workspace: &Workspace, args: &ExportArgs) -> AppResult<()> {
    if args.stdout && args.out.is_some() {
        return Err(AppError::validation(ValidationError::ExportTargetConflict));
    }
    let now = Utc::now();
    let records = workspace.store.read_all()?;
    let records: Vec<MetricRecord> = match args.window {
        Some(window) => records_in_window(&records, window, now)
            .into_iter()
            .cloned()
            .collect(),
        None => records,
    };

    if args.stdout {
        print!("{}", export(&records, args.kind)?);
        return Ok(());
    }

    let dir = args
        .out
        .as_deref()
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    let path = write_export(&dir, args.kind, &records, now).await?;
    println!("{}", path.display());
    Ok(())
}
