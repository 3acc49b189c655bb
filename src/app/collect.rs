use crate::args::CollectArgs;
use crate::error::AppResult;
use crate::metrics::MetricRecord;

use super::Workspace;

pub(super) fn run_collect(workspace: &Workspace, args: &CollectArgs) -> AppResult<()> {
    let record = collect_record(workspace, args);
    let json = if args.pretty {
        serde_json::to_string_pretty(&record)?
    } else {
        serde_json::to_string(&record)?
    };
    println!("{}", json);
    Ok(())
}

pub(super) fn collect_record(workspace: &Workspace, args: &CollectArgs) -> MetricRecord {
    let record = workspace.collector().collect(
        &args.report,
        args.page_load,
        args.render,
        Some(args.visuals.as_slice()),
    );
    if let Some(error) = record.error.as_deref() {
        tracing::warn!("Metrics for '{}' were not stored: {}", args.report, error);
    }
    record
}
