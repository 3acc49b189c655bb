use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::export::ExportKind;
use crate::metrics::VisualDescriptor;
use crate::store::StoreBackend;
use crate::summary::TimeWindow;

use super::defaults::default_store_path;
use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_page_load_ms, parse_positive_usize,
    parse_render_ms, parse_report_name, parse_time_window, parse_visual,
};
use super::types::PositiveUsize;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Performance metrics pipeline for embedded BI reports - bounded local store, windowed summaries, CSV exports, and a live polling dashboard."
)]
pub struct PulseArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file (TOML or JSON)
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Directory holding the local metric store
    #[arg(long = "store-path", env = "REPORTPULSE_STORE", default_value_t = default_store_path())]
    pub store_path: String,

    /// Storage backend for durable local state
    #[arg(long, value_enum, default_value = "file")]
    pub backend: StoreBackend,

    /// Maximum number of stored metric records
    #[arg(long, default_value = "1000", value_parser = parse_positive_usize)]
    pub capacity: PositiveUsize,

    /// Sessions not seen for this long stop counting as active (e.g. 60s, 2m)
    #[arg(long = "session-ttl", default_value = "60s", value_parser = parse_duration_arg)]
    pub session_ttl: Duration,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Record one report load
    Collect(CollectArgs),
    /// Record a user interaction with the current report
    Interact(InteractArgs),
    /// Print summary statistics for a time window
    Summary(SummaryArgs),
    /// Export stored metrics as CSV
    Export(ExportArgs),
    /// Re-summarize the store on an interval until interrupted
    Watch(WatchArgs),
    /// List sessions seen recently
    Sessions,
    /// End the current session
    EndSession,
    /// Delete every stored metric record
    Clear,
}

#[derive(Debug, Args, Clone)]
pub struct CollectArgs {
    /// Report name
    #[arg(long, short, value_parser = parse_report_name)]
    pub report: String,

    /// Page load time in milliseconds
    #[arg(long = "page-load", value_parser = parse_page_load_ms)]
    pub page_load: f64,

    /// Render time in milliseconds
    #[arg(long, value_parser = parse_render_ms)]
    pub render: f64,

    /// Visual in the report as 'id:type:title' (repeatable)
    #[arg(long = "visual", value_parser = parse_visual)]
    pub visuals: Vec<VisualDescriptor>,

    /// Pretty-print the collected record
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Args, Clone)]
pub struct InteractArgs {
    /// Interaction kind (click, filter, drill, ...)
    #[arg(long, short, default_value = "click")]
    pub kind: String,

    /// Visual or element the interaction targeted
    #[arg(long)]
    pub target: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    /// Trailing window: 1h, 6h or 24h
    #[arg(long, short, value_parser = parse_time_window)]
    pub window: Option<TimeWindow>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Also list visuals of the latest record
    #[arg(long)]
    pub visuals: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Which view to export
    #[arg(long, short, value_enum, default_value = "all")]
    pub kind: ExportKind,

    /// Directory to write the CSV file into
    #[arg(long, short)]
    pub out: Option<String>,

    /// Write CSV to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Only export records inside this trailing window
    #[arg(long, short, value_parser = parse_time_window)]
    pub window: Option<TimeWindow>,
}

#[derive(Debug, Args, Clone)]
pub struct WatchArgs {
    /// Trailing window: 1h, 6h or 24h
    #[arg(long, short, value_parser = parse_time_window)]
    pub window: Option<TimeWindow>,

    /// Polling interval (e.g. 5s, 500ms)
    #[arg(long, short, value_parser = parse_duration_arg)]
    pub interval: Option<Duration>,
}
