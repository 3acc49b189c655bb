//! Live dashboard: a cancellable poller that re-summarizes the store on a
//! fixed interval, plus plain-text rendering of summaries.
mod poller;
mod render;


pub use poller::{DEFAULT_POLL_INTERVAL, SummaryPoller, spawn_summary_poller};
pub use render::{summary_lines, visual_lines};
