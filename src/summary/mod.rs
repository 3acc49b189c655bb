//! Windowed summary statistics over stored metric records.
mod aggregate;
mod stats;
mod types;


pub use aggregate::{records_in_window, summarize};
pub use stats::{mean, percentile};
pub use types::{Summary, TimeWindow};
