//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::{
    CollectArgs, Command, ExportArgs, InteractArgs, PulseArgs, SummaryArgs, WatchArgs,
};
pub use types::PositiveUsize;

pub(crate) use parsers::parse_duration_value;
