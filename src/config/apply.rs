use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{Command, PositiveUsize, PulseArgs};
use crate::error::ConfigError;

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments. Values given on the
/// command line win; config values win over built-in defaults.
///
/// # Errors
///
/// Returns an error when config values are invalid.
pub fn apply_config(
    args: &mut PulseArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> Result<(), ConfigError> {
    if !is_cli(matches, "store_path")
        && let Some(store_path) = config.store_path.clone()
    {
        args.store_path = store_path;
    }

    if !is_cli(matches, "backend")
        && let Some(backend) = config.backend
    {
        args.backend = backend;
    }

    if !is_cli(matches, "capacity")
        && let Some(capacity) = config.capacity
    {
        args.capacity = PositiveUsize::try_from(capacity)
            .map_err(|_err| ConfigError::FieldMustBePositive { field: "capacity" })?;
    }

    if !is_cli(matches, "session_ttl")
        && let Some(ttl) = config.session_ttl.as_ref()
    {
        args.session_ttl = ttl.to_duration("session_ttl")?;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    if !is_cli(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    match &mut args.command {
        Command::Summary(summary) => {
            summary.window = summary.window.or(config.window);
        }
        Command::Export(export) => {
            if export.out.is_none() && !export.stdout {
                export.out = config.export_dir.clone();
            }
        }
        Command::Watch(watch) => {
            watch.window = watch.window.or(config.window);
            if watch.interval.is_none()
                && let Some(interval) = config.poll_interval.as_ref()
            {
                watch.interval = Some(interval.to_duration("poll_interval")?);
            }
        }
        Command::Collect(_)
        | Command::Interact(_)
        | Command::Sessions
        | Command::EndSession
        | Command::Clear => {}
    }

    Ok(())
}

/// Environment variables count as explicit, like flags.
fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}
