use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app;
use crate::args::PulseArgs;
use crate::config::{apply_config, load_config};
use crate::error::AppResult;

pub(crate) fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(app::run_command(args))
}

fn parse_args() -> AppResult<(PulseArgs, ArgMatches)> {
    let matches = PulseArgs::command().get_matches();
    let args = PulseArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}
