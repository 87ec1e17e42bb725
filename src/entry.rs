use clap::{CommandFactory, FromArgMatches};

use crate::args::MonitorArgs;
use crate::error::AppResult;

pub(crate) fn run() -> AppResult<()> {
    let matches = MonitorArgs::command().get_matches_from(std::env::args_os());
    let mut args = MonitorArgs::from_arg_matches(&matches)?;

    if let Some(config) = crate::config::load_config(args.config.as_deref())? {
        crate::config::apply_config(&mut args, &matches, &config);
    }

    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(crate::app::run(args));
    // A pending read on interactive stdin would otherwise block runtime
    // teardown indefinitely.
    runtime.shutdown_background();
    result
}
