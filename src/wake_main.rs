use anyhow::Result;
use clap::Parser;
use keepwarm::{
    config::load_config,
    utils::{
        clock::{Clock, DefaultClock},
        dir::default_config_path,
        logging::enable_logging,
        runtime::single_thread_runtime,
    },
    wake::{args::WakeArgs, pmset::Pmset, schedule_day_of_wakes},
};
use tracing::error;

fn main() -> Result<()> {
    let args = WakeArgs::parse();

    // The config is only consulted for the log file location. Scheduling
    // itself needs nothing from it, so a missing config is not an error here.
    let log_file = args
        .config
        .map_or_else(default_config_path, Ok)
        .ok()
        .and_then(|path| load_config(&path).ok())
        .and_then(|config| config.log_file);
    enable_logging(log_file.as_deref(), args.log)?;

    single_thread_runtime()?.block_on(async {
        schedule_day_of_wakes(&Pmset, DefaultClock.now_local())
            .await
            .inspect_err(|e| {
                error!("Error scheduling wake events {e:?}");
            })
    })?;
    Ok(())
}
