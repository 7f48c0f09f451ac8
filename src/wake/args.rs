use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "keepwarm-wakes", version)]
#[command(about = "Schedules hourly OS wake events so keepalive checks run while the machine sleeps")]
pub struct WakeArgs {
    /// Config file to read the log file location from. Defaults to the
    /// keepwarm config path; scheduling works without one.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
}
