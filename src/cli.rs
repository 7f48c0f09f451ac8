use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::{
    config::load_config, keepalive::run_keepalive, utils::dir::default_config_path,
    utils::logging::enable_logging,
};

#[derive(Parser, Debug)]
#[command(name = "keepwarm", version)]
#[command(about = "Keeps account usage windows warm against the reset boundary")]
struct Args {
    #[arg(long, help = "Config file. Defaults to the keepwarm config path")]
    config: Option<PathBuf>,
    #[arg(long, help = "Send the keepalive regardless of recorded reset boundaries")]
    force: bool,
    /// This option is for debugging purposes only.
    #[arg(long = "log-filter")]
    log: Option<LevelFilter>,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.map_or_else(default_config_path, Ok)?;
    let config = load_config(&config_path)?;

    enable_logging(config.log_file.as_deref(), args.log)?;

    run_keepalive(&config, args.force).await
}
