use std::{ffi::OsStr, path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Sets up the global subscriber. Output always goes to stdout; when a log
/// file is configured it is appended to as well (the parent directory is
/// created on demand).
pub fn enable_logging(log_file: Option<&Path>, log_level: Option<LevelFilter>) -> Result<()> {
    let level = log_level
        .map(|v| v.to_string())
        .unwrap_or_else(|| std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));

    let filter = tracing_subscriber::EnvFilter::new(format!(
        "{}={level}",
        env!("CARGO_PKG_NAME").replace("-", "_"),
    ));

    match log_file {
        Some(log_file) => {
            let dir = log_file.parent().unwrap_or(Path::new("."));
            std::fs::create_dir_all(dir)?;
            let file_name = log_file
                .file_name()
                .unwrap_or_else(|| OsStr::new("keepwarm.log"));
            let appender = tracing_appender::rolling::never(dir, file_name);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stdout.and(appender))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});
