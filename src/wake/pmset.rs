use std::process::Stdio;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::process::Command;
use tracing::debug;

/// Time format `pmset schedule` accepts: MM/DD/YY HH:MM:SS.
pub const WAKE_TIME_FORMAT: &str = "%m/%d/%y %H:%M:%S";

/// Contract for the OS power manager the wake schedule is registered with.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PowerManager: Send + Sync {
    /// Cancels every wake schedule currently registered.
    async fn clear_all(&self) -> Result<()>;

    /// Registers a single wake timestamp.
    async fn schedule_wake(&self, wake_time: DateTime<Local>) -> Result<()>;
}

/// [PowerManager] backed by the macOS `pmset` tool. Scheduling requires root,
/// so calls go through `sudo`.
pub struct Pmset;

#[async_trait]
impl PowerManager for Pmset {
    async fn clear_all(&self) -> Result<()> {
        run_pmset(&["schedule", "cancelall"]).await
    }

    async fn schedule_wake(&self, wake_time: DateTime<Local>) -> Result<()> {
        let time_str = wake_time.format(WAKE_TIME_FORMAT).to_string();
        run_pmset(&["schedule", "wake", &time_str]).await
    }
}

async fn run_pmset(args: &[&str]) -> Result<()> {
    debug!("Running pmset {}", args.join(" "));
    let output = Command::new("sudo")
        .arg("pmset")
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pmset {} failed with {}: {}",
            args.join(" "),
            output.status,
            stderr.trim()
        );
    }
    Ok(())
}
