use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::{process::Command, time::timeout};
use tracing::debug;

/// Environment variable the CLI reads to select its configuration state.
pub const CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);
const STDERR_PREVIEW_LIMIT: usize = 200;

/// Contract for issuing the minimal keepalive action for one account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeepaliveSender: Send + Sync {
    async fn send_prompt(&self, config_dir: &Path) -> Result<()>;
}

/// Sends the prompt by invoking the external CLI binary, scoped to the
/// account's config directory through [CONFIG_DIR_ENV].
pub struct PromptSender {
    claude_bin: PathBuf,
    model: String,
    prompt: String,
    timeout: Duration,
}

impl PromptSender {
    pub fn new(claude_bin: PathBuf, model: String, prompt: String) -> Self {
        Self {
            claude_bin,
            model,
            prompt,
            timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl KeepaliveSender for PromptSender {
    /// Runs the CLI once with a bounded execution time. Non-zero exit and
    /// timeout are both failures; there is no retry.
    async fn send_prompt(&self, config_dir: &Path) -> Result<()> {
        debug!("Invoking {:?} for {:?}", self.claude_bin, config_dir);
        let child = Command::new(&self.claude_bin)
            .arg("-p")
            .arg(&self.prompt)
            .arg("--model")
            .arg(&self.model)
            .env(CONFIG_DIR_ENV, config_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => Ok(()),
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let preview: String = stderr.chars().take(STDERR_PREVIEW_LIMIT).collect();
                bail!(
                    "prompt command exited with {}: {}",
                    output.status,
                    preview.trim()
                )
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => bail!("prompt command timed out after {:?}", self.timeout),
        }
    }
}
