use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::dir::expand_tilde;

fn default_claude_bin() -> PathBuf {
    PathBuf::from("/usr/local/bin/claude")
}

fn default_model() -> String {
    "claude-haiku-4-5".into()
}

fn default_prompt() -> String {
    "hi".into()
}

fn default_api_base_url() -> String {
    "https://claude.ai".into()
}

fn default_windows() -> Vec<String> {
    vec!["five_hour".into()]
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_claude_bin")]
    pub claude_bin: PathBuf,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Seconds to wait before the first network call. Useful when the run is
    /// triggered right after a scheduled wake and the network isn't up yet.
    #[serde(default)]
    pub startup_delay_secs: u64,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct Account {
    pub name: String,
    pub config_dir: PathBuf,
    #[serde(default)]
    pub org_id: String,
    #[serde(default)]
    pub session_key: String,
    /// Usage windows whose reset boundary should be kept alive.
    #[serde(default = "default_windows")]
    pub windows: Vec<String>,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Couldn't read config file {path:?}"))?;
    let mut config: Config = serde_json::from_str(&raw)
        .with_context(|| format!("Couldn't parse config file {path:?}"))?;

    config.log_file = config.log_file.map(|v| expand_tilde(&v));
    for account in &mut config.accounts {
        account.config_dir = expand_tilde(&account.config_dir);
    }

    Ok(config)
}
