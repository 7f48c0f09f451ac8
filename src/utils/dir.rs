use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Default location of the config file, relative to the platform config
/// directory.
pub fn default_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("Couldn't determine a user config directory")?;
    path.push("keepwarm");
    path.push("config.json");
    Ok(path)
}

/// Expands a leading `~` against the user's home directory. Paths without the
/// prefix are returned unchanged.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return path.to_path_buf();
    };
    if path == Path::new("~") {
        return home;
    }
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}
