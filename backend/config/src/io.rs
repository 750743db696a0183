//! Config file location and loading.

use crate::schema::WardenConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the Warden config directory.
/// Priority: `WARDEN_CONFIG_DIR` env > `~/.warden/` > `./.warden`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("WARDEN_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".warden"),
        None => PathBuf::from(".warden"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<WardenConfig> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(WardenConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Parse config YAML. An empty document is the default config.
pub fn parse_config(raw: &str) -> Result<WardenConfig> {
    if raw.trim().is_empty() {
        return Ok(WardenConfig::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}
