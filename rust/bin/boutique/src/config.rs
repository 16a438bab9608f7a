//! Client configuration at `~/.boutique/config.toml`.

use std::path::{Path, PathBuf};

use boutique_session::SessionConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// REST API base URL (e.g. "http://localhost:8000").
    #[serde(rename = "api-url", default, skip_serializing_if = "String::is_empty")]
    pub api_url: String,

    /// Path to the redb file holding the session.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub store: String,
}

impl ClientConfig {
    /// Default config file path: ~/.boutique/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Session settings: defaults, then this file, then `BOUTIQUE_*`
    /// environment variables, then the `--api-url` flag.
    pub fn session_config(&self, api_url: Option<&str>) -> SessionConfig {
        let mut args = Vec::new();
        if !self.api_url.is_empty() {
            args.push(format!("--api-url={}", self.api_url));
        }
        if !self.store.is_empty() {
            args.push(format!("--store={}", self.store));
        }
        let mut config = SessionConfig::from_args(&args).merge_lookup(|key| std::env::var(key).ok());
        if let Some(url) = api_url {
            config = config.merge_args(&[format!("--api-url={}", url)]);
        }
        if config.store_path.is_none() {
            config.store_path = Some(dirs_path().join("session.redb"));
        }
        config
    }
}

/// Return the boutique config directory (~/.boutique).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".boutique")
}
