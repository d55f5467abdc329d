use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::fallback::PLACEHOLDER_SIZE;
use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub widget: WidgetConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Client-side settings for the polling widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Playlist endpoint polled every refresh.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Substitute placeholder data when the endpoint fails. When off, a
    /// failed fetch shows the error view instead.
    #[serde(default = "default_allow_fallback")]
    pub allow_fallback: bool,
    #[serde(default = "default_fallback_size")]
    pub fallback_size: usize,
}

/// Settings for the playlist API daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// `limit` used when a request does not give one.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Upper bound applied to any requested `limit`.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    /// Entries the in-memory history is seeded with at startup.
    #[serde(default = "default_seed_entries")]
    pub seed_entries: usize,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            allow_fallback: default_allow_fallback(),
            fallback_size: default_fallback_size(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            seed_entries: default_seed_entries(),
        }
    }
}

fn default_endpoint() -> String {
    format!("http://{}:{}/api/playlist", default_bind_address(), default_port())
}

fn default_allow_fallback() -> bool {
    true
}

fn default_fallback_size() -> usize {
    PLACEHOLDER_SIZE
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8990
}

fn default_limit() -> usize {
    100
}

fn default_max_limit() -> usize {
    1000
}

fn default_seed_entries() -> usize {
    50
}

impl Config {
    /// Load from the default path, writing a default file on first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
