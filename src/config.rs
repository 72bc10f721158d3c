use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Primary corpus directory. Must exist; scanned recursively.
    pub abstracts_dir: PathBuf,
    /// Optional legacy directory of claim-set documents. Missing is fine.
    #[serde(default)]
    pub demos_dir: Option<PathBuf>,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.json".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// API key table: key string → holder metadata. An empty table
    /// disables authentication entirely.
    #[serde(default)]
    pub keys: HashMap<String, ApiKeyInfo>,
    /// Referer prefix that bypasses the key check (known internal host).
    #[serde(default)]
    pub internal_referer: Option<String>,
}

/// Metadata attached to an API key. The rate-limit figure is carried for
/// operators but not enforced by this server.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiKeyInfo {
    pub name: String,
    #[serde(default = "default_tier")]
    pub tier: String,
    #[serde(default)]
    pub requests_per_hour: Option<u64>,
}

fn default_tier() -> String {
    "free".to_string()
}

impl AuthConfig {
    pub fn is_enabled(&self) -> bool {
        !self.keys.is_empty()
    }
}

impl Config {
    /// Config pointing at a corpus directory, with everything else
    /// defaulted. Used by tests and as a CLI fallback.
    pub fn with_data_dir(abstracts_dir: impl Into<PathBuf>) -> Self {
        Self {
            data: DataConfig {
                abstracts_dir: abstracts_dir.into(),
                demos_dir: None,
                include_globs: default_include_globs(),
            },
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.data.include_globs.is_empty() {
        anyhow::bail!("data.include_globs must not be empty");
    }

    if config.server.bind.is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    for (key, info) in &config.auth.keys {
        if key.is_empty() {
            anyhow::bail!("auth.keys must not contain an empty key");
        }
        if info.name.is_empty() {
            anyhow::bail!("auth.keys entry '{}' must have a non-empty name", key);
        }
    }

    Ok(config)
}
