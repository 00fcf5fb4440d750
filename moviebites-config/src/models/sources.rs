use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::env;
use crate::util::non_empty;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub api: FileApiConfig,
    #[serde(default)]
    pub identity: FileIdentityConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Humantime duration, e.g. `"10s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileIdentityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Option<String>,
    pub identity_path: Option<PathBuf>,
}

impl EnvConfig {
    /// Snapshot the process environment.
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| non_empty(lookup(name));
        Self {
            config_path: var(env::CONFIG_PATH).map(PathBuf::from),
            api_url: var(env::API_URL).or_else(|| var(env::LEGACY_API_URL)),
            api_key: var(env::API_KEY).or_else(|| var(env::LEGACY_API_KEY)),
            timeout: var(env::TIMEOUT),
            identity_path: var(env::IDENTITY_PATH).map(PathBuf::from),
        }
    }
}
