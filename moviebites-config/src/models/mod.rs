pub mod sources;

use std::{fmt, path::PathBuf, time::Duration};

use directories::ProjectDirs;

use crate::constants::{
    APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, DEFAULT_BASE_URL,
    DEFAULT_TIMEOUT, IDENTITY_FILE_NAME,
};

/// Effective client configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Normalized base URL without a trailing slash.
    pub base_url: String,
    /// Sent as `X-API-KEY` on every request when present.
    pub api_key: Option<String>,
    /// Transport timeout for a whole request.
    pub timeout: Duration,
    /// Explicit identity store location; `None` means the platform data
    /// directory.
    pub identity_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            identity_path: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("identity_path", &self.identity_path)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration pointing at `base_url` with every other field defaulted.
    /// The URL is used as given; run it through
    /// [`crate::util::normalize_base_url`] first when it comes from a user.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_identity_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_path = Some(path.into());
        self
    }

    /// Where the file-backed identity store lives.
    ///
    /// Returns `None` only when no explicit path is set and the platform has
    /// no resolvable home directory.
    pub fn resolved_identity_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.identity_path {
            return Some(path.clone());
        }
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join(IDENTITY_FILE_NAME))
    }
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
