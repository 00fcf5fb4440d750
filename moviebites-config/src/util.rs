use std::time::Duration;

use url::Url;

use crate::ConfigLoadError;

/// Trim a raw value and drop it when nothing is left.
pub fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Normalize a user-supplied base URL.
///
/// Adds `http://` when no scheme is present and trims trailing slashes so
/// route paths can be appended verbatim. The result must parse as a URL.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigLoadError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let with_scheme = if trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
    {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    Url::parse(&with_scheme).map_err(|source| {
        ConfigLoadError::InvalidBaseUrl {
            value: raw.to_string(),
            source,
        }
    })?;

    if with_scheme != raw {
        log::warn!(
            "[Config] Normalized base URL from '{}' to '{}'",
            raw,
            with_scheme
        );
    }
    Ok(with_scheme)
}

/// Parse a humantime duration such as `10s` or `1m 30s`.
pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigLoadError> {
    humantime::parse_duration(raw.trim()).map_err(|source| {
        ConfigLoadError::InvalidTimeout {
            value: raw.to_string(),
            source,
        }
    })
}
