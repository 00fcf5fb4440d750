//! Built-in configuration defaults and environment variable names.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://moviebites-api.rishi-300.workers.dev";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const CONFIG_FILE_NAME: &str = "moviebites.toml";
pub const IDENTITY_FILE_NAME: &str = "identity.json";
pub const APP_QUALIFIER: &str = "";
pub const APP_ORGANIZATION: &str = "moviebites";
pub const APP_NAME: &str = "moviebites";

pub mod env {
    pub const CONFIG_PATH: &str = "MOVIEBITES_CONFIG";
    pub const API_URL: &str = "MOVIEBITES_API_URL";
    pub const API_KEY: &str = "MOVIEBITES_API_KEY";
    pub const TIMEOUT: &str = "MOVIEBITES_TIMEOUT";
    pub const IDENTITY_PATH: &str = "MOVIEBITES_IDENTITY_PATH";

    /// Names used by the Expo build of the mobile app; honoured as
    /// fallbacks so one `.env` can serve both.
    pub const LEGACY_API_URL: &str = "EXPO_PUBLIC_API_URL";
    pub const LEGACY_API_KEY: &str = "EXPO_PUBLIC_MOBILE_API_KEY";
}
