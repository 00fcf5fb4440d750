pub mod error;

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;

use crate::{
    constants::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, CONFIG_FILE_NAME},
    models::{
        ClientConfig, ConfigMetadata,
        sources::{EnvConfig, FileConfig},
    },
    util::{non_empty, normalize_base_url, parse_timeout},
};

pub use error::ConfigLoadError;

fn default_config_locations() -> Vec<PathBuf> {
    let mut locations = vec![
        PathBuf::from(CONFIG_FILE_NAME),
        Path::new("config").join(CONFIG_FILE_NAME),
    ];
    if let Some(dirs) =
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
    {
        locations.push(dirs.config_dir().join(CONFIG_FILE_NAME));
    }
    locations
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Skip the implicit `.env` lookup in the working directory.
    pub skip_env_file: bool,
}

/// Outcome of a successful load.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: ClientConfig,
    pub metadata: ConfigMetadata,
    pub warnings: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn without_env_file(mut self) -> Self {
        self.options.skip_env_file = true;
        self
    }

    /// Load `.env`, snapshot the process environment and compose the
    /// effective configuration.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = self.load_env_file()?;
        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Compose configuration from an explicit environment snapshot.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let mut load = self.compose_config(file_config, env)?;
        load.metadata.config_path = config_path;
        Ok(load)
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        let result = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path),
            None if self.options.skip_env_file => return Ok(false),
            None => dotenvy::dotenv().map(|_| ()),
        };
        match result {
            Ok(()) => Ok(true),
            Err(err) if err.not_found() => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match default_config_locations()
                .into_iter()
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => return Ok((None, None)),
            },
        };

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        log::debug!("[Config] Loaded {}", path.display());
        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let mut warnings = Vec::new();
        let FileConfig {
            api: file_api,
            identity: file_identity,
        } = file_config.unwrap_or_default();
        let defaults = ClientConfig::default();

        let base_url = match env.api_url.or(non_empty(file_api.base_url)) {
            Some(raw) => normalize_base_url(&raw)?,
            None => defaults.base_url,
        };

        let api_key = env.api_key.or(non_empty(file_api.api_key));
        if api_key.is_none() {
            warnings.push(
                "No mobile API key configured; requests are sent without X-API-KEY"
                    .to_string(),
            );
        }

        let timeout = match env.timeout.or(non_empty(file_api.timeout)) {
            Some(raw) => parse_timeout(&raw)?,
            None => defaults.timeout,
        };

        let identity_path = env.identity_path.or(file_identity.path);

        Ok(ConfigLoad {
            config: ClientConfig {
                base_url,
                api_key,
                timeout,
                identity_path,
            },
            metadata: ConfigMetadata::default(),
            warnings,
        })
    }
}
