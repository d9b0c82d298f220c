//! Runtime configuration.
//!
//! # Responsibility
//! - Describe remote store credentials and local fallback settings.
//! - Load settings from a JSON file or from `FOLIO_*` environment variables.
//!
//! # Invariants
//! - A remote config is complete only when `api_key` and `database_url` are
//!   both present and non-blank.
//! - Secrets are never included in `Display`/log output.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_KEY: &str = "FOLIO_API_KEY";
pub const ENV_DATABASE_URL: &str = "FOLIO_DATABASE_URL";
pub const ENV_AUTH_DOMAIN: &str = "FOLIO_AUTH_DOMAIN";
pub const ENV_PROJECT_ID: &str = "FOLIO_PROJECT_ID";
pub const ENV_AUTH_TOKEN: &str = "FOLIO_AUTH_TOKEN";
pub const ENV_DB_PATH: &str = "FOLIO_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "FOLIO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FOLIO_LOG_DIR";
pub const ENV_POLL_INTERVAL_MS: &str = "FOLIO_POLL_INTERVAL_MS";
pub const ENV_MAX_PROFILE_IMAGE_BYTES: &str = "FOLIO_MAX_PROFILE_IMAGE_BYTES";

const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_DB_FILE_NAME: &str = "folio.sqlite3";

/// Configuration load/validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingField(&'static str),
    InvalidValue { field: &'static str, message: String },
    Read { path: PathBuf, message: String },
    Parse(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required config field `{field}`"),
            Self::InvalidValue { field, message } => {
                write!(f, "invalid value for `{field}`: {message}")
            }
            Self::Read { path, message } => {
                write!(f, "failed to read config `{}`: {message}", path.display())
            }
            Self::Parse(message) => write!(f, "failed to parse config: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Remote realtime store settings (`apiKey` / `databaseURL` style).
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteConfig {
    pub api_key: Option<String>,
    #[serde(alias = "databaseURL")]
    pub database_url: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    /// ID token or database secret sent as the REST `auth` parameter.
    /// The web `apiKey` is not a credential for database requests.
    #[serde(alias = "databaseSecret")]
    pub auth_token: Option<String>,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_key", &self.api_key().map(|_| "<redacted>"))
            .field("database_url", &self.database_url)
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("auth_token", &self.auth_token().map(|_| "<redacted>"))
            .finish()
    }
}

impl RemoteConfig {
    pub fn new(api_key: impl Into<String>, database_url: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            database_url: Some(database_url.into()),
            ..Self::default()
        }
    }

    /// Trimmed API key, `None` when absent or blank.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }

    pub fn with_auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.auth_token = Some(auth_token.into());
        self
    }

    /// Trimmed request credential, `None` when absent or blank.
    pub fn auth_token(&self) -> Option<&str> {
        non_blank(self.auth_token.as_deref())
    }

    /// Trimmed database URL, `None` when absent or blank.
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_deref())
    }

    /// Checks that every field required for a remote backend is set.
    pub fn check_complete(&self) -> Result<(), ConfigError> {
        if self.api_key().is_none() {
            return Err(ConfigError::MissingField("apiKey"));
        }
        if self.database_url().is_none() {
            return Err(ConfigError::MissingField("databaseURL"));
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.check_complete().is_ok()
    }
}

/// Top-level configuration for one running client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FolioConfig {
    pub remote: RemoteConfig,
    /// SQLite file backing the local fallback store.
    pub local_db_path: Option<PathBuf>,
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// Interval between remote change checks while subscribed.
    pub poll_interval_ms: u64,
    /// Upper bound for embedded profile images; `None` disables the check.
    pub max_profile_image_bytes: Option<usize>,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            local_db_path: None,
            log_level: None,
            log_dir: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_profile_image_bytes: None,
        }
    }
}

impl FolioConfig {
    /// Parses a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    /// Builds config from `FOLIO_*` process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let poll_interval_ms = match lookup(ENV_POLL_INTERVAL_MS) {
            Some(raw) => parse_number(ENV_POLL_INTERVAL_MS, &raw)?,
            None => DEFAULT_POLL_INTERVAL_MS,
        };
        let max_profile_image_bytes = lookup(ENV_MAX_PROFILE_IMAGE_BYTES)
            .map(|raw| parse_number(ENV_MAX_PROFILE_IMAGE_BYTES, &raw))
            .transpose()?;

        let config = Self {
            remote: RemoteConfig {
                api_key: lookup(ENV_API_KEY),
                database_url: lookup(ENV_DATABASE_URL),
                auth_domain: lookup(ENV_AUTH_DOMAIN),
                project_id: lookup(ENV_PROJECT_ID),
                auth_token: lookup(ENV_AUTH_TOKEN),
            },
            local_db_path: lookup(ENV_DB_PATH).map(PathBuf::from),
            log_level: lookup(ENV_LOG_LEVEL),
            log_dir: lookup(ENV_LOG_DIR).map(PathBuf::from),
            poll_interval_ms,
            max_profile_image_bytes,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Local store path, defaulting to `folio.sqlite3` in the working directory.
    pub fn local_db_path(&self) -> PathBuf {
        self.local_db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pollIntervalMs",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_number<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|err| ConfigError::InvalidValue {
            field,
            message: err.to_string(),
        })
}
