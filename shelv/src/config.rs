//! Configuration for the Shelv client and resolver.
//!
//! Configuration is an explicit value handed to [`HttpShelvClient::new`]; the
//! archive polling defaults travel with the client so the resolver can fall
//! back to them when a request leaves an override unset.
//!
//! Values can be built in code, read from the environment, or loaded from an
//! INI file with a `[shelv]` section:
//!
//! ```ini
//! [shelv]
//! api_url = https://api.shelv.dev
//! api_key = sk_live_...
//! archive_ttl_secs = 600
//! poll_interval_ms = 3000
//! max_poll_attempts = 20
//! request_timeout_secs = 30
//! ```
//!
//! [`HttpShelvClient::new`]: crate::client::HttpShelvClient::new

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

/// Default Shelv API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.shelv.dev";

/// Default lifetime requested for archive download URLs (seconds).
pub const DEFAULT_ARCHIVE_TTL_SECS: u64 = 600;

/// Default minimum delay between archive readiness polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3_000);

/// Default number of readiness polls before giving up.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 20;

/// Default timeout for individual HTTP requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// INI section holding Shelv settings.
const CONFIG_SECTION: &str = "shelv";

/// Errors raised while building configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or parsed.
    #[error("failed to load config file {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// No API key was provided.
    #[error("missing Shelv API key (set {0})")]
    MissingApiKey(&'static str),

    /// A setting had an unusable value.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Archive polling defaults applied when a request leaves them unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveDefaults {
    pub ttl_secs: u64,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
}

impl Default for ArchiveDefaults {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_ARCHIVE_TTL_SECS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

/// Configuration for talking to the Shelv API.
#[derive(Clone)]
pub struct ShelvConfig {
    /// API base URL without a trailing slash.
    pub api_base_url: String,

    /// Bearer token sent with every API request.
    pub api_key: String,

    /// Archive polling defaults.
    pub archive: ArchiveDefaults,

    /// Timeout for each HTTP request.
    pub request_timeout: Duration,
}

impl fmt::Debug for ShelvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShelvConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &"<redacted>")
            .field("archive", &self.archive)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ShelvConfig {
    /// Create a configuration for the default endpoint with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: api_key.into(),
            archive: ArchiveDefaults::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set the API base URL. A single trailing `/` is removed.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.api_base_url = url.strip_suffix('/').map(str::to_string).unwrap_or(url);
        self
    }

    /// Set the default archive URL lifetime.
    pub fn with_archive_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.archive.ttl_secs = ttl_secs;
        self
    }

    /// Set the default minimum delay between readiness polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.archive.poll_interval = interval;
        self
    }

    /// Set the default number of readiness polls.
    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.archive.max_poll_attempts = attempts;
        self
    }

    /// Set the per-request HTTP timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build a configuration from `SHELV_*` environment variables.
    ///
    /// | Variable                  | Meaning                          |
    /// |---------------------------|----------------------------------|
    /// | `SHELV_API_KEY`           | API key (required)               |
    /// | `SHELV_API_URL`           | API base URL                     |
    /// | `SHELV_ARCHIVE_TTL_SECS`  | Default archive URL lifetime     |
    /// | `SHELV_POLL_INTERVAL_MS`  | Default poll interval            |
    /// | `SHELV_MAX_POLL_ATTEMPTS` | Default poll attempts            |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup using the
    /// environment variable names of [`ShelvConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("SHELV_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey("SHELV_API_KEY"))?;

        let mut config = Self::new(api_key);
        if let Some(url) = lookup("SHELV_API_URL") {
            config = config.with_api_base_url(url);
        }
        if let Some(value) = lookup("SHELV_ARCHIVE_TTL_SECS") {
            config.archive.ttl_secs = parse_positive("SHELV_ARCHIVE_TTL_SECS", &value)?;
        }
        if let Some(value) = lookup("SHELV_POLL_INTERVAL_MS") {
            config.archive.poll_interval =
                Duration::from_millis(parse_positive("SHELV_POLL_INTERVAL_MS", &value)?);
        }
        if let Some(value) = lookup("SHELV_MAX_POLL_ATTEMPTS") {
            config.archive.max_poll_attempts =
                parse_positive("SHELV_MAX_POLL_ATTEMPTS", &value)?;
        }
        Ok(config)
    }

    /// Load a configuration from the `[shelv]` section of an INI file.
    ///
    /// `SHELV_API_KEY` in the environment is used when the file has no
    /// `api_key` entry, so keys can stay out of config files.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_ini(&ini, |key| std::env::var(key).ok())
    }

    fn from_ini<F>(ini: &Ini, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let section = ini.section(Some(CONFIG_SECTION));
        let get = |key: &str| section.and_then(|s| s.get(key)).map(str::trim);

        let api_key = get("api_key")
            .map(str::to_string)
            .or_else(|| env("SHELV_API_KEY"))
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey("api_key or SHELV_API_KEY"))?;

        let mut config = Self::new(api_key);
        if let Some(url) = get("api_url") {
            config = config.with_api_base_url(url);
        }
        if let Some(value) = get("archive_ttl_secs") {
            config.archive.ttl_secs = parse_positive("archive_ttl_secs", value)?;
        }
        if let Some(value) = get("poll_interval_ms") {
            config.archive.poll_interval =
                Duration::from_millis(parse_positive("poll_interval_ms", value)?);
        }
        if let Some(value) = get("max_poll_attempts") {
            config.archive.max_poll_attempts = parse_positive("max_poll_attempts", value)?;
        }
        if let Some(value) = get("request_timeout_secs") {
            config.request_timeout =
                Duration::from_secs(parse_positive("request_timeout_secs", value)?);
        }
        Ok(config)
    }
}

/// Default location of the config file (`<config dir>/shelv/config.ini`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("shelv").join("config.ini"))
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default,
{
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let parsed = value
        .trim()
        .parse::<T>()
        .map_err(|_| invalid("expected a positive integer"))?;
    if parsed == T::default() {
        return Err(invalid("must be greater than zero"));
    }
    Ok(parsed)
}
