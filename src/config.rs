//! Environment configuration.
//!
//! Settings are read once at start-up through an [`EnvSource`], so tests can
//! supply a fixed map instead of the process environment.

use camino::Utf8PathBuf;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Shared password of the entry gate.
pub const AUTH_PASSWORD_VAR: &str = "LASERTRACK_AUTH_PASSWORD";
/// Endpoint of the hosted store.
pub const STORE_URL_VAR: &str = "LASERTRACK_STORE_URL";
/// Access key of the hosted store.
pub const STORE_KEY_VAR: &str = "LASERTRACK_STORE_KEY";
/// Notification poll period in seconds.
pub const POLL_INTERVAL_VAR: &str = "LASERTRACK_POLL_INTERVAL_SECS";
/// Deadline of a single store call in seconds.
pub const REMOTE_TIMEOUT_VAR: &str = "LASERTRACK_REMOTE_TIMEOUT_SECS";
/// Directory of the device-local state.
pub const STATE_DIR_VAR: &str = "LASERTRACK_STATE_DIR";
/// `tracing` filter directives.
pub const LOG_FILTER_VAR: &str = "LASERTRACK_LOG";
/// Log output format.
pub const LOG_FORMAT_VAR: &str = "LASERTRACK_LOG_FORMAT";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STATE_DIR: &str = ".lasertrack";
const DEFAULT_LOG_FILTER: &str = "info";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable holds a value that cannot be used.
    #[error("{var} is invalid: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// Source of configuration variables.
pub trait EnvSource {
    /// Returns the value of `name`, if set.
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed variables, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    /// Creates an empty source.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vars: BTreeMap::new(),
        }
    }

    /// Sets a variable.
    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_owned(), value.to_owned());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl TryFrom<&str> for LogFormat {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Invalid {
                var: LOG_FORMAT_VAR,
                reason: format!("expected text or json, got '{other}'"),
            }),
        }
    }
}

/// A value kept out of `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret text.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Entry gate password.
    pub auth_password: Secret,
    /// Hosted store endpoint.
    pub store_url: Url,
    /// Hosted store access key.
    pub store_key: Secret,
    /// Notification poll period.
    pub poll_interval: Duration,
    /// Deadline of a single store call.
    pub remote_timeout: Duration,
    /// Device-local state directory.
    pub state_dir: Utf8PathBuf,
    /// `tracing` filter directives.
    pub log_filter: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Self::from_source`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    /// Reads settings from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when a required variable is absent
    /// and [`ConfigError::Invalid`] when a value cannot be parsed.
    pub fn from_source(source: &impl EnvSource) -> Result<Self, ConfigError> {
        let store_url_raw = required(source, STORE_URL_VAR)?;
        let store_url = Url::parse(&store_url_raw).map_err(|err| ConfigError::Invalid {
            var: STORE_URL_VAR,
            reason: err.to_string(),
        })?;
        Ok(Self {
            auth_password: Secret::new(required(source, AUTH_PASSWORD_VAR)?),
            store_url,
            store_key: Secret::new(required(source, STORE_KEY_VAR)?),
            poll_interval: seconds(source, POLL_INTERVAL_VAR, DEFAULT_POLL_INTERVAL_SECS)?,
            remote_timeout: seconds(source, REMOTE_TIMEOUT_VAR, DEFAULT_REMOTE_TIMEOUT_SECS)?,
            state_dir: optional(source, STATE_DIR_VAR)
                .map_or_else(|| Utf8PathBuf::from(DEFAULT_STATE_DIR), Utf8PathBuf::from),
            log_filter: optional(source, LOG_FILTER_VAR)
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
            log_format: optional(source, LOG_FORMAT_VAR)
                .map_or(Ok(LogFormat::default()), |raw| LogFormat::try_from(raw.as_str()))?,
        })
    }
}

fn optional(source: &impl EnvSource, var: &str) -> Option<String> {
    source
        .var(var)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn required(source: &impl EnvSource, var: &'static str) -> Result<String, ConfigError> {
    optional(source, var).ok_or(ConfigError::Missing(var))
}

fn seconds(source: &impl EnvSource, var: &'static str, default: u64) -> Result<Duration, ConfigError> {
    let Some(raw) = optional(source, var) else {
        return Ok(Duration::from_secs(default));
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            var,
            reason: "must be at least one second".to_owned(),
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(err) => Err(ConfigError::Invalid {
            var,
            reason: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn minimal() -> MapEnv {
        MapEnv::new()
            .with(AUTH_PASSWORD_VAR, "laser")
            .with(STORE_URL_VAR, "https://store.example.com")
            .with(STORE_KEY_VAR, "anon-key")
    }

    #[rstest]
    fn defaults_fill_optional_settings(minimal: MapEnv) {
        let config = AppConfig::from_source(&minimal).expect("config");

        assert_eq!(config.auth_password.expose(), "laser");
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert_eq!(config.remote_timeout, Duration::from_secs(10));
        assert_eq!(config.state_dir, Utf8PathBuf::from(".lasertrack"));
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[rstest]
    #[case(AUTH_PASSWORD_VAR)]
    #[case(STORE_URL_VAR)]
    #[case(STORE_KEY_VAR)]
    fn required_variables_are_reported(minimal: MapEnv, #[case] var: &'static str) {
        let source = minimal.with(var, "  ");
        assert_eq!(
            AppConfig::from_source(&source),
            Err(ConfigError::Missing(var))
        );
    }

    #[rstest]
    #[case(POLL_INTERVAL_VAR, "0")]
    #[case(REMOTE_TIMEOUT_VAR, "soon")]
    #[case(STORE_URL_VAR, "not a url")]
    #[case(LOG_FORMAT_VAR, "xml")]
    fn unusable_values_are_rejected(minimal: MapEnv, #[case] var: &'static str, #[case] value: &str) {
        let result = AppConfig::from_source(&minimal.with(var, value));
        assert!(matches!(result, Err(ConfigError::Invalid { var: found, .. }) if found == var));
    }

    #[rstest]
    fn overrides_are_applied(minimal: MapEnv) {
        let source = minimal
            .with(POLL_INTERVAL_VAR, "30")
            .with(LOG_FORMAT_VAR, "JSON")
            .with(STATE_DIR_VAR, "/var/lib/lasertrack");
        let config = AppConfig::from_source(&source).expect("config");

        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.state_dir, Utf8PathBuf::from("/var/lib/lasertrack"));
    }

    #[rstest]
    fn secrets_stay_out_of_debug_output(minimal: MapEnv) {
        let config = AppConfig::from_source(&minimal).expect("config");
        let rendered = format!("{config:?}");

        assert!(!rendered.contains("laser\""));
        assert!(!rendered.contains("anon-key"));
        assert!(rendered.contains("REDACTED"));
    }
}
