//! Client configuration.
//!
//! Settings are read from a JSON file, either the path given with
//! `--config` or `<config_dir>/pomodoro-sync/config.json`. Every field has a
//! default, so a partial file (or no file at all) is valid. Command line flags
//! are applied on top by the binary.
//!
//! ```
//! use pomodoro_sync::config::{ClientConfig, TickFailurePolicy};
//!
//! let config = ClientConfig::default();
//! assert_eq!(config.server_url, "http://127.0.0.1:8000");
//! assert_eq!(config.tick_failure_policy, TickFailurePolicy::Continue);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Directory name under the platform config dir.
const CONFIG_DIR_NAME: &str = "pomodoro-sync";

/// File name of the config file.
const CONFIG_FILE_NAME: &str = "config.json";

fn default_server_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_tick_interval_ms() -> u64 {
    1000
}

// ============================================================================
// TickFailurePolicy
// ============================================================================

/// What the tick loop does when a tick request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TickFailurePolicy {
    /// Keep the loop and try again on the next scheduled tick
    #[default]
    Continue,
    /// Stop the loop on the first failure
    Stop,
    /// Stop the loop after this many consecutive failures
    StopAfter {
        /// Consecutive failures tolerated before stopping (at least 1)
        failures: u32,
    },
}

impl TickFailurePolicy {
    /// Returns true if the loop should stop after `consecutive` failures in a row.
    pub fn should_stop(&self, consecutive: u32) -> bool {
        match self {
            TickFailurePolicy::Continue => false,
            TickFailurePolicy::Stop => consecutive >= 1,
            TickFailurePolicy::StopAfter { failures } => consecutive >= *failures,
        }
    }
}

// ============================================================================
// ConfigError
// ============================================================================

/// Errors raised while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("設定ファイルを読み込めません: {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON for this schema
    #[error("設定ファイルの形式が不正です: {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of range
    #[error("設定値が不正です: {0}")]
    Invalid(String),
}

// ============================================================================
// ClientConfig
// ============================================================================

/// Settings for talking to the authority and driving the tick loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the authority
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Attempts for idempotent requests (read/start/reset)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base retry delay in milliseconds, multiplied by the attempt number
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Tick cadence in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Behaviour of the tick loop on failed ticks
    #[serde(default)]
    pub tick_failure_policy: TickFailurePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            tick_failure_policy: TickFailurePolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Returns `<config_dir>/pomodoro-sync/config.json`, if a config dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    tracing::debug!("no config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file without validating it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_url.trim().is_empty() {
            return Err(ConfigError::Invalid("server_url が空です".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs は1以上にしてください".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid(
                "max_retries は1以上にしてください".to_string(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms は1以上にしてください".to_string(),
            ));
        }
        if let TickFailurePolicy::StopAfter { failures: 0 } = self.tick_failure_policy {
            return Err(ConfigError::Invalid(
                "tick_failure_policy.failures は1以上にしてください".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Tick cadence.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Base retry delay.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
