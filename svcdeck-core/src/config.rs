use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logview::LogRefreshPolicy;

pub const CONFIG_ENV: &str = "SVCDECK_CONFIG";
const CONFIG_NAMES: [&str; 4] = ["svcdeck.yaml", "svcdeck.yml", ".svcdeck.yaml", ".svcdeck.yml"];

fn default_base_url() -> String {
    "http://127.0.0.1:5001".into()
}
fn default_poll_interval() -> u64 {
    5000
}
fn default_clock_interval() -> u64 {
    1000
}
fn default_counter_transition() -> u64 {
    500
}
fn default_notice_ttl() -> u64 {
    5000
}

/// Root configuration file structure
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeckConfig {
    /// Base URL of the service-control API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Use the built-in demo fleet instead of a real backend
    #[serde(default)]
    pub demo: bool,

    /// Period of the combined stats + services poll
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Period of the header clock
    #[serde(default = "default_clock_interval")]
    pub clock_interval_ms: u64,

    /// Duration of the counter transition animation
    #[serde(default = "default_counter_transition")]
    pub counter_transition_ms: u64,

    /// How long a notification stays visible
    #[serde(default = "default_notice_ttl")]
    pub notice_ttl_ms: u64,

    /// Per-request timeout; unset means requests are never timed out
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    #[serde(default)]
    pub log_refresh: LogRefreshPolicy,

    /// Keep the selected service after the log popup closes
    #[serde(default)]
    pub keep_log_selection_on_close: bool,

    /// Where tracing output goes while the TUI owns the terminal
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            demo: false,
            poll_interval_ms: default_poll_interval(),
            clock_interval_ms: default_clock_interval(),
            counter_transition_ms: default_counter_transition(),
            notice_ttl_ms: default_notice_ttl(),
            request_timeout_ms: None,
            log_refresh: LogRefreshPolicy::Manual,
            keep_log_selection_on_close: false,
            log_file: None,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("no config file found, searched: {searched:?}")]
    NotFound { searched: Vec<PathBuf> },
}

impl DeckConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a string (useful for testing)
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: DeckConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Search for a config file: `$SVCDECK_CONFIG` first, then the
    /// standard names in `start_dir` and each of its parents.
    pub fn discover(start_dir: &Path) -> Result<(PathBuf, Self), ConfigError> {
        let mut searched = Vec::new();

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Ok((path.clone(), Self::load(&path)?));
            }
            searched.push(path);
        }

        let mut dir = Some(start_dir);
        while let Some(current) = dir {
            for name in &CONFIG_NAMES {
                let path = current.join(name);
                if path.exists() {
                    return Ok((path.clone(), Self::load(&path)?));
                }
                searched.push(path);
            }
            dir = current.parent();
        }

        Err(ConfigError::NotFound { searched })
    }

    /// Load `explicit` if given, otherwise [`discover`](Self::discover) from
    /// `start_dir`. Falls back to defaults when nothing is found. The second
    /// value is the file the settings came from.
    pub fn resolve(
        explicit: Option<&Path>,
        start_dir: &Path,
    ) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        match Self::discover(start_dir) {
            Ok((path, config)) => Ok((config, Some(path))),
            Err(ConfigError::NotFound { .. }) => Ok((Self::default(), None)),
            Err(e) => Err(e),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: format!("'{}' must start with http:// or https://", self.base_url),
            });
        }

        let periods = [
            ("poll_interval_ms", Some(self.poll_interval_ms)),
            ("clock_interval_ms", Some(self.clock_interval_ms)),
            ("request_timeout_ms", self.request_timeout_ms),
            ("log_refresh", self.log_refresh.period().map(|d| d.as_millis() as u64)),
        ];
        for (field, value) in periods {
            if value == Some(0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".into(),
                });
            }
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.clock_interval_ms)
    }

    pub fn counter_transition(&self) -> Duration {
        Duration::from_millis(self.counter_transition_ms)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}
