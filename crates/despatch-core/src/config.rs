//! Despatch configuration.
//!
//! Loaded from TOML and validated before any transport is built:
//!
//! ```toml
//! settle_delay = "10ms"
//!
//! [transport]
//! type = "container"
//! name = "keepalived"
//! runtime = "podman"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DespatchError, Result};
use crate::transports::{ContainerRuntime, DEFAULT_KEEPALIVED_BIN, DEFAULT_PID_PATH};

/// Default pause after a local signal before dump files are read.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Top-level despatch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DespatchConfig {
    /// Pause after a successful local signal so keepalived can write its dump.
    #[serde(default = "default_settle_delay", with = "duration_str")]
    pub settle_delay: Duration,

    /// How the daemon is reached.
    #[serde(default)]
    pub transport: TransportConfig,
}

fn default_settle_delay() -> Duration {
    DEFAULT_SETTLE_DELAY
}

impl Default for DespatchConfig {
    fn default() -> Self {
        Self {
            settle_delay: default_settle_delay(),
            transport: TransportConfig::default(),
        }
    }
}

impl DespatchConfig {
    /// Parses configuration from a TOML string and validates it.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| DespatchError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DespatchError::config(format!("failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.transport.validate()
    }
}

/// Transport selection. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Daemon on this host.
    Local {
        /// keepalived PID file.
        #[serde(default = "default_pid_path")]
        pid_path: PathBuf,
        /// keepalived binary used for `-v` and `--signum`.
        #[serde(default = "default_keepalived_bin")]
        keepalived_bin: String,
    },
    /// Daemon inside a container.
    Container {
        /// Container name or ID.
        name: String,
        /// Runtime CLI driving the container.
        #[serde(default)]
        runtime: ContainerRuntime,
        /// keepalived binary inside the container.
        #[serde(default = "default_keepalived_bin")]
        keepalived_bin: String,
    },
    /// Daemon behind an HTTP agent.
    Endpoint {
        /// Agent base URL.
        url: Url,
        /// Per-request timeout; the HTTP client default when unset.
        #[serde(default, with = "opt_duration_str")]
        request_timeout: Option<Duration>,
    },
}

fn default_pid_path() -> PathBuf {
    PathBuf::from(DEFAULT_PID_PATH)
}

fn default_keepalived_bin() -> String {
    DEFAULT_KEEPALIVED_BIN.to_string()
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Local {
            pid_path: default_pid_path(),
            keepalived_bin: default_keepalived_bin(),
        }
    }
}

impl TransportConfig {
    /// Validates the selected transport.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Local {
                pid_path,
                keepalived_bin,
            } => {
                if pid_path.as_os_str().is_empty() {
                    return Err(DespatchError::config("pid_path cannot be empty"));
                }
                validate_binary(keepalived_bin)
            }
            Self::Container {
                name,
                keepalived_bin,
                ..
            } => {
                if name.trim().is_empty() {
                    return Err(DespatchError::config("container name cannot be empty"));
                }
                if name.chars().any(char::is_whitespace) {
                    return Err(DespatchError::config(format!(
                        "container name {name:?} cannot contain whitespace"
                    )));
                }
                validate_binary(keepalived_bin)
            }
            Self::Endpoint {
                url,
                request_timeout,
            } => {
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(DespatchError::config(format!(
                        "endpoint {url} must use http or https"
                    )));
                }
                if url.cannot_be_a_base() {
                    return Err(DespatchError::config(format!(
                        "endpoint {url} cannot carry a path"
                    )));
                }
                if request_timeout.is_some_and(|t| t.is_zero()) {
                    return Err(DespatchError::config("request_timeout must be positive"));
                }
                Ok(())
            }
        }
    }
}

fn validate_binary(keepalived_bin: &str) -> Result<()> {
    if keepalived_bin.trim().is_empty() {
        return Err(DespatchError::config("keepalived_bin cannot be empty"));
    }
    Ok(())
}

/// Humantime (`"10ms"`, `"1s 500ms"`) durations.
mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

mod opt_duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&humantime::format_duration(*d).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| humantime::parse_duration(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
