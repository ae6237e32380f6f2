//! Transport abstraction for reaching the keepalived daemon.
//!
//! Exactly one transport is active per daemon instance:
//!
//! | Variant | Commands | Signals |
//! |---------|----------|---------|
//! | Local | spawn `keepalived` on this host | `kill(2)` on the PID-file PID |
//! | Container | runtime exec in the named container | runtime kill on the container |
//! | Endpoint | `GET {base}/version`, `GET {base}/signal/num` | `GET {base}/signal` |
//!
//! The set is closed; callers match on [`Transport`] exhaustively.

use std::fmt;
use std::sync::Arc;

use crate::config::TransportConfig;
use crate::error::Result;
use crate::transports::{CliRuntimeClient, ContainerTransport, EndpointTransport, LocalTransport};
use crate::types::{CommandResult, LogicalSignal, NumericSignal};

/// Query the despatch path issues to the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonCommand {
    /// `keepalived -v`
    Version,
    /// `keepalived --signum <NAME>`
    Signum(LogicalSignal),
}

impl DaemonCommand {
    /// Returns the CLI arguments, without the binary.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::Version => vec!["-v".to_string()],
            Self::Signum(sig) => vec!["--signum".to_string(), sig.name().to_string()],
        }
    }
}

/// Payload-free discriminant of a [`Transport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// Daemon runs on this host.
    Local,
    /// Daemon runs in a container.
    Container,
    /// Daemon is reached through an HTTP agent.
    Endpoint,
}

impl TransportKind {
    /// Returns the kind as a static string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Container => "container",
            Self::Endpoint => "endpoint",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Execution strategy used to query and signal the daemon.
#[derive(Debug, Clone)]
pub enum Transport {
    /// Host process, located through its PID file.
    Local(LocalTransport),
    /// Process inside a named container.
    Container(ContainerTransport),
    /// Remote agent exposing the daemon over HTTP.
    Endpoint(EndpointTransport),
}

impl Transport {
    /// Builds the transport described by configuration.
    pub fn from_config(config: &TransportConfig) -> Result<Self> {
        match config {
            TransportConfig::Local {
                pid_path,
                keepalived_bin,
            } => Ok(Self::Local(
                LocalTransport::new(pid_path).with_binary(keepalived_bin),
            )),
            TransportConfig::Container {
                name,
                runtime,
                keepalived_bin,
            } => Ok(Self::Container(
                ContainerTransport::new(name, Arc::new(CliRuntimeClient::new(*runtime)))
                    .with_binary(keepalived_bin),
            )),
            TransportConfig::Endpoint {
                url,
                request_timeout,
            } => Ok(Self::Endpoint(EndpointTransport::with_timeout(
                url.clone(),
                *request_timeout,
            )?)),
        }
    }

    /// Returns the transport kind.
    #[must_use]
    pub const fn kind(&self) -> TransportKind {
        match self {
            Self::Local(_) => TransportKind::Local,
            Self::Container(_) => TransportKind::Container,
            Self::Endpoint(_) => TransportKind::Endpoint,
        }
    }

    /// Returns a human-readable identity of what this transport talks to.
    #[must_use]
    pub fn target(&self) -> String {
        match self {
            Self::Local(local) => local.pid_path().display().to_string(),
            Self::Container(container) => container.name().to_string(),
            Self::Endpoint(endpoint) => endpoint.base_url().to_string(),
        }
    }

    /// Runs a daemon command and captures its output.
    pub async fn run(&self, command: &DaemonCommand) -> Result<CommandResult> {
        match self {
            Self::Local(local) => local.run(command).await,
            Self::Container(container) => container.run(command).await,
            Self::Endpoint(endpoint) => endpoint.run(command).await,
        }
    }

    /// Delivers a numeric signal to the daemon.
    pub async fn send_signal(&self, signal: NumericSignal) -> Result<()> {
        match self {
            Self::Local(local) => local.send_signal(signal).await,
            Self::Container(container) => container.send_signal(signal).await,
            Self::Endpoint(endpoint) => endpoint.send_signal(signal).await,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.target())
    }
}
