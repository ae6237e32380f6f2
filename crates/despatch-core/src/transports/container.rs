//! Container transport.
//!
//! The container runtime is an external collaborator consumed through two
//! primitives: exec-with-captured-output and kill-with-signal. The bundled
//! [`CliRuntimeClient`] drives the docker/podman CLI; anything else that
//! implements [`RuntimeClient`] can be plugged in.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::{DespatchError, Result};
use crate::transport::DaemonCommand;
use crate::transports::local::DEFAULT_KEEPALIVED_BIN;
use crate::types::{CommandResult, NumericSignal};

/// Exit code `docker exec`/`podman exec` use when the exec could not be
/// set up at all (bad flags, runtime error).
const RUNTIME_FAILURE_EXIT: i32 = 125;

/// Prefix docker puts on errors reported by its daemon, e.g. a missing
/// container; those exit 1 like an ordinary command failure.
const DAEMON_ERROR_PREFIX: &str = "Error response from daemon";

/// Narrow container-runtime interface.
#[async_trait]
pub trait RuntimeClient: Send + Sync {
    /// Returns the runtime name, for logs.
    fn name(&self) -> &str;

    /// Runs `argv` inside `container`, capturing combined output.
    async fn exec(&self, container: &str, argv: &[String]) -> Result<CommandResult>;

    /// Delivers `signal` (name or decimal number) to `container`.
    async fn kill(&self, container: &str, signal: &str) -> Result<()>;
}

/// Container runtime CLI flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerRuntime {
    /// Docker runtime.
    #[default]
    Docker,
    /// Podman runtime.
    Podman,
}

impl ContainerRuntime {
    /// Returns the runtime CLI command name.
    #[must_use]
    pub const fn command(&self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman",
        }
    }
}

/// [`RuntimeClient`] backed by the docker/podman CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliRuntimeClient {
    runtime: ContainerRuntime,
}

impl CliRuntimeClient {
    /// Creates a client for the given runtime.
    #[must_use]
    pub const fn new(runtime: ContainerRuntime) -> Self {
        Self { runtime }
    }

    fn exec_args(container: &str, argv: &[String]) -> Vec<String> {
        let mut args = vec!["exec".to_string(), container.to_string()];
        args.extend(argv.iter().cloned());
        args
    }

    fn is_runtime_failure(code: Option<i32>, stderr: &str) -> bool {
        code == Some(RUNTIME_FAILURE_EXIT) || stderr.trim_start().starts_with(DAEMON_ERROR_PREFIX)
    }

    fn kill_args(container: &str, signal: &str) -> Vec<String> {
        vec![
            "kill".to_string(),
            "--signal".to_string(),
            signal.to_string(),
            container.to_string(),
        ]
    }
}

impl Default for CliRuntimeClient {
    fn default() -> Self {
        Self::new(ContainerRuntime::Docker)
    }
}

#[async_trait]
impl RuntimeClient for CliRuntimeClient {
    fn name(&self) -> &str {
        self.runtime.command()
    }

    async fn exec(&self, container: &str, argv: &[String]) -> Result<CommandResult> {
        let output = Command::new(self.runtime.command())
            .args(Self::exec_args(container, argv))
            .output()
            .await
            .map_err(|e| {
                DespatchError::execution(
                    container,
                    format!("failed to execute {}: {e}", self.runtime.command()),
                )
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if Self::is_runtime_failure(output.status.code(), &stderr) {
            return Err(DespatchError::execution(
                container,
                format!("{} exec failed: {}", self.runtime.command(), stderr.trim()),
            ));
        }

        let status = output.status.into();
        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        Ok(CommandResult::new(combined, status))
    }

    async fn kill(&self, container: &str, signal: &str) -> Result<()> {
        let output = Command::new(self.runtime.command())
            .args(Self::kill_args(container, signal))
            .output()
            .await
            .map_err(|e| {
                DespatchError::execution(
                    container,
                    format!("failed to execute {}: {e}", self.runtime.command()),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DespatchError::execution(
                container,
                format!("{} kill failed: {}", self.runtime.command(), stderr.trim()),
            ));
        }

        Ok(())
    }
}

/// Transport for a daemon running inside a named container.
#[derive(Clone)]
pub struct ContainerTransport {
    name: String,
    keepalived_bin: String,
    client: Arc<dyn RuntimeClient>,
}

impl ContainerTransport {
    /// Creates a container transport using the given runtime client.
    #[must_use]
    pub fn new(name: impl Into<String>, client: Arc<dyn RuntimeClient>) -> Self {
        Self {
            name: name.into(),
            keepalived_bin: DEFAULT_KEEPALIVED_BIN.to_string(),
            client,
        }
    }

    /// Overrides the keepalived binary invoked inside the container.
    #[must_use]
    pub fn with_binary(mut self, keepalived_bin: impl Into<String>) -> Self {
        self.keepalived_bin = keepalived_bin.into();
        self
    }

    /// Returns the container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the keepalived binary invoked inside the container.
    #[must_use]
    pub fn binary(&self) -> &str {
        &self.keepalived_bin
    }

    /// Runs an arbitrary command inside the container.
    pub async fn exec(&self, argv: &[String]) -> Result<CommandResult> {
        self.client
            .exec(&self.name, argv)
            .await
            .map_err(|e| self.as_execution(e))
    }

    /// Runs a daemon command inside the container.
    pub async fn run(&self, command: &DaemonCommand) -> Result<CommandResult> {
        let mut argv = vec![self.keepalived_bin.clone()];
        argv.extend(command.args());
        self.exec(&argv).await
    }

    /// Delivers a numeric signal through the runtime's kill primitive.
    pub async fn send_signal(&self, signal: NumericSignal) -> Result<()> {
        self.client
            .kill(&self.name, &signal.to_string())
            .await
            .map_err(|e| self.as_execution(e))?;
        tracing::debug!(
            container = %self.name,
            runtime = self.client.name(),
            signal = signal.as_i32(),
            "sent signal"
        );
        Ok(())
    }

    fn as_execution(&self, err: DespatchError) -> DespatchError {
        match err {
            DespatchError::Execution { .. } => err,
            other => DespatchError::execution(&self.name, other.to_string()),
        }
    }
}

impl fmt::Debug for ContainerTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerTransport")
            .field("name", &self.name)
            .field("keepalived_bin", &self.keepalived_bin)
            .field("runtime", &self.client.name())
            .finish()
    }
}
