//! Local process transport.
//!
//! Commands run as child processes on this host; signals go straight to
//! the PID recorded in keepalived's PID file.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{DespatchError, Result};
use crate::transport::DaemonCommand;
use crate::types::{CommandResult, NumericSignal};

/// Default keepalived PID file.
pub const DEFAULT_PID_PATH: &str = "/var/run/keepalived.pid";

/// Default keepalived binary, resolved through `PATH`.
pub const DEFAULT_KEEPALIVED_BIN: &str = "keepalived";

/// Transport for a daemon running on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTransport {
    pid_path: PathBuf,
    keepalived_bin: PathBuf,
}

impl LocalTransport {
    /// Creates a local transport reading the given PID file.
    #[must_use]
    pub fn new(pid_path: impl Into<PathBuf>) -> Self {
        Self {
            pid_path: pid_path.into(),
            keepalived_bin: PathBuf::from(DEFAULT_KEEPALIVED_BIN),
        }
    }

    /// Overrides the keepalived binary used for `-v` and `--signum`.
    #[must_use]
    pub fn with_binary(mut self, keepalived_bin: impl Into<PathBuf>) -> Self {
        self.keepalived_bin = keepalived_bin.into();
        self
    }

    /// Returns the PID file path.
    #[must_use]
    pub fn pid_path(&self) -> &Path {
        &self.pid_path
    }

    /// Returns the keepalived binary.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.keepalived_bin
    }

    /// Runs an arbitrary program and captures stdout followed by stderr.
    pub async fn exec<S: AsRef<OsStr>>(
        &self,
        program: impl AsRef<OsStr>,
        args: &[S],
    ) -> Result<CommandResult> {
        let program = program.as_ref();
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DespatchError::execution(
                    program.to_string_lossy(),
                    format!("failed to spawn: {e}"),
                )
            })?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        Ok(CommandResult::new(combined, output.status.into()))
    }

    /// Runs a daemon command through the configured binary.
    pub async fn run(&self, command: &DaemonCommand) -> Result<CommandResult> {
        self.exec(&self.keepalived_bin, &command.args()).await
    }

    /// Reads the daemon PID from the PID file.
    pub async fn read_pid(&self) -> Result<i32> {
        let raw = tokio::fs::read_to_string(&self.pid_path)
            .await
            .map_err(|e| self.not_found(format!("cannot read pid file: {e}")))?;

        let pid: i32 = raw
            .trim()
            .parse()
            .map_err(|e| self.not_found(format!("unknown pid {:?}: {e}", raw.trim())))?;

        // kill(2) treats 0 and negative PIDs as process groups.
        if pid <= 0 {
            return Err(self.not_found(format!("pid {pid} does not name a single process")));
        }

        Ok(pid)
    }

    /// Delivers a signal to the PID-file process.
    pub async fn send_signal(&self, signal: NumericSignal) -> Result<()> {
        let pid = self.read_pid().await?;

        #[cfg(unix)]
        {
            use nix::errno::Errno;

            // keepalived reports JSON as a real-time signal (SIGRTMIN+n), so
            // the raw number goes to kill(2) unchanged.
            let raw = signal.as_i32();
            if raw <= 0 || raw > max_signal() {
                return Err(DespatchError::signal_delivery(format!(
                    "{signal} is outside the signal range 1..={}",
                    max_signal()
                )));
            }

            // SAFETY: kill(2) takes two integers and touches no memory of ours.
            #[allow(unsafe_code)]
            let rc = unsafe { libc::kill(pid, raw) };

            if rc == 0 {
                tracing::debug!(pid = pid, signal = raw, "sent signal");
                return Ok(());
            }
            match Errno::last() {
                Errno::ESRCH => Err(self.not_found(format!("no process with pid {pid}"))),
                e => Err(DespatchError::signal_delivery(format!(
                    "kill({pid}, {raw}) failed: {e}"
                ))),
            }
        }

        #[cfg(not(unix))]
        {
            Err(DespatchError::signal_delivery(format!(
                "cannot send {signal} to pid {pid}: local signals need a unix host"
            )))
        }
    }

    fn not_found(&self, reason: String) -> DespatchError {
        DespatchError::process_not_found(self.pid_path.display().to_string(), reason)
    }
}

/// Highest deliverable signal number, real-time signals included.
#[cfg(target_os = "linux")]
fn max_signal() -> i32 {
    libc::SIGRTMAX()
}

/// Highest deliverable signal number; no real-time signals here.
#[cfg(all(unix, not(target_os = "linux")))]
fn max_signal() -> i32 {
    31
}

impl Default for LocalTransport {
    fn default() -> Self {
        Self::new(DEFAULT_PID_PATH)
    }
}
