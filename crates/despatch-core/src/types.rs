//! Core value types for signal despatch.
//!
//! Logical signals are symbolic at every call site; the numeric value is
//! derived per request and never stored.

use std::fmt;
use std::process::ExitStatus;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DespatchError;

/// Symbolic keepalived dump signal.
///
/// The wire name is what `keepalived --signum` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalSignal {
    /// Dump VRRP instance data (`/tmp/keepalived.data`).
    Data,
    /// Dump VRRP statistics (`/tmp/keepalived.stats`).
    Stats,
    /// Dump instance data as JSON (`/tmp/keepalived.json`).
    Json,
}

impl LogicalSignal {
    /// All known logical signals.
    pub const ALL: [Self; 3] = [Self::Data, Self::Stats, Self::Json];

    /// Returns the name understood by `keepalived --signum`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Data => "DATA",
            Self::Stats => "STATS",
            Self::Json => "JSON",
        }
    }

    /// Returns the signal number used by daemons that predate `--signum`.
    ///
    /// Those builds hard-wired DATA to SIGUSR1 and STATS to SIGUSR2 and had
    /// no JSON dump at all.
    #[must_use]
    pub const fn legacy_number(&self) -> Option<NumericSignal> {
        match self {
            Self::Data => Some(NumericSignal(10)),
            Self::Stats => Some(NumericSignal(12)),
            Self::Json => None,
        }
    }
}

impl fmt::Display for LogicalSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogicalSignal {
    type Err = DespatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sig| sig.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DespatchError::config(format!("unknown logical signal: {s}")))
    }
}

/// OS-level signal number as delivered to the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NumericSignal(i32);

impl NumericSignal {
    /// Wraps a raw signal number.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw signal number.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for NumericSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a command run through a transport completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    /// Process exited zero.
    Success,
    /// Process exited with a non-zero code.
    ExitCode(i32),
    /// Process was terminated by a signal.
    Terminated,
    /// HTTP response status from an endpoint agent.
    Http(u16),
}

impl CompletionStatus {
    /// Returns true if the command completed successfully.
    #[must_use]
    pub const fn success(&self) -> bool {
        match self {
            Self::Success => true,
            Self::ExitCode(_) | Self::Terminated => false,
            Self::Http(code) => *code >= 200 && *code < 300,
        }
    }
}

impl From<ExitStatus> for CompletionStatus {
    fn from(status: ExitStatus) -> Self {
        if status.success() {
            Self::Success
        } else {
            status.code().map_or(Self::Terminated, Self::ExitCode)
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::ExitCode(code) => write!(f, "exit code {code}"),
            Self::Terminated => f.write_str("terminated by signal"),
            Self::Http(code) => write!(f, "HTTP {code}"),
        }
    }
}

/// Captured output of a command run through a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    output: Vec<u8>,
    status: CompletionStatus,
}

impl CommandResult {
    /// Creates a result from combined output and a completion status.
    #[must_use]
    pub fn new(output: impl Into<Vec<u8>>, status: CompletionStatus) -> Self {
        Self {
            output: output.into(),
            status,
        }
    }

    /// Creates a successful result.
    #[must_use]
    pub fn success(output: impl Into<Vec<u8>>) -> Self {
        Self::new(output, CompletionStatus::Success)
    }

    /// Returns the raw combined output.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Returns the output decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Returns the completion status.
    #[must_use]
    pub const fn status(&self) -> CompletionStatus {
        self.status
    }

    /// Returns true if the command completed successfully.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.success()
    }
}
