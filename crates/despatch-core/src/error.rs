//! Error types for despatch-core.
//!
//! Every failure in the despatch path is a typed value returned to the
//! caller. Nothing in this crate terminates the process.

use crate::types::LogicalSignal;
use crate::version::Version;

/// Result type alias for despatch operations.
pub type Result<T> = std::result::Result<T, DespatchError>;

/// Error type for version detection, signal resolution and delivery.
#[derive(Debug, thiserror::Error)]
pub enum DespatchError {
    /// A process, container exec or HTTP call could not run or reported failure.
    #[error("execution failed on {target}: {message}")]
    Execution {
        /// Transport target (binary, container name or endpoint URL).
        target: String,
        /// What went wrong.
        message: String,
    },

    /// The PID file was unreadable or the PID has no live process.
    #[error("keepalived process not found via {pid_path}: {reason}")]
    ProcessNotFound {
        /// PID file consulted.
        pid_path: String,
        /// Why the process could not be located.
        reason: String,
    },

    /// The process exists but the signal could not be delivered.
    #[error("signal delivery failed: {0}")]
    SignalDelivery(String),

    /// Version output could not be parsed.
    ///
    /// Soft: the probe downgrades this to an unknown version.
    #[error("unparseable keepalived version: {0}")]
    VersionParse(String),

    /// `--signum` output held no usable number.
    #[error("no signal number for {signal} in output {output:?}")]
    SignalNumberParse {
        /// Signal being resolved.
        signal: LogicalSignal,
        /// Raw captured output.
        output: String,
    },

    /// The daemon predates generic signal support for this signal.
    #[error("signal {signal} is not supported by keepalived {version}")]
    UnsupportedSignal {
        /// Requested signal.
        signal: LogicalSignal,
        /// Detected daemon version.
        version: Version,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DespatchError {
    /// Creates an execution error against a transport target.
    #[must_use]
    pub fn execution(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Creates a process-not-found error.
    #[must_use]
    pub fn process_not_found(pid_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProcessNotFound {
            pid_path: pid_path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a signal delivery error.
    #[must_use]
    pub fn signal_delivery(msg: impl Into<String>) -> Self {
        Self::SignalDelivery(msg.into())
    }

    /// Creates a version parse error.
    #[must_use]
    pub fn version_parse(msg: impl Into<String>) -> Self {
        Self::VersionParse(msg.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true if the caller may degrade instead of failing.
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        matches!(self, Self::VersionParse(_))
    }

    /// Returns true if the failure points at a misconfiguration rather than
    /// a transient runtime problem.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::UnsupportedSignal { .. } | Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DespatchError::execution("keepalived", "exit status 1");
        assert_eq!(
            err.to_string(),
            "execution failed on keepalived: exit status 1"
        );
    }

    #[test]
    fn test_only_version_parse_is_soft() {
        assert!(DespatchError::version_parse("garbage").is_soft());
        assert!(!DespatchError::signal_delivery("EPERM").is_soft());
        assert!(
            !DespatchError::SignalNumberParse {
                signal: LogicalSignal::Stats,
                output: String::new(),
            }
            .is_soft()
        );
    }

    #[test]
    fn test_unsupported_signal_is_configuration() {
        let err = DespatchError::UnsupportedSignal {
            signal: LogicalSignal::Json,
            version: Version::new(1, 3, 5),
        };
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "signal JSON is not supported by keepalived 1.3.5"
        );
        assert!(!DespatchError::process_not_found("/run/k.pid", "missing").is_configuration());
    }

    #[test]
    fn test_io_error_conversion() {
        let err: DespatchError = std::io::Error::other("boom").into();
        assert!(matches!(err, DespatchError::Io(_)));
    }
}
