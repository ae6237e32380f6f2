//! Signal despatch orchestration.
//!
//! One operation: make keepalived dump. Resolution and delivery failures
//! propagate unchanged; there is no retry. Concurrent despatches to the
//! same daemon are not coordinated here and must be serialized by the
//! caller.

use std::time::Duration;

use crate::config::{DEFAULT_SETTLE_DELAY, DespatchConfig};
use crate::error::{DespatchError, Result};
use crate::resolver::SignalResolver;
use crate::transport::{Transport, TransportKind};
use crate::types::{LogicalSignal, NumericSignal};

/// Sends logical signals to one keepalived daemon.
#[derive(Debug)]
pub struct SignalDespatcher {
    transport: Transport,
    settle_delay: Duration,
}

impl SignalDespatcher {
    /// Creates a despatcher with the default settle delay.
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Builds a despatcher from validated configuration.
    pub fn from_config(config: &DespatchConfig) -> Result<Self> {
        config.validate()?;
        let transport = Transport::from_config(&config.transport)?;
        Ok(Self::new(transport).with_settle_delay(config.settle_delay))
    }

    /// Overrides the pause taken after a local signal.
    ///
    /// keepalived writes its dump asynchronously; the pause is a heuristic,
    /// not a completion guarantee.
    #[must_use]
    pub const fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Returns the settle delay.
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Resolves and delivers `signal`, returning the number sent.
    ///
    /// On the local transport this returns only after the settle delay.
    pub async fn despatch(&self, signal: LogicalSignal) -> Result<NumericSignal> {
        let number = SignalResolver::resolve(signal, &self.transport)
            .await
            .inspect_err(|e| self.log_failure(signal, e))?;

        self.transport
            .send_signal(number)
            .await
            .inspect_err(|e| self.log_failure(signal, e))?;

        if self.transport.kind() == TransportKind::Local && !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        tracing::debug!(
            signal = %signal,
            number = number.as_i32(),
            transport = %self.transport.kind(),
            target = %self.transport.target(),
            "despatched signal"
        );

        Ok(number)
    }

    fn log_failure(&self, signal: LogicalSignal, err: &DespatchError) {
        tracing::error!(
            signal = %signal,
            transport = %self.transport.kind(),
            target = %self.transport.target(),
            error = %err,
            "signal despatch failed"
        );
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use crate::transports::LocalTransport;
    use std::io::Write;

    #[test]
    fn test_default_settle_delay() {
        let despatcher = SignalDespatcher::new(Transport::Local(LocalTransport::default()));
        assert_eq!(despatcher.settle_delay(), Duration::from_millis(10));
        assert_eq!(despatcher.transport().kind(), TransportKind::Local);
    }

    #[test]
    fn test_from_config_applies_settle_delay() {
        let config = DespatchConfig::from_toml("settle_delay = \"250ms\"\n").unwrap();
        let despatcher = SignalDespatcher::from_config(&config).unwrap();
        assert_eq!(despatcher.settle_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = DespatchConfig {
            settle_delay: DEFAULT_SETTLE_DELAY,
            transport: crate::config::TransportConfig::Container {
                name: String::new(),
                runtime: crate::transports::ContainerRuntime::Docker,
                keepalived_bin: "keepalived".to_string(),
            },
        };
        assert!(SignalDespatcher::from_config(&config).unwrap_err().is_configuration());
    }

    #[tokio::test]
    async fn test_despatch_without_keepalived_binary() {
        let mut pid_file = tempfile::NamedTempFile::new().unwrap();
        pid_file.write_all(format!("{}\n", std::process::id()).as_bytes()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let transport =
            LocalTransport::new(pid_file.path()).with_binary(dir.path().join("keepalived"));
        let despatcher = SignalDespatcher::new(Transport::Local(transport));

        // Version probe degrades to unknown, then --signum cannot spawn.
        // Nothing may be sent to our own pid.
        let err = despatcher.despatch(LogicalSignal::Data).await.unwrap_err();
        assert!(matches!(err, DespatchError::Execution { .. }));
    }
}
