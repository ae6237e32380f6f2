// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # despatch-core
//!
//! Version-aware signal despatch to a keepalived daemon.
//!
//! keepalived has no query API: it dumps its state to disk when signalled.
//! This crate finds the right signal number for the running daemon and
//! delivers it over whichever transport reaches that daemon:
//!
//! - [`VersionProbe`] parses `keepalived -v`
//! - [`SignalResolver`] maps a [`LogicalSignal`] to a [`NumericSignal`],
//!   from the legacy table before 1.3.8 or from `keepalived --signum` after
//! - [`Transport`] runs commands and delivers signals locally, inside a
//!   container, or through an HTTP agent
//! - [`SignalDespatcher`] ties them together behind one `despatch` call
//!
//! ## Example
//!
//! ```rust,no_run
//! use despatch_core::{LocalTransport, LogicalSignal, SignalDespatcher, Transport};
//!
//! # async fn run() -> despatch_core::Result<()> {
//! let transport = Transport::Local(LocalTransport::new("/var/run/keepalived.pid"));
//! let despatcher = SignalDespatcher::new(transport);
//! despatcher.despatch(LogicalSignal::Stats).await?;
//! // /tmp/keepalived.stats is now fresh
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod despatcher;
pub mod error;
pub mod resolver;
#[cfg(test)]
pub mod tests;
pub mod transport;
pub mod transports;
pub mod types;
pub mod version;

pub use config::{DEFAULT_SETTLE_DELAY, DespatchConfig, TransportConfig};
pub use despatcher::SignalDespatcher;
pub use error::{DespatchError, Result};
pub use resolver::{Resolution, SignalResolver, parse_signum};
pub use transport::{DaemonCommand, Transport, TransportKind};
pub use transports::{
    CliRuntimeClient, ContainerRuntime, ContainerTransport, EndpointTransport, LocalTransport,
    RuntimeClient,
};
pub use types::{CommandResult, CompletionStatus, LogicalSignal, NumericSignal};
pub use version::{SIGNUM_SUPPORTED_VERSION, Version, VersionProbe, parse_version_output};
