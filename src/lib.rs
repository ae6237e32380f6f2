//! keepalived-despatch: version-aware signal despatch to keepalived.
//!
//! Resolves a logical signal (`DATA`, `STATS`, `JSON`) to the number the
//! running keepalived expects and delivers it over a local, container or
//! HTTP-agent transport.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use keepalived_despatch::prelude::*;
//!
//! # async fn run() -> keepalived_despatch::core::Result<()> {
//! let despatcher = SignalDespatcher::new(Transport::Local(LocalTransport::default()));
//! let number = despatcher.despatch(LogicalSignal::Stats).await?;
//! println!("STATS is signal {number}");
//! # Ok(())
//! # }
//! ```

pub use despatch_core as core;

/// Prelude module for common imports.
pub mod prelude {
    pub use despatch_core::{
        ContainerRuntime, ContainerTransport, DespatchConfig, DespatchError, EndpointTransport,
        LocalTransport, LogicalSignal, NumericSignal, SignalDespatcher, Transport,
        TransportConfig, Version,
    };
}
