//! Transport implementations.
//!
//! - [`LocalTransport`]: spawns `keepalived` on the host and signals the
//!   PID recorded in its PID file
//! - [`ContainerTransport`]: execs and kills through a [`RuntimeClient`]
//! - [`EndpointTransport`]: talks to an HTTP agent next to a remote daemon

mod container;
mod endpoint;
mod local;

pub use container::{CliRuntimeClient, ContainerRuntime, ContainerTransport, RuntimeClient};
pub use endpoint::EndpointTransport;
pub use local::{DEFAULT_KEEPALIVED_BIN, DEFAULT_PID_PATH, LocalTransport};
