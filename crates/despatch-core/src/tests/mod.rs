//! Cross-module tests for the despatch path.
//!
//! | Module | Covers |
//! |--------|--------|
//! | `resolution` | version gating, legacy table, `--signum` parsing |
//! | `despatch` | end-to-end despatch over a recorded container runtime |
//! | `properties` | proptest invariants for versions and signal numbers |


pub use mocks::{RecordedCall, RecordingRuntime};
