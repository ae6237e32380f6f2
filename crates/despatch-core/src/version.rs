//! keepalived version detection.
//!
//! The daemon prints its version on the first line of `keepalived -v`,
//! e.g. `Keepalived v2.0.20 (09/04,2021)`. Detection is best-effort: any
//! failure yields an unknown version and callers assume the newest
//! behavior.

use std::fmt;

use crate::error::{DespatchError, Result};
use crate::transport::{DaemonCommand, Transport};

/// First keepalived release that understands `--signum`.
pub const SIGNUM_SUPPORTED_VERSION: Version = Version::new(1, 3, 8);

/// keepalived release as an ordered `(major, minor, patch)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
}

impl Version {
    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses a dotted version such as `2.0.20`.
    ///
    /// Missing minor/patch segments default to zero, segments beyond the
    /// third are ignored, and a `-pre` or `+build` suffix is dropped.
    pub fn parse(s: &str) -> Result<Self> {
        let core = s
            .split(['-', '+'])
            .next()
            .unwrap_or_default()
            .trim();
        if core.is_empty() {
            return Err(DespatchError::version_parse(format!("empty version in {s:?}")));
        }

        let mut parts = [0u64; 3];
        for (idx, segment) in core.split('.').enumerate() {
            let value = segment.parse::<u64>().map_err(|e| {
                DespatchError::version_parse(format!("segment {segment:?} of {s:?}: {e}"))
            })?;
            if let Some(slot) = parts.get_mut(idx) {
                *slot = value;
            }
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }

    /// Returns true if this release can answer `--signum` queries.
    #[must_use]
    pub fn supports_signum(&self) -> bool {
        *self >= SIGNUM_SUPPORTED_VERSION
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Extracts the version from raw `keepalived -v` output.
pub fn parse_version_output(output: &str) -> Result<Version> {
    let first_line = output.lines().next().unwrap_or_default();
    let token = first_line.split_whitespace().nth(1).ok_or_else(|| {
        DespatchError::version_parse(format!("unknown version format: {first_line:?}"))
    })?;
    Version::parse(token.strip_prefix('v').unwrap_or(token))
}

/// Detects the daemon version through a transport.
pub struct VersionProbe;

impl VersionProbe {
    /// Returns the running daemon's version, or `None` when it cannot be
    /// determined.
    pub async fn detect(transport: &Transport) -> Option<Version> {
        match Self::try_detect(transport).await {
            Ok(version) => {
                tracing::debug!(
                    transport = %transport.kind(),
                    target = %transport.target(),
                    version = %version,
                    "detected keepalived version"
                );
                Some(version)
            }
            Err(e) => {
                tracing::warn!(
                    transport = %transport.kind(),
                    target = %transport.target(),
                    error = %e,
                    "keepalived version unknown, assuming latest"
                );
                None
            }
        }
    }

    async fn try_detect(transport: &Transport) -> Result<Version> {
        let result = transport.run(&DaemonCommand::Version).await?;
        if !result.is_success() {
            return Err(DespatchError::version_parse(format!(
                "version command completed with {}: {}",
                result.status(),
                result.text().trim()
            )));
        }
        parse_version_output(&result.text())
    }
}
