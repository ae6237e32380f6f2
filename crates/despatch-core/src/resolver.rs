//! Logical-to-numeric signal resolution.
//!
//! keepalived releases before 1.3.8 hard-wire their dump signals and cannot
//! be asked about them. Later releases answer `keepalived --signum <NAME>`,
//! and the number they print is the only trustworthy one: signal numbers
//! moved between releases, and a wrong guess makes the daemon do something
//! other than dump.

use crate::error::{DespatchError, Result};
use crate::transport::{DaemonCommand, Transport};
use crate::types::{LogicalSignal, NumericSignal};
use crate::version::{Version, VersionProbe};

/// Where a signal number comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Fixed number from the pre-1.3.8 table.
    Legacy(NumericSignal),
    /// Ask the daemon with `--signum`.
    Live,
}

/// Resolves logical signals to the numbers the running daemon expects.
pub struct SignalResolver;

impl SignalResolver {
    /// Decides how to number `signal` for a daemon at `version`.
    ///
    /// `None` means the version is unknown and is treated as the newest.
    pub fn plan(signal: LogicalSignal, version: Option<Version>) -> Result<Resolution> {
        match version {
            Some(version) if !version.supports_signum() => signal
                .legacy_number()
                .map(Resolution::Legacy)
                .ok_or(DespatchError::UnsupportedSignal { signal, version }),
            _ => Ok(Resolution::Live),
        }
    }

    /// Resolves `signal` against the daemon behind `transport`.
    pub async fn resolve(signal: LogicalSignal, transport: &Transport) -> Result<NumericSignal> {
        let version = VersionProbe::detect(transport).await;

        match Self::plan(signal, version)? {
            Resolution::Legacy(number) => {
                tracing::debug!(
                    signal = %signal,
                    number = number.as_i32(),
                    "resolved signal from legacy table"
                );
                Ok(number)
            }
            Resolution::Live => {
                let number = Self::query_signum(signal, transport).await?;
                tracing::debug!(
                    signal = %signal,
                    number = number.as_i32(),
                    transport = %transport.kind(),
                    "resolved signal via --signum"
                );
                Ok(number)
            }
        }
    }

    async fn query_signum(signal: LogicalSignal, transport: &Transport) -> Result<NumericSignal> {
        let result = transport.run(&DaemonCommand::Signum(signal)).await?;
        if !result.is_success() {
            return Err(DespatchError::execution(
                transport.target(),
                format!(
                    "--signum {signal} completed with {}: {}",
                    result.status(),
                    result.text().trim()
                ),
            ));
        }
        parse_signum(signal, &result.text())
    }
}

/// Extracts the signal number from `--signum` output.
///
/// Every non-digit character is discarded; what remains must be a valid
/// `i32`. There is no fallback number.
pub fn parse_signum(signal: LogicalSignal, output: &str) -> Result<NumericSignal> {
    let digits: String = output.chars().filter(char::is_ascii_digit).collect();
    digits
        .parse::<i32>()
        .map(NumericSignal::new)
        .map_err(|_| DespatchError::SignalNumberParse {
            signal,
            output: output.to_string(),
        })
}
