//! HTTP endpoint transport.
//!
//! A remote agent next to the daemon exposes its CLI over HTTP:
//! `GET {base}/version`, `GET {base}/signal/num?signal=<name>` and
//! `GET {base}/signal?signal=<number>`. Response bodies are the raw text
//! the CLI would have printed.

use std::time::Duration;

use url::Url;

use crate::error::{DespatchError, Result};
use crate::transport::DaemonCommand;
use crate::types::{CommandResult, CompletionStatus, NumericSignal};

/// Transport for a daemon reached through an HTTP agent.
#[derive(Debug, Clone)]
pub struct EndpointTransport {
    base: Url,
    client: reqwest::Client,
}

impl EndpointTransport {
    /// Creates an endpoint transport with the client's default timeouts.
    pub fn new(base: Url) -> Result<Self> {
        Self::with_timeout(base, None)
    }

    /// Creates an endpoint transport with an optional per-request timeout.
    pub fn with_timeout(base: Url, timeout: Option<Duration>) -> Result<Self> {
        if !matches!(base.scheme(), "http" | "https") {
            return Err(DespatchError::config(format!(
                "endpoint {base} must use http or https"
            )));
        }
        if base.cannot_be_a_base() {
            return Err(DespatchError::config(format!(
                "endpoint {base} cannot carry a path"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DespatchError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base, client })
    }

    /// Returns the agent base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Returns the URL answering a daemon command.
    pub fn command_url(&self, command: &DaemonCommand) -> Result<Url> {
        match command {
            DaemonCommand::Version => self.join(&["version"], None),
            DaemonCommand::Signum(sig) => {
                self.join(&["signal", "num"], Some(("signal", sig.name())))
            }
        }
    }

    /// Returns the URL that delivers a numeric signal.
    pub fn signal_url(&self, signal: NumericSignal) -> Result<Url> {
        self.join(&["signal"], Some(("signal", &signal.to_string())))
    }

    /// Issues a GET and returns the body. Non-2xx responses are errors.
    pub async fn get(&self, url: Url) -> Result<CommandResult> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DespatchError::execution(url.as_str(), format!("request failed: {e}")))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            DespatchError::execution(url.as_str(), format!("failed to read body: {e}"))
        })?;

        if !status.is_success() {
            return Err(DespatchError::execution(
                url.as_str(),
                format!(
                    "agent returned {status}: {}",
                    String::from_utf8_lossy(&body).trim()
                ),
            ));
        }

        Ok(CommandResult::new(
            body.to_vec(),
            CompletionStatus::Http(status.as_u16()),
        ))
    }

    /// Runs a daemon command through the agent.
    pub async fn run(&self, command: &DaemonCommand) -> Result<CommandResult> {
        self.get(self.command_url(command)?).await
    }

    /// Asks the agent to deliver a numeric signal.
    pub async fn send_signal(&self, signal: NumericSignal) -> Result<()> {
        self.get(self.signal_url(signal)?).await?;
        tracing::debug!(endpoint = %self.base, signal = signal.as_i32(), "sent signal");
        Ok(())
    }

    fn join(&self, segments: &[&str], query: Option<(&str, &str)>) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| DespatchError::config(format!("endpoint {} cannot carry a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }
}
