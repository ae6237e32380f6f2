//! Endpoint transport against an in-process HTTP agent.
//!
//! The agent mimics the sidecar that exposes keepalived's CLI over HTTP:
//! `/version`, `/signal/num?signal=<name>` and `/signal?signal=<number>`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use parking_lot::Mutex;
use url::Url;

use despatch_core::{
    CommandResult, ContainerTransport, DespatchError, EndpointTransport, LogicalSignal,
    NumericSignal, RuntimeClient, SignalDespatcher, SignalResolver, Transport, VersionProbe,
    Version,
};

#[derive(Clone)]
struct Agent {
    version: Option<String>,
    signums: HashMap<String, String>,
    signal_status: StatusCode,
    requests: Arc<Mutex<Vec<String>>>,
}

impl Agent {
    fn new(version: Option<&str>) -> Self {
        Self {
            version: version.map(str::to_string),
            signums: HashMap::from([
                ("DATA".to_string(), "Signum for DATA is 10\n".to_string()),
                ("STATS".to_string(), "Signum for STATS is 12\n".to_string()),
                ("JSON".to_string(), "Signum for JSON is 36\n".to_string()),
            ]),
            signal_status: StatusCode::OK,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    fn delivered(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|r| r.strip_prefix("signal=").map(str::to_string))
            .collect()
    }

    async fn serve(self) -> Url {
        let app = Router::new()
            .route("/agent/version", get(version))
            .route("/agent/signal/num", get(signal_num))
            .route("/agent/signal", get(signal))
            .with_state(self);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Url::parse(&format!("http://{addr}/agent/")).unwrap()
    }
}

async fn version(State(agent): State<Agent>) -> (StatusCode, String) {
    agent.requests.lock().push("version".to_string());
    match agent.version {
        Some(v) => (StatusCode::OK, v),
        None => (StatusCode::NOT_FOUND, "version unavailable".to_string()),
    }
}

async fn signal_num(
    State(agent): State<Agent>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let name = query.get("signal").cloned().unwrap_or_default();
    agent.requests.lock().push(format!("signum={name}"));
    match agent.signums.get(&name) {
        Some(answer) => (StatusCode::OK, answer.clone()),
        None => (StatusCode::BAD_REQUEST, format!("unknown signal {name}")),
    }
}

async fn signal(
    State(agent): State<Agent>,
    Query(query): Query<HashMap<String, String>>,
) -> StatusCode {
    let number = query.get("signal").cloned().unwrap_or_default();
    agent.requests.lock().push(format!("signal={number}"));
    agent.signal_status
}

fn endpoint(base: Url) -> Transport {
    Transport::Endpoint(EndpointTransport::new(base).unwrap())
}

#[tokio::test]
async fn modern_agent_resolves_live_and_delivers() {
    let agent = Agent::new(Some("Keepalived v2.2.8 (04/04,2023)\n"));
    let base = agent.clone().serve().await;
    let despatcher = SignalDespatcher::new(endpoint(base));

    let number = despatcher.despatch(LogicalSignal::Stats).await.unwrap();

    assert_eq!(number, NumericSignal::new(12));
    assert_eq!(
        agent.requests(),
        vec!["version", "signum=STATS", "signal=12"]
    );
}

#[tokio::test]
async fn legacy_agent_skips_signum_endpoint() {
    let agent = Agent::new(Some("Keepalived v1.3.5 (03/19,2017)\n"));
    let base = agent.clone().serve().await;
    let despatcher = SignalDespatcher::new(endpoint(base));

    let number = despatcher.despatch(LogicalSignal::Data).await.unwrap();

    assert_eq!(number, NumericSignal::new(10));
    assert_eq!(agent.requests(), vec!["version", "signal=10"]);
}

#[tokio::test]
async fn missing_version_endpoint_assumes_latest() {
    let agent = Agent::new(None);
    let base = agent.clone().serve().await;
    let transport = endpoint(base);

    assert_eq!(VersionProbe::detect(&transport).await, None);

    let despatcher = SignalDespatcher::new(transport);
    let number = despatcher.despatch(LogicalSignal::Json).await.unwrap();
    assert_eq!(number, NumericSignal::new(36));
    assert_eq!(agent.delivered(), vec!["36"]);
}

#[tokio::test]
async fn signum_rejection_is_execution_error() {
    let mut agent = Agent::new(Some("Keepalived v2.0.20\n"));
    agent.signums.clear();
    let base = agent.clone().serve().await;
    let despatcher = SignalDespatcher::new(endpoint(base));

    let err = despatcher.despatch(LogicalSignal::Data).await.unwrap_err();

    assert!(matches!(err, DespatchError::Execution { ref message, .. } if message.contains("400")));
    assert!(agent.delivered().is_empty());
}

#[tokio::test]
async fn signal_endpoint_failure_is_execution_error() {
    let mut agent = Agent::new(Some("Keepalived v2.0.20\n"));
    agent.signal_status = StatusCode::INTERNAL_SERVER_ERROR;
    let base = agent.clone().serve().await;
    let despatcher = SignalDespatcher::new(endpoint(base));

    let err = despatcher.despatch(LogicalSignal::Stats).await.unwrap_err();

    assert!(matches!(err, DespatchError::Execution { .. }));
    assert_eq!(agent.delivered(), vec!["12"]);
}

/// Runtime double answering exactly like the HTTP agent.
struct ScriptedRuntime {
    version: String,
}

#[async_trait]
impl RuntimeClient for ScriptedRuntime {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn exec(&self, _container: &str, argv: &[String]) -> despatch_core::Result<CommandResult> {
        let output = match argv.get(1).map(String::as_str) {
            Some("-v") => self.version.clone(),
            Some("--signum") => match argv.get(2).map(String::as_str) {
                Some("DATA") => "Signum for DATA is 10\n".to_string(),
                Some("STATS") => "Signum for STATS is 12\n".to_string(),
                Some("JSON") => "Signum for JSON is 36\n".to_string(),
                _ => String::new(),
            },
            _ => String::new(),
        };
        Ok(CommandResult::success(output))
    }

    async fn kill(&self, _container: &str, _signal: &str) -> despatch_core::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn resolution_is_identical_across_transports() {
    for version in ["Keepalived v1.3.5\n", "Keepalived v1.3.8\n", "Keepalived v2.2.8\n"] {
        let base = Agent::new(Some(version)).serve().await;
        let http = endpoint(base);
        let container = Transport::Container(ContainerTransport::new(
            "keepalived",
            Arc::new(ScriptedRuntime {
                version: version.to_string(),
            }),
        ));

        assert_eq!(
            VersionProbe::detect(&http).await,
            VersionProbe::detect(&container).await
        );

        for signal in LogicalSignal::ALL {
            let over_http = SignalResolver::resolve(signal, &http).await;
            let over_container = SignalResolver::resolve(signal, &container).await;
            match (over_http, over_container) {
                (Ok(a), Ok(b)) => assert_eq!(a, b, "{signal} on {version:?}"),
                (Err(a), Err(b)) => {
                    assert!(a.is_configuration() && b.is_configuration(), "{a} / {b}");
                }
                (a, b) => panic!("{signal} on {version:?} diverged: {a:?} vs {b:?}"),
            }
        }
    }
}

#[tokio::test]
async fn detect_reads_first_line_of_body() {
    let agent = Agent::new(Some("Keepalived v2.1.5 (07/13,2020)\n\nCopyright(C) 2001-2020\n"));
    let base = agent.serve().await;

    assert_eq!(
        VersionProbe::detect(&endpoint(base)).await,
        Some(Version::new(2, 1, 5))
    );
}
