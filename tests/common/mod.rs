use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::{Barrier, Mutex};

use signup_ledger::config::{Config, RepoConfig};
use signup_ledger::ledger::github::GitHubContents;

pub const TOKEN: &str = "test-token";
pub const USER_AGENT: &str = "signup-ledger-tests";
pub const INITIAL_SHA: &str = "sha-0";

/// Behaviour switches for the fake contents API.
#[derive(Default)]
pub struct FakeOptions {
    /// Leave `sha` out of read responses.
    pub omit_sha: bool,
    /// Leave `content` out of read responses.
    pub omit_content: bool,
    /// Answer reads the way GitHub does for files over 1 MB.
    pub too_large: bool,
    /// Answer every write with this status instead of applying it.
    pub fail_writes: Option<StatusCode>,
    /// Hold each reader until this many reads are in flight.
    pub read_gate: Option<usize>,
}

struct Ledger {
    text: String,
    sha: String,
    version: usize,
}

/// Recorded upstream traffic.
pub struct FakeState {
    ledger: Mutex<Ledger>,
    pub reads: AtomicUsize,
    pub writes: Mutex<Vec<Value>>,
    pub headers: Mutex<Vec<HeaderMap>>,
    omit_sha: bool,
    omit_content: bool,
    too_large: bool,
    fail_writes: Option<StatusCode>,
    read_gate: Option<Barrier>,
}

impl FakeState {
    pub async fn text(&self) -> String {
        self.ledger.lock().await.text.clone()
    }

    pub async fn sha(&self) -> String {
        self.ledger.lock().await.sha.clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub async fn write_count(&self) -> usize {
        self.writes.lock().await.len()
    }
}

/// In-process stand-in for the GitHub contents API.
pub struct FakeGitHub {
    pub addr: SocketAddr,
    pub state: Arc<FakeState>,
}

impl FakeGitHub {
    pub async fn spawn(initial: &str, opts: FakeOptions) -> FakeGitHub {
        let state = Arc::new(FakeState {
            ledger: Mutex::new(Ledger {
                text: initial.to_string(),
                sha: INITIAL_SHA.to_string(),
                version: 0,
            }),
            reads: AtomicUsize::new(0),
            writes: Mutex::new(Vec::new()),
            headers: Mutex::new(Vec::new()),
            omit_sha: opts.omit_sha,
            omit_content: opts.omit_content,
            too_large: opts.too_large,
            fail_writes: opts.fail_writes,
            read_gate: opts.read_gate.map(Barrier::new),
        });

        let app = Router::new()
            .route(
                "/repos/{owner}/{repo}/contents/{*path}",
                get(read_file).put(write_file),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake GitHub");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake GitHub failed");
        });

        FakeGitHub { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

/// GitHub wraps base64 content at 60 columns.
fn wrapped_base64(text: &str) -> String {
    STANDARD
        .encode(text.as_bytes())
        .as_bytes()
        .chunks(60)
        .map(|c| format!("{}\n", std::str::from_utf8(c).unwrap()))
        .collect()
}

async fn read_file(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    state.reads.fetch_add(1, Ordering::SeqCst);
    state.headers.lock().await.push(headers.clone());

    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Bad credentials" })),
        )
            .into_response();
    }

    if let Some(gate) = &state.read_gate {
        gate.wait().await;
    }

    let ledger = state.ledger.lock().await;
    let mut body = json!({
        "type": "file",
        "encoding": "base64",
        "path": "signups.csv",
        "content": wrapped_base64(&ledger.text),
        "sha": ledger.sha,
    });
    let obj = body.as_object_mut().unwrap();
    if state.too_large {
        obj.insert("encoding".to_string(), json!("none"));
        obj.insert("content".to_string(), json!(""));
        obj.insert("size".to_string(), json!(5_000_000));
    }
    if state.omit_sha {
        obj.remove("sha");
    }
    if state.omit_content {
        obj.remove("content");
    }
    (StatusCode::OK, Json(body)).into_response()
}

async fn write_file(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.writes.lock().await.push(body.clone());
    state.headers.lock().await.push(headers.clone());

    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Bad credentials" })),
        )
            .into_response();
    }

    if let Some(status) = state.fail_writes {
        return (status, Json(json!({ "message": "Validation Failed" }))).into_response();
    }

    let mut ledger = state.ledger.lock().await;
    if body["sha"].as_str() != Some(ledger.sha.as_str()) {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "message": format!("signups.csv does not match {}", ledger.sha),
            })),
        )
            .into_response();
    }

    let content = body["content"].as_str().unwrap_or_default();
    let bytes = STANDARD.decode(content).expect("client sent invalid base64");
    ledger.text = String::from_utf8(bytes).expect("client sent invalid UTF-8");
    ledger.version += 1;
    ledger.sha = format!("sha-{}", ledger.version);

    (
        StatusCode::OK,
        Json(json!({
            "content": { "path": "signups.csv", "sha": ledger.sha },
            "commit": { "message": body["message"] },
        })),
    )
        .into_response()
}

/// A running signup ledger wired to a fake GitHub.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub github: FakeGitHub,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn upstream(&self) -> &FakeState {
        &self.github.state
    }

    /// Submit a JSON body, return (body, status).
    pub async fn submit_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/"))
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit form-urlencoded data, return (body, status).
    pub async fn submit_form(&self, data: &[(&str, &str)]) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/"))
            .form(data)
            .send()
            .await
            .expect("submit form failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn test_config(api_url: String) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        route: "/".to_string(),
        max_body_size: 65_536,
        upstream_timeout_secs: 5,
        log_level: "warn".to_string(),
        repo: RepoConfig {
            repo: "acme/signups".to_string(),
            file_path: "signups.csv".to_string(),
            token: TOKEN.to_string(),
            api_url,
            user_agent: USER_AGENT.to_string(),
        },
    }
}

/// Spawn the app against a fake GitHub holding `initial`.
pub async fn spawn_app(initial: &str) -> TestApp {
    spawn_app_with(initial, FakeOptions::default()).await
}

pub async fn spawn_app_with(initial: &str, opts: FakeOptions) -> TestApp {
    let github = FakeGitHub::spawn(initial, opts).await;
    let config = test_config(github.url());
    let addr = serve(config).await;

    TestApp {
        addr,
        client: Client::new(),
        github,
    }
}

/// Serve the app with `config` on a random port.
pub async fn serve(config: Config) -> SocketAddr {
    let store = GitHubContents::new(config.repo.clone(), Duration::from_secs(5))
        .expect("Failed to build GitHub client");
    let app = signup_ledger::build_app(config, Arc::new(store));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    addr
}

/// A body that passes every check.
pub fn valid_submission() -> Value {
    json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "censorship": "Strongly opposed",
        "address": "12 St James's Square",
        "phone": "555-0100",
        "securityCheck": "8",
    })
}

/// Split one rendered row back into its unquoted fields.
pub fn parse_row(line: &str) -> Vec<String> {
    let inner = line
        .strip_prefix('"')
        .and_then(|l| l.strip_suffix('"'))
        .unwrap_or_else(|| panic!("row is not fully quoted: {line}"));
    inner
        .split("\",\"")
        .map(|f| f.replace("\"\"", "\""))
        .collect()
}
