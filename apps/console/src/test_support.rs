//! In-process stand-in for the portfolio backend, bound to an ephemeral port.
//!
//! Records every request it sees so tests can assert on the exact wire
//! contents, and applies manual updates so a re-fetch reflects them.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const STUB_PASSWORD: &str = "correct";
/// 26 characters, enough for the strict guard.
pub const STUB_TOKEN: &str = "abcdefghijklmnopqrstuvwxyz";
pub const STUB_CDN: &str = "https://cdn.stub.test";

#[derive(Debug, Clone)]
pub struct StubConfig {
    /// Token returned for the right password; `None` answers 200 without one.
    pub login_token: Option<String>,
    pub portfolio_fails: bool,
    /// Serve this many portfolio reads, then fail every later one.
    pub portfolio_reads_before_failure: Option<usize>,
    pub manual_update_fails: bool,
    pub sync_fails: bool,
    pub sync_requires_auth: bool,
    pub portfolio: Value,
    pub sync_snapshot: Value,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            login_token: Some(STUB_TOKEN.to_string()),
            portfolio_fails: false,
            portfolio_reads_before_failure: None,
            manual_update_fails: false,
            sync_fails: false,
            sync_requires_auth: true,
            portfolio: json!({
                "_id": "65f0c0ffee",
                "fullName": "Stub Dev",
                "bio": "Builds things",
                "socials": { "github": "https://github.com/stub" },
                "experience": [
                    { "role": "Engineer", "company": "Acme", "duration": "2021-2023" },
                    { "role": "Lead", "company": "Globex", "duration": "2023-" }
                ],
                "projects": [{ "title": "Folio", "coverImage": "" }],
                "skills": ["Rust", { "name": "Go", "iconUrl": "https://cdn.stub.test/go.svg" }]
            }),
            sync_snapshot: json!({ "fullName": "X", "experience": [], "projects": [] }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MultipartCapture {
    pub authorization: Option<String>,
    pub text_parts: Vec<(String, String)>,
    /// `(part name, file name, byte length)`
    pub file_parts: Vec<(String, String, usize)>,
}

impl MultipartCapture {
    pub fn file_part_names(&self) -> Vec<&str> {
        self.file_parts.iter().map(|(n, _, _)| n.as_str()).collect()
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.text_parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub login_passwords: Vec<String>,
    pub portfolio_gets: usize,
    pub manual_updates: Vec<MultipartCapture>,
    pub syncs: Vec<MultipartCapture>,
}

#[derive(Clone)]
struct StubState {
    config: Arc<StubConfig>,
    portfolio: Arc<Mutex<Value>>,
    recorded: Arc<Mutex<Recorded>>,
}

pub struct StubBackend {
    addr: SocketAddr,
    state: StubState,
}

impl StubBackend {
    pub async fn start(config: StubConfig) -> Self {
        let state = StubState {
            portfolio: Arc::new(Mutex::new(config.portfolio.clone())),
            config: Arc::new(config),
            recorded: Arc::new(Mutex::new(Recorded::default())),
        };

        let app = Router::new()
            .route("/api/auth/login", post(handle_login))
            .route("/api/portfolio", get(handle_get_portfolio))
            .route("/api/portfolio/manual-update", post(handle_manual_update))
            .route("/api/portfolio/sync", post(handle_sync))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn recorded(&self) -> Recorded {
        self.state.recorded.lock().unwrap().clone()
    }

    pub fn portfolio(&self) -> Value {
        self.state.portfolio.lock().unwrap().clone()
    }
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {STUB_TOKEN}"))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Invalid token" })),
    )
        .into_response()
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "stub failure" })),
    )
        .into_response()
}

async fn capture(headers: &HeaderMap, mut multipart: Multipart) -> MultipartCapture {
    let mut captured = MultipartCapture {
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        ..Default::default()
    };
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(String::from) {
            Some(file_name) => {
                let len = field.bytes().await.map(|b| b.len()).unwrap_or_default();
                captured.file_parts.push((name, file_name, len));
            }
            None => {
                let text = field.text().await.unwrap_or_default();
                captured.text_parts.push((name, text));
            }
        }
    }
    captured
}

async fn handle_login(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let password = body["password"].as_str().unwrap_or_default().to_string();
    state
        .recorded
        .lock()
        .unwrap()
        .login_passwords
        .push(password.clone());

    if password != STUB_PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid key" })),
        )
            .into_response();
    }
    match &state.config.login_token {
        Some(token) => Json(json!({ "token": token })).into_response(),
        None => Json(json!({ "message": "ok" })).into_response(),
    }
}

async fn handle_get_portfolio(State(state): State<StubState>) -> Response {
    let served = {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.portfolio_gets += 1;
        recorded.portfolio_gets
    };
    let exhausted = state
        .config
        .portfolio_reads_before_failure
        .is_some_and(|limit| served > limit);
    if state.config.portfolio_fails || exhausted {
        return server_error();
    }
    Json(state.portfolio.lock().unwrap().clone()).into_response()
}

async fn handle_manual_update(
    State(state): State<StubState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let captured = capture(&headers, multipart).await;
    state
        .recorded
        .lock()
        .unwrap()
        .manual_updates
        .push(captured.clone());

    if !is_authorized(&headers) {
        return unauthorized();
    }
    if state.config.manual_update_fails {
        return server_error();
    }

    let mut portfolio = state.portfolio.lock().unwrap();
    apply_update(&mut portfolio, &captured);
    Json(json!({ "message": "updated" })).into_response()
}

async fn handle_sync(
    State(state): State<StubState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let captured = capture(&headers, multipart).await;
    state.recorded.lock().unwrap().syncs.push(captured);

    if state.config.sync_requires_auth && !is_authorized(&headers) {
        return unauthorized();
    }
    if state.config.sync_fails {
        return server_error();
    }

    *state.portfolio.lock().unwrap() = state.config.sync_snapshot.clone();
    Json(state.config.sync_snapshot.clone()).into_response()
}

/// Writes submitted fields into the stored document and assigns CDN URLs to uploads.
fn apply_update(portfolio: &mut Value, captured: &MultipartCapture) {
    for (name, value) in &captured.text_parts {
        let parsed = match name.as_str() {
            "fullName" | "bio" | "aboutMe" | "email" => Value::String(value.clone()),
            _ => serde_json::from_str(value).unwrap_or(Value::Null),
        };
        portfolio[name.as_str()] = parsed;
    }
    for (name, file_name, _) in &captured.file_parts {
        let url = Value::String(format!("{STUB_CDN}/{file_name}"));
        if name == "resume" {
            portfolio["resumeUrl"] = url;
            continue;
        }
        let Some((kind, index)) = name.rsplit_once('-') else {
            continue;
        };
        let Ok(index) = index.parse::<usize>() else {
            continue;
        };
        let (list, field) = match kind {
            "logo" => ("experience", "companyLogo"),
            "projectCover" => ("projects", "coverImage"),
            "skillIcon" => ("skills", "iconUrl"),
            _ => continue,
        };
        if let Some(entry) = portfolio[list].get_mut(index) {
            entry[field] = url;
        }
    }
}
