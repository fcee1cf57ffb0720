#![allow(dead_code)]
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use greenci_backend::{
    config::Config,
    models::{job::JobList, session::SessionData},
    router::build_router,
    services::{
        github::{GitHubApi, UpstreamError},
        session_store::{MemorySessionStore, SessionStore},
    },
    state::AppState,
    types::SessionId,
    utils::cookies::{sign_session_id, SameSite, SESSION_COOKIE_NAME},
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const FRONTEND: &str = "http://localhost:5173";
pub const SESSION_SECRET: &str = "a_secure_session_secret_for_tests";

pub fn test_config() -> Config {
    Config {
        github_api_base: "https://api.github.test".into(),
        oauth_base_url: "https://github.test".into(),
        github_client_id: "test-client-id".into(),
        github_client_secret: "test-client-secret".into(),
        github_callback_url: "http://localhost:3000/auth/github/callback".into(),
        session_secret: SESSION_SECRET.into(),
        frontend_base_url: FRONTEND.into(),
        port: 3000,
        session_max_age_seconds: 3600,
        session_sweep_interval_seconds: 300,
        cookie_secure: false,
        cookie_same_site: SameSite::Lax,
    }
}

/// In-process stand-in for GitHub. Every trait call is counted and recorded.
pub struct FakeGitHub {
    token: Option<String>,
    runs: Result<Value, StatusCode>,
    jobs: Result<JobList, StatusCode>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl Default for FakeGitHub {
    fn default() -> Self {
        Self {
            token: Some("gho_test_token".into()),
            runs: Ok(json!({ "total_count": 0, "workflow_runs": [] })),
            jobs: Ok(JobList::default()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_codes(mut self) -> Self {
        self.token = None;
        self
    }

    pub fn with_runs(mut self, runs: Value) -> Self {
        self.runs = Ok(runs);
        self
    }

    pub fn with_jobs(mut self, jobs: Value) -> Self {
        self.jobs = Ok(serde_json::from_value(jobs).expect("job list fixture"));
        self
    }

    pub fn failing_with(mut self, status: StatusCode) -> Self {
        self.runs = Err(status);
        self.jobs = Err(status);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().expect("lock seen").clone()
    }

    fn record(&self, call: String) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().expect("lock seen").push(call);
    }
}

fn status_error(status: StatusCode) -> UpstreamError {
    UpstreamError::Status {
        status,
        body: json!({ "message": "fake failure" }).to_string(),
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn exchange_code(&self, code: &str) -> Result<String, UpstreamError> {
        self.record(format!("exchange_code {code}"));
        self.token
            .clone()
            .ok_or_else(|| UpstreamError::TokenExchange("bad_verification_code".into()))
    }

    async fn list_workflow_runs(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Value, UpstreamError> {
        self.record(format!("list_workflow_runs {token} {owner}/{repo}"));
        self.runs.clone().map_err(status_error)
    }

    async fn list_run_jobs(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        run_id: &str,
    ) -> Result<JobList, UpstreamError> {
        self.record(format!("list_run_jobs {token} {owner}/{repo} {run_id}"));
        self.jobs.clone().map_err(status_error)
    }
}

pub struct TestApp {
    pub router: Router,
    pub github: Arc<FakeGitHub>,
    pub sessions: Arc<MemorySessionStore>,
}

impl TestApp {
    pub fn new(github: FakeGitHub) -> Self {
        Self::with_config(github, test_config())
    }

    pub fn with_config(github: FakeGitHub, config: Config) -> Self {
        let github = Arc::new(github);
        let sessions = Arc::new(MemorySessionStore::new());
        let state = AppState::new(config, github.clone(), sessions.clone());
        let router = build_router(state).expect("build router");
        Self {
            router,
            github,
            sessions,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Runs the OAuth callback and returns the `name=value` cookie pair.
    pub async fn sign_in(&self) -> String {
        let response = self.get("/auth/github/callback?code=test-code", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie_pair(&response).expect("session cookie set")
    }

    /// Stores a session directly, bypassing the OAuth flow.
    pub async fn seed_session(&self, token: &str) -> (SessionId, String) {
        let id = SessionId::new();
        self.sessions
            .set(
                id,
                SessionData::authenticated(token.to_string(), chrono::Duration::hours(1)),
            )
            .await
            .expect("seed session");
        (id, cookie_pair_for(&id))
    }
}

pub fn cookie_pair_for(id: &SessionId) -> String {
    format!(
        "{}={}",
        SESSION_COOKIE_NAME,
        sign_session_id(id, SESSION_SECRET)
    )
}

pub fn set_cookie_header(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

pub fn session_cookie_pair(response: &Response<Body>) -> Option<String> {
    set_cookie_header(response)
        .and_then(|raw| raw.split(';').next().map(|pair| pair.trim().to_string()))
        .filter(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn jobs_fixture() -> Value {
    json!({
        "total_count": 4,
        "jobs": [
            {
                "id": 101,
                "name": "build",
                "status": "completed",
                "started_at": "2024-03-01T10:00:00Z",
                "completed_at": "2024-03-01T10:30:00Z",
                "labels": ["ubuntu-latest"]
            },
            {
                "id": 102,
                "name": "test-windows",
                "status": "completed",
                "started_at": "2024-03-01T10:00:00Z",
                "completed_at": "2024-03-01T10:20:00Z",
                "labels": ["windows-2022"]
            },
            {
                "id": 103,
                "name": "test-linux",
                "status": "completed",
                "started_at": "2024-03-01T10:00:00Z",
                "completed_at": "2024-03-01T10:10:00Z",
                "labels": ["Ubuntu-22.04", "x64"]
            },
            {
                "id": 104,
                "name": "deploy",
                "status": "queued",
                "started_at": null,
                "completed_at": null,
                "labels": ["self-hosted"]
            }
        ]
    })
}
