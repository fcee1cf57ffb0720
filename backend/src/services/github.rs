//! GitHub REST and OAuth access.
//!
//! Handlers only see the [`GitHubApi`] trait so tests can substitute a fake
//! without touching the network.

use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, HeaderValue},
    Client, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::{config::Config, models::job::JobList};

/// Scope requested during authorization.
pub const OAUTH_SCOPE: &str = "repo actions:read";
pub const AUTHORIZE_PATH: &str = "login/oauth/authorize";
pub const ACCESS_TOKEN_PATH: &str = "login/oauth/access_token";
/// GitHub caps `per_page` at 100; jobs are fetched in a single call.
const JOBS_PER_PAGE: &str = "100";
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("greenci-backend/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("base url cannot carry a path: {0}")]
    InvalidBase(String),
    #[error("token exchange rejected: {0}")]
    TokenExchange(String),
}

impl UpstreamError {
    /// HTTP status GitHub answered with, when it answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Trades an OAuth authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String, UpstreamError>;

    /// Raw `GET /repos/{owner}/{repo}/actions/runs` payload.
    async fn list_workflow_runs(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Value, UpstreamError>;

    /// `GET /repos/{owner}/{repo}/actions/runs/{run_id}/jobs`.
    async fn list_run_jobs(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        run_id: &str,
    ) -> Result<JobList, UpstreamError>;
}

/// Builds the browser redirect target for the start of the OAuth flow.
pub fn authorize_url(config: &Config) -> anyhow::Result<Url> {
    let base = Url::parse(&config.oauth_base_url)?;
    let mut url = join_segments(&base, &AUTHORIZE_PATH.split('/').collect::<Vec<_>>())?;
    url.query_pairs_mut()
        .append_pair("client_id", &config.github_client_id)
        .append_pair("redirect_uri", &config.github_callback_url)
        .append_pair("scope", OAUTH_SCOPE);
    Ok(url)
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, UpstreamError> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| UpstreamError::InvalidBase(base.to_string()))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

// GitHub answers 200 even for rejected codes, with `error` set instead of
// `access_token`.
#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// reqwest-backed [`GitHubApi`].
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: Url,
    oauth_base: Url,
    client_id: String,
    client_secret: String,
    callback_url: String,
}

impl GitHubClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            api_base: Url::parse(&config.github_api_base)?,
            oauth_base: Url::parse(&config.oauth_base_url)?,
            client_id: config.github_client_id.clone(),
            client_secret: config.github_client_secret.clone(),
            callback_url: config.github_callback_url.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &str,
    ) -> Result<T, UpstreamError> {
        tracing::debug!(url = %url, "Calling GitHub API");
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE))
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

async fn ensure_success(response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(UpstreamError::Status { status, body })
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn exchange_code(&self, code: &str) -> Result<String, UpstreamError> {
        let url = join_segments(
            &self.oauth_base,
            &ACCESS_TOKEN_PATH.split('/').collect::<Vec<_>>(),
        )?;
        let response = self
            .http
            .post(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(&TokenExchangeRequest {
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                code,
                redirect_uri: &self.callback_url,
            })
            .send()
            .await?;
        let payload: TokenExchangeResponse = ensure_success(response).await?.json().await?;

        match payload.access_token.filter(|token| !token.is_empty()) {
            Some(token) => Ok(token),
            None => Err(UpstreamError::TokenExchange(
                payload
                    .error_description
                    .or(payload.error)
                    .unwrap_or_else(|| "response carried no access_token".to_string()),
            )),
        }
    }

    async fn list_workflow_runs(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Value, UpstreamError> {
        let url = join_segments(
            &self.api_base,
            &["repos", owner, repo, "actions", "runs"],
        )?;
        self.get_json(url, token).await
    }

    async fn list_run_jobs(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        run_id: &str,
    ) -> Result<JobList, UpstreamError> {
        let mut url = join_segments(
            &self.api_base,
            &["repos", owner, repo, "actions", "runs", run_id, "jobs"],
        )?;
        url.query_pairs_mut().append_pair("per_page", JOBS_PER_PAGE);
        self.get_json(url, token).await
    }
}
