use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    models::session::SessionData,
    state::AppState,
    types::SessionId,
    utils::cookies::{extract_cookie_value, verify_signed_session_id, SESSION_COOKIE_NAME},
};

/// Session attached to the current request. Both fields are `None` when the
/// client presented no valid, live session cookie.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    pub id: Option<SessionId>,
    pub data: Option<SessionData>,
}

impl CurrentSession {
    pub fn github_token(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.github_token.as_deref())
            .filter(|token| !token.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.github_token().is_some()
    }
}

/// Bearer token of an authenticated request, inserted by
/// [`require_github_token`].
#[derive(Debug, Clone)]
pub struct GitHubToken(pub String);

pub async fn load_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let cookie_header = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned());
    let current = resolve_session(cookie_header.as_deref(), &state).await?;
    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}

// Rejects the request before it reaches a handler, so no upstream call is made
// for unauthenticated clients.
pub async fn require_github_token(mut request: Request, next: Next) -> Result<Response, AppError> {
    let token = request
        .extensions()
        .get::<CurrentSession>()
        .and_then(CurrentSession::github_token)
        .map(|token| token.to_owned())
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))?;
    request.extensions_mut().insert(GitHubToken(token));

    Ok(next.run(request).await)
}

async fn resolve_session(
    cookie_header: Option<&str>,
    state: &AppState,
) -> Result<CurrentSession, AppError> {
    let Some(raw) = cookie_header.and_then(|raw| extract_cookie_value(raw, SESSION_COOKIE_NAME))
    else {
        return Ok(CurrentSession::default());
    };
    let Some(id) = verify_signed_session_id(&raw, &state.config.session_secret) else {
        tracing::debug!("Ignoring session cookie with invalid signature");
        return Ok(CurrentSession::default());
    };

    let data = state
        .sessions
        .get(&id)
        .await
        .map_err(|e| AppError::InternalServerError(e.context("Failed to load session")))?;

    Ok(CurrentSession {
        id: data.as_ref().map(|_| id),
        data,
    })
}
