use axum::{
    extract::{Extension, Query, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    middleware::auth::CurrentSession,
    models::session::SessionData,
    services::github::authorize_url,
    state::AppState,
    types::SessionId,
    utils::cookies::{build_session_clear_cookie, build_session_cookie},
};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

pub async fn login(State(state): State<AppState>) -> Result<Redirect, AppError> {
    let url = authorize_url(&state.config)?;
    Ok(Redirect::to(url.as_str()))
}

pub async fn callback(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    if let Some(error) = query.error {
        tracing::warn!(
            error = %error,
            description = query.error_description.as_deref().unwrap_or_default(),
            "GitHub authorization was not granted"
        );
        return Err(AppError::BadRequest("GitHub authorization was not granted".into()));
    }
    let code = query
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".into()))?;

    let token = state.github.exchange_code(&code).await.map_err(|e| {
        AppError::InternalServerError(
            anyhow::Error::new(e).context("Error exchanging code for token"),
        )
    })?;

    // A fresh id on every sign-in; the previous session, if any, is dropped.
    if let Some(previous) = current.id {
        state
            .sessions
            .destroy(&previous)
            .await
            .map_err(|e| AppError::InternalServerError(e.context("Failed to replace session")))?;
    }
    let session_id = SessionId::new();
    let max_age = Duration::seconds(state.config.session_max_age_seconds as i64);
    state
        .sessions
        .set(session_id, SessionData::authenticated(token, max_age))
        .await
        .map_err(|e| AppError::InternalServerError(e.context("Failed to store session")))?;

    tracing::info!(session_id = %session_id, "GitHub OAuth successful");

    let cookie = build_session_cookie(&session_id, &state.config);
    Ok((
        [(SET_COOKIE, cookie)],
        Redirect::to(&state.config.frontend_base_url),
    )
        .into_response())
}

pub async fn status(Extension(current): Extension<CurrentSession>) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        authenticated: current.is_authenticated(),
    })
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Response, AppError> {
    if let Some(id) = current.id {
        state
            .sessions
            .destroy(&id)
            .await
            .map_err(|e| AppError::InternalServerError(e.context("Failed to logout")))?;
    }

    let cookie = build_session_clear_cookie(&state.config);
    Ok(([(SET_COOKIE, cookie)], Json(LogoutResponse { success: true })).into_response())
}
