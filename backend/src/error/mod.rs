use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::github::UpstreamError;

pub const UPSTREAM_DENIED_MESSAGE: &str = "GitHub API rate limit or access denied";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    InternalServerError(anyhow::Error),
}

impl AppError {
    /// Maps an upstream failure onto the local taxonomy: 404 and 403 keep
    /// their status, everything else becomes an internal error tagged with
    /// `failure`.
    pub fn from_upstream(err: UpstreamError, not_found: &str, failure: &str) -> Self {
        match err.status() {
            Some(StatusCode::NOT_FOUND) => {
                tracing::warn!(error = %err, "Upstream resource not found");
                AppError::NotFound(not_found.to_string())
            }
            Some(StatusCode::FORBIDDEN) => {
                tracing::warn!(error = %err, "Upstream denied the request");
                AppError::Forbidden(UPSTREAM_DENIED_MESSAGE.to_string())
            }
            _ => AppError::InternalServerError(
                anyhow::Error::new(err).context(failure.to_string()),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, "FORBIDDEN"),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR",
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json")
    }

    fn upstream_status(status: StatusCode) -> UpstreamError {
        UpstreamError::Status {
            status,
            body: "{}".to_string(),
        }
    }

    #[tokio::test]
    async fn app_error_into_response_maps_status_and_body() {
        let response = AppError::BadRequest("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"], "bad");
        assert_eq!(json["code"], "BAD_REQUEST");

        let response = AppError::Unauthorized("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = response_json(response).await;
        assert_eq!(json["error"], "nope");
        assert_eq!(json["code"], "UNAUTHORIZED");

        let response = AppError::Forbidden("denied".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = response_json(response).await;
        assert_eq!(json["code"], "FORBIDDEN");

        let response = AppError::NotFound("missing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = response_json(response).await;
        assert_eq!(json["error"], "missing");
        assert_eq!(json["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn app_error_internal_maps_to_generic_message() {
        let response = AppError::InternalServerError(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = response_json(response).await;
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["code"], "INTERNAL_SERVER_ERROR");
    }

    #[test]
    fn upstream_not_found_maps_to_not_found() {
        let err = AppError::from_upstream(upstream_status(StatusCode::NOT_FOUND), "gone", "failed");
        assert!(matches!(err, AppError::NotFound(msg) if msg == "gone"));
    }

    #[test]
    fn upstream_forbidden_maps_to_forbidden() {
        let err = AppError::from_upstream(upstream_status(StatusCode::FORBIDDEN), "gone", "failed");
        assert!(matches!(err, AppError::Forbidden(msg) if msg == UPSTREAM_DENIED_MESSAGE));
    }

    #[test]
    fn other_upstream_failures_map_to_internal() {
        for status in [
            StatusCode::UNAUTHORIZED,
            StatusCode::UNPROCESSABLE_ENTITY,
            StatusCode::BAD_GATEWAY,
        ] {
            let err = AppError::from_upstream(upstream_status(status), "gone", "failed");
            match err {
                AppError::InternalServerError(inner) => assert_eq!(inner.to_string(), "failed"),
                other => panic!("unexpected mapping for {status}: {other:?}"),
            }
        }

        let err = AppError::from_upstream(
            UpstreamError::TokenExchange("bad_verification_code".to_string()),
            "gone",
            "failed",
        );
        assert!(matches!(err, AppError::InternalServerError(_)));
    }
}
