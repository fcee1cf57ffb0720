use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, middleware, state::AppState};

/// Assembles every route with its middleware stack.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/auth/github/login", get(handlers::auth::login))
        .route("/auth/github/callback", get(handlers::auth::callback))
        .route("/auth/github/status", get(handlers::auth::status))
        .route("/auth/github/logout", post(handlers::auth::logout));

    let github_routes = Router::new()
        .route(
            "/github/{owner}/{repo}/workflows",
            get(handlers::github::list_workflow_runs),
        )
        .route(
            "/github/{owner}/{repo}/workflows/{workflow_id}",
            get(handlers::github::get_workflow_jobs),
        )
        .route(
            "/github/{owner}/{repo}/workflows/{workflow_id}/summary",
            get(handlers::github::get_workflow_summary),
        )
        .route_layer(axum_middleware::from_fn(
            middleware::auth::require_github_token,
        ));

    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_str(&state.config.frontend_base_url)?)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(24 * 60 * 60));

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .merge(auth_routes)
        .merge(github_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::load_session,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_id::request_id))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}
