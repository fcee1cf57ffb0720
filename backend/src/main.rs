use std::{net::SocketAddr, sync::Arc, time::Duration};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use greenci_backend::{
    config::Config,
    router::build_router,
    services::{github::GitHubClient, session_store::MemorySessionStore},
    state::AppState,
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

fn spawn_session_sweeper(store: Arc<MemorySessionStore>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let purged = store.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "Purged expired sessions");
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "greenci_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; a missing variable aborts startup.
    let config = Config::load()?;
    tracing::info!(
        github_api_base = %config.github_api_base,
        oauth_base_url = %config.oauth_base_url,
        github_client_id = %config.github_client_id,
        github_client_secret = %mask_secret(&config.github_client_secret),
        github_callback_url = %config.github_callback_url,
        session_secret = %mask_secret(&config.session_secret),
        frontend_base_url = %config.frontend_base_url,
        session_max_age_seconds = config.session_max_age_seconds,
        cookie_secure = config.cookie_secure,
        "Loaded configuration from environment/.env"
    );

    let github = Arc::new(GitHubClient::new(&config)?);
    let sessions = Arc::new(MemorySessionStore::new());
    spawn_session_sweeper(
        sessions.clone(),
        Duration::from_secs(config.session_sweep_interval_seconds),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = build_router(AppState::new(config, github, sessions))?;

    // Start server
    tracing::info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
