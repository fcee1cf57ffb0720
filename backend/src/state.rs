use std::sync::Arc;

use crate::{
    config::Config,
    services::{github::GitHubApi, session_store::SessionStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub github: Arc<dyn GitHubApi>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        github: Arc<dyn GitHubApi>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            github,
            sessions,
        }
    }
}
