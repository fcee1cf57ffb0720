use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

use crate::utils::cookies::SameSite;

pub const REQUIRED_ENV: [&str; 7] = [
    "GITHUB_API_BASE",
    "OAUTH_BASE_URL",
    "GITHUB_CLIENT_ID",
    "GITHUB_CLIENT_SECRET",
    "GITHUB_CALLBACK_URL",
    "SESSION_SECRET",
    "FRONTEND_BASE_URL",
];

const DEFAULT_SESSION_AGE_SECONDS: u64 = 86_400;
/// Upper bound for `SESSION_MAX_AGE_SECONDS`: one year.
pub const MAX_SESSION_AGE_SECONDS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub github_api_base: String,
    pub oauth_base_url: String,
    pub github_client_id: String,
    pub github_client_secret: String,
    pub github_callback_url: String,
    pub session_secret: String,
    pub frontend_base_url: String,
    pub port: u16,
    pub session_max_age_seconds: u64,
    pub session_sweep_interval_seconds: u64,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Every key in
    /// [`REQUIRED_ENV`] must resolve to a non-empty value.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(missing) = REQUIRED_ENV
            .iter()
            .find(|key| lookup(**key).map_or(true, |v| v.trim().is_empty()))
        {
            return Err(anyhow!("Missing environment variable: {}", missing));
        }
        let required = |key: &str| lookup(key).unwrap_or_default().trim().to_string();
        let url_value = |key: &str| -> anyhow::Result<String> {
            let raw = required(key);
            Url::parse(&raw).map_err(|e| anyhow!("Invalid {} value {}: {}", key, raw, e))?;
            Ok(raw.trim_end_matches('/').to_string())
        };

        let github_api_base = url_value("GITHUB_API_BASE")?;
        let oauth_base_url = url_value("OAUTH_BASE_URL")?;
        let github_callback_url = url_value("GITHUB_CALLBACK_URL")?;
        let frontend_base_url = url_value("FRONTEND_BASE_URL")?;

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        let session_max_age_seconds = match lookup("SESSION_MAX_AGE_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| (1..=MAX_SESSION_AGE_SECONDS).contains(secs))
                .ok_or_else(|| anyhow!("Invalid SESSION_MAX_AGE_SECONDS value: {}", raw))?,
            None => DEFAULT_SESSION_AGE_SECONDS,
        };

        let session_sweep_interval_seconds = lookup("SESSION_SWEEP_INTERVAL_SECONDS")
            .unwrap_or_else(|| "300".to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .unwrap_or(300);

        let cookie_secure = lookup("COOKIE_SECURE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let cookie_same_site = match lookup("COOKIE_SAME_SITE") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow!("Invalid COOKIE_SAME_SITE value: {}", raw))?,
            None => SameSite::Lax,
        };

        Ok(Config {
            github_api_base,
            oauth_base_url,
            github_client_id: required("GITHUB_CLIENT_ID"),
            github_client_secret: required("GITHUB_CLIENT_SECRET"),
            github_callback_url,
            session_secret: required("SESSION_SECRET"),
            frontend_base_url,
            port,
            session_max_age_seconds,
            session_sweep_interval_seconds,
            cookie_secure,
            cookie_same_site,
        })
    }
}
