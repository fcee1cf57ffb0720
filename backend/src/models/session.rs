//! Server-side session records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Everything the server remembers about one browser session.
pub struct SessionData {
    /// GitHub OAuth access token, present once the code exchange succeeded.
    pub github_token: Option<String>,
    /// Timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp after which the session reads as absent.
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    pub fn authenticated(github_token: String, max_age: Duration) -> Self {
        let now = Utc::now();
        Self {
            github_token: Some(github_token),
            created_at: now,
            expires_at: now + max_age,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_authenticated(&self) -> bool {
        self.github_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }
}
