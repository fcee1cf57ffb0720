//! Workflow job payloads as returned by GitHub and as exposed by this API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
/// A single job from `GET /repos/{owner}/{repo}/actions/runs/{run_id}/jobs`.
/// Only the fields this service reads are declared.
pub struct GitHubJob {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
/// Envelope of the jobs listing endpoint.
pub struct JobList {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub jobs: Vec<GitHubJob>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Operating system family a job ran on.
pub enum RunnerKind {
    Ubuntu,
    Windows,
    Macos,
    Unknown,
}

impl RunnerKind {
    /// Classifies a runner from its labels. The labels are joined and
    /// lower-cased, then matched by substring; the first hit in the order
    /// ubuntu, windows, macos wins.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let joined = labels
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        if joined.contains("ubuntu") {
            RunnerKind::Ubuntu
        } else if joined.contains("windows") {
            RunnerKind::Windows
        } else if joined.contains("macos") {
            RunnerKind::Macos
        } else {
            RunnerKind::Unknown
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Normalized job with its computed duration.
pub struct JobRecord {
    pub job_id: u64,
    pub name: String,
    pub runner: RunnerKind,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Elapsed seconds, never negative. Zero while the job is in progress.
    pub duration_seconds: f64,
    /// Set when either timestamp is still missing upstream.
    pub in_progress: bool,
}
