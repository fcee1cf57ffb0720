use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::job::{GitHubJob, JobRecord, RunnerKind},
    services::{
        carbon::{self, CarbonEstimate},
        github::GitHubApi,
    },
};

pub const RUN_NOT_FOUND_MESSAGE: &str = "Workflow run not found";
pub const JOBS_FAILURE_MESSAGE: &str = "Failed to fetch workflow jobs";

/// Normalized jobs of one run with their aggregate figures.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowJobs {
    pub jobs: Vec<JobRecord>,
    pub total_duration_seconds: f64,
    pub carbon: CarbonEstimate,
}

impl WorkflowJobs {
    pub fn from_jobs(jobs: Vec<JobRecord>) -> Self {
        let total_duration_seconds: f64 = jobs.iter().map(|job| job.duration_seconds).sum();
        Self {
            carbon: carbon::estimate(total_duration_seconds),
            jobs,
            total_duration_seconds,
        }
    }

    /// Runner kinds in order of first appearance, without repeats.
    pub fn runner_types(&self) -> Vec<RunnerKind> {
        let mut seen = Vec::new();
        for job in &self.jobs {
            if !seen.contains(&job.runner) {
                seen.push(job.runner);
            }
        }
        seen
    }
}

/// Elapsed seconds between two instants, clamped at zero.
pub fn duration_seconds(started_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> f64 {
    let millis = (completed_at - started_at).num_milliseconds();
    (millis as f64 / 1000.0).max(0.0)
}

pub fn normalize_job(job: GitHubJob) -> JobRecord {
    let runner = RunnerKind::from_labels(job.labels.as_slice());
    let (duration_seconds, in_progress) = match (job.started_at, job.completed_at) {
        (Some(started), Some(completed)) => (duration_seconds(started, completed), false),
        _ => (0.0, true),
    };

    JobRecord {
        job_id: job.id,
        name: job.name,
        runner,
        status: job.status,
        started_at: job.started_at,
        completed_at: job.completed_at,
        duration_seconds,
        in_progress,
    }
}

/// Lists the jobs of `run_id` with the caller's token and normalizes them.
/// Issues exactly one upstream request; an empty token fails before any.
pub async fn fetch_workflow_jobs(
    api: &dyn GitHubApi,
    run_id: &str,
    token: &str,
    owner: &str,
    repo: &str,
) -> Result<WorkflowJobs, AppError> {
    if token.trim().is_empty() {
        return Err(AppError::Unauthorized("Unauthorized".into()));
    }

    let job_list = api
        .list_run_jobs(token, owner, repo, run_id)
        .await
        .map_err(|e| AppError::from_upstream(e, RUN_NOT_FOUND_MESSAGE, JOBS_FAILURE_MESSAGE))?;

    let reported_jobs = job_list.total_count;
    if reported_jobs > job_list.jobs.len() as u64 {
        tracing::warn!(
            run_id,
            reported_jobs,
            returned_jobs = job_list.jobs.len(),
            "Run has more jobs than a single page returns"
        );
    }
    let jobs = job_list.jobs.into_iter().map(normalize_job).collect();
    let summary = WorkflowJobs::from_jobs(jobs);
    tracing::debug!(
        run_id,
        owner,
        repo,
        reported_jobs,
        total_jobs = summary.jobs.len(),
        total_duration_seconds = summary.total_duration_seconds,
        "Normalized workflow jobs"
    );
    Ok(summary)
}
