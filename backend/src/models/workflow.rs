//! Response bodies of the workflow endpoints.

use serde::Serialize;

use crate::{
    models::job::{JobRecord, RunnerKind},
    services::{carbon::CarbonEstimate, workflow::WorkflowJobs},
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// Full per-job breakdown of one run.
pub struct WorkflowJobsResponse {
    pub workflow_run_id: String,
    pub total_jobs: usize,
    pub total_duration_seconds: f64,
    pub jobs: Vec<JobRecord>,
    pub carbon: CarbonEstimate,
}

impl WorkflowJobsResponse {
    pub fn new(workflow_run_id: String, summary: WorkflowJobs) -> Self {
        Self {
            workflow_run_id,
            total_jobs: summary.jobs.len(),
            total_duration_seconds: summary.total_duration_seconds,
            jobs: summary.jobs,
            carbon: summary.carbon,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// Condensed view of one run. `carbon` is the estimate in grams.
pub struct WorkflowSummaryResponse {
    pub workflow_run_id: String,
    pub total_jobs: usize,
    pub total_duration_seconds: f64,
    pub carbon: f64,
    pub runner_types: Vec<RunnerKind>,
    pub jobs: Vec<JobRecord>,
}

impl WorkflowSummaryResponse {
    pub fn new(workflow_run_id: String, summary: WorkflowJobs) -> Self {
        Self {
            workflow_run_id,
            total_jobs: summary.jobs.len(),
            total_duration_seconds: summary.total_duration_seconds,
            carbon: summary.carbon.estimated_co2_grams,
            runner_types: summary.runner_types(),
            jobs: summary.jobs,
        }
    }
}
