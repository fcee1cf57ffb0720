use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::Value;

use crate::{
    error::AppError,
    middleware::auth::GitHubToken,
    models::workflow::{WorkflowJobsResponse, WorkflowSummaryResponse},
    services::workflow::fetch_workflow_jobs,
    state::AppState,
};

const REPOSITORY_NOT_FOUND_MESSAGE: &str = "Repository not found";
const RUNS_FAILURE_MESSAGE: &str = "Failed to fetch workflows";

pub async fn list_workflow_runs(
    State(state): State<AppState>,
    Extension(GitHubToken(token)): Extension<GitHubToken>,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let runs = state
        .github
        .list_workflow_runs(&token, &owner, &repo)
        .await
        .map_err(|e| {
            AppError::from_upstream(e, REPOSITORY_NOT_FOUND_MESSAGE, RUNS_FAILURE_MESSAGE)
        })?;
    Ok(Json(runs))
}

pub async fn get_workflow_jobs(
    State(state): State<AppState>,
    Extension(GitHubToken(token)): Extension<GitHubToken>,
    Path((owner, repo, workflow_id)): Path<(String, String, String)>,
) -> Result<Json<WorkflowJobsResponse>, AppError> {
    let summary =
        fetch_workflow_jobs(state.github.as_ref(), &workflow_id, &token, &owner, &repo).await?;
    Ok(Json(WorkflowJobsResponse::new(workflow_id, summary)))
}

pub async fn get_workflow_summary(
    State(state): State<AppState>,
    Extension(GitHubToken(token)): Extension<GitHubToken>,
    Path((owner, repo, workflow_id)): Path<(String, String, String)>,
) -> Result<Json<WorkflowSummaryResponse>, AppError> {
    let summary =
        fetch_workflow_jobs(state.github.as_ref(), &workflow_id, &token, &owner, &repo).await?;
    Ok(Json(WorkflowSummaryResponse::new(workflow_id, summary)))
}
