use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use foundry_core::{ApproveRequest, Checkpoint, CreateRunRequest, MutateIntentRequest, RunState};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateRunResponse {
    pub run_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RunHistoryResponse {
    pub run_id: Uuid,
    pub checkpoints: Vec<Checkpoint>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    pub summary: String,
}

#[utoipa::path(
    post,
    path = "/api/runs",
    request_body = CreateRunRequest,
    responses(
        (status = 201, description = "Run created and driven to the pause point", body = CreateRunResponse),
        (status = 400, description = "Empty intent"),
    ),
    tag = "runs"
)]
pub async fn create_run(
    State(state): State<AppState>,
    Json(payload): Json<CreateRunRequest>,
) -> Result<(StatusCode, Json<CreateRunResponse>), AppError> {
    if payload.intent.trim().is_empty() {
        return Err(AppError::BadRequest("Intent cannot be empty".to_string()));
    }

    let run_id = state.orchestrator.start(&payload.intent).await?;

    Ok((StatusCode::CREATED, Json(CreateRunResponse { run_id })))
}

#[utoipa::path(
    get,
    path = "/api/runs/{id}",
    params(("id" = Uuid, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Latest checkpoint of the run", body = Checkpoint),
        (status = 404, description = "Run not found"),
    ),
    tag = "runs"
)]
pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Checkpoint>, AppError> {
    let latest = state.orchestrator.state(id).await?;
    Ok(Json(latest))
}

#[utoipa::path(
    get,
    path = "/api/runs/{id}/history",
    params(("id" = Uuid, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Full checkpoint history", body = RunHistoryResponse),
        (status = 404, description = "Run not found"),
    ),
    tag = "runs"
)]
pub async fn get_run_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RunHistoryResponse>, AppError> {
    let checkpoints = state.orchestrator.history(id).await?;
    Ok(Json(RunHistoryResponse {
        run_id: id,
        checkpoints,
    }))
}

#[utoipa::path(
    post,
    path = "/api/runs/{id}/approve",
    params(("id" = Uuid, Path, description = "Run ID")),
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Run approved and finalized", body = RunState),
        (status = 404, description = "Run not found"),
        (status = 409, description = "Run is not paused for human review"),
    ),
    tag = "runs"
)]
pub async fn approve_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveRequest>,
) -> Result<Json<RunState>, AppError> {
    let final_state = state.orchestrator.approve(id, &payload.text).await?;
    Ok(Json(final_state))
}

#[utoipa::path(
    post,
    path = "/api/runs/{id}/intent",
    params(("id" = Uuid, Path, description = "Run ID")),
    request_body = MutateIntentRequest,
    responses(
        (status = 200, description = "Intent updated", body = RunState),
        (status = 404, description = "Run not found"),
        (status = 409, description = "Run is already finalized"),
    ),
    tag = "runs"
)]
pub async fn mutate_intent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MutateIntentRequest>,
) -> Result<Json<RunState>, AppError> {
    if payload.intent.trim().is_empty() {
        return Err(AppError::BadRequest("Intent cannot be empty".to_string()));
    }

    let new_state = state.orchestrator.mutate_intent(id, &payload.intent).await?;
    Ok(Json(new_state))
}

#[utoipa::path(
    post,
    path = "/api/runs/{id}/summary",
    params(("id" = Uuid, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Summary generated", body = SummaryResponse),
        (status = 404, description = "Run not found"),
        (status = 409, description = "Run is not finalized"),
        (status = 502, description = "Summary stage failed"),
    ),
    tag = "runs"
)]
pub async fn summarize_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SummaryResponse>, AppError> {
    let summary = state.orchestrator.summarize(id).await?;
    Ok(Json(SummaryResponse { summary }))
}
