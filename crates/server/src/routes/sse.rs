use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use futures::stream::{Stream, StreamExt};
use foundry_core::Checkpoint;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub const SSE_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

fn checkpoint_to_sse_event(checkpoint: &Checkpoint) -> Result<Event, Infallible> {
    let data = serde_json::to_string(checkpoint).unwrap_or_else(|_| "{}".to_string());

    Ok(Event::default()
        .id(checkpoint.sequence_number.to_string())
        .event("checkpoint")
        .data(data))
}

fn parse_last_event_id(headers: &axum::http::HeaderMap) -> Option<i64> {
    headers
        .get("Last-Event-ID")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
}

#[utoipa::path(
    get,
    path = "/api/runs/{id}/stream",
    params(
        ("id" = Uuid, Path, description = "Run ID"),
    ),
    responses(
        (status = 200, description = "SSE checkpoint stream: full history replay, then live updates"),
        (status = 404, description = "Run not found"),
    ),
    tag = "runs"
)]
pub async fn run_stream(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: axum::http::HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let last_event_id = parse_last_event_id(&headers);

    let checkpoints = state.orchestrator.subscribe(id, last_event_id).await?;
    let stream: std::pin::Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>> =
        Box::pin(checkpoints.map(|cp| checkpoint_to_sse_event(&cp)));

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(SSE_KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    ))
}
