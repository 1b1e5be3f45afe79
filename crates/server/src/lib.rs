pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Protocol Foundry API",
        version = "0.1.0",
        description = "Human-in-the-loop content generation pipeline"
    ),
    paths(
        routes::health_check,
        routes::create_run,
        routes::get_run,
        routes::get_run_history,
        routes::approve_run,
        routes::mutate_intent,
        routes::summarize_run,
        routes::sse::run_stream,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::CreateRunResponse,
        routes::RunHistoryResponse,
        routes::SummaryResponse,
        foundry_core::RunState,
        foundry_core::RunStatus,
        foundry_core::DraftVersion,
        foundry_core::Checkpoint,
        foundry_core::CreateRunRequest,
        foundry_core::ApproveRequest,
        foundry_core::MutateIntentRequest,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "runs", description = "Run lifecycle and checkpoint streaming"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health_check))
        .route("/api/runs", post(routes::create_run))
        .route("/api/runs/{id}", get(routes::get_run))
        .route("/api/runs/{id}/history", get(routes::get_run_history))
        .route("/api/runs/{id}/stream", get(routes::sse::run_stream))
        .route("/api/runs/{id}/approve", post(routes::approve_run))
        .route("/api/runs/{id}/intent", post(routes::mutate_intent))
        .route("/api/runs/{id}/summary", post(routes::summarize_run))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agents::MockBackend;
    use axum_test::TestServer;
    use db::CheckpointRepository;
    use foundry_core::{Checkpoint, RunStatus};
    use orchestrator::RunOrchestrator;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    async fn test_server() -> TestServer {
        let pool = db::create_pool("sqlite::memory:").await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        let orchestrator = Arc::new(RunOrchestrator::new(
            CheckpointRepository::new(pool),
            agents::pipeline(Arc::new(MockBackend::new())),
        ));
        TestServer::new(create_router(AppState::new(orchestrator))).unwrap()
    }

    async fn start_run(server: &TestServer, intent: &str) -> Uuid {
        let response = server
            .post("/api/runs")
            .json(&json!({ "intent": intent }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<serde_json::Value>()["run_id"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let server = test_server().await;
        let response = server.get("/health").await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_create_run_rejects_empty_intent() {
        let server = test_server().await;
        let response = server.post("/api/runs").json(&json!({ "intent": "  " })).await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_run_lifecycle_over_http() {
        let server = test_server().await;
        let run_id = start_run(&server, "Create a CBT exercise for insomnia").await;

        // Run is paused for review after start.
        let response = server.get(&format!("/api/runs/{run_id}")).await;
        response.assert_status_ok();
        let latest: Checkpoint = response.json();
        assert_eq!(latest.state_snapshot.status, RunStatus::PausedForHuman);

        // History covers every stage in order.
        let response = server.get(&format!("/api/runs/{run_id}/history")).await;
        response.assert_status_ok();
        let history = response.json::<serde_json::Value>();
        let agents: Vec<&str> = history["checkpoints"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["agent_name"].as_str().unwrap())
            .collect();
        assert_eq!(
            agents,
            vec![
                "orchestrator",
                "draftsman",
                "safety_guardian",
                "clinical_critic",
                "supervisor"
            ]
        );

        // Approve with edited text, then summarize.
        let response = server
            .post(&format!("/api/runs/{run_id}/approve"))
            .json(&json!({ "text": "Final text." }))
            .await;
        response.assert_status_ok();
        let state = response.json::<serde_json::Value>();
        assert_eq!(state["status"], "finalized");
        assert_eq!(state["current_draft_text"], "Final text.");

        let response = server.post(&format!("/api/runs/{run_id}/summary")).await;
        response.assert_status_ok();
        let summary = response.json::<serde_json::Value>();
        assert!(!summary["summary"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_run_is_404() {
        let server = test_server().await;
        let id = Uuid::new_v4();

        for path in [
            format!("/api/runs/{id}"),
            format!("/api/runs/{id}/history"),
        ] {
            let response = server.get(&path).await;
            response.assert_status(axum::http::StatusCode::NOT_FOUND);
        }

        let response = server
            .post(&format!("/api/runs/{id}/approve"))
            .json(&json!({ "text": "x" }))
            .await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_approve_twice_is_conflict() {
        let server = test_server().await;
        let run_id = start_run(&server, "intent").await;

        server
            .post(&format!("/api/runs/{run_id}/approve"))
            .json(&json!({ "text": "Final text." }))
            .await
            .assert_status_ok();

        let response = server
            .post(&format!("/api/runs/{run_id}/approve"))
            .json(&json!({ "text": "again" }))
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["error"], "invalid_transition");
    }

    #[tokio::test]
    async fn test_summary_before_finalize_is_conflict() {
        let server = test_server().await;
        let run_id = start_run(&server, "intent").await;

        let response = server.post(&format!("/api/runs/{run_id}/summary")).await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_mutate_intent_while_paused() {
        let server = test_server().await;
        let run_id = start_run(&server, "first intent").await;

        let response = server
            .post(&format!("/api/runs/{run_id}/intent"))
            .json(&json!({ "intent": "Rewrite for clarity" }))
            .await;
        response.assert_status_ok();
        let state = response.json::<serde_json::Value>();
        assert_eq!(state["intent_text"], "Rewrite for clarity");
        assert_eq!(state["status"], "paused_for_human");
    }
}
