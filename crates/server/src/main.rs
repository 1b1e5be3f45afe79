use std::sync::Arc;

use db::CheckpointRepository;
use orchestrator::RunOrchestrator;
use server::config::ServerConfig;
use server::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env();

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let orchestrator = Arc::new(RunOrchestrator::new(
        CheckpointRepository::new(pool),
        agents::pipeline(config.backend()),
    ));

    let app = server::create_router(AppState::new(orchestrator));

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
