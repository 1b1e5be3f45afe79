mod mock;
mod ollama;

use async_trait::async_trait;
use orchestrator::StageError;
use thiserror::Error;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<BackendError> for StageError {
    fn from(err: BackendError) -> Self {
        StageError::new(err.to_string())
    }
}

/// Text-generation seam the stage agents talk through.
#[async_trait]
pub trait TextBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}
