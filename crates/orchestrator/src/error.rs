use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Run not found: {0}")]
    RunNotFound(Uuid),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Stage {stage} failed: {reason}")]
    StageFailed { stage: String, reason: String },

    #[error("Database error: {0}")]
    Database(db::DbError),
}

impl From<db::DbError> for OrchestratorError {
    fn from(err: db::DbError) -> Self {
        match err {
            db::DbError::RunNotFound(id) => Self::RunNotFound(id),
            other => Self::Database(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
