use std::sync::Arc;

use async_trait::async_trait;
use foundry_core::RunState;
use thiserror::Error;

/// Failure signalled by a stage agent instead of a new state.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StageError {
    message: String,
}

impl StageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One step of the content pipeline.
///
/// Implementations take the current state by reference and return a fresh
/// copy with their changes applied; the runner checkpoints whatever comes
/// back. The input must never be mutated in place, so a stored checkpoint
/// can never be altered retroactively.
#[async_trait]
pub trait StageAgent: Send + Sync {
    /// Name recorded on the checkpoints this stage produces.
    fn name(&self) -> &'static str;

    async fn run(&self, state: &RunState) -> std::result::Result<RunState, StageError>;
}

/// The fixed set of agents the runner drives.
#[derive(Clone)]
pub struct PipelineAgents {
    pub draftsman: Arc<dyn StageAgent>,
    pub safety_guardian: Arc<dyn StageAgent>,
    pub clinical_critic: Arc<dyn StageAgent>,
    pub summarizer: Arc<dyn StageAgent>,
}
