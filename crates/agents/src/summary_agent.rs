use std::sync::Arc;

use async_trait::async_trait;
use foundry_core::RunState;
use orchestrator::{StageAgent, StageError};

use crate::backend::TextBackend;
use crate::prompts;

/// Writes the clinician-facing summary of a finalized run.
pub struct SummaryAgent {
    backend: Arc<dyn TextBackend>,
}

impl SummaryAgent {
    pub fn new(backend: Arc<dyn TextBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl StageAgent for SummaryAgent {
    fn name(&self) -> &'static str {
        "summary_agent"
    }

    async fn run(&self, state: &RunState) -> Result<RunState, StageError> {
        let mut next = state.clone();

        let summary = self
            .backend
            .complete(&prompts::summary(&next.intent_text, &next.current_draft_text))
            .await?
            .trim()
            .to_string();

        next.final_summary = Some(summary);

        Ok(next)
    }
}
