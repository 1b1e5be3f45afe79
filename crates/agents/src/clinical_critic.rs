use std::sync::Arc;

use async_trait::async_trait;
use foundry_core::RunState;
use orchestrator::{StageAgent, StageError};

use crate::backend::TextBackend;
use crate::prompts;

/// Reviews the draft for empathy and clarity: one backend call for the
/// critique, a second for a suggested rewrite. The rewrite is advisory;
/// the reviewer decides at the pause what to keep.
pub struct ClinicalCritic {
    backend: Arc<dyn TextBackend>,
}

impl ClinicalCritic {
    pub fn new(backend: Arc<dyn TextBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl StageAgent for ClinicalCritic {
    fn name(&self) -> &'static str {
        "clinical_critic"
    }

    async fn run(&self, state: &RunState) -> Result<RunState, StageError> {
        let mut next = state.clone();

        let critique = self
            .backend
            .complete(&prompts::critique(&next.current_draft_text))
            .await?
            .trim()
            .to_string();

        let revision = self
            .backend
            .complete(&prompts::revision(&next.current_draft_text, &critique))
            .await?
            .trim()
            .to_string();

        next.critique = Some(critique);
        next.proposed_revision = Some(revision);

        Ok(next)
    }
}
