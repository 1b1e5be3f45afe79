use std::sync::Arc;

use async_trait::async_trait;
use foundry_core::{DraftVersion, RunState};
use orchestrator::{StageAgent, StageError};

use crate::backend::TextBackend;
use crate::prompts;

/// Produces the draft text. On a safety retry the prompt names the raised
/// flags so the rewrite steers away from them.
pub struct Draftsman {
    backend: Arc<dyn TextBackend>,
}

impl Draftsman {
    pub fn new(backend: Arc<dyn TextBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl StageAgent for Draftsman {
    fn name(&self) -> &'static str {
        "draftsman"
    }

    async fn run(&self, state: &RunState) -> Result<RunState, StageError> {
        let mut next = state.clone();

        let prompt = if next.safety_flags.is_empty() {
            prompts::draft(&next.intent_text)
        } else {
            prompts::redraft(&next.intent_text, &next.current_draft_text, &next.safety_flags)
        };

        let text = self.backend.complete(&prompt).await?.trim().to_string();

        next.current_draft_text = text.clone();
        let version = next.draft_versions.len() as u32 + 1;
        next.draft_versions.push(DraftVersion { version, text });
        next.iteration_count += 1;

        Ok(next)
    }
}
