//! Stage-function implementations for the content pipeline.
//!
//! Every agent generates text through a pluggable [`TextBackend`] and
//! implements the orchestrator's `StageAgent` contract: take the state by
//! reference, return a fresh copy with the stage's changes applied.

pub mod backend;
mod clinical_critic;
mod draftsman;
mod prompts;
mod safety_guardian;
mod summary_agent;

use std::sync::Arc;

use orchestrator::PipelineAgents;

pub use backend::{BackendError, MockBackend, OllamaBackend, TextBackend};
pub use clinical_critic::ClinicalCritic;
pub use draftsman::Draftsman;
pub use safety_guardian::SafetyGuardian;
pub use summary_agent::SummaryAgent;

/// Wire the full agent set over one backend.
pub fn pipeline(backend: Arc<dyn TextBackend>) -> PipelineAgents {
    PipelineAgents {
        draftsman: Arc::new(Draftsman::new(Arc::clone(&backend))),
        safety_guardian: Arc::new(SafetyGuardian::new(Arc::clone(&backend))),
        clinical_critic: Arc::new(ClinicalCritic::new(Arc::clone(&backend))),
        summarizer: Arc::new(SummaryAgent::new(backend)),
    }
}
