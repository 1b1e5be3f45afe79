use std::sync::Arc;

use orchestrator::RunOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RunOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<RunOrchestrator>) -> Self {
        Self { orchestrator }
    }
}
