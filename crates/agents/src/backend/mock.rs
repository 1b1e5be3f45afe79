use async_trait::async_trait;

use super::{BackendError, TextBackend};

const EXCERPT_LIMIT: usize = 200;

/// Deterministic offline backend: answers with a bounded excerpt of the
/// prompt. Useful for development and tests, and the default when no model
/// host is configured.
#[derive(Debug, Default, Clone)]
pub struct MockBackend;

impl MockBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextBackend for MockBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        Ok(format!("(generated) {}", excerpt(prompt, EXCERPT_LIMIT)))
    }
}

fn excerpt(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let head: String = text.chars().take(limit.saturating_sub(3)).collect();
    format!("{head}...")
}
