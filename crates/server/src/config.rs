use std::sync::Arc;

use agents::{MockBackend, OllamaBackend, TextBackend};
use tracing::warn;

const DEFAULT_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_DATABASE_URL: &str = "sqlite://foundry.db";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Mock,
    Ollama,
}

/// Process configuration, read from the environment with lenient fallbacks:
/// an unrecognized value logs a warning and keeps the default.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub database_url: String,
    pub backend: BackendKind,
    pub ollama_url: String,
    pub ollama_model: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            backend: BackendKind::Mock,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            addr: env_or("FOUNDRY_ADDR", &defaults.addr),
            database_url: env_or("FOUNDRY_DATABASE_URL", &defaults.database_url),
            backend: parse_backend(&env_or("FOUNDRY_BACKEND", "mock")),
            ollama_url: env_or("OLLAMA_URL", &defaults.ollama_url),
            ollama_model: env_or("OLLAMA_MODEL", &defaults.ollama_model),
        }
    }

    /// Build the text backend this process generates with.
    pub fn backend(&self) -> Arc<dyn TextBackend> {
        match self.backend {
            BackendKind::Mock => Arc::new(MockBackend::new()),
            BackendKind::Ollama => Arc::new(OllamaBackend::new(
                self.ollama_url.clone(),
                self.ollama_model.clone(),
            )),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

fn parse_backend(value: &str) -> BackendKind {
    match value.to_ascii_lowercase().as_str() {
        "mock" => BackendKind::Mock,
        "ollama" => BackendKind::Ollama,
        other => {
            warn!(value = other, "unknown backend kind, falling back to mock");
            BackendKind::Mock
        }
    }
}
