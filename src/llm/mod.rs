//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities and clone cheaply.
//! The `complete` method is `async fn` on the enum so callers need no
//! trait-object machinery.

pub mod providers;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Request ───────────────────────────────────────────────────────────────────

/// One single-turn chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    /// Sent as the only user message.
    pub prompt: String,
    pub temperature: Option<f32>,
    /// Ask the endpoint for a JSON-object response
    /// (`response_format: {"type": "json_object"}`).
    pub json_object: bool,
}

impl CompletionRequest {
    pub fn json(model: impl Into<String>, prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: Some(temperature),
            json_object: true,
        }
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
}

impl LlmProvider {
    /// Send the request and return the reply text.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => p.complete(request).await,
            LlmProvider::OpenAiCompatible(p) => p.complete(request).await,
        }
    }

    /// Whether calls need an API key. Local dummy replies do not.
    pub fn requires_api_key(&self) -> bool {
        match self {
            LlmProvider::Dummy(_) => false,
            LlmProvider::OpenAiCompatible(_) => true,
        }
    }

    /// Replace the key sent with subsequent requests.
    pub fn set_api_key(&mut self, api_key: Option<String>) {
        match self {
            LlmProvider::Dummy(_) => {}
            LlmProvider::OpenAiCompatible(p) => p.set_api_key(api_key),
        }
    }
}
