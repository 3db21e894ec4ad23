//! AI collaborators: the concept expander, the MECE checker, and the
//! resource finder.
//!
//! Each collaborator renders a prompt, makes one JSON-mode completion through
//! the configured [`LlmProvider`], and validates the whole reply before
//! handing anything back. A reply that fails validation is an error; nothing
//! is partially merged.

pub mod expander;
pub mod mece;
pub mod prompt;
pub mod resources;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::{CompletionRequest, LlmProvider, ProviderError};

#[derive(Debug, Error)]
pub enum AiError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("empty response from AI")]
    EmptyContent,
    #[error("AI response is not the expected JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("AI response rejected: {0}")]
    Invalid(String),
}

/// Provider plus the prompt directory, shared by all collaborators.
#[derive(Debug, Clone)]
pub struct AiClient {
    provider: LlmProvider,
    prompts_dir: PathBuf,
}

impl AiClient {
    pub fn new(provider: LlmProvider, prompts_dir: impl Into<PathBuf>) -> Self {
        Self { provider, prompts_dir: prompts_dir.into() }
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut LlmProvider {
        &mut self.provider
    }

    pub fn prompts_dir(&self) -> &std::path::Path {
        &self.prompts_dir
    }

    /// One JSON-mode completion decoded into `T`.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        purpose: &'static str,
        model: &str,
        prompt: String,
        temperature: f32,
    ) -> Result<T, AiError> {
        let request = CompletionRequest::json(model, prompt, temperature);
        debug!(purpose, model, prompt_len = request.prompt.len(), "AI request");

        let content = self.provider.complete(&request).await?;
        if content.trim().is_empty() {
            warn!(purpose, "AI returned empty content");
            return Err(AiError::EmptyContent);
        }

        serde_json::from_str(strip_code_fence(&content)).map_err(|e| {
            warn!(purpose, error = %e, "AI reply did not match the expected shape");
            AiError::Parse(e)
        })
    }
}

/// Models sometimes wrap JSON in a markdown fence despite being told not to.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}
