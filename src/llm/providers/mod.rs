//! LLM provider implementations.
//!
//! `build(config, api_key)` is the factory, called once at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod openai_compatible;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct a `LlmProvider` from config and an optional API key.
///
/// `api_key` comes from the settings store or the environment, never TOML.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider::default())),
        "openai" | "openai-compatible" => {
            let oai = &config.openai;
            let p = openai_compatible::OpenAiCompatibleProvider::new(
                oai.api_base_url.clone(),
                oai.timeout_seconds,
                api_key,
            )?;
            Ok(LlmProvider::OpenAiCompatible(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}
