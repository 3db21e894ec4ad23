//! User settings: API key, model choice, and suggestion count.
//!
//! Persisted on its own in `settings.json`. An empty stored key means "use
//! the key from the environment", so a key supplied through `LLM_API_KEY` or
//! `OPENAI_API_KEY` is never written to disk.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_SUGGESTIONS: u32 = 5;
pub const MAX_SUGGESTIONS_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
}

impl Model {
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gpt-4o" => Ok(Model::Gpt4o),
            "gpt-4o-mini" => Ok(Model::Gpt4oMini),
            other => Err(format!("unsupported model '{other}' (expected gpt-4o or gpt-4o-mini)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    openai_api_key: String,
    #[serde(default)]
    model: Model,
    #[serde(default = "default_max_suggestions")]
    max_suggestions: u32,
}

fn default_max_suggestions() -> u32 {
    DEFAULT_MAX_SUGGESTIONS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            model: Model::default(),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }
}

impl Settings {
    pub fn set_api_key(&mut self, key: &str) {
        self.openai_api_key = key.trim().to_string();
    }

    pub fn has_api_key(&self) -> bool {
        !self.openai_api_key.is_empty()
    }

    /// Stored key, else `env_key`.
    pub fn effective_api_key(&self, env_key: Option<&str>) -> Option<String> {
        if self.has_api_key() {
            Some(self.openai_api_key.clone())
        } else {
            env_key.filter(|k| !k.is_empty()).map(str::to_string)
        }
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn set_model(&mut self, model: Model) {
        self.model = model;
    }

    pub fn max_suggestions(&self) -> u32 {
        self.max_suggestions
    }

    /// Set the suggestion count, clamped to 1..=10. Returns the stored value.
    pub fn set_max_suggestions(&mut self, n: u32) -> u32 {
        self.max_suggestions = n.clamp(*MAX_SUGGESTIONS_RANGE.start(), *MAX_SUGGESTIONS_RANGE.end());
        self.max_suggestions
    }

    /// Clamp values a hand-edited file may have put out of range.
    pub fn normalised(mut self) -> Self {
        self.set_max_suggestions(self.max_suggestions);
        self
    }

    /// API key with all but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        let key = &self.openai_api_key;
        if key.is_empty() {
            return "(not set)".to_string();
        }
        let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
        format!("…{tail}")
    }
}
