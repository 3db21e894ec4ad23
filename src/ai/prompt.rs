//! Layered prompt builder.
//!
//! Prompts are assembled from plain-text template fragments stored under
//! `config/prompts/`. Each layer is appended in order. A layer whose file is
//! missing falls back to the built-in copy compiled into the binary, so a
//! bare install still works and an edited file wins.
//!
//! Variable substitution uses `{{key}}` syntax and is applied once at
//! [`build()`](PromptBuilder::build) time, after all layers are joined.
//! Substituted values are never rescanned, so a concept label that happens to
//! contain `{{...}}` is left alone.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

const SEPARATOR: &str = "\n\n";

pub const EXPAND_TEMPLATE: &str = include_str!("../../config/prompts/expand.md");
pub const MECE_TEMPLATE: &str = include_str!("../../config/prompts/mece.md");
pub const RESOURCES_TEMPLATE: &str = include_str!("../../config/prompts/resources.md");

/// Fluent builder that assembles a prompt from template files.
pub struct PromptBuilder {
    prompts_dir: PathBuf,
    parts: Vec<String>,
    vars: HashMap<String, String>,
}

impl PromptBuilder {
    /// Create a builder rooted at `prompts_dir` (e.g. `"config/prompts"`).
    pub fn new(prompts_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
            parts: Vec::new(),
            vars: HashMap::new(),
        }
    }

    /// Append a layer loaded from `filename` in the prompts directory, or
    /// `builtin` when the file is missing or empty.
    pub fn layer(self, filename: &str, builtin: &str) -> Self {
        let path = self.prompts_dir.join(filename);
        match fs::read_to_string(&path) {
            Ok(text) if !text.trim().is_empty() => self.append(text),
            Ok(_) | Err(_) => {
                tracing::debug!("prompt: layer '{}' not found, using built-in", path.display());
                self.append(builtin)
            }
        }
    }

    /// Directly append a text fragment.
    pub fn append(mut self, text: impl Into<String>) -> Self {
        let s = text.into();
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            self.parts.push(trimmed.to_string());
        }
        self
    }

    /// Register `{{key}}` → `value` substitution pairs applied at build time.
    pub fn with_vars<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (k, v) in vars {
            self.vars.insert(k.to_string(), v.to_string());
        }
        self
    }

    /// Register a single variable.
    pub fn var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    /// Join all layers with blank lines and substitute variables.
    /// Unknown placeholders are kept verbatim.
    pub fn build(self) -> String {
        let template = self.parts.join(SEPARATOR);
        let mut out = String::with_capacity(template.len());
        let mut rest = template.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => match self.vars.get(&after[..end]) {
                    Some(value) => {
                        out.push_str(value);
                        rest = &after[end + 2..];
                    }
                    None => {
                        out.push_str("{{");
                        rest = after;
                    }
                },
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompts_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/prompts")
    }

    #[test]
    fn layers_are_joined_in_order() {
        let result = PromptBuilder::new(prompts_dir())
            .append("first")
            .append("second")
            .build();
        assert_eq!(result, "first\n\nsecond");
    }

    #[test]
    fn missing_file_uses_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let result = PromptBuilder::new(dir.path())
            .layer("expand.md", "built-in {{x}}")
            .var("x", "copy")
            .build();
        assert_eq!(result, "built-in copy");
    }

    #[test]
    fn file_on_disk_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mece.md"), "custom mece for {{parent_label}}\n").unwrap();
        let result = PromptBuilder::new(dir.path())
            .layer("mece.md", MECE_TEMPLATE)
            .var("parent_label", "Pricing")
            .build();
        assert_eq!(result, "custom mece for Pricing");
    }

    #[test]
    fn substitutes_every_occurrence() {
        let result = PromptBuilder::new(prompts_dir())
            .append("{{a}} and {{a}} then {{b}}")
            .with_vars([("a", "x"), ("b", "y")])
            .build();
        assert_eq!(result, "x and x then y");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let result = PromptBuilder::new(prompts_dir())
            .append("{{label}} / {{topic}}")
            .var("label", "{{topic}}")
            .var("topic", "Pricing")
            .build();
        assert_eq!(result, "{{topic}} / Pricing");
    }

    #[test]
    fn unknown_and_unterminated_placeholders_survive() {
        let result = PromptBuilder::new(prompts_dir())
            .append("keep {{missing}} and {{open")
            .build();
        assert_eq!(result, "keep {{missing}} and {{open");
    }

    #[test]
    fn shipped_templates_render_fully() {
        let result = PromptBuilder::new(prompts_dir())
            .layer("resources.md", RESOURCES_TEMPLATE)
            .with_vars([
                ("root_topic", "Product-Market Fit"),
                ("target_label", "Churn"),
                ("target_description", "Customers leaving"),
            ])
            .build();
        assert!(result.contains("\"Churn\""));
        assert!(result.contains("Product-Market Fit"));
        assert!(!result.contains("{{"));
    }
}
