//! Concept expander: proposes new concepts around one node.

use serde::Deserialize;

use super::prompt::{PromptBuilder, EXPAND_TEMPLATE};
use super::{AiClient, AiError};
use crate::graph::snapshot::format_graph_snapshot;
use crate::graph::types::{AiSuggestion, GraphEdge, GraphNode};

const TEMPERATURE: f32 = 0.7;

/// Everything the expander needs to know about the working graph.
#[derive(Debug, Clone, Copy)]
pub struct ExpandRequest<'a> {
    pub root_topic: &'a str,
    pub nodes: &'a [GraphNode],
    pub edges: &'a [GraphEdge],
    pub target: &'a GraphNode,
    pub rejected_labels: &'a [String],
    pub max_suggestions: u32,
}

#[derive(Debug, Deserialize)]
struct ExpandResponse {
    suggestions: Vec<AiSuggestion>,
}

/// Ask for `max_suggestions` new concepts related to `request.target`.
pub async fn expand_node(
    client: &AiClient,
    model: &str,
    request: ExpandRequest<'_>,
) -> Result<Vec<AiSuggestion>, AiError> {
    let prompt = render_prompt(client, &request);
    let response: ExpandResponse = client.request_json("expand", model, prompt, TEMPERATURE).await?;
    validate(&response.suggestions)?;

    tracing::info!(
        target_label = %request.target.label,
        count = response.suggestions.len(),
        "expansion suggestions received"
    );
    Ok(response.suggestions)
}

fn render_prompt(client: &AiClient, request: &ExpandRequest<'_>) -> String {
    let rejected_instruction = if request.rejected_labels.is_empty() {
        String::new()
    } else {
        format!(
            "\nThe user has previously rejected these suggestions: {}.\n\
             Do not suggest these again or concepts very similar to them.\n",
            request.rejected_labels.join(", ")
        )
    };

    PromptBuilder::new(client.prompts_dir())
        .layer("expand.md", EXPAND_TEMPLATE)
        .var("root_topic", request.root_topic)
        .var("graph_snapshot", format_graph_snapshot(request.nodes, request.edges))
        .var("target_label", request.target.label.as_str())
        .var("target_description", request.target.description.as_str())
        .var("max_suggestions", request.max_suggestions.to_string())
        .var("rejected_instruction", rejected_instruction)
        .build()
}

fn validate(suggestions: &[AiSuggestion]) -> Result<(), AiError> {
    for (i, s) in suggestions.iter().enumerate() {
        if s.label.trim().is_empty() {
            return Err(AiError::Invalid(format!("suggestion {i} has an empty label")));
        }
        if !(0.0..=1.0).contains(&s.confidence) {
            return Err(AiError::Invalid(format!(
                "suggestion '{}' has confidence {} outside 0..=1",
                s.label, s.confidence
            )));
        }
    }
    Ok(())
}
