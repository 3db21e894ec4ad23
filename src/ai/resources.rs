//! Resource finder: one to three well-known learning materials for a node.

use serde::Deserialize;

use super::prompt::{PromptBuilder, RESOURCES_TEMPLATE};
use super::{AiClient, AiError};
use crate::graph::types::{GraphNode, LearningResource};

const TEMPERATURE: f32 = 0.5;
const MAX_RESOURCES: usize = 3;

#[derive(Debug, Deserialize)]
struct ResourceResponse {
    resources: Vec<LearningResource>,
}

pub async fn find_resources(
    client: &AiClient,
    model: &str,
    root_topic: &str,
    target: &GraphNode,
) -> Result<Vec<LearningResource>, AiError> {
    let prompt = PromptBuilder::new(client.prompts_dir())
        .layer("resources.md", RESOURCES_TEMPLATE)
        .var("root_topic", root_topic)
        .var("target_label", target.label.as_str())
        .var("target_description", target.description.as_str())
        .build();

    let response: ResourceResponse = client.request_json("resources", model, prompt, TEMPERATURE).await?;
    let count = response.resources.len();
    if !(1..=MAX_RESOURCES).contains(&count) {
        return Err(AiError::Invalid(format!("expected 1 to {MAX_RESOURCES} resources, got {count}")));
    }

    tracing::info!(target_label = %target.label, count, "learning resources received");
    Ok(response.resources)
}
