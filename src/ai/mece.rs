//! MECE checker: judges whether a parent's children are mutually exclusive
//! and collectively exhaustive.

use super::prompt::{PromptBuilder, MECE_TEMPLATE};
use super::{AiClient, AiError};
use crate::graph::types::{GraphNode, MeceCheckResult};

const TEMPERATURE: f32 = 0.3;

/// Smallest sibling group worth evaluating.
pub const MIN_CHILDREN: usize = 2;

pub async fn check_mece(
    client: &AiClient,
    model: &str,
    root_topic: &str,
    parent: &GraphNode,
    children: &[&GraphNode],
) -> Result<MeceCheckResult, AiError> {
    if children.len() < MIN_CHILDREN {
        return Err(AiError::Invalid(format!(
            "need at least {MIN_CHILDREN} child concepts to evaluate MECE compliance"
        )));
    }

    let children_list = children
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. \"{}\" — {}", i + 1, c.label, c.description))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = PromptBuilder::new(client.prompts_dir())
        .layer("mece.md", MECE_TEMPLATE)
        .var("root_topic", root_topic)
        .var("parent_label", parent.label.as_str())
        .var("parent_description", parent.description.as_str())
        .var("children_list", children_list)
        .build();

    let result: MeceCheckResult = client.request_json("mece", model, prompt, TEMPERATURE).await?;
    if !(0.0..=100.0).contains(&result.overall_score) {
        return Err(AiError::Invalid(format!(
            "overall score {} outside 0..=100",
            result.overall_score
        )));
    }

    tracing::info!(
        parent = %parent.label,
        compliant = result.is_compliant,
        score = result.overall_score,
        gaps = result.gaps.len(),
        overlaps = result.overlaps.len(),
        "MECE check complete"
    );
    Ok(result)
}
