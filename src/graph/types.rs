//! Graph value types: nodes, edges, saved graphs, and the AI payload shapes
//! that flow into the document store.
//!
//! Every type serialises with camelCase fields and kebab-case enum values so
//! persisted state and exports stay readable by other tooling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Enums ─────────────────────────────────────────────────────────────────────

/// Lifecycle stage of a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeStatus {
    Root,
    Accepted,
    UserAdded,
    AiSuggested,
}

/// Why the AI proposed a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReasonType {
    RelatedConcept,
    Prerequisite,
    Consequence,
    Contrast,
    Component,
    Gap,
    Application,
    Example,
}

impl fmt::Display for ReasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReasonType::RelatedConcept => "related concept",
            ReasonType::Prerequisite => "prerequisite",
            ReasonType::Consequence => "consequence",
            ReasonType::Contrast => "contrast",
            ReasonType::Component => "component",
            ReasonType::Gap => "gap",
            ReasonType::Application => "application",
            ReasonType::Example => "example",
        };
        f.write_str(s)
    }
}

/// Closed set of parent→child relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationType {
    IsA,
    PartOf,
    RelatedTo,
    LeadsTo,
    Requires,
    ContrastsWith,
    ExampleOf,
    AppliesTo,
}

impl RelationType {
    pub const ALL: [RelationType; 8] = [
        RelationType::IsA,
        RelationType::PartOf,
        RelationType::RelatedTo,
        RelationType::LeadsTo,
        RelationType::Requires,
        RelationType::ContrastsWith,
        RelationType::ExampleOf,
        RelationType::AppliesTo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::IsA => "is-a",
            RelationType::PartOf => "part-of",
            RelationType::RelatedTo => "related-to",
            RelationType::LeadsTo => "leads-to",
            RelationType::Requires => "requires",
            RelationType::ContrastsWith => "contrasts-with",
            RelationType::ExampleOf => "example-of",
            RelationType::AppliesTo => "applies-to",
        }
    }

    /// Default human-readable edge label, e.g. `"contrasts with"`.
    pub fn default_label(&self) -> String {
        self.as_str().replace('-', " ")
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationType::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown relation type: {s}"))
    }
}

/// Kind of learning material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    Article,
    Book,
    Video,
    Podcast,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceType::Article => "article",
            ResourceType::Book => "book",
            ResourceType::Video => "video",
            ResourceType::Podcast => "podcast",
        };
        f.write_str(s)
    }
}

// ── Nodes and edges ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningResource {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub description: String,
    pub status: NodeStatus,
    /// Set only while `status` is [`NodeStatus::AiSuggested`] (kept after accept).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_type: Option<ReasonType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_text: Option<String>,
    /// Provenance only. Traversal always goes through edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub position: Position,
    /// RFC 3339 timestamp.
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<LearningResource>>,
}

impl GraphNode {
    pub fn has_resources(&self) -> bool {
        self.resources.as_ref().is_some_and(|r| !r.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub relation_type: RelationType,
}

/// Caller-supplied fields for [`add_node`](super::document::GraphDocument::add_node).
/// Identity, timestamp, and position are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    pub label: String,
    pub description: String,
    pub status: NodeStatus,
}

impl NewNode {
    /// A user-added concept. An empty description falls back to
    /// `"User-added concept: {label}"`.
    pub fn user_added(label: impl Into<String>, description: impl Into<String>) -> Self {
        let label = label.into().trim().to_string();
        let description = description.into().trim().to_string();
        let description = if description.is_empty() {
            format!("User-added concept: {label}")
        } else {
            description
        };
        Self { label, description, status: NodeStatus::UserAdded }
    }
}

/// Partial update for [`update_node`](super::document::GraphDocument::update_node).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub label: Option<String>,
    pub description: Option<String>,
}

// ── Saved graphs ──────────────────────────────────────────────────────────────

/// A persisted session: a named value copy of a complete graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeGraph {
    pub id: String,
    pub title: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub created_at: String,
    pub updated_at: String,
}

// ── AI payloads ───────────────────────────────────────────────────────────────

/// A validated AI-proposed concept, ready to merge with
/// [`add_suggestions`](super::document::GraphDocument::add_suggestions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSuggestion {
    pub label: String,
    pub description: String,
    pub reason_type: ReasonType,
    pub reason_text: String,
    pub relation_type: RelationType,
    pub relation_label: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeceGap {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_node: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeceOverlap {
    pub node_a: String,
    pub node_b: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeceCheckResult {
    pub is_compliant: bool,
    pub overall_score: f64,
    pub gaps: Vec<MeceGap>,
    pub overlaps: Vec<MeceOverlap>,
    pub summary: String,
}
