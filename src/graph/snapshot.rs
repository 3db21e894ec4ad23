//! Plain-text rendering of the working graph for AI prompts.

use super::types::{GraphEdge, GraphNode, NodeStatus};

/// Render settled nodes and the edges leading into them. Pending
/// suggestions are left out.
pub fn format_graph_snapshot(nodes: &[GraphNode], edges: &[GraphEdge]) -> String {
    let find_node = |id: &str| nodes.iter().find(|n| n.id == id);

    let node_lines: Vec<String> = nodes
        .iter()
        .filter_map(|n| {
            let tag = match n.status {
                NodeStatus::Root => "Root",
                NodeStatus::UserAdded => "User-Added",
                NodeStatus::Accepted => "Accepted",
                NodeStatus::AiSuggested => return None,
            };
            Some(format!("- [{tag}] \"{}\" — {}", n.label, n.description))
        })
        .collect();

    let edge_lines: Vec<String> = edges
        .iter()
        .filter_map(|e| {
            let target = find_node(&e.target).filter(|t| t.status != NodeStatus::AiSuggested)?;
            let source = find_node(&e.source).map_or("?", |s| s.label.as_str());
            Some(format!("- \"{source}\" --[{}]--> \"{}\"", e.label, target.label))
        })
        .collect();

    let mut out = format!("Nodes:\n{}", node_lines.join("\n"));
    if !edge_lines.is_empty() {
        out.push_str("\n\nEdges:\n");
        out.push_str(&edge_lines.join("\n"));
    }
    out
}
