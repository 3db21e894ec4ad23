//! Plain-text views of the workspace for the console.

use std::fmt::Write as _;

use crate::graph::types::{GraphNode, NodeStatus};
use crate::graph::GraphDocument;
use crate::settings::Settings;
use crate::ui_state::{MeceReport, SidebarPanel, UiState};

fn status_tag(status: NodeStatus) -> &'static str {
    match status {
        NodeStatus::Root => "root",
        NodeStatus::Accepted => "accepted",
        NodeStatus::UserAdded => "user",
        NodeStatus::AiSuggested => "suggested",
    }
}

/// Numbered node list, in the order `#n` references resolve against.
pub fn graph(doc: &GraphDocument, ui: &UiState) -> String {
    if doc.is_empty() {
        return "(empty graph; start one with `topic <name>`)".to_string();
    }

    let mut out = String::new();
    let saved = if doc.current_graph_id().is_some() { "saved" } else { "unsaved" };
    let _ = writeln!(
        out,
        "{}  ({} nodes, {} edges, {saved})",
        doc.title(),
        doc.nodes().len(),
        doc.edges().len()
    );

    for (i, node) in doc.nodes().iter().enumerate() {
        let marker = if ui.selected_node_id() == Some(node.id.as_str()) { '*' } else { ' ' };
        let _ = write!(out, "{marker} #{:<3} [{}] {}", i + 1, status_tag(node.status), node.label);

        if let Some(edge) = doc.edges().iter().find(|e| e.target == node.id) {
            let parent = doc.node(&edge.source).map_or("?", |p| p.label.as_str());
            let _ = write!(out, "  <- {parent} ({})", edge.label);
        }
        if ui.expanding_node_id() == Some(node.id.as_str()) {
            out.push_str("  [expanding...]");
        }
        if node.has_resources() {
            out.push_str("  [resources]");
        }
        out.push('\n');
    }

    if ui.is_mece_checking() {
        out.push_str("MECE check running...\n");
    }
    if !doc.rejected_labels().is_empty() {
        let _ = writeln!(out, "rejected: {}", doc.rejected_labels().join(", "));
    }
    out.trim_end().to_string()
}

/// Detail view for one node.
pub fn node(doc: &GraphDocument, node: &GraphNode) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", node.label, status_tag(node.status));
    let _ = writeln!(out, "  {}", node.description);
    if let (Some(kind), Some(text)) = (node.reason_type, node.reason_text.as_deref()) {
        let _ = writeln!(out, "  why ({kind}): {text}");
    }
    let _ = writeln!(out, "  at ({}, {})  id {}", node.position.x, node.position.y, node.id);

    let children = doc.children_of(&node.id);
    if !children.is_empty() {
        let labels: Vec<&str> = children.iter().map(|c| c.label.as_str()).collect();
        let _ = writeln!(out, "  children: {}", labels.join(", "));
    }

    if let Some(resources) = node.resources.as_deref().filter(|r| !r.is_empty()) {
        out.push_str("  resources:\n");
        for r in resources {
            let by = r.author.as_deref().map(|a| format!(" by {a}")).unwrap_or_default();
            let _ = writeln!(out, "    - [{}] {}{by}: {}", r.kind, r.title, r.description);
            if let Some(url) = &r.url {
                let _ = writeln!(out, "      {url}");
            }
        }
    }
    out.trim_end().to_string()
}

pub fn mece(doc: &GraphDocument, report: &MeceReport) -> String {
    let parent = doc.node(&report.parent_id).map_or("?", |n| n.label.as_str());
    let r = &report.result;
    let verdict = if r.is_compliant { "compliant" } else { "not compliant" };

    let mut out = String::new();
    let _ = writeln!(out, "MECE for \"{parent}\": {verdict}, score {}/100", r.overall_score);
    let _ = writeln!(out, "  {}", r.summary);
    if !r.gaps.is_empty() {
        out.push_str("  gaps:\n");
        for gap in &r.gaps {
            let _ = write!(out, "    - {}", gap.description);
            if let Some(suggested) = &gap.suggested_node {
                let _ = write!(out, " (consider: {suggested})");
            }
            out.push('\n');
        }
    }
    if !r.overlaps.is_empty() {
        out.push_str("  overlaps:\n");
        for o in &r.overlaps {
            let _ = writeln!(out, "    - {} / {}: {}", o.node_a, o.node_b, o.description);
        }
    }
    out.trim_end().to_string()
}

/// Pending AI suggestions, each with the reason it was proposed.
pub fn suggestions(doc: &GraphDocument) -> String {
    let pending = doc.suggestion_nodes();
    if pending.is_empty() {
        return "(no pending suggestions; run `expand <node>`)".to_string();
    }
    let mut out = format!("{} pending suggestion(s):\n", pending.len());
    for node in pending {
        let _ = write!(out, "  {}", node.label);
        if let (Some(kind), Some(text)) = (node.reason_type, node.reason_text.as_deref()) {
            let _ = write!(out, "  ({kind}: {text})");
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Content of the open sidebar panel, if any.
pub fn panel(doc: &GraphDocument, ui: &UiState) -> Option<String> {
    match ui.sidebar_panel()? {
        SidebarPanel::Detail => {
            let id = ui.selected_node_id()?;
            doc.node(id).map(|n| node(doc, n))
        }
        SidebarPanel::Suggestions => Some(suggestions(doc)),
        SidebarPanel::Mece => ui.mece_report().map(|r| mece(doc, r)),
    }
}

pub fn sessions(doc: &GraphDocument) -> String {
    let graphs = doc.saved_graphs();
    if graphs.is_empty() {
        return "(no saved graphs)".to_string();
    }
    graphs
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let marker = if doc.current_graph_id() == Some(g.id.as_str()) { '*' } else { ' ' };
            format!("{marker} #{:<3} {}  ({} nodes, updated {})", i + 1, g.title, g.nodes.len(), g.updated_at)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn settings(settings: &Settings, env_key_present: bool) -> String {
    let key = if settings.has_api_key() {
        settings.masked_api_key()
    } else if env_key_present {
        "(from environment)".to_string()
    } else {
        "(not set)".to_string()
    };
    format!(
        "api key:          {key}\nmodel:            {}\nmax suggestions:  {}",
        settings.model(),
        settings.max_suggestions()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{AiSuggestion, MeceCheckResult, MeceGap, NewNode, ReasonType, RelationType};

    fn sample() -> GraphDocument {
        let mut doc = GraphDocument::new();
        doc.set_root_topic("Pricing");
        let root = doc.root_node().map(|n| n.id.clone()).unwrap();
        doc.add_node(NewNode::user_added("Anchoring", ""), Some(&root));
        doc
    }

    #[test]
    fn graph_lists_numbered_nodes_with_parents() {
        let doc = sample();
        let mut ui = UiState::default();
        ui.select_node(Some(doc.nodes()[1].id.clone()));
        let text = graph(&doc, &ui);
        assert!(text.starts_with("Pricing  (2 nodes, 1 edges, unsaved)"));
        assert!(text.contains("  #1   [root] Pricing"));
        assert!(text.contains("* #2   [user] Anchoring  <- Pricing (related to)"));
    }

    #[test]
    fn empty_graph_hints_at_topic() {
        assert!(graph(&GraphDocument::new(), &UiState::default()).contains("topic <name>"));
    }

    #[test]
    fn node_view_lists_children() {
        let doc = sample();
        let text = node(&doc, doc.root_node().unwrap());
        assert!(text.starts_with("Pricing [root]"));
        assert!(text.contains("children: Anchoring"));
    }

    #[test]
    fn mece_view_shows_gaps() {
        let doc = sample();
        let report = MeceReport {
            parent_id: doc.root_node().unwrap().id.clone(),
            result: MeceCheckResult {
                is_compliant: false,
                overall_score: 55.0,
                gaps: vec![MeceGap { description: "No retention".into(), suggested_node: Some("Churn".into()) }],
                overlaps: Vec::new(),
                summary: "Thin.".into(),
            },
        };
        let text = mece(&doc, &report);
        assert!(text.starts_with("MECE for \"Pricing\": not compliant, score 55/100"));
        assert!(text.contains("- No retention (consider: Churn)"));
    }

    #[test]
    fn open_panel_follows_sidebar_state() {
        let mut doc = sample();
        let root = doc.root_node().map(|n| n.id.clone()).unwrap();
        doc.add_suggestions(
            &root,
            vec![AiSuggestion {
                label: "Decoy Pricing".into(),
                description: "A third option".into(),
                reason_type: ReasonType::Example,
                reason_text: "Classic anchoring move".into(),
                relation_type: RelationType::ExampleOf,
                relation_label: "example of".into(),
                confidence: 0.6,
            }],
        );

        let mut ui = UiState::default();
        assert_eq!(panel(&doc, &ui), None);

        ui.set_sidebar_panel(Some(SidebarPanel::Suggestions));
        let text = panel(&doc, &ui).unwrap();
        assert!(text.starts_with("1 pending suggestion(s):"));
        assert!(text.contains("Decoy Pricing  (example: Classic anchoring move)"));

        ui.select_node(Some(root));
        assert!(panel(&doc, &ui).unwrap().starts_with("Pricing [root]"));

        ui.set_sidebar_panel(Some(SidebarPanel::Mece));
        assert_eq!(panel(&doc, &ui), None, "no report yet");
    }

    #[test]
    fn settings_view_never_shows_full_key() {
        let mut s = Settings::default();
        s.set_api_key("sk-secret-1234");
        let text = settings(&s, false);
        assert!(text.contains("…1234"));
        assert!(!text.contains("secret"));
        assert!(settings(&Settings::default(), true).contains("from environment"));
    }
}
