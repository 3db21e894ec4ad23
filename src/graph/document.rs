//! [`GraphDocument`]: the working graph and everything that mutates it.
//!
//! One document owns the current title, nodes, and edges, the undo/redo
//! [`History`], the rejected-label list used to steer the expander, and the
//! [`SessionStore`] of saved graphs. It is an explicit state container: the
//! owner passes it by reference to whatever needs it, and observers learn
//! about changes through [`GraphDocument::subscribe`].
//!
//! History-producing operations record one entry per logical action. Position
//! and resource updates change the graph without touching history. Operations
//! on unknown ids are silent no-ops: they come from stale UI state, not from
//! user mistakes.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::history::{History, Snapshot};
use super::session::SessionStore;
use super::types::{
    AiSuggestion, GraphEdge, GraphNode, KnowledgeGraph, LearningResource, NewNode, NodeStatus,
    NodeUpdate, Position, RelationType,
};
use super::{new_id, now_iso8601};

const EVENT_BUFFER: usize = 64;

/// Emitted after every change to the working graph, including position and
/// resource updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEvent {
    pub graph_id: Option<String>,
    pub node_count: usize,
    /// Monotonic per document; bumps once per change.
    pub revision: u64,
}

/// Persisted shape of the graph store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStoreState {
    #[serde(default)]
    pub current_graph_id: Option<String>,
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub saved_graphs: SessionStore,
    #[serde(default)]
    pub rejected_labels: Vec<String>,
}

#[derive(Debug)]
pub struct GraphDocument {
    current_graph_id: Option<String>,
    title: String,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    sessions: SessionStore,
    history: History,
    rejected_labels: Vec<String>,
    revision: u64,
    events: broadcast::Sender<GraphEvent>,
}

impl Default for GraphDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphDocument {
    /// Empty, untitled document with no saved graphs.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            current_graph_id: None,
            title: String::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            sessions: SessionStore::default(),
            history: History::default(),
            rejected_labels: Vec::new(),
            revision: 0,
            events,
        }
    }

    /// Restore a document from its persisted shape. History starts with a
    /// single entry at the restored graph.
    pub fn from_state(state: GraphStoreState) -> Self {
        let mut doc = Self::new();
        doc.current_graph_id = state.current_graph_id;
        doc.title = state.title;
        doc.nodes = state.nodes;
        doc.edges = state.edges;
        doc.sessions = state.saved_graphs;
        doc.rejected_labels = state.rejected_labels;
        if !doc.nodes.is_empty() {
            doc.history = History::starting_at(doc.snapshot());
        }
        doc
    }

    pub fn to_state(&self) -> GraphStoreState {
        GraphStoreState {
            current_graph_id: self.current_graph_id.clone(),
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            title: self.title.clone(),
            saved_graphs: self.sessions.clone(),
            rejected_labels: self.rejected_labels.clone(),
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<GraphEvent> {
        self.events.subscribe()
    }

    // ── Graph lifecycle ───────────────────────────────────────────────

    /// Reset the working graph to a single root node labelled `topic`.
    ///
    /// Assigns a fresh graph identity, resets history to one entry, and
    /// clears the rejected labels. The caller trims `topic`.
    pub fn set_root_topic(&mut self, topic: &str) {
        let root = GraphNode {
            id: new_id(),
            label: topic.to_string(),
            description: format!("Root topic: {topic}"),
            status: NodeStatus::Root,
            reason_type: None,
            reason_text: None,
            parent_id: None,
            position: Position::ORIGIN,
            created_at: now_iso8601(),
            resources: None,
        };

        self.title = topic.to_string();
        self.current_graph_id = Some(new_id());
        self.nodes = vec![root];
        self.edges.clear();
        self.history = History::starting_at(self.snapshot());
        self.rejected_labels.clear();

        info!(graph_id = ?self.current_graph_id, %topic, "root topic set");
        self.notify();
    }

    // ── Node mutations ────────────────────────────────────────────────

    /// Add a node and, when `parent_id` names an existing node, one
    /// `related-to` edge from it. Returns the new node's id.
    pub fn add_node(&mut self, new_node: NewNode, parent_id: Option<&str>) -> String {
        let id = new_id();
        let status = match new_node.status {
            NodeStatus::Root => {
                warn!(label = %new_node.label, "add_node cannot create a second root; adding as user-added");
                NodeStatus::UserAdded
            }
            other => other,
        };

        let parent = parent_id.filter(|p| {
            let known = self.contains(p);
            if !known {
                debug!(parent_id = %p, "add_node: parent not found, adding unattached");
            }
            known
        });

        let node = GraphNode {
            id: id.clone(),
            label: new_node.label,
            description: new_node.description,
            status,
            reason_type: None,
            reason_text: None,
            parent_id: parent.map(str::to_string),
            position: Position::ORIGIN,
            created_at: now_iso8601(),
            resources: None,
        };
        let edge = parent.map(|p| GraphEdge {
            id: new_id(),
            source: p.to_string(),
            target: id.clone(),
            label: RelationType::RelatedTo.default_label(),
            relation_type: RelationType::RelatedTo,
        });

        self.commit("add_node", |doc| {
            doc.nodes.push(node);
            doc.edges.extend(edge);
            true
        });
        id
    }

    /// Delete a node and every edge touching it. Children are left in place
    /// without a parent edge. The root cannot be removed.
    pub fn remove_node(&mut self, id: &str) {
        if self.is_root(id) {
            warn!(node_id = %id, "refusing to remove the root node");
            return;
        }
        self.commit("remove_node", |doc| doc.delete_node(id));
    }

    /// Merge `update` into the node's label and description.
    pub fn update_node(&mut self, id: &str, update: NodeUpdate) {
        if !self.contains(id) || update == NodeUpdate::default() {
            return;
        }
        self.commit("update_node", |doc| {
            let Some(node) = doc.node_mut(id) else { return false };
            if let Some(label) = update.label {
                node.label = label;
            }
            if let Some(description) = update.description {
                node.description = description;
            }
            true
        });
    }

    /// Overwrite a node's position. Never recorded in history.
    pub fn update_node_position(&mut self, id: &str, position: Position) {
        let Some(node) = self.node_mut(id) else { return };
        if node.position == position {
            return;
        }
        node.position = position;
        self.notify();
    }

    /// Promote a suggestion to an accepted concept. Idempotent.
    pub fn accept_suggestion(&mut self, id: &str) {
        let is_suggestion = self.node(id).is_some_and(|n| n.status == NodeStatus::AiSuggested);
        if !is_suggestion {
            return;
        }
        self.commit("accept_suggestion", |doc| {
            let Some(node) = doc.node_mut(id) else { return false };
            node.status = NodeStatus::Accepted;
            true
        });
    }

    /// Remember the node's label as rejected, then delete it like
    /// [`remove_node`](Self::remove_node).
    pub fn reject_suggestion(&mut self, id: &str) {
        if self.is_root(id) {
            warn!(node_id = %id, "refusing to reject the root node");
            return;
        }
        let Some(label) = self.node(id).map(|n| n.label.clone()) else { return };

        self.commit("reject_suggestion", |doc| {
            if !doc.rejected_labels.contains(&label) {
                doc.rejected_labels.push(label);
            }
            doc.delete_node(id)
        });
    }

    /// Attach one suggested node and edge per suggestion under `parent_id`.
    /// The whole batch is a single history entry. Returns the new node ids.
    pub fn add_suggestions(&mut self, parent_id: &str, suggestions: Vec<AiSuggestion>) -> Vec<String> {
        if suggestions.is_empty() {
            return Vec::new();
        }
        if !self.contains(parent_id) {
            debug!(%parent_id, "add_suggestions: parent no longer present, dropping batch");
            return Vec::new();
        }

        let created_at = now_iso8601();
        let mut ids = Vec::with_capacity(suggestions.len());
        let mut nodes = Vec::with_capacity(suggestions.len());
        let mut edges = Vec::with_capacity(suggestions.len());
        for s in suggestions {
            let id = new_id();
            nodes.push(GraphNode {
                id: id.clone(),
                label: s.label,
                description: s.description,
                status: NodeStatus::AiSuggested,
                reason_type: Some(s.reason_type),
                reason_text: Some(s.reason_text),
                parent_id: Some(parent_id.to_string()),
                position: Position::ORIGIN,
                created_at: created_at.clone(),
                resources: None,
            });
            edges.push(GraphEdge {
                id: new_id(),
                source: parent_id.to_string(),
                target: id.clone(),
                label: s.relation_label,
                relation_type: s.relation_type,
            });
            ids.push(id);
        }

        self.commit("add_suggestions", |doc| {
            doc.nodes.extend(nodes);
            doc.edges.extend(edges);
            true
        });
        ids
    }

    /// Attach learning resources. Never recorded in history; a second call
    /// overwrites, so callers check [`GraphNode::has_resources`] first.
    pub fn set_node_resources(&mut self, id: &str, resources: Vec<LearningResource>) {
        let Some(node) = self.node_mut(id) else { return };
        node.resources = Some(resources);
        self.notify();
    }

    // ── Undo / redo ───────────────────────────────────────────────────

    pub fn undo(&mut self) {
        let Some(entry) = self.history.undo().cloned() else { return };
        self.restore(entry);
        debug!(index = ?self.history.index(), "undo");
    }

    pub fn redo(&mut self) {
        let Some(entry) = self.history.redo().cloned() else { return };
        self.restore(entry);
        debug!(index = ?self.history.index(), "redo");
    }

    // ── Sessions ──────────────────────────────────────────────────────

    /// Upsert the working graph into the saved graphs, keyed by the current
    /// graph id (assigned here if absent). Returns that id.
    pub fn save_current_graph(&mut self) -> String {
        let now = now_iso8601();
        let graph_id = self.current_graph_id.get_or_insert_with(new_id).clone();
        let created_at = self
            .sessions
            .find(&graph_id)
            .map(|g| g.created_at.clone())
            .unwrap_or_else(|| now.clone());

        self.sessions.upsert(KnowledgeGraph {
            id: graph_id.clone(),
            title: self.title.clone(),
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            created_at,
            updated_at: now,
        });
        debug!(%graph_id, nodes = self.nodes.len(), "graph saved");
        graph_id
    }

    /// Replace the working graph with a copy of a saved one. Returns `false`
    /// (and changes nothing) when `id` is unknown.
    pub fn load_graph(&mut self, id: &str) -> bool {
        let Some(graph) = self.sessions.find(id).cloned() else {
            debug!(graph_id = %id, "load_graph: unknown id");
            return false;
        };

        self.current_graph_id = Some(graph.id);
        self.title = graph.title;
        self.nodes = graph.nodes;
        self.edges = graph.edges;
        self.history = History::starting_at(self.snapshot());
        self.rejected_labels.clear();

        info!(graph_id = %id, title = %self.title, "graph loaded");
        self.notify();
        true
    }

    /// Remove a saved graph. Deleting the loaded graph also clears the
    /// working document and its undo history.
    pub fn delete_graph(&mut self, id: &str) -> bool {
        let removed = self.sessions.delete(id);
        if self.current_graph_id.as_deref() == Some(id) {
            self.current_graph_id = None;
            self.title.clear();
            self.nodes.clear();
            self.edges.clear();
            self.history.clear();
            self.rejected_labels.clear();
            self.notify();
        }
        if removed {
            info!(graph_id = %id, "saved graph deleted");
        }
        removed
    }

    /// Save a non-empty working graph, then start over untitled.
    pub fn new_graph(&mut self) {
        if !self.nodes.is_empty() {
            self.save_current_graph();
        }
        self.current_graph_id = None;
        self.title.clear();
        self.nodes.clear();
        self.edges.clear();
        self.history.clear();
        self.rejected_labels.clear();
        self.notify();
    }

    // ── Selectors ─────────────────────────────────────────────────────

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn current_graph_id(&self) -> Option<&str> {
        self.current_graph_id.as_deref()
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn root_node(&self) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.status == NodeStatus::Root)
    }

    /// Targets of edges leaving `id`, in node order.
    pub fn children_of(&self, id: &str) -> Vec<&GraphNode> {
        let child_ids: Vec<&str> = self
            .edges
            .iter()
            .filter(|e| e.source == id)
            .map(|e| e.target.as_str())
            .collect();
        self.nodes.iter().filter(|n| child_ids.contains(&n.id.as_str())).collect()
    }

    pub fn suggestion_nodes(&self) -> Vec<&GraphNode> {
        self.nodes.iter().filter(|n| n.status == NodeStatus::AiSuggested).collect()
    }

    pub fn rejected_labels(&self) -> &[String] {
        &self.rejected_labels
    }

    pub fn saved_graphs(&self) -> &[KnowledgeGraph] {
        self.sessions.list()
    }

    pub fn history_index(&self) -> Option<usize> {
        self.history.index()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Value copy of the working nodes and edges.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot { nodes: self.nodes.clone(), edges: self.edges.clone() }
    }

    // ── internals ─────────────────────────────────────────────────────

    /// Apply `mutate` as one history entry. `mutate` returns `false` when it
    /// changed nothing, in which case no entry is recorded.
    fn commit(&mut self, action: &'static str, mutate: impl FnOnce(&mut Self) -> bool) {
        let before = self.snapshot();
        if !mutate(self) {
            return;
        }
        let after = self.snapshot();
        self.history.record(before, after);
        debug!(
            action,
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            history_index = ?self.history.index(),
            "graph mutated"
        );
        self.notify();
    }

    fn restore(&mut self, entry: Snapshot) {
        self.nodes = entry.nodes;
        self.edges = entry.edges;
        self.notify();
    }

    fn delete_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return false;
        }
        self.edges.retain(|e| e.source != id && e.target != id);
        true
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    fn is_root(&self, id: &str) -> bool {
        self.node(id).is_some_and(|n| n.status == NodeStatus::Root)
    }

    fn notify(&mut self) {
        self.revision += 1;
        // No receivers is normal (no autosave attached).
        let _ = self.events.send(GraphEvent {
            graph_id: self.current_graph_id.clone(),
            node_count: self.nodes.len(),
            revision: self.revision,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{ReasonType, ResourceType};

    fn suggestion(label: &str) -> AiSuggestion {
        AiSuggestion {
            label: label.into(),
            description: format!("{label} explained"),
            reason_type: ReasonType::Component,
            reason_text: "part of the picture".into(),
            relation_type: RelationType::PartOf,
            relation_label: "part of".into(),
            confidence: 0.8,
        }
    }

    fn seeded() -> (GraphDocument, String) {
        let mut doc = GraphDocument::new();
        doc.set_root_topic("Product-Market Fit");
        let root = doc.root_node().unwrap().id.clone();
        (doc, root)
    }

    fn assert_root_invariant(doc: &GraphDocument) {
        let roots: Vec<_> = doc.nodes().iter().filter(|n| n.status == NodeStatus::Root).collect();
        assert_eq!(roots.len(), 1, "exactly one root");
        assert!(doc.edges().iter().all(|e| e.target != roots[0].id), "root has no incoming edge");
    }

    #[test]
    fn set_root_topic_seeds_single_root() {
        let (doc, _) = seeded();
        assert_eq!(doc.nodes().len(), 1);
        assert_eq!(doc.edges().len(), 0);
        let root = &doc.nodes()[0];
        assert_eq!(root.status, NodeStatus::Root);
        assert_eq!(root.label, "Product-Market Fit");
        assert_eq!(root.description, "Root topic: Product-Market Fit");
        assert_eq!(doc.title(), "Product-Market Fit");
        assert_eq!(doc.history_index(), Some(0));
        assert!(doc.current_graph_id().is_some());
    }

    #[test]
    fn set_root_topic_assigns_fresh_identity_and_clears_rejections() {
        let (mut doc, root) = seeded();
        let first_id = doc.current_graph_id().map(str::to_string);
        let ids = doc.add_suggestions(&root, vec![suggestion("Foo")]);
        doc.reject_suggestion(&ids[0]);
        assert_eq!(doc.rejected_labels().len(), 1);

        doc.set_root_topic("Pricing");
        assert_ne!(doc.current_graph_id().map(str::to_string), first_id);
        assert!(doc.rejected_labels().is_empty());
        assert!(!doc.can_undo());
    }

    #[test]
    fn add_node_under_parent_creates_related_edge() {
        let (mut doc, root) = seeded();
        let id = doc.add_node(NewNode::user_added("X", ""), Some(&root));

        assert_eq!(doc.nodes().len(), 2);
        assert_eq!(doc.edges().len(), 1);
        let edge = &doc.edges()[0];
        assert_eq!(edge.source, root);
        assert_eq!(edge.target, id);
        assert_eq!(edge.relation_type, RelationType::RelatedTo);
        assert_eq!(edge.label, "related to");
        let node = doc.node(&id).unwrap();
        assert_eq!(node.status, NodeStatus::UserAdded);
        assert_eq!(node.position, Position::ORIGIN);
    }

    #[test]
    fn add_node_undo_restores_prior_state() {
        let (mut doc, root) = seeded();
        let before = doc.snapshot();
        doc.add_node(NewNode::user_added("X", ""), Some(&root));
        doc.undo();
        assert_eq!(doc.snapshot(), before);
    }

    #[test]
    fn add_node_cannot_create_second_root() {
        let (mut doc, _) = seeded();
        let new = NewNode { label: "Other".into(), description: String::new(), status: NodeStatus::Root };
        let id = doc.add_node(new, None);
        assert_eq!(doc.node(&id).unwrap().status, NodeStatus::UserAdded);
        assert_root_invariant(&doc);
    }

    #[test]
    fn remove_node_cascades_edges_and_orphans_children() {
        let (mut doc, root) = seeded();
        let mid = doc.add_node(NewNode::user_added("Mid", ""), Some(&root));
        let leaf = doc.add_node(NewNode::user_added("Leaf", ""), Some(&mid));

        doc.remove_node(&mid);
        assert!(doc.node(&mid).is_none());
        assert!(doc.edges().iter().all(|e| e.source != mid && e.target != mid));
        assert!(doc.node(&leaf).is_some(), "children stay as orphans");
        assert!(doc.edges().is_empty());
    }

    #[test]
    fn root_cannot_be_removed_or_rejected() {
        let (mut doc, root) = seeded();
        let index = doc.history_index();
        doc.remove_node(&root);
        doc.reject_suggestion(&root);
        assert_root_invariant(&doc);
        assert_eq!(doc.history_index(), index);
    }

    #[test]
    fn update_node_merges_fields() {
        let (mut doc, root) = seeded();
        let id = doc.add_node(NewNode::user_added("Old", "desc"), Some(&root));
        doc.update_node(&id, NodeUpdate { label: Some("New".into()), description: None });
        let node = doc.node(&id).unwrap();
        assert_eq!(node.label, "New");
        assert_eq!(node.description, "desc");
    }

    #[test]
    fn update_unknown_node_is_silent_noop() {
        let (mut doc, _) = seeded();
        let index = doc.history_index();
        doc.update_node("missing", NodeUpdate { label: Some("x".into()), description: None });
        assert_eq!(doc.history_index(), index);
    }

    #[test]
    fn position_and_resources_skip_history() {
        let (mut doc, root) = seeded();
        let index = doc.history_index();
        doc.update_node_position(&root, Position::new(10.0, 20.0));
        doc.set_node_resources(
            &root,
            vec![LearningResource {
                title: "The Lean Startup".into(),
                kind: ResourceType::Book,
                author: Some("Eric Ries".into()),
                description: "Build-measure-learn".into(),
                url: None,
            }],
        );
        assert_eq!(doc.history_index(), index);
        let node = doc.node(&root).unwrap();
        assert_eq!(node.position, Position::new(10.0, 20.0));
        assert!(node.has_resources());
    }

    #[test]
    fn add_suggestions_is_one_history_entry() {
        let (mut doc, root) = seeded();
        let index = doc.history_index().unwrap();
        let ids = doc.add_suggestions(&root, vec![suggestion("A"), suggestion("B"), suggestion("C")]);

        assert_eq!(ids.len(), 3);
        assert_eq!(doc.suggestion_nodes().len(), 3);
        assert_eq!(doc.edges().iter().filter(|e| e.source == root).count(), 3);
        assert_eq!(doc.history_index(), Some(index + 1));

        let node = doc.node(&ids[0]).unwrap();
        assert_eq!(node.reason_type, Some(ReasonType::Component));
        assert_eq!(node.parent_id.as_deref(), Some(root.as_str()));
        let edge = doc.edges().iter().find(|e| e.target == ids[0]).unwrap();
        assert_eq!(edge.relation_type, RelationType::PartOf);
        assert_eq!(edge.label, "part of");

        doc.undo();
        assert_eq!(doc.nodes().len(), 1);
    }

    #[test]
    fn add_suggestions_to_missing_parent_is_dropped() {
        let (mut doc, _) = seeded();
        assert!(doc.add_suggestions("gone", vec![suggestion("A")]).is_empty());
        assert_eq!(doc.nodes().len(), 1);
    }

    #[test]
    fn accept_suggestion_is_idempotent() {
        let (mut doc, root) = seeded();
        let ids = doc.add_suggestions(&root, vec![suggestion("A")]);
        doc.accept_suggestion(&ids[0]);
        let once = (doc.snapshot(), doc.history_index());
        doc.accept_suggestion(&ids[0]);
        assert_eq!((doc.snapshot(), doc.history_index()), once);
        assert_eq!(doc.node(&ids[0]).unwrap().status, NodeStatus::Accepted);
    }

    #[test]
    fn reject_suggestion_records_label_once() {
        let (mut doc, root) = seeded();
        let first = doc.add_suggestions(&root, vec![suggestion("Foo")]);
        doc.reject_suggestion(&first[0]);
        assert!(doc.node(&first[0]).is_none());
        assert!(doc.edges().is_empty());
        assert_eq!(doc.rejected_labels(), ["Foo".to_string()]);

        let again = doc.add_suggestions(&root, vec![suggestion("Foo")]);
        doc.reject_suggestion(&again[0]);
        assert_eq!(doc.rejected_labels(), ["Foo".to_string()]);
    }

    #[test]
    fn undo_redo_is_identity_across_actions() {
        let (mut doc, root) = seeded();
        let a = doc.add_node(NewNode::user_added("A", ""), Some(&root));
        let ids = doc.add_suggestions(&a, vec![suggestion("B"), suggestion("C")]);
        doc.accept_suggestion(&ids[0]);
        doc.reject_suggestion(&ids[1]);
        doc.update_node(&a, NodeUpdate { label: None, description: Some("d".into()) });

        for _ in 0..5 {
            let current = doc.snapshot();
            doc.undo();
            doc.redo();
            assert_eq!(doc.snapshot(), current);
            doc.undo();
        }
        assert_eq!(doc.nodes().len(), 1);
        assert!(!doc.can_undo());
        doc.undo();
        assert_eq!(doc.nodes().len(), 1);
    }

    #[test]
    fn new_action_after_undo_discards_redo() {
        let (mut doc, root) = seeded();
        doc.add_node(NewNode::user_added("A", ""), Some(&root));
        doc.add_node(NewNode::user_added("B", ""), Some(&root));
        doc.undo();
        assert!(doc.can_redo());

        doc.add_node(NewNode::user_added("C", ""), Some(&root));
        assert!(!doc.can_redo());
        doc.redo();
        let labels: Vec<_> = doc.nodes().iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, ["Product-Market Fit", "A", "C"]);
    }

    #[test]
    fn undo_restores_drag_positions_at_time_of_action() {
        let (mut doc, root) = seeded();
        doc.update_node_position(&root, Position::new(5.0, 5.0));
        doc.add_node(NewNode::user_added("A", ""), Some(&root));
        doc.undo();
        assert_eq!(doc.node(&root).unwrap().position, Position::new(5.0, 5.0));
    }

    #[test]
    fn save_preserves_created_at_and_refreshes_updated_at() {
        let (mut doc, root) = seeded();
        let id = doc.save_current_graph();
        let created = doc.saved_graphs()[0].created_at.clone();

        doc.add_node(NewNode::user_added("A", ""), Some(&root));
        assert_eq!(doc.save_current_graph(), id);
        assert_eq!(doc.saved_graphs().len(), 1);
        let saved = &doc.saved_graphs()[0];
        assert_eq!(saved.created_at, created);
        assert!(saved.updated_at >= created);
        assert_eq!(saved.nodes.len(), 2);
    }

    #[test]
    fn saved_copy_is_independent_of_later_edits() {
        let (mut doc, root) = seeded();
        doc.save_current_graph();
        doc.update_node(&root, NodeUpdate { label: Some("Changed".into()), description: None });
        assert_eq!(doc.saved_graphs()[0].nodes[0].label, "Product-Market Fit");
    }

    #[test]
    fn load_graph_replaces_working_copy_and_resets_history() {
        let (mut doc, root) = seeded();
        let first = doc.save_current_graph();
        doc.set_root_topic("Second");
        doc.add_node(NewNode::user_added("A", ""), None);
        let index_before = doc.history_index();
        assert_eq!(index_before, Some(1));

        assert!(doc.load_graph(&first));
        assert_eq!(doc.title(), "Product-Market Fit");
        assert_eq!(doc.current_graph_id(), Some(first.as_str()));
        assert_eq!(doc.root_node().map(|n| n.id.clone()), Some(root));
        assert_eq!(doc.history_index(), Some(0));
        assert!(doc.rejected_labels().is_empty());
    }

    #[test]
    fn load_unknown_graph_is_noop() {
        let (mut doc, _) = seeded();
        let before = doc.to_state();
        assert!(!doc.load_graph("nope"));
        assert_eq!(doc.to_state(), before);
    }

    #[test]
    fn delete_current_graph_clears_working_copy() {
        let (mut doc, _) = seeded();
        let id = doc.save_current_graph();
        assert!(doc.delete_graph(&id));
        assert!(doc.is_empty());
        assert_eq!(doc.title(), "");
        assert_eq!(doc.current_graph_id(), None);
        assert!(doc.saved_graphs().is_empty());
    }

    #[test]
    fn deleted_graph_cannot_be_undone_back() {
        let (mut doc, root) = seeded();
        doc.add_node(NewNode::user_added("A", ""), Some(&root));
        let added = doc.add_suggestions(&root, vec![suggestion("B")]);
        doc.reject_suggestion(&added[0]);
        let id = doc.save_current_graph();

        assert!(doc.delete_graph(&id));
        assert!(!doc.can_undo());
        assert!(doc.rejected_labels().is_empty());

        doc.undo();
        assert!(doc.is_empty());
        assert_eq!(doc.current_graph_id(), None);
    }

    #[test]
    fn delete_other_graph_keeps_working_copy() {
        let (mut doc, _) = seeded();
        let other = doc.save_current_graph();
        doc.set_root_topic("Second");
        assert!(doc.delete_graph(&other));
        assert_eq!(doc.title(), "Second");
    }

    #[test]
    fn new_graph_autosaves_non_empty_work() {
        let (mut doc, _) = seeded();
        let id = doc.current_graph_id().map(str::to_string).unwrap();
        doc.new_graph();
        assert!(doc.is_empty());
        assert_eq!(doc.current_graph_id(), None);
        assert_eq!(doc.history_index(), None);
        assert!(doc.saved_graphs().iter().any(|g| g.id == id));

        doc.new_graph();
        assert_eq!(doc.saved_graphs().len(), 1, "empty graphs are not saved");
    }

    #[test]
    fn state_round_trips_through_json() {
        let (mut doc, root) = seeded();
        doc.add_suggestions(&root, vec![suggestion("A")]);
        doc.save_current_graph();
        let json = serde_json::to_string(&doc.to_state()).unwrap();
        assert!(json.contains("\"currentGraphId\""));
        assert!(json.contains("\"savedGraphs\""));

        let restored = GraphDocument::from_state(serde_json::from_str(&json).unwrap());
        assert_eq!(restored.to_state(), doc.to_state());
        assert_eq!(restored.history_index(), Some(0));
    }

    #[test]
    fn subscribers_see_every_change() {
        let (mut doc, root) = seeded();
        let mut rx = doc.subscribe();
        doc.add_node(NewNode::user_added("A", ""), Some(&root));
        doc.update_node_position(&root, Position::new(1.0, 1.0));

        let first = rx.try_recv().unwrap();
        assert_eq!(first.node_count, 2);
        let second = rx.try_recv().unwrap();
        assert_eq!(second.revision, first.revision + 1);
        assert!(rx.try_recv().is_err());
    }
}
