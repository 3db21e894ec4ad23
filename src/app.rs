//! Workspace controller.
//!
//! [`Workspace`] owns the graph document, the UI state, the user settings,
//! the AI client, and the persistence handle. Every user action goes through
//! one method here, which checks preconditions, applies the change, re-runs
//! the layout, and reports the outcome as a [`Notice`].
//!
//! AI actions are split in two so the caller can keep editing while a request
//! is in flight:
//!
//! 1. `prepare_*` checks preconditions, records the job as in flight, and
//!    returns an owned [`AiJob`] tagged with a job number and graph id.
//! 2. [`AiJob::run`] makes the request (on any task).
//! 3. [`Workspace::apply`] clears that job's in-flight entry and merges the
//!    result, unless the job was orphaned or the graph replaced meanwhile.

use std::fmt;
use std::path::Path;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::ai::expander::{self, ExpandRequest};
use crate::ai::mece::{self, MIN_CHILDREN};
use crate::ai::resources;
use crate::ai::{AiClient, AiError};
use crate::autosave::AutosaveTick;
use crate::config::Config;
use crate::error::AppError;
use crate::export;
use crate::graph::layout::compute_layout;
use crate::graph::types::{
    AiSuggestion, GraphEdge, GraphNode, LearningResource, MeceCheckResult, NewNode, NodeStatus,
    NodeUpdate, Position,
};
use crate::graph::{GraphDocument, GraphEvent};
use crate::llm::providers;
use crate::persist::Persistence;
use crate::settings::{Model, Settings};
use crate::ui_state::{MeceReport, SidebarPanel, UiState};

// ── Notice ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// User-facing outcome of a workspace action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

const MISSING_API_KEY: &str = "Set your OpenAI API key first (settings key <KEY>).";
const NODE_NOT_FOUND: &str = "Node not found.";
const NO_TOPIC: &str = "Start a graph with `topic <name>` first.";
const RESOURCES_LOADED: &str = "Resources already loaded for this node.";
const GRAPH_CHANGED: &str = "The graph changed while the AI was working; result discarded.";

// ── AI jobs ───────────────────────────────────────────────────────────────────

/// Identifies what an AI job was started against. `job` is unique per
/// workspace and ties the outcome back to its in-flight entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub job: u64,
    pub graph_id: Option<String>,
    pub node_id: String,
}

#[derive(Debug, Clone)]
enum AiTask {
    Expand {
        root_topic: String,
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
        target: GraphNode,
        rejected_labels: Vec<String>,
        max_suggestions: u32,
    },
    Mece {
        root_topic: String,
        parent: GraphNode,
        children: Vec<GraphNode>,
    },
    Resources {
        root_topic: String,
        target: GraphNode,
    },
}

/// A self-contained AI request. Owns everything it needs, so it can run on
/// a spawned task while the workspace keeps changing.
#[derive(Debug, Clone)]
pub struct AiJob {
    client: AiClient,
    model: String,
    ticket: Ticket,
    task: AiTask,
}

#[derive(Debug)]
pub enum AiOutcome {
    Expanded { ticket: Ticket, result: Result<Vec<AiSuggestion>, AiError> },
    MeceChecked { ticket: Ticket, result: Result<MeceCheckResult, AiError> },
    ResourcesFound { ticket: Ticket, result: Result<Vec<LearningResource>, AiError> },
}

impl AiJob {
    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub async fn run(self) -> AiOutcome {
        let AiJob { client, model, ticket, task } = self;
        match task {
            AiTask::Expand { root_topic, nodes, edges, target, rejected_labels, max_suggestions } => {
                let request = ExpandRequest {
                    root_topic: &root_topic,
                    nodes: &nodes,
                    edges: &edges,
                    target: &target,
                    rejected_labels: &rejected_labels,
                    max_suggestions,
                };
                let result = expander::expand_node(&client, &model, request).await;
                AiOutcome::Expanded { ticket, result }
            }
            AiTask::Mece { root_topic, parent, children } => {
                let children: Vec<&GraphNode> = children.iter().collect();
                let result = mece::check_mece(&client, &model, &root_topic, &parent, &children).await;
                AiOutcome::MeceChecked { ticket, result }
            }
            AiTask::Resources { root_topic, target } => {
                let result = resources::find_resources(&client, &model, &root_topic, &target).await;
                AiOutcome::ResourcesFound { ticket, result }
            }
        }
    }
}

// ── Workspace ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Workspace {
    doc: GraphDocument,
    ui: UiState,
    settings: Settings,
    ai: AiClient,
    persistence: Persistence,
    env_api_key: Option<String>,
    next_job: u64,
}

impl Workspace {
    pub fn new(
        doc: GraphDocument,
        settings: Settings,
        ai: AiClient,
        persistence: Persistence,
        env_api_key: Option<String>,
    ) -> Self {
        let mut ws = Self { doc, ui: UiState::default(), settings, ai, persistence, env_api_key, next_job: 0 };
        ws.sync_api_key();
        ws
    }

    /// Restore the persisted workspace described by `config`.
    pub fn open(config: &Config) -> Result<Self, AppError> {
        let persistence = Persistence::new(&config.work_dir);
        persistence.init()?;
        let settings = persistence.load_settings()?;
        let state = persistence.load_graph_store()?;
        info!(
            work_dir = %config.work_dir.display(),
            saved_graphs = state.saved_graphs.len(),
            nodes = state.nodes.len(),
            "workspace restored"
        );

        let provider = providers::build(&config.llm, None)
            .map_err(|e| AppError::Config(e.to_string()))?;
        let ai = AiClient::new(provider, &config.prompts_dir);
        Ok(Self::new(
            GraphDocument::from_state(state),
            settings,
            ai,
            persistence,
            config.llm_api_key.clone(),
        ))
    }

    // ── Accessors ─────────────────────────────────────────────────────

    pub fn document(&self) -> &GraphDocument {
        &self.doc
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GraphEvent> {
        self.doc.subscribe()
    }

    pub fn env_api_key_present(&self) -> bool {
        self.env_api_key.is_some()
    }

    /// Whether AI actions can run: the provider needs no key, or one is
    /// stored or present in the environment.
    pub fn has_api_key(&self) -> bool {
        !self.ai.provider().requires_api_key() || self.effective_api_key().is_some()
    }

    /// Resolve a console reference to a node id: `#n` / `n` (1-based position
    /// in the node list), a full id, or a label (case-insensitive, must be
    /// unique).
    pub fn resolve_node(&self, reference: &str) -> Option<String> {
        let nodes = self.doc.nodes();
        let reference = reference.trim();
        if let Ok(n) = reference.trim_start_matches('#').parse::<usize>() {
            return n.checked_sub(1).and_then(|i| nodes.get(i)).map(|n| n.id.clone());
        }
        if let Some(node) = self.doc.node(reference) {
            return Some(node.id.clone());
        }
        let mut by_label = nodes.iter().filter(|n| n.label.eq_ignore_ascii_case(reference));
        match (by_label.next(), by_label.next()) {
            (Some(only), None) => Some(only.id.clone()),
            _ => None,
        }
    }

    /// Resolve a saved-graph reference: `#n` / `n` (1-based) or a full id.
    pub fn resolve_graph(&self, reference: &str) -> Option<String> {
        let graphs = self.doc.saved_graphs();
        let reference = reference.trim();
        if let Ok(n) = reference.trim_start_matches('#').parse::<usize>() {
            return n.checked_sub(1).and_then(|i| graphs.get(i)).map(|g| g.id.clone());
        }
        graphs.iter().find(|g| g.id == reference).map(|g| g.id.clone())
    }

    // ── Graph editing ─────────────────────────────────────────────────

    pub fn set_topic(&mut self, topic: &str) -> Notice {
        let topic = topic.trim();
        if topic.is_empty() {
            return Notice::warning("Topic must not be empty.");
        }
        self.doc.set_root_topic(topic);
        self.ui.reset();
        self.relayout();
        Notice::success(format!("Started \"{topic}\"."))
    }

    /// Add a user concept under `parent_id`, defaulting to the selected node,
    /// then the root.
    pub fn add_concept(&mut self, label: &str, description: &str, parent_id: Option<&str>) -> Notice {
        if self.doc.is_empty() {
            return Notice::warning(NO_TOPIC);
        }
        let new_node = NewNode::user_added(label, description);
        if new_node.label.is_empty() {
            return Notice::warning("Label must not be empty.");
        }

        let parent = match parent_id {
            Some(id) if self.doc.node(id).is_none() => return Notice::error(NODE_NOT_FOUND),
            Some(id) => Some(id.to_string()),
            None => self
                .ui
                .selected_node_id()
                .map(str::to_string)
                .or_else(|| self.doc.root_node().map(|n| n.id.clone())),
        };

        let label = new_node.label.clone();
        self.doc.add_node(new_node, parent.as_deref());
        self.relayout();
        Notice::success(format!("Added \"{label}\"."))
    }

    pub fn edit_node(&mut self, id: &str, update: NodeUpdate) -> Notice {
        if self.doc.node(id).is_none() {
            return Notice::error(NODE_NOT_FOUND);
        }
        let update = NodeUpdate {
            label: update.label.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
            description: update.description.map(|d| d.trim().to_string()),
        };
        if update == NodeUpdate::default() {
            return Notice::info("Nothing to change.");
        }
        self.doc.update_node(id, update);
        Notice::success("Node updated.")
    }

    pub fn remove_node(&mut self, id: &str) -> Notice {
        let Some(node) = self.doc.node(id) else {
            return Notice::error(NODE_NOT_FOUND);
        };
        if node.status == NodeStatus::Root {
            return Notice::warning("The root topic cannot be removed.");
        }
        let label = node.label.clone();
        self.doc.remove_node(id);
        self.ui.forget_node(id);
        self.relayout();
        Notice::success(format!("Removed \"{label}\"."))
    }

    pub fn accept(&mut self, id: &str) -> Notice {
        match self.doc.node(id) {
            None => Notice::error(NODE_NOT_FOUND),
            Some(n) if n.status != NodeStatus::AiSuggested => Notice::info("Not a pending suggestion."),
            Some(n) => {
                let label = n.label.clone();
                self.doc.accept_suggestion(id);
                Notice::success(format!("Accepted \"{label}\"."))
            }
        }
    }

    /// Reject a pending suggestion; its label is remembered so the expander
    /// avoids it.
    pub fn reject(&mut self, id: &str) -> Notice {
        match self.doc.node(id) {
            None => Notice::error(NODE_NOT_FOUND),
            Some(n) if n.status != NodeStatus::AiSuggested => {
                Notice::info("Not a pending suggestion; use `rm` to remove it.")
            }
            Some(n) => {
                let label = n.label.clone();
                self.doc.reject_suggestion(id);
                self.ui.forget_node(id);
                self.relayout();
                Notice::success(format!("Rejected \"{label}\"."))
            }
        }
    }

    /// Manual reposition, the console counterpart of dragging a node.
    pub fn move_node(&mut self, id: &str, position: Position) -> Notice {
        if self.doc.node(id).is_none() {
            return Notice::error(NODE_NOT_FOUND);
        }
        self.doc.update_node_position(id, position);
        Notice::info(format!("Moved to ({}, {}).", position.x, position.y))
    }

    /// Switch the sidebar panel the console renders under the graph view.
    pub fn open_panel(&mut self, panel: Option<SidebarPanel>) {
        self.ui.set_sidebar_panel(panel);
    }

    pub fn select(&mut self, id: Option<String>) -> Notice {
        match id {
            Some(id) if self.doc.node(&id).is_none() => Notice::error(NODE_NOT_FOUND),
            Some(id) => {
                let label = self.doc.node(&id).map(|n| n.label.clone()).unwrap_or_default();
                self.ui.select_node(Some(id));
                Notice::info(format!("Selected \"{label}\"."))
            }
            None => {
                self.ui.select_node(None);
                Notice::info("Selection cleared.")
            }
        }
    }

    pub fn undo(&mut self) -> Notice {
        if !self.doc.can_undo() {
            return Notice::info("Nothing to undo.");
        }
        self.doc.undo();
        self.after_history_jump();
        Notice::info("Undone.")
    }

    pub fn redo(&mut self) -> Notice {
        if !self.doc.can_redo() {
            return Notice::info("Nothing to redo.");
        }
        self.doc.redo();
        self.after_history_jump();
        Notice::info("Redone.")
    }

    /// Recompute the tree layout and write every changed position back.
    pub fn relayout(&mut self) {
        let positions = compute_layout(self.doc.nodes(), self.doc.edges());
        for (id, position) in positions {
            self.doc.update_node_position(&id, position);
        }
    }

    // ── Sessions ──────────────────────────────────────────────────────

    pub fn save(&mut self) -> Notice {
        if self.doc.is_empty() {
            return Notice::info("Nothing to save.");
        }
        self.doc.save_current_graph();
        match self.persist() {
            Ok(()) => Notice::success(format!("Saved \"{}\".", self.doc.title())),
            Err(e) => Notice::error(e.to_string()),
        }
    }

    pub fn load(&mut self, graph_id: &str) -> Notice {
        if !self.doc.load_graph(graph_id) {
            return Notice::error("Saved graph not found.");
        }
        self.ui.reset();
        self.relayout();
        self.persist_or_notice(Notice::success(format!("Loaded \"{}\".", self.doc.title())))
    }

    pub fn delete_graph(&mut self, graph_id: &str) -> Notice {
        let was_current = self.doc.current_graph_id() == Some(graph_id);
        if !self.doc.delete_graph(graph_id) && !was_current {
            return Notice::error("Saved graph not found.");
        }
        if was_current {
            self.ui.reset();
        }
        self.persist_or_notice(Notice::success("Saved graph deleted."))
    }

    pub fn new_graph(&mut self) -> Notice {
        self.doc.new_graph();
        self.ui.reset();
        self.persist_or_notice(Notice::info("Started a new, empty graph."))
    }

    /// Handle an autosave tick. Returns `true` when something was saved.
    pub fn autosave(&mut self, tick: AutosaveTick) -> Result<bool, AppError> {
        if self.doc.is_empty() {
            return Ok(false);
        }
        self.doc.save_current_graph();
        self.persist()?;
        debug!(revision = tick.revision, "autosaved");
        Ok(true)
    }

    /// Write the graph store to disk.
    pub fn persist(&self) -> Result<(), AppError> {
        self.persistence.save_graph_store(&self.doc.to_state())
    }

    pub fn export(&self, dir: &Path) -> Notice {
        if self.doc.is_empty() {
            return Notice::info("Nothing to export.");
        }
        match export::export_graph(&self.doc, dir) {
            Ok(path) => Notice::success(format!("Exported to {}.", path.display())),
            Err(e) => Notice::error(e.to_string()),
        }
    }

    // ── Settings ──────────────────────────────────────────────────────

    pub fn set_api_key(&mut self, key: &str) -> Notice {
        self.settings.set_api_key(key);
        self.sync_api_key();
        let message = if self.settings.has_api_key() { "API key saved." } else { "API key cleared." };
        self.save_settings_or_notice(Notice::success(message))
    }

    pub fn set_model(&mut self, model: Model) -> Notice {
        self.settings.set_model(model);
        self.save_settings_or_notice(Notice::success(format!("Model set to {model}.")))
    }

    pub fn set_max_suggestions(&mut self, n: u32) -> Notice {
        let stored = self.settings.set_max_suggestions(n);
        self.save_settings_or_notice(Notice::success(format!("Suggestions per expansion: {stored}.")))
    }

    // ── AI actions ────────────────────────────────────────────────────

    pub fn prepare_expand(&mut self, node_id: &str) -> Result<AiJob, Notice> {
        self.require_api_key()?;
        let target = self.doc.node(node_id).cloned().ok_or_else(|| Notice::error(NODE_NOT_FOUND))?;
        if self.ui.is_expanding() {
            return Err(Notice::warning("An expansion is already running."));
        }

        let task = AiTask::Expand {
            root_topic: self.doc.title().to_string(),
            nodes: self.doc.nodes().to_vec(),
            edges: self.doc.edges().to_vec(),
            target,
            rejected_labels: self.doc.rejected_labels().to_vec(),
            max_suggestions: self.settings.max_suggestions(),
        };
        let job = self.job(node_id, task);
        self.ui.start_expanding(job.ticket.job, node_id.to_string());
        Ok(job)
    }

    pub fn prepare_mece(&mut self, parent_id: &str) -> Result<AiJob, Notice> {
        self.require_api_key()?;
        let parent = self.doc.node(parent_id).cloned().ok_or_else(|| Notice::error(NODE_NOT_FOUND))?;
        let children: Vec<GraphNode> = self
            .doc
            .children_of(parent_id)
            .into_iter()
            .filter(|n| n.status != NodeStatus::AiSuggested)
            .cloned()
            .collect();
        if children.len() < MIN_CHILDREN {
            return Err(Notice::warning(format!(
                "Need at least {MIN_CHILDREN} accepted child concepts to check MECE."
            )));
        }
        if self.ui.is_mece_checking() {
            return Err(Notice::warning("A MECE check is already running."));
        }

        let task = AiTask::Mece { root_topic: self.doc.title().to_string(), parent, children };
        let job = self.job(parent_id, task);
        self.ui.start_mece_check(job.ticket.job, parent_id.to_string());
        Ok(job)
    }

    pub fn prepare_resources(&mut self, node_id: &str) -> Result<AiJob, Notice> {
        self.require_api_key()?;
        let target = self.doc.node(node_id).cloned().ok_or_else(|| Notice::error(NODE_NOT_FOUND))?;
        if target.has_resources() {
            return Err(Notice::info(RESOURCES_LOADED));
        }
        if self.ui.is_finding_resources(node_id) {
            return Err(Notice::warning("Already looking up resources for this node."));
        }
        let task = AiTask::Resources { root_topic: self.doc.title().to_string(), target };
        let job = self.job(node_id, task);
        self.ui.start_finding_resources(job.ticket.job, node_id.to_string());
        Ok(job)
    }

    /// Merge a finished AI job and clear its in-flight entry. Results from
    /// jobs orphaned by a reset, or for a graph or node no longer loaded,
    /// are dropped.
    pub fn apply(&mut self, outcome: AiOutcome) -> Notice {
        match outcome {
            AiOutcome::Expanded { ticket, result } => {
                if !self.ui.finish_expanding(ticket.job) {
                    return superseded(&ticket);
                }
                let suggestions = match result {
                    Ok(s) => s,
                    Err(e) => return ai_failure("expand", &e),
                };
                if let Some(stale) = self.stale(&ticket) {
                    return stale;
                }
                let added = self.doc.add_suggestions(&ticket.node_id, suggestions);
                if !added.is_empty() {
                    self.ui.set_sidebar_panel(Some(SidebarPanel::Suggestions));
                }
                self.relayout();
                Notice::success(format!("Generated {} suggestions", added.len()))
            }
            AiOutcome::MeceChecked { ticket, result } => {
                if !self.ui.finish_mece_check(ticket.job) {
                    return superseded(&ticket);
                }
                let result = match result {
                    Ok(r) => r,
                    Err(e) => return ai_failure("mece", &e),
                };
                if let Some(stale) = self.stale(&ticket) {
                    return stale;
                }
                let compliant = result.is_compliant;
                self.ui.show_mece_report(MeceReport { parent_id: ticket.node_id, result });
                if compliant {
                    Notice::success("MECE check passed!")
                } else {
                    Notice::warning("MECE issues found. See the report below.")
                }
            }
            AiOutcome::ResourcesFound { ticket, result } => {
                if !self.ui.finish_finding_resources(ticket.job) {
                    return superseded(&ticket);
                }
                let found = match result {
                    Ok(r) => r,
                    Err(e) => return ai_failure("resources", &e),
                };
                if let Some(stale) = self.stale(&ticket) {
                    return stale;
                }
                if self.doc.node(&ticket.node_id).is_some_and(GraphNode::has_resources) {
                    debug!(node_id = %ticket.node_id, "resources already present, lookup result dropped");
                    return Notice::info(RESOURCES_LOADED);
                }
                let count = found.len();
                self.doc.set_node_resources(&ticket.node_id, found);
                let plural = if count == 1 { "" } else { "s" };
                Notice::success(format!("Found {count} learning resource{plural}"))
            }
        }
    }

    /// Prepare, run, and apply an expansion in one go.
    pub async fn expand(&mut self, node_id: &str) -> Notice {
        match self.prepare_expand(node_id) {
            Ok(job) => self.apply(job.run().await),
            Err(notice) => notice,
        }
    }

    pub async fn check_mece(&mut self, parent_id: &str) -> Notice {
        match self.prepare_mece(parent_id) {
            Ok(job) => self.apply(job.run().await),
            Err(notice) => notice,
        }
    }

    pub async fn find_resources(&mut self, node_id: &str) -> Notice {
        match self.prepare_resources(node_id) {
            Ok(job) => self.apply(job.run().await),
            Err(notice) => notice,
        }
    }

    // ── internals ─────────────────────────────────────────────────────

    fn job(&mut self, node_id: &str, task: AiTask) -> AiJob {
        self.next_job += 1;
        AiJob {
            client: self.ai.clone(),
            model: self.settings.model().as_str().to_string(),
            ticket: Ticket {
                job: self.next_job,
                graph_id: self.doc.current_graph_id().map(str::to_string),
                node_id: node_id.to_string(),
            },
            task,
        }
    }

    fn stale(&self, ticket: &Ticket) -> Option<Notice> {
        if self.doc.current_graph_id() != ticket.graph_id.as_deref() {
            info!(ticket_graph = ?ticket.graph_id, "discarding AI result for a graph that is no longer loaded");
            return Some(Notice::info(GRAPH_CHANGED));
        }
        if self.doc.node(&ticket.node_id).is_none() {
            info!(node_id = %ticket.node_id, "discarding AI result for a removed node");
            return Some(Notice::info("The node was removed while the AI was working; result discarded."));
        }
        None
    }

    fn require_api_key(&self) -> Result<(), Notice> {
        if self.has_api_key() {
            Ok(())
        } else {
            Err(Notice::error(MISSING_API_KEY))
        }
    }

    fn effective_api_key(&self) -> Option<String> {
        self.settings.effective_api_key(self.env_api_key.as_deref())
    }

    fn sync_api_key(&mut self) {
        let key = self.effective_api_key();
        self.ai.provider_mut().set_api_key(key);
    }

    fn after_history_jump(&mut self) {
        if let Some(selected) = self.ui.selected_node_id().map(str::to_string) {
            if self.doc.node(&selected).is_none() {
                self.ui.forget_node(&selected);
            }
        }
        self.relayout();
    }

    fn persist_or_notice(&self, ok: Notice) -> Notice {
        match self.persist() {
            Ok(()) => ok,
            Err(e) => {
                warn!(error = %e, "failed to persist graph store");
                Notice::error(e.to_string())
            }
        }
    }

    fn save_settings_or_notice(&self, ok: Notice) -> Notice {
        match self.persistence.save_settings(&self.settings) {
            Ok(()) => ok,
            Err(e) => {
                warn!(error = %e, "failed to persist settings");
                Notice::error(e.to_string())
            }
        }
    }
}

fn superseded(ticket: &Ticket) -> Notice {
    info!(job = ticket.job, node_id = %ticket.node_id, "discarding AI result from a superseded job");
    Notice::info(GRAPH_CHANGED)
}

fn ai_failure(purpose: &'static str, err: &AiError) -> Notice {
    warn!(purpose, error = %err, "AI request failed");
    Notice::error(err.to_string())
}
