//! Selection and transient view state.
//!
//! Nothing here is persisted. In-flight AI calls are tracked by job number so
//! the console can show what is pending, refuse duplicates, and tell a
//! finished job from one that was superseded by a reset.

use crate::graph::types::MeceCheckResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarPanel {
    Detail,
    Suggestions,
    Mece,
}

/// Last MECE evaluation and the parent it was run against.
#[derive(Debug, Clone, PartialEq)]
pub struct MeceReport {
    pub parent_id: String,
    pub result: MeceCheckResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlight {
    job: u64,
    node_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    selected_node_id: Option<String>,
    sidebar_panel: Option<SidebarPanel>,
    expanding: Option<InFlight>,
    mece_checking: Option<InFlight>,
    finding_resources: Vec<InFlight>,
    mece_report: Option<MeceReport>,
}

impl UiState {
    /// Select a node and open its detail panel; `None` clears the selection
    /// and closes the sidebar.
    pub fn select_node(&mut self, id: Option<String>) {
        self.sidebar_panel = id.as_ref().map(|_| SidebarPanel::Detail);
        self.selected_node_id = id;
    }

    pub fn set_sidebar_panel(&mut self, panel: Option<SidebarPanel>) {
        self.sidebar_panel = panel;
    }

    pub fn start_expanding(&mut self, job: u64, node_id: String) {
        self.expanding = Some(InFlight { job, node_id });
    }

    /// Clear the expansion flag if `job` is the one running. `false` means
    /// the job was superseded and its result should be dropped.
    pub fn finish_expanding(&mut self, job: u64) -> bool {
        take_if_job(&mut self.expanding, job)
    }

    pub fn start_mece_check(&mut self, job: u64, parent_id: String) {
        self.mece_checking = Some(InFlight { job, node_id: parent_id });
    }

    pub fn finish_mece_check(&mut self, job: u64) -> bool {
        take_if_job(&mut self.mece_checking, job)
    }

    pub fn start_finding_resources(&mut self, job: u64, node_id: String) {
        self.finding_resources.push(InFlight { job, node_id });
    }

    pub fn finish_finding_resources(&mut self, job: u64) -> bool {
        let before = self.finding_resources.len();
        self.finding_resources.retain(|f| f.job != job);
        self.finding_resources.len() != before
    }

    /// Store a MECE result and switch to the MECE panel.
    pub fn show_mece_report(&mut self, report: MeceReport) {
        self.mece_report = Some(report);
        self.sidebar_panel = Some(SidebarPanel::Mece);
    }

    /// Drop a selection or report that points at a node no longer present.
    pub fn forget_node(&mut self, id: &str) {
        if self.selected_node_id.as_deref() == Some(id) {
            self.select_node(None);
        }
        if self.mece_report.as_ref().is_some_and(|r| r.parent_id == id) {
            self.mece_report = None;
        }
    }

    /// Clear everything tied to the working graph (load / new / delete).
    /// Jobs still running are orphaned and their results dropped.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn selected_node_id(&self) -> Option<&str> {
        self.selected_node_id.as_deref()
    }

    pub fn sidebar_panel(&self) -> Option<SidebarPanel> {
        self.sidebar_panel
    }

    pub fn is_expanding(&self) -> bool {
        self.expanding.is_some()
    }

    pub fn expanding_node_id(&self) -> Option<&str> {
        self.expanding.as_ref().map(|f| f.node_id.as_str())
    }

    pub fn is_mece_checking(&self) -> bool {
        self.mece_checking.is_some()
    }

    pub fn is_finding_resources(&self, node_id: &str) -> bool {
        self.finding_resources.iter().any(|f| f.node_id == node_id)
    }

    pub fn mece_report(&self) -> Option<&MeceReport> {
        self.mece_report.as_ref()
    }
}

fn take_if_job(slot: &mut Option<InFlight>, job: u64) -> bool {
    if slot.as_ref().is_some_and(|f| f.job == job) {
        *slot = None;
        true
    } else {
        false
    }
}
