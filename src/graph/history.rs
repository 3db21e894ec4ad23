//! Linear undo/redo history of whole-graph snapshots.
//!
//! The cursor always points at the entry matching the working graph as of the
//! last history-producing action. Recording a new action drops every entry
//! past the cursor, so there is exactly one timeline.

use super::types::{GraphEdge, GraphNode};

/// Value copy of the working graph at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<Snapshot>,
    cursor: Option<usize>,
}

impl History {
    /// History holding a single entry at `initial`.
    pub fn starting_at(initial: Snapshot) -> Self {
        Self { entries: vec![initial], cursor: Some(0) }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    /// Record one logical action.
    ///
    /// `before` is the working graph immediately prior to the action (it may
    /// differ from the entry at the cursor by position or resource updates,
    /// which never produce entries of their own). `after` is the result.
    pub fn record(&mut self, before: Snapshot, after: Snapshot) {
        match self.cursor {
            Some(c) => {
                self.entries.truncate(c + 1);
                self.entries[c] = before;
            }
            None => {
                self.entries.clear();
                self.entries.push(before);
            }
        }
        self.entries.push(after);
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back one entry. `None` at the first entry or when empty.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        let c = self.cursor.filter(|c| *c > 0)?;
        self.cursor = Some(c - 1);
        self.entries.get(c - 1)
    }

    /// Step forward one entry. `None` at the last entry or when empty.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let c = self.cursor.filter(|c| c + 1 < self.entries.len())?;
        self.cursor = Some(c + 1);
        self.entries.get(c + 1)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Cursor position, `None` for an empty history.
    pub fn index(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
