//! Saved-graph collection.
//!
//! A thin keyed list over [`KnowledgeGraph`] value copies. Insertion order is
//! kept so listings stay stable; lookups are linear because sessions number in
//! the tens.

use serde::{Deserialize, Serialize};

use super::types::KnowledgeGraph;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionStore {
    graphs: Vec<KnowledgeGraph>,
}

impl SessionStore {
    pub fn new(graphs: Vec<KnowledgeGraph>) -> Self {
        Self { graphs }
    }

    /// Insert `graph`, replacing any saved graph with the same id in place.
    pub fn upsert(&mut self, graph: KnowledgeGraph) {
        match self.graphs.iter_mut().find(|g| g.id == graph.id) {
            Some(existing) => *existing = graph,
            None => self.graphs.push(graph),
        }
    }

    pub fn find(&self, id: &str) -> Option<&KnowledgeGraph> {
        self.graphs.iter().find(|g| g.id == id)
    }

    /// Remove the graph with `id`. Returns `true` if it was present.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.graphs.len();
        self.graphs.retain(|g| g.id != id);
        self.graphs.len() < before
    }

    pub fn list(&self) -> &[KnowledgeGraph] {
        &self.graphs
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}
