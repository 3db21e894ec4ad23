//! Whole-graph JSON export.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::AppError;
use crate::graph::types::{GraphEdge, GraphNode};
use crate::graph::{now_iso8601, GraphDocument};

const FALLBACK_NAME: &str = "knowledge-graph";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphExport<'a> {
    pub title: &'a str,
    pub nodes: &'a [GraphNode],
    pub edges: &'a [GraphEdge],
    pub exported_at: String,
}

impl<'a> GraphExport<'a> {
    pub fn of(doc: &'a GraphDocument) -> Self {
        Self {
            title: doc.title(),
            nodes: doc.nodes(),
            edges: doc.edges(),
            exported_at: now_iso8601(),
        }
    }
}

const RESERVED: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// `{title}.json`, or `knowledge-graph.json` for an untitled graph.
/// Characters not allowed in file names on common filesystems become `-`.
pub fn export_file_name(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| if RESERVED.contains(&c) || c.is_control() { '-' } else { c })
        .collect();
    let stem = match cleaned.trim_matches('.') {
        "" => FALLBACK_NAME,
        _ => cleaned.as_str(),
    };
    format!("{stem}.json")
}

/// Write the working graph as pretty JSON into `dir`. Returns the file path.
pub fn export_graph(doc: &GraphDocument, dir: &Path) -> Result<PathBuf, AppError> {
    let path = dir.join(export_file_name(doc.title()));
    let data = serde_json::to_string_pretty(&GraphExport::of(doc))
        .map_err(|e| AppError::Persist(format!("serialise export: {e}")))?;
    fs::create_dir_all(dir)?;
    fs::write(&path, data)?;
    tracing::info!(path = %path.display(), nodes = doc.nodes().len(), "graph exported");
    Ok(path)
}
