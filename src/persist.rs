//! JSON file persistence for the graph store and the settings store.
//!
//! Both live side by side in the work dir:
//!
//! ```text
//! {work_dir}/
//!   graph-store.json   — GraphStoreState (working graph + saved graphs)
//!   settings.json      — Settings
//! ```
//!
//! A missing file loads as the default state. Writes go to a sibling temp
//! file first and are renamed into place, so a crash mid-write leaves the
//! previous copy intact.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::AppError;
use crate::graph::GraphStoreState;
use crate::settings::Settings;

const GRAPH_STORE_FILENAME: &str = "graph-store.json";
const SETTINGS_FILENAME: &str = "settings.json";

#[derive(Debug, Clone)]
pub struct Persistence {
    dir: PathBuf,
}

impl Persistence {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the work dir if needed.
    pub fn init(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| AppError::Persist(format!("cannot create {}: {e}", self.dir.display())))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn graph_store_path(&self) -> PathBuf {
        self.dir.join(GRAPH_STORE_FILENAME)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILENAME)
    }

    pub fn load_graph_store(&self) -> Result<GraphStoreState, AppError> {
        Ok(read_json(&self.graph_store_path())?.unwrap_or_default())
    }

    pub fn save_graph_store(&self, state: &GraphStoreState) -> Result<(), AppError> {
        write_json(&self.graph_store_path(), state)
    }

    pub fn load_settings(&self) -> Result<Settings, AppError> {
        Ok(read_json::<Settings>(&self.settings_path())?
            .unwrap_or_default()
            .normalised())
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), AppError> {
        write_json(&self.settings_path(), settings)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no persisted file, using defaults");
            return Ok(None);
        }
        Err(e) => return Err(AppError::Persist(format!("cannot read {}: {e}", path.display()))),
    };
    serde_json::from_str(&data)
        .map(Some)
        .map_err(|e| AppError::Persist(format!("malformed {}: {e}", path.display())))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let data = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Persist(format!("serialise {}: {e}", path.display())))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data)
        .map_err(|e| AppError::Persist(format!("cannot write {}: {e}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|e| AppError::Persist(format!("cannot replace {}: {e}", path.display())))?;
    debug!(path = %path.display(), "persisted");
    Ok(())
}
