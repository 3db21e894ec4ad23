//! topicmap — AI-assisted knowledge graph builder.
//!
//! A graph document engine (nodes, edges, undo/redo, saved sessions, tree
//! layout) driven from an interactive console, with three AI collaborators:
//! a concept expander, a MECE checker, and a learning-resource finder.

pub mod ai;
pub mod app;
pub mod autosave;
pub mod config;
pub mod console;
pub mod error;
pub mod export;
pub mod graph;
pub mod llm;
pub mod logger;
pub mod persist;
pub mod settings;
pub mod ui_state;
