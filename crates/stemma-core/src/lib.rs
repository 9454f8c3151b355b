#![forbid(unsafe_code)]

//! Genealogical graph model (headless).
//!
//! Design goals:
//! - all-or-nothing mutation primitives over a canonical node/edge store
//! - deterministic derived state (generation levels, collapse visibility)
//! - immutable snapshot history with explicit persistable projections

pub mod collapse;
pub mod error;
pub mod graph;
pub mod history;
pub mod level;
pub mod model;
pub mod persist;

pub use collapse::derive_hidden;
pub use error::{Error, Result};
pub use graph::GraphModel;
pub use history::HistoryManager;
pub use level::compute_levels;
pub use model::{AttributePatch, Edge, Node, NodeKind, PersonAttributes, Point, Relation};
pub use persist::{GraphSnapshot, PersistedEdge, PersistedNode};
