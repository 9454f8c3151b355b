#![forbid(unsafe_code)]

//! Genealogical graph engine (headless).
//!
//! Owns the canonical graph state and runs the mutation pipeline: mutate →
//! generation leveling → hierarchical layout (unless skipped) → collapse
//! visibility → history commit (unless the mutation is an undo/redo) →
//! dirty-set notification for coalesced persistence.
//!
//! Rendering, image handling, export and the concrete auth backend are
//! external collaborators behind the traits in [`store`] and [`auth`];
//! async APIs are runtime-agnostic (no specific executor required).

pub mod auth;
pub mod engine;
pub mod error;
pub mod store;
pub mod sync;
pub mod trees;

pub use auth::{AuthProvider, StaticAuth, UserId};
pub use engine::{RenderNode, TreeEngine};
pub use error::{Error, Result};
pub use store::{FsTreeStore, SaveRequest, StoreError, TreeRecord, TreeStore};
pub use stemma_core::{
    AttributePatch, Edge, GraphModel, GraphSnapshot, Node, PersonAttributes, Point, Relation,
};
pub use stemma_layout::LayoutConfig;
pub use sync::{FlushOutcome, SyncManager};
pub use trees::{create_tree, delete_tree, initial_root_node, list_trees};
