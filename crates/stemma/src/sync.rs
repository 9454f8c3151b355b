//! Write coalescing.
//!
//! Tracks the nodes changed (and removed) since the last successful save,
//! debounces
//! bursts of mutations into a single write (trailing edge), and enforces
//! single-flight semantics: at most one save is in flight at any time.
//!
//! Policy for a round that fires while a save is in flight: the round is
//! dropped. Dirty entries are kept, so nothing is lost while the process
//! lives, but nothing is retried proactively either — the next mutation's
//! debounce arming is what eventually pushes the pending write out.

use std::cell::{Cell, RefCell};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use stemma_core::{PersistedEdge, PersistedNode};

use crate::error::Result;
use crate::store::{SaveRequest, TreeStore};

/// Default trailing-edge debounce window.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The store accepted this many nodes.
    Saved(usize),
    /// Nothing was dirty; no store call was made.
    Clean,
    /// A save was already in flight; this round was dropped.
    SkippedBusy,
}

pub struct SyncManager {
    store: Arc<dyn TreeStore>,
    tree_id: String,
    window: Duration,
    /// Latest known value per changed node id since the last successful save.
    dirty: RefCell<IndexMap<String, PersistedNode>>,
    /// Tombstones: node ids removed from the graph whose stored records
    /// still need erasing. A node marked dirty again drops its tombstone.
    deleted: RefCell<IndexSet<String>>,
    deadline: Cell<Option<Instant>>,
    /// Single-flight guard. A save that never resolves holds this forever;
    /// timeouts are not modeled.
    saving: Cell<bool>,
}

impl SyncManager {
    pub fn new(store: Arc<dyn TreeStore>, tree_id: impl Into<String>, window: Duration) -> Self {
        Self {
            store,
            tree_id: tree_id.into(),
            window,
            dirty: RefCell::new(IndexMap::new()),
            deleted: RefCell::new(IndexSet::new()),
            deadline: Cell::new(None),
            saving: Cell::new(false),
        }
    }

    /// Merges changed nodes (latest value wins) and re-arms the debounce
    /// timer, restarting it if already armed.
    pub fn mark_dirty<I>(&self, nodes: I)
    where
        I: IntoIterator<Item = PersistedNode>,
    {
        let mut dirty = self.dirty.borrow_mut();
        let mut deleted = self.deleted.borrow_mut();
        for node in nodes {
            deleted.shift_remove(&node.id);
            dirty.insert(node.id.clone(), node);
        }
        self.deadline.set(Some(Instant::now() + self.window));
    }

    /// Records node removals so the next save erases their stored records.
    /// Re-arms the debounce timer like any other change.
    pub fn mark_deleted<I>(&self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut dirty = self.dirty.borrow_mut();
        let mut deleted = self.deleted.borrow_mut();
        for id in ids {
            dirty.shift_remove(&id);
            deleted.insert(id);
        }
        self.deadline.set(Some(Instant::now() + self.window));
    }

    /// Whether the armed debounce deadline has passed.
    pub fn poll_due(&self, now: Instant) -> bool {
        self.deadline.get().is_some_and(|d| d <= now)
    }

    pub fn is_saving(&self) -> bool {
        self.saving.get()
    }

    pub fn dirty_ids(&self) -> Vec<String> {
        self.dirty.borrow().keys().cloned().collect()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted.borrow().iter().cloned().collect()
    }

    /// Runs one save round: snapshot the dirty nodes and the tombstones,
    /// send them with the full current edge set, and on success remove
    /// exactly the snapshotted entries. On failure both sets are untouched
    /// so the next round retries the same changes.
    pub async fn flush(&self, edges: Vec<PersistedEdge>) -> Result<FlushOutcome> {
        if self.saving.get() {
            warn!(tree_id = %self.tree_id, "save already in flight; dropping this round");
            return Ok(FlushOutcome::SkippedBusy);
        }
        self.saving.set(true);
        self.deadline.set(None);

        let snapshot: Vec<PersistedNode> = self.dirty.borrow().values().cloned().collect();
        let tombstones: Vec<String> = self.deleted.borrow().iter().cloned().collect();
        if snapshot.is_empty() && tombstones.is_empty() {
            self.saving.set(false);
            return Ok(FlushOutcome::Clean);
        }
        let ids: Vec<String> = snapshot.iter().map(|n| n.id.clone()).collect();
        let count = snapshot.len();

        debug!(
            tree_id = %self.tree_id,
            nodes = count,
            deleted = tombstones.len(),
            "flushing dirty nodes"
        );
        let result = self
            .store
            .save_tree(
                &self.tree_id,
                SaveRequest {
                    nodes: snapshot,
                    edges,
                    deleted: tombstones.clone(),
                },
            )
            .await;

        match result {
            Ok(()) => {
                let mut dirty = self.dirty.borrow_mut();
                for id in &ids {
                    dirty.shift_remove(id);
                }
                let mut deleted = self.deleted.borrow_mut();
                for id in &tombstones {
                    deleted.shift_remove(id);
                }
                self.saving.set(false);
                Ok(FlushOutcome::Saved(count))
            }
            Err(err) => {
                warn!(tree_id = %self.tree_id, error = %err, "save failed; keeping dirty set for retry");
                self.saving.set(false);
                Err(err.into())
            }
        }
    }
}
