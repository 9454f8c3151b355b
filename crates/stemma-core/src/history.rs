//! Linear undo/redo history.
//!
//! A bounded stack of immutable [`GraphSnapshot`]s plus a cursor. Committing
//! while the cursor sits behind the tip discards the redo tail; states
//! produced by undo/redo themselves are never committed.

use crate::persist::GraphSnapshot;

/// Oldest snapshots are dropped once the stack reaches this depth.
pub const MAX_DEPTH: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    snapshots: Vec<GraphSnapshot>,
    cursor: usize,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all history with a single initial snapshot (tree load).
    pub fn reset(&mut self, initial: GraphSnapshot) {
        self.snapshots = vec![initial];
        self.cursor = 0;
    }

    /// Appends a snapshot, discarding any redo states past the cursor.
    pub fn commit(&mut self, snapshot: GraphSnapshot) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot);
        if self.snapshots.len() > MAX_DEPTH {
            self.snapshots.remove(0);
        }
        self.cursor = self.snapshots.len() - 1;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Steps back and returns the snapshot to restore. The caller applies it
    /// without running layout and without committing.
    pub fn undo(&mut self) -> Option<&GraphSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    pub fn redo(&mut self) -> Option<&GraphSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
