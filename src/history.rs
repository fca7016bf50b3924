//! Linear undo/redo over whole-document snapshots.
//!
//! One snapshot is pushed per completed gesture or discrete edit. Committing after an undo
//! discards the redo branch.

use crate::document::model::Document;

/// Snapshot count kept when no capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded linear snapshot history. `cursor` always indexes a stored snapshot.
#[derive(Clone, Debug)]
pub struct History {
    snapshots: Vec<Document>,
    cursor: usize,
    capacity: usize,
}

impl History {
    pub fn new(initial: Document) -> Self {
        Self::with_capacity(initial, DEFAULT_HISTORY_CAPACITY)
    }

    /// History holding at most `capacity` snapshots (at least one).
    pub fn with_capacity(initial: Document, capacity: usize) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Drop everything after the cursor, append `doc` and move the cursor onto it.
    ///
    /// When full, the oldest snapshot is evicted.
    pub fn commit(&mut self, doc: Document) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(doc);
        if self.snapshots.len() > self.capacity {
            let excess = self.snapshots.len() - self.capacity;
            self.snapshots.drain(..excess);
        }
        self.cursor = self.snapshots.len() - 1;
        tracing::debug!(cursor = self.cursor, len = self.snapshots.len(), "history commit");
    }

    /// Step back one snapshot. `None` at the oldest snapshot.
    pub fn undo(&mut self) -> Option<&Document> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor)
    }

    /// Step forward one snapshot. `None` at the newest snapshot.
    pub fn redo(&mut self) -> Option<&Document> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Snapshot under the cursor.
    pub fn current(&self) -> &Document {
        &self.snapshots[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget everything and start over from `initial`.
    pub fn reset(&mut self, initial: Document) {
        self.snapshots.clear();
        self.snapshots.push(initial);
        self.cursor = 0;
    }
}

#[cfg(test)]
#[path = "../tests/unit/history.rs"]
mod tests;
