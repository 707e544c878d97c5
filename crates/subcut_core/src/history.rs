use crate::types::Track;
use std::collections::VecDeque;
use tracing::debug;

/// Default snapshot cap for an editing session.
pub const MAX_HISTORY: usize = 1000;

/// Bounded last-in-first-out stack of track snapshots.
///
/// Snapshots are full deep copies, so later edits to the live track can never
/// reach back into stored history. When the cap is hit the oldest snapshot is
/// silently dropped. Undo only; there is no redo stack.
#[derive(Debug)]
pub struct History {
    snapshots: VecDeque<Track>,
    max_size: usize,
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            max_size,
        }
    }

    /// Push a pre-mutation snapshot, evicting the oldest entry at the cap.
    pub fn push(&mut self, snapshot: Track) {
        if self.snapshots.len() >= self.max_size {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
        debug!(depth = self.snapshots.len(), "history snapshot pushed");
    }

    /// Pop the most recent snapshot, or `None` when there is nothing to undo.
    pub fn pop(&mut self) -> Option<Track> {
        let snapshot = self.snapshots.pop_back();
        if snapshot.is_some() {
            debug!(depth = self.snapshots.len(), "history snapshot popped");
        }
        snapshot
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}
