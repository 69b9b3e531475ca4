//! Request History - bounded in-memory log of recent requests
//!
//! Newest entries first. Appending beyond capacity silently evicts the oldest
//! entries. The store is instance-local and lost on restart.

use std::collections::VecDeque;

use parking_lot::RwLock;

use crate::models::RequestRecord;

// ============================================================================
// STORE
// ============================================================================

/// Fixed-capacity request history shared by all handlers
#[derive(Debug)]
pub struct HistoryStore {
    capacity: usize,
    entries: RwLock<VecDeque<RequestRecord>>,
}

impl HistoryStore {
    /// Create an empty store. Capacity is at least 1; storage grows on append.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(VecDeque::new()),
        }
    }

    /// Insert at the front, then trim the tail back to capacity
    pub fn append(&self, record: RequestRecord) {
        let mut entries = self.entries.write();
        entries.push_front(record);
        entries.truncate(self.capacity);
    }

    /// Snapshot of current entries, newest first
    pub fn list(&self) -> Vec<RequestRecord> {
        self.entries.read().iter().cloned().collect()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
