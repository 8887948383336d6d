//! Bounded edit history.
//!
//! The history log is the single authority for undo. Entries are tagged by
//! kind and stamped with a monotonically increasing sequence number; they
//! reference objects by [`ObjectKey`] rather than holding copies, so the layer
//! stack stays the only owner of object state. When the log is full the
//! oldest entry is dropped.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::consts::HISTORY_CAPACITY;
use crate::model::ObjectKey;

/// One property change recorded by a [`HistoryEntryKind::ChangeObject`] entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    pub key: ObjectKey,
    pub property: String,
    pub before: serde_json::Value,
    pub after: serde_json::Value,
}

/// What an entry records.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntryKind {
    AddObject,
    RemoveObject,
    ChangeObject { changes: Vec<PropertyChange> },
    PasteClipboard,
}

/// A single history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub seq: u64,
    pub kind: HistoryEntryKind,
    /// Objects touched by the edit.
    pub affected: Vec<ObjectKey>,
}

/// FIFO-evicting, LIFO-consumed log of edits.
#[derive(Debug)]
pub struct HistoryBuffer {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    next_seq: u64,
}

impl HistoryBuffer {
    /// Buffer holding up to 1000 entries.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Buffer holding up to `capacity` entries (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: VecDeque::with_capacity(capacity.min(64)), capacity, next_seq: 1 }
    }

    /// Record an edit and return its sequence number.
    pub fn push(&mut self, kind: HistoryEntryKind, affected: Vec<ObjectKey>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry { seq, kind, affected });
        seq
    }

    /// Remove and return the newest entry.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    #[must_use]
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Look up a retained entry by sequence number.
    #[must_use]
    pub fn get(&self, seq: u64) -> Option<&HistoryEntry> {
        match self.entries.binary_search_by_key(&seq, |e| e.seq) {
            Ok(idx) => self.entries.get(idx),
            Err(_) => None,
        }
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
