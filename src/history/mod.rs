//! History Manager
//!
//! Linear undo/redo timeline of full-scene snapshots.
//!
//! `past` runs oldest to newest and its last entry is the current state.
//! `future` holds undone entries, nearest first. Saving a new state clears
//! `future`; a snapshot equal to the current top is never pushed twice.
//! Nothing here fails: an empty stack is reported with `None`.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::scene::Snapshot;

/// Default maximum number of entries kept in `past`.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// One recorded scene state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique identifier for this entry.
    pub id: String,

    /// Human-readable description of the edit that produced the state.
    pub label: String,

    /// When the state was recorded.
    pub timestamp: DateTime<Utc>,

    /// Full scene state.
    pub snapshot: Snapshot,
}

impl HistoryEntry {
    pub fn new(label: impl Into<String>, snapshot: Snapshot) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            label: label.into(),
            timestamp: Utc::now(),
            snapshot,
        }
    }
}

/// State the caller must restore after an undo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Restore<'a> {
    /// Restore this snapshot.
    To(&'a Snapshot),
    /// No earlier state was recorded: reset to an empty scene.
    Blank,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Undo/redo stacks with a depth bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryManager {
    past: Vec<HistoryEntry>,
    future: VecDeque<HistoryEntry>,
    #[serde(default = "default_max_depth")]
    max_depth: usize,
    #[serde(default)]
    discarded: u64,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl HistoryManager {
    /// Create a manager keeping at most `max_depth` states (minimum 1).
    pub fn new(max_depth: usize) -> Self {
        Self {
            past: Vec::new(),
            future: VecDeque::new(),
            max_depth: max_depth.max(1),
            discarded: 0,
        }
    }

    /// Record a state. Returns false when it equals the current top.
    pub fn save(&mut self, snapshot: Snapshot) -> bool {
        self.save_labeled(snapshot, "Edit")
    }

    /// Record a state with a display label.
    pub fn save_labeled(&mut self, snapshot: Snapshot, label: impl Into<String>) -> bool {
        if self.past.last().is_some_and(|top| top.snapshot == snapshot) {
            debug!("snapshot identical to current state, not recorded");
            return false;
        }

        let entry = HistoryEntry::new(label, snapshot);
        debug!(entry = %entry.id, label = %entry.label, "history entry recorded");
        self.past.push(entry);
        self.future.clear();
        self.trim();
        true
    }

    /// Step back. `None` when nothing was recorded.
    pub fn undo(&mut self) -> Option<Restore<'_>> {
        let undone = self.past.pop()?;
        debug!(entry = %undone.id, label = %undone.label, "undo");
        self.future.push_front(undone);
        Some(match self.past.last() {
            Some(entry) => Restore::To(&entry.snapshot),
            None => Restore::Blank,
        })
    }

    /// Step forward. `None` when nothing was undone.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let redone = self.future.pop_front()?;
        debug!(entry = %redone.id, label = %redone.label, "redo");
        self.past.push(redone);
        self.past.last().map(|entry| &entry.snapshot)
    }

    /// Current state, if any.
    pub fn current(&self) -> Option<&Snapshot> {
        self.past.last().map(|entry| &entry.snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Change the depth bound, trimming immediately if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        self.trim();
    }

    /// Number of entries dropped by the depth bound so far.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Recorded entries, most recent first.
    pub fn past_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.past.iter().rev()
    }

    /// Undone entries, nearest first.
    pub fn future_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.future.iter()
    }

    fn trim(&mut self) {
        if self.past.len() > self.max_depth {
            let excess = self.past.len() - self.max_depth;
            self.past.drain(..excess);
            self.discarded += excess as u64;
            debug!(excess, total = self.discarded, "oldest history entries discarded");
        }
    }
}
