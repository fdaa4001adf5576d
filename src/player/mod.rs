//! Per-player advancement progress
//!
//! A [`PlayerProgress`] is the in-memory record of one player: for every
//! advancement path it holds the counter, the completed flag and the
//! active flag. Records are owned by the [`ProgressStore`], which hands them
//! out behind a per-player mutex and persists them write-behind through a
//! [`ProgressDb`].

mod db;
mod store;

pub use db::ProgressDb;
pub use store::{NotLoaded, ProgressStore};

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;

use crate::advancement::AdvancementPath;

/// Player identity as handed over by the host
pub type PlayerId = uuid::Uuid;

/// Progress on a single advancement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressEntry {
    pub progress: u64,
    pub completed: bool,
    /// Explicitly activated for this player
    pub active: bool,
    /// Unix millis of the completion, if completed
    pub completed_at: Option<i64>,
}

/// All advancement progress of one player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProgress {
    player: PlayerId,
    entries: HashMap<String, ProgressEntry>,
}

impl PlayerProgress {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            entries: HashMap::new(),
        }
    }

    pub(crate) fn from_entries(player: PlayerId, entries: HashMap<String, ProgressEntry>) -> Self {
        Self { player, entries }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn entry(&self, path: &AdvancementPath) -> Option<&ProgressEntry> {
        self.entries.get(&path.to_string())
    }

    /// All entries keyed by dotted path
    pub fn entries(&self) -> &HashMap<String, ProgressEntry> {
        &self.entries
    }

    pub fn progress(&self, path: &AdvancementPath) -> u64 {
        self.entry(path).map_or(0, |e| e.progress)
    }

    pub fn is_completed(&self, path: &AdvancementPath) -> bool {
        self.entry(path).is_some_and(|e| e.completed)
    }

    /// Explicit activation only; tree-level auto activation is the caller's concern
    pub fn is_activated(&self, path: &AdvancementPath) -> bool {
        self.entry(path).is_some_and(|e| e.active)
    }

    /// Mark active. Returns false when it already was.
    pub fn activate(&mut self, path: &AdvancementPath) -> bool {
        let entry = self.entries.entry(path.to_string()).or_default();
        !std::mem::replace(&mut entry.active, true)
    }

    /// Add `delta` to the counter and return the new value.
    /// Completed entries are frozen.
    pub fn increment(&mut self, path: &AdvancementPath, delta: u64) -> u64 {
        let entry = self.entries.entry(path.to_string()).or_default();
        if !entry.completed {
            entry.progress = entry.progress.saturating_add(delta);
        }
        entry.progress
    }

    /// Mark completed, raising the counter to at least `amount`.
    /// Returns false when it already was completed.
    pub fn mark_completed(&mut self, path: &AdvancementPath, amount: u64) -> bool {
        let entry = self.entries.entry(path.to_string()).or_default();
        if entry.completed {
            return false;
        }
        entry.completed = true;
        entry.progress = entry.progress.max(amount);
        entry.completed_at = Some(Utc::now().timestamp_millis());
        true
    }
}
