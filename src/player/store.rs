//! In-memory progress records with write-behind persistence

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{PlayerId, PlayerProgress, ProgressDb};
use crate::sync::{lock, read, write};

/// The player has no record in memory, so the update was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Progress of player {0} is not loaded")]
pub struct NotLoaded(pub PlayerId);

struct Slot {
    progress: PlayerProgress,
    /// Set once the record has left the map; updates must look it up again
    evicted: bool,
}

type Record = Arc<Mutex<Slot>>;

/// Owns the [`PlayerProgress`] of every joined player.
///
/// Each record sits behind its own mutex so updates for different players
/// never contend. Records enter the store through [`load`] and leave it
/// through [`unload`]; updates never touch the database, they only mark the
/// player dirty. [`flush`] writes the dirty records in one transaction.
///
/// Lock order: `saving`, then `players`, then a record, then `dirty`.
///
/// [`load`]: ProgressStore::load
/// [`unload`]: ProgressStore::unload
/// [`flush`]: ProgressStore::flush
pub struct ProgressStore {
    players: RwLock<HashMap<PlayerId, Record>>,
    dirty: Mutex<HashSet<PlayerId>>,
    /// Held from copying records until they are written, so an older copy
    /// never lands after a newer one
    saving: Mutex<()>,
    db: Option<ProgressDb>,
}

impl ProgressStore {
    pub fn new(db: ProgressDb) -> Self {
        Self::with_db(Some(db))
    }

    /// Store that keeps progress in memory only
    pub fn in_memory() -> Self {
        Self::with_db(None)
    }

    fn with_db(db: Option<ProgressDb>) -> Self {
        Self {
            players: RwLock::new(HashMap::new()),
            dirty: Mutex::new(HashSet::new()),
            saving: Mutex::new(()),
            db,
        }
    }

    /// Bring the player's record into memory. Returns false if it already was.
    pub fn load(&self, player: PlayerId) -> Result<bool> {
        // A quit that is still saving this player finishes before we read
        let _saving = lock(&self.saving);
        if self.is_loaded(player) {
            return Ok(false);
        }

        let progress = self.read_stored(player)?;
        write(&self.players).insert(
            player,
            Arc::new(Mutex::new(Slot {
                progress,
                evicted: false,
            })),
        );
        debug!("Loaded progress of player {}", player);
        Ok(true)
    }

    /// Run `f` on the player's record under its lock and mark it dirty.
    /// Players that are not loaded are rejected without touching the database.
    pub fn update<R>(
        &self,
        player: PlayerId,
        f: impl FnOnce(&mut PlayerProgress) -> R,
    ) -> Result<R, NotLoaded> {
        loop {
            let record = read(&self.players)
                .get(&player)
                .cloned()
                .ok_or(NotLoaded(player))?;
            let mut slot = lock(&record);
            if slot.evicted {
                continue;
            }
            let result = f(&mut slot.progress);
            // Still under the record lock, so an unload sees the mark
            lock(&self.dirty).insert(player);
            return Ok(result);
        }
    }

    /// Copy of the player's record. Players that are not loaded are read
    /// from the database without being cached.
    pub fn snapshot(&self, player: PlayerId) -> Result<PlayerProgress> {
        let record = read(&self.players).get(&player).cloned();
        match record {
            Some(record) => Ok(lock(&record).progress.clone()),
            None => self.read_stored(player),
        }
    }

    pub fn is_loaded(&self, player: PlayerId) -> bool {
        read(&self.players).contains_key(&player)
    }

    pub fn loaded_count(&self) -> usize {
        read(&self.players).len()
    }

    pub fn dirty_count(&self) -> usize {
        lock(&self.dirty).len()
    }

    /// Persist every dirty record. Returns how many players were written.
    pub fn flush(&self) -> Result<usize> {
        let _saving = lock(&self.saving);
        let records: Vec<(PlayerId, Record)> = {
            let players = read(&self.players);
            let ids: Vec<PlayerId> = lock(&self.dirty).drain().collect();
            ids.into_iter()
                .filter_map(|id| players.get(&id).map(|record| (id, record.clone())))
                .collect()
        };
        if records.is_empty() {
            return Ok(0);
        }
        let Some(db) = &self.db else {
            return Ok(0);
        };

        let progress: Vec<PlayerProgress> = records
            .iter()
            .map(|(_, record)| lock(record).progress.clone())
            .collect();
        if let Err(e) = db.save_players(&progress) {
            // Keep them dirty so the next flush retries
            lock(&self.dirty).extend(records.iter().map(|(id, _)| *id));
            return Err(e);
        }
        info!("Saved progress of {} players", progress.len());
        Ok(progress.len())
    }

    /// Take the player out of the store and persist the final record.
    /// Updates that race with this either land before the copy is taken or
    /// are rejected as [`NotLoaded`].
    pub fn unload(&self, player: PlayerId) -> Result<()> {
        let _saving = lock(&self.saving);
        let Some(record) = write(&self.players).remove(&player) else {
            return Ok(());
        };
        let (progress, was_dirty) = {
            let mut slot = lock(&record);
            slot.evicted = true;
            let was_dirty = lock(&self.dirty).remove(&player);
            (slot.progress.clone(), was_dirty)
        };
        debug!("Unloaded progress of player {}", player);

        let Some(db) = &self.db else {
            return Ok(());
        };
        if !was_dirty {
            return Ok(());
        }
        if let Err(e) = db.save_players(std::slice::from_ref(&progress)) {
            warn!("Keeping player {} loaded after a failed save", player);
            write(&self.players).insert(player, record.clone());
            let mut slot = lock(&record);
            slot.evicted = false;
            lock(&self.dirty).insert(player);
            return Err(e);
        }
        Ok(())
    }

    fn read_stored(&self, player: PlayerId) -> Result<PlayerProgress> {
        match &self.db {
            Some(db) => db.load_player(player),
            None => Ok(PlayerProgress::new(player)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advancement::AdvancementPath;
    use uuid::Uuid;

    fn stone() -> AdvancementPath {
        AdvancementPath::new("mining", "stone")
    }

    #[test]
    fn test_update_marks_dirty_and_flush_persists() {
        let db = ProgressDb::open_in_memory().unwrap();
        let store = ProgressStore::new(db.clone());
        let id = Uuid::new_v4();

        assert!(store.load(id).unwrap());
        assert!(!store.load(id).unwrap());
        store.update(id, |p| p.increment(&stone(), 3)).unwrap();
        assert_eq!(store.dirty_count(), 1);
        assert_eq!(store.flush().unwrap(), 1);
        assert_eq!(store.dirty_count(), 0);
        assert_eq!(store.flush().unwrap(), 0);

        assert_eq!(db.load_player(id).unwrap().progress(&stone()), 3);
    }

    #[test]
    fn test_unload_and_reload() {
        let db = ProgressDb::open_in_memory().unwrap();
        let store = ProgressStore::new(db);
        let id = Uuid::new_v4();

        store.load(id).unwrap();
        store.update(id, |p| p.increment(&stone(), 4)).unwrap();
        store.unload(id).unwrap();
        assert!(!store.is_loaded(id));
        assert_eq!(store.dirty_count(), 0);

        // Reading an unloaded player does not cache it
        assert_eq!(store.snapshot(id).unwrap().progress(&stone()), 4);
        assert!(!store.is_loaded(id));

        store.load(id).unwrap();
        assert_eq!(store.snapshot(id).unwrap().progress(&stone()), 4);
    }

    #[test]
    fn test_update_of_unloaded_player_is_rejected() {
        let db = ProgressDb::open_in_memory().unwrap();
        let store = ProgressStore::new(db.clone());
        let id = Uuid::new_v4();

        store.load(id).unwrap();
        store.update(id, |p| p.increment(&stone(), 2)).unwrap();
        store.unload(id).unwrap();

        assert_eq!(
            store.update(id, |p| p.increment(&stone(), 5)).unwrap_err(),
            NotLoaded(id)
        );
        assert_eq!(store.loaded_count(), 0);
        assert_eq!(store.dirty_count(), 0);
        assert_eq!(db.load_player(id).unwrap().progress(&stone()), 2);
    }

    #[test]
    fn test_in_memory_store() {
        let store = ProgressStore::in_memory();
        let id = Uuid::new_v4();

        store.load(id).unwrap();
        store.update(id, |p| p.increment(&stone(), 1)).unwrap();
        assert_eq!(store.flush().unwrap(), 0);
        assert_eq!(store.snapshot(id).unwrap().progress(&stone()), 1);
    }
}
