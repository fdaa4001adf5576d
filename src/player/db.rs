//! SQLite persistence for player progress
//!
//! One row per (player, advancement path). Schema changes go through the
//! `schema_version` table.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::{PlayerId, PlayerProgress, ProgressEntry};
use crate::sync::lock;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS advancement_progress (
    player TEXT NOT NULL,
    path TEXT NOT NULL,
    progress INTEGER NOT NULL DEFAULT 0,
    completed INTEGER NOT NULL DEFAULT 0,
    active INTEGER NOT NULL DEFAULT 0,
    completed_at INTEGER,
    PRIMARY KEY (player, path)
);
CREATE INDEX IF NOT EXISTS idx_progress_player ON advancement_progress(player);
"#;

const SCHEMA_VERSION: i32 = 1;

/// Database wrapper, cheap to clone
#[derive(Clone)]
pub struct ProgressDb {
    conn: Arc<Mutex<Connection>>,
}

impl ProgressDb {
    /// Open or create the progress database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open progress db: {}", path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::with_connection(conn)
    }

    /// Private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory progress db")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        lock(&self.conn)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;

        let version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |r| r.get(0),
            )
            .unwrap_or(0);
        if version < SCHEMA_VERSION {
            conn.execute(
                "INSERT OR REPLACE INTO schema_version VALUES (?1)",
                [SCHEMA_VERSION],
            )?;
        }
        Ok(())
    }

    /// Load one player's record. Unknown players get an empty record.
    pub fn load_player(&self, player: PlayerId) -> Result<PlayerProgress> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT path, progress, completed, active, completed_at
             FROM advancement_progress WHERE player = ?1",
        )?;
        let rows = stmt.query_map([player.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                ProgressEntry {
                    progress: row.get::<_, i64>(1)?.max(0) as u64,
                    completed: row.get::<_, i64>(2)? != 0,
                    active: row.get::<_, i64>(3)? != 0,
                    completed_at: row.get::<_, Option<i64>>(4)?,
                },
            ))
        })?;

        let mut entries = HashMap::new();
        for row in rows {
            let (path, entry) = row?;
            entries.insert(path, entry);
        }
        Ok(PlayerProgress::from_entries(player, entries))
    }

    /// Upsert every entry of the given records in one transaction
    pub fn save_players(&self, players: &[PlayerProgress]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO advancement_progress
                   (player, path, progress, completed, active, completed_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                   ON CONFLICT(player, path) DO UPDATE SET
                       progress = ?3, completed = ?4, active = ?5, completed_at = ?6"#,
            )?;
            for player in players {
                let id = player.player().to_string();
                for (path, entry) in player.entries() {
                    stmt.execute(rusqlite::params![
                        id,
                        path,
                        entry.progress.min(i64::MAX as u64) as i64,
                        entry.completed as i32,
                        entry.active as i32,
                        entry.completed_at,
                    ])?;
                }
            }
        }
        tx.commit().context("Failed to commit player progress")?;
        Ok(())
    }

    /// Number of stored rows for a player
    pub fn entry_count(&self, player: PlayerId) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM advancement_progress WHERE player = ?1",
            [player.to_string()],
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }
}
