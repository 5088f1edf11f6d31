//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The simulation never needs a store; hosts use it to keep save slots
//! and the event log between runs.

use crate::{
    error::SimResult,
    event::EventLogEntry,
    save::GameSave,
    types::{RealTime, SessionId},
};
use rusqlite::{params, Connection, OptionalExtension};

/// A save as read back from a slot.
#[derive(Debug, Clone)]
pub struct StoredSave {
    pub id:         i64,
    pub session_id: SessionId,
    pub saved_at:   RealTime,
    pub save:       GameSave,
}

pub struct SaveStore {
    conn: Connection,
}

impl SaveStore {
    /// Open (or create) the save database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Session ────────────────────────────────────────────────

    pub fn insert_session(&self, session_id: &str, version: &str, started_at: RealTime) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO session (session_id, version, started_at) VALUES (?1, ?2, ?3)",
            params![session_id, version, started_at],
        )?;
        Ok(())
    }

    // ── Save slots ─────────────────────────────────────────────

    /// Append a save to `slot`. Older saves are kept; the latest wins on load.
    pub fn save_game(&self, slot: &str, session_id: &str, save: &GameSave) -> SimResult<i64> {
        let json = save.to_json()?;
        self.conn.execute(
            "INSERT INTO save_slot (slot, session_id, game_time, saved_at, state_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![slot, session_id, save.time.time, save.time.last_update, json],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn latest_save(&self, slot: &str) -> SimResult<Option<StoredSave>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, session_id, saved_at, state_json FROM save_slot
                 WHERE slot = ?1 ORDER BY id DESC LIMIT 1",
                params![slot],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, session_id, saved_at, json)) => Ok(Some(StoredSave {
                id,
                session_id,
                saved_at,
                save: GameSave::from_json(&json)?,
            })),
            None => Ok(None),
        }
    }

    pub fn save_count(&self, slot: &str) -> SimResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM save_slot WHERE slot = ?1",
            params![slot],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (session_id, game_time, event_type, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![entry.session_id, entry.game_time, entry.event_type, entry.payload],
        )?;
        Ok(())
    }

    pub fn events_for_session(&self, session_id: &str) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, game_time, event_type, payload
             FROM event_log WHERE session_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![session_id], |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    session_id: row.get(1)?,
                    game_time:  row.get(2)?,
                    event_type: row.get(3)?,
                    payload:    row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
