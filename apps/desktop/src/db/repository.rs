//! Repository pattern for database access.

use crate::db::error::DbError;
use chrono::{DateTime, Utc};
use drill_core::{ExerciseKind, KeyValueStore, StoreError};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;

type Result<T> = std::result::Result<T, DbError>;

/// Repository for the completed-session log.
pub trait ActivityRepository {
    fn record_session(&self, entry: &SessionLogEntry) -> Result<i64>;
    fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionLogEntry>>;
    fn sessions_for_module(&self, module_id: &str) -> Result<usize>;
}

/// One finished module run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionLogEntry {
    pub module_id: String,
    pub exercise_kind: ExerciseKind,
    pub correct: u32,
    pub incorrect: u32,
    pub cards_studied: u32,
    pub completed_at: DateTime<Utc>,
}

/// SQLite-backed repository.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open or create database at path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(super::schema::SCHEMA)?;
        self.conn.execute_batch(super::schema::INIT_SCHEMA_VERSION)?;
        Ok(())
    }

    pub fn schema_version(&self) -> Result<i32> {
        let version = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
        Ok(version)
    }

    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn remove_value(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl KeyValueStore for SqliteRepository {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        self.get_value(key).map_err(Into::into)
    }

    fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        self.set_value(key, value).map_err(Into::into)
    }

    fn remove(&mut self, key: &str) -> std::result::Result<(), StoreError> {
        self.remove_value(key).map_err(Into::into)
    }
}

impl ActivityRepository for SqliteRepository {
    fn record_session(&self, entry: &SessionLogEntry) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO session_log (module_id, exercise_kind, correct, incorrect, cards_studied, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.module_id,
                entry.exercise_kind.as_str(),
                entry.correct,
                entry.incorrect,
                entry.cards_studied,
                entry.completed_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT module_id, exercise_kind, correct, incorrect, cards_studied, completed_at
             FROM session_log ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (module_id, kind, correct, incorrect, cards_studied, completed_at) = row?;
            let exercise_kind = ExerciseKind::from_str(&kind)
                .ok_or_else(|| DbError::InvalidData(format!("unknown exercise kind: {kind}")))?;
            let completed_at = DateTime::parse_from_rfc3339(&completed_at)
                .map_err(|e| DbError::InvalidData(e.to_string()))?
                .with_timezone(&Utc);
            entries.push(SessionLogEntry {
                module_id,
                exercise_kind,
                correct,
                incorrect,
                cards_studied,
                completed_at,
            });
        }
        Ok(entries)
    }

    fn sessions_for_module(&self, module_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM session_log WHERE module_id = ?1",
            params![module_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
