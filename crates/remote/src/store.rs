// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical SQLite storage for the hosted backend.
//!
//! Records are stored as JSON documents keyed by integer ids, exposed to
//! clients as `wo-<n>` and `set-<n>`.

use std::path::Path;

use lift_core::{SetFields, SetPatch, WorkoutFields, WorkoutPatch};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS workouts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id TEXT NOT NULL,
    fields TEXT NOT NULL          -- JSON-encoded WorkoutFields
);

CREATE TABLE IF NOT EXISTS sets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    workout_id INTEGER NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
    fields TEXT NOT NULL          -- JSON-encoded SetFields
);

CREATE INDEX IF NOT EXISTS idx_workouts_owner ON workouts(owner_id);
CREATE INDEX IF NOT EXISTS idx_sets_workout ON sets(workout_id);
"#;

const WORKOUT_PREFIX: &str = "wo-";
const SET_PREFIX: &str = "set-";

#[derive(Debug, Error)]
pub enum StoreError {
    /// The request is invalid; the client must not retry it.
    #[error("{0}")]
    Rejected(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

fn rejected(err: lift_core::Error) -> StoreError {
    StoreError::Rejected(err.to_string())
}

/// Parse `wo-<n>` / `set-<n>` into the row id.
fn parse_id(id: &str, prefix: &str, kind: &str) -> Result<i64> {
    id.strip_prefix(prefix)
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| StoreError::Rejected(format!("unknown {}: {}", kind, id)))
}

pub struct RemoteStore {
    conn: Connection,
}

impl RemoteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(RemoteStore { conn })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Workouts
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_workout(&self, fields: &WorkoutFields) -> Result<String> {
        fields.validate().map_err(rejected)?;
        self.conn.execute(
            "INSERT INTO workouts (owner_id, fields) VALUES (?1, ?2)",
            params![fields.owner_id, serde_json::to_string(fields)?],
        )?;
        Ok(format!("{}{}", WORKOUT_PREFIX, self.conn.last_insert_rowid()))
    }

    pub fn get_workout(&self, id: &str) -> Result<Option<WorkoutFields>> {
        let Ok(key) = parse_id(id, WORKOUT_PREFIX, "workout") else {
            return Ok(None);
        };
        self.load_workout(key)
    }

    fn load_workout(&self, key: i64) -> Result<Option<WorkoutFields>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT fields FROM workouts WHERE id = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(json.map(|j| serde_json::from_str(&j)).transpose()?)
    }

    pub fn update_workout(&self, id: &str, patch: &WorkoutPatch) -> Result<()> {
        let key = parse_id(id, WORKOUT_PREFIX, "workout")?;
        let mut fields = self
            .load_workout(key)?
            .ok_or_else(|| StoreError::Rejected(format!("unknown workout: {}", id)))?;
        patch.apply_to(&mut fields);
        fields.validate().map_err(rejected)?;
        self.conn.execute(
            "UPDATE workouts SET fields = ?1 WHERE id = ?2",
            params![serde_json::to_string(&fields)?, key],
        )?;
        Ok(())
    }

    /// Delete a workout and, by cascade, its sets.
    pub fn delete_workout(&self, id: &str) -> Result<()> {
        let key = parse_id(id, WORKOUT_PREFIX, "workout")?;
        let affected = self
            .conn
            .execute("DELETE FROM workouts WHERE id = ?1", params![key])?;
        if affected == 0 {
            return Err(StoreError::Rejected(format!("unknown workout: {}", id)));
        }
        Ok(())
    }

    pub fn workout_count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM workouts", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sets
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_set(&self, workout_id: &str, fields: &SetFields) -> Result<String> {
        let workout_key = parse_id(workout_id, WORKOUT_PREFIX, "workout")?;
        if self.load_workout(workout_key)?.is_none() {
            return Err(StoreError::Rejected(format!(
                "unknown workout: {}",
                workout_id
            )));
        }
        fields.validate().map_err(rejected)?;
        self.conn.execute(
            "INSERT INTO sets (workout_id, fields) VALUES (?1, ?2)",
            params![workout_key, serde_json::to_string(fields)?],
        )?;
        Ok(format!("{}{}", SET_PREFIX, self.conn.last_insert_rowid()))
    }

    /// The parent workout id and fields of a set.
    pub fn get_set(&self, id: &str) -> Result<Option<(String, SetFields)>> {
        let Ok(key) = parse_id(id, SET_PREFIX, "set") else {
            return Ok(None);
        };
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT workout_id, fields FROM sets WHERE id = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        match row {
            Some((workout_key, json)) => Ok(Some((
                format!("{}{}", WORKOUT_PREFIX, workout_key),
                serde_json::from_str(&json)?,
            ))),
            None => Ok(None),
        }
    }

    pub fn update_set(&self, id: &str, patch: &SetPatch) -> Result<()> {
        let key = parse_id(id, SET_PREFIX, "set")?;
        let (_, mut fields) = self
            .get_set(id)?
            .ok_or_else(|| StoreError::Rejected(format!("unknown set: {}", id)))?;
        patch.apply_to(&mut fields);
        fields.validate().map_err(rejected)?;
        self.conn.execute(
            "UPDATE sets SET fields = ?1 WHERE id = ?2",
            params![serde_json::to_string(&fields)?, key],
        )?;
        Ok(())
    }

    pub fn delete_set(&self, id: &str) -> Result<()> {
        let key = parse_id(id, SET_PREFIX, "set")?;
        let affected = self
            .conn
            .execute("DELETE FROM sets WHERE id = ?1", params![key])?;
        if affected == 0 {
            return Err(StoreError::Rejected(format!("unknown set: {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
