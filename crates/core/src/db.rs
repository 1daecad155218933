// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed local durable store.
//!
//! The [`Database`] struct is the only source of truth for device-local
//! workouts, their sets, and the mutation queue. Every write is committed
//! before the call returns. Failures are surfaced as-is; nothing here retries.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::error::{Error, Result};
use crate::queue::{
    EntityType, Mutation, QueueCounts, QueueEntry, QueueId, QueuePatch, QueueStatus,
};
use crate::workout::{
    EntityRef, LocalKey, SetFields, SetPatch, SetRecord, SyncStatus, Workout, WorkoutFields,
    WorkoutPatch,
};

/// SQL schema for the local store.
pub const SCHEMA: &str = r#"
-- In-flight and recent workouts. remote_id stays NULL until the remote confirms the create.
CREATE TABLE IF NOT EXISTS workouts (
    local_key INTEGER PRIMARY KEY AUTOINCREMENT,
    remote_id TEXT UNIQUE,
    owner_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'in_progress',
    ai_generated INTEGER NOT NULL DEFAULT 0,
    completion TEXT,             -- JSON-encoded completion feedback
    sync_status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Logged sets, owned by a workout
CREATE TABLE IF NOT EXISTS sets (
    local_key INTEGER PRIMARY KEY AUTOINCREMENT,
    remote_id TEXT UNIQUE,
    workout_key INTEGER NOT NULL,
    exercise_id TEXT NOT NULL,
    exercise_name TEXT NOT NULL,
    weight REAL,
    reps INTEGER NOT NULL,
    reps_in_reserve INTEGER NOT NULL DEFAULT 0,
    duration_secs INTEGER,
    notes TEXT,
    order_index INTEGER NOT NULL,
    FOREIGN KEY (workout_key) REFERENCES workouts(local_key) ON DELETE CASCADE
);

-- Write-ahead mutation queue, drained in id order
CREATE TABLE IF NOT EXISTS sync_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    operation TEXT NOT NULL,     -- create|update|delete
    entity_type TEXT NOT NULL,   -- workout|set
    entity_key INTEGER NOT NULL,
    remote_id TEXT,              -- NULL while the entity is temporary
    status TEXT NOT NULL DEFAULT 'pending',
    enqueued_at TEXT NOT NULL,
    retry_count INTEGER NOT NULL DEFAULT 0,
    last_error TEXT,
    payload TEXT NOT NULL        -- JSON-encoded Mutation
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_workouts_owner ON workouts(owner_id);
CREATE INDEX IF NOT EXISTS idx_sets_workout ON sets(workout_key);
CREATE INDEX IF NOT EXISTS idx_queue_status ON sync_queue(status);
CREATE INDEX IF NOT EXISTS idx_queue_entity ON sync_queue(entity_type, entity_key);
"#;

const WORKOUT_COLUMNS: &str = "local_key, remote_id, owner_id, name, description, date, status,
     ai_generated, completion, sync_status, created_at, updated_at";

const SET_COLUMNS: &str = "local_key, remote_id, workout_key, exercise_id, exercise_name,
     weight, reps, reps_in_reserve, duration_secs, notes, order_index";

const QUEUE_COLUMNS: &str = "id, operation, entity_type, entity_key, remote_id, status,
     enqueued_at, retry_count, last_error, payload";

fn corrupted(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(Error::CorruptedData(message)),
    )
}

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value
        .parse()
        .map_err(|_| corrupted(format!("invalid value '{value}' in column '{column}'")))
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupted(format!("invalid timestamp '{value}' in column '{column}'")))
}

/// Parse a JSON column into its typed value.
fn parse_json<T: serde::de::DeserializeOwned>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    serde_json::from_str(value)
        .map_err(|e| corrupted(format!("invalid JSON in column '{column}': {e}")))
}

fn workout_from_row(row: &Row<'_>) -> rusqlite::Result<Workout> {
    let local_key: LocalKey = row.get("local_key")?;
    let date: String = row.get("date")?;
    let status: String = row.get("status")?;
    let completion: Option<String> = row.get("completion")?;
    let sync_status: String = row.get("sync_status")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Workout {
        local_key,
        reference: EntityRef::from_columns(local_key, row.get("remote_id")?),
        fields: WorkoutFields {
            owner_id: row.get("owner_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            date: parse_db::<NaiveDate>(&date, "date")?,
            status: parse_db(&status, "status")?,
            ai_generated: row.get("ai_generated")?,
            completion: completion
                .map(|c| parse_json(&c, "completion"))
                .transpose()?,
        },
        sync_status: parse_db(&sync_status, "sync_status")?,
        created_at: parse_timestamp(&created_at, "created_at")?,
        updated_at: parse_timestamp(&updated_at, "updated_at")?,
    })
}

fn set_from_row(row: &Row<'_>) -> rusqlite::Result<SetRecord> {
    let local_key: LocalKey = row.get("local_key")?;
    Ok(SetRecord {
        local_key,
        reference: EntityRef::from_columns(local_key, row.get("remote_id")?),
        workout_key: row.get("workout_key")?,
        fields: SetFields {
            exercise_id: row.get("exercise_id")?,
            exercise_name: row.get("exercise_name")?,
            weight: row.get("weight")?,
            reps: row.get("reps")?,
            reps_in_reserve: row.get("reps_in_reserve")?,
            duration_secs: row.get("duration_secs")?,
            notes: row.get("notes")?,
            order_index: row.get("order_index")?,
        },
    })
}

fn queue_entry_from_row(row: &Row<'_>) -> rusqlite::Result<QueueEntry> {
    let entity_key: LocalKey = row.get("entity_key")?;
    let operation: String = row.get("operation")?;
    let entity_type: String = row.get("entity_type")?;
    let status: String = row.get("status")?;
    let enqueued_at: String = row.get("enqueued_at")?;
    let payload: String = row.get("payload")?;

    Ok(QueueEntry {
        id: row.get("id")?,
        operation: parse_db(&operation, "operation")?,
        entity_type: parse_db(&entity_type, "entity_type")?,
        entity_key,
        reference: EntityRef::from_columns(entity_key, row.get("remote_id")?),
        status: parse_db(&status, "status")?,
        enqueued_at: parse_timestamp(&enqueued_at, "enqueued_at")?,
        retry_count: row.get("retry_count")?,
        last_error: row.get("last_error")?,
        mutation: parse_json::<Mutation>(&payload, "payload")?,
    })
}

/// Parse the `local_<key>` form of a temporary identity.
fn parse_local_id(id: &str) -> Option<LocalKey> {
    id.strip_prefix("local_")?.parse().ok()
}

/// Run schema creation on a database connection.
///
/// Idempotent, so it is safe to call on every open.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// SQLite database connection with local store operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Foreign keys drive the set cascade; WAL + FULL sync make each commit durable
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Workouts
    // ─────────────────────────────────────────────────────────────────────

    /// Store a new workout.
    ///
    /// With `remote_id` the workout is already confirmed and `synced`;
    /// without it the workout gets a temporary identity and is `pending`.
    pub fn save_workout(&self, fields: &WorkoutFields, remote_id: Option<&str>) -> Result<Workout> {
        let now = Utc::now().to_rfc3339();
        let sync_status = if remote_id.is_some() {
            SyncStatus::Synced
        } else {
            SyncStatus::Pending
        };
        let completion = fields
            .completion
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            "INSERT INTO workouts (remote_id, owner_id, name, description, date, status,
             ai_generated, completion, sync_status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                remote_id,
                fields.owner_id,
                fields.name,
                fields.description,
                fields.date.to_string(),
                fields.status.as_str(),
                fields.ai_generated,
                completion,
                sync_status.as_str(),
                now,
            ],
        )?;

        self.get_workout(self.conn.last_insert_rowid())
    }

    /// Get a workout by local key, if it still exists.
    pub fn find_workout(&self, local_key: LocalKey) -> Result<Option<Workout>> {
        let sql = format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE local_key = ?1");
        let workout = self
            .conn
            .query_row(&sql, params![local_key], workout_from_row)
            .optional()?;
        Ok(workout)
    }

    /// Get a workout by local key.
    pub fn get_workout(&self, local_key: LocalKey) -> Result<Workout> {
        self.find_workout(local_key)?
            .ok_or_else(|| Error::WorkoutNotFound(EntityRef::Temporary(local_key).to_string()))
    }

    /// Look a workout up by its displayed identity: `local_<key>` or a remote id.
    pub fn resolve_workout(&self, id: &str) -> Result<Workout> {
        let found = match parse_local_id(id) {
            Some(local_key) => self.find_workout(local_key)?,
            None => {
                let sql = format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE remote_id = ?1");
                self.conn
                    .query_row(&sql, params![id], workout_from_row)
                    .optional()?
            }
        };
        found.ok_or_else(|| Error::WorkoutNotFound(id.to_string()))
    }

    /// List all workouts for an owner, newest first.
    pub fn list_workouts(&self, owner_id: &str) -> Result<Vec<Workout>> {
        let sql = format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE owner_id = ?1
             ORDER BY date DESC, local_key DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let workouts = stmt
            .query_map(params![owner_id], workout_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(workouts)
    }

    /// List workouts that are still in flight or not yet fully synced.
    pub fn list_active_workouts(&self, owner_id: &str) -> Result<Vec<Workout>> {
        Ok(self
            .list_workouts(owner_id)?
            .into_iter()
            .filter(Workout::is_active)
            .collect())
    }

    /// Apply a patch to a workout and mark it `pending`.
    pub fn update_workout(&self, local_key: LocalKey, patch: &WorkoutPatch) -> Result<Workout> {
        let mut workout = self.get_workout(local_key)?;
        patch.apply_to(&mut workout.fields);
        let fields = &workout.fields;
        let completion = fields
            .completion
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            "UPDATE workouts SET name = ?1, description = ?2, date = ?3, status = ?4,
             completion = ?5, sync_status = ?6, updated_at = ?7
             WHERE local_key = ?8",
            params![
                fields.name,
                fields.description,
                fields.date.to_string(),
                fields.status.as_str(),
                completion,
                SyncStatus::Pending.as_str(),
                Utc::now().to_rfc3339(),
                local_key,
            ],
        )?;

        self.get_workout(local_key)
    }

    /// Delete a workout. Its sets go with it through the foreign-key cascade.
    pub fn delete_workout(&self, local_key: LocalKey) -> Result<()> {
        let affected = self.conn.execute(
            "DELETE FROM workouts WHERE local_key = ?1",
            params![local_key],
        )?;
        if affected == 0 {
            return Err(Error::WorkoutNotFound(
                EntityRef::Temporary(local_key).to_string(),
            ));
        }
        Ok(())
    }

    /// Record the remote id assigned to a workout.
    ///
    /// Rewrites the workout and every queued entry that targets it, so that
    /// no later submission can carry the temporary identity. Returns false
    /// if the workout no longer exists locally.
    pub fn reconcile_workout(&mut self, local_key: LocalKey, remote_id: &str) -> Result<bool> {
        self.reconcile("workouts", EntityType::Workout, local_key, remote_id)
    }

    /// Set the sync status of a workout. Missing workouts are ignored.
    pub fn set_workout_sync_status(&self, local_key: LocalKey, status: SyncStatus) -> Result<()> {
        self.conn.execute(
            "UPDATE workouts SET sync_status = ?1 WHERE local_key = ?2",
            params![status.as_str(), local_key],
        )?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sets
    // ─────────────────────────────────────────────────────────────────────

    /// Store a new set under the given workout.
    pub fn save_set(
        &self,
        fields: &SetFields,
        workout_key: LocalKey,
        remote_id: Option<&str>,
    ) -> Result<SetRecord> {
        // Surface a missing parent as not-found rather than a constraint failure
        self.get_workout(workout_key)?;

        self.conn.execute(
            "INSERT INTO sets (remote_id, workout_key, exercise_id, exercise_name, weight,
             reps, reps_in_reserve, duration_secs, notes, order_index)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                remote_id,
                workout_key,
                fields.exercise_id,
                fields.exercise_name,
                fields.weight,
                fields.reps,
                fields.reps_in_reserve,
                fields.duration_secs,
                fields.notes,
                fields.order_index,
            ],
        )?;

        self.get_set(self.conn.last_insert_rowid())
    }

    /// Get a set by local key, if it still exists.
    pub fn find_set(&self, local_key: LocalKey) -> Result<Option<SetRecord>> {
        let sql = format!("SELECT {SET_COLUMNS} FROM sets WHERE local_key = ?1");
        let set = self
            .conn
            .query_row(&sql, params![local_key], set_from_row)
            .optional()?;
        Ok(set)
    }

    /// Get a set by local key.
    pub fn get_set(&self, local_key: LocalKey) -> Result<SetRecord> {
        self.find_set(local_key)?
            .ok_or_else(|| Error::SetNotFound(EntityRef::Temporary(local_key).to_string()))
    }

    /// Look a set up by its displayed identity: `local_<key>` or a remote id.
    pub fn resolve_set(&self, id: &str) -> Result<SetRecord> {
        let found = match parse_local_id(id) {
            Some(local_key) => self.find_set(local_key)?,
            None => {
                let sql = format!("SELECT {SET_COLUMNS} FROM sets WHERE remote_id = ?1");
                self.conn
                    .query_row(&sql, params![id], set_from_row)
                    .optional()?
            }
        };
        found.ok_or_else(|| Error::SetNotFound(id.to_string()))
    }

    /// List the sets of a workout in logging order.
    pub fn list_sets(&self, workout_key: LocalKey) -> Result<Vec<SetRecord>> {
        let sql = format!(
            "SELECT {SET_COLUMNS} FROM sets WHERE workout_key = ?1
             ORDER BY order_index, local_key"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let sets = stmt
            .query_map(params![workout_key], set_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sets)
    }

    /// The order index a newly logged set should take.
    pub fn next_set_order(&self, workout_key: LocalKey) -> Result<u32> {
        let next: u32 = self.conn.query_row(
            "SELECT COALESCE(MAX(order_index) + 1, 0) FROM sets WHERE workout_key = ?1",
            params![workout_key],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    /// Apply a patch to a set.
    pub fn update_set(&self, local_key: LocalKey, patch: &SetPatch) -> Result<SetRecord> {
        let mut set = self.get_set(local_key)?;
        patch.apply_to(&mut set.fields);
        let fields = &set.fields;

        self.conn.execute(
            "UPDATE sets SET weight = ?1, reps = ?2, reps_in_reserve = ?3,
             duration_secs = ?4, notes = ?5, order_index = ?6
             WHERE local_key = ?7",
            params![
                fields.weight,
                fields.reps,
                fields.reps_in_reserve,
                fields.duration_secs,
                fields.notes,
                fields.order_index,
                local_key,
            ],
        )?;

        self.get_set(local_key)
    }

    /// Delete a set.
    pub fn delete_set(&self, local_key: LocalKey) -> Result<()> {
        let affected = self
            .conn
            .execute("DELETE FROM sets WHERE local_key = ?1", params![local_key])?;
        if affected == 0 {
            return Err(Error::SetNotFound(EntityRef::Temporary(local_key).to_string()));
        }
        Ok(())
    }

    /// Record the remote id assigned to a set. See [`Database::reconcile_workout`].
    pub fn reconcile_set(&mut self, local_key: LocalKey, remote_id: &str) -> Result<bool> {
        self.reconcile("sets", EntityType::Set, local_key, remote_id)
    }

    fn reconcile(
        &mut self,
        table: &str,
        entity_type: EntityType,
        local_key: LocalKey,
        remote_id: &str,
    ) -> Result<bool> {
        let tx = self.conn.transaction()?;
        let sql = format!("UPDATE {table} SET remote_id = ?1 WHERE local_key = ?2");
        let affected = tx.execute(&sql, params![remote_id, local_key])?;
        if affected > 0 {
            tx.execute(
                "UPDATE sync_queue SET remote_id = ?1 WHERE entity_type = ?2 AND entity_key = ?3",
                params![remote_id, entity_type.as_str(), local_key],
            )?;
        }
        tx.commit()?;
        Ok(affected > 0)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutation queue
    // ─────────────────────────────────────────────────────────────────────

    /// Durably record a mutation for later delivery.
    pub fn enqueue(
        &self,
        entity_key: LocalKey,
        reference: &EntityRef,
        mutation: &Mutation,
    ) -> Result<QueueId> {
        let payload = serde_json::to_string(mutation)?;
        self.conn.execute(
            "INSERT INTO sync_queue (operation, entity_type, entity_key, remote_id, status,
             enqueued_at, retry_count, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
            params![
                mutation.operation().as_str(),
                mutation.entity_type().as_str(),
                entity_key,
                reference.confirmed_id(),
                QueueStatus::Pending.as_str(),
                Utc::now().to_rfc3339(),
                payload,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a queue entry by id.
    pub fn get_queue_entry(&self, id: QueueId) -> Result<QueueEntry> {
        let sql = format!("SELECT {QUEUE_COLUMNS} FROM sync_queue WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], queue_entry_from_row)
            .optional()?
            .ok_or(Error::QueueEntryNotFound(id))
    }

    /// List queue entries in enqueue order, optionally filtered by status.
    pub fn list_queue(&self, status: Option<QueueStatus>) -> Result<Vec<QueueEntry>> {
        let entries = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {QUEUE_COLUMNS} FROM sync_queue WHERE status = ?1 ORDER BY id"
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![status.as_str()], queue_entry_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let sql = format!("SELECT {QUEUE_COLUMNS} FROM sync_queue ORDER BY id");
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], queue_entry_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(entries)
    }

    /// Update the bookkeeping columns of a queue entry.
    pub fn update_queue_entry(&self, id: QueueId, patch: &QueuePatch) -> Result<()> {
        let mut entry = self.get_queue_entry(id)?;
        if let Some(status) = patch.status {
            entry.status = status;
        }
        if let Some(retry_count) = patch.retry_count {
            entry.retry_count = retry_count;
        }
        if let Some(ref last_error) = patch.last_error {
            entry.last_error = last_error.clone();
        }

        self.conn.execute(
            "UPDATE sync_queue SET status = ?1, retry_count = ?2, last_error = ?3 WHERE id = ?4",
            params![
                entry.status.as_str(),
                entry.retry_count,
                entry.last_error,
                id
            ],
        )?;
        Ok(())
    }

    /// Remove a queue entry (delivered or moot).
    pub fn remove_queue_entry(&self, id: QueueId) -> Result<()> {
        self.conn
            .execute("DELETE FROM sync_queue WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// True if any queue entry still targets the given entity.
    pub fn has_queued(&self, entity_type: EntityType, entity_key: LocalKey) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sync_queue WHERE entity_type = ?1 AND entity_key = ?2",
            params![entity_type.as_str(), entity_key],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// True if an entry of the entity is being delivered by a running drain.
    pub fn has_in_flight(&self, entity_type: EntityType, entity_key: LocalKey) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sync_queue
             WHERE entity_type = ?1 AND entity_key = ?2 AND status = ?3",
            params![
                entity_type.as_str(),
                entity_key,
                QueueStatus::Processing.as_str()
            ],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Drop the queued (not in-flight) entries of an entity that became moot.
    ///
    /// Returns the number of entries removed.
    pub fn discard_queued(&self, entity_type: EntityType, entity_key: LocalKey) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM sync_queue
             WHERE entity_type = ?1 AND entity_key = ?2 AND status != ?3",
            params![
                entity_type.as_str(),
                entity_key,
                QueueStatus::Processing.as_str()
            ],
        )?;
        Ok(removed)
    }

    /// Counters for the unsynced-changes banner.
    ///
    /// In-flight entries count as pending.
    pub fn queue_counts(&self) -> Result<QueueCounts> {
        let (pending, failed, total): (i64, i64, i64) = self.conn.query_row(
            "SELECT
                 COALESCE(SUM(CASE WHEN status IN ('pending', 'processing') THEN 1 ELSE 0 END), 0),
                 COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0),
                 COUNT(*)
             FROM sync_queue",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        Ok(QueueCounts {
            pending: pending as usize,
            failed: failed as usize,
            total: total as usize,
        })
    }

    /// Give terminally failed entries a fresh retry budget.
    ///
    /// This is the only way a `failed` entry is attempted again.
    pub fn reset_failed(&self) -> Result<usize> {
        let reset = self.conn.execute(
            "UPDATE sync_queue SET status = ?1, retry_count = 0, last_error = NULL
             WHERE status = ?2",
            params![QueueStatus::Pending.as_str(), QueueStatus::Failed.as_str()],
        )?;
        Ok(reset)
    }

    /// Return entries left `processing` by an interrupted run to `pending`.
    pub fn recover_interrupted(&self) -> Result<usize> {
        let recovered = self.conn.execute(
            "UPDATE sync_queue SET status = ?1 WHERE status = ?2",
            params![
                QueueStatus::Pending.as_str(),
                QueueStatus::Processing.as_str()
            ],
        )?;
        Ok(recovered)
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
