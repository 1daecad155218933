// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity-aware routing of workout and set mutations.
//!
//! Each mutation is tried against the remote service when that can be done
//! safely, and otherwise applied locally and queued for the
//! [`SyncProcessor`](super::SyncProcessor). The caller always gets the
//! resulting record back immediately.

use std::sync::Arc;

use lift_core::{
    Completion, Database, EntityRef, EntityType, LocalKey, Mutation, QueueCounts, SetFields,
    SetPatch, SetRecord, SyncStatus, Workout, WorkoutFields, WorkoutPatch,
};
use tokio::sync::Mutex;

use super::classify::{classify, ErrorClass};
use super::connectivity::Connectivity;
use super::remote::{Remote, RemoteError};
use crate::error::{Error, Result};

/// Routes mutations to the remote service or the offline path.
pub struct Dispatcher {
    db: Arc<Mutex<Database>>,
    remote: Option<Arc<dyn Remote>>,
    connectivity: Arc<dyn Connectivity>,
}

impl Dispatcher {
    pub fn new(
        db: Arc<Mutex<Database>>,
        remote: Option<Arc<dyn Remote>>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Dispatcher {
            db,
            remote,
            connectivity,
        }
    }

    /// The remote, if the signal says it is reachable.
    fn reachable_remote(&self) -> Option<Arc<dyn Remote>> {
        if self.connectivity.is_online() {
            self.remote.clone()
        } else {
            None
        }
    }

    /// Decide whether a failed remote call falls back to the offline path.
    ///
    /// Application-class failures are returned to the caller.
    fn absorb(&self, err: RemoteError, what: &str) -> Result<()> {
        if classify(&err) == ErrorClass::Connectivity || !self.connectivity.is_online() {
            tracing::warn!(error = %err, "{} failed remotely, continuing offline", what);
            Ok(())
        } else {
            tracing::debug!(error = %err, "{} rejected", what);
            Err(Error::Rejected(err))
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Workouts
    // ─────────────────────────────────────────────────────────────────────

    /// Start a new workout.
    pub async fn create_workout(&self, fields: WorkoutFields) -> Result<Workout> {
        fields.validate()?;

        if let Some(remote) = self.reachable_remote() {
            match remote.create_workout(fields.clone()).await {
                Ok(confirmed) => {
                    let db = self.db.lock().await;
                    let workout = db.save_workout(&confirmed.record, Some(&confirmed.id))?;
                    tracing::info!(id = %workout.reference, "workout created");
                    return Ok(workout);
                }
                Err(e) => self.absorb(e, "create workout")?,
            }
        }

        let db = self.db.lock().await;
        let tx = db.conn.unchecked_transaction().map_err(lift_core::Error::from)?;
        let workout = db.save_workout(&fields, None)?;
        db.enqueue(
            workout.local_key,
            &workout.reference,
            &Mutation::CreateWorkout { fields },
        )?;
        tx.commit().map_err(lift_core::Error::from)?;
        tracing::info!(id = %workout.reference, "workout stored offline");
        Ok(workout)
    }

    /// Apply a partial update to a workout.
    pub async fn update_workout(&self, local_key: LocalKey, patch: WorkoutPatch) -> Result<Workout> {
        if patch.is_empty() {
            return Err(Error::EmptyPatch);
        }
        if let Some(ref name) = patch.name {
            if name.trim().is_empty() {
                return Err(Error::InvalidInput("workout name cannot be empty".to_string()));
            }
        }

        let (reference, backlog) = {
            let db = self.db.lock().await;
            let workout = db.get_workout(local_key)?;
            let backlog = db.has_queued(EntityType::Workout, local_key)?;
            (workout.reference, backlog)
        };

        if let (Some(remote), Some(id), false) =
            (self.reachable_remote(), reference.confirmed_id(), backlog)
        {
            match remote.update_workout(id.to_string(), patch.clone()).await {
                Ok(()) => {
                    let db = self.db.lock().await;
                    db.update_workout(local_key, &patch)?;
                    db.set_workout_sync_status(local_key, SyncStatus::Synced)?;
                    return Ok(db.get_workout(local_key)?);
                }
                Err(e) => self.absorb(e, "update workout")?,
            }
        }

        let db = self.db.lock().await;
        let tx = db.conn.unchecked_transaction().map_err(lift_core::Error::from)?;
        let workout = db.update_workout(local_key, &patch)?;
        db.enqueue(
            local_key,
            &workout.reference,
            &Mutation::UpdateWorkout { patch },
        )?;
        tx.commit().map_err(lift_core::Error::from)?;
        tracing::debug!(id = %workout.reference, "workout update queued");
        Ok(workout)
    }

    /// Finish a workout with the given feedback.
    pub async fn complete_workout(
        &self,
        local_key: LocalKey,
        completion: Completion,
    ) -> Result<Workout> {
        self.update_workout(local_key, WorkoutPatch::complete(completion))
            .await
    }

    /// Delete a workout and its sets.
    ///
    /// A workout the remote never confirmed is removed locally together
    /// with everything queued for it, and the remote is never contacted.
    pub async fn delete_workout(&self, local_key: LocalKey) -> Result<()> {
        let (reference, set_keys, in_flight) = {
            let db = self.db.lock().await;
            let workout = db.get_workout(local_key)?;
            let set_keys: Vec<LocalKey> = db
                .list_sets(local_key)?
                .iter()
                .map(|s| s.local_key)
                .collect();

            if let EntityRef::Temporary(_) = workout.reference {
                let tx = db.conn.unchecked_transaction().map_err(lift_core::Error::from)?;
                db.delete_workout(local_key)?;
                let discarded = discard_workout_backlog(&db, local_key, &set_keys)?;
                tx.commit().map_err(lift_core::Error::from)?;
                tracing::info!(
                    id = %workout.reference,
                    discarded,
                    "unsynced workout deleted locally"
                );
                return Ok(());
            }

            let in_flight = db.has_in_flight(EntityType::Workout, local_key)?;
            (workout.reference, set_keys, in_flight)
        };

        if let (Some(remote), Some(id), false) =
            (self.reachable_remote(), reference.confirmed_id(), in_flight)
        {
            match remote.delete_workout(id.to_string()).await {
                Ok(()) => {
                    let db = self.db.lock().await;
                    let tx = db.conn.unchecked_transaction().map_err(lift_core::Error::from)?;
                    discard_workout_backlog(&db, local_key, &set_keys)?;
                    db.delete_workout(local_key)?;
                    tx.commit().map_err(lift_core::Error::from)?;
                    tracing::info!(id = %reference, "workout deleted");
                    return Ok(());
                }
                Err(e) => self.absorb(e, "delete workout")?,
            }
        }

        // Queued updates for a deleted workout are moot, but only once the
        // delete itself is certain to reach the remote
        let db = self.db.lock().await;
        let tx = db.conn.unchecked_transaction().map_err(lift_core::Error::from)?;
        discard_workout_backlog(&db, local_key, &set_keys)?;
        db.enqueue(local_key, &reference, &Mutation::DeleteWorkout)?;
        db.delete_workout(local_key)?;
        tx.commit().map_err(lift_core::Error::from)?;
        tracing::debug!(id = %reference, "workout delete queued");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sets
    // ─────────────────────────────────────────────────────────────────────

    /// Log a set under a workout.
    pub async fn add_set(&self, workout_key: LocalKey, fields: SetFields) -> Result<SetRecord> {
        fields.validate()?;

        let parent = {
            let db = self.db.lock().await;
            db.get_workout(workout_key)?.reference
        };

        // A set can only be created remotely under a confirmed parent
        if let (Some(remote), Some(parent_id)) = (self.reachable_remote(), parent.confirmed_id()) {
            match remote.create_set(parent_id.to_string(), fields.clone()).await {
                Ok(confirmed) => {
                    let db = self.db.lock().await;
                    let set = db.save_set(&confirmed.record, workout_key, Some(&confirmed.id))?;
                    tracing::info!(id = %set.reference, workout = %parent, "set created");
                    return Ok(set);
                }
                Err(e) => self.absorb(e, "create set")?,
            }
        }

        let db = self.db.lock().await;
        let tx = db.conn.unchecked_transaction().map_err(lift_core::Error::from)?;
        let set = db.save_set(&fields, workout_key, None)?;
        db.enqueue(
            set.local_key,
            &set.reference,
            &Mutation::CreateSet {
                workout_key,
                fields,
            },
        )?;
        tx.commit().map_err(lift_core::Error::from)?;
        tracing::debug!(id = %set.reference, workout = %parent, "set stored offline");
        Ok(set)
    }

    /// Apply a partial update to a set.
    pub async fn update_set(&self, local_key: LocalKey, patch: SetPatch) -> Result<SetRecord> {
        if patch.is_empty() {
            return Err(Error::EmptyPatch);
        }

        let (reference, backlog) = {
            let db = self.db.lock().await;
            let set = db.get_set(local_key)?;
            let mut patched = set.fields.clone();
            patch.apply_to(&mut patched);
            patched.validate()?;
            (set.reference, db.has_queued(EntityType::Set, local_key)?)
        };

        if let (Some(remote), Some(id), false) =
            (self.reachable_remote(), reference.confirmed_id(), backlog)
        {
            match remote.update_set(id.to_string(), patch.clone()).await {
                Ok(()) => {
                    let db = self.db.lock().await;
                    return Ok(db.update_set(local_key, &patch)?);
                }
                Err(e) => self.absorb(e, "update set")?,
            }
        }

        let db = self.db.lock().await;
        let tx = db.conn.unchecked_transaction().map_err(lift_core::Error::from)?;
        let set = db.update_set(local_key, &patch)?;
        db.enqueue(local_key, &set.reference, &Mutation::UpdateSet { patch })?;
        tx.commit().map_err(lift_core::Error::from)?;
        tracing::debug!(id = %set.reference, "set update queued");
        Ok(set)
    }

    /// Delete a set.
    pub async fn delete_set(&self, local_key: LocalKey) -> Result<()> {
        let (reference, in_flight) = {
            let db = self.db.lock().await;
            let set = db.get_set(local_key)?;

            if let EntityRef::Temporary(_) = set.reference {
                db.delete_set(local_key)?;
                let discarded = db.discard_queued(EntityType::Set, local_key)?;
                tracing::info!(id = %set.reference, discarded, "unsynced set deleted locally");
                return Ok(());
            }

            (set.reference, db.has_in_flight(EntityType::Set, local_key)?)
        };

        if let (Some(remote), Some(id), false) =
            (self.reachable_remote(), reference.confirmed_id(), in_flight)
        {
            match remote.delete_set(id.to_string()).await {
                Ok(()) => {
                    let db = self.db.lock().await;
                    let tx = db.conn.unchecked_transaction().map_err(lift_core::Error::from)?;
                    db.discard_queued(EntityType::Set, local_key)?;
                    db.delete_set(local_key)?;
                    tx.commit().map_err(lift_core::Error::from)?;
                    tracing::info!(id = %reference, "set deleted");
                    return Ok(());
                }
                Err(e) => self.absorb(e, "delete set")?,
            }
        }

        let db = self.db.lock().await;
        let tx = db.conn.unchecked_transaction().map_err(lift_core::Error::from)?;
        db.discard_queued(EntityType::Set, local_key)?;
        db.enqueue(local_key, &reference, &Mutation::DeleteSet)?;
        db.delete_set(local_key)?;
        tx.commit().map_err(lift_core::Error::from)?;
        tracing::debug!(id = %reference, "set delete queued");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Observability
    // ─────────────────────────────────────────────────────────────────────

    /// Counts of mutations not yet confirmed by the remote.
    pub async fn queue_status(&self) -> Result<QueueCounts> {
        Ok(self.db.lock().await.queue_counts()?)
    }
}

/// Drop the queued entries of a workout and of its sets.
fn discard_workout_backlog(
    db: &Database,
    local_key: LocalKey,
    set_keys: &[LocalKey],
) -> Result<usize> {
    let mut discarded = db.discard_queued(EntityType::Workout, local_key)?;
    for &key in set_keys {
        discarded += db.discard_queued(EntityType::Set, key)?;
    }
    Ok(discarded)
}
