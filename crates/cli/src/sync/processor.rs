// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Drains the mutation queue against the remote service.
//!
//! A run walks eligible entries in enqueue order. Each entry is replayed
//! from the current local state, so a create always submits the latest
//! values and an entry whose target is gone becomes a no-op. Identities
//! assigned by the remote are written back to the store before the next
//! entry is looked at, so no later submission carries a temporary id.
//!
//! Runs are serialized: [`SyncProcessor::run`] waits for an in-flight run,
//! [`SyncProcessor::try_run`] skips instead.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use lift_core::{
    Database, EntityRef, EntityType, LocalKey, Mutation, QueueEntry, QueuePatch, QueueStatus,
    SyncStatus, MAX_RETRIES,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::connectivity::Connectivity;
use super::remote::{Remote, RemoteError};

/// Outcome counters of one processor run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Entries delivered or found moot, and removed.
    pub succeeded: usize,
    /// Set creates waiting for their parent workout to be confirmed.
    pub deferred: usize,
    /// Entries that failed and will be tried again.
    pub retrying: usize,
    /// Entries that used their last retry in this run.
    pub permanently_failed: usize,
}

impl SyncReport {
    /// True if the run touched no entries.
    pub fn is_empty(&self) -> bool {
        *self == SyncReport::default()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} synced, {} deferred, {} retrying, {} failed",
            self.succeeded, self.deferred, self.retrying, self.permanently_failed
        )
    }
}

/// How an entry was settled without a remote failure.
#[derive(Debug)]
enum Delivery {
    /// The remote accepted the mutation.
    Delivered,
    /// Nothing needed to be sent.
    Moot(&'static str),
    /// The entry has to wait for another entry to succeed first.
    Deferred,
}

/// Why an entry could not be delivered.
#[derive(Debug)]
enum Failure {
    Remote(RemoteError),
    Storage(lift_core::Error),
}

impl From<RemoteError> for Failure {
    fn from(e: RemoteError) -> Self {
        Failure::Remote(e)
    }
}

impl From<lift_core::Error> for Failure {
    fn from(e: lift_core::Error) -> Self {
        Failure::Storage(e)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Remote(e) => write!(f, "{}", e),
            Failure::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

/// Prefer the identity on the local row; it is rewritten on reconciliation.
fn current_reference(local: Option<EntityRef>, recorded: &EntityRef) -> EntityRef {
    local.unwrap_or_else(|| recorded.clone())
}

/// Replays queued mutations against the remote service.
pub struct SyncProcessor {
    db: Arc<Mutex<Database>>,
    remote: Arc<dyn Remote>,
    connectivity: Arc<dyn Connectivity>,
    run_guard: Mutex<()>,
}

impl SyncProcessor {
    pub fn new(
        db: Arc<Mutex<Database>>,
        remote: Arc<dyn Remote>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        SyncProcessor {
            db,
            remote,
            connectivity,
            run_guard: Mutex::new(()),
        }
    }

    /// Drain the queue, waiting for any in-flight run to finish first.
    pub async fn run(&self) -> SyncReport {
        let _guard = self.run_guard.lock().await;
        self.drain().await
    }

    /// Drain the queue unless a run is already in flight.
    pub async fn try_run(&self) -> Option<SyncReport> {
        let _guard = self.run_guard.try_lock().ok()?;
        Some(self.drain().await)
    }

    /// Drain the queue every `period` while the signal is positive.
    pub fn spawn_periodic(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !self.connectivity.is_online() {
                    continue;
                }
                match self.try_run().await {
                    Some(report) if !report.is_empty() => {
                        tracing::info!(%report, "periodic sync");
                    }
                    Some(_) => {}
                    None => tracing::debug!("sync already running, skipping tick"),
                }
            }
        })
    }

    async fn drain(&self) -> SyncReport {
        let mut report = SyncReport::default();

        if !self.connectivity.is_online() {
            tracing::debug!("offline, skipping sync run");
            return report;
        }

        let entries = {
            let db = self.db.lock().await;
            match db.recover_interrupted() {
                Ok(0) => {}
                Ok(n) => tracing::warn!(count = n, "recovered interrupted queue entries"),
                Err(e) => tracing::error!(error = %e, "failed to recover interrupted entries"),
            }
            match db.list_queue(None) {
                Ok(entries) => entries
                    .into_iter()
                    .filter(QueueEntry::is_eligible)
                    .collect::<Vec<_>>(),
                Err(e) => {
                    tracing::error!(error = %e, "failed to read sync queue");
                    return report;
                }
            }
        };

        for entry in entries {
            if !self.connectivity.is_online() {
                tracing::info!("connectivity lost, stopping sync run");
                break;
            }
            self.process(entry, &mut report).await;
        }

        if !report.is_empty() {
            tracing::info!(%report, "sync run finished");
        }
        report
    }

    async fn process(&self, entry: QueueEntry, report: &mut SyncReport) {
        {
            let db = self.db.lock().await;
            match db.update_queue_entry(entry.id, &QueuePatch::status(QueueStatus::Processing)) {
                Ok(()) => {}
                // Discarded since the run started
                Err(lift_core::Error::QueueEntryNotFound(_)) => return,
                Err(e) => {
                    tracing::error!(entry = entry.id, error = %e, "failed to claim queue entry");
                    return;
                }
            }
        }

        tracing::debug!(
            entry = entry.id,
            operation = %entry.operation,
            entity = %entry.entity_type,
            id = %entry.reference,
            "processing queue entry"
        );
        let outcome = self.deliver(&entry).await;

        let db = self.db.lock().await;
        let settled = match outcome {
            Ok(Delivery::Delivered) => {
                report.succeeded += 1;
                self.settle_success(&db, &entry)
            }
            Ok(Delivery::Moot(reason)) => {
                tracing::debug!(entry = entry.id, reason, "nothing to send, dropping entry");
                report.succeeded += 1;
                self.settle_success(&db, &entry)
            }
            Ok(Delivery::Deferred) => {
                tracing::debug!(entry = entry.id, "parent workout not confirmed yet, deferring");
                report.deferred += 1;
                db.update_queue_entry(entry.id, &QueuePatch::status(QueueStatus::Pending))
            }
            Err(failure) => self.settle_failure(&db, &entry, failure, report),
        };

        if let Err(e) = settled {
            tracing::error!(entry = entry.id, error = %e, "failed to record sync outcome");
        }
    }

    fn settle_success(&self, db: &Database, entry: &QueueEntry) -> lift_core::Result<()> {
        // Resolve before removal: the entry may be the set's last trace
        let owner = owning_workout(db, entry)?;
        db.remove_queue_entry(entry.id)?;
        if let Some(workout_key) = owner {
            if !has_workout_backlog(db, workout_key)? {
                db.set_workout_sync_status(workout_key, SyncStatus::Synced)?;
            }
        }
        Ok(())
    }

    fn settle_failure(
        &self,
        db: &Database,
        entry: &QueueEntry,
        failure: Failure,
        report: &mut SyncReport,
    ) -> lift_core::Result<()> {
        let retry_count = entry.retry_count.saturating_add(1).min(MAX_RETRIES);
        let message = failure.to_string();

        let status = if retry_count >= MAX_RETRIES {
            report.permanently_failed += 1;
            tracing::error!(
                entry = entry.id,
                id = %entry.reference,
                error = %message,
                "giving up after {} attempts",
                MAX_RETRIES
            );
            if let Some(workout_key) = owning_workout(db, entry)? {
                db.set_workout_sync_status(workout_key, SyncStatus::Failed)?;
            }
            QueueStatus::Failed
        } else {
            report.retrying += 1;
            tracing::warn!(
                entry = entry.id,
                attempt = retry_count,
                error = %message,
                "sync attempt failed"
            );
            QueueStatus::Pending
        };

        db.update_queue_entry(
            entry.id,
            &QueuePatch {
                status: Some(status),
                retry_count: Some(retry_count),
                last_error: Some(Some(message)),
            },
        )
    }

    async fn deliver(&self, entry: &QueueEntry) -> Result<Delivery, Failure> {
        let key = entry.entity_key;
        match &entry.mutation {
            Mutation::CreateWorkout { .. } => self.create_workout(key).await,
            Mutation::UpdateWorkout { patch } => {
                let Some(id) = self.workout_id(key, &entry.reference).await? else {
                    return Ok(Delivery::Moot("workout has no confirmed id"));
                };
                self.remote.update_workout(id, patch.clone()).await?;
                Ok(Delivery::Delivered)
            }
            Mutation::DeleteWorkout => {
                let Some(id) = self.workout_id(key, &entry.reference).await? else {
                    return Ok(Delivery::Moot("workout has no confirmed id"));
                };
                self.remote.delete_workout(id).await?;
                Ok(Delivery::Delivered)
            }
            Mutation::CreateSet { .. } => self.create_set(key).await,
            Mutation::UpdateSet { patch } => {
                let Some(id) = self.set_id(key, &entry.reference).await? else {
                    return Ok(Delivery::Moot("set has no confirmed id"));
                };
                self.remote.update_set(id, patch.clone()).await?;
                Ok(Delivery::Delivered)
            }
            Mutation::DeleteSet => {
                let Some(id) = self.set_id(key, &entry.reference).await? else {
                    return Ok(Delivery::Moot("set has no confirmed id"));
                };
                self.remote.delete_set(id).await?;
                Ok(Delivery::Delivered)
            }
        }
    }

    async fn workout_id(
        &self,
        key: LocalKey,
        recorded: &EntityRef,
    ) -> Result<Option<String>, Failure> {
        let local = {
            let db = self.db.lock().await;
            db.find_workout(key)?.map(|w| w.reference)
        };
        Ok(current_reference(local, recorded)
            .confirmed_id()
            .map(str::to_string))
    }

    async fn set_id(&self, key: LocalKey, recorded: &EntityRef) -> Result<Option<String>, Failure> {
        let local = {
            let db = self.db.lock().await;
            db.find_set(key)?.map(|s| s.reference)
        };
        Ok(current_reference(local, recorded)
            .confirmed_id()
            .map(str::to_string))
    }

    async fn create_workout(&self, key: LocalKey) -> Result<Delivery, Failure> {
        let workout = {
            let db = self.db.lock().await;
            db.find_workout(key)?
        };
        let Some(workout) = workout else {
            return Ok(Delivery::Moot("workout deleted before sync"));
        };
        if workout.reference.is_confirmed() {
            return Ok(Delivery::Moot("workout already confirmed"));
        }

        let confirmed = self.remote.create_workout(workout.fields).await?;

        let mut db = self.db.lock().await;
        if db.reconcile_workout(key, &confirmed.id)? {
            tracing::info!(from = %workout.reference, to = %confirmed.id, "workout reconciled");
        } else {
            // Deleted locally while the create was in flight
            tracing::info!(id = %confirmed.id, "workout deleted during sync, queueing remote delete");
            db.enqueue(key, &EntityRef::Confirmed(confirmed.id), &Mutation::DeleteWorkout)?;
        }
        Ok(Delivery::Delivered)
    }

    async fn create_set(&self, key: LocalKey) -> Result<Delivery, Failure> {
        let (set, parent) = {
            let db = self.db.lock().await;
            let set = db.find_set(key)?;
            let parent = match &set {
                Some(set) => db.find_workout(set.workout_key)?,
                None => None,
            };
            (set, parent)
        };
        let Some(set) = set else {
            return Ok(Delivery::Moot("set deleted before sync"));
        };
        if set.reference.is_confirmed() {
            return Ok(Delivery::Moot("set already confirmed"));
        }
        let Some(parent) = parent else {
            return Ok(Delivery::Moot("parent workout deleted before sync"));
        };
        let EntityRef::Confirmed(parent_id) = parent.reference else {
            return Ok(Delivery::Deferred);
        };

        let confirmed = self.remote.create_set(parent_id, set.fields).await?;

        let mut db = self.db.lock().await;
        if db.reconcile_set(key, &confirmed.id)? {
            tracing::info!(from = %set.reference, to = %confirmed.id, "set reconciled");
        } else {
            tracing::info!(id = %confirmed.id, "set deleted during sync, queueing remote delete");
            db.enqueue(key, &EntityRef::Confirmed(confirmed.id), &Mutation::DeleteSet)?;
        }
        Ok(Delivery::Delivered)
    }
}

/// True if anything is still queued for the workout or one of its sets.
fn has_workout_backlog(db: &Database, workout_key: LocalKey) -> lift_core::Result<bool> {
    if db.has_queued(EntityType::Workout, workout_key)? {
        return Ok(true);
    }
    for set in db.list_sets(workout_key)? {
        if db.has_queued(EntityType::Set, set.local_key)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The workout whose sync status reflects this entry.
fn owning_workout(db: &Database, entry: &QueueEntry) -> lift_core::Result<Option<LocalKey>> {
    Ok(match (&entry.entity_type, &entry.mutation) {
        (EntityType::Workout, _) => Some(entry.entity_key),
        (_, Mutation::CreateSet { workout_key, .. }) => Some(*workout_key),
        _ => db.find_set(entry.entity_key)?.map(|s| s.workout_key),
    })
}
