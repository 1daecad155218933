// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use lift_core::{Database, SetFields, SetPatch, WorkoutFields, WorkoutPatch};

use super::remote::{Confirmed, Remote, RemoteError, RemoteFuture};

pub type SharedDb = Arc<tokio::sync::Mutex<Database>>;

pub fn shared_db() -> SharedDb {
    Arc::new(tokio::sync::Mutex::new(Database::open_in_memory().unwrap()))
}

pub fn workout_fields(name: &str) -> WorkoutFields {
    WorkoutFields::new("user-1", name, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
}

pub fn set_fields(reps: u32, order: u32) -> SetFields {
    SetFields::new("bench-press", "Bench Press", reps, order).with_weight(60.0)
}

/// A remote call as observed by [`MockRemote`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateWorkout(WorkoutFields),
    UpdateWorkout(String, WorkoutPatch),
    DeleteWorkout(String),
    CreateSet(String, SetFields),
    UpdateSet(String, SetPatch),
    DeleteSet(String),
}

impl Call {
    /// Every identity this call carries.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Call::CreateWorkout(_) => vec![],
            Call::UpdateWorkout(id, _)
            | Call::DeleteWorkout(id)
            | Call::CreateSet(id, _)
            | Call::UpdateSet(id, _)
            | Call::DeleteSet(id) => vec![id.as_str()],
        }
    }
}

type Hook = Box<dyn FnMut(&Call) + Send>;

/// In-memory remote service with scripted failures.
///
/// Successful calls are applied to an in-memory copy of the remote state.
#[derive(Default)]
pub struct MockRemote {
    calls: Mutex<Vec<Call>>,
    next_failures: Mutex<VecDeque<RemoteError>>,
    always_fail: Mutex<Option<RemoteError>>,
    hook: Mutex<Option<Hook>>,
    next_id: AtomicU64,
    pub workouts: Mutex<BTreeMap<String, WorkoutFields>>,
    pub sets: Mutex<BTreeMap<String, (String, SetFields)>>,
}

impl MockRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail the next call with `err`.
    pub fn fail_next(&self, err: RemoteError) {
        self.next_failures.lock().unwrap().push_back(err);
    }

    /// Fail every call with `err` until [`MockRemote::recover`].
    pub fn fail_always(&self, err: RemoteError) {
        *self.always_fail.lock().unwrap() = Some(err);
    }

    pub fn recover(&self) {
        *self.always_fail.lock().unwrap() = None;
    }

    /// Run `f` on every call before it completes.
    pub fn on_call(&self, f: impl FnMut(&Call) + Send + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(f));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn workout(&self, id: &str) -> Option<WorkoutFields> {
        self.workouts.lock().unwrap().get(id).cloned()
    }

    pub fn set(&self, id: &str) -> Option<(String, SetFields)> {
        self.sets.lock().unwrap().get(id).cloned()
    }

    fn record(&self, call: Call) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call.clone());
        if let Some(hook) = self.hook.lock().unwrap().as_mut() {
            hook(&call);
        }
        if let Some(err) = self.next_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        if let Some(err) = self.always_fail.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(())
    }

    fn assign(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn missing(id: &str) -> RemoteError {
        RemoteError::Application(format!("not found: {}", id))
    }
}

impl Remote for MockRemote {
    fn create_workout(&self, fields: WorkoutFields) -> RemoteFuture<'_, Confirmed<WorkoutFields>> {
        Box::pin(async move {
            self.record(Call::CreateWorkout(fields.clone()))?;
            let id = self.assign("wo");
            self.workouts
                .lock()
                .unwrap()
                .insert(id.clone(), fields.clone());
            Ok(Confirmed { id, record: fields })
        })
    }

    fn update_workout(&self, id: String, patch: WorkoutPatch) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.record(Call::UpdateWorkout(id.clone(), patch.clone()))?;
            let mut workouts = self.workouts.lock().unwrap();
            let fields = workouts.get_mut(&id).ok_or_else(|| Self::missing(&id))?;
            patch.apply_to(fields);
            Ok(())
        })
    }

    fn delete_workout(&self, id: String) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.record(Call::DeleteWorkout(id.clone()))?;
            self.workouts
                .lock()
                .unwrap()
                .remove(&id)
                .ok_or_else(|| Self::missing(&id))?;
            self.sets.lock().unwrap().retain(|_, (parent, _)| *parent != id);
            Ok(())
        })
    }

    fn create_set(
        &self,
        workout_id: String,
        fields: SetFields,
    ) -> RemoteFuture<'_, Confirmed<SetFields>> {
        Box::pin(async move {
            self.record(Call::CreateSet(workout_id.clone(), fields.clone()))?;
            if !self.workouts.lock().unwrap().contains_key(&workout_id) {
                return Err(Self::missing(&workout_id));
            }
            let id = self.assign("set");
            self.sets
                .lock()
                .unwrap()
                .insert(id.clone(), (workout_id, fields.clone()));
            Ok(Confirmed { id, record: fields })
        })
    }

    fn update_set(&self, id: String, patch: SetPatch) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.record(Call::UpdateSet(id.clone(), patch.clone()))?;
            let mut sets = self.sets.lock().unwrap();
            let (_, fields) = sets.get_mut(&id).ok_or_else(|| Self::missing(&id))?;
            patch.apply_to(fields);
            Ok(())
        })
    }

    fn delete_set(&self, id: String) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.record(Call::DeleteSet(id.clone()))?;
            self.sets
                .lock()
                .unwrap()
                .remove(&id)
                .ok_or_else(|| Self::missing(&id))?;
            Ok(())
        })
    }
}
