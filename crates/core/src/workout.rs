// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core workout types for the liftlog tracker.
//!
//! This module contains the device-local records ([`Workout`], [`SetRecord`]),
//! the field bundles submitted to the remote service, and [`EntityRef`], which
//! tracks whether a record's identity has been confirmed by the remote yet.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Device-assigned key of a local record. Stable for the record's lifetime
/// and never reused on the same device.
pub type LocalKey = i64;

/// Identity of a workout or set as currently known on this device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    /// Known only to this device. Must never be submitted remotely.
    Temporary(LocalKey),
    /// Assigned by the remote service once the create succeeded.
    Confirmed(String),
}

impl EntityRef {
    /// Builds a reference from the storage columns (`local_key`, `remote_id`).
    pub fn from_columns(local_key: LocalKey, remote_id: Option<String>) -> Self {
        match remote_id {
            Some(id) => EntityRef::Confirmed(id),
            None => EntityRef::Temporary(local_key),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, EntityRef::Confirmed(_))
    }

    /// The remote id, if this reference has been reconciled.
    pub fn confirmed_id(&self) -> Option<&str> {
        match self {
            EntityRef::Confirmed(id) => Some(id),
            EntityRef::Temporary(_) => None,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Temporary(key) => write!(f, "local_{}", key),
            EntityRef::Confirmed(id) => write!(f, "{}", id),
        }
    }
}

/// Lifecycle status of a workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    /// Scheduled but not started (typically an AI-generated plan).
    Planned,
    /// Sets are being logged right now.
    #[default]
    InProgress,
    /// Finished, with optional completion feedback attached.
    Completed,
    /// Abandoned.
    Cancelled,
}

impl WorkoutStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutStatus::Planned => "planned",
            WorkoutStatus::InProgress => "in_progress",
            WorkoutStatus::Completed => "completed",
            WorkoutStatus::Cancelled => "cancelled",
        }
    }

    /// Returns true for completed or cancelled workouts.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkoutStatus::Completed | WorkoutStatus::Cancelled)
    }
}

impl fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkoutStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "planned" => Ok(WorkoutStatus::Planned),
            "in_progress" | "in-progress" => Ok(WorkoutStatus::InProgress),
            "completed" => Ok(WorkoutStatus::Completed),
            "cancelled" | "canceled" => Ok(WorkoutStatus::Cancelled),
            _ => Err(Error::InvalidWorkoutStatus(s.to_string())),
        }
    }
}

/// Whether a local workout matches what the remote service holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Synced,
    Pending,
    /// At least one queued mutation for this workout exhausted its retries.
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Synced => "synced",
            SyncStatus::Pending => "pending",
            SyncStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "synced" => Ok(SyncStatus::Synced),
            "pending" => Ok(SyncStatus::Pending),
            "failed" => Ok(SyncStatus::Failed),
            _ => Err(Error::InvalidSyncStatus(s.to_string())),
        }
    }
}

/// Feedback attached to a workout when it is completed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub improvements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// The user-editable fields of a workout, as submitted to the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutFields {
    pub owner_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    pub status: WorkoutStatus,
    #[serde(default)]
    pub ai_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<Completion>,
}

impl WorkoutFields {
    /// Fields for a workout that starts now.
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>, date: NaiveDate) -> Self {
        WorkoutFields {
            owner_id: owner_id.into(),
            name: name.into(),
            description: None,
            date,
            status: WorkoutStatus::InProgress,
            ai_generated: false,
            completion: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: WorkoutStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_ai_generated(mut self, ai_generated: bool) -> Self {
        self.ai_generated = ai_generated;
        self
    }

    /// Checks the invariants both this device and the remote enforce.
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.trim().is_empty() {
            return Err(Error::InvalidInput("workout owner cannot be empty".into()));
        }
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("workout name cannot be empty".into()));
        }
        Ok(())
    }
}

/// A partial update to a workout. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkoutStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<Completion>,
}

impl WorkoutPatch {
    /// Patch that marks a workout completed with the given feedback.
    pub fn complete(completion: Completion) -> Self {
        WorkoutPatch {
            status: Some(WorkoutStatus::Completed),
            completion: Some(completion),
            ..Default::default()
        }
    }

    pub fn status(status: WorkoutStatus) -> Self {
        WorkoutPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.status.is_none()
            && self.completion.is_none()
    }

    /// Applies this patch on top of `fields`.
    pub fn apply_to(&self, fields: &mut WorkoutFields) {
        if let Some(ref name) = self.name {
            fields.name = name.clone();
        }
        if let Some(ref description) = self.description {
            fields.description = Some(description.clone());
        }
        if let Some(date) = self.date {
            fields.date = date;
        }
        if let Some(status) = self.status {
            fields.status = status;
        }
        if let Some(ref completion) = self.completion {
            fields.completion = Some(completion.clone());
        }
    }
}

/// A workout as stored on this device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub local_key: LocalKey,
    pub reference: EntityRef,
    #[serde(flatten)]
    pub fields: WorkoutFields,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workout {
    /// A workout stays in the active listing until it is finished and the
    /// remote has caught up with it.
    pub fn is_active(&self) -> bool {
        !(self.fields.status.is_terminal() && self.sync_status == SyncStatus::Synced)
    }
}

/// The fields of one logged set, as submitted to the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetFields {
    pub exercise_id: String,
    pub exercise_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub reps: u32,
    #[serde(default)]
    pub reps_in_reserve: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub order_index: u32,
}

impl SetFields {
    pub fn new(
        exercise_id: impl Into<String>,
        exercise_name: impl Into<String>,
        reps: u32,
        order_index: u32,
    ) -> Self {
        SetFields {
            exercise_id: exercise_id.into(),
            exercise_name: exercise_name.into(),
            weight: None,
            reps,
            reps_in_reserve: 0,
            duration_secs: None,
            notes: None,
            order_index,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_reps_in_reserve(mut self, rir: u32) -> Self {
        self.reps_in_reserve = rir;
        self
    }

    pub fn with_duration(mut self, secs: u32) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Checks the invariants both this device and the remote enforce.
    ///
    /// Timed holds may log zero reps as long as a duration is present.
    pub fn validate(&self) -> Result<()> {
        if self.exercise_id.trim().is_empty() {
            return Err(Error::InvalidInput("exercise id cannot be empty".into()));
        }
        if self.reps == 0 && self.duration_secs.is_none() {
            return Err(Error::InvalidInput(
                "a set needs reps or a duration".into(),
            ));
        }
        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidInput(format!("invalid weight: {}", weight)));
            }
        }
        Ok(())
    }
}

/// A partial update to a set. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps_in_reserve: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<u32>,
}

impl SetPatch {
    pub fn is_empty(&self) -> bool {
        self.weight.is_none()
            && self.reps.is_none()
            && self.reps_in_reserve.is_none()
            && self.duration_secs.is_none()
            && self.notes.is_none()
            && self.order_index.is_none()
    }

    /// Applies this patch on top of `fields`.
    pub fn apply_to(&self, fields: &mut SetFields) {
        if let Some(weight) = self.weight {
            fields.weight = Some(weight);
        }
        if let Some(reps) = self.reps {
            fields.reps = reps;
        }
        if let Some(rir) = self.reps_in_reserve {
            fields.reps_in_reserve = rir;
        }
        if let Some(secs) = self.duration_secs {
            fields.duration_secs = Some(secs);
        }
        if let Some(ref notes) = self.notes {
            fields.notes = Some(notes.clone());
        }
        if let Some(order) = self.order_index {
            fields.order_index = order;
        }
    }
}

/// A set as stored on this device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub local_key: LocalKey,
    pub reference: EntityRef,
    /// Local key of the parent workout.
    pub workout_key: LocalKey,
    #[serde(flatten)]
    pub fields: SetFields,
}

#[cfg(test)]
#[path = "workout_tests.rs"]
mod tests;
