// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Mutation queue model.
//!
//! Every mutation that could not be delivered to the remote service is
//! recorded as a [`QueueEntry`] carrying a [`Mutation`]. Entries are drained
//! strictly in enqueue order, which is the order of their [`QueueId`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::workout::{EntityRef, LocalKey, SetFields, SetPatch, WorkoutFields, WorkoutPatch};

/// Upper bound on delivery attempts. An entry that reaches it is terminally
/// `failed` and is never retried automatically.
pub const MAX_RETRIES: u32 = 5;

/// Identifier of a queue entry. Monotonic, so it also encodes enqueue order.
pub type QueueId = i64;

/// Kind of mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Operation::Create),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            _ => Err(Error::InvalidOperation(s.to_string())),
        }
    }
}

/// Kind of record a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Workout,
    Set,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Workout => "workout",
            EntityType::Set => "set",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "workout" => Ok(EntityType::Workout),
            "set" => Ok(EntityType::Set),
            _ => Err(Error::InvalidEntityType(s.to_string())),
        }
    }
}

/// Delivery state of a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    /// Waiting for the next processor run.
    Pending,
    /// Claimed by the run currently in flight.
    Processing,
    /// Exhausted its retry budget. Terminal.
    Failed,
    /// Delivered. Completed entries are removed rather than kept.
    Completed,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Processing => "processing",
            QueueStatus::Failed => "failed",
            QueueStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QueueStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(QueueStatus::Pending),
            "processing" => Ok(QueueStatus::Processing),
            "failed" => Ok(QueueStatus::Failed),
            "completed" => Ok(QueueStatus::Completed),
            _ => Err(Error::InvalidQueueStatus(s.to_string())),
        }
    }
}

/// Snapshot of the data needed to replay a mutation against the remote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    CreateWorkout {
        fields: WorkoutFields,
    },
    UpdateWorkout {
        patch: WorkoutPatch,
    },
    DeleteWorkout,
    CreateSet {
        /// Local key of the parent workout; resolved to a remote id at drain time.
        workout_key: LocalKey,
        fields: SetFields,
    },
    UpdateSet {
        patch: SetPatch,
    },
    DeleteSet,
}

impl Mutation {
    pub fn operation(&self) -> Operation {
        match self {
            Mutation::CreateWorkout { .. } | Mutation::CreateSet { .. } => Operation::Create,
            Mutation::UpdateWorkout { .. } | Mutation::UpdateSet { .. } => Operation::Update,
            Mutation::DeleteWorkout | Mutation::DeleteSet => Operation::Delete,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            Mutation::CreateWorkout { .. }
            | Mutation::UpdateWorkout { .. }
            | Mutation::DeleteWorkout => EntityType::Workout,
            Mutation::CreateSet { .. } | Mutation::UpdateSet { .. } | Mutation::DeleteSet => {
                EntityType::Set
            }
        }
    }
}

/// A durable record of one mutation awaiting remote confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: QueueId,
    pub operation: Operation,
    pub entity_type: EntityType,
    /// Local key of the targeted workout or set.
    pub entity_key: LocalKey,
    /// Identity as known at enqueue time, rewritten when the entity is reconciled.
    pub reference: EntityRef,
    pub status: QueueStatus,
    pub enqueued_at: DateTime<Utc>,
    pub retry_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub mutation: Mutation,
}

impl QueueEntry {
    /// True once the entry has used its whole retry budget.
    pub fn is_exhausted(&self) -> bool {
        self.retry_count >= MAX_RETRIES
    }

    /// True if a processor run may pick this entry up.
    ///
    /// `failed` entries under the bound only exist after a manual reset.
    pub fn is_eligible(&self) -> bool {
        match self.status {
            QueueStatus::Pending => true,
            QueueStatus::Failed => !self.is_exhausted(),
            QueueStatus::Processing | QueueStatus::Completed => false,
        }
    }
}

/// Partial update to a queue entry's bookkeeping columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueuePatch {
    pub status: Option<QueueStatus>,
    pub retry_count: Option<u32>,
    /// `Some(None)` clears the stored error.
    pub last_error: Option<Option<String>>,
}

impl QueuePatch {
    pub fn status(status: QueueStatus) -> Self {
        QueuePatch {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// Aggregate queue counters for the "unsynced changes" banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    pub pending: usize,
    pub failed: usize,
    pub total: usize,
}

impl QueueCounts {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
