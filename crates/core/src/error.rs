// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for lift-core operations.

use thiserror::Error;

/// All possible errors that can occur in lift-core operations.
///
/// Anything raised from [`crate::Database`] is a storage failure from the
/// caller's point of view and is never retried by this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("workout not found: {0}")]
    WorkoutNotFound(String),

    #[error("set not found: {0}")]
    SetNotFound(String),

    #[error("queue entry not found: {0}")]
    QueueEntryNotFound(i64),

    #[error("invalid workout status: '{0}'\n  hint: valid statuses are: planned, in_progress, completed, cancelled")]
    InvalidWorkoutStatus(String),

    #[error("invalid sync status: '{0}'")]
    InvalidSyncStatus(String),

    #[error("invalid queue status: '{0}'")]
    InvalidQueueStatus(String),

    #[error("invalid operation: '{0}'")]
    InvalidOperation(String),

    #[error("invalid entity type: '{0}'")]
    InvalidEntityType(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for lift-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
