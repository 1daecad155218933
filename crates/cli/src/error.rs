// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::RemoteError;

/// All possible errors that can occur in the liftlog library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'liftlog init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("invalid status transition: cannot go from {from} to {to}\n  hint: only planned or in_progress workouts can be {to}")]
    InvalidTransition { from: String, to: String },

    #[error("nothing to change\n  hint: pass at least one field to update")]
    EmptyPatch,

    #[error("{0}")]
    InvalidInput(String),

    /// The remote service refused the operation. Nothing was stored.
    #[error("{0}")]
    Rejected(RemoteError),

    #[error("no remote configured\n  hint: add a [remote] section to .liftlog/config.toml")]
    NoRemote,

    #[error("storage error: {0}")]
    Storage(#[from] lift_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// A specialized Result type for liftlog operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
