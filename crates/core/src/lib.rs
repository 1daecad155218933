// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! lift-core: Shared library for the liftlog workout tracker
//!
//! This crate provides the data model, the device-local SQLite store, the
//! mutation queue model, and the wire protocol shared by the `liftlog` CLI
//! and the `lift-remote` reference backend.

pub mod db;
pub mod error;
pub mod protocol;
pub mod queue;
pub mod workout;

pub use db::Database;
pub use error::{Error, Result};
pub use queue::{
    EntityType, Mutation, Operation, QueueCounts, QueueEntry, QueueId, QueuePatch, QueueStatus,
    MAX_RETRIES,
};
pub use workout::{
    Completion, EntityRef, LocalKey, SetFields, SetPatch, SetRecord, SyncStatus, Workout,
    WorkoutFields, WorkoutPatch, WorkoutStatus,
};
