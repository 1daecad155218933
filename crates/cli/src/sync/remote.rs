// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The hosted backend as seen by the sync engine.

use std::future::Future;
use std::pin::Pin;

use lift_core::{SetFields, SetPatch, WorkoutFields, WorkoutPatch};

/// Why a remote call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The service could not be reached or did not answer in time.
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// The service answered and refused the request.
    #[error("rejected by remote: {0}")]
    Application(String),

    /// The failure could not be attributed by the transport.
    #[error("remote error: {0}")]
    Unknown(String),
}

/// A record the remote service accepted, with the identity it assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmed<T> {
    pub id: String,
    pub record: T,
}

/// Boxed future returned by [`Remote`] methods.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send + 'a>>;

/// Remote persistence contract.
///
/// Every id passed in must be a confirmed remote id.
pub trait Remote: Send + Sync {
    fn create_workout(&self, fields: WorkoutFields) -> RemoteFuture<'_, Confirmed<WorkoutFields>>;

    fn update_workout(&self, id: String, patch: WorkoutPatch) -> RemoteFuture<'_, ()>;

    /// Deletes a workout and, remotely, all of its sets.
    fn delete_workout(&self, id: String) -> RemoteFuture<'_, ()>;

    fn create_set(
        &self,
        workout_id: String,
        fields: SetFields,
    ) -> RemoteFuture<'_, Confirmed<SetFields>>;

    fn update_set(&self, id: String, patch: SetPatch) -> RemoteFuture<'_, ()>;

    fn delete_set(&self, id: String) -> RemoteFuture<'_, ()>;
}
