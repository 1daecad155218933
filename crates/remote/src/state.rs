// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state management.
//!
//! Wraps the canonical store for shared access across connections.

use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use lift_core::protocol::{RemoteRequest, ServerMessage};
use tracing::{debug, info};

use crate::store::{RemoteStore, Result, StoreError};

/// Shared server state containing the canonical store.
#[derive(Clone)]
pub struct ServerState {
    store: Arc<Mutex<RemoteStore>>,
}

impl ServerState {
    /// Opens the store in the given data directory.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let store = RemoteStore::open(&data_dir.join("remote.db"))?;
        Ok(Self::with_store(store))
    }

    pub fn with_store(store: RemoteStore) -> Self {
        ServerState {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Applies one request and builds the reply for it.
    ///
    /// Invalid requests become `rejected` replies. Only storage failures
    /// are returned as errors.
    pub async fn apply(&self, req_id: u64, request: RemoteRequest) -> Result<ServerMessage> {
        let name = request.name();
        let store = self.store.lock().await;
        let reply = match request {
            RemoteRequest::CreateWorkout { fields } => {
                store
                    .create_workout(&fields)
                    .map(|id| ServerMessage::WorkoutCreated {
                        req_id,
                        id,
                        record: fields,
                    })
            }
            RemoteRequest::UpdateWorkout { id, patch } => store
                .update_workout(&id, &patch)
                .map(|()| ServerMessage::ack(req_id)),
            RemoteRequest::DeleteWorkout { id } => store
                .delete_workout(&id)
                .map(|()| ServerMessage::ack(req_id)),
            RemoteRequest::CreateSet { workout_id, fields } => store
                .create_set(&workout_id, &fields)
                .map(|id| ServerMessage::SetCreated {
                    req_id,
                    id,
                    record: fields,
                }),
            RemoteRequest::UpdateSet { id, patch } => store
                .update_set(&id, &patch)
                .map(|()| ServerMessage::ack(req_id)),
            RemoteRequest::DeleteSet { id } => {
                store.delete_set(&id).map(|()| ServerMessage::ack(req_id))
            }
        };

        match reply {
            Ok(msg) => {
                info!(req_id, request = name, "applied");
                Ok(msg)
            }
            Err(StoreError::Rejected(message)) => {
                debug!(req_id, request = name, %message, "rejected");
                Ok(ServerMessage::rejected(req_id, message))
            }
            Err(e) => Err(e),
        }
    }

    /// Runs `f` against the store; used to inspect state in tests.
    #[cfg(test)]
    pub async fn with<T>(&self, f: impl FnOnce(&RemoteStore) -> T) -> T {
        f(&*self.store.lock().await)
    }
}
