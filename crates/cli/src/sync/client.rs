// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request/reply client for the lift-remote server.
//!
//! Connects lazily on the first request, bounds every request with a
//! timeout, and maps transport failures to connectivity errors. A failed
//! connect also lowers the shared connectivity signal so later calls in the
//! same process go straight to the offline path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lift_core::protocol::{ClientMessage, RemoteRequest, ServerMessage};
use lift_core::{SetFields, SetPatch, WorkoutFields, WorkoutPatch};
use tokio::sync::Mutex;

use super::connectivity::ConnectivityFlag;
use super::remote::{Confirmed, Remote, RemoteError, RemoteFuture};
use super::transport::{Transport, WebSocketTransport};
use crate::config::RemoteConfig;

/// Connection settings for [`RemoteClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl From<&RemoteConfig> for ClientConfig {
    fn from(remote: &RemoteConfig) -> Self {
        ClientConfig {
            url: remote.url.clone(),
            connect_timeout: remote.connect_timeout(),
            request_timeout: remote.request_timeout(),
        }
    }
}

/// [`Remote`] implementation over a message transport.
pub struct RemoteClient<T: Transport = WebSocketTransport> {
    config: ClientConfig,
    transport: Mutex<T>,
    next_req_id: AtomicU64,
    connectivity: Option<ConnectivityFlag>,
}

impl RemoteClient<WebSocketTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, WebSocketTransport::new())
    }
}

impl<T: Transport> RemoteClient<T> {
    /// Create a client over a custom transport (for testing).
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        RemoteClient {
            config,
            transport: Mutex::new(transport),
            next_req_id: AtomicU64::new(1),
            connectivity: None,
        }
    }

    /// Report connect outcomes to a shared connectivity signal.
    pub fn with_connectivity(mut self, flag: ConnectivityFlag) -> Self {
        self.connectivity = Some(flag);
        self
    }

    fn report(&self, online: bool) {
        if let Some(flag) = &self.connectivity {
            flag.set_online(online);
        }
    }

    /// Send one request and wait for the reply carrying its `req_id`.
    async fn call(&self, request: RemoteRequest) -> Result<ServerMessage, RemoteError> {
        let req_id = self.next_req_id.fetch_add(1, Ordering::Relaxed);
        let name = request.name();
        let mut transport = self.transport.lock().await;

        if !transport.is_connected() {
            let connect = transport.connect(&self.config.url);
            match tokio::time::timeout(self.config.connect_timeout, connect).await {
                Ok(Ok(())) => {
                    tracing::debug!(url = %self.config.url, "connected");
                    self.report(true);
                }
                Ok(Err(e)) => {
                    self.report(false);
                    return Err(e.into());
                }
                Err(_) => {
                    self.report(false);
                    return Err(RemoteError::Connectivity(format!(
                        "connection to {} timed out",
                        self.config.url
                    )));
                }
            }
        }

        tracing::debug!(req_id, request = name, "sending request");
        let pending = exchange(&mut *transport, req_id, request);
        let result = match tokio::time::timeout(self.config.request_timeout, pending).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Connectivity(format!(
                "{} request timed out",
                name
            ))),
        };

        if matches!(result, Err(RemoteError::Connectivity(_))) {
            // Drop a half-broken connection so the next call reconnects
            let _ = transport.disconnect().await;
        }

        match result? {
            ServerMessage::Rejected { message, .. } => Err(RemoteError::Application(message)),
            reply => Ok(reply),
        }
    }

    async fn call_ack(&self, request: RemoteRequest) -> Result<(), RemoteError> {
        match self.call(request).await? {
            ServerMessage::Ack { .. } => Ok(()),
            other => Err(unexpected(&other)),
        }
    }
}

/// Send a request and read until the reply with the same `req_id` arrives.
async fn exchange<T: Transport>(
    transport: &mut T,
    req_id: u64,
    request: RemoteRequest,
) -> Result<ServerMessage, RemoteError> {
    transport
        .send(ClientMessage::request(req_id, request))
        .await?;
    loop {
        match transport.recv().await? {
            Some(msg) if msg.req_id() == Some(req_id) => return Ok(msg),
            Some(ServerMessage::Error { message }) => return Err(RemoteError::Unknown(message)),
            // Late reply to an abandoned request, or keepalive
            Some(_) => continue,
            None => return Err(RemoteError::Connectivity("connection closed".to_string())),
        }
    }
}

fn unexpected(msg: &ServerMessage) -> RemoteError {
    RemoteError::Unknown(format!("unexpected reply: {:?}", msg))
}

impl<T: Transport> Remote for RemoteClient<T> {
    fn create_workout(&self, fields: WorkoutFields) -> RemoteFuture<'_, Confirmed<WorkoutFields>> {
        Box::pin(async move {
            match self.call(RemoteRequest::CreateWorkout { fields }).await? {
                ServerMessage::WorkoutCreated { id, record, .. } => Ok(Confirmed { id, record }),
                other => Err(unexpected(&other)),
            }
        })
    }

    fn update_workout(&self, id: String, patch: WorkoutPatch) -> RemoteFuture<'_, ()> {
        Box::pin(self.call_ack(RemoteRequest::UpdateWorkout { id, patch }))
    }

    fn delete_workout(&self, id: String) -> RemoteFuture<'_, ()> {
        Box::pin(self.call_ack(RemoteRequest::DeleteWorkout { id }))
    }

    fn create_set(
        &self,
        workout_id: String,
        fields: SetFields,
    ) -> RemoteFuture<'_, Confirmed<SetFields>> {
        Box::pin(async move {
            match self
                .call(RemoteRequest::CreateSet { workout_id, fields })
                .await?
            {
                ServerMessage::SetCreated { id, record, .. } => Ok(Confirmed { id, record }),
                other => Err(unexpected(&other)),
            }
        })
    }

    fn update_set(&self, id: String, patch: SetPatch) -> RemoteFuture<'_, ()> {
        Box::pin(self.call_ack(RemoteRequest::UpdateSet { id, patch }))
    }

    fn delete_set(&self, id: String) -> RemoteFuture<'_, ()> {
        Box::pin(self.call_ack(RemoteRequest::DeleteSet { id }))
    }
}
