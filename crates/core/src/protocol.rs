// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages between a device and the hosted backend.
//!
//! The protocol is request/response:
//! - Client sends one [`RemoteRequest`] per mutation, tagged with a `req_id`
//! - Server answers each request with a reply carrying the same `req_id`
//!
//! A `rejected` reply is an application-level refusal (validation, unknown
//! id) and must not be retried. Transport failures never produce a reply.

use serde::{Deserialize, Serialize};

use crate::workout::{SetFields, SetPatch, WorkoutFields, WorkoutPatch};

/// A single mutation against the remote service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RemoteRequest {
    CreateWorkout {
        fields: WorkoutFields,
    },
    UpdateWorkout {
        id: String,
        patch: WorkoutPatch,
    },
    DeleteWorkout {
        id: String,
    },
    CreateSet {
        /// Confirmed id of the parent workout.
        workout_id: String,
        fields: SetFields,
    },
    UpdateSet {
        id: String,
        patch: SetPatch,
    },
    DeleteSet {
        id: String,
    },
}

impl RemoteRequest {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            RemoteRequest::CreateWorkout { .. } => "create_workout",
            RemoteRequest::UpdateWorkout { .. } => "update_workout",
            RemoteRequest::DeleteWorkout { .. } => "delete_workout",
            RemoteRequest::CreateSet { .. } => "create_set",
            RemoteRequest::UpdateSet { .. } => "update_set",
            RemoteRequest::DeleteSet { .. } => "delete_set",
        }
    }
}

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Perform a mutation. The server answers with a reply carrying `req_id`.
    Request {
        /// Client-chosen id echoed in the reply.
        req_id: u64,
        request: RemoteRequest,
    },

    /// Ping message for keepalive.
    Ping {
        /// Client-chosen ID echoed in Pong.
        id: u64,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A workout was created; `id` is now its confirmed identity.
    WorkoutCreated {
        req_id: u64,
        id: String,
        record: WorkoutFields,
    },

    /// A set was created; `id` is now its confirmed identity.
    SetCreated {
        req_id: u64,
        id: String,
        record: SetFields,
    },

    /// An update or delete was applied.
    Ack { req_id: u64 },

    /// The request was refused. Retrying will not help.
    Rejected { req_id: u64, message: String },

    /// Pong response to client Ping.
    Pong {
        /// Echoed from the Ping message.
        id: u64,
    },

    /// The server could not make sense of a message.
    Error {
        /// Human-readable error description.
        message: String,
    },
}

impl ClientMessage {
    /// Creates a Request message.
    pub fn request(req_id: u64, request: RemoteRequest) -> Self {
        ClientMessage::Request { req_id, request }
    }

    /// Creates a Ping message.
    pub fn ping(id: u64) -> Self {
        ClientMessage::Ping { id }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates an Ack message.
    pub fn ack(req_id: u64) -> Self {
        ServerMessage::Ack { req_id }
    }

    /// Creates a Rejected message.
    pub fn rejected(req_id: u64, message: impl Into<String>) -> Self {
        ServerMessage::Rejected {
            req_id,
            message: message.into(),
        }
    }

    /// Creates a Pong message.
    pub fn pong(id: u64) -> Self {
        ServerMessage::Pong { id }
    }

    /// Creates an Error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// The request this message answers, if it is a reply.
    pub fn req_id(&self) -> Option<u64> {
        match self {
            ServerMessage::WorkoutCreated { req_id, .. }
            | ServerMessage::SetCreated { req_id, .. }
            | ServerMessage::Ack { req_id }
            | ServerMessage::Rejected { req_id, .. } => Some(*req_id),
            ServerMessage::Pong { .. } | ServerMessage::Error { .. } => None,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
