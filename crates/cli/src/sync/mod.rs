// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first sync engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  online   ┌─────────────┐     ┌─────────────┐
//! │ Dispatcher  │──────────►│   Remote    │────►│ lift-remote │
//! │             │           │   (trait)   │◄────│   server    │
//! └─────────────┘           └─────────────┘     └─────────────┘
//!        │ offline                 ▲
//!        ▼                         │ drain
//! ┌─────────────┐           ┌─────────────┐
//! │ Local store │◄──────────│  Processor  │
//! │   + queue   │ reconcile │             │
//! └─────────────┘           └─────────────┘
//! ```
//!
//! # Features
//!
//! - Every mutation lands locally first when the remote is unreachable
//! - Typed remote errors, with a message heuristic for unattributed ones
//! - Temporary identities rewritten in place once the remote confirms them
//! - Bounded retries with terminal `failed` entries
//! - Injectable remote and connectivity signal for testing

mod classify;
mod client;
mod connectivity;
mod dispatcher;
mod processor;
mod remote;
mod transport;

pub use classify::{classify, looks_like_connectivity, ErrorClass};
pub use client::{ClientConfig, RemoteClient};
pub use connectivity::{Connectivity, ConnectivityFlag};
pub use dispatcher::Dispatcher;
pub use processor::{SyncProcessor, SyncReport};
pub use remote::{Confirmed, Remote, RemoteError, RemoteFuture};
pub use transport::{Transport, TransportError, WebSocketTransport};

#[cfg(test)]
pub(crate) mod test_helpers;
