// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process server tests, including full round trips through the
//! liftlog sync engine over a real WebSocket.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use lift_core::protocol::{ClientMessage, RemoteRequest, ServerMessage};
use lift_core::{Database, EntityRef, SetFields, SyncStatus, WorkoutFields};
use liftlog::sync::{
    ClientConfig, Connectivity, ConnectivityFlag, Dispatcher, Remote, RemoteClient, RemoteError, SyncProcessor,
};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use yare::parameterized;

use crate::server::{handle_client_message, serve};
use crate::state::ServerState;
use crate::store::RemoteStore;

/// A server on a random local port, stopped when dropped.
struct TestServer {
    url: String,
    state: ServerState,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let state = ServerState::with_store(RemoteStore::open_in_memory().unwrap());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let serving = state.clone();
        let task = tokio::spawn(async move {
            let _ = serve(listener, serving).await;
        });
        TestServer { url, state, task }
    }

    fn client(&self, flag: &ConnectivityFlag) -> Arc<dyn Remote> {
        let config = ClientConfig {
            url: self.url.clone(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
        };
        Arc::new(RemoteClient::new(config).with_connectivity(flag.clone()))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn workout(name: &str) -> WorkoutFields {
    WorkoutFields::new("user-1", name, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
}

fn state() -> ServerState {
    ServerState::with_store(RemoteStore::open_in_memory().unwrap())
}

async fn send(state: &ServerState, msg: ClientMessage) -> ServerMessage {
    handle_client_message(&msg.to_json().unwrap(), state)
        .await
        .unwrap()
}

// ─────────────────────────────────────────────────────────────────────────
// Message handling
// ─────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ping_gets_pong() {
    assert_eq!(
        send(&state(), ClientMessage::ping(42)).await,
        ServerMessage::pong(42)
    );
}

#[tokio::test]
async fn create_echoes_record_and_id() {
    let state = state();
    let reply = send(
        &state,
        ClientMessage::request(
            7,
            RemoteRequest::CreateWorkout {
                fields: workout("Push"),
            },
        ),
    )
    .await;

    assert_eq!(
        reply,
        ServerMessage::WorkoutCreated {
            req_id: 7,
            id: "wo-1".into(),
            record: workout("Push"),
        }
    );
}

#[parameterized(
    unknown_workout = { RemoteRequest::DeleteWorkout { id: "wo-5".into() } },
    temporary_id = { RemoteRequest::DeleteSet { id: "local_3".into() } },
    unnamed = { RemoteRequest::CreateWorkout { fields: workout("") } },
    zero_reps = { RemoteRequest::CreateSet { workout_id: "wo-1".into(), fields: SetFields::new("squat", "Squat", 0, 0) } },
)]
fn invalid_requests_are_rejected(request: RemoteRequest) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    runtime.block_on(async {
        let state = state();
        send(
            &state,
            ClientMessage::request(1, RemoteRequest::CreateWorkout { fields: workout("Push") }),
        )
        .await;

        let reply = send(&state, ClientMessage::request(2, request)).await;
        assert!(matches!(reply, ServerMessage::Rejected { req_id: 2, .. }));
    });
}

#[tokio::test]
async fn malformed_message_is_an_error() {
    let result = handle_client_message("{\"type\":\"bogus\"}", &state()).await;
    assert!(result.is_err());
}

// ─────────────────────────────────────────────────────────────────────────
// Round trips through the sync engine
// ─────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn client_round_trips_over_websocket() {
    let server = TestServer::start().await;
    let flag = ConnectivityFlag::new(true);
    let remote = server.client(&flag);

    let confirmed = remote.create_workout(workout("Push")).await.unwrap();
    assert_eq!(confirmed.id, "wo-1");
    let set = remote
        .create_set("wo-1".into(), SetFields::new("squat", "Squat", 5, 0))
        .await
        .unwrap();
    assert_eq!(set.id, "set-1");

    let err = remote.delete_set("set-9".into()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Application(ref m) if m.contains("unknown set")));
    assert!(flag.is_online());
}

#[tokio::test]
async fn offline_session_syncs_end_to_end() {
    let server = TestServer::start().await;
    let flag = ConnectivityFlag::new(false);
    let remote = server.client(&flag);
    let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
    let dispatcher = Dispatcher::new(db.clone(), Some(remote.clone()), Arc::new(flag.clone()));
    let processor = SyncProcessor::new(db.clone(), remote, Arc::new(flag.clone()));

    let workout = dispatcher.create_workout(workout("Push")).await.unwrap();
    for reps in [8, 6] {
        let order = db.lock().await.next_set_order(workout.local_key).unwrap();
        dispatcher
            .add_set(
                workout.local_key,
                SetFields::new("bench-press", "Bench Press", reps, order),
            )
            .await
            .unwrap();
    }

    flag.set_online(true);
    let report = processor.run().await;
    assert_eq!(report.succeeded, 3);

    let db = db.lock().await;
    let synced = db.get_workout(workout.local_key).unwrap();
    assert_eq!(synced.reference, EntityRef::Confirmed("wo-1".into()));
    assert_eq!(synced.sync_status, SyncStatus::Synced);
    assert!(db.queue_counts().unwrap().is_empty());

    let remote_sets = server
        .state
        .with(|store| {
            ["set-1", "set-2"]
                .iter()
                .map(|id| store.get_set(id).unwrap().unwrap())
                .collect::<Vec<_>>()
        })
        .await;
    assert!(remote_sets.iter().all(|(parent, _)| parent == "wo-1"));
    assert_eq!(remote_sets[1].1.reps, 6);
}

#[tokio::test]
async fn rejection_surfaces_to_the_caller() {
    let server = TestServer::start().await;
    let flag = ConnectivityFlag::new(true);
    let db = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
    let dispatcher = Dispatcher::new(db.clone(), Some(server.client(&flag)), Arc::new(flag));

    let confirmed = dispatcher.create_workout(workout("Push")).await.unwrap();
    let bad = SetFields::new("squat", "Squat", 5, 0).with_weight(100.0);
    server
        .state
        .with(|store| store.delete_workout("wo-1").unwrap())
        .await;

    let result = dispatcher.add_set(confirmed.local_key, bad).await;
    assert!(matches!(
        result,
        Err(liftlog::Error::Rejected(RemoteError::Application(_)))
    ));
    assert!(db.lock().await.list_sets(confirmed.local_key).unwrap().is_empty());
}

#[tokio::test]
async fn stopped_server_is_a_connectivity_failure() {
    let server = TestServer::start().await;
    let flag = ConnectivityFlag::new(true);
    let remote = server.client(&flag);
    let url = server.url.clone();
    drop(server);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = remote.create_workout(workout("Push")).await.unwrap_err();
    assert!(matches!(err, RemoteError::Connectivity(_)), "{} at {}", err, url);
    assert!(!flag.is_online());
}
