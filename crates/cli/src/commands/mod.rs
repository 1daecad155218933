// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod init;
pub mod set;
pub mod sync;
pub mod workout;

use std::path::Path;
use std::sync::Arc;

use lift_core::{Database, SetRecord, Workout};
use tokio::sync::Mutex;

use crate::config::{find_work_dir, get_db_path, Config};
use crate::display::unsynced_banner;
use crate::error::{Error, Result};
use crate::sync::{
    ClientConfig, ConnectivityFlag, Dispatcher, Remote, RemoteClient, SyncProcessor,
};

/// Everything a command needs: the store, the dispatcher, and the remote
/// wiring derived from the project configuration.
pub struct Context {
    pub config: Config,
    pub db: Arc<Mutex<Database>>,
    pub connectivity: ConnectivityFlag,
    pub dispatcher: Dispatcher,
    remote: Option<Arc<dyn Remote>>,
    offline: bool,
}

impl Context {
    /// Open the project containing the current directory.
    pub fn open(offline: bool) -> Result<Self> {
        let work_dir = find_work_dir()?;
        Self::open_at(&work_dir, offline)
    }

    /// Open the project stored in `work_dir`.
    pub fn open_at(work_dir: &Path, offline: bool) -> Result<Self> {
        let config = Config::load(work_dir)?;
        let db = Database::open(&get_db_path(work_dir))?;

        // Optimistic until a connection attempt says otherwise
        let connectivity = ConnectivityFlag::new(config.is_remote_mode() && !offline);
        let remote = config.remote.as_ref().map(|r| {
            Arc::new(
                RemoteClient::new(ClientConfig::from(r)).with_connectivity(connectivity.clone()),
            ) as Arc<dyn Remote>
        });
        Ok(Self::with_parts(config, db, remote, connectivity, offline))
    }

    /// Assemble a context from already-built parts.
    pub fn with_parts(
        config: Config,
        db: Database,
        remote: Option<Arc<dyn Remote>>,
        connectivity: ConnectivityFlag,
        offline: bool,
    ) -> Self {
        let db = Arc::new(Mutex::new(db));
        let dispatcher = Dispatcher::new(
            db.clone(),
            remote.clone(),
            Arc::new(connectivity.clone()),
        );
        Context {
            config,
            db,
            connectivity,
            dispatcher,
            remote,
            offline,
        }
    }

    /// True if `--offline` was passed.
    pub fn is_forced_offline(&self) -> bool {
        self.offline
    }

    /// A processor draining into the configured remote.
    pub fn processor(&self) -> Result<SyncProcessor> {
        let remote = self.remote.clone().ok_or(Error::NoRemote)?;
        Ok(SyncProcessor::new(
            self.db.clone(),
            remote,
            Arc::new(self.connectivity.clone()),
        ))
    }

    pub async fn resolve_workout(&self, id: &str) -> Result<Workout> {
        Ok(self.db.lock().await.resolve_workout(id)?)
    }

    pub async fn resolve_set(&self, id: &str) -> Result<SetRecord> {
        Ok(self.db.lock().await.resolve_set(id)?)
    }

    /// Print the unsynced-changes banner to stderr, if there is anything to report.
    pub async fn report_unsynced(&self) -> Result<()> {
        let counts = self.dispatcher.queue_status().await?;
        if let Some(banner) = unsynced_banner(&counts) {
            eprintln!("note: {}", banner);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
