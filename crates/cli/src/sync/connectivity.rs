// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A positive/negative signal that the remote service is reachable.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Shared, settable connectivity signal.
///
/// Clones observe the same flag.
#[derive(Debug, Clone)]
pub struct ConnectivityFlag(Arc<AtomicBool>);

impl ConnectivityFlag {
    pub fn new(online: bool) -> Self {
        ConnectivityFlag(Arc::new(AtomicBool::new(online)))
    }

    pub fn set_online(&self, online: bool) {
        let was = self.0.swap(online, Ordering::SeqCst);
        if was != online {
            tracing::debug!(online, "connectivity changed");
        }
    }
}

impl Default for ConnectivityFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for ConnectivityFlag {
    fn is_online(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
