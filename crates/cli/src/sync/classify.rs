// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Decides whether a failed remote call should fall back to the offline path.

use super::remote::RemoteError;

/// Substrings that mark an unattributed failure as connectivity-related.
const CONNECTIVITY_MARKERS: &[&str] = &[
    "network",
    "fetch",
    "connection",
    "timeout",
    "timed out",
    "offline",
    "unreachable",
    "refused",
    "reset",
    "dns",
];

/// Category of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Absorbed: the mutation is stored locally and queued.
    Connectivity,
    /// Surfaced to the caller: retrying would not help.
    Application,
}

/// Classify a remote failure.
///
/// Typed errors map directly; only [`RemoteError::Unknown`] is inspected.
pub fn classify(err: &RemoteError) -> ErrorClass {
    match err {
        RemoteError::Connectivity(_) => ErrorClass::Connectivity,
        RemoteError::Application(_) => ErrorClass::Application,
        RemoteError::Unknown(msg) if looks_like_connectivity(msg) => ErrorClass::Connectivity,
        RemoteError::Unknown(_) => ErrorClass::Application,
    }
}

/// Case-insensitive match against the connectivity markers.
pub fn looks_like_connectivity(message: &str) -> bool {
    let lower = message.to_lowercase();
    CONNECTIVITY_MARKERS.iter().any(|m| lower.contains(m))
}
