// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use lift_core::Database;

use crate::config::{get_db_path, init_work_dir};
use crate::error::Result;

pub fn run(owner: &str, remote: Option<&str>, path: Option<String>) -> Result<PathBuf> {
    let target_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };
    let work_dir = init_at(&target_path, owner, remote)?;

    println!("Initialized liftlog at {}", work_dir.display());
    println!("Owner: {}", owner);
    match remote {
        Some(url) => println!("Remote: {}", url),
        None => println!("Mode: local only"),
    }
    Ok(work_dir)
}

/// Create the `.liftlog/` directory and an empty store under `path`.
pub(crate) fn init_at(path: &Path, owner: &str, remote: Option<&str>) -> Result<PathBuf> {
    let work_dir = init_work_dir(path, owner, remote)?;
    Database::open(&get_db_path(&work_dir))?;
    tracing::debug!(work_dir = %work_dir.display(), "initialized");
    Ok(work_dir)
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
