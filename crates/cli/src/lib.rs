// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! liftlog - An offline-first workout log.
//!
//! This crate provides the `liftlog` CLI: workouts and sets are written to a
//! device-local SQLite store and sent to a remote service when it can be
//! reached. Whatever cannot be sent right away waits in a durable queue
//! that the [`sync::SyncProcessor`] drains later.
//!
//! # Main Components
//!
//! - [`sync::Dispatcher`] - routes each mutation online or into the queue
//! - [`sync::SyncProcessor`] - replays the queue and reconciles identities
//! - [`sync::classify`] - connectivity versus application failures
//! - [`Config`] - project configuration (owner, remote)
//! - [`Error`] - error types for all operations
//!
//! # Initialization
//!
//! ```rust,ignore
//! use liftlog::{init_work_dir, find_work_dir, Config};
//!
//! let work_dir = init_work_dir(Path::new("."), "user-1", Some("ws://localhost:7890"))?;
//! let config = Config::load(&find_work_dir()?)?;
//! ```

mod cli;
mod commands;
mod display;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, FeedbackArgs, OutputFormat, SetArgs, SetCommand};
pub use commands::Context;
pub use config::{find_work_dir, get_db_path, init_work_dir, Config, RemoteConfig};
pub use error::{Error, Result};

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init {
            owner,
            remote,
            path,
        } => commands::init::run(&owner, remote.as_deref(), path).map(|_| ()),
        command => {
            let ctx = Context::open(cli.offline)?;
            execute(&ctx, command).await
        }
    }
}

/// Run a command against an opened project.
pub async fn execute(ctx: &Context, command: Command) -> Result<()> {
    let mutated = match command {
        Command::Init { .. } => return Err(Error::AlreadyInitialized("this project".into())),
        Command::Start {
            name,
            description,
            date,
            planned,
        } => commands::workout::start(ctx, name, description, date, planned)
            .await
            .map(|_| true)?,
        Command::List { all, output } => commands::workout::list(ctx, all, output)
            .await
            .map(|_| false)?,
        Command::Show { id, output } => commands::workout::show(ctx, &id, output)
            .await
            .map(|_| false)?,
        Command::Edit {
            id,
            name,
            description,
            date,
        } => commands::workout::edit(ctx, &id, name, description, date)
            .await
            .map(|_| true)?,
        Command::Complete { id, feedback } => commands::workout::complete(ctx, &id, feedback)
            .await
            .map(|_| true)?,
        Command::Cancel { id } => commands::workout::cancel(ctx, &id).await.map(|_| true)?,
        Command::Rm { id } => commands::workout::remove(ctx, &id).await.map(|_| true)?,
        Command::Set(SetCommand::Add {
            workout,
            exercise,
            name,
            fields,
        }) => commands::set::add(ctx, &workout, exercise, name, fields)
            .await
            .map(|_| true)?,
        Command::Set(SetCommand::Edit { id, fields }) => commands::set::edit(ctx, &id, fields)
            .await
            .map(|_| true)?,
        Command::Set(SetCommand::Rm { id }) => {
            commands::set::remove(ctx, &id).await.map(|_| true)?
        }
        Command::Status { output } => commands::sync::status(ctx, output).await.map(|_| false)?,
        Command::Sync { watch } => commands::sync::run(ctx, watch).await.map(|_| false)?,
        Command::Retry => commands::sync::retry(ctx).await.map(|_| false)?,
    };

    if mutated {
        ctx.report_unsynced().await?;
    }
    Ok(())
}
