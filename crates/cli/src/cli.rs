// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// Custom help template that groups commands into sections
const HELP_TEMPLATE: &str = "{about-with-newline}
{usage-heading} {usage}

{before-help}Options:
{options}{after-help}";

const COMMANDS_HELP: &str = "\
Workouts:
  start       Start a new workout
  list        List workouts
  show        Show a workout and its sets
  edit        Edit a workout's name, description or date
  complete    Finish a workout with feedback
  cancel      Abandon a workout
  rm          Delete a workout and its sets
  set         Log, edit or delete sets

Sync:
  status      Show unsynced changes
  sync        Push queued changes to the remote
  retry       Requeue changes that ran out of retries

Setup:
  init        Initialize the workout log";

const QUICKSTART_HELP: &str = "\
Get started:
  liftlog init --owner me                  Initialize a local log
  liftlog start \"Push Day\"                 Start a workout
  liftlog set add <id> bench-press -r 8    Log a set
  liftlog complete <id> -s \"Felt strong\"   Finish the workout
  liftlog sync                             Push changes to the remote";

fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first workout log that syncs when the network allows")]
#[command(help_template = HELP_TEMPLATE)]
#[command(before_help = COMMANDS_HELP)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Run as if liftlog was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<String>,

    /// Never contact the remote; queue every change
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    // ─────────────────────────────────────────────────────────────────────────
    // Workouts
    // ─────────────────────────────────────────────────────────────────────────
    /// Start a new workout
    Start {
        /// Workout name
        #[arg(value_parser = non_empty_string)]
        name: String,

        /// Free-form description
        #[arg(long, short)]
        description: Option<String>,

        /// Date of the workout (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Schedule the workout instead of starting it now
        #[arg(long)]
        planned: bool,
    },

    /// List workouts
    List {
        /// Include finished workouts that are fully synced
        #[arg(long, short)]
        all: bool,

        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show a workout and its sets
    Show {
        /// Workout id (local_N or remote id)
        id: String,

        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Edit a workout's name, description or date
    Edit {
        id: String,

        #[arg(long, value_parser = non_empty_string)]
        name: Option<String>,

        #[arg(long, short)]
        description: Option<String>,

        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Finish a workout with feedback
    Complete {
        id: String,

        #[command(flatten)]
        feedback: FeedbackArgs,
    },

    /// Abandon a workout
    Cancel { id: String },

    /// Delete a workout and its sets
    Rm { id: String },

    /// Log, edit or delete sets
    #[command(subcommand)]
    Set(SetCommand),

    // ─────────────────────────────────────────────────────────────────────────
    // Sync
    // ─────────────────────────────────────────────────────────────────────────
    /// Show unsynced changes
    Status {
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Push queued changes to the remote
    Sync {
        /// Keep running and sync on the configured interval until interrupted
        #[arg(long, short)]
        watch: bool,
    },

    /// Requeue changes that ran out of retries
    Retry,

    // ─────────────────────────────────────────────────────────────────────────
    // Setup
    // ─────────────────────────────────────────────────────────────────────────
    /// Initialize the workout log
    Init {
        /// User id every workout belongs to
        #[arg(long, value_parser = non_empty_string)]
        owner: String,

        /// WebSocket URL of the sync backend (ws:// or wss://)
        #[arg(long)]
        remote: Option<String>,

        /// Directory to initialize (default: current directory)
        path: Option<String>,
    },
}

/// Completion feedback attached by `complete`.
#[derive(Args, Debug, Default)]
pub struct FeedbackArgs {
    /// How the session went
    #[arg(long, short, default_value = "")]
    pub summary: String,

    /// Something that went well (repeatable)
    #[arg(long = "strength")]
    pub strengths: Vec<String>,

    /// Something to work on (repeatable)
    #[arg(long = "improvement")]
    pub improvements: Vec<String>,

    /// Plan for next time (repeatable)
    #[arg(long = "next")]
    pub next_steps: Vec<String>,

    /// Session length in minutes
    #[arg(long)]
    pub minutes: Option<u32>,
}

/// Set fields shared by `set add` and `set edit`.
#[derive(Args, Debug, Default)]
pub struct SetArgs {
    /// Repetitions performed
    #[arg(long, short)]
    pub reps: Option<u32>,

    /// Load in kilograms
    #[arg(long, short)]
    pub weight: Option<f64>,

    /// Reps in reserve
    #[arg(long)]
    pub rir: Option<u32>,

    /// Duration of a timed hold in seconds
    #[arg(long)]
    pub secs: Option<u32>,

    #[arg(long, short)]
    pub notes: Option<String>,
}

#[derive(Subcommand)]
pub enum SetCommand {
    /// Log a set under a workout
    Add {
        /// Workout id
        workout: String,

        /// Exercise id, e.g. bench-press
        #[arg(value_parser = non_empty_string)]
        exercise: String,

        /// Display name of the exercise (default: derived from the id)
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: SetArgs,
    },

    /// Edit a logged set
    Edit {
        /// Set id (local_N or remote id)
        id: String,

        #[command(flatten)]
        fields: SetArgs,
    },

    /// Delete a logged set
    Rm { id: String },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
