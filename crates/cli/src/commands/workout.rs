// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{Local, NaiveDate};
use lift_core::{Completion, SetRecord, Workout, WorkoutFields, WorkoutPatch, WorkoutStatus};
use serde::Serialize;

use super::Context;
use crate::cli::{FeedbackArgs, OutputFormat};
use crate::display::{format_workout_details, format_workout_line};
use crate::error::{Error, Result};

#[derive(Serialize)]
struct WorkoutView<'a> {
    #[serde(flatten)]
    workout: &'a Workout,
    sets: &'a [SetRecord],
}

pub async fn start(
    ctx: &Context,
    name: String,
    description: Option<String>,
    date: Option<NaiveDate>,
    planned: bool,
) -> Result<Workout> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let mut fields = WorkoutFields::new(ctx.config.owner.clone(), name, date);
    if let Some(description) = description {
        fields = fields.with_description(description);
    }
    if planned {
        fields = fields.with_status(WorkoutStatus::Planned);
    }

    let workout = ctx.dispatcher.create_workout(fields).await?;
    let verb = if planned { "Planned" } else { "Started" };
    println!("{} {}: {}", verb, workout.reference, workout.fields.name);
    Ok(workout)
}

pub async fn list(ctx: &Context, all: bool, output: OutputFormat) -> Result<()> {
    let workouts = {
        let db = ctx.db.lock().await;
        if all {
            db.list_workouts(&ctx.config.owner)?
        } else {
            db.list_active_workouts(&ctx.config.owner)?
        }
    };

    match output {
        OutputFormat::Json => print_json(&workouts)?,
        OutputFormat::Text => {
            if workouts.is_empty() {
                println!("No workouts");
            }
            for workout in &workouts {
                println!("{}", format_workout_line(workout));
            }
        }
    }
    Ok(())
}

pub async fn show(ctx: &Context, id: &str, output: OutputFormat) -> Result<()> {
    let (workout, sets) = {
        let db = ctx.db.lock().await;
        let workout = db.resolve_workout(id)?;
        let sets = db.list_sets(workout.local_key)?;
        (workout, sets)
    };

    match output {
        OutputFormat::Json => print_json(&WorkoutView {
            workout: &workout,
            sets: &sets,
        })?,
        OutputFormat::Text => println!("{}", format_workout_details(&workout, &sets)),
    }
    Ok(())
}

pub async fn edit(
    ctx: &Context,
    id: &str,
    name: Option<String>,
    description: Option<String>,
    date: Option<NaiveDate>,
) -> Result<Workout> {
    let workout = ctx.resolve_workout(id).await?;
    let patch = WorkoutPatch {
        name,
        description,
        date,
        ..Default::default()
    };
    let workout = ctx.dispatcher.update_workout(workout.local_key, patch).await?;
    println!("Updated {}", workout.reference);
    Ok(workout)
}

/// Refuse to finish a workout that is already finished.
fn check_finishable(workout: &Workout, to: WorkoutStatus) -> Result<()> {
    if workout.fields.status.is_terminal() {
        return Err(Error::InvalidTransition {
            from: workout.fields.status.to_string(),
            to: to.to_string(),
        });
    }
    Ok(())
}

pub async fn complete(ctx: &Context, id: &str, feedback: FeedbackArgs) -> Result<Workout> {
    let workout = ctx.resolve_workout(id).await?;
    check_finishable(&workout, WorkoutStatus::Completed)?;

    let completion = Completion {
        summary: feedback.summary.trim().to_string(),
        strengths: feedback.strengths,
        improvements: feedback.improvements,
        next_steps: feedback.next_steps,
        duration_minutes: feedback.minutes,
    };
    let workout = ctx
        .dispatcher
        .complete_workout(workout.local_key, completion)
        .await?;
    println!("Completed {}: {}", workout.reference, workout.fields.name);
    Ok(workout)
}

pub async fn cancel(ctx: &Context, id: &str) -> Result<Workout> {
    let workout = ctx.resolve_workout(id).await?;
    check_finishable(&workout, WorkoutStatus::Cancelled)?;

    let workout = ctx
        .dispatcher
        .update_workout(
            workout.local_key,
            WorkoutPatch::status(WorkoutStatus::Cancelled),
        )
        .await?;
    println!("Cancelled {}", workout.reference);
    Ok(workout)
}

pub async fn remove(ctx: &Context, id: &str) -> Result<()> {
    let workout = ctx.resolve_workout(id).await?;
    ctx.dispatcher.delete_workout(workout.local_key).await?;
    println!("Deleted {}", workout.reference);
    Ok(())
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(lift_core::Error::from)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
#[path = "workout_tests.rs"]
mod tests;
