// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use lift_core::{SetFields, SetPatch, SetRecord};

use super::Context;
use crate::cli::SetArgs;
use crate::error::Result;

/// Display name for an exercise id: `bench-press` becomes `Bench Press`.
pub fn exercise_display_name(exercise_id: &str) -> String {
    exercise_id
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub async fn add(
    ctx: &Context,
    workout_id: &str,
    exercise: String,
    name: Option<String>,
    args: SetArgs,
) -> Result<SetRecord> {
    let (workout, order) = {
        let db = ctx.db.lock().await;
        let workout = db.resolve_workout(workout_id)?;
        let order = db.next_set_order(workout.local_key)?;
        (workout, order)
    };

    let name = name.unwrap_or_else(|| exercise_display_name(&exercise));
    let mut fields = SetFields::new(exercise, name, args.reps.unwrap_or(0), order);
    fields.weight = args.weight;
    fields.reps_in_reserve = args.rir.unwrap_or(0);
    fields.duration_secs = args.secs;
    fields.notes = args.notes;

    let set = ctx.dispatcher.add_set(workout.local_key, fields).await?;
    println!(
        "Logged {} on {}: {} x {}",
        set.reference, workout.reference, set.fields.exercise_name, set.fields.reps
    );
    Ok(set)
}

pub async fn edit(ctx: &Context, id: &str, args: SetArgs) -> Result<SetRecord> {
    let set = ctx.resolve_set(id).await?;
    let patch = SetPatch {
        weight: args.weight,
        reps: args.reps,
        reps_in_reserve: args.rir,
        duration_secs: args.secs,
        notes: args.notes,
        order_index: None,
    };
    let set = ctx.dispatcher.update_set(set.local_key, patch).await?;
    println!("Updated {}", set.reference);
    Ok(set)
}

pub async fn remove(ctx: &Context, id: &str) -> Result<()> {
    let set = ctx.resolve_set(id).await?;
    ctx.dispatcher.delete_set(set.local_key).await?;
    println!("Deleted {}", set.reference);
    Ok(())
}

#[cfg(test)]
#[path = "set_tests.rs"]
mod tests;
