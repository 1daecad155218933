// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use lift_core::{QueueCounts, QueueEntry, SetRecord, SyncStatus, Workout};

/// Maximum line width for wrapped text content (excluding 4-space indent).
const WRAP_WIDTH: usize = 96;

/// Wrap text at word boundaries if it's a single line.
///
/// Multi-line content is returned as-is to preserve user formatting.
pub fn wrap_text(content: &str, width: usize) -> String {
    if content.contains('\n') || content.len() <= width {
        return content.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in content.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Sync marker shown next to a workout: nothing when synced.
fn sync_marker(status: SyncStatus) -> &'static str {
    match status {
        SyncStatus::Synced => "",
        SyncStatus::Pending => " *",
        SyncStatus::Failed => " !",
    }
}

/// Format a single workout line for list output
pub fn format_workout_line(workout: &Workout) -> String {
    format!(
        "- [{}] ({}) {}: {}{}",
        workout.fields.date,
        workout.fields.status,
        workout.reference,
        workout.fields.name,
        sync_marker(workout.sync_status)
    )
}

/// Format a single set line: `  1. Bench Press 8 x 60kg @2 RIR`
pub fn format_set_line(position: usize, set: &SetRecord) -> String {
    let f = &set.fields;
    let mut line = format!("  {}. {} {}", position, f.exercise_name, f.reps);
    if let Some(weight) = f.weight {
        line.push_str(&format!(" x {}kg", weight));
    }
    if let Some(secs) = f.duration_secs {
        line.push_str(&format!(" for {}s", secs));
    }
    if f.reps_in_reserve > 0 {
        line.push_str(&format!(" @{} RIR", f.reps_in_reserve));
    }
    line.push_str(&format!(" ({})", set.reference));
    if let Some(ref notes) = f.notes {
        line.push_str(&format!("\n     {}", notes));
    }
    line
}

fn push_bullets(output: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    output.push(String::new());
    output.push(format!("{}:", title));
    for item in items {
        output.push(format!("  - {}", item));
    }
}

/// Format workout details for the show command
pub fn format_workout_details(workout: &Workout, sets: &[SetRecord]) -> String {
    let f = &workout.fields;
    let mut output = vec![
        format!("{} {}", workout.reference, f.name),
        format!("Date: {}", f.date),
        format!("Status: {}", f.status),
        format!("Sync: {}", workout.sync_status),
    ];
    if f.ai_generated {
        output.push("Planned by: coach".to_string());
    }
    if let Some(ref description) = f.description {
        output.push(String::new());
        output.push("Description:".to_string());
        for line in wrap_text(description, WRAP_WIDTH).lines() {
            output.push(format!("    {}", line));
        }
    }

    output.push(String::new());
    if sets.is_empty() {
        output.push("Sets: none".to_string());
    } else {
        output.push(format!("Sets ({}):", sets.len()));
        output.extend(
            sets.iter()
                .enumerate()
                .map(|(i, set)| format_set_line(i + 1, set)),
        );
    }

    if let Some(ref completion) = f.completion {
        output.push(String::new());
        match completion.duration_minutes {
            Some(minutes) => output.push(format!("Summary ({} min):", minutes)),
            None => output.push("Summary:".to_string()),
        }
        for line in wrap_text(&completion.summary, WRAP_WIDTH).lines() {
            output.push(format!("    {}", line));
        }
        push_bullets(&mut output, "Strengths", &completion.strengths);
        push_bullets(&mut output, "Improvements", &completion.improvements);
        push_bullets(&mut output, "Next steps", &completion.next_steps);
    }

    output.join("\n")
}

/// Format one queue entry for the status command
pub fn format_queue_entry(entry: &QueueEntry) -> String {
    let mut line = format!(
        "  #{} {} {} {} [{}]",
        entry.id, entry.operation, entry.entity_type, entry.reference, entry.status
    );
    if entry.retry_count > 0 {
        line.push_str(&format!(" retries={}", entry.retry_count));
    }
    if let Some(ref err) = entry.last_error {
        line.push_str(&format!("\n      {}", err));
    }
    line
}

/// One-line summary of unsynced changes, or `None` when the queue is empty.
pub fn unsynced_banner(counts: &QueueCounts) -> Option<String> {
    if counts.is_empty() {
        return None;
    }
    let plural = if counts.total == 1 { "" } else { "s" };
    let mut banner = format!("{} unsynced change{}", counts.total, plural);
    if counts.failed > 0 {
        banner.push_str(&format!(
            " ({} failed, run 'liftlog retry')",
            counts.failed
        ));
    }
    Some(banner)
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
