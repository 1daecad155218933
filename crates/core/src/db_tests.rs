// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::queue::{Operation, MAX_RETRIES};
use crate::workout::{Completion, WorkoutStatus};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
}

fn test_workout(name: &str) -> WorkoutFields {
    WorkoutFields::new("user-1", name, date())
}

fn test_set(exercise: &str, order: u32) -> SetFields {
    SetFields::new(exercise, exercise.to_uppercase(), 5, order).with_weight(100.0)
}

#[test]
fn save_and_get_workout() {
    let db = Database::open_in_memory().unwrap();
    let saved = db.save_workout(&test_workout("Push"), None).unwrap();

    let retrieved = db.get_workout(saved.local_key).unwrap();
    assert_eq!(retrieved.fields.name, "Push");
    assert_eq!(retrieved.reference, EntityRef::Temporary(saved.local_key));
    assert_eq!(retrieved.sync_status, SyncStatus::Pending);
    assert_eq!(retrieved.fields.status, WorkoutStatus::InProgress);
}

#[test]
fn save_confirmed_workout_is_synced() {
    let db = Database::open_in_memory().unwrap();
    let saved = db.save_workout(&test_workout("Pull"), Some("wo-1")).unwrap();

    assert_eq!(saved.reference, EntityRef::Confirmed("wo-1".into()));
    assert_eq!(saved.sync_status, SyncStatus::Synced);
}

#[test]
fn local_keys_are_unique_and_not_reused() {
    let db = Database::open_in_memory().unwrap();
    let first = db.save_workout(&test_workout("A"), None).unwrap();
    db.delete_workout(first.local_key).unwrap();
    let second = db.save_workout(&test_workout("B"), None).unwrap();

    assert!(second.local_key > first.local_key);
}

#[test]
fn get_missing_workout_is_not_found() {
    let db = Database::open_in_memory().unwrap();
    assert!(matches!(db.get_workout(99), Err(Error::WorkoutNotFound(_))));
    assert!(db.find_workout(99).unwrap().is_none());
}

#[test]
fn list_workouts_filters_by_owner() {
    let db = Database::open_in_memory().unwrap();
    db.save_workout(&test_workout("Mine"), None).unwrap();
    db.save_workout(&WorkoutFields::new("user-2", "Theirs", date()), None)
        .unwrap();

    let mine = db.list_workouts("user-1").unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].fields.name, "Mine");
}

#[test]
fn update_workout_marks_pending() {
    let db = Database::open_in_memory().unwrap();
    let saved = db.save_workout(&test_workout("Legs"), Some("wo-3")).unwrap();

    let patch = WorkoutPatch {
        name: Some("Leg day".into()),
        ..Default::default()
    };
    let updated = db.update_workout(saved.local_key, &patch).unwrap();

    assert_eq!(updated.fields.name, "Leg day");
    assert_eq!(updated.sync_status, SyncStatus::Pending);
    assert_eq!(updated.reference, EntityRef::Confirmed("wo-3".into()));
}

#[test]
fn completion_round_trips_through_storage() {
    let db = Database::open_in_memory().unwrap();
    let saved = db.save_workout(&test_workout("Full body"), None).unwrap();
    let completion = Completion {
        summary: "Good pace".into(),
        strengths: vec!["consistency".into()],
        improvements: vec!["depth on squats".into()],
        next_steps: vec!["add 2.5kg".into()],
        duration_minutes: Some(48),
    };

    db.update_workout(saved.local_key, &WorkoutPatch::complete(completion.clone()))
        .unwrap();

    let retrieved = db.get_workout(saved.local_key).unwrap();
    assert_eq!(retrieved.fields.status, WorkoutStatus::Completed);
    assert_eq!(retrieved.fields.completion, Some(completion));
}

#[test]
fn active_workouts_exclude_synced_completed() {
    let db = Database::open_in_memory().unwrap();
    let done = db.save_workout(&test_workout("Done"), Some("wo-1")).unwrap();
    db.update_workout(done.local_key, &WorkoutPatch::status(WorkoutStatus::Completed))
        .unwrap();
    db.save_workout(&test_workout("Ongoing"), None).unwrap();

    // Completed but not yet synced is still active
    assert_eq!(db.list_active_workouts("user-1").unwrap().len(), 2);

    db.set_workout_sync_status(done.local_key, SyncStatus::Synced)
        .unwrap();
    let active = db.list_active_workouts("user-1").unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].fields.name, "Ongoing");
}

#[test]
fn delete_workout_cascades_sets() {
    let db = Database::open_in_memory().unwrap();
    let workout = db.save_workout(&test_workout("Push"), None).unwrap();
    let set = db
        .save_set(&test_set("bench", 0), workout.local_key, None)
        .unwrap();
    db.save_set(&test_set("dip", 1), workout.local_key, None)
        .unwrap();

    db.delete_workout(workout.local_key).unwrap();

    assert!(db.find_workout(workout.local_key).unwrap().is_none());
    assert!(db.find_set(set.local_key).unwrap().is_none());
    assert!(db.list_sets(workout.local_key).unwrap().is_empty());
}

#[test]
fn delete_missing_workout_fails() {
    let db = Database::open_in_memory().unwrap();
    assert!(matches!(
        db.delete_workout(7),
        Err(Error::WorkoutNotFound(_))
    ));
}

#[test]
fn save_set_requires_parent() {
    let db = Database::open_in_memory().unwrap();
    let err = db.save_set(&test_set("row", 0), 42, None).unwrap_err();
    assert!(matches!(err, Error::WorkoutNotFound(_)));
}

#[test]
fn sets_listed_in_order() {
    let db = Database::open_in_memory().unwrap();
    let workout = db.save_workout(&test_workout("Pull"), None).unwrap();
    db.save_set(&test_set("row", 1), workout.local_key, None)
        .unwrap();
    db.save_set(&test_set("chin", 0), workout.local_key, None)
        .unwrap();

    let sets = db.list_sets(workout.local_key).unwrap();
    let names: Vec<_> = sets.iter().map(|s| s.fields.exercise_id.as_str()).collect();
    assert_eq!(names, vec!["chin", "row"]);
    assert_eq!(db.next_set_order(workout.local_key).unwrap(), 2);
}

#[test]
fn next_set_order_starts_at_zero() {
    let db = Database::open_in_memory().unwrap();
    let workout = db.save_workout(&test_workout("Empty"), None).unwrap();
    assert_eq!(db.next_set_order(workout.local_key).unwrap(), 0);
}

#[test]
fn update_and_delete_set() {
    let db = Database::open_in_memory().unwrap();
    let workout = db.save_workout(&test_workout("Push"), None).unwrap();
    let set = db
        .save_set(&test_set("bench", 0), workout.local_key, None)
        .unwrap();

    let patch = SetPatch {
        reps: Some(3),
        reps_in_reserve: Some(1),
        ..Default::default()
    };
    let updated = db.update_set(set.local_key, &patch).unwrap();
    assert_eq!(updated.fields.reps, 3);
    assert_eq!(updated.fields.reps_in_reserve, 1);
    assert_eq!(updated.fields.weight, Some(100.0));

    db.delete_set(set.local_key).unwrap();
    assert!(matches!(
        db.delete_set(set.local_key),
        Err(Error::SetNotFound(_))
    ));
}

#[test]
fn enqueue_and_list_in_order() {
    let db = Database::open_in_memory().unwrap();
    let workout = db.save_workout(&test_workout("Push"), None).unwrap();
    let temp = workout.reference.clone();

    let first = db
        .enqueue(
            workout.local_key,
            &temp,
            &Mutation::CreateWorkout {
                fields: workout.fields.clone(),
            },
        )
        .unwrap();
    let second = db
        .enqueue(
            workout.local_key,
            &temp,
            &Mutation::UpdateWorkout {
                patch: WorkoutPatch::status(WorkoutStatus::Completed),
            },
        )
        .unwrap();

    let entries = db.list_queue(None).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, first);
    assert_eq!(entries[1].id, second);
    assert_eq!(entries[0].operation, Operation::Create);
    assert_eq!(entries[1].operation, Operation::Update);
    assert_eq!(entries[0].entity_type, EntityType::Workout);
    assert_eq!(entries[0].status, QueueStatus::Pending);
    assert_eq!(entries[0].retry_count, 0);
    assert_eq!(entries[0].reference, temp);
}

#[test]
fn list_queue_filters_by_status() {
    let db = Database::open_in_memory().unwrap();
    let a = db
        .enqueue(1, &EntityRef::Confirmed("wo-1".into()), &Mutation::DeleteWorkout)
        .unwrap();
    db.enqueue(2, &EntityRef::Confirmed("wo-2".into()), &Mutation::DeleteWorkout)
        .unwrap();

    db.update_queue_entry(a, &QueuePatch::status(QueueStatus::Failed))
        .unwrap();

    assert_eq!(db.list_queue(Some(QueueStatus::Failed)).unwrap().len(), 1);
    assert_eq!(db.list_queue(Some(QueueStatus::Pending)).unwrap().len(), 1);
}

#[test]
fn update_queue_entry_patches_bookkeeping() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .enqueue(1, &EntityRef::Temporary(1), &Mutation::DeleteWorkout)
        .unwrap();

    db.update_queue_entry(
        id,
        &QueuePatch {
            status: Some(QueueStatus::Pending),
            retry_count: Some(2),
            last_error: Some(Some("connection reset".into())),
        },
    )
    .unwrap();

    let entry = db.get_queue_entry(id).unwrap();
    assert_eq!(entry.retry_count, 2);
    assert_eq!(entry.last_error.as_deref(), Some("connection reset"));

    db.update_queue_entry(
        id,
        &QueuePatch {
            last_error: Some(None),
            ..Default::default()
        },
    )
    .unwrap();
    let entry = db.get_queue_entry(id).unwrap();
    assert!(entry.last_error.is_none());
    assert_eq!(entry.retry_count, 2);
}

#[test]
fn update_missing_queue_entry_fails() {
    let db = Database::open_in_memory().unwrap();
    let err = db
        .update_queue_entry(5, &QueuePatch::status(QueueStatus::Failed))
        .unwrap_err();
    assert!(matches!(err, Error::QueueEntryNotFound(5)));
}

#[test]
fn reconcile_rewrites_workout_and_queue() {
    let mut db = Database::open_in_memory().unwrap();
    let workout = db.save_workout(&test_workout("Push"), None).unwrap();
    db.enqueue(
        workout.local_key,
        &workout.reference,
        &Mutation::UpdateWorkout {
            patch: WorkoutPatch::default(),
        },
    )
    .unwrap();

    assert!(db.reconcile_workout(workout.local_key, "wo-10").unwrap());

    let confirmed = EntityRef::Confirmed("wo-10".into());
    assert_eq!(db.get_workout(workout.local_key).unwrap().reference, confirmed);
    assert_eq!(db.list_queue(None).unwrap()[0].reference, confirmed);
}

#[test]
fn reconcile_missing_workout_returns_false() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(!db.reconcile_workout(3, "wo-1").unwrap());
}

#[test]
fn reconcile_set_only_touches_set_entries() {
    let mut db = Database::open_in_memory().unwrap();
    let workout = db.save_workout(&test_workout("Push"), None).unwrap();
    let set = db
        .save_set(&test_set("bench", 0), workout.local_key, None)
        .unwrap();
    // A workout entry that happens to share the same numeric key
    db.enqueue(set.local_key, &EntityRef::Temporary(set.local_key), &Mutation::DeleteWorkout)
        .unwrap();
    db.enqueue(
        set.local_key,
        &set.reference,
        &Mutation::UpdateSet {
            patch: SetPatch::default(),
        },
    )
    .unwrap();

    assert!(db.reconcile_set(set.local_key, "set-4").unwrap());

    let entries = db.list_queue(None).unwrap();
    assert_eq!(entries[0].reference, EntityRef::Temporary(set.local_key));
    assert_eq!(entries[1].reference, EntityRef::Confirmed("set-4".into()));
}

#[test]
fn has_queued_and_discard() {
    let db = Database::open_in_memory().unwrap();
    let temp = EntityRef::Temporary(1);
    let a = db.enqueue(1, &temp, &Mutation::DeleteWorkout).unwrap();
    db.enqueue(1, &temp, &Mutation::DeleteWorkout).unwrap();
    db.enqueue(2, &EntityRef::Temporary(2), &Mutation::DeleteWorkout)
        .unwrap();

    assert!(db.has_queued(EntityType::Workout, 1).unwrap());
    assert!(!db.has_queued(EntityType::Set, 1).unwrap());
    assert!(!db.has_in_flight(EntityType::Workout, 1).unwrap());

    // In-flight entries survive a discard
    db.update_queue_entry(a, &QueuePatch::status(QueueStatus::Processing))
        .unwrap();
    assert!(db.has_in_flight(EntityType::Workout, 1).unwrap());
    assert_eq!(db.discard_queued(EntityType::Workout, 1).unwrap(), 1);
    assert!(db.has_queued(EntityType::Workout, 1).unwrap());
    assert!(db.has_queued(EntityType::Workout, 2).unwrap());
}

#[test]
fn queue_counts_reflect_status() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.queue_counts().unwrap().is_empty());

    let temp = EntityRef::Temporary(1);
    let a = db.enqueue(1, &temp, &Mutation::DeleteWorkout).unwrap();
    let b = db.enqueue(1, &temp, &Mutation::DeleteWorkout).unwrap();
    db.enqueue(1, &temp, &Mutation::DeleteWorkout).unwrap();
    db.update_queue_entry(a, &QueuePatch::status(QueueStatus::Failed))
        .unwrap();
    db.update_queue_entry(b, &QueuePatch::status(QueueStatus::Processing))
        .unwrap();

    let counts = db.queue_counts().unwrap();
    assert_eq!(
        counts,
        QueueCounts {
            pending: 2,
            failed: 1,
            total: 3
        }
    );
}

#[test]
fn reset_failed_restores_budget() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .enqueue(1, &EntityRef::Temporary(1), &Mutation::DeleteWorkout)
        .unwrap();
    db.update_queue_entry(
        id,
        &QueuePatch {
            status: Some(QueueStatus::Failed),
            retry_count: Some(MAX_RETRIES),
            last_error: Some(Some("network down".into())),
        },
    )
    .unwrap();

    assert_eq!(db.reset_failed().unwrap(), 1);
    let entry = db.get_queue_entry(id).unwrap();
    assert_eq!(entry.status, QueueStatus::Pending);
    assert_eq!(entry.retry_count, 0);
    assert!(entry.last_error.is_none());
}

#[test]
fn recover_interrupted_requeues_processing() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .enqueue(1, &EntityRef::Temporary(1), &Mutation::DeleteWorkout)
        .unwrap();
    db.update_queue_entry(id, &QueuePatch::status(QueueStatus::Processing))
        .unwrap();

    assert_eq!(db.recover_interrupted().unwrap(), 1);
    assert_eq!(db.get_queue_entry(id).unwrap().status, QueueStatus::Pending);
}

#[test]
fn migrations_can_run_again() {
    let db = Database::open_in_memory().unwrap();
    let workout = db.save_workout(&test_workout("Push"), None).unwrap();

    run_migrations(&db.conn).unwrap();

    assert_eq!(db.get_workout(workout.local_key).unwrap().fields.name, "Push");
}

#[test]
fn writes_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("liftlog.db");

    let key = {
        let db = Database::open(&path).unwrap();
        let workout = db.save_workout(&test_workout("Persisted"), None).unwrap();
        db.save_set(&test_set("squat", 0), workout.local_key, None)
            .unwrap();
        db.enqueue(
            workout.local_key,
            &workout.reference,
            &Mutation::CreateWorkout {
                fields: workout.fields.clone(),
            },
        )
        .unwrap();
        workout.local_key
    };

    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_workout(key).unwrap().fields.name, "Persisted");
    assert_eq!(db.list_sets(key).unwrap().len(), 1);
    assert_eq!(db.queue_counts().unwrap().pending, 1);
}

#[test]
fn corrupted_status_is_reported() {
    let db = Database::open_in_memory().unwrap();
    let workout = db.save_workout(&test_workout("Push"), None).unwrap();
    db.conn
        .execute(
            "UPDATE workouts SET status = 'paused' WHERE local_key = ?1",
            params![workout.local_key],
        )
        .unwrap();

    assert!(db.get_workout(workout.local_key).is_err());
}

#[test]
fn resolve_by_displayed_identity() {
    let db = Database::open_in_memory().unwrap();
    let temp = db.save_workout(&test_workout("Push"), None).unwrap();
    let confirmed = db.save_workout(&test_workout("Pull"), Some("wo-9")).unwrap();
    let set = db
        .save_set(&test_set("squat", 0), confirmed.local_key, Some("set-3"))
        .unwrap();

    let by_local = db.resolve_workout(&temp.reference.to_string()).unwrap();
    assert_eq!(by_local.local_key, temp.local_key);
    assert_eq!(db.resolve_workout("wo-9").unwrap().local_key, confirmed.local_key);
    assert_eq!(db.resolve_set("set-3").unwrap().local_key, set.local_key);
    assert_eq!(
        db.resolve_set(&format!("local_{}", set.local_key))
            .unwrap()
            .reference,
        EntityRef::Confirmed("set-3".into())
    );
}

#[test]
fn resolve_unknown_identity_is_not_found() {
    let db = Database::open_in_memory().unwrap();
    db.save_workout(&test_workout("Push"), None).unwrap();

    assert!(matches!(
        db.resolve_workout("wo-404"),
        Err(Error::WorkoutNotFound(id)) if id == "wo-404"
    ));
    assert!(matches!(db.resolve_workout("local_x"), Err(Error::WorkoutNotFound(_))));
    assert!(matches!(db.resolve_set("local_7"), Err(Error::SetNotFound(_))));
}
