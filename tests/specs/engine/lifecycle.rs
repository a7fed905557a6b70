// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Full run lifecycle over the in-memory backend: event ordering, halting
//! on failure, skip semantics, and round trips.

use crate::prelude::*;
use std::sync::Arc;
use waymark_core::{Direction, RecordStatus, StateStore, Status};
use waymark_state::MemoryStateStore;

#[tokio::test]
async fn successful_run_emits_lock_entries_unlock() {
    let store = MemoryStateStore::new();
    let migrator = migrator(
        Arc::new(store.clone()),
        vec![reversible("001-a"), reversible("002-b")],
    );

    let (result, kinds) = run_collecting(&migrator, Direction::Up, None).await;

    let summary = result.unwrap();
    assert_eq!(summary.applied, 2);
    assert_eq!(
        kinds,
        vec![
            "lock-acquired",
            "migration-started",
            "migration-finished",
            "migration-started",
            "migration-finished",
            "unlock-succeeded",
        ]
    );
    assert!(!store.is_locked());
}

#[tokio::test]
async fn failure_halts_and_still_unlocks() {
    let store = MemoryStateStore::new();
    let migrator = migrator(
        Arc::new(store.clone()),
        vec![reversible("001-a"), failing("002-b"), reversible("003-c")],
    );

    let (result, kinds) = run_collecting(&migrator, Direction::Up, None).await;

    assert!(result.is_err());
    assert_eq!(
        kinds,
        vec![
            "lock-acquired",
            "migration-started",
            "migration-finished",
            "migration-started",
            "migration-failed",
            "unlock-succeeded",
        ]
    );
    // Only the entry that finished before the failure is recorded.
    let records = store.records().await.unwrap();
    assert_eq!(record_names(&records), vec!["001-a"]);
    assert!(!store.is_locked());
}

#[tokio::test]
async fn skip_records_without_rerunning() {
    let store = MemoryStateStore::new();
    let migrator = migrator(
        Arc::new(store.clone()),
        vec![skipping("001-a"), reversible("002-b")],
    );

    let (result, _) = run_collecting(&migrator, Direction::Up, None).await;
    let summary = result.unwrap();
    assert_eq!(summary.applied, 1);
    assert_eq!(summary.skipped, 1);

    let records = store.records().await.unwrap();
    assert_eq!(records[0].status, RecordStatus::Skipped);

    // A second run finds nothing pending, including the skipped entry.
    let (result, kinds) = run_collecting(&migrator, Direction::Up, None).await;
    assert_eq!(result.unwrap().total(), 0);
    assert_eq!(kinds, vec!["lock-acquired", "unlock-succeeded"]);
}

#[tokio::test]
async fn up_then_down_restores_empty_state() {
    let store = MemoryStateStore::new();
    let migrator = migrator(
        Arc::new(store.clone()),
        vec![reversible("001-a"), reversible("002-b")],
    );

    run_collecting(&migrator, Direction::Up, None).await.0.unwrap();
    assert_eq!(store.records().await.unwrap().len(), 2);

    let (result, _) = run_collecting(&migrator, Direction::Down, None).await;
    assert_eq!(result.unwrap().applied, 2);
    assert!(store.records().await.unwrap().is_empty());

    for entry in migrator.state().await.unwrap() {
        assert_eq!(entry.status, Status::Pending);
    }
}

#[tokio::test]
async fn exclusive_target_bounds_both_directions() {
    let store = MemoryStateStore::new();
    let migrator = migrator(
        Arc::new(store.clone()),
        vec![reversible("001-a"), reversible("002-b"), reversible("003-c")],
    );

    run_collecting(&migrator, Direction::Up, Some("003-c"))
        .await
        .0
        .unwrap();
    let records = store.records().await.unwrap();
    assert_eq!(record_names(&records), vec!["001-a", "002-b"]);

    run_collecting(&migrator, Direction::Down, Some("001-a"))
        .await
        .0
        .unwrap();
    let records = store.records().await.unwrap();
    assert_eq!(record_names(&records), vec!["001-a"]);
}

#[tokio::test]
async fn two_subscribers_see_one_execution() {
    let store = MemoryStateStore::new();
    let migrator = migrator(Arc::new(store.clone()), vec![reversible("001-a")]);

    let run = migrator.run(Direction::Up, None).await.unwrap();
    let mut first = run.subscribe();
    let mut second = run.subscribe();
    run.wait().await.unwrap();

    assert_eq!(drain_kinds(&mut first), drain_kinds(&mut second));
    assert_eq!(store.records().await.unwrap().len(), 1);
}
