// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end runs over the SQLite backend.

use crate::prelude::*;
use std::sync::Arc;
use waymark_core::{Direction, StateStore, Status};
use waymark_state_sql::SqlStateStore;

#[tokio::test]
async fn up_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");

    {
        let store = SqlStateStore::open(&path, "migrations").unwrap();
        let migrator = migrator(
            Arc::new(store),
            vec![reversible("001-a"), reversible("002-b")],
        );
        let (result, _) = run_collecting(&migrator, Direction::Up, None).await;
        assert_eq!(result.unwrap().applied, 2);
    }

    let store = SqlStateStore::open(&path, "migrations").unwrap();
    store.setup().await.unwrap();
    let records = store.records().await.unwrap();
    assert_eq!(record_names(&records), vec!["001-a", "002-b"]);
}

#[tokio::test]
async fn down_deletes_records() {
    let store = SqlStateStore::in_memory("migrations").unwrap();
    let migrator = migrator(
        Arc::new(store),
        vec![reversible("001-a"), reversible("002-b")],
    );

    run_collecting(&migrator, Direction::Up, None).await.0.unwrap();
    run_collecting(&migrator, Direction::Down, Some("001-a"))
        .await
        .0
        .unwrap();

    let state = migrator.state().await.unwrap();
    assert_eq!(state[0].status, Status::Finished);
    assert_eq!(state[1].status, Status::Pending);
}

#[tokio::test]
async fn run_releases_lock_for_the_next_run() {
    let store = SqlStateStore::in_memory("migrations").unwrap();
    let migrator = migrator(Arc::new(store), vec![failing("001-a")]);

    let (result, _) = run_collecting(&migrator, Direction::Up, None).await;
    assert!(result.is_err());

    // The failed run unlocked, so a retry gets the lock again.
    let (result, kinds) = run_collecting(&migrator, Direction::Up, None).await;
    assert!(result.is_err());
    assert_eq!(kinds[0], "lock-acquired");
}
