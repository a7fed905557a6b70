// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock contention between independent migrator instances sharing one
//! backing store, the situation the advisory lock exists for.

use crate::prelude::*;
use std::sync::Arc;
use waymark_core::{Direction, StateStore};
use waymark_state::MemoryStateStore;
use waymark_state_sql::SqlStateStore;

#[tokio::test]
async fn second_migrator_is_turned_away_while_first_holds_the_lock() {
    let store = MemoryStateStore::new();
    let first = migrator(Arc::new(store.clone()), vec![reversible("001-a")]);
    let second = migrator(Arc::new(store.clone()), vec![reversible("001-a")]);

    store.lock().await.unwrap();
    let (result, kinds) = run_collecting(&second, Direction::Up, None).await;
    assert!(result.unwrap_err().is_contention());
    assert_eq!(kinds, vec!["lock-failed"]);
    store.unlock().await.unwrap();

    // Once released, either migrator can proceed.
    let (result, _) = run_collecting(&first, Direction::Up, None).await;
    assert_eq!(result.unwrap().applied, 1);
}

#[tokio::test]
async fn sqlite_lock_excludes_across_stores_on_one_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");

    let holder = SqlStateStore::open(&path, "migrations").unwrap();
    holder.setup().await.unwrap();
    holder.lock().await.unwrap();

    let contender = SqlStateStore::open(&path, "migrations").unwrap();
    let migrator = migrator(Arc::new(contender), vec![reversible("001-a")]);
    let (result, _) = run_collecting(&migrator, Direction::Up, None).await;
    assert!(result.unwrap_err().is_contention());

    holder.unlock().await.unwrap();
    let (result, _) = run_collecting(&migrator, Direction::Up, None).await;
    assert_eq!(result.unwrap().applied, 1);
}
