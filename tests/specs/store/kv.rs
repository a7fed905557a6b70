// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end runs over the sled backend.

use crate::prelude::*;
use std::sync::Arc;
use waymark_core::{Direction, RecordStatus, StateStore};
use waymark_state_kv::KvStateStore;

#[tokio::test]
async fn up_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state");

    {
        let store = KvStateStore::open(&path, "migrations").unwrap();
        let migrator = migrator(
            Arc::new(store),
            vec![reversible("001-a"), skipping("002-b")],
        );
        let (result, _) = run_collecting(&migrator, Direction::Up, None).await;
        let summary = result.unwrap();
        assert_eq!(summary.total(), 2);
    }

    let store = KvStateStore::open(&path, "migrations").unwrap();
    let records = store.records().await.unwrap();
    assert_eq!(record_names(&records), vec!["001-a", "002-b"]);
    assert_eq!(records[0].status, RecordStatus::Finished);
    assert_eq!(records[1].status, RecordStatus::Skipped);
}

#[tokio::test]
async fn lock_marker_never_surfaces_as_a_record() {
    let store = KvStateStore::temporary("migrations").unwrap();
    let migrator = migrator(Arc::new(store.clone()), vec![reversible("001-a")]);

    run_collecting(&migrator, Direction::Up, None).await.0.unwrap();

    let records = store.records().await.unwrap();
    assert_eq!(record_names(&records), vec!["001-a"]);
}
