// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers for behavioral specifications.
//!
//! Builds migrators over arbitrary state backends and drains event streams
//! so specs can assert on the exact sequence a run produced.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::sync::Arc;
use tokio::sync::broadcast;
use waymark_core::{
    Direction, InlineMigration, Migration, MigrationRegistry, Outcome, Progress, Record,
    StateStore,
};
use waymark_engine::{Migrator, RunSummary};

/// A reversible migration whose operations always succeed.
pub fn reversible(name: &str) -> Arc<dyn Migration> {
    Arc::new(
        InlineMigration::new(name, || async { Ok(Outcome::Applied) })
            .with_down(|| async { Ok(Outcome::Applied) }),
    )
}

/// A forward-only migration.
pub fn forward(name: &str) -> Arc<dyn Migration> {
    Arc::new(InlineMigration::new(name, || async {
        Ok(Outcome::Applied)
    }))
}

/// A migration that asks for a skipped record instead of running.
pub fn skipping(name: &str) -> Arc<dyn Migration> {
    Arc::new(InlineMigration::new(name, || async { Ok(Outcome::Skip) }))
}

/// A migration whose forward operation always fails.
pub fn failing(name: &str) -> Arc<dyn Migration> {
    Arc::new(InlineMigration::new(name, || async {
        anyhow::bail!("operation failed")
    }))
}

pub fn migrator(store: Arc<dyn StateStore>, migrations: Vec<Arc<dyn Migration>>) -> Migrator {
    let mut registry = MigrationRegistry::new();
    for migration in migrations {
        registry.add(migration);
    }
    Migrator::new(registry, store)
}

/// Run a full migration in the given direction and return the summary plus
/// the event kinds observed, in order.
pub async fn run_collecting(
    migrator: &Migrator,
    direction: Direction,
    to: Option<&str>,
) -> (Result<RunSummary, waymark_engine::RunError>, Vec<&'static str>) {
    let run = migrator.run(direction, to).await.expect("plan");
    let mut events = run.subscribe();
    let result = run.wait().await;
    (result, drain_kinds(&mut events))
}

/// Drain every buffered event from a receiver after the run completed.
pub fn drain_kinds(events: &mut broadcast::Receiver<Progress>) -> Vec<&'static str> {
    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        kinds.push(event.kind());
    }
    kinds
}

pub fn record_names(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}
