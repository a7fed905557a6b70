// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The migration engine

use crate::error::{PlanError, RunError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::OnceCell;
use waymark_core::{
    Clock, Direction, MigrationRegistry, Outcome, PlanEntry, Progress, Record, RecordStatus,
    StateEntry, StateStore, Status, SystemClock,
};

/// Combines a registry with a state store: merges both into a logical
/// state, computes plans, and executes them under the store's lock.
///
/// Each migrator owns its setup memo, so several instances in one process
/// stay independent.
pub struct Migrator {
    registry: MigrationRegistry,
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    setup: OnceCell<()>,
}

impl Migrator {
    pub fn new(registry: MigrationRegistry, store: Arc<dyn StateStore>) -> Self {
        Self {
            registry,
            store,
            clock: Arc::new(SystemClock),
            setup: OnceCell::new(),
        }
    }

    /// Replace the wall clock, for deterministic record timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run store setup at most once over this migrator's lifetime.
    async fn ensure_setup(&self) -> Result<(), waymark_core::StateError> {
        self.setup
            .get_or_try_init(|| self.store.setup())
            .await
            .map(|_| ())
    }

    /// Logical state: one entry per registered migration in sorted order,
    /// with `Pending` for every name the store has no record of.
    pub async fn state(&self) -> Result<Vec<StateEntry>, waymark_core::StateError> {
        self.ensure_setup().await?;
        let records = self.store.records().await?;

        let mut by_name: HashMap<String, Status> = records
            .into_iter()
            .map(|r| (r.name, r.status.into()))
            .collect();

        Ok(self
            .registry
            .sorted()
            .into_iter()
            .map(|migration| {
                let status = by_name
                    .remove(migration.name())
                    .unwrap_or(Status::Pending);
                StateEntry { migration, status }
            })
            .collect())
    }

    /// Compute the ordered plan for one direction, up to an exclusive
    /// target. Side-effect free; safe to call repeatedly for previews.
    ///
    /// `up` collects pending migrations in ascending name order; `down`
    /// collects finished migrations in descending order, rejecting the
    /// whole plan if any candidate lacks a reverse operation. Skipped
    /// migrations are never selected in either direction.
    pub async fn plan(
        &self,
        direction: Direction,
        to: Option<&str>,
    ) -> Result<Vec<PlanEntry>, PlanError> {
        let state = self.state().await?;

        if let Some(target) = to {
            if !state.iter().any(|e| e.migration.name() == target) {
                return Err(PlanError::TargetNotFound(target.to_string()));
            }
        }

        let mut plan = Vec::new();
        match direction {
            Direction::Up => {
                for entry in &state {
                    if to == Some(entry.migration.name()) {
                        break;
                    }
                    if entry.status == Status::Pending {
                        plan.push(PlanEntry {
                            migration: Arc::clone(&entry.migration),
                            direction,
                        });
                    }
                }
            }
            Direction::Down => {
                for entry in state.iter().rev() {
                    if to == Some(entry.migration.name()) {
                        break;
                    }
                    if entry.status == Status::Finished {
                        if !entry.migration.reversible() {
                            return Err(PlanError::NotReversible(
                                entry.migration.name().to_string(),
                            ));
                        }
                        plan.push(PlanEntry {
                            migration: Arc::clone(&entry.migration),
                            direction,
                        });
                    }
                }
            }
        }
        Ok(plan)
    }

    /// Compute the plan and prepare a run.
    ///
    /// Plan errors abort here, before any lock. The returned handle hands
    /// out event subscriptions without starting anything; execution
    /// happens exactly once, inside [`MigrationRun::wait`].
    pub async fn run(
        &self,
        direction: Direction,
        to: Option<&str>,
    ) -> Result<MigrationRun<'_>, PlanError> {
        let plan = self.plan(direction, to).await?;
        // Capacity covers a full run's events so subscribers that only
        // drain after completion still see everything.
        let (events, _) = broadcast::channel(plan.len() * 2 + 4);
        Ok(MigrationRun {
            migrator: self,
            plan,
            events,
        })
    }

    /// Release store resources. Running after `stop` is undefined.
    pub async fn stop(&self) -> Result<(), waymark_core::StateError> {
        self.store.stop().await
    }
}

/// Totals for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub applied: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.applied + self.skipped
    }
}

/// A prepared run: a fixed plan plus a multicast progress channel.
pub struct MigrationRun<'a> {
    migrator: &'a Migrator,
    plan: Vec<PlanEntry>,
    events: broadcast::Sender<Progress>,
}

impl MigrationRun<'_> {
    /// The plan this run will execute, in execution order.
    pub fn plan(&self) -> &[PlanEntry] {
        &self.plan
    }

    /// Subscribe to progress events. Any number of subscribers observe
    /// the same ordered sequence; subscribing never triggers execution.
    pub fn subscribe(&self) -> broadcast::Receiver<Progress> {
        self.events.subscribe()
    }

    /// Execute the plan under the store's lock.
    ///
    /// Consuming `self` makes re-execution impossible; receivers handed
    /// out earlier stay live until the last event. Entries run strictly
    /// in plan order and each operation is awaited to completion, with
    /// the record mutation persisted before the corresponding event is
    /// emitted. The first failure stops the remaining entries; unlock is
    /// attempted regardless, with an execution failure taking priority
    /// over an unlock failure as the terminal error.
    pub async fn wait(self) -> Result<RunSummary, RunError> {
        let MigrationRun {
            migrator,
            plan,
            events,
        } = self;

        match migrator.store.lock().await {
            Ok(()) => {
                tracing::info!("migration lock acquired");
                let _ = events.send(Progress::LockAcquired);
            }
            Err(e) => {
                tracing::warn!(error = %e, "migration lock not acquired");
                let error = Arc::new(e);
                let _ = events.send(Progress::LockFailed {
                    error: Arc::clone(&error),
                });
                return Err(RunError::Lock(error));
            }
        }

        let mut summary = RunSummary::default();
        let mut failure = None;

        for entry in plan {
            tracing::info!(name = entry.name(), direction = %entry.direction, "migration started");
            let _ = events.send(Progress::MigrationStarted {
                entry: entry.clone(),
            });

            match execute_entry(&*migrator.store, &*migrator.clock, &entry).await {
                Ok(Outcome::Applied) => {
                    tracing::info!(name = entry.name(), "migration finished");
                    summary.applied += 1;
                    let _ = events.send(Progress::MigrationFinished { entry });
                }
                Ok(Outcome::Skip) => {
                    tracing::info!(name = entry.name(), "migration skipped");
                    summary.skipped += 1;
                    let _ = events.send(Progress::MigrationSkipped { entry });
                }
                Err(e) => {
                    tracing::error!(name = entry.name(), error = %e, "migration failed");
                    let name = entry.name().to_string();
                    let cause = Arc::new(e);
                    let _ = events.send(Progress::MigrationFailed {
                        entry,
                        error: Arc::clone(&cause),
                    });
                    failure = Some(RunError::Migration { name, cause });
                    break;
                }
            }
        }

        match migrator.store.unlock().await {
            Ok(()) => {
                tracing::info!("migration lock removed");
                let _ = events.send(Progress::UnlockSucceeded);
            }
            Err(e) => {
                tracing::error!(error = %e, "migration lock not removed");
                let error = Arc::new(e);
                let _ = events.send(Progress::UnlockFailed {
                    error: Arc::clone(&error),
                });
                if failure.is_none() {
                    failure = Some(RunError::Unlock(error));
                }
            }
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(summary),
        }
    }
}

/// Run one plan entry and persist its record mutation.
///
/// Persistence happens before the caller emits the corresponding event, so
/// observers reacting to finished/skipped events can trust the store.
async fn execute_entry(
    store: &dyn StateStore,
    clock: &dyn Clock,
    entry: &PlanEntry,
) -> anyhow::Result<Outcome> {
    let outcome = match entry.direction {
        Direction::Up => entry.migration.up().await?,
        Direction::Down => entry.migration.down().await?,
    };

    match (entry.direction, outcome) {
        (Direction::Up, Outcome::Applied) => {
            store
                .save_record(Record {
                    name: entry.name().to_string(),
                    applied_at: clock.now(),
                    status: RecordStatus::Finished,
                })
                .await?;
        }
        (Direction::Up, Outcome::Skip) => {
            store
                .save_record(Record {
                    name: entry.name().to_string(),
                    applied_at: clock.now(),
                    status: RecordStatus::Skipped,
                })
                .await?;
        }
        (Direction::Down, Outcome::Applied) => {
            store.delete_record(entry.name()).await?;
        }
        // A skipped reverse leaves the record in place: nothing was
        // reverted, so the store must keep saying it is applied.
        (Direction::Down, Outcome::Skip) => {}
    }
    Ok(outcome)
}

#[cfg(test)]
#[path = "migrator_tests.rs"]
mod tests;
