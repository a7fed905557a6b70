// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress events emitted during a migration run

use crate::plan::PlanEntry;
use crate::store::StateError;
use std::sync::Arc;

/// Discrete progress events for one run.
///
/// Events are multicast: every subscriber to a run observes the same
/// ordered sequence. Errors are shared behind `Arc` so events stay `Clone`
/// for the broadcast channel.
#[derive(Debug, Clone)]
pub enum Progress {
    LockAcquired,
    LockFailed { error: Arc<StateError> },
    UnlockSucceeded,
    UnlockFailed { error: Arc<StateError> },
    MigrationStarted { entry: PlanEntry },
    MigrationFinished { entry: PlanEntry },
    MigrationSkipped { entry: PlanEntry },
    MigrationFailed { entry: PlanEntry, error: Arc<anyhow::Error> },
}

impl Progress {
    /// Short event name, used for tracing fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Progress::LockAcquired => "lock-acquired",
            Progress::LockFailed { .. } => "lock-failed",
            Progress::UnlockSucceeded => "unlock-succeeded",
            Progress::UnlockFailed { .. } => "unlock-failed",
            Progress::MigrationStarted { .. } => "migration-started",
            Progress::MigrationFinished { .. } => "migration-finished",
            Progress::MigrationSkipped { .. } => "migration-skipped",
            Progress::MigrationFailed { .. } => "migration-failed",
        }
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
