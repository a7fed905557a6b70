// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for planning and execution

use std::sync::Arc;
use thiserror::Error;
use waymark_core::StateError;

/// Plan-time failures. Raised before any lock is taken and never retried;
/// a failed plan has no side effects.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("no migration \"{0}\" defined")]
    TargetNotFound(String),

    #[error("migration \"{0}\" has no reverse operation and cannot be taken down")]
    NotReversible(String),

    #[error(transparent)]
    State(#[from] StateError),
}

/// Terminal failure of a run.
///
/// Errors are shared behind `Arc` because the same failure also travels
/// through the progress stream.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Lock acquisition failed; no migration code was invoked.
    #[error("could not acquire migration lock: {0}")]
    Lock(Arc<StateError>),

    /// A migration operation or its storage mutation failed. Remaining
    /// plan entries were not executed; already-applied entries stay
    /// applied.
    #[error("migration \"{name}\" failed: {cause}")]
    Migration {
        name: String,
        cause: Arc<anyhow::Error>,
    },

    /// Unlock failed after an otherwise clean run. When execution itself
    /// failed, that failure stays the terminal error and the unlock
    /// failure is reported only through the progress stream.
    #[error("could not remove migration lock: {0}")]
    Unlock(Arc<StateError>),
}

impl RunError {
    /// Whether the run lost the race for the advisory lock.
    pub fn is_contention(&self) -> bool {
        matches!(self, RunError::Lock(e) if matches!(**e, StateError::LockHeld))
    }
}
