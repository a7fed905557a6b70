// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State store contract
//!
//! Every storage adapter implements [`StateStore`]. The engine executes
//! under the assumption that `lock` provides real mutual exclusion,
//! enforced by the backend's atomic create-if-absent primitive, not by
//! coordination inside the engine itself. Record creation carries its own
//! per-name conditional-write guard on top of the coarse lock.

use crate::record::Record;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by state store operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// The advisory lock marker already exists; another run is in
    /// progress. Distinguishable from infrastructure failure so callers
    /// can tell contention apart from an outage.
    #[error("migration lock already held")]
    LockHeld,

    /// Conditional record create found an existing row for the name.
    #[error("migration record \"{0}\" already created")]
    DuplicateRecord(String),

    /// The underlying resource never became ready within the setup
    /// polling budget.
    #[error("state store not ready after {attempts} poll attempts ({waited:?})")]
    SetupTimeout { attempts: u32, waited: Duration },

    /// Transient backend failure, passed through unchanged.
    #[error("state store unavailable: {0}")]
    Unavailable(String),
}

impl StateError {
    pub fn unavailable(cause: impl fmt::Display) -> Self {
        StateError::Unavailable(cause.to_string())
    }
}

/// Persistence and locking capability a storage adapter provides.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Idempotent initialization. Safe to call repeatedly and to race
    /// across processes; if the underlying resource is in a transitional
    /// state, implementations poll with a bounded budget and fail with
    /// [`StateError::SetupTimeout`].
    async fn setup(&self) -> Result<(), StateError>;

    /// All persisted records, lock marker excluded. Order is not
    /// guaranteed; the engine imposes its own ordering.
    async fn records(&self) -> Result<Vec<Record>, StateError>;

    /// Acquire the single backend-wide advisory lock with an atomic
    /// create-if-absent write. Exactly one concurrent caller succeeds;
    /// the rest observe [`StateError::LockHeld`].
    async fn lock(&self) -> Result<(), StateError>;

    /// Remove the lock marker. Only called after a successful `lock`.
    async fn unlock(&self) -> Result<(), StateError>;

    /// Create a record, conditional on no record with the same name
    /// existing. An existing row yields [`StateError::DuplicateRecord`];
    /// records are never silently overwritten.
    async fn save_record(&self, record: Record) -> Result<(), StateError>;

    /// Remove a record. Absence of the record is not an error.
    async fn delete_record(&self, name: &str) -> Result<(), StateError>;

    /// Release connection resources. Independent of lock state.
    async fn stop(&self) -> Result<(), StateError>;
}
