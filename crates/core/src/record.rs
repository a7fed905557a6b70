// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted records and logical status

use crate::migration::Migration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Logical status of a migration.
///
/// `Pending` is the absence of a persisted record; it is never written to
/// storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Finished,
    Skipped,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Pending => "pending",
            Status::Finished => "finished",
            Status::Skipped => "skipped",
        })
    }
}

/// The subset of [`Status`] that storage ever holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Finished,
    Skipped,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Finished => "finished",
            RecordStatus::Skipped => "skipped",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "finished" => Some(RecordStatus::Finished),
            "skipped" => Some(RecordStatus::Skipped),
            _ => None,
        }
    }
}

impl From<RecordStatus> for Status {
    fn from(status: RecordStatus) -> Self {
        match status {
            RecordStatus::Finished => Status::Finished,
            RecordStatus::Skipped => Status::Skipped,
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted evidence that a migration was finished or explicitly skipped.
///
/// Records are created by `up` execution, deleted by `down` execution, and
/// never updated in place. There is no in-progress status; in-progress-ness
/// is observable only through the live progress stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub applied_at: DateTime<Utc>,
    pub status: RecordStatus,
}

/// One registered migration merged with its persisted status.
#[derive(Clone)]
pub struct StateEntry {
    pub migration: Arc<dyn Migration>,
    pub status: Status,
}

impl fmt::Debug for StateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateEntry")
            .field("migration", &self.migration.name())
            .field("status", &self.status)
            .finish()
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
