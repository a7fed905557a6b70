// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan entries and direction of travel

use crate::migration::Migration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Direction of travel through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
        })
    }
}

/// A single unit of scheduled work, in execution order within a plan.
#[derive(Clone)]
pub struct PlanEntry {
    pub migration: Arc<dyn Migration>,
    pub direction: Direction,
}

impl PlanEntry {
    pub fn name(&self) -> &str {
        self.migration.name()
    }
}

impl fmt::Debug for PlanEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanEntry")
            .field("migration", &self.migration.name())
            .field("direction", &self.direction)
            .finish()
    }
}
