// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! waymark migration engine
//!
//! Merges the registry with persisted records into a logical state,
//! computes plans, and executes them under the store's advisory lock while
//! multicasting progress events.

mod error;
mod migrator;

pub use error::{PlanError, RunError};
pub use migrator::{MigrationRun, Migrator, RunSummary};
