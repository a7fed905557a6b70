// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! waymark-core: Core types for the waymark migration runner

pub mod clock;
pub mod loader;
pub mod migration;
pub mod plan;
pub mod progress;
pub mod record;
pub mod registry;
pub mod store;

pub use clock::{Clock, FakeClock, SystemClock};
pub use loader::{load_registry, InlineLoader, Loader};
pub use migration::{InlineMigration, Migration, Outcome};
pub use plan::{Direction, PlanEntry};
pub use progress::Progress;
pub use record::{Record, RecordStatus, StateEntry, Status};
pub use registry::MigrationRegistry;
pub use store::{StateError, StateStore};
