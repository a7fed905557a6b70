// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Reference state store and setup readiness polling for waymark

mod memory;
mod readiness;

pub use memory::MemoryStateStore;
pub use readiness::ReadinessPoll;
