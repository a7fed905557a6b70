// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded readiness polling for `setup()` implementations

use std::future::Future;
use std::time::Duration;
use waymark_core::StateError;

/// Polling budget for a resource in a transitional state: `attempts`
/// probes spaced `delay` apart. Exhausting the budget fails with
/// [`StateError::SetupTimeout`] rather than waiting forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPoll {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for ReadinessPoll {
    fn default() -> Self {
        Self {
            attempts: 30,
            delay: Duration::from_secs(5),
        }
    }
}

impl ReadinessPoll {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Probe until ready or the budget runs out.
    ///
    /// The probe returns `Ok(true)` once the resource is usable and
    /// `Ok(false)` while it is still transitioning; probe errors abort
    /// immediately and pass through unchanged.
    pub async fn wait_until<F, Fut>(&self, mut probe: F) -> Result<(), StateError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, StateError>>,
    {
        let mut attempts_left = self.attempts;
        while attempts_left > 0 {
            if probe().await? {
                return Ok(());
            }
            tracing::debug!(attempts_left, "state store not ready, polling again");
            tokio::time::sleep(self.delay).await;
            attempts_left -= 1;
        }
        Err(StateError::SetupTimeout {
            attempts: self.attempts,
            waited: self.delay * self.attempts,
        })
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
