// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory reference implementation of the state store contract
//!
//! This is the executable description of the semantics every adapter must
//! provide: the lock is an atomic create-if-absent marker, record creation
//! is conditional on the name not already existing, and setup polls a
//! bounded budget while the resource is provisioning. The engine's tests
//! run against this store.

use crate::readiness::ReadinessPoll;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use waymark_core::{Record, StateError, StateStore};

#[derive(Default)]
struct Inner {
    records: BTreeMap<String, Record>,
    locked: bool,
    /// Probes `setup` must make before the store reports ready.
    provisioning_probes: u32,
    setup_calls: u32,
    #[cfg(any(test, feature = "test-support"))]
    injected: Injected,
}

#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
struct Injected {
    fail_next_save: bool,
    fail_next_delete: bool,
    fail_next_unlock: bool,
}

/// Shared in-memory store. Clones point at the same state, so two cloned
/// handles model two processes racing for the same backend.
#[derive(Clone)]
pub struct MemoryStateStore {
    inner: Arc<Mutex<Inner>>,
    poll: ReadinessPoll,
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            poll: ReadinessPoll::default(),
        }
    }

    /// Store whose resource is still provisioning: the first `probes`
    /// readiness checks during `setup` report not-ready.
    pub fn provisioning(probes: u32, poll: ReadinessPoll) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                provisioning_probes: probes,
                ..Inner::default()
            })),
            poll,
        }
    }

    /// How many times `setup` has been invoked on this store.
    pub fn setup_calls(&self) -> u32 {
        self.inner.lock().setup_calls
    }

    /// Whether the lock marker currently exists.
    pub fn is_locked(&self) -> bool {
        self.inner.lock().locked
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_next_save(&self) {
        self.inner.lock().injected.fail_next_save = true;
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_next_delete(&self) {
        self.inner.lock().injected.fail_next_delete = true;
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_next_unlock(&self) {
        self.inner.lock().injected.fail_next_unlock = true;
    }

    #[cfg(any(test, feature = "test-support"))]
    fn take_injected(&self, pick: impl Fn(&mut Injected) -> &mut bool) -> Result<(), StateError> {
        let mut inner = self.inner.lock();
        let flag = pick(&mut inner.injected);
        if *flag {
            *flag = false;
            return Err(StateError::unavailable("injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn setup(&self) -> Result<(), StateError> {
        self.inner.lock().setup_calls += 1;
        let shared = Arc::clone(&self.inner);
        self.poll
            .wait_until(move || {
                let shared = Arc::clone(&shared);
                async move {
                    let mut inner = shared.lock();
                    if inner.provisioning_probes == 0 {
                        return Ok(true);
                    }
                    inner.provisioning_probes -= 1;
                    Ok(false)
                }
            })
            .await
    }

    async fn records(&self) -> Result<Vec<Record>, StateError> {
        Ok(self.inner.lock().records.values().cloned().collect())
    }

    async fn lock(&self) -> Result<(), StateError> {
        // Single guarded check-and-set; this is the create-if-absent
        // primitive adapters implement with a conditional write.
        let mut inner = self.inner.lock();
        if inner.locked {
            return Err(StateError::LockHeld);
        }
        inner.locked = true;
        Ok(())
    }

    async fn unlock(&self) -> Result<(), StateError> {
        #[cfg(any(test, feature = "test-support"))]
        self.take_injected(|i| &mut i.fail_next_unlock)?;

        self.inner.lock().locked = false;
        Ok(())
    }

    async fn save_record(&self, record: Record) -> Result<(), StateError> {
        #[cfg(any(test, feature = "test-support"))]
        self.take_injected(|i| &mut i.fail_next_save)?;

        let mut inner = self.inner.lock();
        if inner.records.contains_key(&record.name) {
            return Err(StateError::DuplicateRecord(record.name));
        }
        inner.records.insert(record.name.clone(), record);
        Ok(())
    }

    async fn delete_record(&self, name: &str) -> Result<(), StateError> {
        #[cfg(any(test, feature = "test-support"))]
        self.take_injected(|i| &mut i.fail_next_delete)?;

        self.inner.lock().records.remove(name);
        Ok(())
    }

    async fn stop(&self) -> Result<(), StateError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
