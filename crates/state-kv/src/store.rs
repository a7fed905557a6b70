// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! sled-backed state store
//!
//! One tree per logical table; records are JSON values keyed by migration
//! name. The lock is a reserved key in the same tree, acquired with
//! `compare_and_swap` against absence. Record creation uses the same
//! conditional write, so both the lock and per-name uniqueness rest on
//! sled's atomic primitive.

use async_trait::async_trait;
use std::path::Path;
use waymark_core::{Record, StateError, StateStore};

/// Reserved key for the advisory lock marker. Migration names must not
/// collide with it; the store rejects records using it.
pub const LOCK_KEY: &str = "__lock";

const LOCK_MARKER: &[u8] = b"1";

#[derive(Clone)]
pub struct KvStateStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl KvStateStore {
    pub fn open(path: &Path, table: &str) -> Result<Self, StateError> {
        tracing::info!(path = %path.display(), table, "opening kv state store");
        let db = sled::open(path).map_err(StateError::unavailable)?;
        let tree = db.open_tree(table).map_err(StateError::unavailable)?;
        Ok(Self { db, tree })
    }

    /// Throwaway on-disk store for tests.
    pub fn temporary(table: &str) -> Result<Self, StateError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(StateError::unavailable)?;
        let tree = db.open_tree(table).map_err(StateError::unavailable)?;
        Ok(Self { db, tree })
    }

    fn reject_reserved(name: &str) -> Result<(), StateError> {
        if name == LOCK_KEY {
            return Err(StateError::unavailable(format!(
                "migration name \"{LOCK_KEY}\" is reserved for the lock marker"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for KvStateStore {
    async fn setup(&self) -> Result<(), StateError> {
        // Trees are created on open; flush so a racing process sees them.
        self.db
            .flush_async()
            .await
            .map_err(StateError::unavailable)?;
        Ok(())
    }

    async fn records(&self) -> Result<Vec<Record>, StateError> {
        let mut records = Vec::new();
        for item in self.tree.iter() {
            let (key, value) = item.map_err(StateError::unavailable)?;
            if key.as_ref() == LOCK_KEY.as_bytes() {
                continue;
            }
            let record: Record =
                serde_json::from_slice(&value).map_err(StateError::unavailable)?;
            records.push(record);
        }
        Ok(records)
    }

    async fn lock(&self) -> Result<(), StateError> {
        let swap = self
            .tree
            .compare_and_swap(LOCK_KEY, None as Option<&[u8]>, Some(LOCK_MARKER))
            .map_err(StateError::unavailable)?;
        match swap {
            Ok(()) => {
                self.tree.flush_async().await.map_err(StateError::unavailable)?;
                Ok(())
            }
            Err(_) => Err(StateError::LockHeld),
        }
    }

    async fn unlock(&self) -> Result<(), StateError> {
        self.tree.remove(LOCK_KEY).map_err(StateError::unavailable)?;
        self.tree
            .flush_async()
            .await
            .map_err(StateError::unavailable)?;
        Ok(())
    }

    async fn save_record(&self, record: Record) -> Result<(), StateError> {
        Self::reject_reserved(&record.name)?;
        let value = serde_json::to_vec(&record).map_err(StateError::unavailable)?;
        let swap = self
            .tree
            .compare_and_swap(record.name.as_bytes(), None as Option<&[u8]>, Some(value))
            .map_err(StateError::unavailable)?;
        match swap {
            Ok(()) => {
                self.tree.flush_async().await.map_err(StateError::unavailable)?;
                Ok(())
            }
            Err(_) => Err(StateError::DuplicateRecord(record.name)),
        }
    }

    async fn delete_record(&self, name: &str) -> Result<(), StateError> {
        Self::reject_reserved(name)?;
        self.tree.remove(name).map_err(StateError::unavailable)?;
        self.tree
            .flush_async()
            .await
            .map_err(StateError::unavailable)?;
        Ok(())
    }

    async fn stop(&self) -> Result<(), StateError> {
        self.db
            .flush_async()
            .await
            .map_err(StateError::unavailable)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
