// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deduplicating, deterministically-ordered migration collection

use crate::migration::Migration;
use std::collections::HashSet;
use std::sync::Arc;

/// Registry of migrations for one engine.
///
/// The first registration of a name wins; later registrations of the same
/// name are silently ignored, since the same migration arriving through
/// several loaders is expected.
#[derive(Default)]
pub struct MigrationRegistry {
    migrations: Vec<Arc<dyn Migration>>,
    names: HashSet<String>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a migration unless its name is already present.
    pub fn add(&mut self, migration: Arc<dyn Migration>) -> &mut Self {
        if self.names.contains(migration.name()) {
            return self;
        }
        self.names.insert(migration.name().to_string());
        self.migrations.push(migration);
        self
    }

    /// Migrations in ascending lexicographic name order.
    ///
    /// Pure and stable: repeated calls return the same ordering and never
    /// mutate the registry. Insertion order does not leak into planning.
    pub fn sorted(&self) -> Vec<Arc<dyn Migration>> {
        let mut out = self.migrations.clone();
        out.sort_by(|a, b| a.name().cmp(b.name()));
        out
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
