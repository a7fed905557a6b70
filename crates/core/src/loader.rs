// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loader contract
//!
//! A loader produces migrations from some source: inline definitions,
//! files, or a remote service. The registry consumes them without knowing
//! their origin. Discovery of a user configuration module is a wiring
//! concern that stays outside this crate.

use crate::migration::Migration;
use crate::registry::MigrationRegistry;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self) -> anyhow::Result<Vec<Arc<dyn Migration>>>;
}

/// Loader over a fixed, in-code list of migrations.
pub struct InlineLoader {
    migrations: Vec<Arc<dyn Migration>>,
}

impl InlineLoader {
    pub fn new(migrations: Vec<Arc<dyn Migration>>) -> Self {
        Self { migrations }
    }
}

#[async_trait]
impl Loader for InlineLoader {
    async fn load(&self) -> anyhow::Result<Vec<Arc<dyn Migration>>> {
        Ok(self.migrations.clone())
    }
}

/// Build a registry by draining every loader in order.
///
/// Duplicate names across loaders are tolerated (first wins). A migration
/// with an empty name is rejected, since the empty string cannot identify
/// a unit of work.
pub async fn load_registry(loaders: &[Box<dyn Loader>]) -> anyhow::Result<MigrationRegistry> {
    let mut registry = MigrationRegistry::new();
    for loader in loaders {
        for migration in loader.load().await? {
            if migration.name().is_empty() {
                anyhow::bail!("loaded migration has an empty name");
            }
            registry.add(migration);
        }
    }
    Ok(registry)
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
