// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Migration units and operation outcomes

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;

/// Result of running a single migration operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation performed its work.
    Applied,
    /// The operation decided there was nothing to do. Skipped migrations
    /// are still recorded as handled so they are never offered again.
    Skip,
}

/// A named unit of schema or data work.
///
/// `up` applies the migration. Reversible migrations override both
/// `reversible` and `down`; the default marks the migration as
/// irreversible, which the planner rejects before any lock is taken.
///
/// Names are unique within a registry and immutable. Lexicographic order
/// of names is the only execution ordering the system uses.
#[async_trait]
pub trait Migration: Send + Sync {
    fn name(&self) -> &str;

    async fn up(&self) -> anyhow::Result<Outcome>;

    /// Whether this migration has a reverse operation. Checked at plan
    /// time, so `down` is never invoked on an irreversible migration.
    fn reversible(&self) -> bool {
        false
    }

    /// Reverse operation. Implementations that override this must also
    /// override `reversible`.
    async fn down(&self) -> anyhow::Result<Outcome> {
        anyhow::bail!("migration \"{}\" has no reverse operation", self.name())
    }
}

type OpFuture = Pin<Box<dyn Future<Output = anyhow::Result<Outcome>> + Send>>;
type OpFn = Box<dyn Fn() -> OpFuture + Send + Sync>;

/// Migration built from closures, for inline definitions and tests.
///
/// Loaders that read migrations from non-code sources can also assemble
/// them through this type instead of hand-writing a trait impl per unit.
pub struct InlineMigration {
    name: String,
    up: OpFn,
    down: Option<OpFn>,
}

impl InlineMigration {
    pub fn new<F, Fut>(name: impl Into<String>, up: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Outcome>> + Send + 'static,
    {
        Self {
            name: name.into(),
            up: Box::new(move || Box::pin(up())),
            down: None,
        }
    }

    /// Attach a reverse operation, making the migration reversible.
    pub fn with_down<F, Fut>(mut self, down: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Outcome>> + Send + 'static,
    {
        self.down = Some(Box::new(move || Box::pin(down())));
        self
    }
}

#[async_trait]
impl Migration for InlineMigration {
    fn name(&self) -> &str {
        &self.name
    }

    async fn up(&self) -> anyhow::Result<Outcome> {
        (self.up)().await
    }

    fn reversible(&self) -> bool {
        self.down.is_some()
    }

    async fn down(&self) -> anyhow::Result<Outcome> {
        match &self.down {
            Some(op) => op().await,
            None => anyhow::bail!("migration \"{}\" has no reverse operation", self.name),
        }
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
