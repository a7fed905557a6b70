// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! waymark CLI surface
//!
//! An embeddable command surface: the host binary discovers its own
//! configuration, builds a [`Migrator`], and hands it to [`run`] together
//! with parsed arguments. Exit codes distinguish lock contention from
//! other failures so shell callers can react to each.

mod output;

pub use output::{format_plan, format_status_line, progress_line};

use clap::{Parser, Subcommand};
use waymark_core::Direction;
use waymark_engine::{Migrator, RunError};

/// Exit code for a run that lost the race for the migration lock.
pub const EXIT_LOCKED: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "waymark", version, about = "Schema and data migration runner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending migrations, optionally stopping before a target
    Up {
        /// Exclusive target: everything before this migration is applied
        to: Option<String>,
        /// Print the plan without executing it
        #[arg(short = 'p', long)]
        plan_only: bool,
    },
    /// Revert finished migrations back down to a target (exclusive)
    Down {
        to: String,
        /// Print the plan without executing it
        #[arg(short = 'p', long)]
        plan_only: bool,
    },
    /// Show the logical status of every registered migration
    Status,
}

/// Dispatch a parsed command against a constructed migrator. Returns the
/// process exit code; the caller keeps ownership of the migrator and is
/// responsible for `stop` before the process exits.
pub async fn run(cli: Cli, migrator: &Migrator) -> i32 {
    match cli.command {
        Commands::Up { to, plan_only } => {
            command(migrator, Direction::Up, to.as_deref(), plan_only).await
        }
        Commands::Down { to, plan_only } => {
            command(migrator, Direction::Down, Some(&to), plan_only).await
        }
        Commands::Status => status(migrator).await,
    }
}

async fn status(migrator: &Migrator) -> i32 {
    match migrator.state().await {
        Ok(state) => {
            for entry in &state {
                println!("{}", format_status_line(entry));
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

async fn command(migrator: &Migrator, direction: Direction, to: Option<&str>, plan_only: bool) -> i32 {
    if plan_only {
        return match migrator.plan(direction, to).await {
            Ok(plan) => {
                print!("{}", format_plan(&plan));
                0
            }
            Err(e) => {
                eprintln!("Error: {e}");
                1
            }
        };
    }

    let run = match migrator.run(direction, to).await {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let mut events = run.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let Some(line) = progress_line(&event) {
                println!("{line}");
            }
        }
    });

    let result = run.wait().await;
    // The event sender is gone once wait returns, so the printer drains
    // and exits on its own.
    let _ = printer.await;

    match result {
        Ok(summary) => {
            if summary.total() == 0 {
                println!("No migrations to run");
            } else {
                println!("Completed {} operations", summary.total());
            }
            0
        }
        Err(e) if e.is_contention() => {
            eprintln!("Could not lock migrations. Another migration is in progress");
            EXIT_LOCKED
        }
        Err(RunError::Unlock(e)) => {
            eprintln!("Could not unlock migrations. Fatal error: {e}");
            1
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
