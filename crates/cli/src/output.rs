// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text rendering for plans, status and the progress stream

use waymark_core::{PlanEntry, Progress, StateEntry};

/// One status line, `name - status`.
pub fn format_status_line(entry: &StateEntry) -> String {
    format!("{} - {}", entry.migration.name(), entry.status)
}

/// Render a plan, one `name - direction` line per entry, or a marker when
/// there is nothing to do.
pub fn format_plan(plan: &[PlanEntry]) -> String {
    if plan.is_empty() {
        return "No migrations\n".to_string();
    }
    let mut out = String::new();
    for entry in plan {
        out.push_str(&format!("{} - {}\n", entry.name(), entry.direction));
    }
    out
}

/// Line for one progress event, or `None` for events the terminal error
/// already reports.
pub fn progress_line(event: &Progress) -> Option<String> {
    match event {
        Progress::LockAcquired => Some("Successfully gained lock for migration".to_string()),
        Progress::LockFailed { .. } => None,
        Progress::UnlockSucceeded => Some("Successfully removed lock".to_string()),
        Progress::UnlockFailed { .. } => None,
        Progress::MigrationStarted { entry } => {
            Some(format!("{} - {}: started", entry.name(), entry.direction))
        }
        Progress::MigrationFinished { entry } => {
            Some(format!("{} - {}: finished", entry.name(), entry.direction))
        }
        Progress::MigrationSkipped { entry } => {
            Some(format!("{} - {}: skipped", entry.name(), entry.direction))
        }
        Progress::MigrationFailed { entry, .. } => {
            Some(format!("{} - {}: failed", entry.name(), entry.direction))
        }
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
