// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed state store
//!
//! Records live in one table keyed by migration name. The lock is a
//! second table: a bare `CREATE TABLE` either succeeds atomically or
//! fails because the table exists, which is exactly the create-if-absent
//! primitive the contract asks for. Record inserts lean on the primary
//! key for the per-name conditional write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use waymark_core::{Record, RecordStatus, StateError, StateStore};

pub struct SqlStateStore {
    conn: Mutex<Connection>,
    table: String,
}

impl SqlStateStore {
    /// Open (or create) the database file. The record table itself is
    /// created by `setup`.
    pub fn open(db_path: &Path, table: &str) -> Result<Self, StateError> {
        tracing::info!(path = %db_path.display(), table, "opening sql state store");
        let conn = Connection::open(db_path).map_err(StateError::unavailable)?;
        Self::from_connection(conn, table)
    }

    pub fn in_memory(table: &str) -> Result<Self, StateError> {
        let conn = Connection::open_in_memory().map_err(StateError::unavailable)?;
        Self::from_connection(conn, table)
    }

    fn from_connection(conn: Connection, table: &str) -> Result<Self, StateError> {
        validate_table_name(table)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")
            .map_err(StateError::unavailable)?;
        Ok(Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StateError> {
        self.conn
            .lock()
            .map_err(|_| StateError::unavailable("sql state store lock poisoned"))
    }

    fn lock_table(&self) -> String {
        format!("{}_lock", self.table)
    }
}

/// Table names reach SQL statements by interpolation, so they are limited
/// to identifier characters.
fn validate_table_name(table: &str) -> Result<(), StateError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StateError::unavailable(format!(
            "invalid table name \"{table}\""
        )))
    }
}

#[async_trait]
impl StateStore for SqlStateStore {
    async fn setup(&self) -> Result<(), StateError> {
        let conn = self.connection()?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL,
                status TEXT NOT NULL
            )",
            self.table
        ))
        .map_err(StateError::unavailable)
    }

    async fn records(&self) -> Result<Vec<Record>, StateError> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT name, applied_at, status FROM \"{}\"",
                self.table
            ))
            .map_err(StateError::unavailable)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(StateError::unavailable)?;

        let mut records = Vec::new();
        for row in rows {
            let (name, applied_at, status) = row.map_err(StateError::unavailable)?;
            let applied_at = DateTime::parse_from_rfc3339(&applied_at)
                .map_err(|e| {
                    StateError::unavailable(format!(
                        "record \"{name}\" has malformed timestamp: {e}"
                    ))
                })?
                .with_timezone(&Utc);
            let status = RecordStatus::parse(&status).ok_or_else(|| {
                StateError::unavailable(format!(
                    "record \"{name}\" has unknown status \"{status}\""
                ))
            })?;
            records.push(Record {
                name,
                applied_at,
                status,
            });
        }
        Ok(records)
    }

    async fn lock(&self) -> Result<(), StateError> {
        let conn = self.connection()?;
        // No IF NOT EXISTS: the create must fail when the marker is
        // already there.
        match conn.execute_batch(&format!("CREATE TABLE \"{}\" (held INTEGER)", self.lock_table()))
        {
            Ok(()) => Ok(()),
            Err(e) if e.to_string().contains("already exists") => Err(StateError::LockHeld),
            Err(e) => Err(StateError::unavailable(e)),
        }
    }

    async fn unlock(&self) -> Result<(), StateError> {
        let conn = self.connection()?;
        conn.execute_batch(&format!("DROP TABLE IF EXISTS \"{}\"", self.lock_table()))
            .map_err(StateError::unavailable)
    }

    async fn save_record(&self, record: Record) -> Result<(), StateError> {
        let conn = self.connection()?;
        let result = conn.execute(
            &format!(
                "INSERT INTO \"{}\" (name, applied_at, status) VALUES (?1, ?2, ?3)",
                self.table
            ),
            rusqlite::params![
                record.name,
                record.applied_at.to_rfc3339(),
                record.status.as_str()
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StateError::DuplicateRecord(record.name))
            }
            Err(e) => Err(StateError::unavailable(e)),
        }
    }

    async fn delete_record(&self, name: &str) -> Result<(), StateError> {
        let conn = self.connection()?;
        conn.execute(
            &format!("DELETE FROM \"{}\" WHERE name = ?1", self.table),
            [name],
        )
        .map_err(StateError::unavailable)?;
        Ok(())
    }

    async fn stop(&self) -> Result<(), StateError> {
        // Connections close on drop; nothing to release eagerly.
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
