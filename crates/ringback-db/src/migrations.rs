//! Versioned schema for the callback store.
//!
//! Each step carries a version number and is recorded in `schema_history`
//! once applied. A database whose history is ahead of this build is refused
//! instead of being written to.

use rusqlite::{params, Connection};
use thiserror::Error;

struct SchemaStep {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// Steps in ascending version order. Append only.
const SCHEMA: &[SchemaStep] = &[SchemaStep {
    version: 1,
    description: "callback requests",
    sql: include_str!("migrations/001_callback_requests.sql"),
}];

const CREATE_HISTORY: &str = "CREATE TABLE IF NOT EXISTS schema_history (
    version INTEGER PRIMARY KEY,
    description TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
)";

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("schema step {version} ({description}) failed: {source}")]
    Step {
        version: u32,
        description: &'static str,
        source: rusqlite::Error,
    },

    #[error("failed to read schema history: {0}")]
    History(rusqlite::Error),

    #[error("database schema version {found} is newer than this build supports ({known})")]
    TooNew { found: u32, known: u32 },
}

/// The highest schema version recorded in `db`, or 0 for a fresh database.
///
/// # Errors
///
/// Returns `MigrationError::History` if the history table cannot be read.
pub fn schema_version(conn: &Connection) -> Result<u32, MigrationError> {
    conn.execute_batch(CREATE_HISTORY)
        .map_err(MigrationError::History)?;
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_history",
        [],
        |row| row.get(0),
    )
    .map_err(MigrationError::History)
}

/// Brings the schema up to date and returns how many steps were applied.
///
/// # Errors
///
/// Returns `MigrationError::TooNew` for a database written by a newer build,
/// or the failing step. A failed step leaves no partial changes behind.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    apply_steps(conn, SCHEMA)
}

fn apply_steps(conn: &Connection, steps: &[SchemaStep]) -> Result<usize, MigrationError> {
    let current = schema_version(conn)?;
    let known = steps.last().map_or(0, |step| step.version);
    if current > known {
        return Err(MigrationError::TooNew {
            found: current,
            known,
        });
    }

    let mut applied = 0;
    for step in steps.iter().filter(|step| step.version > current) {
        tracing::info!(
            version = step.version,
            description = step.description,
            "applying schema step"
        );

        let failed = |source| MigrationError::Step {
            version: step.version,
            description: step.description,
            source,
        };

        let tx = conn.unchecked_transaction().map_err(failed)?;
        tx.execute_batch(step.sql).map_err(failed)?;
        tx.execute(
            "INSERT INTO schema_history (version, description) VALUES (?1, ?2)",
            params![step.version, step.description],
        )
        .map_err(failed)?;
        tx.commit().map_err(failed)?;
        applied += 1;
    }

    if applied == 0 {
        tracing::debug!(version = current, "schema is up to date");
    }
    Ok(applied)
}
