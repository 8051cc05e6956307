use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::time::Duration;
use thiserror::Error;

const MEMORY_PATH: &str = ":memory:";

/// SQLite tuning for the callback store.
///
/// Intake does one short write per submission and one read per lookup, so a
/// small pool and a short busy timeout are enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    pub busy_timeout_ms: u64,
    pub pool_max_size: u32,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 2_000,
            pool_max_size: 4,
        }
    }
}

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to open database pool: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("failed to configure database connection: {0}")]
    Configure(#[from] rusqlite::Error),

    #[error("database refused WAL journaling (journal_mode = {0})")]
    JournalMode(String),
}

/// Opens the callback store at `db_path`.
///
/// File databases run in WAL mode with `synchronous = NORMAL`. `:memory:`
/// opens a private in-memory database; since every in-memory connection is a
/// separate database, such a pool always holds exactly one connection.
///
/// # Errors
///
/// Returns `PoolError` if the database cannot be opened or configured.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let in_memory = db_path == MEMORY_PATH;
    let manager = if in_memory {
        SqliteConnectionManager::memory()
    } else {
        SqliteConnectionManager::file(db_path)
    }
    .with_init(move |conn| configure_connection(conn, settings, in_memory));

    let max_size = if in_memory {
        1
    } else {
        settings.pool_max_size.max(1)
    };
    let pool = Pool::builder().max_size(max_size).build(manager)?;

    if !in_memory {
        let conn = pool.get()?;
        let mode: String = conn.pragma_query_value(None, "journal_mode", |row| row.get(0))?;
        if !mode.eq_ignore_ascii_case("wal") {
            return Err(PoolError::JournalMode(mode));
        }
    }

    tracing::debug!(path = db_path, max_size, "database pool ready");
    Ok(pool)
}

fn configure_connection(
    conn: &mut Connection,
    settings: DbRuntimeSettings,
    in_memory: bool,
) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_millis(settings.busy_timeout_ms))?;
    conn.pragma_update(None, "foreign_keys", true)?;
    if !in_memory {
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
    }
    Ok(())
}
