//! Storage for Ringback callback requests.
//!
//! An `r2d2` pool of SQLite connections plus the versioned schema the intake
//! flow writes to. The only domain table is `callback_requests`.

mod migrations;
mod pool;

pub use migrations::{run_migrations, schema_version, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
