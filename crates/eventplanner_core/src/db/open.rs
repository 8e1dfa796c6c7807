//! Snapshot database open path.
//!
//! # Invariants
//! - Every returned connection has `foreign_keys=ON` and the current schema.
//! - File and in-memory targets share one bootstrap and one log shape.

use super::schema::{apply_schema, SchemaState};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where store snapshots live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotTarget {
    File(PathBuf),
    /// Private database dropped with its connection; used by tests and dry runs.
    Memory,
}

impl SnapshotTarget {
    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }

    /// Opens the target and bootstraps the snapshot schema.
    ///
    /// Emits one `db_open` line with the outcome, duration and schema state.
    pub fn open(&self) -> DbResult<Connection> {
        let started_at = Instant::now();
        match self.connect_and_bootstrap() {
            Ok((conn, state)) => {
                info!(
                    "event=db_open module=db status=ok mode={} schema={} duration_ms={}",
                    self.mode(),
                    state.as_str(),
                    started_at.elapsed().as_millis()
                );
                Ok(conn)
            }
            Err(err) => {
                error!(
                    "event=db_open module=db status=error mode={} error_code={} duration_ms={} error={}",
                    self.mode(),
                    err.code(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn connect_and_bootstrap(&self) -> Result<(Connection, SchemaState), DbError> {
        let mut conn = match self {
            Self::File(path) => Connection::open(path)?,
            Self::Memory => Connection::open_in_memory()?,
        };
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let state = apply_schema(&mut conn)?;
        Ok((conn, state))
    }
}

/// Opens (creating if needed) the snapshot database file at `path`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    SnapshotTarget::File(path.as_ref().to_path_buf()).open()
}

/// Opens a private in-memory snapshot database.
pub fn open_db_in_memory() -> DbResult<Connection> {
    SnapshotTarget::Memory.open()
}
