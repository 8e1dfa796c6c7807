//! Snapshot schema bootstrap.
//!
//! # Invariants
//! - There is a single schema version; older layouts are not migrated.
//! - Table creation and the version bump commit together.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Schema version written by this binary.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Outcome of [`apply_schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// Tables were created on this open.
    Created,
    /// The database already carried the current schema.
    Current,
}

impl SchemaState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Current => "current",
        }
    }
}

/// Creates the snapshot tables when missing.
///
/// # Errors
/// - `SchemaTooNew` when `PRAGMA user_version` exceeds [`SCHEMA_VERSION`].
pub fn apply_schema(conn: &mut Connection) -> DbResult<SchemaState> {
    let found = schema_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    if found == SCHEMA_VERSION {
        return Ok(SchemaState::Current);
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;
    Ok(SchemaState::Created)
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
