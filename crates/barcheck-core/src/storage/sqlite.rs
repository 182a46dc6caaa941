use rusqlite::{Connection, Result};
use std::path::Path;
use tracing::debug;

pub const SCHEMA_VERSION: i64 = 1;

/// A single connection to the scan record file.
///
/// Connections are short-lived: the store opens one per operation and drops
/// it when the call returns.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.configure_pragmas()?;
        Ok(db)
    }

    /// Open the file, creating the table and indexes if they are missing.
    pub fn open_and_migrate(path: &Path) -> Result<Self> {
        let db = Self::open(path)?;
        db.migrate_schema()?;
        Ok(db)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    fn migrate_schema(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version >= SCHEMA_VERSION {
            debug!("SQLite schema already at version {}", version);
            return Ok(());
        }

        self.conn.execute_batch(include_str!("schema.sql"))?;
        debug!("SQLite schema migrated from version {} to {}", version, SCHEMA_VERSION);
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
