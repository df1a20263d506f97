//! Cross-process change detection via `PRAGMA data_version`.
//!
//! SQLite bumps `data_version` on a connection whenever *another* connection
//! commits to the same database file. Commits made through the watched
//! connection itself are not reported.

use crate::db::DbResult;
use log::debug;
use rusqlite::Connection;

/// Polls one connection for commits made elsewhere.
pub struct StorageWatcher<'conn> {
    conn: &'conn Connection,
    last_seen: i64,
}

impl<'conn> StorageWatcher<'conn> {
    /// Starts watching from the current database state.
    pub fn new(conn: &'conn Connection) -> DbResult<Self> {
        let last_seen = data_version(conn)?;
        Ok(Self { conn, last_seen })
    }

    /// Returns `true` when another connection committed since the last poll.
    pub fn poll(&mut self) -> DbResult<bool> {
        let current = data_version(self.conn)?;
        if current == self.last_seen {
            return Ok(false);
        }
        debug!(
            "event=external_change module=notify status=ok previous={} current={}",
            self.last_seen, current
        );
        self.last_seen = current;
        Ok(true)
    }
}

fn data_version(conn: &Connection) -> DbResult<i64> {
    let version = conn.query_row("PRAGMA data_version;", [], |row| row.get::<_, i64>(0))?;
    Ok(version)
}
