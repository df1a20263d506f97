//! SQLite-backed key-value store.
//!
//! # Invariants
//! - One row per key in `kv_entries`; `set` is an upsert.
//! - The connection must already be migrated (see `db::open_db`).
//! - `atomically` groups writes in one SQLite transaction; an error from the
//!   body rolls every write back.

use super::{KeyValueStore, StoreError, StoreKey, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value store over a migrated tracker connection.
#[derive(Clone, Copy)]
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }
}

impl KeyValueStore for SqliteStore<'_> {
    fn get(&self, key: StoreKey) -> StoreResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|source| StoreError::Read { key, source })
    }

    fn set(&self, key: StoreKey, value: &str) -> StoreResult<()> {
        self.conn
            .execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key.as_str(), value],
            )
            .map(|_| ())
            .map_err(|source| StoreError::Write { key, source })
    }

    fn remove(&self, key: StoreKey) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key.as_str()])
            .map(|_| ())
            .map_err(|source| StoreError::Write { key, source })
    }

    fn atomically<T>(&self, body: impl FnOnce() -> StoreResult<T>) -> StoreResult<T> {
        // Why: deferred, so a read-only connection reports the failing key
        // from the first write rather than failing at BEGIN.
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(StoreError::Transaction)?;
        let value = body()?;
        tx.commit().map_err(StoreError::Transaction)?;
        Ok(value)
    }
}
