//! Key-value store contract and typed collection helpers.
//!
//! # Responsibility
//! - Define the string key-value contract every collection is persisted through.
//! - Name the logical keys shared by every view of one tracker database.
//! - Serialize collections as JSON text with fail-soft reads.
//!
//! # Invariants
//! - Reads never surface malformed payloads; they fall back to the empty default.
//! - Writes report failures to the caller instead of swallowing them.

use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite_store;

pub use sqlite_store::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Logical collection keys persisted in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Ordered JSON array of student records.
    Students,
    /// Next student id, stored as decimal text.
    StudentsNextId,
    /// JSON object: date -> student id -> status tag.
    AttendanceRecords,
    /// Optional remembered login name, stored as plain text.
    RememberedUser,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::StudentsNextId => "students_nextId",
            Self::AttendanceRecords => "attendance_records",
            Self::RememberedUser => "attendance_remembered_user",
        }
    }
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store-layer error.
#[derive(Debug)]
pub enum StoreError {
    /// Backend read failed. Typed helpers recover from this silently.
    Read {
        key: StoreKey,
        source: rusqlite::Error,
    },
    /// Backend write or delete failed.
    Write {
        key: StoreKey,
        source: rusqlite::Error,
    },
    /// Value could not be serialized before writing.
    Encode {
        key: StoreKey,
        source: serde_json::Error,
    },
    /// A grouped write could not be started or committed.
    Transaction(rusqlite::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { key, source } => write!(f, "failed to read `{key}`: {source}"),
            Self::Write { key, source } => write!(f, "failed to save `{key}`: {source}"),
            Self::Encode { key, source } => write!(f, "failed to encode `{key}`: {source}"),
            Self::Transaction(source) => write!(f, "failed to commit store changes: {source}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Encode { source, .. } => Some(source),
            Self::Transaction(source) => Some(source),
        }
    }
}

/// Raw string key-value storage, the equivalent of browser local storage.
pub trait KeyValueStore {
    /// Returns the stored text for `key`, or `None` when absent.
    fn get(&self, key: StoreKey) -> StoreResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: StoreKey, value: &str) -> StoreResult<()>;
    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: StoreKey) -> StoreResult<()>;
    /// Runs `body` so that its writes land together or not at all.
    ///
    /// The default runs `body` directly; backends with transactions
    /// override it.
    fn atomically<T>(&self, body: impl FnOnce() -> StoreResult<T>) -> StoreResult<T> {
        body()
    }
}

impl<S: KeyValueStore> KeyValueStore for &S {
    fn get(&self, key: StoreKey) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: StoreKey, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: StoreKey) -> StoreResult<()> {
        (**self).remove(key)
    }

    fn atomically<T>(&self, body: impl FnOnce() -> StoreResult<T>) -> StoreResult<T> {
        (**self).atomically(body)
    }
}

/// Reads and decodes a JSON collection, falling back to `T::default()`.
///
/// Missing keys, backend read failures and malformed JSON all yield the
/// empty default. The last two are logged at `warn`.
pub fn read_json_or_default<S, T>(store: &S, key: StoreKey) -> T
where
    S: KeyValueStore,
    T: DeserializeOwned + Default,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            warn!("event=store_read module=store status=recovered key={key} reason=read_failed error={err}");
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("event=store_read module=store status=recovered key={key} reason=malformed error={err}");
            T::default()
        }
    }
}

/// Encodes `value` as JSON and stores it under `key`.
pub fn write_json<S, T>(store: &S, key: StoreKey, value: &T) -> StoreResult<()>
where
    S: KeyValueStore,
    T: Serialize + ?Sized,
{
    let encoded =
        serde_json::to_string(value).map_err(|source| StoreError::Encode { key, source })?;
    store.set(key, &encoded).map_err(|err| {
        error!("event=store_write module=store status=error key={key} error={err}");
        err
    })
}

/// Reads a plain text value; read failures are treated as absent.
pub fn read_text<S>(store: &S, key: StoreKey) -> Option<String>
where
    S: KeyValueStore,
{
    match store.get(key) {
        Ok(value) => value,
        Err(err) => {
            warn!("event=store_read module=store status=recovered key={key} reason=read_failed error={err}");
            None
        }
    }
}
