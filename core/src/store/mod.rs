//! Persistence seam for readings.
//!
//! Handlers consume the [`ReadingStore`] trait only; the SQLite
//! implementation lives in [`sqlite`] and owns its own connection
//! lifecycle.

pub mod sqlite;

pub use sqlite::SqliteStore;

use std::path::PathBuf;

use thiserror::Error;

use crate::reading::record::{Reading, StoredReading};

/// Failures surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("store connection lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable keyed collection of readings: append-only inserts and
/// full-collection reads.
///
/// Readings are write-once; the trait deliberately offers no update or
/// delete.
pub trait ReadingStore: Send + Sync {
    /// Persist a reading, assign its id, and return the stored form with
    /// field values unchanged.
    fn insert(&self, reading: &Reading) -> StoreResult<StoredReading>;

    /// Every reading currently persisted, in insertion order.
    fn list_all(&self) -> StoreResult<Vec<StoredReading>>;

    /// Connectivity check run at startup; a failure means the process must
    /// not begin serving traffic.
    fn ping(&self) -> StoreResult<()>;

    /// Flush and release the connection ahead of process exit.
    fn close(&self) -> StoreResult<()>;
}
