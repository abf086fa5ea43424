use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, info};
use rusqlite::{params, Connection};

use super::{ReadingStore, StoreError, StoreResult};
use crate::reading::record::{Reading, StoredReading};

// AUTOINCREMENT keeps rowids monotonic so an id is never reused, even if a
// row were removed by administrative action outside the service.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS readings (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    altitude REAL NOT NULL,
    heading  REAL NOT NULL,
    attitude REAL NOT NULL
);
";

/// SQLite-backed reading store.
///
/// The connection sits behind a mutex so a single store can be shared
/// across concurrent request handlers.
#[derive(Debug)]
pub struct SqliteStore {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the store at the given path.
    ///
    /// Creates parent directories if needed and bootstraps the schema on
    /// first open.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("opening reading store at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("reading store ready at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Path to the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn row_to_stored(row: &rusqlite::Row) -> rusqlite::Result<StoredReading> {
        Ok(StoredReading {
            id: row.get(0)?,
            reading: Reading {
                altitude: row.get(1)?,
                heading: row.get(2)?,
                attitude: row.get(3)?,
            },
        })
    }
}

impl ReadingStore for SqliteStore {
    fn insert(&self, reading: &Reading) -> StoreResult<StoredReading> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        conn.execute(
            "INSERT INTO readings (altitude, heading, attitude) VALUES (?1, ?2, ?3)",
            params![reading.altitude, reading.heading, reading.attitude],
        )?;
        let id = conn.last_insert_rowid();
        debug!("inserted reading {}", id);
        Ok(StoredReading {
            id,
            reading: *reading,
        })
    }

    fn list_all(&self) -> StoreResult<Vec<StoredReading>> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut stmt =
            conn.prepare("SELECT id, altitude, heading, attitude FROM readings ORDER BY id")?;
        let readings = stmt
            .query_map([], Self::row_to_stored)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(readings)
    }

    fn ping(&self) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    fn close(&self) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        // In-memory connections have no WAL file to flush.
        if self.path.to_string_lossy() != ":memory:" {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        }
        info!("reading store at {} closed", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    fn sample_reading() -> Reading {
        Reading {
            altitude: 1500.0,
            heading: 180.0,
            attitude: 0.0,
        }
    }

    #[test]
    fn insert_assigns_an_id_and_keeps_values_unchanged() {
        let store = test_store();
        let stored = store.insert(&sample_reading()).unwrap();
        assert_eq!(stored.reading, sample_reading());

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], stored);
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let store = test_store();
        let first = store.insert(&sample_reading()).unwrap();
        let second = store.insert(&sample_reading()).unwrap();
        assert_ne!(first.id, second.id);
        assert!(second.id > first.id);
    }

    #[test]
    fn list_all_on_empty_store_is_an_empty_sequence_not_an_error() {
        let store = test_store();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn list_all_returns_readings_in_insertion_order() {
        let store = test_store();
        for altitude in [10.0, 20.0, 30.0] {
            store
                .insert(&Reading {
                    altitude,
                    heading: 0.0,
                    attitude: 0.0,
                })
                .unwrap();
        }
        let altitudes: Vec<f64> = store
            .list_all()
            .unwrap()
            .iter()
            .map(|stored| stored.reading.altitude)
            .collect();
        assert_eq!(altitudes, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn ping_succeeds_on_an_open_store() {
        let store = test_store();
        store.ping().unwrap();
    }

    #[test]
    fn close_flushes_without_error() {
        let store = test_store();
        store.insert(&sample_reading()).unwrap();
        store.close().unwrap();
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = std::env::temp_dir().join(format!("panelcore_test_{}", std::process::id()));
        let db_path = dir.join("nested").join("readings.db");

        let store = SqliteStore::open(&db_path).unwrap();
        assert!(db_path.exists());
        assert_eq!(store.path(), db_path);

        drop(store);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn readings_survive_reopen() {
        let dir = std::env::temp_dir().join(format!("panelcore_reopen_{}", std::process::id()));
        let db_path = dir.join("readings.db");

        let stored = {
            let store = SqliteStore::open(&db_path).unwrap();
            store.insert(&sample_reading()).unwrap()
        };

        let store = SqliteStore::open(&db_path).unwrap();
        let all = store.list_all().unwrap();
        assert_eq!(all, vec![stored]);

        drop(store);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
