//! The SQL-style storage backend (`spec.md` §4.4): SQLite via `rusqlite`,
//! behind a bounded connection pool, with batch writes wrapped in a single
//! `BEGIN`/`COMMIT` transaction to amortize fsync cost.

use super::{retry_with_backoff, AtomRow, Pool, StorageBackend, StorageStats};
use crate::atom::Atom;
use crate::error::StorageError;
use crate::handle::Handle;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS atoms (
    handle     INTEGER PRIMARY KEY,
    atom_type  TEXT NOT NULL,
    name       TEXT,
    outgoing   TEXT,
    strength   REAL NOT NULL,
    confidence REAL NOT NULL,
    sti        INTEGER NOT NULL,
    lti        INTEGER NOT NULL,
    vlti       INTEGER NOT NULL
)";

pub struct SqlBackend {
    path: PathBuf,
    pool_size: usize,
    pool: Mutex<Option<Arc<Pool<Connection>>>>,
}

impl SqlBackend {
    /// `path` may be `:memory:`-style or a file path, exactly as accepted by
    /// `rusqlite::Connection::open`.
    pub fn new(path: impl Into<PathBuf>, pool_size: usize) -> Self {
        Self {
            path: path.into(),
            pool_size,
            pool: Mutex::new(None),
        }
    }

    /// Only the `Arc` clone happens under `self.pool`'s lock; the acquire
    /// and the query itself run after it's released, so up to `pool_size`
    /// connections serve queries concurrently instead of serializing every
    /// call through this backend's own open/close lock.
    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StorageError> {
        let pool = self
            .pool
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| StorageError::BackendUnavailable("SQL backend is not open".to_string()))?;
        let conn = pool.acquire()?;
        f(&conn).map_err(|e| StorageError::BackendUnavailable(e.to_string()))
    }

    fn row_to_atom(row: &rusqlite::Row) -> rusqlite::Result<AtomRow> {
        let outgoing_json: Option<String> = row.get("outgoing")?;
        let outgoing = outgoing_json
            .map(|s| serde_json::from_str::<Vec<u64>>(&s))
            .transpose()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        Ok(AtomRow {
            handle: row.get("handle")?,
            atom_type: row.get("atom_type")?,
            name: row.get("name")?,
            outgoing,
            strength: row.get("strength")?,
            confidence: row.get("confidence")?,
            sti: row.get("sti")?,
            lti: row.get("lti")?,
            vlti: row.get("vlti")?,
        })
    }

    fn upsert(conn: &Connection, row: &AtomRow) -> rusqlite::Result<()> {
        let outgoing_json = row
            .outgoing
            .as_ref()
            .map(|o| serde_json::to_string(o).expect("Vec<u64> always serializes"));
        conn.execute(
            "INSERT INTO atoms (handle, atom_type, name, outgoing, strength, confidence, sti, lti, vlti)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(handle) DO UPDATE SET
                atom_type = excluded.atom_type, name = excluded.name, outgoing = excluded.outgoing,
                strength = excluded.strength, confidence = excluded.confidence,
                sti = excluded.sti, lti = excluded.lti, vlti = excluded.vlti",
            params![
                row.handle, row.atom_type, row.name, outgoing_json,
                row.strength, row.confidence, row.sti, row.lti, row.vlti as i64,
            ],
        )?;
        Ok(())
    }
}

impl StorageBackend for SqlBackend {
    fn open(&self) -> Result<(), StorageError> {
        let path = self.path.clone();
        let factory = move || {
            Connection::open(&path)
                .map_err(|e| StorageError::BackendUnavailable(format!("opening {:?}: {e}", &path)))
        };
        let pool = Arc::new(Pool::new(self.pool_size, factory));
        // eagerly validate at least one connection + schema before reporting "open"
        let conn = pool.acquire()?;
        retry_with_backoff(3, Duration::from_millis(5), || {
            conn.execute_batch(SCHEMA)
                .map_err(|e| StorageError::BackendUnavailable(e.to_string()))
        })?;
        drop(conn);
        *self.pool.lock().unwrap() = Some(pool);
        Ok(())
    }

    fn close(&self) -> Result<(), StorageError> {
        *self.pool.lock().unwrap() = None;
        Ok(())
    }

    fn store_atom(&self, atom: &Atom) -> Result<(), StorageError> {
        let row = AtomRow::from_atom(atom);
        self.with_connection(|conn| Self::upsert(conn, &row))
    }

    fn store_atoms_batch(&self, atoms: &[Atom]) -> Result<(), StorageError> {
        let rows: Vec<AtomRow> = atoms.iter().map(AtomRow::from_atom).collect();
        self.with_connection(|conn| {
            conn.execute_batch("BEGIN")?;
            for row in &rows {
                if let Err(e) = Self::upsert(conn, row) {
                    let _ = conn.execute_batch("ROLLBACK");
                    return Err(e);
                }
            }
            conn.execute_batch("COMMIT")?;
            Ok(())
        })
    }

    fn fetch_atom(&self, handle: Handle) -> Result<Option<Atom>, StorageError> {
        let row: Option<AtomRow> = self.with_connection(|conn| {
            conn.query_row(
                "SELECT * FROM atoms WHERE handle = ?1",
                params![handle.index()],
                Self::row_to_atom,
            )
            .optional()
        })?;
        row.map(AtomRow::into_atom).transpose()
    }

    fn fetch_atoms_batch(&self, handles: &[Handle]) -> Result<Vec<Option<Atom>>, StorageError> {
        handles.iter().map(|&h| self.fetch_atom(h)).collect()
    }

    fn remove_atom(&self, handle: Handle, _recursive: bool) -> Result<(), StorageError> {
        self.with_connection(|conn| {
            conn.execute("DELETE FROM atoms WHERE handle = ?1", params![handle.index()])
        })?;
        Ok(())
    }

    fn iterate_atoms(&self) -> Result<Vec<Atom>, StorageError> {
        let rows: Vec<AtomRow> = self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM atoms")?;
            let rows = stmt.query_map([], Self::row_to_atom)?;
            rows.collect()
        })?;
        rows.into_iter().map(AtomRow::into_atom).collect()
    }

    fn stats(&self) -> Result<StorageStats, StorageError> {
        let connected = self.pool.lock().unwrap().is_some();
        let atom_count = if connected {
            self.with_connection(|conn| {
                conn.query_row("SELECT COUNT(*) FROM atoms", [], |row| row.get::<_, i64>(0))
            })? as usize
        } else {
            0
        };
        Ok(StorageStats { backend: "sql", connected, atom_count })
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::BackendUnavailable(e.to_string())
    }
}
