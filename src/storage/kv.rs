//! The embedded-KV storage backend (`spec.md` §4.4): `sled`, the
//! ecosystem's canonical ordered embedded KV store, keyed by the atom
//! handle's big-endian bytes so `iterate_atoms` gets handle-ordered scans
//! for free.

use super::{AtomRow, StorageBackend, StorageStats};
use crate::atom::Atom;
use crate::error::StorageError;
use crate::handle::Handle;
use std::path::PathBuf;
use std::sync::Mutex;

pub struct KvBackend {
    path: PathBuf,
    db: Mutex<Option<sled::Db>>,
}

impl KvBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            db: Mutex::new(None),
        }
    }

    fn key(handle: Handle) -> [u8; 8] {
        handle.index().to_be_bytes()
    }

    fn require_open<'a>(
        guard: &'a std::sync::MutexGuard<'_, Option<sled::Db>>,
    ) -> Result<&'a sled::Db, StorageError> {
        guard
            .as_ref()
            .ok_or_else(|| StorageError::BackendUnavailable("KV backend is not open".to_string()))
    }

    fn encode(row: &AtomRow) -> Result<Vec<u8>, StorageError> {
        serde_json::to_vec(row).map_err(|e| StorageError::SerializationFailed(e.to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<AtomRow, StorageError> {
        serde_json::from_slice(bytes).map_err(|e| StorageError::SerializationFailed(e.to_string()))
    }
}

impl StorageBackend for KvBackend {
    fn open(&self) -> Result<(), StorageError> {
        let db = sled::open(&self.path)
            .map_err(|e| StorageError::BackendUnavailable(format!("opening {:?}: {e}", self.path)))?;
        *self.db.lock().unwrap() = Some(db);
        Ok(())
    }

    fn close(&self) -> Result<(), StorageError> {
        let mut guard = self.db.lock().unwrap();
        if let Some(db) = guard.take() {
            db.flush().map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;
        }
        Ok(())
    }

    fn store_atom(&self, atom: &Atom) -> Result<(), StorageError> {
        let guard = self.db.lock().unwrap();
        let db = Self::require_open(&guard)?;
        let row = AtomRow::from_atom(atom);
        db.insert(Self::key(atom.handle()), Self::encode(&row)?)
            .map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;
        Ok(())
    }

    fn store_atoms_batch(&self, atoms: &[Atom]) -> Result<(), StorageError> {
        let guard = self.db.lock().unwrap();
        let db = Self::require_open(&guard)?;
        let mut batch = sled::Batch::default();
        for atom in atoms {
            let row = AtomRow::from_atom(atom);
            batch.insert(Self::key(atom.handle()).to_vec(), Self::encode(&row)?);
        }
        db.apply_batch(batch).map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;
        db.flush().map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;
        Ok(())
    }

    fn fetch_atom(&self, handle: Handle) -> Result<Option<Atom>, StorageError> {
        let guard = self.db.lock().unwrap();
        let db = Self::require_open(&guard)?;
        let bytes = db
            .get(Self::key(handle))
            .map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;
        bytes.map(|b| Self::decode(b.as_ref())?.into_atom()).transpose()
    }

    fn fetch_atoms_batch(&self, handles: &[Handle]) -> Result<Vec<Option<Atom>>, StorageError> {
        handles.iter().map(|&h| self.fetch_atom(h)).collect()
    }

    fn remove_atom(&self, handle: Handle, _recursive: bool) -> Result<(), StorageError> {
        let guard = self.db.lock().unwrap();
        let db = Self::require_open(&guard)?;
        db.remove(Self::key(handle)).map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;
        Ok(())
    }

    fn iterate_atoms(&self) -> Result<Vec<Atom>, StorageError> {
        let guard = self.db.lock().unwrap();
        let db = Self::require_open(&guard)?;
        db.iter()
            .map(|entry| {
                let (_, bytes) = entry.map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;
                Self::decode(bytes.as_ref())?.into_atom()
            })
            .collect()
    }

    fn stats(&self) -> Result<StorageStats, StorageError> {
        let guard = self.db.lock().unwrap();
        Ok(StorageStats {
            backend: "kv",
            connected: guard.is_some(),
            atom_count: guard.as_ref().map(|db| db.len()).unwrap_or(0),
        })
    }
}
