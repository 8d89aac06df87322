//! The in-memory storage backend (`spec.md` §4.4): a trivial hash map,
//! kept for tests and ephemeral deployments.

use super::{StorageBackend, StorageStats};
use crate::atom::Atom;
use crate::error::StorageError;
use crate::handle::Handle;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

pub struct MemoryBackend {
    open: Mutex<bool>,
    atoms: RwLock<HashMap<u64, Atom>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            open: Mutex::new(false),
            atoms: RwLock::new(HashMap::new()),
        }
    }

    fn require_open(&self) -> Result<(), StorageError> {
        if *self.open.lock().unwrap() {
            Ok(())
        } else {
            Err(StorageError::BackendUnavailable("memory backend is not open".to_string()))
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for MemoryBackend {
    fn open(&self) -> Result<(), StorageError> {
        *self.open.lock().unwrap() = true;
        Ok(())
    }

    fn close(&self) -> Result<(), StorageError> {
        *self.open.lock().unwrap() = false;
        Ok(())
    }

    fn store_atom(&self, atom: &Atom) -> Result<(), StorageError> {
        self.require_open()?;
        self.atoms.write().unwrap().insert(atom.handle().index(), atom.clone());
        Ok(())
    }

    fn store_atoms_batch(&self, atoms: &[Atom]) -> Result<(), StorageError> {
        self.require_open()?;
        let mut table = self.atoms.write().unwrap();
        for atom in atoms {
            table.insert(atom.handle().index(), atom.clone());
        }
        Ok(())
    }

    fn fetch_atom(&self, handle: Handle) -> Result<Option<Atom>, StorageError> {
        self.require_open()?;
        Ok(self.atoms.read().unwrap().get(&handle.index()).cloned())
    }

    fn fetch_atoms_batch(&self, handles: &[Handle]) -> Result<Vec<Option<Atom>>, StorageError> {
        self.require_open()?;
        let table = self.atoms.read().unwrap();
        Ok(handles.iter().map(|h| table.get(&h.index()).cloned()).collect())
    }

    fn remove_atom(&self, handle: Handle, _recursive: bool) -> Result<(), StorageError> {
        self.require_open()?;
        self.atoms.write().unwrap().remove(&handle.index());
        Ok(())
    }

    fn iterate_atoms(&self) -> Result<Vec<Atom>, StorageError> {
        self.require_open()?;
        Ok(self.atoms.read().unwrap().values().cloned().collect())
    }

    fn stats(&self) -> Result<StorageStats, StorageError> {
        Ok(StorageStats {
            backend: "memory",
            connected: *self.open.lock().unwrap(),
            atom_count: self.atoms.read().unwrap().len(),
        })
    }
}
