//! Pluggable persistence (`spec.md` §4.4): a capability-style trait every
//! backend implements, plus a hand-rolled bounded connection pool shared by
//! the SQL and KV backends.
//!
//! The AtomSpace is authoritative: a failed storage write never invalidates
//! the in-memory graph. [`AsyncPersistence`] is the
//! [`crate::atomspace::observer::AtomSpaceObserver`] adapter that bridges
//! any backend into the change-notification path (`spec.md` §4.1, §9): each
//! add, remove, and truth-value revision is enqueued and the observer
//! callback returns immediately, with a single worker thread draining the
//! queue into the wrapped backend off the AtomSpace's writer critical
//! section. Callers who
//! need end-to-end persistence guarantees still call `store_atoms_batch`
//! directly and observe its return, rather than trusting the
//! fire-and-forget observer path.

pub mod kv;
pub mod memory;
pub mod sql;

use crate::atom::Atom;
use crate::atomspace::observer::AtomSpaceObserver;
use crate::atomspace::AtomSpace;
use crate::attention_value::AttentionValue;
use crate::error::StorageError;
use crate::handle::Handle;
use crate::truth_value::TruthValue;
use crate::types::AtomType;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

pub use kv::KvBackend;
pub use memory::MemoryBackend;
pub use sql::SqlBackend;

/// What a backend reports about itself (`spec.md` §4.4 `stats()`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    pub backend: &'static str,
    pub connected: bool,
    pub atom_count: usize,
}

/// The storage-node protocol every backend implements (`spec.md` §4.4).
/// Backends never mutate atom identity: a `fetch` that produces an atom
/// already present in the AtomSpace must return the same handle, so every
/// accessor round-trips through [`Handle::index`] rather than inventing one.
///
/// Backends do not themselves enforce the AtomSpace's referential-integrity
/// invariants (dangling references, non-empty incoming sets) — that's the
/// AtomSpace's job. `remove_atom`'s `recursive` flag is accepted for
/// interface symmetry with [`crate::atomspace::AtomSpace::remove_atom`]; a
/// backend removes exactly the named row regardless, since the AtomSpace
/// itself already expands a recursive removal into one call per handle
/// before notifying observers.
pub trait StorageBackend: Send + Sync {
    fn open(&self) -> Result<(), StorageError>;
    fn close(&self) -> Result<(), StorageError>;

    /// Idempotent on content key: storing the same atom twice is a no-op
    /// beyond the first write.
    fn store_atom(&self, atom: &Atom) -> Result<(), StorageError>;

    /// Atomic: either every atom in `atoms` is visible after this returns,
    /// or none are. Must be materially faster than `store_atom` called once
    /// per atom (`spec.md` §4.4, §8 scenario 4).
    fn store_atoms_batch(&self, atoms: &[Atom]) -> Result<(), StorageError>;

    fn fetch_atom(&self, handle: Handle) -> Result<Option<Atom>, StorageError>;

    /// Preserves `handles`' input order, one slot per handle.
    fn fetch_atoms_batch(&self, handles: &[Handle]) -> Result<Vec<Option<Atom>>, StorageError>;

    fn remove_atom(&self, handle: Handle, recursive: bool) -> Result<(), StorageError>;

    /// Full scan; order is not guaranteed.
    fn iterate_atoms(&self) -> Result<Vec<Atom>, StorageError>;

    fn stats(&self) -> Result<StorageStats, StorageError>;
}

/// A flat, serializable row representation of an atom, shared by the SQL and
/// KV backends so neither has to reach into `Atom`'s internals twice.
/// Attention values are persisted alongside truth values; per `spec.md` §4.4
/// a backend is free to omit them, but keeping them costs nothing here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AtomRow {
    pub handle: u64,
    pub atom_type: String,
    pub name: Option<String>,
    pub outgoing: Option<Vec<u64>>,
    pub strength: f64,
    pub confidence: f64,
    pub sti: i16,
    pub lti: i16,
    pub vlti: bool,
}

impl AtomRow {
    pub(crate) fn from_atom(atom: &Atom) -> Self {
        let tv = atom.truth_value();
        let av = atom.attention_value();
        Self {
            handle: atom.handle().index(),
            atom_type: atom.atom_type().name().to_string(),
            name: atom.name().map(str::to_string),
            outgoing: atom.outgoing().map(|o| o.iter().map(|h| h.index()).collect()),
            strength: tv.strength(),
            confidence: tv.confidence(),
            sti: av.sti(),
            lti: av.lti(),
            vlti: av.vlti(),
        }
    }

    pub(crate) fn into_atom(self) -> Result<Atom, StorageError> {
        let atom_type = AtomType::from_name(&self.atom_type).ok_or_else(|| {
            StorageError::SerializationFailed(format!("unknown atom type '{}'", self.atom_type))
        })?;
        let handle = Handle::from_index(self.handle);
        let tv = TruthValue::new(self.strength, self.confidence);

        let mut atom = match (self.name, self.outgoing) {
            (Some(name), None) => Atom::new_node(handle, atom_type, name, tv),
            (None, Some(outgoing)) => {
                let outgoing = outgoing.into_iter().map(Handle::from_index).collect();
                Atom::new_link(handle, atom_type, outgoing, tv)
            }
            _ => {
                return Err(StorageError::SerializationFailed(
                    "atom row has neither a name nor an outgoing set".to_string(),
                ))
            }
        };
        atom.set_attention_value(AttentionValue::new(self.sti, self.lti, self.vlti));
        Ok(atom)
    }
}

enum PersistEvent {
    Store(Atom),
    Remove(Handle),
}

/// Bridges a [`StorageBackend`] into the AtomSpace's observer path. Each
/// `on_add`/`on_remove`/`on_truth_value_changed` callback only enqueues
/// onto an unbounded channel and returns, so the AtomSpace's writer lock is
/// never held across a storage I/O call; a single background thread drains
/// the queue into the wrapped backend in order. A revised truth value
/// arrives as just `(handle, old, new)`, so `on_truth_value_changed`
/// re-fetches the current atom from `atomspace` before enqueueing it — the
/// AtomSpace read happens on the caller's thread (cheap, lock-free of the
/// storage I/O), only the write to `backend` is deferred.
pub struct AsyncPersistence {
    atomspace: Arc<AtomSpace>,
    sender: Mutex<Option<Sender<PersistEvent>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncPersistence {
    pub fn new(backend: Arc<dyn StorageBackend>, atomspace: Arc<AtomSpace>) -> Self {
        let (sender, receiver) = mpsc::channel::<PersistEvent>();
        let worker = std::thread::spawn(move || {
            for event in receiver {
                let _ = match event {
                    PersistEvent::Store(atom) => backend.store_atom(&atom),
                    PersistEvent::Remove(handle) => backend.remove_atom(handle, false),
                };
            }
        });
        Self {
            atomspace,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        }
    }

    fn enqueue(&self, event: PersistEvent) {
        if let Some(sender) = self.sender.lock().unwrap().as_ref() {
            let _ = sender.send(event);
        }
    }

    /// Stops accepting new events and blocks until the backlog already
    /// enqueued has drained. Idempotent.
    pub fn shutdown(&self) {
        self.sender.lock().unwrap().take();
        if let Some(worker) = self.worker.lock().unwrap().take() {
            let _ = worker.join();
        }
    }
}

impl AtomSpaceObserver for AsyncPersistence {
    fn on_add(&self, atom: &Atom) {
        self.enqueue(PersistEvent::Store(atom.clone()));
    }

    fn on_truth_value_changed(&self, handle: Handle, _old: TruthValue, _new: TruthValue) {
        if let Some(atom) = self.atomspace.get_atom(handle) {
            self.enqueue(PersistEvent::Store(atom));
        }
    }

    fn on_remove(&self, handle: Handle) {
        self.enqueue(PersistEvent::Remove(handle));
    }
}

impl Drop for AsyncPersistence {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Retries `f` with linear backoff, up to `max_attempts` times — the storage
/// retry policy named in `spec.md` §7 for `BackendUnavailable` conditions.
/// A five-line loop, not a dependency: no backoff crate appears anywhere in
/// the pack.
pub(crate) fn retry_with_backoff<T>(
    max_attempts: usize,
    base_delay: Duration,
    mut f: impl FnMut() -> Result<T, StorageError>,
) -> Result<T, StorageError> {
    let mut attempt = 0;
    loop {
        match f() {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(err);
                }
                std::thread::sleep(base_delay * attempt as u32);
            }
        }
    }
}

/// A bounded pool of lazily-created resources, guarded by a `Mutex` +
/// `Condvar` rather than an `r2d2`-style crate — the pack's
/// concurrency-primitives repo favors small hand-rolled waitable resources
/// over pulling in a dependency for this. Grows up to `capacity` on demand;
/// `acquire` blocks once the ceiling is reached and every item is checked
/// out (`spec.md` §4.4 "the pool grows up to a configured ceiling and
/// blocks beyond it").
pub(crate) struct Pool<T> {
    idle: Mutex<VecDeque<T>>,
    created: Mutex<usize>,
    capacity: usize,
    available: Condvar,
    factory: Box<dyn Fn() -> Result<T, StorageError> + Send + Sync>,
}

impl<T> Pool<T> {
    pub(crate) fn new(
        capacity: usize,
        factory: impl Fn() -> Result<T, StorageError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            idle: Mutex::new(VecDeque::new()),
            created: Mutex::new(0),
            capacity: capacity.max(1),
            available: Condvar::new(),
            factory: Box::new(factory),
        }
    }

    pub(crate) fn acquire(&self) -> Result<PoolGuard<'_, T>, StorageError> {
        loop {
            let mut idle = self.idle.lock().unwrap();
            if let Some(item) = idle.pop_front() {
                return Ok(PoolGuard { pool: self, item: Some(item) });
            }

            let mut created = self.created.lock().unwrap();
            if *created < self.capacity {
                *created += 1;
                drop(created);
                drop(idle);
                let item = (self.factory)()?;
                return Ok(PoolGuard { pool: self, item: Some(item) });
            }
            drop(created);

            idle = self.available.wait(idle).unwrap();
            drop(idle);
        }
    }
}

/// A checked-out pool resource. Returned to the pool on drop.
pub(crate) struct PoolGuard<'a, T> {
    pool: &'a Pool<T>,
    item: Option<T>,
}

impl<'a, T> std::ops::Deref for PoolGuard<'a, T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.item.as_ref().expect("item taken only on drop")
    }
}

impl<'a, T> std::ops::DerefMut for PoolGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().expect("item taken only on drop")
    }
}

impl<'a, T> Drop for PoolGuard<'a, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.idle.lock().unwrap().push_back(item);
            self.pool.available.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truth_value::TruthValue;
    use crate::types::AtomType;

    #[test]
    fn atom_row_round_trips_a_node() {
        let atom = Atom::new_node(Handle::from_index(7), AtomType::ConceptNode, "dog", TruthValue::new(0.9, 0.8));
        let row = AtomRow::from_atom(&atom);
        let back = row.into_atom().unwrap();
        assert_eq!(back.handle(), atom.handle());
        assert_eq!(back.atom_type(), atom.atom_type());
        assert_eq!(back.name(), atom.name());
        assert_eq!(back.truth_value(), atom.truth_value());
    }

    #[test]
    fn atom_row_round_trips_a_link() {
        let atom = Atom::new_link(
            Handle::from_index(3),
            AtomType::ListLink,
            vec![Handle::from_index(0), Handle::from_index(1)],
            TruthValue::new(1.0, 0.0),
        );
        let row = AtomRow::from_atom(&atom);
        let back = row.into_atom().unwrap();
        assert_eq!(back.outgoing(), atom.outgoing());
    }

    #[test]
    fn pool_blocks_until_a_resource_is_released() {
        use std::sync::Arc;
        use std::thread;

        let pool: Arc<Pool<u32>> = Arc::new(Pool::new(1, || Ok(42)));
        let first = pool.acquire().unwrap();

        let pool2 = pool.clone();
        let handle = thread::spawn(move || {
            let guard = pool2.acquire().unwrap();
            *guard
        });

        thread::sleep(Duration::from_millis(20));
        drop(first);
        assert_eq!(handle.join().unwrap(), 42);
    }

    #[test]
    fn async_persistence_drains_adds_and_removes_into_the_backend() {
        let backend = Arc::new(MemoryBackend::new());
        backend.open().unwrap();

        let space = Arc::new(AtomSpace::new());
        let persistence = AsyncPersistence::new(backend.clone(), space.clone());
        let atom = Atom::new_node(Handle::from_index(0), AtomType::ConceptNode, "dog", TruthValue::new(0.9, 0.8));
        persistence.on_add(&atom);
        persistence.on_remove(Handle::from_index(1));
        persistence.shutdown();

        assert_eq!(backend.stats().unwrap().atom_count, 1);
        assert_eq!(backend.fetch_atom(atom.handle()).unwrap().unwrap().name(), Some("dog"));
    }

    #[test]
    fn async_persistence_persists_a_refetched_atom_on_truth_value_change() {
        let backend = Arc::new(MemoryBackend::new());
        backend.open().unwrap();

        let space = Arc::new(AtomSpace::new());
        let dog = space.add_node(AtomType::ConceptNode, "dog", Some(TruthValue::new(0.9, 0.8))).unwrap();
        let persistence = Arc::new(AsyncPersistence::new(backend.clone(), space.clone()));
        space.add_observer(persistence.clone());

        space.set_truth_value(dog, TruthValue::new(0.2, 0.3)).unwrap();
        persistence.shutdown();

        let fetched = backend.fetch_atom(dog).unwrap().unwrap();
        assert_eq!(fetched.truth_value(), TruthValue::new(0.2, 0.3));
    }
}
