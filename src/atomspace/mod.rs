//! The AtomSpace core (`spec.md` §4.1): owns the graph, enforces its
//! invariants, and routes change notifications to observers.

mod index;
pub mod observer;

use crate::atom::{Atom, AtomContent, ContentKey};
use crate::error::AtomSpaceError;
use crate::handle::Handle;
use crate::truth_value::TruthValue;
use crate::types::AtomType;
use index::Inner;
use observer::AtomSpaceObserver;
use std::sync::{Arc, RwLock};

/// The typed hypergraph store. Cheap to share across threads via `Arc`:
/// internally a single `RwLock` serializes writers while allowing
/// concurrent readers (`spec.md` §5).
pub struct AtomSpace {
    inner: RwLock<Inner>,
    observers: RwLock<Vec<Arc<dyn AtomSpaceObserver>>>,
}

impl AtomSpace {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer. Observers are notified synchronously, in
    /// registration order, from inside the writer critical section of every
    /// subsequent mutating call.
    pub fn add_observer(&self, observer: Arc<dyn AtomSpaceObserver>) {
        self.observers.write().unwrap().push(observer);
    }

    fn notify_add(&self, atom: &Atom) {
        for obs in self.observers.read().unwrap().iter() {
            obs.on_add(atom);
        }
    }

    fn notify_truth_value_changed(&self, handle: Handle, old: TruthValue, new: TruthValue) {
        for obs in self.observers.read().unwrap().iter() {
            obs.on_truth_value_changed(handle, old, new);
        }
    }

    fn notify_remove(&self, handle: Handle) {
        for obs in self.observers.read().unwrap().iter() {
            obs.on_remove(handle);
        }
    }

    /// Add (or find, and revise) a node. Returns its handle.
    pub fn add_node(
        &self,
        atom_type: AtomType,
        name: impl Into<String>,
        tv: Option<TruthValue>,
    ) -> Result<Handle, AtomSpaceError> {
        if !atom_type.is_node() {
            return Err(AtomSpaceError::TypeMismatch(format!(
                "{atom_type} is not a node type"
            )));
        }
        let name = name.into();
        let key = ContentKey::node(atom_type, name.clone());

        let mut inner = self.inner.write().unwrap();
        if let Some(&handle) = inner.content_index.get(&key) {
            if let Some(tv) = tv {
                self.revise_locked(&mut inner, handle, tv);
            }
            return Ok(handle);
        }

        let handle = inner.next_handle();
        let atom = Atom::new_node(handle, atom_type, name, tv.unwrap_or_default());
        inner.insert(atom);
        let atom_ref = inner.get(handle).expect("just inserted");
        self.notify_add(atom_ref);
        Ok(handle)
    }

    /// Add (or find, and revise) a link. Fails with `DanglingReference` if
    /// any handle in `outgoing` is unknown in this AtomSpace.
    pub fn add_link(
        &self,
        atom_type: AtomType,
        outgoing: Vec<Handle>,
        tv: Option<TruthValue>,
    ) -> Result<Handle, AtomSpaceError> {
        if !atom_type.is_link() {
            return Err(AtomSpaceError::TypeMismatch(format!(
                "{atom_type} is not a link type"
            )));
        }

        let mut inner = self.inner.write().unwrap();
        for &target in &outgoing {
            if inner.get(target).is_none() {
                return Err(AtomSpaceError::DanglingReference(target));
            }
        }

        let key = ContentKey::link(atom_type, outgoing.clone());
        if let Some(&handle) = inner.content_index.get(&key) {
            if let Some(tv) = tv {
                self.revise_locked(&mut inner, handle, tv);
            }
            return Ok(handle);
        }

        let handle = inner.next_handle();
        let atom = Atom::new_link(handle, atom_type, outgoing, tv.unwrap_or_default());
        inner.insert(atom);
        let atom_ref = inner.get(handle).expect("just inserted");
        self.notify_add(atom_ref);
        Ok(handle)
    }

    fn revise_locked(&self, inner: &mut Inner, handle: Handle, tv: TruthValue) {
        let old = inner.get(handle).map(|a| a.truth_value());
        let Some(old) = old else { return };
        let revised = old.revise(tv);
        if let Some(atom) = inner.get_mut(handle) {
            atom.set_truth_value(revised);
        }
        self.notify_truth_value_changed(handle, old, revised);
    }

    pub fn get_atom(&self, handle: Handle) -> Option<Atom> {
        self.inner.read().unwrap().get(handle).cloned()
    }

    /// Atoms of exactly `atom_type`, or (when `include_subtypes`) of
    /// `atom_type` or any transitive subtype. Iteration order is stable
    /// within a single call (handle order) but unspecified across calls.
    pub fn get_by_type(&self, atom_type: AtomType, include_subtypes: bool) -> Vec<Handle> {
        self.inner.read().unwrap().by_type(atom_type, include_subtypes)
    }

    pub fn incoming(&self, handle: Handle) -> Vec<Handle> {
        self.inner.read().unwrap().incoming(handle).into_iter().collect()
    }

    /// Whole-value overwrite of an atom's truth value (no revision).
    pub fn set_truth_value(&self, handle: Handle, tv: TruthValue) -> Result<(), AtomSpaceError> {
        let mut inner = self.inner.write().unwrap();
        let old = inner
            .get(handle)
            .map(|a| a.truth_value())
            .ok_or(AtomSpaceError::UnknownAtom(handle))?;
        inner.get_mut(handle).unwrap().set_truth_value(tv);
        drop(inner);
        self.notify_truth_value_changed(handle, old, tv);
        Ok(())
    }

    /// Direct set of an atom's attention value. The caller is responsible
    /// for fund invariants; use [`crate::attention::AttentionBank::stimulate`]
    /// for a fund-safe transfer (`spec.md` §4.1, §4.7).
    pub fn set_attention_value(
        &self,
        handle: Handle,
        av: crate::attention_value::AttentionValue,
    ) -> Result<(), AtomSpaceError> {
        let mut inner = self.inner.write().unwrap();
        let atom = inner.get_mut(handle).ok_or(AtomSpaceError::UnknownAtom(handle))?;
        atom.set_attention_value(av);
        Ok(())
    }

    /// Remove an atom. Non-recursive removal fails with `HasIncoming` when
    /// the incoming set is non-empty. Recursive removal deletes the atom and
    /// every atom transitively reachable via incoming sets, each exactly
    /// once, removed leaf-first so referential closure is never broken
    /// mid-operation (`spec.md` §4.1, §9 Open Questions).
    pub fn remove_atom(&self, handle: Handle, recursive: bool) -> Result<bool, AtomSpaceError> {
        let mut inner = self.inner.write().unwrap();
        if inner.get(handle).is_none() {
            return Err(AtomSpaceError::UnknownAtom(handle));
        }

        if !recursive {
            if !inner.incoming(handle).is_empty() {
                return Err(AtomSpaceError::HasIncoming(handle));
            }
            inner.remove_one(handle);
            drop(inner);
            self.notify_remove(handle);
            return Ok(true);
        }

        // BFS over the incoming-set graph from `handle`: every atom visited
        // transitively references `handle`. The incoming-set graph is a DAG
        // (a link's outgoing is fixed at creation and can't name itself), so
        // this terminates and visits each atom exactly once.
        let mut visited = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(handle);
        seen.insert(handle);
        while let Some(h) = queue.pop_front() {
            visited.push(h);
            for referrer in inner.incoming(h) {
                if seen.insert(referrer) {
                    queue.push_back(referrer);
                }
            }
        }

        // Remove leaf-first: the last atom visited has no remaining
        // incoming (by construction, everything referencing it is already
        // in `visited` and will have been removed before we reach it).
        for h in visited.iter().rev() {
            inner.remove_one(*h);
        }
        drop(inner);
        for h in visited.iter().rev() {
            self.notify_remove(*h);
        }
        Ok(true)
    }

    pub fn size(&self) -> usize {
        self.inner.read().unwrap().size()
    }

    pub fn clear(&self) {
        self.inner.write().unwrap().clear();
    }
}

impl Default for AtomSpace {
    fn default() -> Self {
        Self::new()
    }
}
