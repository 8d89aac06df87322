//! Index structures backing the AtomSpace: content-key dedup, per-type
//! membership, and incoming sets (`spec.md` §3 "Indices", §4.2).

use crate::atom::{Atom, ContentKey};
use crate::handle::Handle;
use crate::types::AtomType;
use std::collections::{BTreeSet, HashMap};

/// The mutable state of an AtomSpace, guarded by a single
/// `std::sync::RwLock` in [`super::AtomSpace`] (`spec.md` §5).
///
/// Atoms live in an arena (`Vec<Option<Atom>>`) indexed by `Handle`; removal
/// tombstones the slot rather than reusing the index, so handle stability
/// holds even across `remove_atom` (`spec.md` §3 "Handle stability").
#[derive(Default)]
pub(super) struct Inner {
    pub(super) arena: Vec<Option<Atom>>,
    pub(super) content_index: HashMap<ContentKey, Handle>,
    pub(super) type_index: HashMap<AtomType, BTreeSet<Handle>>,
    pub(super) incoming_index: HashMap<Handle, BTreeSet<Handle>>,
}

impl Inner {
    pub(super) fn get(&self, handle: Handle) -> Option<&Atom> {
        self.arena.get(handle.index() as usize).and_then(|a| a.as_ref())
    }

    pub(super) fn get_mut(&mut self, handle: Handle) -> Option<&mut Atom> {
        self.arena.get_mut(handle.index() as usize).and_then(|a| a.as_mut())
    }

    pub(super) fn next_handle(&self) -> Handle {
        Handle::from_index(self.arena.len() as u64)
    }

    pub(super) fn insert(&mut self, atom: Atom) {
        let handle = atom.handle();
        let atom_type = atom.atom_type();

        if let Some(outgoing) = atom.outgoing() {
            for &target in outgoing {
                self.incoming_index.entry(target).or_default().insert(handle);
            }
        }

        self.content_index.insert(atom.content_key(), handle);
        self.type_index.entry(atom_type).or_default().insert(handle);

        let idx = handle.index() as usize;
        if idx == self.arena.len() {
            self.arena.push(Some(atom));
        } else {
            self.arena[idx] = Some(atom);
        }
    }

    /// Remove a single atom's bookkeeping. Callers are responsible for
    /// having already verified it is safe to do so (no remaining incoming,
    /// or part of a reverse-topological recursive removal).
    pub(super) fn remove_one(&mut self, handle: Handle) -> Option<Atom> {
        let atom = self.arena.get_mut(handle.index() as usize)?.take()?;

        self.content_index.remove(&atom.content_key());
        if let Some(set) = self.type_index.get_mut(&atom.atom_type()) {
            set.remove(&handle);
        }
        if let Some(outgoing) = atom.outgoing() {
            for target in outgoing {
                if let Some(set) = self.incoming_index.get_mut(target) {
                    set.remove(&handle);
                }
            }
        }
        self.incoming_index.remove(&handle);

        Some(atom)
    }

    pub(super) fn incoming(&self, handle: Handle) -> BTreeSet<Handle> {
        self.incoming_index.get(&handle).cloned().unwrap_or_default()
    }

    /// Handles of atoms whose exact type is `atom_type`, or — when
    /// `include_subtypes` — whose type is `atom_type` or any transitive
    /// subtype of it.
    pub(super) fn by_type(&self, atom_type: AtomType, include_subtypes: bool) -> Vec<Handle> {
        let mut out: BTreeSet<Handle> = self
            .type_index
            .get(&atom_type)
            .cloned()
            .unwrap_or_default();

        if include_subtypes {
            for sub in atom_type.transitive_subtypes() {
                if let Some(set) = self.type_index.get(&sub) {
                    out.extend(set.iter().copied());
                }
            }
        }

        out.into_iter().collect()
    }

    pub(super) fn size(&self) -> usize {
        self.content_index.len()
    }

    pub(super) fn clear(&mut self) {
        self.arena.clear();
        self.content_index.clear();
        self.type_index.clear();
        self.incoming_index.clear();
    }
}
