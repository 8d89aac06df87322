//! Change notification (`spec.md` §4.1, §9).
//!
//! The AtomSpace calls each registered observer synchronously from inside its
//! writer critical section. Observers must perform only bounded,
//! non-blocking work — e.g. enqueue onto a channel a storage backend drains
//! off-thread — and must never re-enter a mutating AtomSpace call from
//! within the callback. This mirrors the teacher's `OutputSink` trait
//! (`src/atom.rs` in the teacher repo): an injectable sink so observable
//! side effects stay testable instead of going through ambient global state.

use crate::atom::Atom;
use crate::handle::Handle;
use crate::truth_value::TruthValue;

/// A synchronous observer of AtomSpace lifecycle events.
pub trait AtomSpaceObserver: Send + Sync {
    /// A new atom was created (not a dedup hit on an existing one).
    fn on_add(&self, atom: &Atom) {
        let _ = atom;
    }

    /// An atom's truth value was replaced or revised.
    fn on_truth_value_changed(&self, handle: Handle, old: TruthValue, new: TruthValue) {
        let (_, _, _) = (handle, old, new);
    }

    /// An atom was removed from the AtomSpace.
    fn on_remove(&self, handle: Handle) {
        let _ = handle;
    }
}

/// An observer that does nothing, for tests and ephemeral use — the
/// AtomSpace equivalent of the teacher's `NullSink`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl AtomSpaceObserver for NullObserver {}
