//! Opaque, stable atom identifiers (`spec.md` §3 "Handle").

use std::fmt;

/// An opaque, stable identifier for an atom within one [`crate::atomspace::AtomSpace`].
///
/// Equal atoms share one handle (content-addressed; see the AtomSpace
/// invariants). Handles are cheap to copy and hash, and are never reused for
/// a different atom once issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(pub(crate) u64);

impl Handle {
    /// The raw arena index backing this handle. Exposed for storage backends
    /// that need a stable integer key; not meaningful across AtomSpaces.
    pub fn index(self) -> u64 {
        self.0
    }

    pub(crate) fn from_index(index: u64) -> Self {
        Handle(index)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
