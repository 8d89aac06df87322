//! Atoms: the vertices and hyperedges of the knowledge hypergraph
//! (`spec.md` §3).

use crate::attention_value::AttentionValue;
use crate::handle::Handle;
use crate::truth_value::TruthValue;
use crate::types::AtomType;

/// The immutable payload of an atom: either a named node or a link over an
/// ordered sequence of outgoing handles. Immutable for the atom's lifetime —
/// only the truth/attention slots on [`Atom`] are mutable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AtomContent {
    Node { name: String },
    Link { outgoing: Vec<Handle> },
}

/// The key that determines content-addressed identity: `(type, name)` for
/// nodes, `(type, outgoing)` for links. Two atoms with equal content keys
/// are the same atom (`spec.md` §3 "Content uniqueness").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub atom_type: AtomType,
    pub content: AtomContent,
}

impl ContentKey {
    pub fn node(atom_type: AtomType, name: impl Into<String>) -> Self {
        Self {
            atom_type,
            content: AtomContent::Node { name: name.into() },
        }
    }

    pub fn link(atom_type: AtomType, outgoing: Vec<Handle>) -> Self {
        Self {
            atom_type,
            content: AtomContent::Link { outgoing },
        }
    }
}

/// A node or hyperedge of the hypergraph, with mutable truth/attention
/// metadata. `outgoing` order is significant except for `And`/`Or` links,
/// whose matcher semantics treat it as a multiset (`spec.md` §4.5) — the
/// stored order is still whatever was supplied at creation.
#[derive(Debug, Clone)]
pub struct Atom {
    handle: Handle,
    atom_type: AtomType,
    content: AtomContent,
    truth_value: TruthValue,
    attention_value: AttentionValue,
}

impl Atom {
    pub(crate) fn new_node(
        handle: Handle,
        atom_type: AtomType,
        name: impl Into<String>,
        truth_value: TruthValue,
    ) -> Self {
        Self {
            handle,
            atom_type,
            content: AtomContent::Node { name: name.into() },
            truth_value,
            attention_value: AttentionValue::default(),
        }
    }

    pub(crate) fn new_link(
        handle: Handle,
        atom_type: AtomType,
        outgoing: Vec<Handle>,
        truth_value: TruthValue,
    ) -> Self {
        Self {
            handle,
            atom_type,
            content: AtomContent::Link { outgoing },
            truth_value,
            attention_value: AttentionValue::default(),
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn atom_type(&self) -> AtomType {
        self.atom_type
    }

    pub fn is_node(&self) -> bool {
        matches!(self.content, AtomContent::Node { .. })
    }

    pub fn is_link(&self) -> bool {
        matches!(self.content, AtomContent::Link { .. })
    }

    /// The node's name, or `None` if this atom is a link.
    pub fn name(&self) -> Option<&str> {
        match &self.content {
            AtomContent::Node { name } => Some(name.as_str()),
            AtomContent::Link { .. } => None,
        }
    }

    /// The link's outgoing sequence, or `None` if this atom is a node.
    pub fn outgoing(&self) -> Option<&[Handle]> {
        match &self.content {
            AtomContent::Link { outgoing } => Some(outgoing.as_slice()),
            AtomContent::Node { .. } => None,
        }
    }

    pub fn truth_value(&self) -> TruthValue {
        self.truth_value
    }

    pub(crate) fn set_truth_value(&mut self, tv: TruthValue) {
        self.truth_value = tv;
    }

    pub fn attention_value(&self) -> AttentionValue {
        self.attention_value
    }

    pub(crate) fn set_attention_value(&mut self, av: AttentionValue) {
        self.attention_value = av;
    }

    pub fn content_key(&self) -> ContentKey {
        ContentKey {
            atom_type: self.atom_type,
            content: self.content.clone(),
        }
    }
}
