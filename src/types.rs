//! The atom-type lattice (`spec.md` §4.2).
//!
//! A single-rooted DAG with `Atom` as the apex. The enumeration and its
//! inheritance edges are a static table, fixed at build time; subtype tests
//! are O(1) amortized via a precomputed ancestor bitset per type, built once
//! behind a [`once_cell::sync::Lazy`].
//!
//! The legacy OpenCog type hierarchy has a long tail of specialized node/link
//! kinds whose matcher semantics are inconsistent (see `spec.md` Open
//! Questions). This implementation recognizes only the subset needed by the
//! matcher, PLN rule catalog, and ECAN scenarios; anything else is rejected
//! explicitly via [`crate::error::AtomSpaceError::UnknownType`] rather than
//! silently accepted.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// A closed enumeration of recognized atom types, partitioned into node
/// types and link types, forming a single-rooted inheritance lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum AtomType {
    Atom,

    // -- node types --
    Node,
    ConceptNode,
    PredicateNode,
    VariableNode,
    NumberNode,
    SchemaNode,

    // -- link types --
    Link,
    ListLink,
    InheritanceLink,
    SimilarityLink,
    EvaluationLink,
    ImplicationLink,
    MemberLink,
    AndLink,
    OrLink,
    NotLink,
}

impl AtomType {
    /// All recognized types, apex first.
    pub const ALL: &'static [AtomType] = &[
        AtomType::Atom,
        AtomType::Node,
        AtomType::ConceptNode,
        AtomType::PredicateNode,
        AtomType::VariableNode,
        AtomType::NumberNode,
        AtomType::SchemaNode,
        AtomType::Link,
        AtomType::ListLink,
        AtomType::InheritanceLink,
        AtomType::SimilarityLink,
        AtomType::EvaluationLink,
        AtomType::ImplicationLink,
        AtomType::MemberLink,
        AtomType::AndLink,
        AtomType::OrLink,
        AtomType::NotLink,
    ];

    /// The immediate parent of this type in the lattice, or `None` for the apex.
    pub fn parent(self) -> Option<AtomType> {
        use AtomType::*;
        match self {
            Atom => None,
            Node | Link => Some(Atom),
            ConceptNode | PredicateNode | VariableNode | NumberNode | SchemaNode => Some(Node),
            ListLink | InheritanceLink | SimilarityLink | EvaluationLink | ImplicationLink
            | MemberLink | AndLink | OrLink | NotLink => Some(Link),
        }
    }

    /// True if every atom of this type is a Node (has a `name`, no `outgoing`).
    pub fn is_node(self) -> bool {
        LATTICE.is_a(self, AtomType::Node) || self == AtomType::Node
    }

    /// True if every atom of this type is a Link (has `outgoing`, no `name`).
    pub fn is_link(self) -> bool {
        LATTICE.is_a(self, AtomType::Link) || self == AtomType::Link
    }

    /// `And`/`Or` are the only link types whose outgoing order the matcher
    /// treats as a multiset rather than a sequence (`spec.md` §4.5).
    pub fn is_unordered(self) -> bool {
        matches!(self, AtomType::AndLink | AtomType::OrLink)
    }

    /// Is `self` the same type as, or a transitive subtype of, `other`?
    pub fn is_a(self, other: AtomType) -> bool {
        self == other || LATTICE.is_a(self, other)
    }

    /// Immediate subtypes of this type, in `ALL` order.
    pub fn subtypes(self) -> Vec<AtomType> {
        AtomType::ALL
            .iter()
            .copied()
            .filter(|t| t.parent() == Some(self))
            .collect()
    }

    /// All transitive subtypes of this type (excluding itself), in `ALL` order.
    pub fn transitive_subtypes(self) -> Vec<AtomType> {
        AtomType::ALL
            .iter()
            .copied()
            .filter(|&t| t != self && t.is_a(self))
            .collect()
    }

    /// Parse a type name as it would appear in a persisted schema or a
    /// host-supplied pattern declaration.
    pub fn from_name(name: &str) -> Option<AtomType> {
        NAME_TO_TYPE.get(name).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            AtomType::Atom => "Atom",
            AtomType::Node => "Node",
            AtomType::ConceptNode => "ConceptNode",
            AtomType::PredicateNode => "PredicateNode",
            AtomType::VariableNode => "VariableNode",
            AtomType::NumberNode => "NumberNode",
            AtomType::SchemaNode => "SchemaNode",
            AtomType::Link => "Link",
            AtomType::ListLink => "ListLink",
            AtomType::InheritanceLink => "InheritanceLink",
            AtomType::SimilarityLink => "SimilarityLink",
            AtomType::EvaluationLink => "EvaluationLink",
            AtomType::ImplicationLink => "ImplicationLink",
            AtomType::MemberLink => "MemberLink",
            AtomType::AndLink => "AndLink",
            AtomType::OrLink => "OrLink",
            AtomType::NotLink => "NotLink",
        }
    }
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

static NAME_TO_TYPE: Lazy<HashMap<&'static str, AtomType>> = Lazy::new(|| {
    AtomType::ALL.iter().map(|t| (t.name(), *t)).collect()
});

/// Precomputed ancestor bitsets, one per type, indexed by position in `ALL`.
/// Built once at first use; every `is_a` check after that is a bitset test.
struct TypeLattice {
    ancestors: Vec<u32>,
    index_of: HashMap<AtomType, usize>,
}

impl TypeLattice {
    fn build() -> Self {
        let index_of: HashMap<AtomType, usize> = AtomType::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| (*t, i))
            .collect();

        let mut ancestors = vec![0u32; AtomType::ALL.len()];
        for (i, t) in AtomType::ALL.iter().enumerate() {
            let mut cur = t.parent();
            while let Some(p) = cur {
                let pi = index_of[&p];
                ancestors[i] |= 1 << pi;
                cur = p.parent();
            }
        }
        Self { ancestors, index_of }
    }

    /// Is `sub` a strict transitive subtype of `sup`?
    fn is_a(&self, sub: AtomType, sup: AtomType) -> bool {
        let si = self.index_of[&sub];
        let pi = self.index_of[&sup];
        (self.ancestors[si] & (1 << pi)) != 0
    }
}

static LATTICE: Lazy<TypeLattice> = Lazy::new(TypeLattice::build);
