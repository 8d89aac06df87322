//! Unification of a pattern term against a candidate atom, under a partial
//! binding (`spec.md` §4.5 step 3).

use super::pattern::PatternTerm;
use crate::atomspace::AtomSpace;
use crate::handle::Handle;
use crate::types::AtomType;
use std::collections::HashMap;

pub(super) type Bindings = HashMap<String, Handle>;

/// Attempt to unify `term` against `handle`, extending `bindings`. Returns
/// every extension that succeeds — usually zero or one, but an unordered
/// link (`spec.md` §4.5) can admit several distinct subterm↔outgoing
/// assignments for the same candidate atom, and all of them are real
/// groundings. The caller backtracks by iterating the returned bindings
/// (including the empty case), since `bindings` itself is never mutated in
/// place.
pub(super) fn unify(
    term: &PatternTerm,
    handle: Handle,
    atomspace: &AtomSpace,
    bindings: &Bindings,
    constraint_of: &dyn Fn(&str) -> Option<AtomType>,
) -> Vec<Bindings> {
    match term {
        PatternTerm::Var(name) => {
            if let Some(&bound) = bindings.get(name) {
                return if bound == handle { vec![bindings.clone()] } else { Vec::new() };
            }
            if let Some(constraint) = constraint_of(name) {
                let Some(atom) = atomspace.get_atom(handle) else { return Vec::new() };
                if !atom.atom_type().is_a(constraint) {
                    return Vec::new();
                }
            }
            let mut next = bindings.clone();
            next.insert(name.clone(), handle);
            vec![next]
        }
        PatternTerm::Const(expected) => {
            if *expected == handle { vec![bindings.clone()] } else { Vec::new() }
        }
        PatternTerm::Link(atom_type, subterms) => {
            let Some(atom) = atomspace.get_atom(handle) else { return Vec::new() };
            if !atom.atom_type().is_a(*atom_type) {
                return Vec::new();
            }
            let Some(outgoing) = atom.outgoing() else { return Vec::new() };
            if outgoing.len() != subterms.len() {
                return Vec::new();
            }
            if atom_type.is_unordered() {
                unify_unordered(subterms, outgoing, atomspace, bindings, constraint_of)
            } else {
                let mut current = vec![bindings.clone()];
                for (st, &target) in subterms.iter().zip(outgoing.iter()) {
                    let mut next = Vec::new();
                    for b in &current {
                        next.extend(unify(st, target, atomspace, b, constraint_of));
                    }
                    current = next;
                    if current.is_empty() {
                        return Vec::new();
                    }
                }
                current
            }
        }
    }
}

/// Unification for `And`/`Or` links: outgoing order is not significant, so
/// every bijective assignment of subterms to outgoing positions that
/// unifies is a distinct grounding (`spec.md` §4.5 "Link order … except for
/// Link types declared unordered", and §4.5's completeness invariant that
/// every grounding is enumerated).
fn unify_unordered(
    subterms: &[PatternTerm],
    outgoing: &[Handle],
    atomspace: &AtomSpace,
    bindings: &Bindings,
    constraint_of: &dyn Fn(&str) -> Option<AtomType>,
) -> Vec<Bindings> {
    fn go(
        subterms: &[PatternTerm],
        remaining: &[Handle],
        bindings: &Bindings,
        atomspace: &AtomSpace,
        constraint_of: &dyn Fn(&str) -> Option<AtomType>,
        out: &mut Vec<Bindings>,
    ) {
        let Some((first, rest_terms)) = subterms.split_first() else {
            out.push(bindings.clone());
            return;
        };
        for (pos, &candidate) in remaining.iter().enumerate() {
            for next_bindings in unify(first, candidate, atomspace, bindings, constraint_of) {
                let mut remaining_rest = remaining.to_vec();
                remaining_rest.remove(pos);
                go(rest_terms, &remaining_rest, &next_bindings, atomspace, constraint_of, out);
            }
        }
    }
    let mut out = Vec::new();
    go(subterms, outgoing, bindings, atomspace, constraint_of, &mut out);
    out
}
