//! The pattern matcher (`spec.md` §4.5): given a pattern, enumerate every
//! grounding — a variable-to-atom binding witnessed by the current
//! AtomSpace contents.

mod pattern;
mod plan;
mod unify;

pub use pattern::{Pattern, PatternTerm, VarDecl};

use crate::atomspace::AtomSpace;
use crate::cancel::CancellationToken;
use crate::error::MatcherError;
use crate::handle::Handle;
use crate::types::AtomType;
use std::collections::{HashMap, HashSet};
use unify::{unify, Bindings};

/// A single grounding: a mapping from variable name to the atom it is bound
/// to in this witness.
pub type Grounding = HashMap<String, Handle>;

/// Candidate atoms for `clause` under `bindings`: atoms of the clause's type
/// (or a subtype), optionally narrowed via the incoming-set index when one
/// of the clause's immediate subterms is already a bound variable
/// (`spec.md` §4.5 step 2).
fn candidates_for_clause(
    clause: &PatternTerm,
    bindings: &Bindings,
    atomspace: &AtomSpace,
) -> Vec<Handle> {
    let PatternTerm::Link(atom_type, subterms) = clause else {
        return Vec::new();
    };

    let mut via_incoming: Option<HashSet<Handle>> = None;
    for st in subterms {
        if let PatternTerm::Var(name) = st {
            if let Some(&bound) = bindings.get(name) {
                let set: HashSet<Handle> = atomspace.incoming(bound).into_iter().collect();
                via_incoming = Some(match via_incoming {
                    None => set,
                    Some(existing) => existing.intersection(&set).copied().collect(),
                });
            }
        }
    }

    let by_type: HashSet<Handle> = atomspace.get_by_type(*atom_type, true).into_iter().collect();
    match via_incoming {
        Some(narrowed) => narrowed.intersection(&by_type).copied().collect(),
        None => by_type.into_iter().collect(),
    }
}

/// One level of the explicit binding stack the matcher walks instead of
/// recursing per clause — bounds stack use on deep patterns and gives the
/// cancellation token a check point between clauses (`spec.md` §9).
struct Frame {
    clause_idx: usize,
    candidates: Vec<Handle>,
    next: usize,
    bindings: Bindings,
}

/// Enumerate every grounding of `pattern` over `atomspace`. Completeness,
/// no-duplicate-bindings, and type-constraint soundness hold per
/// `spec.md` §4.5. An empty result is not an error — it's the normal
/// outcome of a pattern with no groundings.
pub fn match_pattern(
    pattern: &Pattern,
    atomspace: &AtomSpace,
    cancel: &CancellationToken,
) -> Result<Vec<Grounding>, MatcherError> {
    let order = plan::order_clauses(pattern, atomspace);
    let ordered_clauses: Vec<&PatternTerm> = order.iter().map(|&i| &pattern.clauses[i]).collect();

    let constraint_of = |name: &str| pattern.type_constraint(name);

    let mut results = Vec::new();
    let mut seen: HashSet<Vec<(String, Handle)>> = HashSet::new();

    if ordered_clauses.is_empty() {
        return Ok(results);
    }

    let first_candidates = candidates_for_clause(ordered_clauses[0], &Bindings::new(), atomspace);
    let mut stack = vec![Frame {
        clause_idx: 0,
        candidates: first_candidates,
        next: 0,
        bindings: Bindings::new(),
    }];

    while let Some(frame) = stack.last_mut() {
        if cancel.is_cancelled() {
            break;
        }
        if frame.next >= frame.candidates.len() {
            stack.pop();
            continue;
        }
        let candidate = frame.candidates[frame.next];
        frame.next += 1;
        let clause_idx = frame.clause_idx;
        let base_bindings = frame.bindings.clone();

        // An unordered-link clause can admit several distinct subterm
        // assignments against this one candidate atom; each is a separate
        // grounding and gets its own continuation below.
        let all_bindings = unify(
            ordered_clauses[clause_idx],
            candidate,
            atomspace,
            &base_bindings,
            &constraint_of,
        );

        if clause_idx + 1 == ordered_clauses.len() {
            for new_bindings in all_bindings {
                let mut key: Vec<(String, Handle)> =
                    new_bindings.iter().map(|(k, v)| (k.clone(), *v)).collect();
                key.sort();
                if seen.insert(key) {
                    results.push(new_bindings);
                }
            }
        } else {
            for new_bindings in all_bindings {
                let next_candidates =
                    candidates_for_clause(ordered_clauses[clause_idx + 1], &new_bindings, atomspace);
                stack.push(Frame {
                    clause_idx: clause_idx + 1,
                    candidates: next_candidates,
                    next: 0,
                    bindings: new_bindings,
                });
            }
        }
    }

    Ok(results)
}

/// True if `sub` is `sup` or a transitive subtype, exposed here for matcher
/// clients that want to pre-filter candidates themselves.
pub fn is_a(sub: AtomType, sup: AtomType) -> bool {
    sub.is_a(sup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truth_value::TruthValue;

    fn setup_mammals() -> (AtomSpace, Handle, Handle, Handle, Handle) {
        let space = AtomSpace::new();
        let dog = space.add_node(AtomType::ConceptNode, "dog", None).unwrap();
        let cat = space.add_node(AtomType::ConceptNode, "cat", None).unwrap();
        let mammal = space.add_node(AtomType::ConceptNode, "mammal", None).unwrap();
        let animal = space.add_node(AtomType::ConceptNode, "animal", None).unwrap();
        space
            .add_link(AtomType::InheritanceLink, vec![dog, mammal], Some(TruthValue::new(0.9, 0.8)))
            .unwrap();
        space
            .add_link(AtomType::InheritanceLink, vec![cat, mammal], None)
            .unwrap();
        space
            .add_link(AtomType::InheritanceLink, vec![dog, animal], None)
            .unwrap();
        (space, dog, cat, mammal, animal)
    }

    #[test]
    fn matches_exactly_two_bindings() {
        let (space, dog, cat, mammal, _animal) = setup_mammals();
        let pattern = Pattern::new(
            vec![VarDecl::new("$X", None)],
            vec![PatternTerm::Link(AtomType::InheritanceLink, vec![
                PatternTerm::Var("$X".into()),
                PatternTerm::Const(mammal),
            ])],
        )
        .unwrap();

        let groundings = match_pattern(&pattern, &space, &CancellationToken::new()).unwrap();
        assert_eq!(groundings.len(), 2);
        let bound: HashSet<Handle> = groundings.iter().map(|g| g["$X"]).collect();
        assert_eq!(bound, HashSet::from([dog, cat]));
    }

    #[test]
    fn empty_atomspace_yields_empty_result() {
        let space = AtomSpace::new();
        let dummy = space.add_node(AtomType::ConceptNode, "x", None).unwrap();
        space.remove_atom(dummy, true).unwrap();
        let pattern = Pattern::new(
            vec![VarDecl::new("$X", None)],
            vec![PatternTerm::Link(AtomType::InheritanceLink, vec![
                PatternTerm::Var("$X".into()),
                PatternTerm::Var("$X".into()),
            ])],
        )
        .unwrap();
        let groundings = match_pattern(&pattern, &space, &CancellationToken::new()).unwrap();
        assert!(groundings.is_empty());
    }

    #[test]
    fn type_constraint_soundness() {
        let (space, dog, _cat, mammal, _animal) = setup_mammals();
        space.add_node(AtomType::PredicateNode, "not-a-concept", None).unwrap();
        // Constrain $X to ConceptNode; every grounding must respect it even
        // though the pattern alone wouldn't otherwise exclude other types.
        let pattern = Pattern::new(
            vec![VarDecl::new("$X", Some(AtomType::ConceptNode))],
            vec![PatternTerm::Link(AtomType::InheritanceLink, vec![
                PatternTerm::Var("$X".into()),
                PatternTerm::Const(mammal),
            ])],
        )
        .unwrap();
        let groundings = match_pattern(&pattern, &space, &CancellationToken::new()).unwrap();
        for g in &groundings {
            let atom = space.get_atom(g["$X"]).unwrap();
            assert!(atom.atom_type().is_a(AtomType::ConceptNode));
        }
        assert!(groundings.iter().any(|g| g["$X"] == dog));
    }

    #[test]
    fn no_duplicate_bindings_when_same_var_repeats() {
        let space = AtomSpace::new();
        let a = space.add_node(AtomType::ConceptNode, "a", None).unwrap();
        space.add_link(AtomType::SimilarityLink, vec![a, a], None).unwrap();
        let pattern = Pattern::new(
            vec![VarDecl::new("$X", None)],
            vec![PatternTerm::Link(AtomType::SimilarityLink, vec![
                PatternTerm::Var("$X".into()),
                PatternTerm::Var("$X".into()),
            ])],
        )
        .unwrap();
        let groundings = match_pattern(&pattern, &space, &CancellationToken::new()).unwrap();
        assert_eq!(groundings.len(), 1);
        assert_eq!(groundings[0]["$X"], a);
    }

    #[test]
    fn unordered_and_link_matches_either_order() {
        let space = AtomSpace::new();
        let a = space.add_node(AtomType::ConceptNode, "a", None).unwrap();
        let b = space.add_node(AtomType::ConceptNode, "b", None).unwrap();
        space.add_link(AtomType::AndLink, vec![a, b], None).unwrap();

        let pattern = Pattern::new(
            vec![VarDecl::new("$X", None), VarDecl::new("$Y", None)],
            vec![PatternTerm::Link(AtomType::AndLink, vec![
                PatternTerm::Const(b),
                PatternTerm::Var("$X".into()),
            ])],
        )
        .unwrap();
        let groundings = match_pattern(&pattern, &space, &CancellationToken::new()).unwrap();
        assert_eq!(groundings.len(), 1);
        assert_eq!(groundings[0]["$X"], a);
    }

    #[test]
    fn cancellation_yields_partial_or_empty_results_without_panicking() {
        let (space, ..) = setup_mammals();
        let pattern = Pattern::new(
            vec![VarDecl::new("$X", None)],
            vec![PatternTerm::Link(AtomType::InheritanceLink, vec![
                PatternTerm::Var("$X".into()),
                PatternTerm::Var("$X".into()),
            ])],
        )
        .unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let groundings = match_pattern(&pattern, &space, &token).unwrap();
        assert!(groundings.len() <= 3);
    }
}
