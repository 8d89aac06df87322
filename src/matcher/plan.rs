//! Join-plan compilation (`spec.md` §4.5 step 1): order clauses to maximize
//! selectivity, preferring fewer free variables and a rarer predicate type
//! first.

use super::pattern::{Pattern, PatternTerm};
use crate::atomspace::AtomSpace;
use std::collections::HashSet;

fn free_var_count(term: &PatternTerm) -> usize {
    let mut vars = HashSet::new();
    fn collect(term: &PatternTerm, vars: &mut HashSet<String>) {
        match term {
            PatternTerm::Var(name) => {
                vars.insert(name.clone());
            }
            PatternTerm::Const(_) => {}
            PatternTerm::Link(_, subterms) => {
                for st in subterms {
                    collect(st, vars);
                }
            }
        }
    }
    collect(term, &mut vars);
    vars.len()
}

/// Returns clause indices from `pattern.clauses`, ordered by ascending
/// `(free_var_count, candidate_count)` — clauses with fewer free variables
/// and rarer types are explored first, so dead ends are discovered with the
/// least wasted work.
pub(super) fn order_clauses(pattern: &Pattern, atomspace: &AtomSpace) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..pattern.clauses.len()).collect();
    let scored: Vec<(usize, usize)> = pattern
        .clauses
        .iter()
        .map(|clause| {
            let vars = free_var_count(clause);
            let candidates = clause
                .link_type()
                .map(|t| atomspace.get_by_type(t, true).len())
                .unwrap_or(usize::MAX);
            (vars, candidates)
        })
        .collect();
    indices.sort_by_key(|&i| scored[i]);
    indices
}
