//! Backward chaining (`spec.md` §4.6): starting from a target pattern, find
//! rules whose conclusion unifies with the target, recurse on premises, and
//! memoize visited clauses to avoid cycling.

use super::{Rule, Termination};
use crate::atomspace::AtomSpace;
use crate::cancel::CancellationToken;
use crate::error::{Cancelled, Error};
use crate::matcher::{match_pattern, Pattern, PatternTerm, VarDecl};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackwardReport {
    pub proved: bool,
    pub steps_taken: usize,
    pub terminated: Termination,
}

/// A substitution from a rule template's own variable names to whatever
/// term occupies the corresponding position in the target being proved.
type TemplateSubst = HashMap<String, PatternTerm>;

fn collect_vars(term: &PatternTerm, out: &mut HashSet<String>) {
    match term {
        PatternTerm::Var(name) => {
            out.insert(name.clone());
        }
        PatternTerm::Const(_) => {}
        PatternTerm::Link(_, subterms) => {
            for st in subterms {
                collect_vars(st, out);
            }
        }
    }
}

/// Structurally unify a rule's conclusion template against the clause being
/// proved, producing a substitution for the rule's own variables. This is
/// template-to-template unification (both sides may contain variables),
/// distinct from the matcher's template-to-ground-atom unification.
fn unify_templates(template: &PatternTerm, target: &PatternTerm, subst: &mut TemplateSubst) -> bool {
    match (template, target) {
        (PatternTerm::Var(name), _) => match subst.get(name) {
            Some(existing) => existing == target,
            None => {
                subst.insert(name.clone(), target.clone());
                true
            }
        },
        (PatternTerm::Const(a), PatternTerm::Const(b)) => a == b,
        (PatternTerm::Link(t1, args1), PatternTerm::Link(t2, args2)) => {
            t1 == t2 && args1.len() == args2.len() && {
                args1.iter().zip(args2.iter()).all(|(a, b)| unify_templates(a, b, subst))
            }
        }
        _ => false,
    }
}

fn substitute(term: &PatternTerm, subst: &TemplateSubst) -> PatternTerm {
    match term {
        PatternTerm::Var(name) => subst.get(name).cloned().unwrap_or_else(|| term.clone()),
        PatternTerm::Const(_) => term.clone(),
        PatternTerm::Link(atom_type, subterms) => {
            PatternTerm::Link(*atom_type, subterms.iter().map(|st| substitute(st, subst)).collect())
        }
    }
}

fn single_clause_pattern(clause: &PatternTerm) -> Result<Pattern, Error> {
    let mut vars = HashSet::new();
    collect_vars(clause, &mut vars);
    let decls = vars.into_iter().map(|name| VarDecl::new(name, None)).collect();
    Ok(Pattern::new(decls, vec![clause.clone()])?)
}

#[allow(clippy::too_many_arguments)]
fn prove(
    clause: &PatternTerm,
    rules: &[Rule],
    atomspace: &AtomSpace,
    step_budget: usize,
    steps: &mut usize,
    memo: &mut HashSet<PatternTerm>,
    cancel: &CancellationToken,
) -> Result<bool, Error> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled(Cancelled));
    }
    if *steps >= step_budget {
        return Ok(false);
    }
    if !memo.insert(clause.clone()) {
        return Ok(false);
    }
    *steps += 1;

    let pattern = single_clause_pattern(clause)?;
    if !match_pattern(&pattern, atomspace, cancel)?.is_empty() {
        return Ok(true);
    }

    for rule in rules {
        let mut subst = TemplateSubst::new();
        if !unify_templates(&rule.conclusion, clause, &mut subst) {
            continue;
        }

        let mut all_proved = true;
        for premise in &rule.premises.clauses {
            let substituted = substitute(premise, &subst);
            if !prove(&substituted, rules, atomspace, step_budget, steps, memo, cancel)? {
                all_proved = false;
                break;
            }
        }
        if all_proved {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Attempts to prove `target` (a single clause) true, either directly
/// against the current AtomSpace or by finding a rule whose conclusion
/// matches it and recursively proving that rule's premises.
pub fn backward_chain(
    target: &PatternTerm,
    rules: &[Rule],
    atomspace: &AtomSpace,
    step_budget: usize,
    cancel: &CancellationToken,
) -> Result<BackwardReport, Error> {
    let mut steps = 0;
    let mut memo = HashSet::new();
    let proved = prove(target, rules, atomspace, step_budget, &mut steps, &mut memo, cancel)?;
    let terminated = if !proved && steps >= step_budget { Termination::Budget } else { Termination::FixedPoint };
    Ok(BackwardReport { proved, steps_taken: steps, terminated })
}
