//! The rule engine (`spec.md` §4.6): a driver over the pattern matcher. A
//! [`Rule`] is premises + conclusion + a tv-formula; [`forward`] and
//! [`backward`] are the two chaining strategies PLN's rule catalog
//! ([`pln`]) is built from.

pub mod backward;
pub mod forward;
pub mod pln;

use crate::atomspace::AtomSpace;
use crate::error::{Error, RuleEngineError};
use crate::handle::Handle;
use crate::matcher::{Grounding, Pattern, PatternTerm};
use crate::truth_value::TruthValue;

pub use backward::{backward_chain, BackwardReport};
pub use forward::{forward_chain, ForwardReport};

/// How a chainer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// No further change was possible (forward) / the search space was
    /// exhausted (backward) before the step budget ran out.
    FixedPoint,
    /// The step budget was exhausted first.
    Budget,
}

/// `(premise-tvs) -> tv`, a pure function (`spec.md` §4.6). A plain function
/// pointer rather than a boxed closure: every PLN rule's formula is a
/// stateless arithmetic combination of its premises' truth values.
pub type TvFormula = fn(&[TruthValue]) -> TruthValue;

/// `(premises: pattern list, conclusion: pattern, tv-formula)` (`spec.md`
/// §4.6). `premises` bundles the premise clauses as one [`Pattern`] (a
/// conjunction, same as the matcher already expects); `conclusion` is a
/// template instantiated against a premise grounding to produce the
/// derived atom.
pub struct Rule {
    pub name: &'static str,
    pub premises: Pattern,
    pub conclusion: PatternTerm,
    pub tv_formula: TvFormula,
}

/// Resolve `term` to a concrete handle under `bindings`: variables look
/// themselves up in the grounding, links recurse and then look themselves
/// up (or get created) via `AtomSpace::add_link`'s content-addressed
/// dedup — `tv` is only applied at the top level the caller calls with,
/// since nested subterms pass `None` and never revise an existing premise's
/// truth value just because it happened to get re-instantiated.
pub(crate) fn instantiate(
    term: &PatternTerm,
    bindings: &Grounding,
    atomspace: &AtomSpace,
    tv: Option<TruthValue>,
) -> Result<Handle, Error> {
    match term {
        PatternTerm::Const(handle) => Ok(*handle),
        PatternTerm::Var(name) => bindings.get(name).copied().ok_or_else(|| {
            Error::RuleEngine(RuleEngineError::UnboundVariable(name.clone()))
        }),
        PatternTerm::Link(atom_type, subterms) => {
            let outgoing = subterms
                .iter()
                .map(|st| instantiate(st, bindings, atomspace, None))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(atomspace.add_link(*atom_type, outgoing, tv)?)
        }
    }
}

/// The truth value of each of `rule`'s premise clauses under `grounding` —
/// fetched by re-resolving the (already-matched, hence already-present)
/// clause atoms, not by re-deriving them.
pub(crate) fn premise_truth_values(
    rule: &Rule,
    grounding: &Grounding,
    atomspace: &AtomSpace,
) -> Result<Vec<TruthValue>, Error> {
    rule.premises
        .clauses
        .iter()
        .map(|clause| {
            let handle = instantiate(clause, grounding, atomspace, None)?;
            Ok(atomspace
                .get_atom(handle)
                .map(|a| a.truth_value())
                .unwrap_or_default())
        })
        .collect()
}
