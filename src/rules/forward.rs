//! Forward chaining (`spec.md` §4.6): for each rule, enumerate all
//! groundings of its premise conjunction, apply its tv-formula, and add the
//! grounded conclusion back to the AtomSpace when the result clears the
//! confidence threshold. Iterates to a fixed point or a step budget.

use super::{instantiate, premise_truth_values, Rule, Termination};
use crate::atomspace::AtomSpace;
use crate::attention::AttentionBank;
use crate::cancel::CancellationToken;
use crate::error::{Cancelled, Error};
use crate::handle::Handle;
use crate::matcher::match_pattern;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForwardReport {
    pub derived: Vec<Handle>,
    pub steps_taken: usize,
    pub terminated: Option<Termination>,
}

/// Minimum confidence a derived conclusion needs to be added to the
/// AtomSpace — below this, a rule firing is treated as having produced no
/// usable evidence (`spec.md` §4.6 "exceeds configured thresholds").
const MIN_CONFIDENCE: f64 = 1e-9;

/// Runs every rule in `rules` repeatedly until no rule derives anything new
/// (a fixed point) or `step_budget` steps have elapsed, whichever comes
/// first. One "step" is one rule's single pass over its current groundings.
/// `bank`, if supplied, records Hebbian co-occurrence between each
/// grounding's premise atoms (`spec.md` §4.7 "inference observer").
pub fn forward_chain(
    rules: &[Rule],
    atomspace: &AtomSpace,
    bank: Option<&AttentionBank>,
    step_budget: usize,
    cancel: &CancellationToken,
) -> Result<ForwardReport, Error> {
    let mut derived = Vec::new();
    let mut steps = 0;

    loop {
        if steps >= step_budget {
            return Ok(ForwardReport { derived, steps_taken: steps, terminated: Some(Termination::Budget) });
        }

        let mut changed = false;
        for rule in rules {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled(Cancelled));
            }
            steps += 1;
            if steps > step_budget {
                return Ok(ForwardReport { derived, steps_taken: steps - 1, terminated: Some(Termination::Budget) });
            }

            let groundings = match_pattern(&rule.premises, atomspace, cancel)?;
            for grounding in groundings {
                let premise_tvs = premise_truth_values(rule, &grounding, atomspace)?;
                let tv = (rule.tv_formula)(&premise_tvs);
                if tv.confidence() < MIN_CONFIDENCE {
                    continue;
                }

                let handle = instantiate(&rule.conclusion, &grounding, atomspace, Some(tv))?;
                if !derived.contains(&handle) {
                    derived.push(handle);
                    changed = true;
                }

                if let Some(bank) = bank {
                    let premise_handles: Vec<Handle> = rule
                        .premises
                        .clauses
                        .iter()
                        .map(|clause| instantiate(clause, &grounding, atomspace, None))
                        .collect::<Result<_, _>>()?;
                    for pair in premise_handles.windows(2) {
                        bank.record_cooccurrence(pair[0], pair[1]);
                    }
                }
            }
        }

        if !changed {
            return Ok(ForwardReport { derived, steps_taken: steps, terminated: Some(Termination::FixedPoint) });
        }
    }
}
