//! The allocation engine (`spec.md` §4.7): drives the bank through repeated
//! stimulate → diffuse → collect-rent → forget cycles.

use super::{diffusion, rent, AttentionBank};
use crate::cancel::CancellationToken;
use crate::error::{Cancelled, Error};
use crate::handle::Handle;

/// What happened during one `run` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cycles_completed: usize,
    pub forgotten: Vec<Handle>,
}

/// Drives a bank through `n` ECAN cycles. Each cycle: diffuse importance
/// (neighbor pass, then Hebbian pass), collect rent, then evict forgetting
/// candidates that have no remaining incoming set (an atom with dependents
/// is left for a later cycle rather than force-removed).
pub struct AllocationEngine<'a> {
    bank: &'a AttentionBank,
}

impl<'a> AllocationEngine<'a> {
    pub fn new(bank: &'a AttentionBank) -> Self {
        Self { bank }
    }

    pub fn run(&self, cycles: usize, cancel: &CancellationToken) -> Result<CycleReport, Error> {
        let mut report = CycleReport::default();

        for _ in 0..cycles {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled(Cancelled));
            }

            diffusion::neighbor_diffusion(self.bank);
            diffusion::hebbian_diffusion(self.bank);
            let candidates = rent::collect_rent(self.bank);

            for handle in candidates {
                if self.bank.atomspace().remove_atom(handle, false).is_ok() {
                    report.forgotten.push(handle);
                }
            }

            report.cycles_completed += 1;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomspace::AtomSpace;
    use crate::attention_value::AttentionValue;
    use crate::config::Config;
    use crate::types::AtomType;
    use std::sync::Arc;

    #[test]
    fn run_reports_completed_cycles() {
        let space = Arc::new(AtomSpace::new());
        space.add_node(AtomType::ConceptNode, "a", None).unwrap();
        let bank = AttentionBank::new(space, Config::default());
        let engine = AllocationEngine::new(&bank);

        let report = engine.run(3, &CancellationToken::new()).unwrap();
        assert_eq!(report.cycles_completed, 3);
    }

    #[test]
    fn run_returns_cancelled_err_when_token_is_cancelled() {
        let space = Arc::new(AtomSpace::new());
        let bank = AttentionBank::new(space, Config::default());
        let engine = AllocationEngine::new(&bank);
        let token = CancellationToken::new();
        token.cancel();

        let err = engine.run(5, &token).unwrap_err();
        assert!(matches!(err, Error::Cancelled(_)));
    }

    #[test]
    fn forgets_atoms_that_fall_below_threshold_and_have_no_dependents() {
        let space = Arc::new(AtomSpace::new());
        let a = space.add_node(AtomType::ConceptNode, "a", None).unwrap();
        space.set_attention_value(a, AttentionValue::new(-100, 0, false)).unwrap();
        let bank = AttentionBank::new(space.clone(), Config::default());
        let engine = AllocationEngine::new(&bank);

        let report = engine.run(1, &CancellationToken::new()).unwrap();
        assert_eq!(report.forgotten, vec![a]);
        assert!(space.get_atom(a).is_none());
    }
}
