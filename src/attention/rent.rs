//! Rent collection (`spec.md` §4.7): atoms above the forgetting threshold
//! pay STI/LTI back to the bank's fund at a configured rate, and atoms that
//! fall to or below it (and are not VLTI-pinned) become forgetting
//! candidates.

use super::AttentionBank;
use crate::handle::Handle;

/// Collect rent from every atom whose STI is above the forgetting
/// threshold. Returns the handles whose STI is at or below the threshold
/// and which are not pinned — candidates for eviction this cycle.
pub(super) fn collect_rent(bank: &AttentionBank) -> Vec<Handle> {
    let threshold = bank.config().forgetting_threshold_sti;
    let rent_rate_sti = bank.config().rent_rate_sti;
    let rent_rate_lti = bank.config().rent_rate_lti;

    let mut forgetting_candidates = Vec::new();

    for atom_type in crate::types::AtomType::ALL {
        for handle in bank.atomspace().get_by_type(*atom_type, false) {
            let Some(atom) = bank.atomspace().get_atom(handle) else {
                continue;
            };
            let av = atom.attention_value();

            if av.sti() > threshold {
                let rent = ((av.sti() as f64 - threshold as f64) * rent_rate_sti).round() as i64;
                if rent > 0 {
                    let new_av = av.with_sti_delta(-rent);
                    if bank.atomspace().set_attention_value(handle, new_av).is_ok() {
                        bank.adjust_sti_fund(rent);
                    }
                }
            } else if !av.vlti() {
                forgetting_candidates.push(handle);
            }

            if av.lti() > 0 {
                let lti_rent = (av.lti() as f64 * rent_rate_lti).round() as i64;
                if lti_rent > 0 {
                    let new_av = bank
                        .atomspace()
                        .get_atom(handle)
                        .map(|a| a.attention_value())
                        .unwrap_or(av)
                        .with_lti_delta(-lti_rent);
                    if bank.atomspace().set_attention_value(handle, new_av).is_ok() {
                        bank.adjust_lti_fund(lti_rent);
                    }
                }
            }
        }
    }

    forgetting_candidates
}
