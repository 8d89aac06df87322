//! Importance diffusion (`spec.md` §4.7): atoms above the spreading
//! threshold push a fraction of their STI onto their graph neighbors, in two
//! passes — a uniform neighbor spread, then a Hebbian pass that boosts flow
//! between atoms recorded as co-occurring premises.
//!
//! Both passes compute deltas against a snapshot of the current STI values
//! first, then apply them in one batch, so the result does not depend on
//! atom iteration order and total STI is conserved exactly (a source atom
//! only gives away a multiple of its neighbor count, never a fractional
//! remainder).

use super::AttentionBank;
use crate::handle::Handle;
use std::collections::{HashMap, HashSet};

/// The atoms connected to `handle`: the other members of any Link it
/// participates in, either as part of its own outgoing set or via its
/// incoming set's links.
fn neighbors(bank: &AttentionBank, handle: Handle) -> HashSet<Handle> {
    let atomspace = bank.atomspace();
    let mut set = HashSet::new();

    if let Some(atom) = atomspace.get_atom(handle) {
        if let Some(outgoing) = atom.outgoing() {
            for &h in outgoing {
                if h != handle {
                    set.insert(h);
                }
            }
        }
    }

    for link in atomspace.incoming(handle) {
        if let Some(link_atom) = atomspace.get_atom(link) {
            if let Some(outgoing) = link_atom.outgoing() {
                for &h in outgoing {
                    if h != handle {
                        set.insert(h);
                    }
                }
            }
        }
        set.insert(link);
    }

    set
}

/// Uniform neighbor diffusion: every atom above the spreading threshold
/// gives a `spread_fraction` share of its STI to each of its neighbors.
pub(super) fn neighbor_diffusion(bank: &AttentionBank) {
    let spread_fraction = bank.config().spread_fraction;
    let mut deltas: HashMap<Handle, i64> = HashMap::new();

    for source in bank.spreading_candidates() {
        let Some(atom) = bank.atomspace().get_atom(source) else {
            continue;
        };
        let sti = atom.attention_value().sti() as i64;
        let neighbor_set = neighbors(bank, source);
        if neighbor_set.is_empty() {
            continue;
        }

        let total = (sti as f64 * spread_fraction).round() as i64;
        if total <= 0 {
            continue;
        }
        let share = total / neighbor_set.len() as i64;
        if share <= 0 {
            continue;
        }
        let given = share * neighbor_set.len() as i64;

        *deltas.entry(source).or_insert(0) -= given;
        for neighbor in neighbor_set {
            *deltas.entry(neighbor).or_insert(0) += share;
        }
    }

    apply_deltas(bank, deltas);
}

/// Hebbian diffusion: pairs recorded via `record_cooccurrence` get an
/// additional STI transfer proportional to their boost factor, on top of
/// the uniform neighbor pass.
pub(super) fn hebbian_diffusion(bank: &AttentionBank) {
    let spread_fraction = bank.config().spread_fraction;
    let mut deltas: HashMap<Handle, i64> = HashMap::new();

    for source in bank.spreading_candidates() {
        let Some(atom) = bank.atomspace().get_atom(source) else {
            continue;
        };
        let sti = atom.attention_value().sti() as i64;
        for neighbor in neighbors(bank, source) {
            let boost = bank.hebbian_boost(source, neighbor);
            if boost <= 0.0 {
                continue;
            }
            let amount = (sti as f64 * spread_fraction * boost).round() as i64;
            if amount <= 0 {
                continue;
            }
            *deltas.entry(source).or_insert(0) -= amount;
            *deltas.entry(neighbor).or_insert(0) += amount;
        }
    }

    apply_deltas(bank, deltas);
}

fn apply_deltas(bank: &AttentionBank, deltas: HashMap<Handle, i64>) {
    for (handle, delta) in deltas {
        if delta == 0 {
            continue;
        }
        let Some(atom) = bank.atomspace().get_atom(handle) else {
            continue;
        };
        let new_av = atom.attention_value().with_sti_delta(delta);
        let _ = bank.atomspace().set_attention_value(handle, new_av);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomspace::AtomSpace;
    use crate::attention::AttentionBank;
    use crate::config::Config;
    use crate::types::AtomType;
    use std::sync::Arc;

    #[test]
    fn neighbor_diffusion_conserves_total_sti() {
        let space = Arc::new(AtomSpace::new());
        let a = space.add_node(AtomType::ConceptNode, "a", None).unwrap();
        let b = space.add_node(AtomType::ConceptNode, "b", None).unwrap();
        space.add_link(AtomType::SimilarityLink, vec![a, b], None).unwrap();

        let bank = AttentionBank::new(space, Config { sti_fund: 1_000_000, spread_fraction: 0.5, sti_threshold_spread: 10, ..Config::default() });
        bank.stimulate(a, 1000).unwrap();
        let total_before = bank.total_sti();

        neighbor_diffusion(&bank);

        assert_eq!(bank.total_sti(), total_before);
        assert!(bank.atomspace().get_atom(b).unwrap().attention_value().sti() > 0);
    }

    #[test]
    fn isolated_atom_keeps_all_its_sti() {
        let space = Arc::new(AtomSpace::new());
        let a = space.add_node(AtomType::ConceptNode, "a", None).unwrap();
        let bank = AttentionBank::new(space.clone(), Config { sti_fund: 1_000_000, sti_threshold_spread: 10, ..Config::default() });
        bank.stimulate(a, 1000).unwrap();

        neighbor_diffusion(&bank);

        assert_eq!(space.get_atom(a).unwrap().attention_value().sti(), 1000);
    }

    #[test]
    fn hebbian_diffusion_moves_extra_sti_along_recorded_pairs() {
        let space = Arc::new(AtomSpace::new());
        let a = space.add_node(AtomType::ConceptNode, "a", None).unwrap();
        let b = space.add_node(AtomType::ConceptNode, "b", None).unwrap();
        space.add_link(AtomType::SimilarityLink, vec![a, b], None).unwrap();

        let bank = AttentionBank::new(space, Config { sti_fund: 1_000_000, spread_fraction: 0.1, sti_threshold_spread: 10, ..Config::default() });
        bank.stimulate(a, 1000).unwrap();
        bank.record_cooccurrence(a, b);

        let before = bank.atomspace().get_atom(b).unwrap().attention_value().sti();
        hebbian_diffusion(&bank);
        let after = bank.atomspace().get_atom(b).unwrap().attention_value().sti();
        assert!(after > before);
    }
}
