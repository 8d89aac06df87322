//! The attention bank and ECAN dynamics (`spec.md` §4.7): bounded-resource
//! economic allocation of importance over atoms.

mod diffusion;
pub mod engine;
mod rent;

use crate::atomspace::AtomSpace;
use crate::attention_value::AttentionValue;
use crate::config::Config;
use crate::error::AttentionError;
use crate::handle::Handle;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub use engine::AllocationEngine;

/// Process-local structure holding the STI/LTI fund ceilings, the
/// Hebbian co-occurrence table, and a reference to the AtomSpace whose
/// atoms' attention values it allocates. The funds are a single mutable
/// pair guarded by a `Mutex` (`spec.md` §9 "Fund accounting").
pub struct AttentionBank {
    atomspace: Arc<AtomSpace>,
    sti_fund: Mutex<i64>,
    lti_fund: Mutex<i64>,
    hebbian: Mutex<HashMap<(Handle, Handle), f64>>,
    config: Config,
}

impl AttentionBank {
    /// A fresh bank: the entire configured ceiling starts unallocated, i.e.
    /// sitting in the fund (no atom has nonzero STI/LTI yet).
    pub fn new(atomspace: Arc<AtomSpace>, config: Config) -> Self {
        Self {
            sti_fund: Mutex::new(config.sti_fund),
            lti_fund: Mutex::new(config.lti_fund),
            hebbian: Mutex::new(HashMap::new()),
            atomspace,
            config,
        }
    }

    pub fn atomspace(&self) -> &AtomSpace {
        &self.atomspace
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sti_fund(&self) -> i64 {
        *self.sti_fund.lock().unwrap()
    }

    pub fn lti_fund(&self) -> i64 {
        *self.lti_fund.lock().unwrap()
    }

    pub(super) fn adjust_sti_fund(&self, delta: i64) {
        *self.sti_fund.lock().unwrap() += delta;
    }

    pub(super) fn adjust_lti_fund(&self, delta: i64) {
        *self.lti_fund.lock().unwrap() += delta;
    }

    /// Transfer `amount` STI from the fund to `handle`, clamped so neither
    /// the atom's STI nor the fund goes negative. Returns the amount
    /// actually transferred (`spec.md` §4.7 `stimulate`).
    pub fn stimulate(&self, handle: Handle, amount: i64) -> Result<i64, AttentionError> {
        let atom = self
            .atomspace
            .get_atom(handle)
            .ok_or(AttentionError::UnknownAtom(handle))?;

        let mut fund = self.sti_fund.lock().unwrap();
        let available = if amount >= 0 { amount.min(*fund).max(0) } else { amount };
        let current_sti = atom.attention_value().sti() as i64;
        let room = (i16::MAX as i64) - current_sti;
        let floor = (i16::MIN as i64) - current_sti;
        let clamped = available.clamp(floor, room);

        *fund -= clamped;
        drop(fund);

        let new_av = atom.attention_value().with_sti_delta(clamped);
        self.atomspace
            .set_attention_value(handle, new_av)
            .map_err(|_| AttentionError::UnknownAtom(handle))?;
        Ok(clamped)
    }

    /// Like [`Self::stimulate`], but fails instead of clamping when the fund
    /// cannot cover the requested amount (`spec.md` §4.7/§7 `FundInsufficient`).
    pub fn stimulate_strict(&self, handle: Handle, amount: i64) -> Result<(), AttentionError> {
        if amount > 0 {
            let fund = self.sti_fund.lock().unwrap();
            if amount > *fund {
                return Err(AttentionError::FundInsufficient { amount });
            }
        }
        self.stimulate(handle, amount)?;
        Ok(())
    }

    /// Direct set of an atom's attention value; the bank reconciles the STI
    /// delta with the fund so the conservation invariant holds.
    pub fn set_attention_value(&self, handle: Handle, av: AttentionValue) -> Result<(), AttentionError> {
        let atom = self
            .atomspace
            .get_atom(handle)
            .ok_or(AttentionError::UnknownAtom(handle))?;
        let sti_delta = av.sti() as i64 - atom.attention_value().sti() as i64;
        let lti_delta = av.lti() as i64 - atom.attention_value().lti() as i64;

        {
            let fund = self.sti_fund.lock().unwrap();
            if sti_delta > *fund {
                return Err(AttentionError::FundInsufficient { amount: sti_delta });
            }
        }

        self.atomspace
            .set_attention_value(handle, av)
            .map_err(|_| AttentionError::UnknownAtom(handle))?;
        self.adjust_sti_fund(-sti_delta);
        self.adjust_lti_fund(-lti_delta);
        Ok(())
    }

    /// Record that `a` and `b` co-occurred as premises in a successful
    /// inference, strengthening the Hebbian link between them
    /// (`spec.md` §4.7 "Hebbian diffusion"). Called by the rule engine's
    /// forward chainer as an inference observer.
    pub fn record_cooccurrence(&self, a: Handle, b: Handle) {
        if a == b {
            return;
        }
        let key = if a < b { (a, b) } else { (b, a) };
        let mut table = self.hebbian.lock().unwrap();
        let boost = table.entry(key).or_insert(0.0);
        *boost = (*boost + 0.1).min(1.0);
    }

    pub(super) fn hebbian_boost(&self, a: Handle, b: Handle) -> f64 {
        let key = if a < b { (a, b) } else { (b, a) };
        self.hebbian.lock().unwrap().get(&key).copied().unwrap_or(0.0)
    }

    /// Atoms with STI above the configured spreading threshold — the
    /// universe eligible for neighbor diffusion this cycle.
    pub(super) fn spreading_candidates(&self) -> Vec<Handle> {
        self.all_handles_with_attention()
            .into_iter()
            .filter(|&h| {
                self.atomspace
                    .get_atom(h)
                    .map(|a| a.attention_value().sti() > self.config.sti_threshold_spread)
                    .unwrap_or(false)
            })
            .collect()
    }

    fn all_handles_with_attention(&self) -> Vec<Handle> {
        crate::types::AtomType::ALL
            .iter()
            .flat_map(|&t| self.atomspace.get_by_type(t, false))
            .collect()
    }

    /// Sum of STI across every atom currently in the AtomSpace.
    pub fn total_sti(&self) -> i64 {
        self.all_handles_with_attention()
            .into_iter()
            .filter_map(|h| self.atomspace.get_atom(h))
            .map(|a| a.attention_value().sti() as i64)
            .sum()
    }

    /// The focus set: atoms whose STI exceeds `threshold`.
    pub fn focus_set(&self, threshold: i16) -> Vec<Handle> {
        self.all_handles_with_attention()
            .into_iter()
            .filter(|&h| {
                self.atomspace
                    .get_atom(h)
                    .map(|a| a.attention_value().sti() > threshold)
                    .unwrap_or(false)
            })
            .collect()
    }
}
