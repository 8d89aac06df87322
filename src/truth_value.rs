//! Truth values and their algebra (`spec.md` §3, §4.3, §4.6).
//!
//! A [`TruthValue`] is an immutable `(strength, confidence)` pair, both
//! clamped to `[0, 1]`. Arithmetic here is pure, deterministic, and never
//! produces `NaN`: every formula clamps its inputs and outputs rather than
//! trusting callers, and treats `confidence == 0` as "no evidence" rather
//! than dividing by it.

use std::fmt;

/// An immutable `(strength, confidence)` pair. The default value `(1.0, 0.0)`
/// applies when none is set ("true, but with no evidence behind it").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruthValue {
    strength: f64,
    confidence: f64,
}

impl TruthValue {
    pub fn new(strength: f64, confidence: f64) -> Self {
        Self {
            strength: strength.clamp(0.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn strength(self) -> f64 {
        self.strength
    }

    pub fn confidence(self) -> f64 {
        self.confidence
    }

    /// Confidence-weighted combination of two truth values into one
    /// (`spec.md` §4.3, used on duplicate `add`). Confidence never exceeds 1.
    ///
    /// When both confidences are zero the result is the default value: there
    /// is no evidence to weight by, so we fall back to `self` rather than
    /// dividing zero by zero.
    pub fn revise(self, other: TruthValue) -> TruthValue {
        let total_confidence = self.confidence + other.confidence;
        if total_confidence <= 0.0 {
            return self;
        }
        let strength =
            (self.strength * self.confidence + other.strength * other.confidence) / total_confidence;
        let confidence = total_confidence.min(1.0);
        TruthValue::new(strength, confidence)
    }

    /// Simple (unweighted) PLN deduction formula for `A -> B -> C` given
    /// `A -> B` and `B -> C`, ignoring base rates. A standard, widely used
    /// approximation; confidence of the result never exceeds the weaker of
    /// the two inputs.
    pub fn deduction(a_b: TruthValue, b_c: TruthValue) -> TruthValue {
        let strength = a_b.strength * b_c.strength;
        let confidence = a_b.confidence.min(b_c.confidence);
        TruthValue::new(strength, confidence)
    }

    /// Conjunction (AND) of independent truth values.
    pub fn conjunction(values: &[TruthValue]) -> TruthValue {
        if values.is_empty() {
            return TruthValue::new(1.0, 1.0);
        }
        let strength = values.iter().map(|tv| tv.strength).product();
        let confidence = values
            .iter()
            .map(|tv| tv.confidence)
            .fold(1.0_f64, f64::min);
        TruthValue::new(strength, confidence)
    }

    /// Disjunction (OR) of independent truth values, via inclusion-exclusion
    /// on strength for the pairwise-independent assumption used throughout
    /// PLN's simple formulas.
    pub fn disjunction(values: &[TruthValue]) -> TruthValue {
        if values.is_empty() {
            return TruthValue::new(0.0, 1.0);
        }
        let not_any = values.iter().fold(1.0_f64, |acc, tv| acc * (1.0 - tv.strength));
        let strength = 1.0 - not_any;
        let confidence = values
            .iter()
            .map(|tv| tv.confidence)
            .fold(1.0_f64, f64::min);
        TruthValue::new(strength, confidence)
    }

    /// Negation: strength flips, confidence is unchanged.
    pub fn negation(self) -> TruthValue {
        TruthValue::new(1.0 - self.strength, self.confidence)
    }

    /// Intersection (in the PLN sense of a conjunction's truth value, with
    /// explicit support for the degenerate zero-confidence case).
    pub fn intersection(self, other: TruthValue) -> TruthValue {
        TruthValue::conjunction(&[self, other])
    }

    /// Simple modus-ponens formula: given `A` and `A -> B`, the truth value
    /// of `B`. Matches the deduction shape but named for clarity at call
    /// sites in the PLN rule catalog.
    pub fn modus_ponens(a: TruthValue, a_implies_b: TruthValue) -> TruthValue {
        let strength = a.strength * a_implies_b.strength;
        let confidence = a.confidence.min(a_implies_b.confidence);
        TruthValue::new(strength, confidence)
    }

    /// Bayesian inversion: given `P(B|A)` as `a_b` and the marginal
    /// strengths `p_a`/`p_b`, compute `P(A|B)`. Confidence is carried
    /// through unchanged; degenerate (`p_b == 0`) inputs yield the default
    /// truth value rather than a division by zero.
    pub fn inversion(a_b: TruthValue, p_a: f64, p_b: f64) -> TruthValue {
        if p_b <= 0.0 {
            return TruthValue::default();
        }
        let strength = (a_b.strength * p_a / p_b).clamp(0.0, 1.0);
        TruthValue::new(strength, a_b.confidence)
    }
}

impl Default for TruthValue {
    fn default() -> Self {
        TruthValue::new(1.0, 0.0)
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{:.3}, {:.3}>", self.strength, self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_zero() {
        let tv = TruthValue::default();
        assert_eq!(tv.strength(), 1.0);
        assert_eq!(tv.confidence(), 0.0);
    }

    #[test]
    fn revise_weights_by_confidence() {
        let a = TruthValue::new(0.9, 0.8);
        let b = TruthValue::new(0.8, 0.5);
        let revised = a.revise(b);
        assert!(revised.strength() > 0.8 && revised.strength() < 0.9);
        assert!(revised.confidence() > 0.8);
        assert!(revised.confidence() <= 1.0);
    }

    #[test]
    fn revise_with_zero_confidence_other_keeps_self() {
        let a = TruthValue::new(0.5, 0.5);
        let b = TruthValue::new(0.9, 0.0);
        assert_eq!(a.revise(b), a);
    }

    #[test]
    fn revise_both_zero_confidence_is_no_nan() {
        let a = TruthValue::new(0.3, 0.0);
        let b = TruthValue::new(0.7, 0.0);
        let revised = a.revise(b);
        assert!(!revised.strength().is_nan());
        assert!(!revised.confidence().is_nan());
    }

    #[test]
    fn bounds_survive_revision() {
        let zero = TruthValue::new(0.0, 0.0);
        let one = TruthValue::new(1.0, 1.0);
        let r1 = zero.revise(zero);
        let r2 = one.revise(one);
        assert!(!r1.strength().is_nan() && !r1.confidence().is_nan());
        assert_eq!(r2, TruthValue::new(1.0, 1.0));
    }

    #[test]
    fn deduction_is_monotone_in_confidence() {
        let ab = TruthValue::new(0.9, 0.8);
        let bc = TruthValue::new(0.8, 0.5);
        let tv = TruthValue::deduction(ab, bc);
        assert!((tv.strength() - 0.72).abs() < 1e-9);
        assert_eq!(tv.confidence(), 0.5);
    }

    #[test]
    fn conjunction_of_empty_is_certain_true() {
        assert_eq!(TruthValue::conjunction(&[]), TruthValue::new(1.0, 1.0));
    }

    #[test]
    fn negation_flips_strength_only() {
        let tv = TruthValue::new(0.3, 0.7);
        let neg = tv.negation();
        assert!((neg.strength() - 0.7).abs() < 1e-9);
        assert_eq!(neg.confidence(), 0.7);
    }

    #[test]
    fn inversion_handles_zero_marginal() {
        let tv = TruthValue::inversion(TruthValue::new(0.5, 0.9), 0.2, 0.0);
        assert_eq!(tv, TruthValue::default());
    }
}
