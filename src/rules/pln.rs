//! PLN's rule catalog (`spec.md` §4.6): the specific rules and tv-formulas
//! built on the pure truth-value algebra in [`crate::truth_value`].

use super::Rule;
use crate::matcher::{PatternTerm, VarDecl};
use crate::matcher::Pattern;
use crate::truth_value::TruthValue;
use crate::types::AtomType;

fn var(name: &str) -> PatternTerm {
    PatternTerm::Var(name.to_string())
}

/// `A -> B`, `B -> C` ⊢ `A -> C` via the deduction formula.
pub fn deduction_rule() -> Rule {
    Rule {
        name: "pln-deduction",
        premises: Pattern::new(
            vec![VarDecl::new("$A", None), VarDecl::new("$B", None), VarDecl::new("$C", None)],
            vec![
                PatternTerm::Link(AtomType::InheritanceLink, vec![var("$A"), var("$B")]),
                PatternTerm::Link(AtomType::InheritanceLink, vec![var("$B"), var("$C")]),
            ],
        )
        .expect("well-formed rule template"),
        conclusion: PatternTerm::Link(AtomType::InheritanceLink, vec![var("$A"), var("$C")]),
        tv_formula: |tvs| TruthValue::deduction(tvs[0], tvs[1]),
    }
}

/// `A`, `A -> B` ⊢ `B` via modus ponens, expressed over `EvaluationLink`
/// premises (`A` holds) and an `ImplicationLink` (`A -> B`), concluding `B`
/// also holds.
pub fn modus_ponens_rule() -> Rule {
    Rule {
        name: "pln-modus-ponens",
        premises: Pattern::new(
            vec![VarDecl::new("$A", None), VarDecl::new("$B", None)],
            vec![
                PatternTerm::Link(AtomType::EvaluationLink, vec![var("$A")]),
                PatternTerm::Link(AtomType::ImplicationLink, vec![var("$A"), var("$B")]),
            ],
        )
        .expect("well-formed rule template"),
        conclusion: PatternTerm::Link(AtomType::EvaluationLink, vec![var("$B")]),
        tv_formula: |tvs| TruthValue::modus_ponens(tvs[0], tvs[1]),
    }
}

/// `A -> B`, `A -> C` ⊢ `A -> (B and C)` via conjunction of the two premise
/// truth values, reflecting an atom's inheritance into the intersection of
/// two categories.
pub fn conjunction_rule() -> Rule {
    Rule {
        name: "pln-conjunction-introduction",
        premises: Pattern::new(
            vec![VarDecl::new("$A", None), VarDecl::new("$B", None), VarDecl::new("$C", None)],
            vec![
                PatternTerm::Link(AtomType::InheritanceLink, vec![var("$A"), var("$B")]),
                PatternTerm::Link(AtomType::InheritanceLink, vec![var("$A"), var("$C")]),
            ],
        )
        .expect("well-formed rule template"),
        conclusion: PatternTerm::Link(AtomType::AndLink, vec![
            PatternTerm::Link(AtomType::InheritanceLink, vec![var("$A"), var("$B")]),
            PatternTerm::Link(AtomType::InheritanceLink, vec![var("$A"), var("$C")]),
        ]),
        tv_formula: |tvs| TruthValue::conjunction(tvs),
    }
}

/// The standard rule set a host can hand to [`super::forward_chain`] /
/// [`super::backward_chain`] to get ordinary PLN inference.
pub fn standard_rules() -> Vec<Rule> {
    vec![deduction_rule(), modus_ponens_rule(), conjunction_rule()]
}
