//! Rule-engine integration: forward-derived facts backward-provable, rule
//! catalogs composed together, and step-budget/cancellation plumbing.

use atomspace::{backward_chain, forward_chain, AtomSpace, CancellationToken, PatternTerm, TruthValue};
use atomspace::rules::pln::{deduction_rule, standard_rules};
use atomspace::types::AtomType;

#[test]
fn a_fact_derived_by_forward_chaining_is_backward_provable() {
    let space = AtomSpace::new();
    let dog = space.add_node(AtomType::ConceptNode, "dog", None).unwrap();
    let mammal = space.add_node(AtomType::ConceptNode, "mammal", None).unwrap();
    let animal = space.add_node(AtomType::ConceptNode, "animal", None).unwrap();
    space
        .add_link(AtomType::InheritanceLink, vec![dog, mammal], Some(TruthValue::new(0.9, 0.8)))
        .unwrap();
    space
        .add_link(AtomType::InheritanceLink, vec![mammal, animal], Some(TruthValue::new(0.8, 0.7)))
        .unwrap();

    let rule = deduction_rule();
    let report = forward_chain(&[rule], &space, None, 10, &CancellationToken::new()).unwrap();
    assert!(!report.derived.is_empty());

    let target = PatternTerm::Link(
        AtomType::InheritanceLink,
        vec![PatternTerm::Const(dog), PatternTerm::Const(animal)],
    );
    // No rules needed this time — the fact is already in the AtomSpace from
    // forward chaining above.
    let proof = backward_chain(&target, &[], &space, 50, &CancellationToken::new()).unwrap();
    assert!(proof.proved);
}

#[test]
fn standard_rules_can_prove_a_transitive_fact_by_themselves() {
    let space = AtomSpace::new();
    let dog = space.add_node(AtomType::ConceptNode, "dog", None).unwrap();
    let mammal = space.add_node(AtomType::ConceptNode, "mammal", None).unwrap();
    let animal = space.add_node(AtomType::ConceptNode, "animal", None).unwrap();
    space
        .add_link(AtomType::InheritanceLink, vec![dog, mammal], Some(TruthValue::new(0.9, 0.8)))
        .unwrap();
    space
        .add_link(AtomType::InheritanceLink, vec![mammal, animal], Some(TruthValue::new(0.8, 0.7)))
        .unwrap();

    let target = PatternTerm::Link(
        AtomType::InheritanceLink,
        vec![PatternTerm::Const(dog), PatternTerm::Const(animal)],
    );
    let proof = backward_chain(&target, &standard_rules(), &space, 50, &CancellationToken::new()).unwrap();
    assert!(proof.proved);
}

#[test]
fn a_zero_step_budget_proves_nothing_not_already_present() {
    let space = AtomSpace::new();
    let dog = space.add_node(AtomType::ConceptNode, "dog", None).unwrap();
    let mammal = space.add_node(AtomType::ConceptNode, "mammal", None).unwrap();
    let animal = space.add_node(AtomType::ConceptNode, "animal", None).unwrap();
    space.add_link(AtomType::InheritanceLink, vec![dog, mammal], None).unwrap();
    space.add_link(AtomType::InheritanceLink, vec![mammal, animal], None).unwrap();

    let target = PatternTerm::Link(
        AtomType::InheritanceLink,
        vec![PatternTerm::Const(dog), PatternTerm::Const(animal)],
    );
    let proof = backward_chain(&target, &standard_rules(), &space, 0, &CancellationToken::new()).unwrap();
    assert!(!proof.proved);
}
