//! End-to-end scenarios exercising the AtomSpace, matcher, rule engine, and
//! attention bank together, one `#[test]` per scenario.

use atomspace::{
    match_pattern, AllocationEngine, AtomSpace, AttentionBank, CancellationToken, Config, Pattern,
    PatternTerm, Rule, StorageBackend, TruthValue, VarDecl,
};
use atomspace::storage::MemoryBackend;
use atomspace::types::AtomType;
use std::sync::Arc;

#[test]
fn inheritance_build_and_query() {
    let space = AtomSpace::new();
    let dog = space.add_node(AtomType::ConceptNode, "dog", None).unwrap();
    let mammal = space.add_node(AtomType::ConceptNode, "mammal", None).unwrap();
    let link = space
        .add_link(AtomType::InheritanceLink, vec![dog, mammal], Some(TruthValue::new(0.9, 0.8)))
        .unwrap();

    let again = space
        .add_link(AtomType::InheritanceLink, vec![dog, mammal], Some(TruthValue::new(0.8, 0.5)))
        .unwrap();
    assert_eq!(link, again, "re-adding the same link must not create a second atom");
    assert_eq!(space.size(), 3);

    let tv = space.get_atom(link).unwrap().truth_value();
    assert!(tv.strength() > 0.8 && tv.strength() < 0.9);
    assert!(tv.confidence() > 0.8);
}

#[test]
fn pattern_match_on_shared_target() {
    let space = AtomSpace::new();
    let dog = space.add_node(AtomType::ConceptNode, "dog", None).unwrap();
    let cat = space.add_node(AtomType::ConceptNode, "cat", None).unwrap();
    let mammal = space.add_node(AtomType::ConceptNode, "mammal", None).unwrap();
    let animal = space.add_node(AtomType::ConceptNode, "animal", None).unwrap();
    space.add_link(AtomType::InheritanceLink, vec![dog, mammal], None).unwrap();
    space.add_link(AtomType::InheritanceLink, vec![cat, mammal], None).unwrap();
    space.add_link(AtomType::InheritanceLink, vec![dog, animal], None).unwrap();

    let pattern = Pattern::new(
        vec![VarDecl::new("$X", None)],
        vec![PatternTerm::Link(
            AtomType::InheritanceLink,
            vec![PatternTerm::Var("$X".into()), PatternTerm::Const(mammal)],
        )],
    )
    .unwrap();

    let groundings = match_pattern(&pattern, &space, &CancellationToken::new()).unwrap();
    let bound: std::collections::HashSet<_> = groundings.iter().map(|g| g["$X"]).collect();
    assert_eq!(bound, std::collections::HashSet::from([dog, cat]));
}

#[test]
fn variable_list_pattern_drives_forward_chaining() {
    let space = AtomSpace::new();
    let father_of = space.add_node(AtomType::PredicateNode, "father_of", None).unwrap();
    let parent_of = space.add_node(AtomType::PredicateNode, "parent_of", None).unwrap();
    let john = space.add_node(AtomType::ConceptNode, "john", None).unwrap();
    let bob = space.add_node(AtomType::ConceptNode, "bob", None).unwrap();
    let list = space.add_link(AtomType::ListLink, vec![john, bob], None).unwrap();
    space
        .add_link(AtomType::EvaluationLink, vec![father_of, list], Some(TruthValue::new(1.0, 0.95)))
        .unwrap();

    let var = |name: &str| PatternTerm::Var(name.to_string());
    let rule = Rule {
        name: "father-implies-parent",
        premises: Pattern::new(
            vec![VarDecl::new("$X", None), VarDecl::new("$Y", None)],
            vec![PatternTerm::Link(
                AtomType::EvaluationLink,
                vec![
                    PatternTerm::Const(father_of),
                    PatternTerm::Link(AtomType::ListLink, vec![var("$X"), var("$Y")]),
                ],
            )],
        )
        .unwrap(),
        conclusion: PatternTerm::Link(
            AtomType::EvaluationLink,
            vec![
                PatternTerm::Const(parent_of),
                PatternTerm::Link(AtomType::ListLink, vec![var("$X"), var("$Y")]),
            ],
        ),
        tv_formula: |tvs| TruthValue::new(tvs[0].strength(), tvs[0].confidence() * 0.9),
    };

    let report =
        atomspace::forward_chain(&[rule], &space, None, 10, &CancellationToken::new()).unwrap();
    assert_eq!(report.derived.len(), 1);

    let derived_list = space.add_link(AtomType::ListLink, vec![john, bob], None).unwrap();
    let derived = space
        .add_link(AtomType::EvaluationLink, vec![parent_of, derived_list], None)
        .unwrap();
    assert_eq!(report.derived[0], derived);

    let tv = space.get_atom(derived).unwrap().truth_value();
    assert!((tv.strength() - 1.0).abs() < 1e-9);
    assert!((tv.confidence() - 0.855).abs() < 1e-6);
}

#[test]
fn batch_persistence_round_trips_a_thousand_atoms() {
    let backend = MemoryBackend::new();
    backend.open().unwrap();

    let space = AtomSpace::new();
    let handles: Vec<_> = (0..1000)
        .map(|i| space.add_node(AtomType::ConceptNode, format!("n{i}"), None).unwrap())
        .collect();
    let atoms: Vec<_> = handles.iter().map(|&h| space.get_atom(h).unwrap()).collect();

    backend.store_atoms_batch(&atoms).unwrap();
    let fetched = backend.fetch_atoms_batch(&handles).unwrap();

    assert_eq!(fetched.len(), 1000);
    for (i, atom) in fetched.into_iter().enumerate() {
        let atom = atom.unwrap();
        assert_eq!(atom.name(), Some(format!("n{i}").as_str()));
        assert_eq!(atom.truth_value(), atoms[i].truth_value());
    }
}

#[test]
fn attention_diffusion_conserves_total_sti() {
    let space = Arc::new(AtomSpace::new());
    let nodes: Vec<_> = (0..5)
        .map(|i| space.add_node(AtomType::ConceptNode, format!("n{i}"), None).unwrap())
        .collect();
    // A chain of links so diffusion has somewhere to spread to.
    for pair in nodes.windows(2) {
        space.add_link(AtomType::SimilarityLink, vec![pair[0], pair[1]], None).unwrap();
    }

    let config = Config {
        rent_rate_sti: 0.0,
        rent_rate_lti: 0.0,
        spread_fraction: 0.2,
        sti_fund: 1000,
        ..Config::default()
    };
    let bank = AttentionBank::new(space.clone(), config);
    bank.stimulate(nodes[0], 200).unwrap();
    assert_eq!(bank.total_sti(), 200);

    let engine = AllocationEngine::new(&bank);
    for _ in 0..10 {
        engine.run(1, &CancellationToken::new()).unwrap();
        assert_eq!(bank.total_sti(), 200, "rent is disabled, so diffusion alone must conserve STI");
    }
}

#[test]
fn removal_safety_refuses_then_succeeds() {
    let space = AtomSpace::new();
    let a = space.add_node(AtomType::ConceptNode, "a", None).unwrap();
    space.add_link(AtomType::ListLink, vec![a], None).unwrap();
    assert_eq!(space.size(), 2);

    let err = space.remove_atom(a, false).unwrap_err();
    assert_eq!(err, atomspace::AtomSpaceError::HasIncoming(a));
    assert_eq!(space.size(), 2);

    let removed = space.remove_atom(a, true).unwrap();
    assert!(removed);
    assert_eq!(space.size(), 0);
}
