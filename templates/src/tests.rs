use dlrete_facts::{FactRecord, StructuredField};
use dlrete_lexicon::{SymbolTable, Value};

use crate::install_owl_rl;
use crate::vocab::Vocab;
use dlrete_network::Network;

fn fact(symbols: &SymbolTable, type_name: &str, attrs: &[(&str, Value)]) -> FactRecord {
    let mut v = vec![(symbols.intern("type"), Value::Symbol(symbols.intern(type_name)))];
    for (k, val) in attrs {
        v.push((symbols.intern(k), val.clone()));
    }
    FactRecord::new(v)
}

fn has_instance(net: &Network, v: &Vocab, individual: &str, concept: &str) -> bool {
    let symbols = net.symbols();
    let ind = Value::Symbol(symbols.intern(individual));
    let c = Value::Symbol(symbols.intern(concept));
    net.facts().iter().any(|f| {
        f.type_value(v.type_key) == Some(v.instance_of) && f.get(v.individual) == Some(&ind) && f.get(v.concept) == Some(&c)
    })
}

fn has_violation(net: &Network, v: &Vocab, kind: &str) -> bool {
    net.facts()
        .iter()
        .any(|f| f.type_value(v.type_key) == Some(v.violation) && f.get(v.violation_type) == Some(&Value::Str(kind.to_string())))
}

#[test]
fn transitive_subsumption_propagates_via_cax_sco() {
    let symbols = SymbolTable::new();
    let mut net = Network::new(symbols.clone());
    let v = install_owl_rl(&mut net).unwrap();

    net.add_fact(fact(&symbols, "subsumption", &[("sub", Value::Symbol(symbols.intern("Cat"))), ("sup", Value::Symbol(symbols.intern("Mammal")))])).unwrap();
    net.add_fact(fact(&symbols, "subsumption", &[("sub", Value::Symbol(symbols.intern("Mammal"))), ("sup", Value::Symbol(symbols.intern("Animal")))])).unwrap();
    net.add_fact(fact(&symbols, "instance_of", &[("individual", Value::Symbol(symbols.intern("felix"))), ("concept", Value::Symbol(symbols.intern("Cat")))])).unwrap();

    assert!(has_instance(&net, &v, "felix", "Mammal"));
    assert!(has_instance(&net, &v, "felix", "Animal"));
}

#[test]
fn symmetric_property_propagates_via_prp_symp() {
    let symbols = SymbolTable::new();
    let mut net = Network::new(symbols.clone());
    let _v = install_owl_rl(&mut net).unwrap();

    net.add_fact(fact(&symbols, "symmetric", &[("property", Value::Symbol(symbols.intern("marriedTo")))])).unwrap();
    net.add_fact(fact(
        &symbols,
        "role_assertion",
        &[
            ("subject", Value::Symbol(symbols.intern("alice"))),
            ("role", Value::Symbol(symbols.intern("marriedTo"))),
            ("object", Value::Symbol(symbols.intern("bob"))),
        ],
    ))
    .unwrap();

    let bob = Value::Symbol(symbols.intern("bob"));
    let alice = Value::Symbol(symbols.intern("alice"));
    let married = Value::Symbol(symbols.intern("marriedTo"));
    let found = net.facts().iter().any(|f| {
        f.get(symbols.intern("type")) == Some(&Value::Symbol(symbols.intern("role_assertion")))
            && f.get(symbols.intern("subject")) == Some(&bob)
            && f.get(symbols.intern("role")) == Some(&married)
            && f.get(symbols.intern("object")) == Some(&alice)
    });
    assert!(found, "marriedTo(bob,alice) should be derived from its symmetric declaration");
}

#[test]
fn property_chain_is_walked_structurally() {
    let symbols = SymbolTable::new();
    let mut net = Network::new(symbols.clone());
    let v = install_owl_rl(&mut net).unwrap();

    net.add_fact(fact(
        &symbols,
        "property_chain",
        &[("sup", Value::Symbol(symbols.intern("hasUncle")))],
    )
    .with_data(symbols.intern("chain"), StructuredField::Strings(vec!["hasParent".into(), "hasBrother".into()])))
    .unwrap();
    net.add_fact(fact(
        &symbols,
        "role_assertion",
        &[
            ("subject", Value::Symbol(symbols.intern("leo"))),
            ("role", Value::Symbol(symbols.intern("hasParent"))),
            ("object", Value::Symbol(symbols.intern("mia"))),
        ],
    ))
    .unwrap();
    net.add_fact(fact(
        &symbols,
        "role_assertion",
        &[
            ("subject", Value::Symbol(symbols.intern("mia"))),
            ("role", Value::Symbol(symbols.intern("hasBrother"))),
            ("object", Value::Symbol(symbols.intern("sam"))),
        ],
    ))
    .unwrap();

    // property_chain was installed before the data arrived, so nothing
    // re-ran structural.rs automatically; run it again explicitly.
    crate::structural::run_all(&mut net, &symbols, &v).unwrap();

    let leo = Value::Symbol(symbols.intern("leo"));
    let sam = Value::Symbol(symbols.intern("sam"));
    let uncle = Value::Symbol(symbols.intern("hasUncle"));
    let found = net
        .facts()
        .iter()
        .any(|f| f.type_value(v.type_key) == Some(v.role_assertion) && f.get(v.subject) == Some(&leo) && f.get(v.role) == Some(&uncle) && f.get(v.object) == Some(&sam));
    assert!(found, "hasUncle(leo,sam) should be derived by walking the hasParent/hasBrother chain");
}

#[test]
fn has_key_identifies_individuals_sharing_a_key_value() {
    let symbols = SymbolTable::new();
    let mut net = Network::new(symbols.clone());
    let v = install_owl_rl(&mut net).unwrap();

    net.add_fact(
        fact(&symbols, "has_key", &[("class", Value::Symbol(symbols.intern("Person")))])
            .with_data(symbols.intern("keys"), StructuredField::Strings(vec!["hasSsn".into()])),
    )
    .unwrap();
    net.add_fact(fact(&symbols, "instance_of", &[("individual", Value::Symbol(symbols.intern("p1"))), ("concept", Value::Symbol(symbols.intern("Person")))])).unwrap();
    net.add_fact(fact(&symbols, "instance_of", &[("individual", Value::Symbol(symbols.intern("p2"))), ("concept", Value::Symbol(symbols.intern("Person")))])).unwrap();
    net.add_fact(fact(
        &symbols,
        "role_assertion",
        &[("subject", Value::Symbol(symbols.intern("p1"))), ("role", Value::Symbol(symbols.intern("hasSsn"))), ("object", Value::Str("123-45".into()))],
    ))
    .unwrap();
    net.add_fact(fact(
        &symbols,
        "role_assertion",
        &[("subject", Value::Symbol(symbols.intern("p2"))), ("role", Value::Symbol(symbols.intern("hasSsn"))), ("object", Value::Str("123-45".into()))],
    ))
    .unwrap();

    crate::structural::run_all(&mut net, &symbols, &v).unwrap();

    let p1 = Value::Symbol(symbols.intern("p1"));
    let p2 = Value::Symbol(symbols.intern("p2"));
    let found = net
        .facts()
        .iter()
        .any(|f| f.type_value(v.type_key) == Some(v.same_as) && ((f.get(v.ind1) == Some(&p1) && f.get(v.ind2) == Some(&p2)) || (f.get(v.ind1) == Some(&p2) && f.get(v.ind2) == Some(&p1))));
    assert!(found, "p1 and p2 share the hasSsn key value, so they should be inferred same_as");
}

#[test]
fn all_different_flags_a_violation_when_two_members_are_same_as() {
    let symbols = SymbolTable::new();
    let mut net = Network::new(symbols.clone());
    let v = install_owl_rl(&mut net).unwrap();

    net.add_fact(
        fact(&symbols, "all_different", &[])
            .with_data(symbols.intern("members"), StructuredField::Strings(vec!["a".into(), "b".into(), "c".into()])),
    )
    .unwrap();
    net.add_fact(fact(&symbols, "same_as", &[("ind1", Value::Symbol(symbols.intern("a"))), ("ind2", Value::Symbol(symbols.intern("b")))])).unwrap();

    crate::structural::run_all(&mut net, &symbols, &v).unwrap();

    assert!(has_violation(&net, &v, "all_different_violation"));
}

#[test]
fn disjoint_classes_produce_a_violation() {
    let symbols = SymbolTable::new();
    let mut net = Network::new(symbols.clone());
    let v = install_owl_rl(&mut net).unwrap();

    net.add_fact(fact(&symbols, "disjoint_with", &[("class1", Value::Symbol(symbols.intern("Cat"))), ("class2", Value::Symbol(symbols.intern("Dog")))])).unwrap();
    net.add_fact(fact(&symbols, "instance_of", &[("individual", Value::Symbol(symbols.intern("rex"))), ("concept", Value::Symbol(symbols.intern("Cat")))])).unwrap();
    net.add_fact(fact(&symbols, "instance_of", &[("individual", Value::Symbol(symbols.intern("rex"))), ("concept", Value::Symbol(symbols.intern("Dog")))])).unwrap();

    assert!(has_violation(&net, &v, "disjoint_classes"));
}

fn has_subsumption(net: &Network, v: &Vocab, sub: &str, sup: &str) -> bool {
    let symbols = net.symbols();
    let sub_val = Value::Symbol(symbols.intern(sub));
    let sup_val = Value::Symbol(symbols.intern(sup));
    net.facts().iter().any(|f| {
        f.type_value(v.type_key) == Some(v.subsumption) && f.get(v.sub) == Some(&sub_val) && f.get(v.sup) == Some(&sup_val)
    })
}

#[test]
fn reserved_concepts_hold_from_construction() {
    let symbols = SymbolTable::new();
    let mut net = Network::new(symbols.clone());
    let v = install_owl_rl(&mut net).unwrap();

    assert!(has_subsumption(&net, &v, "owl:Thing", "owl:Thing"));
    assert!(has_subsumption(&net, &v, "owl:Nothing", "owl:Nothing"));

    net.add_fact(fact(&symbols, "instance_of", &[("individual", Value::Symbol(symbols.intern("pat"))), ("concept", Value::Symbol(symbols.intern("Person")))])).unwrap();
    crate::structural::run_all(&mut net, &symbols, &v).unwrap();

    assert!(has_subsumption(&net, &v, "Person", "owl:Thing"), "every concept must be subsumed by owl:Thing");
    assert!(has_subsumption(&net, &v, "owl:Nothing", "Person"), "owl:Nothing must be subsumed by every concept");
}

#[test]
fn some_values_from_subsumption_propagates_via_scm_svf() {
    let symbols = SymbolTable::new();
    let mut net = Network::new(symbols.clone());
    let v = install_owl_rl(&mut net).unwrap();

    net.add_fact(fact(&symbols, "subsumption", &[("sub", Value::Symbol(symbols.intern("Cat"))), ("sup", Value::Symbol(symbols.intern("Animal")))])).unwrap();
    net.add_fact(fact(&symbols, "some_values_from", &[("concept", Value::Symbol(symbols.intern("HasCat"))), ("property", Value::Symbol(symbols.intern("hasPet"))), ("filler", Value::Symbol(symbols.intern("Cat")))])).unwrap();
    net.add_fact(fact(&symbols, "some_values_from", &[("concept", Value::Symbol(symbols.intern("HasAnimal"))), ("property", Value::Symbol(symbols.intern("hasPet"))), ("filler", Value::Symbol(symbols.intern("Animal")))])).unwrap();

    assert!(has_subsumption(&net, &v, "HasCat", "HasAnimal"), "someValuesFrom should propagate subsumption along the filler hierarchy");
}

#[test]
fn all_values_from_subsumption_propagates_via_scm_avf() {
    let symbols = SymbolTable::new();
    let mut net = Network::new(symbols.clone());
    let v = install_owl_rl(&mut net).unwrap();

    net.add_fact(fact(&symbols, "subsumption", &[("sub", Value::Symbol(symbols.intern("Cat"))), ("sup", Value::Symbol(symbols.intern("Animal")))])).unwrap();
    net.add_fact(fact(&symbols, "all_values_from", &[("concept", Value::Symbol(symbols.intern("OnlyCat"))), ("property", Value::Symbol(symbols.intern("hasPet"))), ("filler", Value::Symbol(symbols.intern("Cat")))])).unwrap();
    net.add_fact(fact(&symbols, "all_values_from", &[("concept", Value::Symbol(symbols.intern("OnlyAnimal"))), ("property", Value::Symbol(symbols.intern("hasPet"))), ("filler", Value::Symbol(symbols.intern("Animal")))])).unwrap();

    assert!(has_subsumption(&net, &v, "OnlyCat", "OnlyAnimal"), "allValuesFrom is covariant in the filler: a stricter filler yields a more specific restriction");
}
