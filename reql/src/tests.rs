use dlrete_facts::FactRecord;
use dlrete_lexicon::{SymbolTable, Value};
use dlrete_network::Network;
use dlrete_templates::install_owl_rl;

use crate::query;

fn fact(symbols: &SymbolTable, type_name: &str, attrs: &[(&str, Value)]) -> FactRecord {
    let mut v = vec![(symbols.intern("type"), Value::Symbol(symbols.intern(type_name)))];
    for (k, val) in attrs {
        v.push((symbols.intern(k), val.clone()));
    }
    FactRecord::new(v)
}

fn sample_network() -> Network {
    let symbols = SymbolTable::new();
    let mut net = Network::new(symbols.clone());
    install_owl_rl(&mut net).unwrap();
    net.add_fact(fact(&symbols, "instance_of", &[("individual", Value::Symbol(symbols.intern("felix"))), ("concept", Value::Symbol(symbols.intern("Cat")))]))
        .unwrap();
    net.add_fact(fact(&symbols, "instance_of", &[("individual", Value::Symbol(symbols.intern("tom"))), ("concept", Value::Symbol(symbols.intern("Cat")))]))
        .unwrap();
    net.add_fact(fact(&symbols, "instance_of", &[("individual", Value::Symbol(symbols.intern("rex"))), ("concept", Value::Symbol(symbols.intern("Dog")))]))
        .unwrap();
    net.add_fact(fact(
        &symbols,
        "role_assertion",
        &[
            ("subject", Value::Symbol(symbols.intern("felix"))),
            ("role", Value::Symbol(symbols.intern("chases"))),
            ("object", Value::Symbol(symbols.intern("tom"))),
        ],
    ))
    .unwrap();
    net.add_fact(fact(
        &symbols,
        "role_assertion",
        &[
            ("subject", Value::Symbol(symbols.intern("rex"))),
            ("role", Value::Symbol(symbols.intern("chases"))),
            ("object", Value::Symbol(symbols.intern("tom"))),
        ],
    ))
    .unwrap();
    net
}

fn vocab(net: &Network) -> dlrete_templates::Vocab {
    dlrete_templates::Vocab::new(net.symbols())
}

#[test]
fn rdf_type_triple_matches_every_instance() {
    let mut net = sample_network();
    let v = vocab(&net);
    let result = query(&mut net, &v, "SELECT ?x WHERE { ?x a Cat }", 0).unwrap();
    assert_eq!(result.num_rows(), 2);
}

#[test]
fn two_triple_join_shares_the_chaser_variable() {
    let mut net = sample_network();
    let v = vocab(&net);
    let result = query(&mut net, &v, "SELECT ?who WHERE { ?who chases tom . ?who a Cat }", 0).unwrap();
    assert_eq!(result.num_rows(), 1);
}

#[test]
fn filter_restricts_rows() {
    let mut net = sample_network();
    let v = vocab(&net);
    let result = query(&mut net, &v, "SELECT ?x ?y WHERE { ?x chases ?y . FILTER(?x != rex) }", 0).unwrap();
    assert_eq!(result.num_rows(), 1);
}

#[test]
fn optional_null_fills_when_unmatched() {
    let mut net = sample_network();
    let v = vocab(&net);
    let result = query(&mut net, &v, "SELECT ?x ?y WHERE { ?x a Dog . OPTIONAL { ?x marriedTo ?y } }", 0).unwrap();
    assert_eq!(result.num_rows(), 1);
    let col = result.column("y").unwrap();
    assert_eq!(col[0], &Value::Null);
}

#[test]
fn optional_binds_when_matched() {
    let mut net = sample_network();
    let v = vocab(&net);
    let result = query(&mut net, &v, "SELECT ?x ?y WHERE { ?x a Dog . OPTIONAL { ?x chases ?y } }", 0).unwrap();
    assert_eq!(result.num_rows(), 1);
    let col = result.column("y").unwrap();
    assert_eq!(col[0], &Value::Symbol(net.symbols().intern("tom")));
}

#[test]
fn count_with_group_by() {
    let mut net = sample_network();
    let v = vocab(&net);
    let result = query(&mut net, &v, "SELECT ?y (COUNT(?x) AS n) WHERE { ?x chases ?y } GROUP BY ?y", 0).unwrap();
    assert_eq!(result.num_rows(), 1);
    let n = result.column("n").unwrap();
    assert_eq!(n[0], &Value::Int(2));
}

#[test]
fn having_filters_groups() {
    let mut net = sample_network();
    let v = vocab(&net);
    let result = query(&mut net, &v, "SELECT ?y (COUNT(?x) AS n) WHERE { ?x chases ?y } GROUP BY ?y HAVING(COUNT(?x) > 1)", 0).unwrap();
    assert_eq!(result.num_rows(), 1);
    let result_none = query(&mut net, &v, "SELECT ?y (COUNT(?x) AS n) WHERE { ?x chases ?y } GROUP BY ?y HAVING(COUNT(?x) > 10)", 0).unwrap();
    assert_eq!(result_none.num_rows(), 0);
}

#[test]
fn having_can_reference_the_projected_alias() {
    let mut net = sample_network();
    let v = vocab(&net);
    let result = query(&mut net, &v, "SELECT ?y (COUNT(?x) AS n) WHERE { ?x chases ?y } GROUP BY ?y HAVING(n > 1)", 0).unwrap();
    assert_eq!(result.num_rows(), 1);
}

#[test]
fn order_by_and_limit() {
    let mut net = sample_network();
    let v = vocab(&net);
    let result = query(&mut net, &v, "SELECT ?x WHERE { ?x a Cat } ORDER BY DESC ?x LIMIT 1", 0).unwrap();
    assert_eq!(result.num_rows(), 1);
}

#[test]
fn distinct_deduplicates() {
    let mut net = sample_network();
    let v = vocab(&net);
    let result = query(&mut net, &v, "SELECT DISTINCT ?y WHERE { ?x chases ?y }", 0).unwrap();
    assert_eq!(result.num_rows(), 1);
}

#[test]
fn repeated_variable_in_one_triple_requires_equality() {
    let mut net = sample_network();
    let v = vocab(&net);
    // No individual chases itself in the sample data.
    let result = query(&mut net, &v, "SELECT ?x WHERE { ?x chases ?x }", 0).unwrap();
    assert_eq!(result.num_rows(), 0);

    let symbols = net.symbols().clone();
    net.add_fact(fact(&symbols, "role_assertion", &[("subject", Value::Symbol(symbols.intern("tom"))), ("role", Value::Symbol(symbols.intern("chases"))), ("object", Value::Symbol(symbols.intern("tom")))]))
        .unwrap();
    let result = query(&mut net, &v, "SELECT ?x WHERE { ?x chases ?x }", 0).unwrap();
    assert_eq!(result.num_rows(), 1);
}

#[test]
fn describe_returns_assertions_about_a_subject() {
    let mut net = sample_network();
    let v = vocab(&net);
    let result = query(&mut net, &v, "DESCRIBE felix", 0).unwrap();
    assert_eq!(result.num_rows(), 2);
}
