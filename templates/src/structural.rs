//! Imperative passes over the fact store for entailments whose body
//! ranges over a variable-length list (`StructuredField::Strings`)
//! rather than a fixed set of attributes — intersection/union/one-of
//! class descriptions, key-based identity, the `AllDifferent` /
//! `AllDisjointClasses` / `AllDisjointProperties` collections, property
//! chains, and the reflexivity of `same_as`.
//!
//! None of this is RETE-compiled: a structural pass re-scans the store
//! each time it runs rather than reacting incrementally to individual
//! fact insertions. Call [`run_all`] again after a batch of new facts
//! that might touch list-based axioms (property chains, keys, n-ary
//! intersections, and so on); the fixed-arity catalogue in the other
//! modules keeps propagating incrementally around whatever a structural
//! pass derives, since derived facts go through the same `add_fact` path
//! as anything else.

use std::collections::{HashMap, HashSet};

use dlrete_facts::FactRecord;
use dlrete_lexicon::{Symbol, SymbolTable, Value};
use dlrete_network::{Network, NetworkError};

use crate::vocab::Vocab;

fn members_of(net: &Network, symbols: &SymbolTable, fact_id: dlrete_facts::FactId, key: Symbol) -> Vec<Symbol> {
    let Some(fact) = net.facts().get(fact_id) else { return Vec::new() };
    match fact.get_data(key) {
        Some(dlrete_facts::StructuredField::Strings(names)) => names.iter().map(|n| symbols.intern(n)).collect(),
        _ => Vec::new(),
    }
}

fn instances_of(net: &Network, v: &Vocab, concept: Symbol) -> HashSet<Symbol> {
    net.facts()
        .iter()
        .filter(|f| f.type_value(v.type_key) == Some(v.instance_of))
        .filter(|f| f.get(v.concept).and_then(Value::as_symbol) == Some(concept))
        .filter_map(|f| f.get(v.individual).and_then(Value::as_symbol))
        .collect()
}

fn role_fillers(net: &Network, v: &Vocab, subject: Symbol, property: Symbol) -> HashSet<Symbol> {
    net.facts()
        .iter()
        .filter(|f| f.type_value(v.type_key) == Some(v.role_assertion))
        .filter(|f| f.get(v.subject).and_then(Value::as_symbol) == Some(subject))
        .filter(|f| f.get(v.role).and_then(Value::as_symbol) == Some(property))
        .filter_map(|f| f.get(v.object).cloned())
        .collect()
}

fn instance_of_record(symbols: &SymbolTable, v: &Vocab, individual: Symbol, concept: Symbol, rule_name: &str) -> FactRecord {
    FactRecord::new(vec![
        (v.type_key, Value::Symbol(v.instance_of)),
        (v.individual, Value::Symbol(individual)),
        (v.concept, Value::Symbol(concept)),
    ])
    .inferred_by(symbols.intern(rule_name))
}

fn same_as_record(symbols: &SymbolTable, v: &Vocab, a: Symbol, b: Symbol, rule_name: &str) -> FactRecord {
    FactRecord::new(vec![(v.type_key, Value::Symbol(v.same_as)), (v.ind1, Value::Symbol(a)), (v.ind2, Value::Symbol(b))])
        .inferred_by(symbols.intern(rule_name))
}

fn violation_record(symbols: &SymbolTable, v: &Vocab, kind: &str, rule_name: &str, extra: Vec<(Symbol, Value)>) -> FactRecord {
    let mut attrs = vec![
        (v.type_key, Value::Symbol(v.violation)),
        (v.violation_type, Value::Str(kind.to_string())),
        (v.detected_by, Value::Str(rule_name.to_string())),
    ];
    attrs.extend(extra);
    FactRecord::new(attrs).inferred_by(symbols.intern(rule_name))
}

/// `intersection_of(c, members)` in both directions: an individual in
/// every member class is in `c` (cls-int1), and an individual in `c` is
/// in every member class (cls-int2).
fn cls_int(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let facts: Vec<(dlrete_facts::FactId, Symbol)> = net
        .facts()
        .iter()
        .filter(|f| f.type_value(v.type_key) == Some(v.intersection_of))
        .filter_map(|f| f.get(v.concept).and_then(Value::as_symbol).map(|c| (f.id, c)))
        .collect();

    for (fact_id, c) in facts {
        let members = members_of(net, symbols, fact_id, v.members);
        if members.is_empty() {
            continue;
        }

        // cls-int2: c's instances belong to every member class.
        let c_instances = instances_of(net, v, c);
        for x in &c_instances {
            for &m in &members {
                net.add_fact(instance_of_record(symbols, v, *x, m, "cls-int2"))?;
            }
        }

        // cls-int1: instances common to every member class belong to c.
        let mut common: Option<HashSet<Symbol>> = None;
        for &m in &members {
            let this = instances_of(net, v, m);
            common = Some(match common {
                None => this,
                Some(prev) => prev.intersection(&this).copied().collect(),
            });
        }
        if let Some(xs) = common {
            for x in xs {
                net.add_fact(instance_of_record(symbols, v, x, c, "cls-int1"))?;
            }
        }
    }
    Ok(())
}

/// `union_of(c, members)`: an individual in any member class is in `c`.
fn cls_uni(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let facts: Vec<(dlrete_facts::FactId, Symbol)> = net
        .facts()
        .iter()
        .filter(|f| f.type_value(v.type_key) == Some(v.union_of))
        .filter_map(|f| f.get(v.concept).and_then(Value::as_symbol).map(|c| (f.id, c)))
        .collect();

    for (fact_id, c) in facts {
        for m in members_of(net, symbols, fact_id, v.members) {
            for x in instances_of(net, v, m) {
                net.add_fact(instance_of_record(symbols, v, x, c, "cls-uni"))?;
            }
        }
    }
    Ok(())
}

/// `one_of(c, members)`: every named member is an instance of `c`.
fn cls_oo(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let facts: Vec<(dlrete_facts::FactId, Symbol)> = net
        .facts()
        .iter()
        .filter(|f| f.type_value(v.type_key) == Some(v.one_of))
        .filter_map(|f| f.get(v.concept).and_then(Value::as_symbol).map(|c| (f.id, c)))
        .collect();

    for (fact_id, c) in facts {
        for m in members_of(net, symbols, fact_id, v.members) {
            net.add_fact(instance_of_record(symbols, v, m, c, "cls-oo"))?;
        }
    }
    Ok(())
}

/// `property_chain(chain=[p1..pn], sup=p)` walked against `role_assertion`:
/// any path `x0 -p1-> x1 -p2-> ... -pn-> xn` entails `role_assertion(x0,p,xn)`.
fn prp_spo2(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let facts: Vec<(dlrete_facts::FactId, Symbol)> = net
        .facts()
        .iter()
        .filter(|f| f.type_value(v.type_key) == Some(v.property_chain))
        .filter_map(|f| f.get(v.sup).and_then(Value::as_symbol).map(|p| (f.id, p)))
        .collect();

    for (fact_id, sup) in facts {
        let chain = members_of(net, symbols, fact_id, v.chain);
        if chain.is_empty() {
            continue;
        }
        // All subjects that could start the chain: every x with a
        // role_assertion under the chain's first property.
        let starts: HashSet<Symbol> = net
            .facts()
            .iter()
            .filter(|f| f.type_value(v.type_key) == Some(v.role_assertion))
            .filter(|f| f.get(v.role).and_then(Value::as_symbol) == Some(chain[0]))
            .filter_map(|f| f.get(v.subject).and_then(Value::as_symbol))
            .collect();

        for x0 in starts {
            let mut frontier: HashSet<Symbol> = [x0].into_iter().collect();
            for &p in &chain {
                let mut next = HashSet::new();
                for x in &frontier {
                    for filler in role_fillers(net, v, *x, p) {
                        if let Some(sym) = filler.as_symbol() {
                            next.insert(sym);
                        }
                    }
                }
                frontier = next;
                if frontier.is_empty() {
                    break;
                }
            }
            for xn in frontier {
                let record = FactRecord::new(vec![
                    (v.type_key, Value::Symbol(v.role_assertion)),
                    (v.subject, Value::Symbol(x0)),
                    (v.role, Value::Symbol(sup)),
                    (v.object, Value::Symbol(xn)),
                ])
                .inferred_by(symbols.intern("prp-spo2"));
                net.add_fact(record)?;
            }
        }
    }
    Ok(())
}

/// `has_key(c, keys)`: two instances of `c` agreeing on every key
/// property's filler (for at least one shared filler per key) are the
/// same individual.
fn prp_key(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let facts: Vec<(dlrete_facts::FactId, Symbol)> = net
        .facts()
        .iter()
        .filter(|f| f.type_value(v.type_key) == Some(v.has_key))
        .filter_map(|f| f.get(v.class).and_then(Value::as_symbol).map(|c| (f.id, c)))
        .collect();

    for (fact_id, c) in facts {
        let keys = members_of(net, symbols, fact_id, v.keys);
        if keys.is_empty() {
            continue;
        }
        let instances: Vec<Symbol> = instances_of(net, v, c).into_iter().collect();
        for i in 0..instances.len() {
            for j in (i + 1)..instances.len() {
                let (x, y) = (instances[i], instances[j]);
                let agrees = keys.iter().all(|&k| {
                    let xs = role_fillers(net, v, x, k);
                    let ys = role_fillers(net, v, y, k);
                    !xs.is_empty() && xs.intersection(&ys).next().is_some()
                });
                if agrees {
                    net.add_fact(same_as_record(symbols, v, x, y, "prp-key"))?;
                }
            }
        }
    }
    Ok(())
}

/// `all_disjoint_properties(members)`: any two member properties sharing
/// a `(subject, object)` pair are a violation.
fn prp_adp(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let facts: Vec<dlrete_facts::FactId> =
        net.facts().iter().filter(|f| f.type_value(v.type_key) == Some(v.all_disjoint_properties)).map(|f| f.id).collect();

    for fact_id in facts {
        let members = members_of(net, symbols, fact_id, v.members);
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                let (pi, pj) = (members[i], members[j]);
                let pairs_i: HashSet<(Symbol, Value)> = net
                    .facts()
                    .iter()
                    .filter(|f| f.type_value(v.type_key) == Some(v.role_assertion))
                    .filter(|f| f.get(v.role).and_then(Value::as_symbol) == Some(pi))
                    .filter_map(|f| {
                        let s = f.get(v.subject).and_then(Value::as_symbol)?;
                        let o = f.get(v.object).cloned()?;
                        Some((s, o))
                    })
                    .collect();
                let hits: Vec<(Symbol, Value)> = net
                    .facts()
                    .iter()
                    .filter(|f| f.type_value(v.type_key) == Some(v.role_assertion))
                    .filter(|f| f.get(v.role).and_then(Value::as_symbol) == Some(pj))
                    .filter_map(|f| {
                        let s = f.get(v.subject).and_then(Value::as_symbol)?;
                        let o = f.get(v.object).cloned()?;
                        Some((s, o))
                    })
                    .filter(|pair| pairs_i.contains(pair))
                    .collect();
                for (s, o) in hits {
                    net.add_fact(violation_record(
                        symbols,
                        v,
                        "disjoint_properties_violation",
                        "prp-adp",
                        vec![(v.subject, Value::Symbol(s)), (v.object, o), (v.prop1, Value::Symbol(pi)), (v.prop2, Value::Symbol(pj))],
                    ))?;
                }
            }
        }
    }
    Ok(())
}

/// `all_different(members)` (eq-diff2/eq-diff3 collapsed into one pass):
/// any two members already related by `same_as` are a violation.
fn eq_diff_list(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let facts: Vec<dlrete_facts::FactId> =
        net.facts().iter().filter(|f| f.type_value(v.type_key) == Some(v.all_different)).map(|f| f.id).collect();

    for fact_id in facts {
        let members = members_of(net, symbols, fact_id, v.members);
        let same: HashMap<(Symbol, Symbol), ()> = net
            .facts()
            .iter()
            .filter(|f| f.type_value(v.type_key) == Some(v.same_as))
            .filter_map(|f| {
                let a = f.get(v.ind1).and_then(Value::as_symbol)?;
                let b = f.get(v.ind2).and_then(Value::as_symbol)?;
                Some(((a, b), ()))
            })
            .collect();

        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                let (a, b) = (members[i], members[j]);
                if same.contains_key(&(a, b)) || same.contains_key(&(b, a)) {
                    net.add_fact(violation_record(
                        symbols,
                        v,
                        "all_different_violation",
                        "eq-diff2",
                        vec![(v.ind1, Value::Symbol(a)), (v.ind2, Value::Symbol(b))],
                    ))?;
                }
            }
        }
    }
    Ok(())
}

/// `all_disjoint_classes(members)`: any individual in two member classes
/// at once is a violation, generalizing `cax-dw` to an arbitrary list.
fn cax_adc(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let facts: Vec<dlrete_facts::FactId> =
        net.facts().iter().filter(|f| f.type_value(v.type_key) == Some(v.all_disjoint_classes)).map(|f| f.id).collect();

    for fact_id in facts {
        let members = members_of(net, symbols, fact_id, v.members);
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                let (ci, cj) = (members[i], members[j]);
                let xs = instances_of(net, v, ci);
                let ys = instances_of(net, v, cj);
                for x in xs.intersection(&ys) {
                    net.add_fact(violation_record(
                        symbols,
                        v,
                        "disjoint_classes_violation",
                        "cax-adc",
                        vec![(v.individual, Value::Symbol(*x)), (v.class1, Value::Symbol(ci)), (v.class2, Value::Symbol(cj))],
                    ))?;
                }
            }
        }
    }
    Ok(())
}

/// `eq-ref`: every individual mentioned anywhere is `same_as` itself.
/// There is no single fixed-arity fact type this could hang off of — an
/// "individual" is anything appearing as a subject, object, or
/// instance-of target — so it is rescanned structurally.
fn eq_ref(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let mut individuals = HashSet::new();
    for f in net.facts().iter() {
        let t = f.type_value(v.type_key);
        if t == Some(v.instance_of) {
            if let Some(x) = f.get(v.individual).and_then(Value::as_symbol) {
                individuals.insert(x);
            }
        }
        if t == Some(v.role_assertion) {
            if let Some(s) = f.get(v.subject).and_then(Value::as_symbol) {
                individuals.insert(s);
            }
            if let Some(o) = f.get(v.object).and_then(Value::as_symbol) {
                individuals.insert(o);
            }
        }
        if t == Some(v.same_as) || t == Some(v.different_from) {
            if let Some(a) = f.get(v.ind1).and_then(Value::as_symbol) {
                individuals.insert(a);
            }
            if let Some(b) = f.get(v.ind2).and_then(Value::as_symbol) {
                individuals.insert(b);
            }
        }
    }
    for x in individuals {
        net.add_fact(same_as_record(symbols, v, x, x, "eq-ref"))?;
    }
    Ok(())
}

fn subsumption_record(symbols: &SymbolTable, v: &Vocab, sub: Symbol, sup: Symbol, rule_name: &str) -> FactRecord {
    FactRecord::new(vec![(v.type_key, Value::Symbol(v.subsumption)), (v.sub, Value::Symbol(sub)), (v.sup, Value::Symbol(sup))])
        .inferred_by(symbols.intern(rule_name))
}

/// `scm-cls`'s universal bound: every concept is subsumed by `owl:Thing`,
/// and `owl:Nothing` is subsumed by every concept. A "concept" isn't
/// declared through any single fixed-arity fact type — it's any symbol
/// used as one across a dozen different fact shapes — so, like `eq_ref`,
/// this rescans the store rather than compiling a join.
fn scm_cls(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let mut concepts = HashSet::new();
    let fact_ids: Vec<dlrete_facts::FactId> = net.facts().iter().map(|f| f.id).collect();
    for fact_id in fact_ids {
        let Some(f) = net.facts().get(fact_id) else { continue };
        let t = f.type_value(v.type_key);
        if t == Some(v.instance_of) || t == Some(v.concept_assertion) {
            if let Some(c) = f.get(v.concept).and_then(Value::as_symbol) {
                concepts.insert(c);
            }
        }
        if t == Some(v.subsumption) {
            if let Some(c) = f.get(v.sub).and_then(Value::as_symbol) {
                concepts.insert(c);
            }
            if let Some(c) = f.get(v.sup).and_then(Value::as_symbol) {
                concepts.insert(c);
            }
        }
        if t == Some(v.domain) || t == Some(v.range) {
            if let Some(c) = f.get(v.concept).and_then(Value::as_symbol) {
                concepts.insert(c);
            }
        }
        if t == Some(v.equivalent_class) || t == Some(v.complement_of) {
            if let Some(c) = f.get(v.concept1).and_then(Value::as_symbol) {
                concepts.insert(c);
            }
            if let Some(c) = f.get(v.concept2).and_then(Value::as_symbol) {
                concepts.insert(c);
            }
        }
        if t == Some(v.disjoint_with) {
            if let Some(c) = f.get(v.class1).and_then(Value::as_symbol) {
                concepts.insert(c);
            }
            if let Some(c) = f.get(v.class2).and_then(Value::as_symbol) {
                concepts.insert(c);
            }
        }
        if t == Some(v.has_key) {
            if let Some(c) = f.get(v.class).and_then(Value::as_symbol) {
                concepts.insert(c);
            }
        }
        if t == Some(v.intersection_of) || t == Some(v.union_of) || t == Some(v.one_of) {
            if let Some(c) = f.get(v.concept).and_then(Value::as_symbol) {
                concepts.insert(c);
            }
            for m in members_of(net, symbols, fact_id, v.members) {
                concepts.insert(m);
            }
        }
        if t == Some(v.some_values_from) || t == Some(v.all_values_from) || t == Some(v.has_value) {
            if let Some(c) = f.get(v.concept).and_then(Value::as_symbol) {
                concepts.insert(c);
            }
        }
        if t == Some(v.max_cardinality) || t == Some(v.max_qualified_cardinality) {
            if let Some(c) = f.get(v.concept).and_then(Value::as_symbol) {
                concepts.insert(c);
            }
        }
        if t == Some(v.all_disjoint_classes) {
            for m in members_of(net, symbols, fact_id, v.members) {
                concepts.insert(m);
            }
        }
    }

    for c in concepts {
        net.add_fact(subsumption_record(symbols, v, c, v.thing, "scm-cls"))?;
        net.add_fact(subsumption_record(symbols, v, v.nothing, c, "scm-cls"))?;
    }
    Ok(())
}

/// `has_key(c1,keys) ^ subsumption(c2,c1) -> has_key(c2,keys)` (scm-hv):
/// a key list applies to every subclass of the class it was declared on.
fn scm_hv(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let facts: Vec<(dlrete_facts::FactId, Symbol)> = net
        .facts()
        .iter()
        .filter(|f| f.type_value(v.type_key) == Some(v.has_key))
        .filter_map(|f| f.get(v.class).and_then(Value::as_symbol).map(|c| (f.id, c)))
        .collect();

    for (fact_id, c1) in facts {
        let keys = members_of(net, symbols, fact_id, v.keys);
        if keys.is_empty() {
            continue;
        }
        let subclasses: Vec<Symbol> = net
            .facts()
            .iter()
            .filter(|f| f.type_value(v.type_key) == Some(v.subsumption))
            .filter(|f| f.get(v.sup).and_then(Value::as_symbol) == Some(c1))
            .filter_map(|f| f.get(v.sub).and_then(Value::as_symbol))
            .collect();
        for c2 in subclasses {
            let names: Vec<String> = keys.iter().map(|&k| symbols.name(k).to_string()).collect();
            let record = FactRecord::new(vec![(v.type_key, Value::Symbol(v.has_key)), (v.class, Value::Symbol(c2))])
                .with_data(v.keys, dlrete_facts::StructuredField::Strings(names))
                .inferred_by(symbols.intern("scm-hv"));
            net.add_fact(record)?;
        }
    }
    Ok(())
}

/// Run every structural pass once. Idempotent: facts are deduplicated by
/// fingerprint on insertion, so re-running after no new list-bearing
/// facts arrived derives nothing further.
pub fn run_all(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    eq_ref(net, symbols, v)?;
    cls_int(net, symbols, v)?;
    cls_uni(net, symbols, v)?;
    cls_oo(net, symbols, v)?;
    prp_spo2(net, symbols, v)?;
    prp_key(net, symbols, v)?;
    prp_adp(net, symbols, v)?;
    eq_diff_list(net, symbols, v)?;
    cax_adc(net, symbols, v)?;
    scm_hv(net, symbols, v)?;
    scm_cls(net, symbols, v)?;
    Ok(())
}
