//! Schema-level entailments (scm-*): transitivity of subsumption and
//! sub-property at the schema itself, class/property equivalence as
//! mutual subsumption, and domain/range propagation along the
//! subsumption hierarchy. These operate purely on T-box facts
//! (`subsumption`, `sub_property`, `domain`, `range`, `equivalent_*`)
//! rather than on individuals.

use dlrete_facts::FactRecord;
use dlrete_lexicon::{SymbolTable, Value};
use dlrete_network::{Action, AttrValueSpec, ConditionSpec, ConsequentSpec, JoinTest, Network, NetworkError};

use crate::vocab::Vocab;

fn subsumption_record(symbols: &SymbolTable, v: &Vocab, sub: dlrete_lexicon::Symbol, sup: dlrete_lexicon::Symbol, rule_name: &str) -> FactRecord {
    FactRecord::new(vec![(v.type_key, Value::Symbol(v.subsumption)), (v.sub, Value::Symbol(sub)), (v.sup, Value::Symbol(sup))])
        .inferred_by(symbols.intern(rule_name))
}

fn equivalent_class_record(symbols: &SymbolTable, v: &Vocab, c1: dlrete_lexicon::Symbol, c2: dlrete_lexicon::Symbol, rule_name: &str) -> FactRecord {
    FactRecord::new(vec![
        (v.type_key, Value::Symbol(v.equivalent_class)),
        (v.concept1, Value::Symbol(c1)),
        (v.concept2, Value::Symbol(c2)),
    ])
    .inferred_by(symbols.intern(rule_name))
}

/// `owl:Thing` and `owl:Nothing` are declared concepts from construction
/// on, reflexively self-subsumed and self-equivalent, regardless of
/// whether anything in the store yet refers to them.
fn install_reserved_concepts(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    net.add_fact(subsumption_record(symbols, v, v.thing, v.thing, "scm-cls"))?;
    net.add_fact(subsumption_record(symbols, v, v.nothing, v.nothing, "scm-cls"))?;
    net.add_fact(equivalent_class_record(symbols, v, v.thing, v.thing, "scm-cls"))?;
    net.add_fact(equivalent_class_record(symbols, v, v.nothing, v.nothing, "scm-cls"))?;
    Ok(())
}

/// `subsumption(c1,c2) ^ subsumption(c2,c3) -> subsumption(c1,c3)`
fn scm_sco(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let c1 = symbols.intern("c1");
    let c2 = symbols.intern("c2");
    let c3 = symbols.intern("c3");

    let cond1 = ConditionSpec::for_type(v.type_key, v.subsumption).bind(v.sub, c1).bind(v.sup, c2);
    let cond2 = ConditionSpec::for_type(v.type_key, v.subsumption).bind(v.sub, c2).bind(v.sup, c3);

    let consequent = ConsequentSpec::new(v.type_key, v.subsumption)
        .attr(v.sub, AttrValueSpec::Var(c1))
        .attr(v.sup, AttrValueSpec::Var(c3));

    net.compile_production(
        symbols.intern("scm-sco"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(c2, c2)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `sub_property(p1,p2) ^ sub_property(p2,p3) -> sub_property(p1,p3)`
fn scm_spo(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p1 = symbols.intern("p1");
    let p2 = symbols.intern("p2");
    let p3 = symbols.intern("p3");

    let cond1 = ConditionSpec::for_type(v.type_key, v.sub_property).bind(v.sub, p1).bind(v.sup, p2);
    let cond2 = ConditionSpec::for_type(v.type_key, v.sub_property).bind(v.sub, p2).bind(v.sup, p3);

    let consequent = ConsequentSpec::new(v.type_key, v.sub_property)
        .attr(v.sub, AttrValueSpec::Var(p1))
        .attr(v.sup, AttrValueSpec::Var(p3));

    net.compile_production(
        symbols.intern("scm-spo"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(p2, p2)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `equivalent_class(c1,c2) -> subsumption(c1,c2)` — one direction;
/// `cax_eqc1`/`cax_eqc2` already consult `equivalent_class` directly for
/// instance propagation, this adds the schema-level subsumption fact
/// itself so `scm-sco` chains through it transparently.
fn scm_eqc(net: &mut Network, symbols: &SymbolTable, v: &Vocab, name: &str, swap: bool) -> Result<(), NetworkError> {
    let c1 = symbols.intern("c1");
    let c2 = symbols.intern("c2");

    let (from, to) = if swap { (c2, c1) } else { (c1, c2) };
    let cond1 = ConditionSpec::for_type(v.type_key, v.equivalent_class).bind(v.concept1, c1).bind(v.concept2, c2);

    let consequent = ConsequentSpec::new(v.type_key, v.subsumption)
        .attr(v.sub, AttrValueSpec::Var(from))
        .attr(v.sup, AttrValueSpec::Var(to));

    net.compile_production(symbols.intern(name), vec![cond1], vec![(vec![], vec![])], Action::Derive(consequent))?;
    Ok(())
}

/// `equivalent_property(p1,p2) -> sub_property(p1,p2)`, one direction per call.
fn scm_eqp(net: &mut Network, symbols: &SymbolTable, v: &Vocab, name: &str, swap: bool) -> Result<(), NetworkError> {
    let p1 = symbols.intern("p1");
    let p2 = symbols.intern("p2");

    let (from, to) = if swap { (p2, p1) } else { (p1, p2) };
    let cond1 = ConditionSpec::for_type(v.type_key, v.equivalent_property).bind(v.prop1, p1).bind(v.prop2, p2);

    let consequent = ConsequentSpec::new(v.type_key, v.sub_property)
        .attr(v.sub, AttrValueSpec::Var(from))
        .attr(v.sup, AttrValueSpec::Var(to));

    net.compile_production(symbols.intern(name), vec![cond1], vec![(vec![], vec![])], Action::Derive(consequent))?;
    Ok(())
}

/// `domain(p,c1) ^ subsumption(c1,c2) -> domain(p,c2)`
fn scm_dom1(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p = symbols.intern("p");
    let c1 = symbols.intern("c1");
    let c2 = symbols.intern("c2");

    let cond1 = ConditionSpec::for_type(v.type_key, v.domain).bind(v.property, p).bind(v.concept, c1);
    let cond2 = ConditionSpec::for_type(v.type_key, v.subsumption).bind(v.sub, c1).bind(v.sup, c2);

    let consequent = ConsequentSpec::new(v.type_key, v.domain)
        .attr(v.property, AttrValueSpec::Var(p))
        .attr(v.concept, AttrValueSpec::Var(c2));

    net.compile_production(
        symbols.intern("scm-dom1"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(c1, c1)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `domain(p2,c) ^ sub_property(p1,p2) -> domain(p1,c)`
fn scm_dom2(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p2 = symbols.intern("p2");
    let c = symbols.intern("c");
    let p1 = symbols.intern("p1");

    let cond1 = ConditionSpec::for_type(v.type_key, v.domain).bind(v.property, p2).bind(v.concept, c);
    let cond2 = ConditionSpec::for_type(v.type_key, v.sub_property).bind(v.sub, p1).bind(v.sup, p2);

    let consequent = ConsequentSpec::new(v.type_key, v.domain)
        .attr(v.property, AttrValueSpec::Var(p1))
        .attr(v.concept, AttrValueSpec::Var(c));

    net.compile_production(
        symbols.intern("scm-dom2"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(p2, p2)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `range(p,c1) ^ subsumption(c1,c2) -> range(p,c2)`
fn scm_rng1(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p = symbols.intern("p");
    let c1 = symbols.intern("c1");
    let c2 = symbols.intern("c2");

    let cond1 = ConditionSpec::for_type(v.type_key, v.range).bind(v.property, p).bind(v.concept, c1);
    let cond2 = ConditionSpec::for_type(v.type_key, v.subsumption).bind(v.sub, c1).bind(v.sup, c2);

    let consequent = ConsequentSpec::new(v.type_key, v.range)
        .attr(v.property, AttrValueSpec::Var(p))
        .attr(v.concept, AttrValueSpec::Var(c2));

    net.compile_production(
        symbols.intern("scm-rng1"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(c1, c1)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `range(p2,c) ^ sub_property(p1,p2) -> range(p1,c)`
fn scm_rng2(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p2 = symbols.intern("p2");
    let c = symbols.intern("c");
    let p1 = symbols.intern("p1");

    let cond1 = ConditionSpec::for_type(v.type_key, v.range).bind(v.property, p2).bind(v.concept, c);
    let cond2 = ConditionSpec::for_type(v.type_key, v.sub_property).bind(v.sub, p1).bind(v.sup, p2);

    let consequent = ConsequentSpec::new(v.type_key, v.range)
        .attr(v.property, AttrValueSpec::Var(p1))
        .attr(v.concept, AttrValueSpec::Var(c));

    net.compile_production(
        symbols.intern("scm-rng2"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(p2, p2)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `some_values_from(x,p,y1) ^ subsumption(y1,y2) ^ some_values_from(x2,p,y2) -> subsumption(x,x2)`
fn scm_svf1(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let x = symbols.intern("x");
    let x2 = symbols.intern("x2");
    let p = symbols.intern("p");
    let y1 = symbols.intern("y1");
    let y2 = symbols.intern("y2");

    let cond1 = ConditionSpec::for_type(v.type_key, v.some_values_from).bind(v.concept, x).bind(v.property, p).bind(v.filler, y1);
    let cond2 = ConditionSpec::for_type(v.type_key, v.subsumption).bind(v.sub, y1).bind(v.sup, y2);
    let cond3 =
        ConditionSpec::for_type(v.type_key, v.some_values_from).bind(v.concept, x2).bind(v.property, p).bind(v.filler, y2);

    let consequent = ConsequentSpec::new(v.type_key, v.subsumption)
        .attr(v.sub, AttrValueSpec::Var(x))
        .attr(v.sup, AttrValueSpec::Var(x2));

    net.compile_production(
        symbols.intern("scm-svf1"),
        vec![cond1, cond2, cond3],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(y1, y1)], vec![]),
            (vec![JoinTest::eq(p, p), JoinTest::eq(y2, y2)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `some_values_from(x,p1,y) ^ some_values_from(x2,p2,y) ^ sub_property(p1,p2) -> subsumption(x,x2)`
fn scm_svf2(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let x = symbols.intern("x");
    let x2 = symbols.intern("x2");
    let p1 = symbols.intern("p1");
    let p2 = symbols.intern("p2");
    let y = symbols.intern("y");

    let cond1 = ConditionSpec::for_type(v.type_key, v.some_values_from).bind(v.concept, x).bind(v.property, p1).bind(v.filler, y);
    let cond2 =
        ConditionSpec::for_type(v.type_key, v.some_values_from).bind(v.concept, x2).bind(v.property, p2).bind(v.filler, y);
    let cond3 = ConditionSpec::for_type(v.type_key, v.sub_property).bind(v.sub, p1).bind(v.sup, p2);

    let consequent = ConsequentSpec::new(v.type_key, v.subsumption)
        .attr(v.sub, AttrValueSpec::Var(x))
        .attr(v.sup, AttrValueSpec::Var(x2));

    net.compile_production(
        symbols.intern("scm-svf2"),
        vec![cond1, cond2, cond3],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(y, y)], vec![]),
            (vec![JoinTest::eq(p1, p1), JoinTest::eq(p2, p2)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `all_values_from(x1,p,y1) ^ subsumption(y2,y1) ^ all_values_from(x2,p,y2) -> subsumption(x2,x1)`
fn scm_avf1(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let x1 = symbols.intern("x1");
    let x2 = symbols.intern("x2");
    let p = symbols.intern("p");
    let y1 = symbols.intern("y1");
    let y2 = symbols.intern("y2");

    let cond1 = ConditionSpec::for_type(v.type_key, v.all_values_from).bind(v.concept, x1).bind(v.property, p).bind(v.filler, y1);
    let cond2 = ConditionSpec::for_type(v.type_key, v.subsumption).bind(v.sub, y2).bind(v.sup, y1);
    let cond3 =
        ConditionSpec::for_type(v.type_key, v.all_values_from).bind(v.concept, x2).bind(v.property, p).bind(v.filler, y2);

    let consequent = ConsequentSpec::new(v.type_key, v.subsumption)
        .attr(v.sub, AttrValueSpec::Var(x2))
        .attr(v.sup, AttrValueSpec::Var(x1));

    net.compile_production(
        symbols.intern("scm-avf1"),
        vec![cond1, cond2, cond3],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(y1, y1)], vec![]),
            (vec![JoinTest::eq(p, p), JoinTest::eq(y2, y2)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `all_values_from(x1,p1,y) ^ all_values_from(x2,p2,y) ^ sub_property(p1,p2) -> subsumption(x2,x1)`
fn scm_avf2(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let x1 = symbols.intern("x1");
    let x2 = symbols.intern("x2");
    let p1 = symbols.intern("p1");
    let p2 = symbols.intern("p2");
    let y = symbols.intern("y");

    let cond1 = ConditionSpec::for_type(v.type_key, v.all_values_from).bind(v.concept, x1).bind(v.property, p1).bind(v.filler, y);
    let cond2 =
        ConditionSpec::for_type(v.type_key, v.all_values_from).bind(v.concept, x2).bind(v.property, p2).bind(v.filler, y);
    let cond3 = ConditionSpec::for_type(v.type_key, v.sub_property).bind(v.sub, p1).bind(v.sup, p2);

    let consequent = ConsequentSpec::new(v.type_key, v.subsumption)
        .attr(v.sub, AttrValueSpec::Var(x2))
        .attr(v.sup, AttrValueSpec::Var(x1));

    net.compile_production(
        symbols.intern("scm-avf2"),
        vec![cond1, cond2, cond3],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(y, y)], vec![]),
            (vec![JoinTest::eq(p1, p1), JoinTest::eq(p2, p2)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

// `has_key(c1,keys) ^ subsumption(c2,c1) -> has_key(c2,keys)` (scm-hv,
// key inheritance down the subsumption hierarchy) isn't compiled here:
// `keys` is a variable-length list carried in a fact's structured data,
// which `ConditionSpec` can't bind against. `structural::scm_hv` handles
// it as an imperative pass alongside the other list-based rules.

pub fn install(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    install_reserved_concepts(net, symbols, v)?;
    scm_sco(net, symbols, v)?;
    scm_spo(net, symbols, v)?;
    scm_eqc(net, symbols, v, "scm-eqc1", false)?;
    scm_eqc(net, symbols, v, "scm-eqc2", true)?;
    scm_eqp(net, symbols, v, "scm-eqp1", false)?;
    scm_eqp(net, symbols, v, "scm-eqp2", true)?;
    scm_dom1(net, symbols, v)?;
    scm_dom2(net, symbols, v)?;
    scm_rng1(net, symbols, v)?;
    scm_rng2(net, symbols, v)?;
    scm_svf1(net, symbols, v)?;
    scm_svf2(net, symbols, v)?;
    scm_avf1(net, symbols, v)?;
    scm_avf2(net, symbols, v)?;
    Ok(())
}
