//! Class-description entailments (cls-*) over the fixed-arity
//! descriptions — complement, value restrictions, and the common
//! cardinality-bound-of-one cases. `intersection_of`, `union_of`, and
//! `one_of` carry a variable-length `members` list in a fact's
//! structured data rather than its indexed attributes, which RETE
//! conditions can't match against; those, plus cardinality bounds other
//! than one, are handled by the imperative pass in `structural`.

use dlrete_lexicon::{SymbolTable, Value};
use dlrete_network::{Action, AttrValueSpec, ConditionSpec, ConsequentSpec, JoinTest, Network, NetworkError};

use crate::vocab::Vocab;

/// `instance_of(x,c1) ^ complement_of(c1,c2) ^ instance_of(x,c2) -> violation`
fn cls_com(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let x = symbols.intern("x");
    let c1 = symbols.intern("c1");
    let c2 = symbols.intern("c2");

    let cond1 = ConditionSpec::for_type(v.type_key, v.instance_of).bind(v.individual, x).bind(v.concept, c1);
    let cond2 = ConditionSpec::for_type(v.type_key, v.complement_of).bind(v.concept1, c1).bind(v.concept2, c2);
    let cond3 = ConditionSpec::for_type(v.type_key, v.instance_of).bind(v.individual, x).bind(v.concept, c2);

    let consequent = ConsequentSpec::new(v.type_key, v.violation)
        .attr(v.violation_type, AttrValueSpec::Const(Value::Str("complementary_classes".into())))
        .attr(v.detected_by, AttrValueSpec::Const(Value::Str("cls-com".into())))
        .attr(v.individual, AttrValueSpec::Var(x))
        .attr(v.concept1, AttrValueSpec::Var(c1))
        .attr(v.concept2, AttrValueSpec::Var(c2));

    net.compile_production(
        symbols.intern("cls-com"),
        vec![cond1, cond2, cond3],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(c1, c1)], vec![]),
            (vec![JoinTest::eq(x, x), JoinTest::eq(c2, c2)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `some_values_from(c,p,y) ^ role_assertion(x,p,v) ^ instance_of(v,y) -> instance_of(x,c)`
fn cls_svf1(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let c = symbols.intern("c");
    let p = symbols.intern("p");
    let y = symbols.intern("y");
    let x = symbols.intern("x");
    let val = symbols.intern("val");

    let cond1 = ConditionSpec::for_type(v.type_key, v.some_values_from)
        .bind(v.concept, c)
        .bind(v.property, p)
        .bind(v.filler, y);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, val);
    let cond3 = ConditionSpec::for_type(v.type_key, v.instance_of).bind(v.individual, val).bind(v.concept, y);

    let consequent = ConsequentSpec::new(v.type_key, v.instance_of)
        .attr(v.individual, AttrValueSpec::Var(x))
        .attr(v.concept, AttrValueSpec::Var(c));

    net.compile_production(
        symbols.intern("cls-svf1"),
        vec![cond1, cond2, cond3],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(p, p)], vec![]),
            (vec![JoinTest::eq(val, val), JoinTest::eq(y, y)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `some_values_from(c,p,owl:Thing) ^ role_assertion(x,p,v) -> instance_of(x,c)`
fn cls_svf2(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let c = symbols.intern("c");
    let p = symbols.intern("p");
    let x = symbols.intern("x");
    let val = symbols.intern("val");

    let cond1 = ConditionSpec::for_type(v.type_key, v.some_values_from)
        .bind(v.concept, c)
        .bind(v.property, p)
        .constant(v.filler, Value::Symbol(v.thing));
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, val);

    let consequent = ConsequentSpec::new(v.type_key, v.instance_of)
        .attr(v.individual, AttrValueSpec::Var(x))
        .attr(v.concept, AttrValueSpec::Var(c));

    net.compile_production(
        symbols.intern("cls-svf2"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(p, p)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `instance_of(x,c) ^ all_values_from(c,p,y) ^ role_assertion(x,p,v) -> instance_of(v,y)`
fn cls_avf(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let x = symbols.intern("x");
    let c = symbols.intern("c");
    let p = symbols.intern("p");
    let y = symbols.intern("y");
    let val = symbols.intern("val");

    let cond1 = ConditionSpec::for_type(v.type_key, v.instance_of).bind(v.individual, x).bind(v.concept, c);
    let cond2 = ConditionSpec::for_type(v.type_key, v.all_values_from)
        .bind(v.concept, c)
        .bind(v.property, p)
        .bind(v.filler, y);
    let cond3 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, val);

    let consequent = ConsequentSpec::new(v.type_key, v.instance_of)
        .attr(v.individual, AttrValueSpec::Var(val))
        .attr(v.concept, AttrValueSpec::Var(y));

    net.compile_production(
        symbols.intern("cls-avf"),
        vec![cond1, cond2, cond3],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(c, c)], vec![]),
            (vec![JoinTest::eq(x, x), JoinTest::eq(p, p)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `has_value(c,p,v) ^ instance_of(x,c) -> role_assertion(x,p,v)`
fn cls_hv1(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let c = symbols.intern("c");
    let p = symbols.intern("p");
    let val = symbols.intern("val");
    let x = symbols.intern("x");

    let cond1 = ConditionSpec::for_type(v.type_key, v.has_value)
        .bind(v.concept, c)
        .bind(v.property, p)
        .bind(v.filler, val);
    let cond2 = ConditionSpec::for_type(v.type_key, v.instance_of).bind(v.individual, x).bind(v.concept, c);

    let consequent = ConsequentSpec::new(v.type_key, v.role_assertion)
        .attr(v.subject, AttrValueSpec::Var(x))
        .attr(v.role, AttrValueSpec::Var(p))
        .attr(v.object, AttrValueSpec::Var(val));

    net.compile_production(
        symbols.intern("cls-hv1"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(c, c)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `has_value(c,p,v) ^ role_assertion(x,p,v) -> instance_of(x,c)`
fn cls_hv2(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let c = symbols.intern("c");
    let p = symbols.intern("p");
    let val = symbols.intern("val");
    let x = symbols.intern("x");

    let cond1 = ConditionSpec::for_type(v.type_key, v.has_value)
        .bind(v.concept, c)
        .bind(v.property, p)
        .bind(v.filler, val);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, val);

    let consequent = ConsequentSpec::new(v.type_key, v.instance_of)
        .attr(v.individual, AttrValueSpec::Var(x))
        .attr(v.concept, AttrValueSpec::Var(c));

    net.compile_production(
        symbols.intern("cls-hv2"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(p, p), JoinTest::eq(val, val)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `max_cardinality(c,p,1) ^ instance_of(x,c) ^ role_assertion(x,p,y1) ^
/// role_assertion(x,p,y2) -> same_as(y1,y2)`. Only the bound-of-one case
/// is compiled; an arbitrary bound needs counting over however many
/// fillers exist, which `structural` handles.
fn cls_maxc1(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let c = symbols.intern("c");
    let p = symbols.intern("p");
    let x = symbols.intern("x");
    let y1 = symbols.intern("y1");
    let y2 = symbols.intern("y2");

    let cond1 = ConditionSpec::for_type(v.type_key, v.max_cardinality)
        .bind(v.concept, c)
        .bind(v.property, p)
        .constant(v.bound, Value::Int(1));
    let cond2 = ConditionSpec::for_type(v.type_key, v.instance_of).bind(v.individual, x).bind(v.concept, c);
    let cond3 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, y1);
    let cond4 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, y2);

    let consequent = ConsequentSpec::new(v.type_key, v.same_as)
        .attr(v.ind1, AttrValueSpec::Var(y1))
        .attr(v.ind2, AttrValueSpec::Var(y2));

    net.compile_production(
        symbols.intern("cls-maxc1"),
        vec![cond1, cond2, cond3, cond4],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(c, c)], vec![]),
            (vec![JoinTest::eq(x, x), JoinTest::eq(p, p)], vec![]),
            (vec![JoinTest::eq(x, x), JoinTest::eq(p, p), JoinTest::ne(y1, y2)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `max_qualified_cardinality(c,p,1,qc) ^ instance_of(x,c) ^
/// role_assertion(x,p,y1) ^ instance_of(y1,qc) ^ role_assertion(x,p,y2) ^
/// instance_of(y2,qc) -> same_as(y1,y2)`. Bound-of-one case, qc != owl:Thing.
fn cls_maxqc1(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let c = symbols.intern("c");
    let p = symbols.intern("p");
    let qc = symbols.intern("qc");
    let x = symbols.intern("x");
    let y1 = symbols.intern("y1");
    let y2 = symbols.intern("y2");

    let cond1 = ConditionSpec::for_type(v.type_key, v.max_qualified_cardinality)
        .bind(v.concept, c)
        .bind(v.property, p)
        .bind(v.filler, qc)
        .constant(v.bound, Value::Int(1));
    let cond2 = ConditionSpec::for_type(v.type_key, v.instance_of).bind(v.individual, x).bind(v.concept, c);
    let cond3 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, y1);
    let cond4 = ConditionSpec::for_type(v.type_key, v.instance_of).bind(v.individual, y1).bind(v.concept, qc);
    let cond5 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, y2);
    let cond6 = ConditionSpec::for_type(v.type_key, v.instance_of).bind(v.individual, y2).bind(v.concept, qc);

    let consequent = ConsequentSpec::new(v.type_key, v.same_as)
        .attr(v.ind1, AttrValueSpec::Var(y1))
        .attr(v.ind2, AttrValueSpec::Var(y2));

    net.compile_production(
        symbols.intern("cls-maxqc1"),
        vec![cond1, cond2, cond3, cond4, cond5, cond6],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(c, c)], vec![]),
            (vec![JoinTest::eq(x, x), JoinTest::eq(p, p)], vec![]),
            (vec![JoinTest::eq(y1, y1), JoinTest::eq(qc, qc)], vec![]),
            (vec![JoinTest::eq(x, x), JoinTest::eq(p, p)], vec![]),
            (vec![JoinTest::eq(y2, y2), JoinTest::eq(qc, qc), JoinTest::ne(y1, y2)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `max_qualified_cardinality(c,p,1,owl:Thing) ^ instance_of(x,c) ^
/// role_assertion(x,p,y1) ^ role_assertion(x,p,y2) -> same_as(y1,y2)` —
/// the qualifier-is-Thing special case, equivalent to cls-maxc1 but kept
/// as its own production so the qualified-cardinality source fact drives
/// it directly.
fn cls_maxqc2(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let c = symbols.intern("c");
    let p = symbols.intern("p");
    let x = symbols.intern("x");
    let y1 = symbols.intern("y1");
    let y2 = symbols.intern("y2");

    let cond1 = ConditionSpec::for_type(v.type_key, v.max_qualified_cardinality)
        .bind(v.concept, c)
        .bind(v.property, p)
        .constant(v.filler, Value::Symbol(v.thing))
        .constant(v.bound, Value::Int(1));
    let cond2 = ConditionSpec::for_type(v.type_key, v.instance_of).bind(v.individual, x).bind(v.concept, c);
    let cond3 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, y1);
    let cond4 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, y2);

    let consequent = ConsequentSpec::new(v.type_key, v.same_as)
        .attr(v.ind1, AttrValueSpec::Var(y1))
        .attr(v.ind2, AttrValueSpec::Var(y2));

    net.compile_production(
        symbols.intern("cls-maxqc2"),
        vec![cond1, cond2, cond3, cond4],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(c, c)], vec![]),
            (vec![JoinTest::eq(x, x), JoinTest::eq(p, p)], vec![]),
            (vec![JoinTest::eq(x, x), JoinTest::eq(p, p), JoinTest::ne(y1, y2)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

pub fn install(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    cls_com(net, symbols, v)?;
    cls_svf1(net, symbols, v)?;
    cls_svf2(net, symbols, v)?;
    cls_avf(net, symbols, v)?;
    cls_hv1(net, symbols, v)?;
    cls_hv2(net, symbols, v)?;
    cls_maxc1(net, symbols, v)?;
    cls_maxqc1(net, symbols, v)?;
    cls_maxqc2(net, symbols, v)?;
    Ok(())
}
