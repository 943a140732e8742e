//! Validation rules (val-*): entailments whose only consequence is a
//! `violation` fact rather than new domain knowledge. These are the
//! rule set's integrity checks — functional-property clashes that
//! produced two provably distinct individuals, and the bound-of-one
//! cardinality case already seen in `cls`.

use dlrete_lexicon::{SymbolTable, Value};
use dlrete_network::{Action, AttrValueSpec, ConditionSpec, ConsequentSpec, JoinTest, Network, NetworkError};

use crate::vocab::Vocab;

fn violation(v: &Vocab, kind: &str, rule: &str) -> ConsequentSpec {
    ConsequentSpec::new(v.type_key, v.violation)
        .attr(v.violation_type, AttrValueSpec::Const(Value::Str(kind.to_string())))
        .attr(v.detected_by, AttrValueSpec::Const(Value::Str(rule.to_string())))
}

/// `max_cardinality(c,p,0) ^ instance_of(x,c) ^ role_assertion(x,p,y) -> violation`
fn val_max1(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let c = symbols.intern("c");
    let p = symbols.intern("p");
    let x = symbols.intern("x");
    let y = symbols.intern("y");

    let cond1 = ConditionSpec::for_type(v.type_key, v.max_cardinality)
        .bind(v.concept, c)
        .bind(v.property, p)
        .constant(v.bound, Value::Int(0));
    let cond2 = ConditionSpec::for_type(v.type_key, v.instance_of).bind(v.individual, x).bind(v.concept, c);
    let cond3 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, y);

    let consequent = violation(v, "max_cardinality_zero_violation", "val-max1")
        .attr(v.individual, AttrValueSpec::Var(x))
        .attr(v.concept, AttrValueSpec::Var(c))
        .attr(v.property, AttrValueSpec::Var(p));

    net.compile_production(
        symbols.intern("val-max1"),
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

/// `max_qualified_cardinality(c,p,0,qc) ^ instance_of(x,c) ^
/// role_assertion(x,p,y) ^ instance_of(y,qc) -> violation`
fn val_max1i(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let c = symbols.intern("c");
    let p = symbols.intern("p");
    let qc = symbols.intern("qc");
    let x = symbols.intern("x");
    let y = symbols.intern("y");

    let cond1 = ConditionSpec::for_type(v.type_key, v.max_qualified_cardinality)
        .bind(v.concept, c)
        .bind(v.property, p)
        .bind(v.filler, qc)
        .constant(v.bound, Value::Int(0));
    let cond2 = ConditionSpec::for_type(v.type_key, v.instance_of).bind(v.individual, x).bind(v.concept, c);
    let cond3 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, y);
    let cond4 = ConditionSpec::for_type(v.type_key, v.instance_of).bind(v.individual, y).bind(v.concept, qc);

    let consequent = violation(v, "max_qualified_cardinality_zero_violation", "val-max1i")
        .attr(v.individual, AttrValueSpec::Var(x))
        .attr(v.concept, AttrValueSpec::Var(c))
        .attr(v.property, AttrValueSpec::Var(p));

    net.compile_production(
        symbols.intern("val-max1i"),
        vec![cond1, cond2, cond3, cond4],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(c, c)], vec![]),
            (vec![JoinTest::eq(x, x), JoinTest::eq(p, p)], vec![]),
            (vec![JoinTest::eq(y, y), JoinTest::eq(qc, qc)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// Functional-property clash surfaced as a violation rather than
/// silently merged: `functional(p) ^ role_assertion(x,p,y1) ^
/// role_assertion(x,p,y2) ^ different_from(y1,y2) -> violation`. Kept
/// distinct from `prp-fp` (which instead derives `same_as(y1,y2)`) for
/// the case where the two fillers are already known apart.
fn val_fp(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p = symbols.intern("p");
    let x = symbols.intern("x");
    let y1 = symbols.intern("y1");
    let y2 = symbols.intern("y2");

    let cond1 = ConditionSpec::for_type(v.type_key, v.functional).bind(v.property, p);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, y1);
    let cond3 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, y2);
    let cond4 = ConditionSpec::for_type(v.type_key, v.different_from).bind(v.ind1, y1).bind(v.ind2, y2);

    let consequent = violation(v, "functional_property_clash", "val-fp")
        .attr(v.individual, AttrValueSpec::Var(x))
        .attr(v.property, AttrValueSpec::Var(p))
        .attr(v.ind1, AttrValueSpec::Var(y1))
        .attr(v.ind2, AttrValueSpec::Var(y2));

    net.compile_production(
        symbols.intern("val-fp"),
        vec![cond1, cond2, cond3, cond4],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(p, p)], vec![]),
            (vec![JoinTest::eq(x, x), JoinTest::eq(p, p), JoinTest::ne(y1, y2)], vec![]),
            (vec![JoinTest::eq(y1, y1), JoinTest::eq(y2, y2)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `inverse_functional(p) ^ role_assertion(x1,p,y) ^
/// role_assertion(x2,p,y) ^ different_from(x1,x2) -> violation`
fn val_fpi(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p = symbols.intern("p");
    let x1 = symbols.intern("x1");
    let x2 = symbols.intern("x2");
    let y = symbols.intern("y");

    let cond1 = ConditionSpec::for_type(v.type_key, v.inverse_functional).bind(v.property, p);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x1)
        .bind(v.role, p)
        .bind(v.object, y);
    let cond3 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x2)
        .bind(v.role, p)
        .bind(v.object, y);
    let cond4 = ConditionSpec::for_type(v.type_key, v.different_from).bind(v.ind1, x1).bind(v.ind2, x2);

    let consequent = violation(v, "inverse_functional_property_clash", "val-fpi")
        .attr(v.property, AttrValueSpec::Var(p))
        .attr(v.ind1, AttrValueSpec::Var(x1))
        .attr(v.ind2, AttrValueSpec::Var(x2));

    net.compile_production(
        symbols.intern("val-fpi"),
        vec![cond1, cond2, cond3, cond4],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(p, p)], vec![]),
            (vec![JoinTest::eq(y, y), JoinTest::eq(p, p), JoinTest::ne(x1, x2)], vec![]),
            (vec![JoinTest::eq(x1, x1), JoinTest::eq(x2, x2)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `instance_of(x, owl:Nothing) -> violation` — the base case every
/// other contradiction (disjointness, complement, cardinality clash
/// compounded with `different_from`) ultimately reduces to once
/// `owl:Nothing` membership is derived anywhere else in the catalogue.
fn val_validation_indiv3(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let x = symbols.intern("x");

    let cond1 = ConditionSpec::for_type(v.type_key, v.instance_of)
        .bind(v.individual, x)
        .constant(v.concept, Value::Symbol(v.nothing));

    let consequent = violation(v, "nothing_instantiated", "val-validationIndiv3").attr(v.individual, AttrValueSpec::Var(x));

    net.compile_production(symbols.intern("val-validationIndiv3"), vec![cond1], vec![(vec![], vec![])], Action::Derive(consequent))?;
    Ok(())
}

pub fn install(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    val_max1(net, symbols, v)?;
    val_max1i(net, symbols, v)?;
    val_fp(net, symbols, v)?;
    val_fpi(net, symbols, v)?;
    val_validation_indiv3(net, symbols, v)?;
    Ok(())
}
