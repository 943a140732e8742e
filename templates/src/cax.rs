//! Class-axiom entailments (cax-*): propagating `instance_of` through
//! subsumption and class equivalence, and flagging disjoint-class
//! violations.

use dlrete_lexicon::SymbolTable;
use dlrete_network::{
    Action, AttrValueSpec, ConditionSpec, ConsequentSpec, JoinTest, Network, NetworkError,
};

use crate::vocab::Vocab;

/// `instance_of(x, c1) ^ subsumption(c1, c2) -> instance_of(x, c2)`
fn cax_sco(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let x = symbols.intern("x");
    let c1 = symbols.intern("c1");
    let c2 = symbols.intern("c2");

    let cond1 = ConditionSpec::for_type(v.type_key, v.instance_of)
        .bind(v.individual, x)
        .bind(v.concept, c1);
    let cond2 = ConditionSpec::for_type(v.type_key, v.subsumption)
        .bind(v.sub, c1)
        .bind(v.sup, c2);

    let consequent = ConsequentSpec::new(v.type_key, v.instance_of)
        .attr(v.individual, AttrValueSpec::Var(x))
        .attr(v.concept, AttrValueSpec::Var(c2));

    net.compile_production(
        symbols.intern("cax-sco"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(c1, c1)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `instance_of(x, c1) ^ equivalent_class(c1, c2) -> instance_of(x, c2)`
fn cax_eqc1(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let x = symbols.intern("x");
    let c1 = symbols.intern("c1");
    let c2 = symbols.intern("c2");

    let cond1 = ConditionSpec::for_type(v.type_key, v.instance_of)
        .bind(v.individual, x)
        .bind(v.concept, c1);
    let cond2 = ConditionSpec::for_type(v.type_key, v.equivalent_class)
        .bind(v.concept1, c1)
        .bind(v.concept2, c2);

    let consequent = ConsequentSpec::new(v.type_key, v.instance_of)
        .attr(v.individual, AttrValueSpec::Var(x))
        .attr(v.concept, AttrValueSpec::Var(c2));

    net.compile_production(
        symbols.intern("cax-eqc1"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(c1, c1)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `instance_of(x, c1) ^ equivalent_class(c2, c1) -> instance_of(x, c2)`
/// — the symmetric direction `eqc1` doesn't cover, since
/// `equivalent_class` is stored directionally rather than as an
/// automatically-symmetric predicate.
fn cax_eqc2(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let x = symbols.intern("x");
    let c1 = symbols.intern("c1");
    let c2 = symbols.intern("c2");

    let cond1 = ConditionSpec::for_type(v.type_key, v.instance_of)
        .bind(v.individual, x)
        .bind(v.concept, c1);
    let cond2 = ConditionSpec::for_type(v.type_key, v.equivalent_class)
        .bind(v.concept2, c1)
        .bind(v.concept1, c2);

    let consequent = ConsequentSpec::new(v.type_key, v.instance_of)
        .attr(v.individual, AttrValueSpec::Var(x))
        .attr(v.concept, AttrValueSpec::Var(c2));

    net.compile_production(
        symbols.intern("cax-eqc2"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(c1, c1)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `instance_of(x, c1) ^ instance_of(x, c2) ^ disjoint_with(c1, c2) ->
/// violation(disjoint_classes, cax-dw, [x, c1, c2])`
fn cax_dw(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let x = symbols.intern("x");
    let c1 = symbols.intern("c1");
    let c2 = symbols.intern("c2");

    let cond1 = ConditionSpec::for_type(v.type_key, v.instance_of)
        .bind(v.individual, x)
        .bind(v.concept, c1);
    let cond2 = ConditionSpec::for_type(v.type_key, v.instance_of)
        .bind(v.individual, x)
        .bind(v.concept, c2);
    let cond3 = ConditionSpec::for_type(v.type_key, v.disjoint_with)
        .bind(v.class1, c1)
        .bind(v.class2, c2);

    let consequent = ConsequentSpec::new(v.type_key, v.violation)
        .attr(v.violation_type, AttrValueSpec::Const(dlrete_lexicon::Value::Str("disjoint_classes".into())))
        .attr(v.detected_by, AttrValueSpec::Const(dlrete_lexicon::Value::Str("cax-dw".into())))
        .attr(v.individual, AttrValueSpec::Var(x))
        .attr(v.class1, AttrValueSpec::Var(c1))
        .attr(v.class2, AttrValueSpec::Var(c2));

    net.compile_production(
        symbols.intern("cax-dw"),
        vec![cond1, cond2, cond3],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(x, x)], vec![]),
            (vec![JoinTest::eq(c1, c1), JoinTest::eq(c2, c2)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

pub fn install(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    cax_sco(net, symbols, v)?;
    cax_eqc1(net, symbols, v)?;
    cax_eqc2(net, symbols, v)?;
    cax_dw(net, symbols, v)?;
    Ok(())
}
