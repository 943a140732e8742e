//! Equality entailments (eq-*): symmetry and transitivity of `same_as`,
//! substitution through `role_assertion` positions, and the
//! `different_from` violation check. The reflexivity rule (eq-ref) and
//! the list-based `all_different` variants (eq-diff2/eq-diff3) have no
//! single triggering fact type under fixed-arity RETE conditions and are
//! handled by the imperative pass in `structural`.

use dlrete_lexicon::SymbolTable;
use dlrete_network::{Action, AttrValueSpec, ConditionSpec, ConsequentSpec, JoinTest, Network, NetworkError};

use crate::vocab::Vocab;

/// `same_as(a,b) -> same_as(b,a)`
fn eq_sym(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let a = symbols.intern("a");
    let b = symbols.intern("b");

    let cond1 = ConditionSpec::for_type(v.type_key, v.same_as).bind(v.ind1, a).bind(v.ind2, b);

    let consequent = ConsequentSpec::new(v.type_key, v.same_as)
        .attr(v.ind1, AttrValueSpec::Var(b))
        .attr(v.ind2, AttrValueSpec::Var(a));

    net.compile_production(symbols.intern("eq-sym"), vec![cond1], vec![(vec![], vec![])], Action::Derive(consequent))?;
    Ok(())
}

/// `same_as(a,b) ^ same_as(b,c) -> same_as(a,c)`
fn eq_trans(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let a = symbols.intern("a");
    let b = symbols.intern("b");
    let c = symbols.intern("c");

    let cond1 = ConditionSpec::for_type(v.type_key, v.same_as).bind(v.ind1, a).bind(v.ind2, b);
    let cond2 = ConditionSpec::for_type(v.type_key, v.same_as).bind(v.ind1, b).bind(v.ind2, c);

    let consequent = ConsequentSpec::new(v.type_key, v.same_as)
        .attr(v.ind1, AttrValueSpec::Var(a))
        .attr(v.ind2, AttrValueSpec::Var(c));

    net.compile_production(
        symbols.intern("eq-trans"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(b, b)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `same_as(s,s2) ^ role_assertion(s,p,o) -> role_assertion(s2,p,o)`
fn eq_rep_s(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let s = symbols.intern("s");
    let s2 = symbols.intern("s2");
    let p = symbols.intern("p");
    let o = symbols.intern("o");

    let cond1 = ConditionSpec::for_type(v.type_key, v.same_as).bind(v.ind1, s).bind(v.ind2, s2);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, s)
        .bind(v.role, p)
        .bind(v.object, o);

    let consequent = ConsequentSpec::new(v.type_key, v.role_assertion)
        .attr(v.subject, AttrValueSpec::Var(s2))
        .attr(v.role, AttrValueSpec::Var(p))
        .attr(v.object, AttrValueSpec::Var(o));

    net.compile_production(
        symbols.intern("eq-rep-s"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(s, s)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `same_as(p,p2) ^ role_assertion(s,p,o) -> role_assertion(s,p2,o)`
fn eq_rep_p(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p = symbols.intern("p");
    let p2 = symbols.intern("p2");
    let s = symbols.intern("s");
    let o = symbols.intern("o");

    let cond1 = ConditionSpec::for_type(v.type_key, v.same_as).bind(v.ind1, p).bind(v.ind2, p2);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, s)
        .bind(v.role, p)
        .bind(v.object, o);

    let consequent = ConsequentSpec::new(v.type_key, v.role_assertion)
        .attr(v.subject, AttrValueSpec::Var(s))
        .attr(v.role, AttrValueSpec::Var(p2))
        .attr(v.object, AttrValueSpec::Var(o));

    net.compile_production(
        symbols.intern("eq-rep-p"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(p, p)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `same_as(o,o2) ^ role_assertion(s,p,o) -> role_assertion(s,p,o2)`
fn eq_rep_o(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let o = symbols.intern("o");
    let o2 = symbols.intern("o2");
    let s = symbols.intern("s");
    let p = symbols.intern("p");

    let cond1 = ConditionSpec::for_type(v.type_key, v.same_as).bind(v.ind1, o).bind(v.ind2, o2);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, s)
        .bind(v.role, p)
        .bind(v.object, o);

    let consequent = ConsequentSpec::new(v.type_key, v.role_assertion)
        .attr(v.subject, AttrValueSpec::Var(s))
        .attr(v.role, AttrValueSpec::Var(p))
        .attr(v.object, AttrValueSpec::Var(o2));

    net.compile_production(
        symbols.intern("eq-rep-o"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(o, o)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `same_as(a,b) ^ different_from(a,b) -> violation`
fn eq_diff1(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let a = symbols.intern("a");
    let b = symbols.intern("b");

    let cond1 = ConditionSpec::for_type(v.type_key, v.same_as).bind(v.ind1, a).bind(v.ind2, b);
    let cond2 = ConditionSpec::for_type(v.type_key, v.different_from).bind(v.ind1, a).bind(v.ind2, b);

    let consequent = ConsequentSpec::new(v.type_key, v.violation)
        .attr(v.violation_type, AttrValueSpec::Const(dlrete_lexicon::Value::Str("same_and_different".into())))
        .attr(v.detected_by, AttrValueSpec::Const(dlrete_lexicon::Value::Str("eq-diff1".into())))
        .attr(v.ind1, AttrValueSpec::Var(a))
        .attr(v.ind2, AttrValueSpec::Var(b));

    net.compile_production(
        symbols.intern("eq-diff1"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(a, a), JoinTest::eq(b, b)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

pub fn install(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    eq_sym(net, symbols, v)?;
    eq_trans(net, symbols, v)?;
    eq_rep_s(net, symbols, v)?;
    eq_rep_p(net, symbols, v)?;
    eq_rep_o(net, symbols, v)?;
    eq_diff1(net, symbols, v)?;
    Ok(())
}
