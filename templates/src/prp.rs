//! Property-axiom entailments (prp-*): domain/range propagation,
//! functional/inverse-functional identity, symmetry, transitivity,
//! inverses, sub-properties, equivalence, and the validation rules that
//! flag a violation instead of deriving a new fact.

use dlrete_lexicon::{SymbolTable, Value};
use dlrete_network::{Action, AttrValueSpec, ConditionSpec, ConsequentSpec, JoinTest, Network, NetworkError};

use crate::vocab::Vocab;

fn violation(v: &Vocab, kind: &str, rule: &str) -> ConsequentSpec {
    ConsequentSpec::new(v.type_key, v.violation)
        .attr(v.violation_type, AttrValueSpec::Const(Value::Str(kind.to_string())))
        .attr(v.detected_by, AttrValueSpec::Const(Value::Str(rule.to_string())))
}

fn prp_dom(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p = symbols.intern("p");
    let c = symbols.intern("c");
    let s = symbols.intern("s");
    let o = symbols.intern("o");

    let cond1 = ConditionSpec::for_type(v.type_key, v.domain).bind(v.property, p).bind(v.concept, c);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, s)
        .bind(v.role, p)
        .bind(v.object, o);

    let consequent = ConsequentSpec::new(v.type_key, v.instance_of)
        .attr(v.individual, AttrValueSpec::Var(s))
        .attr(v.concept, AttrValueSpec::Var(c));

    net.compile_production(
        symbols.intern("prp-dom"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(p, p)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

fn prp_rng(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p = symbols.intern("p");
    let c = symbols.intern("c");
    let s = symbols.intern("s");
    let o = symbols.intern("o");

    let cond1 = ConditionSpec::for_type(v.type_key, v.range).bind(v.property, p).bind(v.concept, c);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, s)
        .bind(v.role, p)
        .bind(v.object, o);

    let consequent = ConsequentSpec::new(v.type_key, v.instance_of)
        .attr(v.individual, AttrValueSpec::Var(o))
        .attr(v.concept, AttrValueSpec::Var(c));

    net.compile_production(
        symbols.intern("prp-rng"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(p, p)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

fn prp_fp(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
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

    let consequent = ConsequentSpec::new(v.type_key, v.same_as)
        .attr(v.ind1, AttrValueSpec::Var(y1))
        .attr(v.ind2, AttrValueSpec::Var(y2));

    net.compile_production(
        symbols.intern("prp-fp"),
        vec![cond1, cond2, cond3],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(p, p)], vec![]),
            (vec![JoinTest::eq(x, x), JoinTest::eq(p, p), JoinTest::ne(y1, y2)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

fn prp_ifp(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
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

    let consequent = ConsequentSpec::new(v.type_key, v.same_as)
        .attr(v.ind1, AttrValueSpec::Var(x1))
        .attr(v.ind2, AttrValueSpec::Var(x2));

    net.compile_production(
        symbols.intern("prp-ifp"),
        vec![cond1, cond2, cond3],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(p, p)], vec![]),
            (vec![JoinTest::eq(y, y), JoinTest::eq(p, p), JoinTest::ne(x1, x2)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

fn prp_symp(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p = symbols.intern("p");
    let x = symbols.intern("x");
    let y = symbols.intern("y");

    let cond1 = ConditionSpec::for_type(v.type_key, v.symmetric).bind(v.property, p);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, y);

    let consequent = ConsequentSpec::new(v.type_key, v.role_assertion)
        .attr(v.subject, AttrValueSpec::Var(y))
        .attr(v.role, AttrValueSpec::Var(p))
        .attr(v.object, AttrValueSpec::Var(x));

    net.compile_production(
        symbols.intern("prp-symp"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(p, p)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

fn prp_asyp(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p = symbols.intern("p");
    let x = symbols.intern("x");
    let y = symbols.intern("y");

    let cond1 = ConditionSpec::for_type(v.type_key, v.asymmetric).bind(v.property, p);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, y);
    let cond3 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, y)
        .bind(v.role, p)
        .bind(v.object, x);

    let consequent = violation(v, "asymmetric_violation", "prp-asyp")
        .attr(v.subject, AttrValueSpec::Var(x))
        .attr(v.object, AttrValueSpec::Var(y))
        .attr(v.role, AttrValueSpec::Var(p));

    net.compile_production(
        symbols.intern("prp-asyp"),
        vec![cond1, cond2, cond3],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(p, p)], vec![]),
            (vec![JoinTest::eq(x, y), JoinTest::eq(y, x), JoinTest::eq(p, p)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

fn prp_trp(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p = symbols.intern("p");
    let x = symbols.intern("x");
    let y = symbols.intern("y");
    let z = symbols.intern("z");

    let cond1 = ConditionSpec::for_type(v.type_key, v.transitive).bind(v.property, p);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, y);
    let cond3 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, y)
        .bind(v.role, p)
        .bind(v.object, z);

    let consequent = ConsequentSpec::new(v.type_key, v.role_assertion)
        .attr(v.subject, AttrValueSpec::Var(x))
        .attr(v.role, AttrValueSpec::Var(p))
        .attr(v.object, AttrValueSpec::Var(z));

    net.compile_production(
        symbols.intern("prp-trp"),
        vec![cond1, cond2, cond3],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(p, p)], vec![]),
            (vec![JoinTest::eq(y, y), JoinTest::eq(p, p)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

fn prp_irp(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p = symbols.intern("p");
    let x = symbols.intern("x");

    let cond1 = ConditionSpec::for_type(v.type_key, v.irreflexive).bind(v.property, p);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p)
        .bind(v.object, x);

    let consequent = violation(v, "irreflexive_violation", "prp-irp")
        .attr(v.individual, AttrValueSpec::Var(x))
        .attr(v.role, AttrValueSpec::Var(p));

    net.compile_production(
        symbols.intern("prp-irp"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(p, p)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

fn prp_inv(net: &mut Network, symbols: &SymbolTable, v: &Vocab, name: &str, swap: bool) -> Result<(), NetworkError> {
    let p1 = symbols.intern("p1");
    let p2 = symbols.intern("p2");
    let x = symbols.intern("x");
    let y = symbols.intern("y");

    let (from_p, to_p) = if swap { (p2, p1) } else { (p1, p2) };

    let cond1 = ConditionSpec::for_type(v.type_key, v.inverse_of).bind(v.prop1, p1).bind(v.prop2, p2);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, from_p)
        .bind(v.object, y);

    let consequent = ConsequentSpec::new(v.type_key, v.role_assertion)
        .attr(v.subject, AttrValueSpec::Var(y))
        .attr(v.role, AttrValueSpec::Var(to_p))
        .attr(v.object, AttrValueSpec::Var(x));

    net.compile_production(
        symbols.intern(name),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(from_p, from_p)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

fn prp_spo1(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p1 = symbols.intern("p1");
    let p2 = symbols.intern("p2");
    let x = symbols.intern("x");
    let y = symbols.intern("y");

    let cond1 = ConditionSpec::for_type(v.type_key, v.sub_property).bind(v.sub, p1).bind(v.sup, p2);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p1)
        .bind(v.object, y);

    let consequent = ConsequentSpec::new(v.type_key, v.role_assertion)
        .attr(v.subject, AttrValueSpec::Var(x))
        .attr(v.role, AttrValueSpec::Var(p2))
        .attr(v.object, AttrValueSpec::Var(y));

    net.compile_production(
        symbols.intern("prp-spo1"),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(p1, p1)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

fn prp_eqp(net: &mut Network, symbols: &SymbolTable, v: &Vocab, name: &str, swap: bool) -> Result<(), NetworkError> {
    let p1 = symbols.intern("p1");
    let p2 = symbols.intern("p2");
    let x = symbols.intern("x");
    let y = symbols.intern("y");

    let (from_prop1, to_prop2) = if swap { (p2, p1) } else { (p1, p2) };

    let cond1 = ConditionSpec::for_type(v.type_key, v.equivalent_property).bind(v.prop1, p1).bind(v.prop2, p2);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, from_prop1)
        .bind(v.object, y);

    let consequent = ConsequentSpec::new(v.type_key, v.role_assertion)
        .attr(v.subject, AttrValueSpec::Var(x))
        .attr(v.role, AttrValueSpec::Var(to_prop2))
        .attr(v.object, AttrValueSpec::Var(y));

    net.compile_production(
        symbols.intern(name),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(from_prop1, from_prop1)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

fn prp_pdw(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    let p1 = symbols.intern("p1");
    let p2 = symbols.intern("p2");
    let x = symbols.intern("x");
    let y = symbols.intern("y");

    let cond1 = ConditionSpec::for_type(v.type_key, v.property_disjoint_with).bind(v.prop1, p1).bind(v.prop2, p2);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p1)
        .bind(v.object, y);
    let cond3 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, x)
        .bind(v.role, p2)
        .bind(v.object, y);

    let consequent = violation(v, "disjoint_properties_violation", "prp-pdw")
        .attr(v.subject, AttrValueSpec::Var(x))
        .attr(v.object, AttrValueSpec::Var(y))
        .attr(v.prop1, AttrValueSpec::Var(p1))
        .attr(v.prop2, AttrValueSpec::Var(p2));

    net.compile_production(
        symbols.intern("prp-pdw"),
        vec![cond1, cond2, cond3],
        vec![
            (vec![], vec![]),
            (vec![JoinTest::eq(p1, p1)], vec![]),
            (vec![JoinTest::eq(x, x), JoinTest::eq(y, y), JoinTest::eq(p2, p2)], vec![]),
        ],
        Action::Derive(consequent),
    )?;
    Ok(())
}

/// `negative_property_assertion(s,p,o) ^ role_assertion(s,p,o) ->
/// violation`. Compiled twice (prp-npa1 for resource-valued `object`,
/// prp-npa2 for literal-valued `object`) to keep the object-property /
/// data-property split from the source rule set visible in the
/// catalogue, even though `role_assertion` doesn't distinguish the two
/// physically.
fn prp_npa(net: &mut Network, symbols: &SymbolTable, v: &Vocab, name: &str) -> Result<(), NetworkError> {
    let s = symbols.intern("s");
    let p = symbols.intern("p");
    let o = symbols.intern("o");

    let cond1 = ConditionSpec::for_type(v.type_key, v.negative_property_assertion)
        .bind(v.subject, s)
        .bind(v.property, p)
        .bind(v.object, o);
    let cond2 = ConditionSpec::for_type(v.type_key, v.role_assertion)
        .bind(v.subject, s)
        .bind(v.role, p)
        .bind(v.object, o);

    let consequent = violation(v, "negative_property_assertion_violation", name)
        .attr(v.subject, AttrValueSpec::Var(s))
        .attr(v.property, AttrValueSpec::Var(p))
        .attr(v.object, AttrValueSpec::Var(o));

    net.compile_production(
        symbols.intern(name),
        vec![cond1, cond2],
        vec![(vec![], vec![]), (vec![JoinTest::eq(s, s), JoinTest::eq(p, p), JoinTest::eq(o, o)], vec![])],
        Action::Derive(consequent),
    )?;
    Ok(())
}

pub fn install(net: &mut Network, symbols: &SymbolTable, v: &Vocab) -> Result<(), NetworkError> {
    prp_dom(net, symbols, v)?;
    prp_rng(net, symbols, v)?;
    prp_fp(net, symbols, v)?;
    prp_ifp(net, symbols, v)?;
    prp_symp(net, symbols, v)?;
    prp_asyp(net, symbols, v)?;
    prp_trp(net, symbols, v)?;
    prp_irp(net, symbols, v)?;
    prp_inv(net, symbols, v, "prp-inv1", false)?;
    prp_inv(net, symbols, v, "prp-inv2", true)?;
    prp_spo1(net, symbols, v)?;
    prp_eqp(net, symbols, v, "prp-eqp1", false)?;
    prp_eqp(net, symbols, v, "prp-eqp2", true)?;
    prp_pdw(net, symbols, v)?;
    prp_npa(net, symbols, v, "prp-npa1")?;
    prp_npa(net, symbols, v, "prp-npa2")?;
    Ok(())
}
