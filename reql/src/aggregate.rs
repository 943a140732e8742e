//! GROUP BY partitioning and the five SQL-style aggregate functions,
//! plus the HAVING/ORDER BY bridge that lets an aggregate value be
//! referenced from an ordinary scalar expression.

use std::collections::HashSet;

use dlrete_lexicon::{Symbol, SymbolTable, Value};
use dlrete_network::Bindings;

use crate::ast::{AggArg, AggFn, AggregateCall, Expr};
use crate::compiler::VarTable;

fn stringify(symbols: &SymbolTable, v: &Value) -> String {
    match v {
        Value::Symbol(s) => symbols.try_name(*s).map(|n| n.to_string()).unwrap_or_default(),
        Value::Str(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
    }
}

fn arg_values(symbols: &SymbolTable, vars: &mut VarTable, arg: &AggArg, rows: &[Bindings]) -> Vec<Value> {
    match arg {
        AggArg::Star => Vec::new(),
        AggArg::Var(name) => {
            let sym = vars.intern(name);
            let _ = symbols;
            rows.iter().filter_map(|r| r.get(&sym).cloned()).collect()
        }
    }
}

fn dedup(values: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    values.into_iter().filter(|v| seen.insert(v.clone())).collect()
}

pub fn compute_aggregate(symbols: &SymbolTable, vars: &mut VarTable, call: &AggregateCall, rows: &[Bindings]) -> Value {
    if matches!(call.arg, AggArg::Star) && matches!(call.func, AggFn::Count) {
        return Value::Int(rows.len() as i64);
    }
    let mut values = arg_values(symbols, vars, &call.arg, rows);
    if call.distinct {
        values = dedup(values);
    }
    match call.func {
        AggFn::Count => Value::Int(values.len() as i64),
        AggFn::Sum => Value::Float(values.iter().filter_map(|v| v.as_float()).sum()),
        AggFn::Avg => {
            let floats: Vec<f64> = values.iter().filter_map(|v| v.as_float()).collect();
            if floats.is_empty() {
                Value::Null
            } else {
                Value::Float(floats.iter().sum::<f64>() / floats.len() as f64)
            }
        }
        AggFn::Min => values
            .into_iter()
            .reduce(|a, b| if matches!(b.partial_compare(&a), Some(std::cmp::Ordering::Less)) { b } else { a })
            .unwrap_or(Value::Null),
        AggFn::Max => values
            .into_iter()
            .reduce(|a, b| if matches!(b.partial_compare(&a), Some(std::cmp::Ordering::Greater)) { b } else { a })
            .unwrap_or(Value::Null),
        AggFn::GroupConcat => {
            let sep = call.separator.as_deref().unwrap_or(" ");
            Value::Str(values.iter().map(|v| stringify(symbols, v)).collect::<Vec<_>>().join(sep))
        }
    }
}

pub fn group_key(row: &Bindings, group_vars: &[Symbol]) -> Vec<Value> {
    group_vars.iter().map(|v| row.get(v).cloned().unwrap_or(Value::Null)).collect()
}

/// Partition rows by `group_vars`' values. An empty `group_vars` with a
/// non-empty input still yields exactly one group — the whole result
/// set, for a bare `SELECT COUNT(*)` with no `GROUP BY`.
pub fn partition(rows: Vec<Bindings>, group_vars: &[Symbol]) -> Vec<Vec<Bindings>> {
    if group_vars.is_empty() {
        return if rows.is_empty() { Vec::new() } else { vec![rows] };
    }
    let mut order: Vec<Vec<Value>> = Vec::new();
    let mut groups: std::collections::HashMap<Vec<Value>, Vec<Bindings>> = std::collections::HashMap::new();
    for row in rows {
        let key = group_key(&row, group_vars);
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(row);
    }
    order.into_iter().map(|k| groups.remove(&k).unwrap_or_default()).collect()
}

/// HAVING may name a SELECT list aggregate either by restating the call
/// (`HAVING(COUNT(?x) > 1)`) or by its alias (`HAVING(n > 1)`) — resolve
/// the latter into the former before aggregate substitution runs, so both
/// forms compile to the same node.
pub fn resolve_aliases(expr: &Expr, aliases: &std::collections::HashMap<String, AggregateCall>) -> Expr {
    match expr {
        Expr::Term(crate::ast::Term::Var(name)) => match aliases.get(name) {
            Some(call) => Expr::Aggregate(call.clone()),
            None => expr.clone(),
        },
        Expr::Arith(l, op, r) => Expr::Arith(Box::new(resolve_aliases(l, aliases)), *op, Box::new(resolve_aliases(r, aliases))),
        Expr::Compare(l, op, r) => Expr::Compare(Box::new(resolve_aliases(l, aliases)), *op, Box::new(resolve_aliases(r, aliases))),
        Expr::Builtin(f, args) => Expr::Builtin(*f, args.iter().map(|a| resolve_aliases(a, aliases)).collect()),
        Expr::And(l, r) => Expr::And(Box::new(resolve_aliases(l, aliases)), Box::new(resolve_aliases(r, aliases))),
        Expr::Or(l, r) => Expr::Or(Box::new(resolve_aliases(l, aliases)), Box::new(resolve_aliases(r, aliases))),
        Expr::Not(e) => Expr::Not(Box::new(resolve_aliases(e, aliases))),
        Expr::Term(_) | Expr::Aggregate(_) => expr.clone(),
    }
}

/// Rewrite every `Expr::Aggregate` node in `expr` into a reference to a
/// synthetic variable, computing its value now (over `rows`) and binding
/// it into `rep` — so the ordinary scalar evaluator in `eval.rs` can
/// then run over `expr` unchanged, unaware aggregation ever happened.
pub fn substitute_aggregates(symbols: &SymbolTable, vars: &mut VarTable, expr: &Expr, rows: &[Bindings], rep: &mut Bindings) -> Expr {
    match expr {
        Expr::Aggregate(call) => {
            let value = compute_aggregate(symbols, vars, call, rows);
            let synthetic = format!("__agg_{}", rep.len());
            let sym = symbols.intern(&synthetic);
            rep.insert(sym, value);
            Expr::Term(crate::ast::Term::Var(synthetic))
        }
        Expr::Arith(l, op, r) => Expr::Arith(
            Box::new(substitute_aggregates(symbols, vars, l, rows, rep)),
            *op,
            Box::new(substitute_aggregates(symbols, vars, r, rows, rep)),
        ),
        Expr::Compare(l, op, r) => Expr::Compare(
            Box::new(substitute_aggregates(symbols, vars, l, rows, rep)),
            *op,
            Box::new(substitute_aggregates(symbols, vars, r, rows, rep)),
        ),
        Expr::Builtin(f, args) => {
            Expr::Builtin(*f, args.iter().map(|a| substitute_aggregates(symbols, vars, a, rows, rep)).collect())
        }
        Expr::And(l, r) => Expr::And(
            Box::new(substitute_aggregates(symbols, vars, l, rows, rep)),
            Box::new(substitute_aggregates(symbols, vars, r, rows, rep)),
        ),
        Expr::Or(l, r) => Expr::Or(
            Box::new(substitute_aggregates(symbols, vars, l, rows, rep)),
            Box::new(substitute_aggregates(symbols, vars, r, rows, rep)),
        ),
        Expr::Not(e) => Expr::Not(Box::new(substitute_aggregates(symbols, vars, e, rows, rep))),
        Expr::Term(_) => expr.clone(),
    }
}
