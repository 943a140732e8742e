//! REQL: the graph-pattern query language layered over the RETE network.
//! A query compiles its triple patterns into ordinary productions (so a
//! query and an OWL RL rule share the same join machinery and the same
//! node-sharing benefits) and reads results back from the production's
//! beta memory rather than draining an event log, so a cached query can
//! be re-read as many times as the caller likes.

pub mod aggregate;
pub mod ast;
pub mod cache;
pub mod compiler;
pub mod error;
pub mod eval;
pub mod exec;
pub mod helpers;
pub mod parser;
pub mod result;
pub mod rowops;
#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use dlrete_lexicon::{Symbol, Value};
use dlrete_network::{Bindings, Network};
use dlrete_templates::Vocab;

use ast::{AggArg, AggregateCall, OrderKey, Projection, Projections, Query, SelectQuery, SortDir, Term};
use cache::QueryCache;
use compiler::VarTable;
use error::QueryError;
use exec::exec_block;
use result::QueryResult;

/// Zero means "run against the live network, no deadline"; anything
/// above runs against a wall-clock cutoff checked between query stages —
/// `Network`/`FactStore` don't implement `Clone`, so a true point-in-time
/// snapshot would mean cloning the whole alpha/beta node graph, which
/// the single-threaded, exclusively-borrowed `&mut Network` call shape
/// here doesn't need: nothing else can mutate the network while this
/// call holds it, so a deadline check is the correct, much cheaper,
/// reading of "bound how long a query may run".
pub fn query(net: &mut Network, vocab: &Vocab, text: &str, timeout_ms: u64) -> Result<QueryResult, QueryError> {
    let mut cache = QueryCache::new();
    query_cached(net, vocab, text, timeout_ms, &mut cache)
}

pub fn query_cached(
    net: &mut Network,
    vocab: &Vocab,
    text: &str,
    timeout_ms: u64,
    cache: &mut QueryCache,
) -> Result<QueryResult, QueryError> {
    let deadline = (timeout_ms > 0).then(|| Instant::now() + Duration::from_millis(timeout_ms));
    let parsed = match cache.get_parsed(text) {
        Some(q) => q.clone(),
        None => {
            let q = parser::parse(text)?;
            cache.insert_parsed(text.to_string(), q.clone());
            q
        }
    };
    match parsed {
        Query::Select(select) => exec_select(net, vocab, &select, cache, deadline),
        Query::Describe(terms) => exec_describe(net, vocab, &terms),
    }
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    matches!(deadline, Some(d) if Instant::now() > d)
}

fn column_label(symbols: &dlrete_lexicon::SymbolTable, p: &Projection) -> String {
    match p {
        Projection::Var(name) => name.clone(),
        Projection::Aggregate { call, alias } => alias.clone().unwrap_or_else(|| agg_label(symbols, call)),
    }
}

fn agg_label(_symbols: &dlrete_lexicon::SymbolTable, call: &AggregateCall) -> String {
    let fname = match call.func {
        ast::AggFn::Count => "count",
        ast::AggFn::Sum => "sum",
        ast::AggFn::Avg => "avg",
        ast::AggFn::Min => "min",
        ast::AggFn::Max => "max",
        ast::AggFn::GroupConcat => "group_concat",
    };
    let arg = match &call.arg {
        AggArg::Star => "*".to_string(),
        AggArg::Var(v) => v.clone(),
    };
    format!("{fname}({arg})")
}

fn exec_select(
    net: &mut Network,
    vocab: &Vocab,
    q: &SelectQuery,
    cache: &mut QueryCache,
    deadline: Option<Instant>,
) -> Result<QueryResult, QueryError> {
    let symbols = net.symbols().clone();
    let mut vars = VarTable::new(&symbols);
    let rows = exec_block(net, vocab, &mut vars, cache, &q.pattern, "select")?;
    let mut truncated = deadline_passed(deadline);

    let group_syms: Vec<Symbol> = q.group_by.iter().map(|n| vars.intern(n)).collect();
    let has_aggregate_projection = matches!(
        &q.projections,
        Some(Projections::List(list)) if list.iter().any(|p| matches!(p, Projection::Aggregate { .. }))
    );
    let aggregating = !group_syms.is_empty() || has_aggregate_projection;

    let alias_map: std::collections::HashMap<String, AggregateCall> = match &q.projections {
        Some(Projections::List(list)) => list
            .iter()
            .filter_map(|p| match p {
                Projection::Aggregate { call, alias: Some(a) } => Some((a.clone(), call.clone())),
                _ => None,
            })
            .collect(),
        _ => std::collections::HashMap::new(),
    };

    let groups: Vec<Vec<Bindings>> = if aggregating {
        aggregate::partition(rows, &group_syms)
    } else {
        rows.into_iter().map(|r| vec![r]).collect()
    };

    let mut kept: Vec<Vec<Bindings>> = Vec::with_capacity(groups.len());
    for g in groups {
        if deadline_passed(deadline) {
            truncated = true;
            break;
        }
        if let Some(having) = &q.having {
            let having = aggregate::resolve_aliases(having, &alias_map);
            let rep = g.first().cloned().unwrap_or_default();
            let mut rep_env = rep;
            let rewritten = aggregate::substitute_aggregates(&symbols, &mut vars, &having, &g, &mut rep_env);
            let cexpr = eval::compile_expr(&symbols, &rewritten);
            if !cexpr.eval_or_false(&symbols, &rep_env) {
                continue;
            }
        }
        kept.push(g);
    }

    // Resolve the projection list once Star has been expanded against
    // whatever variables actually turned up, so the schema is stable
    // even for a query that matches nothing.
    let projections: Vec<Projection> = match &q.projections {
        Some(Projections::List(list)) => list.clone(),
        _ => {
            let mut seen = Vec::new();
            for g in &kept {
                if let Some(row) = g.first() {
                    for k in row.keys() {
                        if let Some(name) = symbols.try_name(*k) {
                            if !seen.contains(&name.to_string()) {
                                seen.push(name.to_string());
                            }
                        }
                    }
                }
            }
            seen.into_iter().map(Projection::Var).collect()
        }
    };
    let columns: Vec<String> = projections.iter().map(|p| column_label(&symbols, p)).collect();

    let mut scored: Vec<(Vec<Value>, Vec<(SortDir, Option<Value>)>)> = Vec::with_capacity(kept.len());
    for g in &kept {
        let rep = g.first().cloned().unwrap_or_default();
        let row: Vec<Value> = projections
            .iter()
            .map(|p| match p {
                Projection::Var(name) => rep.get(&vars.intern(name)).cloned().unwrap_or(Value::Null),
                Projection::Aggregate { call, .. } => aggregate::compute_aggregate(&symbols, &mut vars, call, g),
            })
            .collect();
        let mut order_key = Vec::with_capacity(q.order_by.len());
        for term in &q.order_by {
            let v = match &term.key {
                OrderKey::Var(name) => match alias_map.get(name) {
                    Some(call) => Some(aggregate::compute_aggregate(&symbols, &mut vars, call, g)),
                    None => rep.get(&vars.intern(name)).cloned(),
                },
                OrderKey::Aggregate(call) => Some(aggregate::compute_aggregate(&symbols, &mut vars, call, g)),
            };
            order_key.push((term.dir, v));
        }
        scored.push((row, order_key));
    }

    scored.sort_by(|a, b| {
        for ((dir, av), (_, bv)) in a.1.iter().zip(b.1.iter()) {
            let ord = match (av, bv) {
                (Some(x), Some(y)) => x.partial_compare(y).unwrap_or(std::cmp::Ordering::Equal),
                (None, None) => std::cmp::Ordering::Equal,
                (None, Some(_)) => std::cmp::Ordering::Less,
                (Some(_), None) => std::cmp::Ordering::Greater,
            };
            let ord = if *dir == SortDir::Desc { ord.reverse() } else { ord };
            if ord != std::cmp::Ordering::Equal {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    });

    let mut out_rows: Vec<Vec<Value>> = scored.into_iter().map(|(row, _)| row).collect();

    if q.distinct {
        let mut seen = std::collections::HashSet::new();
        out_rows.retain(|r| seen.insert(r.clone()));
    }

    if let Some(limit) = q.limit {
        out_rows.truncate(limit as usize);
    }

    let result = QueryResult::new(columns, out_rows);
    Ok(if truncated { result.mark_truncated() } else { result })
}

fn exec_describe(net: &Network, vocab: &Vocab, terms: &[Term]) -> Result<QueryResult, QueryError> {
    let symbols = net.symbols().clone();
    let subjects: Vec<Value> = terms.iter().map(|t| compiler::term_literal(&symbols, t)).collect();
    let mut rows = Vec::new();
    for f in net.facts().iter() {
        let ty = f.type_value(vocab.type_key);
        if ty == Some(vocab.role_assertion) {
            if let Some(s) = f.get(vocab.subject) {
                if subjects.contains(s) {
                    if let (Some(role), Some(obj)) = (f.get(vocab.role), f.get(vocab.object)) {
                        rows.push(vec![s.clone(), role.clone(), obj.clone()]);
                    }
                }
            }
        } else if ty == Some(vocab.instance_of) {
            if let Some(ind) = f.get(vocab.individual) {
                if subjects.contains(ind) {
                    if let Some(concept) = f.get(vocab.concept) {
                        rows.push(vec![ind.clone(), Value::Symbol(vocab.type_key), concept.clone()]);
                    }
                }
            }
        }
    }
    Ok(QueryResult::new(vec!["subject".to_string(), "predicate".to_string(), "object".to_string()], rows))
}
