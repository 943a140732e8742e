//! Executes a parsed pattern block: runs its triples through the
//! network, then folds FILTER/OPTIONAL/UNION/MINUS/VALUES over the
//! resulting rows in Rust, since none of those five have a RETE join
//! equivalent worth building — they're rare enough in practice that
//! re-deriving their row sets per call, rather than caching each nested
//! block separately, is the right trade.

use std::collections::HashSet;

use dlrete_lexicon::Symbol;
use dlrete_network::{Bindings, Network};
use dlrete_templates::Vocab;

use crate::ast::{PatternElem, Term, Triple};
use crate::cache::QueryCache;
use crate::compiler::{compile_filter, run_triples_cached, VarTable};
use crate::error::QueryError;
use crate::rowops::{anti_join, apply_values, left_outer_join, natural_join};

fn triple_term_vars(term: &Term, vars: &mut VarTable, out: &mut HashSet<Symbol>) {
    if let Term::Var(name) = term {
        out.insert(vars.intern(name));
    }
}

/// Every variable a pattern block could bind, used to null-fill an
/// OPTIONAL block's columns when it fails to match.
fn collect_vars(elems: &[PatternElem], vars: &mut VarTable, out: &mut HashSet<Symbol>) {
    for e in elems {
        match e {
            PatternElem::Triple(Triple { subject, predicate, object }) => {
                triple_term_vars(subject, vars, out);
                if let crate::ast::Predicate::Term(t) = predicate {
                    triple_term_vars(t, vars, out);
                }
                triple_term_vars(object, vars, out);
            }
            PatternElem::Optional(sub) | PatternElem::Union(sub) | PatternElem::Minus(sub) => {
                collect_vars(sub, vars, out);
            }
            PatternElem::Values(name, _) => {
                out.insert(vars.intern(name));
            }
            PatternElem::Filter(_) => {}
        }
    }
}

pub fn exec_block(
    net: &mut Network,
    vocab: &Vocab,
    vars: &mut VarTable,
    cache: &mut QueryCache,
    elems: &[PatternElem],
    label: &str,
) -> Result<Vec<Bindings>, QueryError> {
    let mut triples = Vec::new();
    let mut filters = Vec::new();
    let mut optionals = Vec::new();
    let mut unions = Vec::new();
    let mut minuses = Vec::new();
    let mut values = Vec::new();

    for e in elems {
        match e {
            PatternElem::Triple(t) => triples.push(t.clone()),
            PatternElem::Filter(f) => filters.push(f.clone()),
            PatternElem::Optional(sub) => optionals.push(sub.clone()),
            PatternElem::Union(sub) => unions.push(sub.clone()),
            PatternElem::Minus(sub) => minuses.push(sub.clone()),
            PatternElem::Values(name, terms) => values.push((name.clone(), terms.clone())),
        }
    }

    let mut rows = run_triples_cached(net, vocab, vars, Some(cache), label, &triples)?;

    let symbols = net.symbols().clone();
    for f in &filters {
        let cexpr = compile_filter(&symbols, f);
        rows.retain(|r| cexpr.eval_or_false(&symbols, r));
    }

    if !unions.is_empty() {
        let mut merged = Vec::new();
        for (i, sub) in unions.iter().enumerate() {
            let branch_rows = exec_block(net, vocab, vars, cache, sub, &format!("{label}::union{i}"))?;
            merged.extend(natural_join(&rows, &branch_rows));
        }
        rows = merged;
    }

    for (i, sub) in optionals.iter().enumerate() {
        let branch_rows = exec_block(net, vocab, vars, cache, sub, &format!("{label}::opt{i}"))?;
        let mut right_vars = HashSet::new();
        collect_vars(sub, vars, &mut right_vars);
        rows = left_outer_join(&rows, &branch_rows, &right_vars);
    }

    for (i, sub) in minuses.iter().enumerate() {
        let branch_rows = exec_block(net, vocab, vars, cache, sub, &format!("{label}::minus{i}"))?;
        rows = anti_join(&rows, &branch_rows);
    }

    for (name, terms) in &values {
        let var = vars.intern(name);
        let consts: Vec<_> = terms.iter().map(|t| crate::compiler::term_literal(&symbols, t)).collect();
        rows = apply_values(rows, var, &consts);
    }

    Ok(rows)
}
