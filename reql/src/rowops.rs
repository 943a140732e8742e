//! Row-set combinators over already-materialized `Bindings` vectors —
//! the Rust-side half of pattern composition that has no RETE
//! equivalent (OPTIONAL/UNION/MINUS/VALUES), applied after each block's
//! own triples have already been joined inside the network.

use std::collections::HashSet;

use dlrete_lexicon::{Symbol, Value};
use dlrete_network::Bindings;

fn shared_keys_agree(l: &Bindings, r: &Bindings) -> bool {
    l.iter().all(|(k, v)| r.get(k).map(|rv| rv == v).unwrap_or(true))
}

fn merge_rows(l: &Bindings, r: &Bindings) -> Bindings {
    let mut out = l.clone();
    for (k, v) in r {
        out.entry(*k).or_insert_with(|| v.clone());
    }
    out
}

/// Inner natural join: every pair of rows whose shared variables agree,
/// merged into one row. A row with no shared variables against anything
/// on the other side always joins (cross product for disjoint patterns).
pub fn natural_join(left: &[Bindings], right: &[Bindings]) -> Vec<Bindings> {
    let mut out = Vec::new();
    for l in left {
        for r in right {
            if shared_keys_agree(l, r) {
                out.push(merge_rows(l, r));
            }
        }
    }
    out
}

/// Left outer join: every left row extended with every matching right
/// row, or with `right_vars` filled in as unbound (simply absent — the
/// column still appears in the final projection as NULL since Null only
/// actually shows up if some other row binds it) when nothing matches.
pub fn left_outer_join(left: &[Bindings], right: &[Bindings], right_vars: &HashSet<Symbol>) -> Vec<Bindings> {
    let mut out = Vec::new();
    for l in left {
        let matches: Vec<Bindings> = right.iter().filter(|r| shared_keys_agree(l, r)).map(|r| merge_rows(l, r)).collect();
        if matches.is_empty() {
            let mut row = l.clone();
            for v in right_vars {
                row.entry(*v).or_insert(Value::Null);
            }
            out.push(row);
        } else {
            out.extend(matches);
        }
    }
    out
}

/// Anti-join (MINUS): drop a left row if any right row shares at least
/// one variable with it and agrees on every such variable. A right side
/// with no variables in common with `left` removes nothing, matching
/// the common interpretation of disjoint-variable MINUS.
pub fn anti_join(left: &[Bindings], right: &[Bindings]) -> Vec<Bindings> {
    left.iter()
        .filter(|l| {
            !right.iter().any(|r| {
                let shares_a_var = l.keys().any(|k| r.contains_key(k));
                shares_a_var && shared_keys_agree(l, r)
            })
        })
        .cloned()
        .collect()
}

/// `VALUES ?v { a b c }`: restrict existing bindings of `var` to the
/// given set, or — if nothing upstream has bound it yet — expand each
/// row into one copy per value (a cross product with the inline table).
pub fn apply_values(rows: Vec<Bindings>, var: Symbol, values: &[Value]) -> Vec<Bindings> {
    let already_bound = rows.iter().any(|r| r.contains_key(&var));
    if already_bound {
        rows.into_iter().filter(|r| r.get(&var).map(|v| values.contains(v)).unwrap_or(false)).collect()
    } else {
        let mut out = Vec::with_capacity(rows.len() * values.len().max(1));
        for r in &rows {
            for v in values {
                let mut row = r.clone();
                row.insert(var, v.clone());
                out.push(row);
            }
        }
        out
    }
}
