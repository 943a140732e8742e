//! Turns a parsed [`crate::ast::SelectQuery`] pattern into a compiled
//! network production and reads its results back.
//!
//! Results are read from the production's parent beta memory's token list
//! rather than through `Action::RecordQueryMatch`/`take_query_matches`:
//! the latter drains its buffer on every read, which is wrong for a
//! pattern meant to be compiled once and re-read repeatedly from cache —
//! a second read with no new activations in between would come back
//! empty. `BetaMemoryData::tokens()` is a live, non-draining view that
//! already reflects retraction, so it can be re-read at will.

use std::collections::HashMap;

use dlrete_lexicon::{Symbol, SymbolTable, Value};
use dlrete_network::{Action, Bindings, CompareOp, ConditionSpec, FilterExpr, JoinTest, Network, Operand};
use dlrete_templates::Vocab;

use crate::ast::{Predicate, Term, Triple};
use crate::cache::QueryCache;
use crate::eval::{compile_expr, resolve_term, CExpr};
use crate::error::QueryError;

/// A triple pattern plus the synthetic equality checks a repeated
/// variable within it requires, lowered to a single alpha condition.
struct LoweredTriple {
    cond: ConditionSpec,
    /// `(var_a, var_b)` pairs that must agree — from a variable appearing
    /// twice in one triple, e.g. `?x rel ?x`, since `ConditionSpec`'s
    /// binding map is last-write-wins and enforces no such equality on
    /// its own.
    self_eq: Vec<(Symbol, Symbol)>,
}

/// Resolves REQL variable names to `Symbol`s consistently across an
/// entire query, so the same name always maps to the same symbol and
/// `JoinTest::eq` can be synthesized between conditions that share one.
pub struct VarTable<'a> {
    symbols: &'a SymbolTable,
    seen: HashMap<String, Symbol>,
    dup_counter: u32,
}

impl<'a> VarTable<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        VarTable { symbols, seen: HashMap::new(), dup_counter: 0 }
    }

    fn get(&mut self, name: &str) -> Symbol {
        self.intern(name)
    }

    /// Resolve a REQL variable name to the `Symbol` it maps to for the
    /// rest of this query — the same name always returns the same
    /// symbol, so `exec_block` can compute an optional/union branch's
    /// variable set without re-deriving `lower_triple`'s bindings.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(sym) = self.seen.get(name) {
            return *sym;
        }
        let sym = self.symbols.intern(name);
        self.seen.insert(name.to_string(), sym);
        sym
    }

    /// A fresh symbol never used elsewhere in this query, for the
    /// second+ occurrence of a variable repeated within one triple.
    fn fresh_dup(&mut self, base: &str) -> Symbol {
        self.dup_counter += 1;
        self.symbols.intern(&format!("__dup_{base}_{}", self.dup_counter))
    }
}

fn term_value(symbols: &SymbolTable, term: &Term) -> Option<Value> {
    match term {
        Term::Iri(s) => Some(Value::Symbol(symbols.intern(s))),
        Term::Str(s) => Some(Value::Str(s.clone())),
        Term::Int(i) => Some(Value::Int(*i)),
        Term::Float(f) => Some(Value::Float(*f)),
        Term::Bool(b) => Some(Value::Bool(*b)),
        Term::Var(_) => None,
    }
}

/// Bind or constrain one triple slot (subject/role-or-concept/object)
/// against `key`, tracking repeats of the same variable within the
/// triple via `slot_vars`.
fn bind_slot(
    mut cond: ConditionSpec,
    key: Symbol,
    term: &Term,
    vars: &mut VarTable,
    slot_vars: &mut Vec<Symbol>,
    self_eq: &mut Vec<(Symbol, Symbol)>,
) -> ConditionSpec {
    match term {
        Term::Var(name) => {
            let sym = vars.get(name);
            if slot_vars.contains(&sym) {
                let dup = vars.fresh_dup(name);
                self_eq.push((sym, dup));
                cond = cond.bind(key, dup);
            } else {
                slot_vars.push(sym);
                cond = cond.bind(key, sym);
            }
            cond
        }
        other => cond.constant(key, term_value(vars.symbols, other).unwrap_or(Value::Null)),
    }
}

fn lower_triple(vocab: &Vocab, vars: &mut VarTable, triple: &Triple) -> LoweredTriple {
    let mut slot_vars = Vec::new();
    let mut self_eq = Vec::new();
    let cond = match &triple.predicate {
        Predicate::RdfType => {
            let cond = ConditionSpec::for_type(vocab.type_key, vocab.instance_of);
            let cond = bind_slot(cond, vocab.individual, &triple.subject, vars, &mut slot_vars, &mut self_eq);
            bind_slot(cond, vocab.concept, &triple.object, vars, &mut slot_vars, &mut self_eq)
        }
        Predicate::Term(pred_term) => {
            let cond = ConditionSpec::for_type(vocab.type_key, vocab.role_assertion);
            let cond = bind_slot(cond, vocab.subject, &triple.subject, vars, &mut slot_vars, &mut self_eq);
            let cond = bind_slot(cond, vocab.role, pred_term, vars, &mut slot_vars, &mut self_eq);
            bind_slot(cond, vocab.object, &triple.object, vars, &mut slot_vars, &mut self_eq)
        }
    };
    LoweredTriple { cond, self_eq }
}

/// Compile a block of triples (no OPTIONAL/UNION/MINUS/VALUES — those are
/// handled a level up, in `exec`) into a production and run it, returning
/// every resulting binding row.
///
/// `name` only needs to be unique enough to avoid confusing production
/// registry diagnostics; node sharing is keyed on condition/join
/// structure, not on this name.
pub fn run_triples(
    net: &mut Network,
    vocab: &Vocab,
    vars: &mut VarTable,
    name: &str,
    triples: &[Triple],
) -> Result<Vec<Bindings>, QueryError> {
    run_triples_cached(net, vocab, vars, None, name, triples)
}

/// Same as `run_triples`, but if `cache` holds a production already
/// compiled for this exact triple block, skip recompilation entirely and
/// read its parent beta memory's current tokens straight away.
pub fn run_triples_cached(
    net: &mut Network,
    vocab: &Vocab,
    vars: &mut VarTable,
    cache: Option<&mut QueryCache>,
    name: &str,
    triples: &[Triple],
) -> Result<Vec<Bindings>, QueryError> {
    if triples.is_empty() {
        return Ok(vec![Bindings::new()]);
    }
    if let Some(cache) = &cache {
        let key = QueryCache::triples_key(triples);
        if let Some(prod_id) = cache.get_production(&key) {
            let parent = net.productions().get(prod_id).parent;
            return Ok(net.beta().beta(parent).tokens().map(|t| t.env.clone()).collect());
        }
    }
    let symbols = net.symbols().clone();
    let mut conditions = Vec::with_capacity(triples.len());
    let mut joins = Vec::with_capacity(triples.len());
    // Every pattern variable bound by a condition already placed, so a
    // later condition rebinding the same name can be wired with a
    // `JoinTest::eq` against the left accumulated token instead of
    // silently rebinding it unconstrained.
    let mut bound_so_far: HashMap<Symbol, ()> = HashMap::new();

    for triple in triples {
        let lowered = lower_triple(vocab, vars, triple);
        let mut tests = Vec::new();
        for (_key, var) in &lowered.cond.bindings {
            if bound_so_far.contains_key(var) {
                tests.push(JoinTest::eq(*var, *var));
            }
        }
        // A variable repeated within this one triple (e.g. `?x rel ?x`)
        // binds both occurrences on the alpha side alone, so the
        // equality has to be a filter over the merged env rather than a
        // `JoinTest` (which compares an already-bound left token against
        // this step's own right-side bindings).
        let mut filters: Vec<FilterExpr> = lowered
            .self_eq
            .iter()
            .map(|(a, b)| FilterExpr::Compare(Operand::Var(*a), CompareOp::Eq, Operand::Var(*b)))
            .collect();
        if filters.is_empty() {
            filters.push(FilterExpr::True);
        }
        for (_key, var) in &lowered.cond.bindings {
            bound_so_far.insert(*var, ());
        }
        conditions.push(lowered.cond);
        joins.push((tests, filters));
    }

    let prod_name = symbols.intern(name);
    let sink = net.productions().len();
    let action = Action::RecordQueryMatch { sink };
    let prod_id = net.compile_production(prod_name, conditions, joins, action)?;
    if let Some(cache) = cache {
        cache.insert_production(QueryCache::triples_key(triples), prod_id);
    }
    let parent = net.productions().get(prod_id).parent;
    Ok(net.beta().beta(parent).tokens().map(|t| t.env.clone()).collect())
}

/// Evaluate a FILTER expression as a post-join row gate.
pub fn filter_rows(symbols: &SymbolTable, expr: &CExpr, rows: Vec<Bindings>) -> Vec<Bindings> {
    rows.into_iter().filter(|r| expr.eval_or_false(symbols, r)).collect()
}

pub fn compile_filter(symbols: &SymbolTable, expr: &crate::ast::Expr) -> CExpr {
    compile_expr(symbols, expr)
}

pub fn resolve_value(symbols: &SymbolTable, term: &Term) -> CExpr {
    resolve_term(symbols, term)
}

/// Resolve a constant `Term` (never `Var`) to its `Value` — used by
/// `VALUES` to build the literal set a variable is restricted to.
pub fn term_literal(symbols: &SymbolTable, term: &Term) -> Value {
    term_value(symbols, term).unwrap_or(Value::Null)
}
