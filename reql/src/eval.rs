//! A small scalar-expression evaluator for `FILTER`/`HAVING`, independent of
//! `dlrete_network::FilterExpr` — REGEX and STR() have no equivalent there,
//! so every REQL expression is evaluated here, in Rust, over the bindings a
//! compiled pattern already produced, rather than pushed into the join.

use dlrete_lexicon::{Symbol, SymbolTable, Value};
use dlrete_network::Bindings;
use regex::Regex;

use crate::ast::{ArithOp, BuiltinFn, CmpOp, Expr, Term};

/// `ast::Term`/`ast::Expr` with every constant resolved to a `Value` and
/// every variable resolved to its `Symbol` — built once per query, reused
/// across every row.
#[derive(Clone, Debug)]
pub enum CExpr {
    Const(Value),
    Var(Symbol),
    Arith(Box<CExpr>, ArithOp, Box<CExpr>),
    Compare(Box<CExpr>, CmpOp, Box<CExpr>),
    Builtin(BuiltinFn, Vec<CExpr>),
    And(Box<CExpr>, Box<CExpr>),
    Or(Box<CExpr>, Box<CExpr>),
    Not(Box<CExpr>),
}

pub fn resolve_term(symbols: &SymbolTable, term: &Term) -> CExpr {
    match term {
        Term::Var(name) => CExpr::Var(symbols.intern(name)),
        Term::Iri(s) => CExpr::Const(Value::Symbol(symbols.intern(s))),
        Term::Str(s) => CExpr::Const(Value::Str(s.clone())),
        Term::Int(i) => CExpr::Const(Value::Int(*i)),
        Term::Float(f) => CExpr::Const(Value::Float(*f)),
        Term::Bool(b) => CExpr::Const(Value::Bool(*b)),
    }
}

/// Compile a filter/having expression. Aggregate sub-expressions are
/// resolved to their already-computed per-group value by the caller before
/// this is invoked — see `compiler::substitute_aggregates`.
pub fn compile_expr(symbols: &SymbolTable, expr: &Expr) -> CExpr {
    match expr {
        Expr::Term(t) => resolve_term(symbols, t),
        Expr::Arith(l, op, r) => CExpr::Arith(Box::new(compile_expr(symbols, l)), *op, Box::new(compile_expr(symbols, r))),
        Expr::Compare(l, op, r) => CExpr::Compare(Box::new(compile_expr(symbols, l)), *op, Box::new(compile_expr(symbols, r))),
        Expr::Builtin(f, args) => CExpr::Builtin(*f, args.iter().map(|a| compile_expr(symbols, a)).collect()),
        Expr::And(l, r) => CExpr::And(Box::new(compile_expr(symbols, l)), Box::new(compile_expr(symbols, r))),
        Expr::Or(l, r) => CExpr::Or(Box::new(compile_expr(symbols, l)), Box::new(compile_expr(symbols, r))),
        Expr::Not(e) => CExpr::Not(Box::new(compile_expr(symbols, e))),
        // An un-substituted aggregate reaching here has no group context
        // (e.g. used in a plain FILTER rather than HAVING); treat as unbound.
        Expr::Aggregate(_) => CExpr::Const(Value::Null),
    }
}

fn arith(op: ArithOp, l: f64, r: f64) -> Option<f64> {
    match op {
        ArithOp::Add => Some(l + r),
        ArithOp::Sub => Some(l - r),
        ArithOp::Mul => Some(l * r),
        ArithOp::Div => {
            if r == 0.0 {
                None
            } else {
                Some(l / r)
            }
        }
    }
}

fn compare(op: CmpOp, l: &Value, r: &Value) -> bool {
    match op {
        CmpOp::Eq => l == r,
        CmpOp::Ne => l != r,
        CmpOp::Lt => matches!(l.partial_compare(r), Some(std::cmp::Ordering::Less)),
        CmpOp::Le => matches!(l.partial_compare(r), Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)),
        CmpOp::Gt => matches!(l.partial_compare(r), Some(std::cmp::Ordering::Greater)),
        CmpOp::Ge => matches!(l.partial_compare(r), Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)),
    }
}

/// Stringify a value the way `STR()` does: symbols resolve through the
/// table, everything else uses its natural textual form.
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

impl CExpr {
    /// Three-valued evaluation: `None` means indeterminate (an unbound
    /// variable was referenced), never an error — matching the OPTIONAL/
    /// MINUS scoping rule.
    pub fn eval(&self, symbols: &SymbolTable, env: &Bindings) -> Option<Value> {
        match self {
            CExpr::Const(v) => Some(v.clone()),
            CExpr::Var(s) => env.get(s).cloned(),
            CExpr::Arith(l, op, r) => {
                let lv = l.eval(symbols, env)?.as_float()?;
                let rv = r.eval(symbols, env)?.as_float()?;
                arith(*op, lv, rv).map(Value::Float)
            }
            CExpr::Compare(l, op, r) => {
                let lv = l.eval(symbols, env)?;
                let rv = r.eval(symbols, env)?;
                Some(Value::Bool(compare(*op, &lv, &rv)))
            }
            CExpr::Builtin(f, args) => eval_builtin(symbols, env, *f, args),
            CExpr::And(l, r) => match (l.eval_bool(symbols, env), r.eval_bool(symbols, env)) {
                (Some(false), _) | (_, Some(false)) => Some(Value::Bool(false)),
                (Some(true), Some(true)) => Some(Value::Bool(true)),
                _ => None,
            },
            CExpr::Or(l, r) => match (l.eval_bool(symbols, env), r.eval_bool(symbols, env)) {
                (Some(true), _) | (_, Some(true)) => Some(Value::Bool(true)),
                (Some(false), Some(false)) => Some(Value::Bool(false)),
                _ => None,
            },
            CExpr::Not(e) => e.eval_bool(symbols, env).map(|b| Value::Bool(!b)),
        }
    }

    fn eval_bool(&self, symbols: &SymbolTable, env: &Bindings) -> Option<bool> {
        match self.eval(symbols, env)? {
            Value::Bool(b) => Some(b),
            other => Some(!matches!(other, Value::Null)),
        }
    }

    /// Evaluate as a gate: an indeterminate result is `false`, never an
    /// error, matching `dlrete_network::FilterExpr::eval_or_false`.
    pub fn eval_or_false(&self, symbols: &SymbolTable, env: &Bindings) -> bool {
        self.eval_bool(symbols, env).unwrap_or(false)
    }
}

fn eval_builtin(symbols: &SymbolTable, env: &Bindings, f: BuiltinFn, args: &[CExpr]) -> Option<Value> {
    match f {
        BuiltinFn::Str => {
            let v = args.first()?.eval(symbols, env)?;
            Some(Value::Str(stringify(symbols, &v)))
        }
        BuiltinFn::Bound => {
            let CExpr::Var(s) = args.first()? else { return Some(Value::Bool(true)) };
            Some(Value::Bool(env.contains_key(s)))
        }
        BuiltinFn::Contains | BuiltinFn::StrStarts | BuiltinFn::StrEnds => {
            let subject = stringify(symbols, &args.first()?.eval(symbols, env)?);
            let needle = stringify(symbols, &args.get(1)?.eval(symbols, env)?);
            let hit = match f {
                BuiltinFn::Contains => subject.contains(&needle),
                BuiltinFn::StrStarts => subject.starts_with(&needle),
                _ => subject.ends_with(&needle),
            };
            Some(Value::Bool(hit))
        }
        BuiltinFn::Regex => {
            let subject = stringify(symbols, &args.first()?.eval(symbols, env)?);
            let pattern = stringify(symbols, &args.get(1)?.eval(symbols, env)?);
            let re = Regex::new(&pattern).ok()?;
            Some(Value::Bool(re.is_match(&subject)))
        }
    }
}
