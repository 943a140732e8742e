use dlrete_lexicon::{Symbol, Value};

use crate::binding::Bindings;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    Var(Symbol),
    Const(ConstValue),
}

/// Hashable mirror of `Value` restricted to the subset that can appear in
/// a literal filter operand — floats included, keyed on bit pattern like
/// `Value`'s own `Hash` impl, so join-node sharing keys stay deterministic.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstValue {
    Symbol(Symbol),
    Int(i64),
    FloatBits(u64),
    Bool(bool),
    Str(String),
    Null,
}

impl From<Value> for ConstValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Symbol(s) => ConstValue::Symbol(s),
            Value::Int(i) => ConstValue::Int(i),
            Value::Float(f) => ConstValue::FloatBits(f.to_bits()),
            Value::Bool(b) => ConstValue::Bool(b),
            Value::Str(s) => ConstValue::Str(s),
            Value::Null => ConstValue::Null,
        }
    }
}

impl ConstValue {
    pub fn to_value(&self) -> Value {
        match self {
            ConstValue::Symbol(s) => Value::Symbol(*s),
            ConstValue::Int(i) => Value::Int(*i),
            ConstValue::FloatBits(b) => Value::Float(f64::from_bits(*b)),
            ConstValue::Bool(b) => Value::Bool(*b),
            ConstValue::Str(s) => Value::Str(s.clone()),
            ConstValue::Null => Value::Null,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StrOp {
    Contains,
    StartsWith,
    EndsWith,
}

/// A built-in filter expression evaluated against a join's combined
/// binding environment. Evaluation is three-valued: an operand referring
/// to an unbound variable makes the whole (sub-)expression `None` rather
/// than erroring, matching the MINUS/OPTIONAL scoping rule — a top-level
/// `None` is treated as `false`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FilterExpr {
    True,
    Compare(Operand, CompareOp, Operand),
    StrBuiltin(StrOp, Operand, Operand),
    Arith(Operand, ArithOp, Operand, CompareOp, Operand),
    And(Box<FilterExpr>, Box<FilterExpr>),
    Or(Box<FilterExpr>, Box<FilterExpr>),
    Not(Box<FilterExpr>),
}

fn resolve(op: &Operand, env: &Bindings) -> Option<Value> {
    match op {
        Operand::Var(v) => env.get(v).cloned(),
        Operand::Const(c) => Some(c.to_value()),
    }
}

fn compare(op: CompareOp, l: &Value, r: &Value) -> bool {
    match op {
        CompareOp::Eq => l == r,
        CompareOp::Ne => l != r,
        CompareOp::Lt => matches!(l.partial_compare(r), Some(std::cmp::Ordering::Less)),
        CompareOp::Le => matches!(
            l.partial_compare(r),
            Some(std::cmp::Ordering::Less) | Some(std::cmp::Ordering::Equal)
        ),
        CompareOp::Gt => matches!(l.partial_compare(r), Some(std::cmp::Ordering::Greater)),
        CompareOp::Ge => matches!(
            l.partial_compare(r),
            Some(std::cmp::Ordering::Greater) | Some(std::cmp::Ordering::Equal)
        ),
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

impl FilterExpr {
    pub fn eval(&self, env: &Bindings) -> Option<bool> {
        match self {
            FilterExpr::True => Some(true),
            FilterExpr::Compare(l, op, r) => {
                let lv = resolve(l, env)?;
                let rv = resolve(r, env)?;
                Some(compare(*op, &lv, &rv))
            }
            FilterExpr::StrBuiltin(op, subj, needle) => {
                let s = resolve(subj, env)?;
                let n = resolve(needle, env)?;
                let (s, n) = (s.as_str()?, n.as_str()?);
                Some(match op {
                    StrOp::Contains => s.contains(n),
                    StrOp::StartsWith => s.starts_with(n),
                    StrOp::EndsWith => s.ends_with(n),
                })
            }
            FilterExpr::Arith(l, aop, r, cop, rhs) => {
                let lv = resolve(l, env)?.as_float()?;
                let rv = resolve(r, env)?.as_float()?;
                let computed = arith(*aop, lv, rv)?;
                let rhs_v = resolve(rhs, env)?.as_float()?;
                Some(compare(*cop, &Value::Float(computed), &Value::Float(rhs_v)))
            }
            FilterExpr::And(a, b) => match (a.eval(env), b.eval(env)) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            FilterExpr::Or(a, b) => match (a.eval(env), b.eval(env)) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
            FilterExpr::Not(a) => a.eval(env).map(|b| !b),
        }
    }

    /// Evaluate for use as a gate (MINUS/OPTIONAL/production join filter):
    /// an indeterminate result is treated as `false`, never as an error.
    pub fn eval_or_false(&self, env: &Bindings) -> bool {
        self.eval(env).unwrap_or(false)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JoinTestOp {
    Eq,
    Ne,
}

/// Equality/inequality test between a variable bound on the left side of
/// a join and one bound on the right. Native to the join — a token that
/// fails one is never constructed, so it never reaches a production's
/// action.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JoinTest {
    pub left_var: Symbol,
    pub right_var: Symbol,
    pub op: JoinTestOp,
}

impl JoinTest {
    pub fn eq(left_var: Symbol, right_var: Symbol) -> Self {
        JoinTest {
            left_var,
            right_var,
            op: JoinTestOp::Eq,
        }
    }

    pub fn ne(left_var: Symbol, right_var: Symbol) -> Self {
        JoinTest {
            left_var,
            right_var,
            op: JoinTestOp::Ne,
        }
    }

    pub fn holds(&self, left_env: &Bindings, right_env: &Bindings) -> bool {
        let l = left_env.get(&self.left_var);
        let r = right_env.get(&self.right_var);
        match (l, r) {
            (Some(l), Some(r)) => match self.op {
                JoinTestOp::Eq => l == r,
                JoinTestOp::Ne => l != r,
            },
            // A test referencing a variable absent from either side holds
            // vacuously for Ne (nothing to contradict) and fails for Eq.
            _ => matches!(self.op, JoinTestOp::Ne),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlrete_lexicon::SymbolTable;

    #[test]
    fn and_short_circuits_on_false_even_with_unbound_operand() {
        let symbols = SymbolTable::new();
        let x = symbols.intern("x");
        let env: Bindings = Bindings::new();
        let always_false = FilterExpr::Compare(
            Operand::Const(ConstValue::Int(1)),
            CompareOp::Eq,
            Operand::Const(ConstValue::Int(2)),
        );
        let unbound = FilterExpr::Compare(Operand::Var(x), CompareOp::Eq, Operand::Const(ConstValue::Int(1)));
        let expr = FilterExpr::And(Box::new(always_false), Box::new(unbound));
        assert_eq!(expr.eval(&env), Some(false));
        assert!(!expr.eval_or_false(&env));
    }

    #[test]
    fn unbound_operand_is_indeterminate_not_error() {
        let symbols = SymbolTable::new();
        let x = symbols.intern("x");
        let env: Bindings = Bindings::new();
        let expr = FilterExpr::Compare(Operand::Var(x), CompareOp::Eq, Operand::Const(ConstValue::Int(1)));
        assert_eq!(expr.eval(&env), None);
        assert!(!expr.eval_or_false(&env));
    }
}
