//! Columnar query result: one column per projected variable/aggregate
//! alias, row-major `Bindings` turned into column-major `Value` vectors
//! once ordering/limiting is settled, since that's the shape callers
//! (the engine facade, the CLI table printer) actually want.

use dlrete_lexicon::{SymbolTable, Value};

#[derive(Clone, Debug)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    truncated: bool,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        QueryResult { columns, rows, truncated: false }
    }

    /// An empty result that still carries its schema — a query matching
    /// nothing is not the same as a query with no declared projection.
    pub fn empty(columns: Vec<String>) -> Self {
        QueryResult { columns, rows: Vec::new(), truncated: false }
    }

    /// A query that hit its deadline still returns whatever rows it had
    /// produced so far, with this flag set rather than an error — the
    /// caller asked for a bound on latency, not all-or-nothing semantics.
    pub fn mark_truncated(mut self) -> Self {
        self.truncated = true;
        self
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    pub fn row(&self, idx: usize) -> Option<&[Value]> {
        self.rows.get(idx).map(|r| r.as_slice())
    }

    pub fn slice(&self, start: usize, len: usize) -> QueryResult {
        let end = (start + len).min(self.rows.len());
        let rows = if start >= self.rows.len() { Vec::new() } else { self.rows[start..end].to_vec() };
        QueryResult { columns: self.columns.clone(), rows, truncated: self.truncated }
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// Render each row as a list of Python-friendly scalars (symbols
    /// resolved to their interned string) — the shape an embedding host
    /// language would want back, mirroring the row/column pair a CLI
    /// table or a notebook cell displays.
    pub fn to_pylist(&self, symbols: &SymbolTable) -> Vec<Vec<PyScalar>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|v| PyScalar::from_value(symbols, v)).collect())
            .collect()
    }
}

/// A `Value` rendered to the handful of scalar kinds a foreign runtime
/// can represent without knowing about symbol interning.
#[derive(Clone, Debug, PartialEq)]
pub enum PyScalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

impl PyScalar {
    fn from_value(symbols: &SymbolTable, v: &Value) -> Self {
        match v {
            Value::Symbol(s) => PyScalar::Str(symbols.try_name(*s).map(|n| n.to_string()).unwrap_or_default()),
            Value::Str(s) => PyScalar::Str(s.clone()),
            Value::Int(i) => PyScalar::Int(*i),
            Value::Float(f) => PyScalar::Float(*f),
            Value::Bool(b) => PyScalar::Bool(*b),
            Value::Null => PyScalar::None,
        }
    }
}
