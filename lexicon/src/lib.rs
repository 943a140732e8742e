//! Process-wide symbol interning and the tagged [`Value`] union.
//!
//! Two APIs, per the data model: [`SymbolTable::intern`] and
//! [`SymbolTable::name`]. Ids start at 1 — 0 is reserved for "none" and is
//! never handed out by the underlying interner.

use std::fmt;
use std::sync::Arc;

use lasso::{Key, Spur, ThreadedRodeo};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// An interned identifier. Two symbols are equal iff they name the same
/// string — comparison never touches the string itself.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Spur);

impl Symbol {
    /// Raw numeric id, stable for the lifetime of the symbol table. Starts
    /// at 1; 0 is reserved.
    pub fn as_u32(self) -> u32 {
        self.0.into_inner().get() as u32
    }

    /// Reconstruct a `Symbol` from a raw id previously returned by
    /// [`Symbol::as_u32`]. Used when deserializing a snapshot alongside its
    /// symbol table.
    pub fn from_u32(id: u32) -> Option<Self> {
        Spur::try_from_usize(id as usize).map(Symbol)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.as_u32())
    }
}

impl Serialize for Symbol {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.as_u32().serialize(s)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let id = u32::deserialize(d)?;
        Symbol::from_u32(id).ok_or_else(|| serde::de::Error::custom("symbol id out of range"))
    }
}

/// Thread-safe string interner. `intern` returns an existing id or
/// allocates a new one; collisions are impossible by construction since the
/// underlying map is keyed by the string itself.
///
/// Cloning a `SymbolTable` is cheap — it shares the same backing store, so
/// multiple network instances can intern into a common vocabulary, which is
/// the one shared process-wide resource.
#[derive(Clone)]
pub struct SymbolTable {
    rodeo: Arc<ThreadedRodeo>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            rodeo: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern `s`, returning its id. Repeated interning of the same string
    /// always returns the same id.
    pub fn intern(&self, s: &str) -> Symbol {
        Symbol(self.rodeo.get_or_intern(s))
    }

    /// Look up the string behind a symbol. Panics if `sym` was not
    /// allocated by this table — symbols are never valid across distinct
    /// `SymbolTable` instances.
    pub fn name(&self, sym: Symbol) -> Arc<str> {
        Arc::from(self.rodeo.resolve(&sym.0))
    }

    /// Non-panicking lookup, used when a symbol may originate from a
    /// different table (e.g. during snapshot restore before ids are
    /// rebound).
    pub fn try_name(&self, sym: Symbol) -> Option<Arc<str>> {
        self.rodeo.try_resolve(&sym.0).map(Arc::from)
    }

    /// Snapshot the full id -> name table, in id order, for persistence.
    pub fn export_all(&self) -> Vec<(u32, String)> {
        let mut out: Vec<(u32, String)> = self
            .rodeo
            .iter()
            .map(|(spur, s)| (Symbol(spur).as_u32(), s.to_string()))
            .collect();
        out.sort_unstable_by_key(|(id, _)| *id);
        out
    }

    /// Rebuild interning state from a snapshot's exported table so that
    /// symbol ids are preserved across save/load. Entries are applied in
    /// ascending id order; lasso hands out ids sequentially so this
    /// reproduces the original assignment exactly as long as no id was
    /// skipped by a prior `remove` (symbols are never removed).
    pub fn restore_all(&self, entries: &[(u32, String)]) {
        for (_, name) in entries {
            self.rodeo.get_or_intern(name);
        }
    }
}

/// A side-table cache of `"well known"` symbols resolved once at network
/// construction, avoiding repeated hashmap lookups on the hot path of fact
/// routing (e.g. the `type` attribute key, `owl:Thing`, `owl:Nothing`).
pub struct WellKnown {
    table: RwLock<std::collections::HashMap<&'static str, Symbol>>,
}

impl WellKnown {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(std::collections::HashMap::new()),
        }
    }

    pub fn get(&self, symbols: &SymbolTable, name: &'static str) -> Symbol {
        if let Some(sym) = self.table.read().get(name) {
            return *sym;
        }
        let sym = symbols.intern(name);
        self.table.write().insert(name, sym);
        sym
    }
}

impl Default for WellKnown {
    fn default() -> Self {
        Self::new()
    }
}

/// A tagged union of the value kinds a fact attribute may hold. Numeric and
/// string literals never equal symbol ids, even if their textual form
/// matches — identity and literal values live in disjoint spaces.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    Symbol(Symbol),
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Null,
}

impl Value {
    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Value::Symbol(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Total-order comparison used by `ORDER BY` and by `<`/`>` built-ins.
    /// Cross-kind comparisons are `None` (incomparable), matching the
    /// "numeric and string literals never equal symbol ids" invariant.
    pub fn partial_compare(&self, other: &Value) -> Option<std::cmp::Ordering> {
        use Value::*;
        match (self, other) {
            (Int(a), Int(b)) => a.partial_cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)),
            (Str(a), Str(b)) => a.partial_cmp(b),
            (Bool(a), Bool(b)) => a.partial_cmp(b),
            (Symbol(a), Symbol(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Symbol(a), Symbol(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Bool(a), Bool(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Null, Null) => true,
            _ => false,
        }
    }
}
impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Symbol(s) => s.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Str(s) => s.hash(state),
            Value::Null => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let t = SymbolTable::new();
        let a = t.intern("knows");
        let b = t.intern("knows");
        assert_eq!(a, b);
        assert_eq!(&*t.name(a), "knows");
    }

    #[test]
    fn ids_start_above_zero() {
        let t = SymbolTable::new();
        let a = t.intern("first");
        assert!(a.as_u32() >= 1);
    }

    #[test]
    fn value_equality_never_crosses_kinds() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Str("1".into()), Value::Int(1));
    }

    #[test]
    fn round_trip_symbol_ids() {
        let t = SymbolTable::new();
        let a = t.intern("alpha");
        let dump = t.export_all();
        let t2 = SymbolTable::new();
        t2.restore_all(&dump);
        let b = t2.intern("alpha");
        assert_eq!(a.as_u32(), b.as_u32());
    }
}
