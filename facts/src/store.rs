use std::collections::HashMap;

use dlrete_lexicon::{Symbol, SymbolTable, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fact::{Fact, FactId, FactRecord, Provenance};

#[derive(Debug, Error)]
pub enum FactError {
    #[error("bad fact: {0}")]
    BadFact(String),
}

/// Per-(attribute, value) index with two invalidation bits:
/// `dirty` forces a full rebuild on next access (set by a removal that
/// touched this key); `delta` is an append-only list of facts inserted
/// since the last rebuild (applied incrementally, no removal can appear in
/// it).
#[derive(Default)]
struct AttrValueIndex {
    built: std::collections::HashSet<FactId>,
    delta: Vec<FactId>,
    dirty: bool,
}

/// Source-location metadata attached to a fact by an ingestion pipeline,
/// keyed by fingerprint so it survives across re-assertion of the same
/// logical fact.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// Typed multi-attribute fact storage keyed by content fingerprint.
///
/// `add`/`remove` are O(1) expected. `lookup_by_pattern` is O(k) in the
/// number of matching facts once its index has been built at least once.
pub struct FactStore {
    symbols: SymbolTable,
    type_key: Symbol,
    next_seq: u64,
    slots: Vec<Option<Fact>>,
    fingerprints: HashMap<u64, FactId>,
    indexes: HashMap<(Symbol, ValueKey), AttrValueIndex>,
    provenance_log: HashMap<u64, SourceLocation>,
    live_count: usize,
}

/// `Value` is not `Hash`-and-`Eq` friendly enough to use directly as a
/// `HashMap` key across floating point kinds in a way we want to rely on —
/// rather than leaning on `Value`'s own manual impls we key the index map
/// on this small enum mirroring them explicitly, which keeps the intent of
/// "index on constant value" visible at the type level.
#[derive(Clone, PartialEq, Eq, Hash)]
enum ValueKey {
    Symbol(u32),
    Int(i64),
    FloatBits(u64),
    Bool(bool),
    Str(String),
    Null,
}

impl From<&Value> for ValueKey {
    fn from(v: &Value) -> Self {
        match v {
            Value::Symbol(s) => ValueKey::Symbol(s.as_u32()),
            Value::Int(i) => ValueKey::Int(*i),
            Value::Float(f) => ValueKey::FloatBits(f.to_bits()),
            Value::Bool(b) => ValueKey::Bool(*b),
            Value::Str(s) => ValueKey::Str(s.clone()),
            Value::Null => ValueKey::Null,
        }
    }
}

impl FactStore {
    pub fn new(symbols: SymbolTable) -> Self {
        let type_key = symbols.intern("type");
        FactStore {
            symbols,
            type_key,
            next_seq: 1,
            slots: Vec::new(),
            fingerprints: HashMap::new(),
            indexes: HashMap::new(),
            provenance_log: HashMap::new(),
            live_count: 0,
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn type_key(&self) -> Symbol {
        self.type_key
    }

    /// Number of live (non-tombstoned) facts.
    pub fn len(&self) -> usize {
        self.live_count
    }

    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    pub fn get(&self, id: FactId) -> Option<&Fact> {
        self.slots.get(id as usize).and_then(|s| s.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    /// Insert `record`. If an identical fact (by fingerprint) already
    /// exists, provenance is merged into the existing fact and
    /// `inserted=false` is returned with the existing id — satisfying the
    /// at-most-once-assertion / deduplication invariants.
    pub fn add(&mut self, record: FactRecord) -> Result<(FactId, bool), FactError> {
        if !record
            .attrs
            .iter()
            .any(|(k, v)| *k == self.type_key && matches!(v, Value::Symbol(_)))
        {
            return Err(FactError::BadFact(
                "fact is missing a symbol-valued `type` attribute".to_string(),
            ));
        }

        let fp = record.fingerprint();
        if let Some(&existing_id) = self.fingerprints.get(&fp) {
            if let Some(slot) = self.slots.get_mut(existing_id as usize).and_then(|s| s.as_mut()) {
                slot.provenance.merge(&record.provenance);
                return Ok((existing_id, false));
            }
            // Tombstoned: fingerprint map entries for removed facts are
            // cleared on removal, so this branch is unreachable in
            // practice; fall through to a fresh insert defensively.
        }

        let id = self.next_seq;
        self.next_seq += 1;

        let fact = Fact {
            id,
            seq: id,
            fingerprint: fp,
            attrs: record.attrs,
            data: record.data,
            provenance: record.provenance,
        };

        for (k, v) in fact.attrs.iter() {
            let key = (*k, ValueKey::from(v));
            if let Some(idx) = self.indexes.get_mut(&key) {
                idx.delta.push(id);
            }
        }

        self.fingerprints.insert(fp, id);
        if id as usize >= self.slots.len() {
            self.slots.resize_with(id as usize + 1, || None);
        }
        self.slots[id as usize] = Some(fact);
        self.live_count += 1;

        Ok((id, true))
    }

    /// Remove a fact by id. A no-op for an unknown or already-removed id.
    /// The sequence number is never reused.
    pub fn remove(&mut self, id: FactId) -> Option<Fact> {
        let slot = self.slots.get_mut(id as usize)?;
        let fact = slot.take()?;
        self.fingerprints.remove(&fact.fingerprint);
        self.live_count -= 1;

        for (k, v) in fact.attrs.iter() {
            let key = (*k, ValueKey::from(v));
            if let Some(idx) = self.indexes.get_mut(&key) {
                idx.dirty = true;
            }
        }

        Some(fact)
    }

    /// All live facts whose attributes match every `(key, value)` pair in
    /// `constants`. Builds or refreshes one attribute-value index per
    /// constant and intersects them, smallest first.
    pub fn lookup_by_pattern(&mut self, constants: &[(Symbol, Value)]) -> Vec<FactId> {
        if constants.is_empty() {
            return self.iter().map(|f| f.id).collect();
        }

        let mut candidate_sets: Vec<std::collections::HashSet<FactId>> =
            Vec::with_capacity(constants.len());
        for (k, v) in constants {
            candidate_sets.push(self.resolve_index(*k, v).clone());
        }
        candidate_sets.sort_by_key(|s| s.len());

        let mut iter = candidate_sets.into_iter();
        let mut acc = match iter.next() {
            Some(s) => s,
            None => return Vec::new(),
        };
        for s in iter {
            acc.retain(|id| s.contains(id));
        }

        let mut out: Vec<FactId> = acc.into_iter().filter(|id| self.get(*id).is_some()).collect();
        out.sort_unstable();
        out
    }

    fn resolve_index(&mut self, key: Symbol, value: &Value) -> &std::collections::HashSet<FactId> {
        let vk = ValueKey::from(value);
        let needs_full_build = !self.indexes.contains_key(&(key, vk.clone()));
        let idx = self.indexes.entry((key, vk)).or_default();

        if needs_full_build {
            idx.built = self
                .slots
                .iter()
                .filter_map(|s| s.as_ref())
                .filter(|f| f.get(key).map(|v| v == value).unwrap_or(false))
                .map(|f| f.id)
                .collect();
            idx.delta.clear();
            idx.dirty = false;
        } else if idx.dirty {
            idx.built = self
                .slots
                .iter()
                .filter_map(|s| s.as_ref())
                .filter(|f| f.get(key).map(|v| v == value).unwrap_or(false))
                .map(|f| f.id)
                .collect();
            idx.delta.clear();
            idx.dirty = false;
        } else if !idx.delta.is_empty() {
            for id in idx.delta.drain(..) {
                idx.built.insert(id);
            }
        }

        &idx.built
    }

    pub fn set_provenance_location(&mut self, fingerprint: u64, loc: SourceLocation) {
        self.provenance_log.insert(fingerprint, loc);
    }

    pub fn lookup_provenance(&self, fingerprint: u64) -> Option<&SourceLocation> {
        self.provenance_log.get(&fingerprint)
    }

    /// Every recorded source-location entry, for snapshot persistence.
    pub fn provenance_entries(&self) -> impl Iterator<Item = (&u64, &SourceLocation)> {
        self.provenance_log.iter()
    }

    /// Merge in a fact already assigned an id and fingerprint — used only
    /// by snapshot restore, which must reproduce ids and sequence numbers
    /// exactly rather than reassigning them.
    pub fn restore_fact(&mut self, fact: Fact) {
        if fact.id as usize >= self.slots.len() {
            self.slots.resize_with(fact.id as usize + 1, || None);
        }
        self.fingerprints.insert(fact.fingerprint, fact.id);
        self.next_seq = self.next_seq.max(fact.id + 1);
        self.slots[fact.id as usize] = Some(fact);
        self.live_count += 1;
    }

    pub fn provenance_for(&self, id: FactId) -> Option<&Provenance> {
        self.get(id).map(|f| &f.provenance)
    }
}
