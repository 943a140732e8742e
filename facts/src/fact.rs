use std::collections::BTreeSet;

use dlrete_lexicon::{Symbol, Value};
use serde::{Deserialize, Serialize};

use crate::fingerprint::fingerprint;

/// Identity of a fact within one [`crate::FactStore`]; equal to the
/// sequence number assigned on first insertion.
pub type FactId = u64;

/// Homogeneous list payload for rule bodies that need more than a scalar
/// attribute — SWRL atom lists, property chains, `AllDifferent` member
/// lists, and the like.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum StructuredField {
    Strings(Vec<String>),
    Doubles(Vec<f64>),
}

/// Asserted-by-caller vs. inferred-by-rule tag. Asserted dominates
/// inferred: once a fact has been asserted directly it is reported as
/// asserted even if a rule also derives it, but the set of rules that
/// derived it is still tracked for provenance queries.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provenance {
    pub asserted: bool,
    pub inferred_by: BTreeSet<Symbol>,
}

impl Provenance {
    pub fn asserted() -> Self {
        Provenance {
            asserted: true,
            inferred_by: BTreeSet::new(),
        }
    }

    pub fn inferred(rule: Symbol) -> Self {
        let mut inferred_by = BTreeSet::new();
        inferred_by.insert(rule);
        Provenance {
            asserted: false,
            inferred_by,
        }
    }

    /// Merge another provenance into this one on a deduplicated insert.
    pub fn merge(&mut self, other: &Provenance) {
        self.asserted = self.asserted || other.asserted;
        self.inferred_by.extend(other.inferred_by.iter().copied());
    }

    pub fn is_inferred(&self) -> bool {
        !self.inferred_by.is_empty()
    }
}

/// A typed, ordered attribute map — the unit of working memory. Construct
/// with [`FactRecord`] and hand to [`crate::FactStore::add`]; the store
/// assigns the id, sequence number and fingerprint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fact {
    pub id: FactId,
    pub seq: u64,
    pub fingerprint: u64,
    pub attrs: Vec<(Symbol, Value)>,
    pub data: Vec<(Symbol, StructuredField)>,
    pub provenance: Provenance,
}

impl Fact {
    pub fn get(&self, key: Symbol) -> Option<&Value> {
        self.attrs.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn get_data(&self, key: Symbol) -> Option<&StructuredField> {
        self.data.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn type_value(&self, type_key: Symbol) -> Option<Symbol> {
        self.get(type_key).and_then(Value::as_symbol)
    }
}

/// A fact not yet inserted into a store — the input to `add`.
#[derive(Clone, Debug)]
pub struct FactRecord {
    pub attrs: Vec<(Symbol, Value)>,
    pub data: Vec<(Symbol, StructuredField)>,
    pub provenance: Provenance,
}

impl FactRecord {
    pub fn new(attrs: Vec<(Symbol, Value)>) -> Self {
        FactRecord {
            attrs,
            data: Vec::new(),
            provenance: Provenance::asserted(),
        }
    }

    pub fn inferred_by(mut self, rule: Symbol) -> Self {
        self.provenance = Provenance::inferred(rule);
        self
    }

    pub fn with_data(mut self, key: Symbol, field: StructuredField) -> Self {
        self.data.push((key, field));
        self
    }

    pub(crate) fn fingerprint(&self) -> u64 {
        fingerprint(&self.attrs)
    }
}
