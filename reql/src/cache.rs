//! Canonical-key cache for the compile-once-read-many query path: caches
//! by a canonical key so repeated queries hit memory directly. Caches two
//! things: the parsed AST, keyed by the raw query
//! text, and each triple block's compiled production id, keyed by a
//! canonical rendering of its triples — so a block that recurs across
//! different queries (e.g. a shared OPTIONAL clause) reuses its
//! production too, not just the top-level one.

use std::collections::HashMap;

use dlrete_network::ProductionId;

use crate::ast::{Query, Triple};

#[derive(Default)]
pub struct QueryCache {
    parsed: HashMap<String, Query>,
    productions: HashMap<String, ProductionId>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_parsed(&self, text: &str) -> Option<&Query> {
        self.parsed.get(text)
    }

    pub fn insert_parsed(&mut self, text: String, query: Query) {
        self.parsed.insert(text, query);
    }

    pub fn triples_key(triples: &[Triple]) -> String {
        format!("{triples:?}")
    }

    pub fn get_production(&self, key: &str) -> Option<ProductionId> {
        self.productions.get(key).copied()
    }

    pub fn insert_production(&mut self, key: String, prod: ProductionId) {
        self.productions.insert(key, prod);
    }

    pub fn len(&self) -> usize {
        self.parsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsed.is_empty()
    }
}
