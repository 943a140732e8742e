//! Typed multi-attribute fact storage keyed by content fingerprint.

mod fact;
mod fingerprint;
mod store;

pub use fact::{Fact, FactId, FactRecord, Provenance, StructuredField};
pub use fingerprint::fingerprint;
pub use store::{FactError, FactStore, SourceLocation};

#[cfg(test)]
mod tests {
    use super::*;
    use dlrete_lexicon::{SymbolTable, Value};

    fn mk(symbols: &SymbolTable, type_name: &str, attrs: &[(&str, Value)]) -> FactRecord {
        let mut v = vec![(symbols.intern("type"), Value::Symbol(symbols.intern(type_name)))];
        for (k, val) in attrs {
            v.push((symbols.intern(k), val.clone()));
        }
        FactRecord::new(v)
    }

    #[test]
    fn dedup_on_add() {
        let symbols = SymbolTable::new();
        let mut store = FactStore::new(symbols.clone());
        let r1 = mk(&symbols, "role_assertion", &[("subject", Value::Str("A".into()))]);
        let r2 = mk(&symbols, "role_assertion", &[("subject", Value::Str("A".into()))]);
        let (id1, ins1) = store.add(r1).unwrap();
        let (id2, ins2) = store.add(r2).unwrap();
        assert_eq!(id1, id2);
        assert!(ins1);
        assert!(!ins2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn seq_never_reused_after_remove() {
        let symbols = SymbolTable::new();
        let mut store = FactStore::new(symbols.clone());
        let r1 = mk(&symbols, "x", &[]);
        let (id1, _) = store.add(r1).unwrap();
        store.remove(id1);
        let r2 = mk(&symbols, "y", &[]);
        let (id2, _) = store.add(r2).unwrap();
        assert!(id2 > id1);
    }

    #[test]
    fn bad_fact_without_type_rejected() {
        let symbols = SymbolTable::new();
        let mut store = FactStore::new(symbols.clone());
        let r = FactRecord::new(vec![(symbols.intern("subject"), Value::Str("A".into()))]);
        assert!(store.add(r).is_err());
    }

    #[test]
    fn lookup_by_pattern_finds_matches_and_respects_removal() {
        let symbols = SymbolTable::new();
        let mut store = FactStore::new(symbols.clone());
        let role = symbols.intern("role");
        let (id1, _) = store
            .add(mk(&symbols, "role_assertion", &[("role", Value::Symbol(role))]))
            .unwrap();
        let _ = store
            .add(mk(&symbols, "role_assertion", &[("role", Value::Str("other".into()))]))
            .unwrap();

        let hits = store.lookup_by_pattern(&[(symbols.intern("role"), Value::Symbol(role))]);
        assert_eq!(hits, vec![id1]);

        store.remove(id1);
        let hits = store.lookup_by_pattern(&[(symbols.intern("role"), Value::Symbol(role))]);
        assert!(hits.is_empty());
    }

    #[test]
    fn provenance_merges_asserted_dominates() {
        let symbols = SymbolTable::new();
        let mut store = FactStore::new(symbols.clone());
        let rule = symbols.intern("cax-sco");
        let r1 = mk(&symbols, "instance_of", &[("individual", Value::Str("A".into()))])
            .inferred_by(rule);
        let (id, _) = store.add(r1).unwrap();
        assert!(!store.get(id).unwrap().provenance.asserted);

        let r2 = mk(&symbols, "instance_of", &[("individual", Value::Str("A".into()))]);
        store.add(r2).unwrap();
        assert!(store.get(id).unwrap().provenance.asserted);
        assert!(store.get(id).unwrap().provenance.is_inferred());
    }
}
