//! Pre-canonicalized query patterns for the handful of lookups the
//! engine facade needs on every call path — skip parsing/compiling and
//! scan the fact store directly, the way `templates::structural`'s own
//! rule bodies look up supporting facts.

use dlrete_facts::FactStore;
use dlrete_lexicon::{Symbol, Value};
use dlrete_templates::Vocab;

use crate::result::QueryResult;

/// Every individual asserted (or inferred) to be an instance of `class`.
pub fn instances_of(facts: &FactStore, vocab: &Vocab, class: Symbol) -> QueryResult {
    let rows: Vec<Vec<Value>> = facts
        .iter()
        .filter(|f| f.type_value(vocab.type_key) == Some(vocab.instance_of))
        .filter(|f| f.get(vocab.concept) == Some(&Value::Symbol(class)))
        .filter_map(|f| f.get(vocab.individual).cloned())
        .map(|v| vec![v])
        .collect();
    QueryResult::new(vec!["individual".to_string()], rows)
}

/// Every object value asserted for `subject`/`property`.
pub fn property_value(facts: &FactStore, vocab: &Vocab, subject: Symbol, property: Symbol) -> QueryResult {
    let rows: Vec<Vec<Value>> = facts
        .iter()
        .filter(|f| f.type_value(vocab.type_key) == Some(vocab.role_assertion))
        .filter(|f| f.get(vocab.subject) == Some(&Value::Symbol(subject)))
        .filter(|f| f.get(vocab.role) == Some(&Value::Symbol(property)))
        .filter_map(|f| f.get(vocab.object).cloned())
        .map(|v| vec![v])
        .collect();
    QueryResult::new(vec!["object".to_string()], rows)
}

/// Every `(subject, object)` pair asserted for `property` — `related`
/// narrowed to one role, i.e. the role-assertion projection `?s ?o`.
pub fn related(facts: &FactStore, vocab: &Vocab, property: Symbol) -> QueryResult {
    all_assertions_of(facts, vocab, property)
}

/// Every individual that is both an instance of `class` and has at least
/// one `property` assertion as subject.
pub fn instances_with_property(facts: &FactStore, vocab: &Vocab, class: Symbol, property: Symbol) -> QueryResult {
    let subjects_with_prop: std::collections::HashSet<Symbol> = facts
        .iter()
        .filter(|f| f.type_value(vocab.type_key) == Some(vocab.role_assertion))
        .filter(|f| f.get(vocab.role) == Some(&Value::Symbol(property)))
        .filter_map(|f| f.get(vocab.subject).and_then(Value::as_symbol))
        .collect();
    let rows: Vec<Vec<Value>> = facts
        .iter()
        .filter(|f| f.type_value(vocab.type_key) == Some(vocab.instance_of))
        .filter(|f| f.get(vocab.concept) == Some(&Value::Symbol(class)))
        .filter_map(|f| f.get(vocab.individual).and_then(Value::as_symbol))
        .filter(|ind| subjects_with_prop.contains(ind))
        .map(|ind| vec![Value::Symbol(ind)])
        .collect();
    QueryResult::new(vec!["individual".to_string()], rows)
}

/// Every `(subject, object)` pair asserted under `property`, regardless
/// of type — the role-assertion fact type's full projection for one role.
pub fn all_assertions_of(facts: &FactStore, vocab: &Vocab, property: Symbol) -> QueryResult {
    let rows: Vec<Vec<Value>> = facts
        .iter()
        .filter(|f| f.type_value(vocab.type_key) == Some(vocab.role_assertion))
        .filter(|f| f.get(vocab.role) == Some(&Value::Symbol(property)))
        .filter_map(|f| Some(vec![f.get(vocab.subject).cloned()?, f.get(vocab.object).cloned()?]))
        .collect();
    QueryResult::new(vec!["subject".to_string(), "object".to_string()], rows)
}
