use dlrete_facts::FactRecord;
use dlrete_lexicon::Value;

use crate::{Config, Engine};

fn fact(engine: &Engine, type_name: &str, attrs: &[(&str, Value)]) -> FactRecord {
    let symbols = engine.symbols();
    let mut v = vec![(symbols.intern("type"), Value::Symbol(symbols.intern(type_name)))];
    for (k, val) in attrs {
        v.push((symbols.intern(k), val.clone()));
    }
    FactRecord::new(v)
}

#[test]
fn transitive_subsumption_derives_through_the_engine_facade() {
    let mut engine = Engine::new(Config::default()).unwrap();
    let cat = fact(&engine, "subsumption", &[("sub", Value::Symbol(engine.symbols().intern("Cat"))), ("sup", Value::Symbol(engine.symbols().intern("Mammal")))]);
    let mammal = fact(&engine, "subsumption", &[("sub", Value::Symbol(engine.symbols().intern("Mammal"))), ("sup", Value::Symbol(engine.symbols().intern("Animal")))]);
    let felix = fact(&engine, "instance_of", &[("individual", Value::Symbol(engine.symbols().intern("felix"))), ("concept", Value::Symbol(engine.symbols().intern("Cat")))]);
    engine.add_facts_batch(vec![cat, mammal, felix]).unwrap();

    let class = engine.symbols().intern("Animal");
    let result = engine.instances_of(class);
    assert_eq!(result.num_rows(), 1);
}

#[test]
fn query_by_record_pattern_returns_matching_attributes() {
    let mut engine = Engine::new(Config::default()).unwrap();
    let felix = fact(&engine, "instance_of", &[("individual", Value::Symbol(engine.symbols().intern("felix"))), ("concept", Value::Symbol(engine.symbols().intern("Cat")))]);
    engine.add_fact(felix).unwrap();

    let type_key = engine.symbols().intern("type");
    let instance_of = engine.symbols().intern("instance_of");
    let result = engine.query_by_record_pattern(&[(type_key, Value::Symbol(instance_of))]);
    assert_eq!(result.num_rows(), 1);
}

#[test]
fn progress_callback_fires_around_a_batch() {
    let mut engine = Engine::new(Config::default()).unwrap();
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let seen_cb = seen.clone();
    engine.set_progress_callback(move |processed, total, msg| {
        seen_cb.borrow_mut().push((processed, total, msg.to_string()));
    });
    let felix = fact(&engine, "instance_of", &[("individual", Value::Symbol(engine.symbols().intern("felix"))), ("concept", Value::Symbol(engine.symbols().intern("Cat")))]);
    engine.add_facts_batch(vec![felix]).unwrap();
    assert_eq!(seen.borrow().len(), 2);
    assert_eq!(seen.borrow()[0], (0, 1, "loading".to_string()));
    assert_eq!(seen.borrow()[1], (1, 1, "done".to_string()));
}

#[test]
fn save_and_load_round_trips_through_the_facade() {
    let mut engine = Engine::new(Config::default()).unwrap();
    let felix = fact(&engine, "instance_of", &[("individual", Value::Symbol(engine.symbols().intern("felix"))), ("concept", Value::Symbol(engine.symbols().intern("Cat")))]);
    engine.add_fact(felix).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snap.bin");
    engine.save(&path).unwrap();

    let mut restored = Engine::load(&path, Config::default()).unwrap();
    let class = restored.symbols().intern("Cat");
    assert_eq!(restored.instances_of(class).num_rows(), 1);
    let result = restored.query("SELECT ?x WHERE { ?x a Cat }", 0).unwrap();
    assert_eq!(result.num_rows(), 1);
}

#[test]
fn strict_mode_flags_an_uncaught_inconsistency() {
    let mut engine = Engine::new(Config { strict: true, ..Config::default() }).unwrap();
    assert!(!engine.has_strict_violation());
    let inc = fact(&engine, "inconsistency", &[("violation_type", Value::Str("eq-diff1".into()))]);
    engine.add_fact(inc).unwrap();
    assert!(engine.has_strict_violation());
}
