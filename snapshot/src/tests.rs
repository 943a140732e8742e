use dlrete_lexicon::{SymbolTable, Value};
use dlrete_network::Network;
use dlrete_templates::install_owl_rl;

use crate::{load, save};

fn fact(symbols: &SymbolTable, type_name: &str, attrs: &[(&str, Value)]) -> dlrete_facts::FactRecord {
    let mut v = vec![(symbols.intern("type"), Value::Symbol(symbols.intern(type_name)))];
    for (k, val) in attrs {
        v.push((symbols.intern(k), val.clone()));
    }
    dlrete_facts::FactRecord::new(v)
}

fn populated_network() -> Network {
    let symbols = SymbolTable::new();
    let mut net = Network::new(symbols.clone());
    install_owl_rl(&mut net).unwrap();
    net.add_fact(fact(&symbols, "instance_of", &[("individual", Value::Symbol(symbols.intern("felix"))), ("concept", Value::Symbol(symbols.intern("Cat")))]))
        .unwrap();
    net.add_fact(fact(&symbols, "instance_of", &[("individual", Value::Symbol(symbols.intern("rex"))), ("concept", Value::Symbol(symbols.intern("Dog")))]))
        .unwrap();
    net.add_fact(fact(
        &symbols,
        "role_assertion",
        &[
            ("subject", Value::Symbol(symbols.intern("felix"))),
            ("role", Value::Symbol(symbols.intern("chases"))),
            ("object", Value::Symbol(symbols.intern("tom"))),
        ],
    ))
    .unwrap();
    net
}

#[test]
fn round_trip_preserves_fact_set() {
    let net = populated_network();
    let before: std::collections::BTreeSet<u64> = net.facts().iter().map(|f| f.fingerprint).collect();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snap.bin");
    save(&net, &path).unwrap();

    let mut restored = load(&path).unwrap();
    let after: std::collections::BTreeSet<u64> = restored.facts().iter().map(|f| f.fingerprint).collect();
    assert_eq!(before, after);

    dlrete_templates::install_owl_rl(&mut restored).unwrap();
    assert!(restored.facts().len() >= net.facts().len());
}

#[test]
fn save_then_load_then_save_is_stable() {
    let net = populated_network();
    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("a.bin");
    let path_b = dir.path().join("b.bin");

    save(&net, &path_a).unwrap();
    let restored = load(&path_a).unwrap();
    save(&restored, &path_b).unwrap();

    let again = load(&path_b).unwrap();
    let a: std::collections::BTreeSet<u64> = restored.facts().iter().map(|f| f.fingerprint).collect();
    let b: std::collections::BTreeSet<u64> = again.facts().iter().map(|f| f.fingerprint).collect();
    assert_eq!(a, b);
}

#[test]
fn optional_query_columns_survive_a_reload() {
    let mut net = populated_network();
    let vocab = dlrete_templates::Vocab::new(net.symbols());
    let before = dlrete_reql::query(&mut net, &vocab, "SELECT ?x ?y WHERE { ?x a Dog . OPTIONAL { ?x chases ?y } }", 0).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snap.bin");
    save(&net, &path).unwrap();
    let mut restored = load(&path).unwrap();
    let restored_vocab = dlrete_templates::install_owl_rl(&mut restored).unwrap();

    let after = dlrete_reql::query(&mut restored, &restored_vocab, "SELECT ?x ?y WHERE { ?x a Dog . OPTIONAL { ?x chases ?y } }", 0).unwrap();
    assert_eq!(before.column_names(), after.column_names());
    assert_eq!(before.num_rows(), after.num_rows());
}

#[test]
fn provenance_location_round_trips() {
    let mut net = populated_network();
    let fp = net.facts().iter().next().unwrap().fingerprint;
    crate::tag_provenance(&mut net, fp, dlrete_facts::SourceLocation { file: "onto.ttl".to_string(), line: 3, column: 1 });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snap.bin");
    save(&net, &path).unwrap();
    let restored = load(&path).unwrap();

    let loc = restored.facts().lookup_provenance(fp).unwrap();
    assert_eq!(loc.file, "onto.ttl");
    assert_eq!(loc.line, 3);
}

#[test]
fn version_mismatch_is_rejected() {
    let net = populated_network();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snap.bin");
    save(&net, &path).unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    // version is the first encoded field, a little-endian u32
    bytes[0..4].copy_from_slice(&0xffffffffu32.to_le_bytes());
    std::fs::write(&path, &bytes).unwrap();

    let err = load(&path).unwrap_err();
    assert!(matches!(err, crate::SnapshotError::VersionMismatch { .. }));
}
