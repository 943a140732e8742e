//! Plain-text rendering of a [`dlrete_reql::result::QueryResult`] for the
//! terminal — the CLI's only consumer of the columnar result shape that
//! isn't itself another Rust crate.

use dlrete_lexicon::SymbolTable;
use dlrete_reql::result::{PyScalar, QueryResult};

pub fn print_result(symbols: &SymbolTable, result: &QueryResult) {
    println!("{}", result.column_names().join("\t"));
    for row in result.to_pylist(symbols) {
        let rendered: Vec<String> = row.iter().map(scalar_to_string).collect();
        println!("{}", rendered.join("\t"));
    }
    println!("({} row(s){})", result.num_rows(), if result.is_truncated() { ", truncated" } else { "" });
}

fn scalar_to_string(s: &PyScalar) -> String {
    match s {
        PyScalar::Str(s) => s.clone(),
        PyScalar::Int(i) => i.to_string(),
        PyScalar::Float(f) => f.to_string(),
        PyScalar::Bool(b) => b.to_string(),
        PyScalar::None => "null".to_string(),
    }
}
