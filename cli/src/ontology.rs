//! A minimal `.dl`-style ontology text format, just expressive enough to
//! demonstrate [`dlrete_engine::Engine::add_facts_batch`] from a file:
//! one fact per line, e.g.
//!
//! ```text
//! subsumption Cat Mammal
//! instance_of felix Cat
//! role_assertion felix chases tom
//! ```
//!
//! Ingestion is explicitly out of scope as a feature (source-ingestion
//! pipelines are a Non-goal); this exists only to give the CLI and its
//! tests *some* concrete surface syntax.

use dlrete_facts::FactRecord;
use dlrete_lexicon::{SymbolTable, Value};
use logos::Logos;

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t]+")]
#[logos(skip r"#[^\n]*")]
enum Token<'s> {
    #[token("\n")]
    Newline,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident(&'s str),

    #[regex(r#""[^"]*""#)]
    StringLit(&'s str),
}

/// One line's worth of recognised fact types. Anything else is a parse
/// error the caller gets back alongside whatever did parse.
const FACT_SHAPES: &[(&str, &[&str])] = &[
    ("instance_of", &["individual", "concept"]),
    ("subsumption", &["sub", "sup"]),
    ("role_assertion", &["subject", "role", "object"]),
    ("sub_property", &["sub", "sup"]),
    ("same_as", &["ind1", "ind2"]),
    ("symmetric", &["property"]),
    ("transitive", &["property"]),
    ("functional", &["property"]),
    ("inverse_functional", &["property"]),
    ("domain", &["property", "concept"]),
    ("range", &["property", "concept"]),
];

/// Parse `text` into facts, reporting `(line_number, message)` for every
/// line that didn't match a recognised fact shape. A line's own failure
/// never stops the rest of the file from loading.
pub fn load_facts(symbols: &SymbolTable, text: &str) -> (Vec<FactRecord>, Vec<(usize, String)>) {
    let mut records = Vec::new();
    let mut errors = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_line(symbols, line) {
            Ok(record) => records.push(record),
            Err(message) => errors.push((lineno + 1, message)),
        }
    }
    (records, errors)
}

fn parse_line(symbols: &SymbolTable, line: &str) -> Result<FactRecord, String> {
    let mut lexer = Token::lexer(line);
    let mut words = Vec::new();
    while let Some(tok) = lexer.next() {
        match tok {
            Ok(Token::Ident(s)) => words.push(s.to_string()),
            Ok(Token::StringLit(s)) => words.push(s.trim_matches('"').to_string()),
            Ok(Token::Newline) => {}
            Err(_) => return Err(format!("unrecognised token at byte {}", lexer.span().start)),
        }
    }
    let Some((type_name, fields)) = words.split_first() else {
        return Err("empty line".to_string());
    };
    let Some((_, attr_names)) = FACT_SHAPES.iter().find(|(name, _)| *name == type_name.as_str()) else {
        return Err(format!("unknown fact type `{type_name}`"));
    };
    if fields.len() != attr_names.len() {
        return Err(format!(
            "`{type_name}` expects {} field(s), got {}",
            attr_names.len(),
            fields.len()
        ));
    }

    let mut attrs = vec![(symbols.intern("type"), Value::Symbol(symbols.intern(type_name)))];
    for (name, value) in attr_names.iter().zip(fields) {
        attrs.push((symbols.intern(name), Value::Symbol(symbols.intern(value))));
    }
    Ok(FactRecord::new(attrs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_recognised_lines_and_reports_bad_ones() {
        let symbols = SymbolTable::new();
        let text = "subsumption Cat Mammal\ninstance_of felix Cat\nbogus line here\n";
        let (records, errors) = load_facts(&symbols, text);
        assert_eq!(records.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, 3);
    }

    #[test]
    fn blank_lines_and_comments_are_skipped() {
        let symbols = SymbolTable::new();
        let text = "# a comment\n\nsubsumption Cat Mammal\n";
        let (records, errors) = load_facts(&symbols, text);
        assert_eq!(records.len(), 1);
        assert!(errors.is_empty());
    }
}
