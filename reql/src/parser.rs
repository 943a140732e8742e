use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest_derive::Parser;

use crate::ast::*;
use crate::error::QueryError;

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct ReqlParser;

pub fn parse(input: &str) -> Result<Query, QueryError> {
    let mut pairs = ReqlParser::parse(Rule::query, input).map_err(|e| QueryError::Syntax(e.to_string()))?;
    let query = pairs.next().expect("query rule always produces one pair");
    let inner = query.into_inner().next().expect("query wraps select_query or describe_query");
    match inner.as_rule() {
        Rule::select_query => Ok(Query::Select(parse_select(inner))),
        Rule::describe_query => Ok(Query::Describe(inner.into_inner().map(parse_term).collect())),
        _ => unreachable!("query only wraps select_query|describe_query"),
    }
}

fn parse_select(pair: Pair<Rule>) -> SelectQuery {
    let mut q = SelectQuery::new();
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::distinct => q.distinct = true,
            Rule::projection_list => q.projections = Some(parse_projection_list(p)),
            Rule::pattern => q.pattern = parse_pattern(p),
            Rule::group_by => q.group_by = p.into_inner().map(|v| var_name(v)).collect(),
            Rule::having => q.having = Some(parse_expr(p.into_inner().next().unwrap())),
            Rule::order_by => q.order_by = p.into_inner().map(parse_order_term).collect(),
            Rule::limit => q.limit = Some(p.into_inner().next().unwrap().as_str().parse().unwrap_or(u64::MAX)),
            _ => {}
        }
    }
    q
}

fn parse_projection_list(pair: Pair<Rule>) -> Projections {
    let text = pair.as_str().trim();
    if text == "*" {
        return Projections::Star;
    }
    Projections::List(pair.into_inner().map(parse_projection).collect())
}

fn parse_projection(pair: Pair<Rule>) -> Projection {
    let mut inner = pair.into_inner();
    let first = inner.next().expect("projection has at least one child");
    match first.as_rule() {
        Rule::var => Projection::Var(var_name(first)),
        Rule::aggregate_call => {
            let call = parse_aggregate_call(first);
            let alias = inner.next().map(|id| id.as_str().to_string());
            Projection::Aggregate { call, alias }
        }
        _ => unreachable!("projection only wraps var|aggregate_call"),
    }
}

fn parse_aggregate_call(pair: Pair<Rule>) -> AggregateCall {
    let mut distinct = false;
    let mut func = AggFn::Count;
    let mut arg = AggArg::Star;
    let mut separator = None;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::distinct => distinct = true,
            Rule::agg_fn => {
                func = match p.as_str().to_ascii_uppercase().as_str() {
                    "COUNT" => AggFn::Count,
                    "SUM" => AggFn::Sum,
                    "AVG" => AggFn::Avg,
                    "MIN" => AggFn::Min,
                    "MAX" => AggFn::Max,
                    _ => AggFn::GroupConcat,
                };
            }
            Rule::agg_arg => {
                arg = if p.as_str().trim() == "*" {
                    AggArg::Star
                } else {
                    AggArg::Var(var_name(p.into_inner().next().unwrap()))
                };
            }
            Rule::separator => {
                let s = p.into_inner().next().unwrap();
                separator = Some(unescape_string(s.into_inner().next().unwrap().as_str()));
            }
            _ => {}
        }
    }
    AggregateCall { func, distinct, arg, separator }
}

fn parse_order_term(pair: Pair<Rule>) -> OrderTerm {
    let mut dir = SortDir::Asc;
    let mut key = None;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::sort_dir => dir = if p.as_str().eq_ignore_ascii_case("desc") { SortDir::Desc } else { SortDir::Asc },
            Rule::var => key = Some(OrderKey::Var(var_name(p))),
            Rule::aggregate_call => key = Some(OrderKey::Aggregate(parse_aggregate_call(p))),
            _ => {}
        }
    }
    OrderTerm { dir, key: key.expect("order_term always has a var or aggregate_call") }
}

fn parse_pattern(pair: Pair<Rule>) -> Vec<PatternElem> {
    pair.into_inner().map(parse_pattern_elem).collect()
}

fn parse_pattern_elem(pair: Pair<Rule>) -> PatternElem {
    let inner = pair.into_inner().next().expect("pattern_elem always wraps one alternative");
    match inner.as_rule() {
        Rule::triple_elem => PatternElem::Triple(parse_triple(inner.into_inner().next().unwrap())),
        Rule::filter_elem => PatternElem::Filter(parse_expr(inner.into_inner().next().unwrap())),
        Rule::optional_elem => PatternElem::Optional(parse_pattern(inner.into_inner().next().unwrap())),
        Rule::union_elem => PatternElem::Union(parse_pattern(inner.into_inner().next().unwrap())),
        Rule::minus_elem => PatternElem::Minus(parse_pattern(inner.into_inner().next().unwrap())),
        Rule::values_elem => {
            let mut it = inner.into_inner();
            let var = var_name(it.next().unwrap());
            let terms = it.map(parse_term).collect();
            PatternElem::Values(var, terms)
        }
        _ => unreachable!("pattern_elem alternatives are exhaustive"),
    }
}

fn parse_triple(pair: Pair<Rule>) -> Triple {
    let mut it = pair.into_inner();
    let subject = parse_term(it.next().unwrap());
    let predicate = parse_predicate(it.next().unwrap());
    let object = parse_term(it.next().unwrap());
    Triple { subject, predicate, object }
}

fn parse_predicate(pair: Pair<Rule>) -> Predicate {
    let inner = pair.into_inner().next().expect("predicate always wraps rdf_type|term");
    match inner.as_rule() {
        Rule::rdf_type => Predicate::RdfType,
        Rule::term => Predicate::Term(parse_term(inner)),
        _ => unreachable!(),
    }
}

fn parse_term(pair: Pair<Rule>) -> Term {
    let inner = pair.into_inner().next().expect("term always wraps a leaf rule");
    match inner.as_rule() {
        Rule::var => Term::Var(var_name(inner)),
        Rule::string => Term::Str(unescape_string(inner.into_inner().next().unwrap().as_str())),
        Rule::float => Term::Float(inner.as_str().parse().unwrap_or(0.0)),
        Rule::int => Term::Int(inner.as_str().parse().unwrap_or(0)),
        Rule::boolean => Term::Bool(inner.as_str().eq_ignore_ascii_case("true")),
        Rule::iri => Term::Iri(inner.as_str().to_string()),
        _ => unreachable!("term leaf rules are exhaustive"),
    }
}

fn var_name(pair: Pair<Rule>) -> String {
    pair.as_str().trim_start_matches('?').to_string()
}

fn unescape_string(s: &str) -> String {
    s.replace("\\\"", "\"").replace("\\n", "\n").replace("\\t", "\t")
}

fn parse_expr(pair: Pair<Rule>) -> Expr {
    parse_or(pair.into_inner().next().expect("expr wraps or_expr"))
}

fn parse_or(pair: Pair<Rule>) -> Expr {
    let mut it = pair.into_inner();
    let mut acc = parse_and(it.next().unwrap());
    for next in it {
        acc = Expr::Or(Box::new(acc), Box::new(parse_and(next)));
    }
    acc
}

fn parse_and(pair: Pair<Rule>) -> Expr {
    let mut it = pair.into_inner();
    let mut acc = parse_not(it.next().unwrap());
    for next in it {
        acc = Expr::And(Box::new(acc), Box::new(parse_not(next)));
    }
    acc
}

fn parse_not(pair: Pair<Rule>) -> Expr {
    // `not_expr = { "!" ~ not_expr | atom_expr }`: the literal "!" token
    // isn't captured as its own pair, so a nested `not_expr` child means a
    // negation was present; a lone `atom_expr` child means it wasn't.
    let inner = pair.into_inner().next().expect("not_expr always has a child");
    match inner.as_rule() {
        Rule::not_expr => Expr::Not(Box::new(parse_not(inner))),
        Rule::atom_expr => parse_atom(inner),
        _ => unreachable!(),
    }
}

fn parse_atom(pair: Pair<Rule>) -> Expr {
    let inner = pair.into_inner().next().expect("atom_expr always wraps one alternative");
    match inner.as_rule() {
        Rule::builtin_call => parse_builtin(inner),
        Rule::compare_expr => parse_compare(inner),
        Rule::expr => parse_expr(inner),
        _ => unreachable!(),
    }
}

fn parse_builtin(pair: Pair<Rule>) -> Expr {
    let mut it = pair.into_inner();
    let func = match it.next().unwrap().as_str().to_ascii_uppercase().as_str() {
        "CONTAINS" => BuiltinFn::Contains,
        "STRSTARTS" => BuiltinFn::StrStarts,
        "STRENDS" => BuiltinFn::StrEnds,
        "REGEX" => BuiltinFn::Regex,
        "STR" => BuiltinFn::Str,
        _ => BuiltinFn::Bound,
    };
    let args = it.map(parse_value).collect();
    Expr::Builtin(func, args)
}

fn parse_compare(pair: Pair<Rule>) -> Expr {
    let mut it = pair.into_inner();
    let lhs = parse_value(it.next().unwrap());
    match (it.next(), it.next()) {
        (Some(op), Some(rhs)) => {
            let op = match op.as_str() {
                "=" => CmpOp::Eq,
                "!=" => CmpOp::Ne,
                "<=" => CmpOp::Le,
                ">=" => CmpOp::Ge,
                "<" => CmpOp::Lt,
                _ => CmpOp::Gt,
            };
            Expr::Compare(Box::new(lhs), op, Box::new(parse_value(rhs)))
        }
        _ => lhs,
    }
}

fn parse_value(pair: Pair<Rule>) -> Expr {
    // `value = { arith }`, `arith = { term_value ~ (arith_op ~ term_value)* }`.
    let arith = pair.into_inner().next().expect("value wraps arith");
    let mut it = arith.into_inner();
    let mut acc = parse_term_value(it.next().unwrap());
    while let (Some(op), Some(rhs)) = (it.next(), it.next()) {
        let op = match op.as_str() {
            "+" => ArithOp::Add,
            "-" => ArithOp::Sub,
            "*" => ArithOp::Mul,
            _ => ArithOp::Div,
        };
        acc = Expr::Arith(Box::new(acc), op, Box::new(parse_term_value(rhs)));
    }
    acc
}

fn parse_term_value(pair: Pair<Rule>) -> Expr {
    let inner = pair.into_inner().next().expect("term_value wraps aggregate_call|term");
    match inner.as_rule() {
        Rule::aggregate_call => Expr::Aggregate(parse_aggregate_call(inner)),
        Rule::term => Expr::Term(parse_term(inner)),
        _ => unreachable!(),
    }
}
