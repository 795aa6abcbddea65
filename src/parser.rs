use pest::iterators::Pair;
use pest::Parser as PestParser; // <- trait (gives ClauseParser::parse)
use pest_derive::Parser;        // <- derive macro (generates Rule enum + impl)
use thiserror::Error;

use crate::ast::{Clause, Functor, Term};
use crate::bindings::Bindings;

#[derive(Parser)]
#[grammar = "clause.pest"]
struct ClauseParser;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("parse error: {0}")]
    Pest(#[from] pest::error::Error<Rule>),
    #[error("unexpected rule: {0:?}")]
    Unexpected(Rule),
}

/// Parse a whole source text into clauses, in file order.
pub fn parse_program(input: &str) -> Result<Vec<Clause>, ParseError> {
    let mut pairs = ClauseParser::parse(Rule::program, input)?;
    let program = pairs.next().unwrap();
    program
        .into_inner()
        .filter(|p| p.as_rule() == Rule::clause)
        .map(build_clause)
        .collect()
}

/// Parse a single query line. A query is a full clause, so
/// `foo(X) :- bar(X).` is legal and is evaluated body-first.
pub fn parse_query(input: &str) -> Result<Clause, ParseError> {
    let mut pairs = ClauseParser::parse(Rule::query, input)?;
    let query = pairs.next().unwrap();
    let clause = query
        .into_inner()
        .find(|p| p.as_rule() == Rule::clause)
        .unwrap();
    build_clause(clause)
}

fn build_clause(pair: Pair<Rule>) -> Result<Clause, ParseError> {
    let mut vars = Bindings::new();
    let mut it = pair.into_inner();

    // Head first, so head variables lead the declaration order.
    let head = build_functor(it.next().unwrap(), &mut vars)?;
    let body = match it.next() {
        Some(p) if p.as_rule() == Rule::body => build_body(p, &mut vars)?,
        // A fact with no condition is unconditionally true.
        _ => Term::Number("1".into()),
    };

    Ok(Clause { head, body, vars })
}

fn build_body(pair: Pair<Rule>, vars: &mut Bindings) -> Result<Term, ParseError> {
    let mut terms = pair
        .into_inner()
        .map(|p| build_term(p, vars))
        .collect::<Result<Vec<_>, _>>()?;

    // `a, b, c` folds right into and(a, and(b, c)).
    let mut body = terms.pop().unwrap();
    while let Some(term) = terms.pop() {
        body = Term::Compound(Functor::new("and", vec![term, body]));
    }
    Ok(body)
}

fn build_functor(pair: Pair<Rule>, vars: &mut Bindings) -> Result<Functor, ParseError> {
    let mut it = pair.into_inner();
    let name = it.next().unwrap().as_str().to_string();
    let args = it
        .map(|p| build_term(p, vars))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Functor { name, args })
}

fn build_term(pair: Pair<Rule>, vars: &mut Bindings) -> Result<Term, ParseError> {
    match pair.as_rule() {
        Rule::term => build_term(pair.into_inner().next().unwrap(), vars),
        Rule::functor => Ok(Term::Compound(build_functor(pair, vars)?)),
        Rule::wildcard => Ok(Term::Wildcard),
        Rule::variable => {
            let name = pair.as_str().to_string();
            vars.declare(&name);
            Ok(Term::Var(name))
        }
        Rule::number => Ok(Term::Number(pair.as_str().to_string())),
        Rule::atom => Ok(Term::Atom(pair.as_str().to_string())),
        r => Err(ParseError::Unexpected(r)),
    }
}
