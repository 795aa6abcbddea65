use thiserror::Error;
use tracing::debug;

use crate::ast::Clause;
use crate::builtins::Builtin;
use crate::parser::{parse_program, ParseError};

/// Attempt to store a clause whose head key is a built-in.
#[derive(Debug, Error)]
#[error("cannot redefine built-in predicate `{0}`")]
pub struct ReservedPredicate(pub String);

/// Failure while consulting a source text.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Reserved(#[from] ReservedPredicate),
}

/// Append-only, insertion-ordered store of clauses. Built once before any
/// query runs and read-only during evaluation.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    clauses: Vec<Clause>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        KnowledgeBase::default()
    }

    /// Append one clause, rejecting heads that would shadow a built-in.
    pub fn assert(&mut self, clause: Clause) -> Result<(), ReservedPredicate> {
        let key = clause.head.key();
        if Builtin::is_reserved(&key) {
            return Err(ReservedPredicate(key));
        }
        debug!(clause = %clause, "assert");
        self.clauses.push(clause);
        Ok(())
    }

    /// Parse a source text and append every clause in file order. Returns
    /// the number of clauses loaded.
    pub fn consult(&mut self, text: &str) -> Result<usize, LoadError> {
        let clauses = parse_program(text)?;
        let count = clauses.len();
        for clause in clauses {
            self.assert(clause)?;
        }
        Ok(count)
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consult_counts_clauses() {
        let mut kb = KnowledgeBase::new();
        let count = kb
            .consult("parent(tom, bob).\n% a comment\nparent(bob, pat).\n")
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(kb.len(), 2);
    }

    #[test]
    fn test_reserved_head_is_rejected() {
        let mut kb = KnowledgeBase::new();
        let err = kb.consult("eq(X, X).").unwrap_err();
        assert!(matches!(err, LoadError::Reserved(_)));
        assert!(kb.is_empty());
    }

    #[test]
    fn test_same_name_other_arity_is_allowed() {
        let mut kb = KnowledgeBase::new();
        kb.consult("eq(a, b, c).").unwrap();
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn test_clauses_keep_load_order() {
        let mut kb = KnowledgeBase::new();
        kb.consult("p(a).\np(b).").unwrap();
        assert_eq!(kb.clauses()[0].to_string(), "p(a) :- 1.");
        assert_eq!(kb.clauses()[1].to_string(), "p(b) :- 1.");
    }
}
