//! One-fact-at-a-time resolution over the knowledge base.
//!
//! Matching is deliberately not full SLD resolution: once a variable is
//! bound to satisfy a candidate clause, the whole query is re-proved from
//! scratch, and a failed re-proof is final rather than a cue to try the
//! next clause. Scripts written for this engine depend on that shortcut,
//! so it is preserved exactly.

use std::io::{self, Write};

use thiserror::Error;
use tracing::{debug, trace};

use crate::ast::{Clause, Functor, Term, Value};
use crate::bindings::Bindings;
use crate::builtins::Builtin;
use crate::knowledge::KnowledgeBase;

/// Upper bound on binding retries plus body nesting before giving up.
pub const MAX_DEPTH: usize = 512;

/// The truth sentinel: a constant term is false iff its literal is `0`.
const FALSE_LITERAL: &str = "0";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("resolution depth exceeded ({MAX_DEPTH})")]
    DepthExceeded,
    /// A lookup hit a variable its environment never declared. This is a
    /// resolver defect, not a user error, and it never corrupts the
    /// knowledge base.
    #[error("internal error: variable `{0}` is not declared in its environment")]
    UndeclaredVariable(String),
    /// `halt/0` was called. The host should stop evaluating and exit with
    /// nonzero status.
    #[error("halt requested")]
    Halted,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result of one query.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Query proved. Public variables with their final values, in
    /// declaration order; `None` marks a variable that stayed unbound.
    Yes(Vec<(String, Option<Value>)>),
    /// Query failed. `undefined` carries the first predicate key that had
    /// neither a built-in nor any stored clause.
    No { undefined: Option<String> },
}

/// Handle into the per-query environment arena.
type EnvId = usize;

const QUERY_ENV: EnvId = 0;

/// Evaluate one parsed query against `kb`, writing built-in side effects
/// to `out` as they happen.
///
/// The query's body term is checked first, then its head functor, both in
/// the query's own environment, so `p(X) :- q(X).` as a query means
/// "prove q(X), then prove p(X)".
pub fn solve<W: Write>(
    kb: &KnowledgeBase,
    query: &Clause,
    out: &mut W,
) -> Result<Answer, EngineError> {
    let mut solver = Solver::new(kb, query, out);
    let proved = solver.eval_term(&query.body, QUERY_ENV, 0)?
        && solver.eval_functor(&query.head, QUERY_ENV, 0)?;

    Ok(if proved {
        Answer::Yes(solver.envs[QUERY_ENV].report())
    } else {
        Answer::No { undefined: solver.undefined.take() }
    })
}

struct Solver<'a, W: Write> {
    kb: &'a KnowledgeBase,
    out: &'a mut W,
    /// `[0]` is the query's environment; `[i + 1]` is a working copy of
    /// clause `i`'s declared environment. Bindings made here are visible
    /// to the recursive re-proof, undone one at a time on failed
    /// branches, and discarded wholesale when the query completes, so no
    /// later query ever observes residue.
    envs: Vec<Bindings>,
    undefined: Option<String>,
}

/// What a term looks like once resolved through its environment.
enum Resolved {
    Value(Value),
    /// An unbound variable, by name.
    Unbound(String),
    Wildcard,
}

impl<'a, W: Write> Solver<'a, W> {
    fn new(kb: &'a KnowledgeBase, query: &Clause, out: &'a mut W) -> Self {
        let mut envs = Vec::with_capacity(kb.len() + 1);
        envs.push(query.vars.clone());
        envs.extend(kb.clauses().iter().map(|c| c.vars.clone()));
        Solver { kb, out, envs, undefined: None }
    }

    /// Truth of a condition term. Constants are true unless they are the
    /// `0` sentinel; wildcards and unbound variables are "don't care,
    /// succeeds"; compounds are proved as goals.
    fn eval_term(&mut self, term: &Term, env: EnvId, depth: usize) -> Result<bool, EngineError> {
        match term {
            Term::Atom(text) | Term::Number(text) => Ok(text != FALSE_LITERAL),
            Term::Wildcard => Ok(true),
            Term::Var(name) => match self.lookup(env, name)? {
                None => Ok(true),
                Some(Value::Atom(text)) | Some(Value::Number(text)) => Ok(text != FALSE_LITERAL),
                Some(Value::Compound(func)) => self.eval_functor(&func, env, depth + 1),
            },
            Term::Compound(func) => self.eval_functor(func, env, depth + 1),
        }
    }

    fn eval_functor(
        &mut self,
        query: &Functor,
        env: EnvId,
        depth: usize,
    ) -> Result<bool, EngineError> {
        if depth >= MAX_DEPTH {
            return Err(EngineError::DepthExceeded);
        }

        let key = query.key();
        if let Some(builtin) = Builtin::lookup(&key) {
            trace!(%key, "built-in dispatch");
            return self.eval_builtin(builtin, query, env, depth);
        }

        let clauses = self.kb.clauses();
        let mut candidate_seen = false;

        'scan: for idx in 0..clauses.len() {
            let head = &clauses[idx].head;
            if head.name != query.name || head.arity() != query.arity() {
                continue;
            }
            candidate_seen = true;
            let clause_env = idx + 1;

            // The clause condition is checked first, in the clause's own
            // environment.
            if !self.eval_term(&clauses[idx].body, clause_env, depth + 1)? {
                continue;
            }

            for j in 0..query.arity() {
                let head_res = self.resolve(&clauses[idx].head.args[j], clause_env)?;
                let query_res = self.resolve(&query.args[j], env)?;

                match (head_res, query_res) {
                    // A wildcard matches anything and binds nothing.
                    (Resolved::Wildcard, _) | (_, Resolved::Wildcard) => continue,

                    // Two unbound variables put no constraint on each
                    // other; values only ever flow one way.
                    (Resolved::Unbound(_), Resolved::Unbound(_)) => continue,

                    // Clause side has a value, query side is free: bind
                    // the query variable and re-prove the whole query. A
                    // failed re-proof is final; the scan does not move on
                    // to another clause.
                    (Resolved::Value(value), Resolved::Unbound(var)) => {
                        trace!(var = %var, value = %value, "tentative binding, query side");
                        self.envs[env].bind(&var, value);
                        if self.eval_functor(query, env, depth + 1)? {
                            return Ok(true);
                        }
                        self.envs[env].unset(&var);
                        return Ok(false);
                    }

                    // Mirror case: the binding lands in the clause's
                    // environment instead.
                    (Resolved::Unbound(var), Resolved::Value(value)) => {
                        trace!(var = %var, value = %value, "tentative binding, clause side");
                        self.envs[clause_env].bind(&var, value);
                        if self.eval_functor(query, env, depth + 1)? {
                            return Ok(true);
                        }
                        self.envs[clause_env].unset(&var);
                        return Ok(false);
                    }

                    // Both sides resolved: the clause survives only on an
                    // exact kind and literal match. A mismatch here does
                    // fall through to the next candidate.
                    (Resolved::Value(a), Resolved::Value(b)) => {
                        if a.kind() != b.kind() || a.literal() != b.literal() {
                            continue 'scan;
                        }
                    }
                }
            }

            // First match wins; no further clauses are tried.
            debug!(%key, clause = idx, "matched");
            return Ok(true);
        }

        if !candidate_seen {
            debug!(%key, "predicate not defined");
            if self.undefined.is_none() {
                self.undefined = Some(key);
            }
        }
        Ok(false)
    }

    fn eval_builtin(
        &mut self,
        builtin: Builtin,
        func: &Functor,
        env: EnvId,
        depth: usize,
    ) -> Result<bool, EngineError> {
        match builtin {
            Builtin::Eq => {
                let a = self.resolve(&func.args[0], env)?;
                let b = self.resolve(&func.args[1], env)?;
                Ok(match (a, b) {
                    (Resolved::Value(a), Resolved::Value(b)) => {
                        a.kind() == b.kind() && a.literal() == b.literal()
                    }
                    // A term still unresolved is never equal to anything.
                    _ => false,
                })
            }
            Builtin::And => {
                let left = self.eval_term(&func.args[0], env, depth + 1)?;
                let right = self.eval_term(&func.args[1], env, depth + 1)?;
                Ok(left && right)
            }
            Builtin::Or => {
                let left = self.eval_term(&func.args[0], env, depth + 1)?;
                let right = self.eval_term(&func.args[1], env, depth + 1)?;
                Ok(left || right)
            }
            Builtin::Xor => {
                let left = self.eval_term(&func.args[0], env, depth + 1)?;
                let right = self.eval_term(&func.args[1], env, depth + 1)?;
                Ok(left != right)
            }
            Builtin::Not => Ok(!self.eval_term(&func.args[0], env, depth + 1)?),
            Builtin::Listing => {
                for clause in self.kb.clauses() {
                    writeln!(self.out, "{clause}")?;
                }
                Ok(true)
            }
            Builtin::Write | Builtin::Print => {
                let text = self.display_form(&func.args[0], env)?;
                write!(self.out, "{text}")?;
                self.out.flush()?;
                Ok(true)
            }
            Builtin::Nl => {
                writeln!(self.out)?;
                Ok(true)
            }
            Builtin::Halt => Err(EngineError::Halted),
        }
    }

    /// Display form for `write/1`: a compound prints as its functor name,
    /// constants as their literal, an unbound variable as its name.
    fn display_form(&self, term: &Term, env: EnvId) -> Result<String, EngineError> {
        Ok(match self.resolve(term, env)? {
            Resolved::Value(Value::Compound(func)) => func.name,
            Resolved::Value(value) => value.literal(),
            Resolved::Unbound(name) => name,
            Resolved::Wildcard => "_".to_string(),
        })
    }

    fn resolve(&self, term: &Term, env: EnvId) -> Result<Resolved, EngineError> {
        Ok(match term {
            Term::Atom(text) => Resolved::Value(Value::Atom(text.clone())),
            Term::Number(text) => Resolved::Value(Value::Number(text.clone())),
            Term::Compound(func) => Resolved::Value(Value::Compound(func.clone())),
            Term::Wildcard => Resolved::Wildcard,
            Term::Var(name) => match self.lookup(env, name)? {
                Some(value) => Resolved::Value(value),
                None => Resolved::Unbound(name.clone()),
            },
        })
    }

    fn lookup(&self, env: EnvId, name: &str) -> Result<Option<Value>, EngineError> {
        self.envs[env]
            .get(name)
            .map(|value| value.cloned())
            .ok_or_else(|| EngineError::UndeclaredVariable(name.to_string()))
    }
}
