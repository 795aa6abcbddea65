use std::fmt;

use crate::bindings::Bindings;

/// A single node in a clause or query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Bare constant, e.g. `tom`.
    Atom(String),
    /// Numeric constant, kept as its source text. No numeric coercion
    /// happens at this layer.
    Number(String),
    /// Named variable, resolved through a `Bindings` environment.
    Var(String),
    /// `_`: matches anything, binds nothing, is never reported.
    Wildcard,
    Compound(Functor),
}

/// A named term constructor with an ordered argument list, e.g.
/// `parent(tom, X)`. The unit of matching and the head of a stored clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Functor {
    pub name: String,
    pub args: Vec<Term>,
}

impl Functor {
    pub fn new(name: impl Into<String>, args: Vec<Term>) -> Self {
        Functor { name: name.into(), args }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Canonical predicate key, e.g. `parent/2`. Predicates with the same
    /// name but different arities never unify with each other, and
    /// built-ins are looked up by this exact key.
    pub fn key(&self) -> String {
        format!("{}/{}", self.name, self.args.len())
    }
}

/// A resolved value a variable can be bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Atom(String),
    Number(String),
    Compound(Functor),
}

/// Discriminant used by the typed comparison step: two values unify only
/// if their kinds agree before their literals are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Atom,
    Number,
    Compound,
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Atom(_) => Kind::Atom,
            Value::Number(_) => Kind::Number,
            Value::Compound(_) => Kind::Compound,
        }
    }

    /// Literal text used for comparisons. Compounds compare shallowly by
    /// their canonical key; argument structure does not participate.
    pub fn literal(&self) -> String {
        match self {
            Value::Atom(text) | Value::Number(text) => text.clone(),
            Value::Compound(f) => f.key(),
        }
    }
}

/// A stored `head :- body` rule. A fact is a clause whose body is the
/// constant `1`.
#[derive(Debug, Clone)]
pub struct Clause {
    pub head: Functor,
    pub body: Term,
    /// Variables declared while parsing this clause, all unbound. Each
    /// evaluation works on its own copy; the stored environment is never
    /// mutated.
    pub vars: Bindings,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(text) | Term::Number(text) => write!(f, "{text}"),
            Term::Var(name) => write!(f, "{name}"),
            Term::Wildcard => write!(f, "_"),
            Term::Compound(func) => write!(f, "{func}"),
        }
    }
}

impl fmt::Display for Functor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Atom(text) | Value::Number(text) => write!(f, "{text}"),
            Value::Compound(func) => write!(f, "{func}"),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :- {}.", self.head, self.body)
    }
}
