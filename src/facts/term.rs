// SPDX-License-Identifier: PMPL-1.0-or-later

//! Terms and ground facts
//!
//! Names are stored raw and sanitised when rendered, so no caller has to
//! remember to quote anything.

use super::atom::prolog_atom;
use std::fmt;

/// A term in an emitted fact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// Named constant, quoted on output when needed
    Atom(String),
    /// Integer constant
    Int(i64),
    /// Anonymous variable `_`
    Wildcard,
    /// Compound term: functor(args...)
    Compound(String, Vec<Term>),
}

impl Term {
    pub fn atom(s: &str) -> Self {
        Term::Atom(s.to_string())
    }

    pub fn compound(name: &str, args: Vec<Term>) -> Self {
        Term::Compound(name.to_string(), args)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(name) => f.write_str(&prolog_atom(name)),
            Term::Int(value) => write!(f, "{}", value),
            Term::Wildcard => f.write_str("_"),
            Term::Compound(functor, args) => {
                write!(f, "{}(", prolog_atom(functor))?;
                write_args(f, args)?;
                f.write_str(")")
            }
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Term]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

/// A ground fact: `relation(args...).`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fact {
    pub relation: String,
    pub args: Vec<Term>,
}

impl Fact {
    pub fn new(relation: &str, args: Vec<Term>) -> Self {
        Self {
            relation: relation.to_string(),
            args,
        }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// `relation/arity`, the form MulVAL's rules refer to predicates by.
    pub fn signature(&self) -> String {
        format!("{}/{}", self.relation, self.arity())
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", prolog_atom(&self.relation))?;
        write_args(f, &self.args)?;
        f.write_str(").")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested_compound() {
        let fact = Fact::new(
            "attackGoal",
            vec![Term::compound(
                "execCode",
                vec![Term::atom("db_0"), Term::atom("Admin")],
            )],
        );
        assert_eq!(fact.to_string(), "attackGoal(execCode(db_0, 'Admin')).");
        assert_eq!(fact.signature(), "attackGoal/1");
    }

    #[test]
    fn test_render_int_and_wildcard() {
        let fact = Fact::new(
            "probe",
            vec![Term::Int(8080), Term::Wildcard, Term::atom("tcp")],
        );
        assert_eq!(fact.to_string(), "probe(8080, _, tcp).");
    }
}
