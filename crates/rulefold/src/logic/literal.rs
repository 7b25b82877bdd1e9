//! Atoms and tail literals.

use super::interner::{Interner, PredicateId};
use super::term::Term;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A predicate symbol: identity plus arity.
///
/// Equality is identity — the arity is a function of the id, carried along
/// so the orientation check and arity-sensitive indexing need no interner.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Predicate {
    pub id: PredicateId,
    pub arity: u32,
}

impl Predicate {
    pub fn new(id: PredicateId, arity: u32) -> Self {
        Predicate { id, arity }
    }
}

/// An atomic formula: a predicate applied to terms
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Atom {
    pub predicate: Predicate,
    pub args: Vec<Term>,
}

impl Atom {
    pub fn new(predicate: Predicate, args: Vec<Term>) -> Self {
        Atom { predicate, args }
    }

    /// Largest free-variable index in this atom, if any
    pub fn max_var(&self) -> Option<u32> {
        self.args.iter().filter_map(Term::max_var).max()
    }

    /// Collect free variables in first-occurrence order
    pub fn collect_vars(&self, vars: &mut IndexSet<u32>) {
        for arg in &self.args {
            arg.collect_vars(vars);
        }
    }

    pub(crate) fn rename_vars(&mut self, f: &mut impl FnMut(u32) -> u32) {
        for arg in &mut self.args {
            arg.rename_vars(f);
        }
    }

    /// Format this atom with an interner for name resolution
    pub fn display<'a>(&'a self, interner: &'a Interner) -> AtomDisplay<'a> {
        AtomDisplay {
            atom: self,
            interner,
        }
    }
}

/// A tail literal: an atom with a polarity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub atom: Atom,
    pub polarity: bool, // true = positive, false = negative
}

impl Literal {
    pub fn positive(atom: Atom) -> Self {
        Literal {
            atom,
            polarity: true,
        }
    }

    pub fn negative(atom: Atom) -> Self {
        Literal {
            atom,
            polarity: false,
        }
    }

    pub fn predicate(&self) -> Predicate {
        self.atom.predicate
    }

    /// Format this literal with an interner for name resolution
    pub fn display<'a>(&'a self, interner: &'a Interner) -> LiteralDisplay<'a> {
        LiteralDisplay {
            literal: self,
            interner,
        }
    }
}

/// Display wrapper resolving interned names
pub struct AtomDisplay<'a> {
    atom: &'a Atom,
    interner: &'a Interner,
}

impl fmt::Display for AtomDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(",
            self.interner.resolve_predicate(self.atom.predicate.id)
        )?;
        for (i, arg) in self.atom.args.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", arg.display(self.interner))?;
        }
        write!(f, ")")
    }
}

/// Display wrapper resolving interned names
pub struct LiteralDisplay<'a> {
    literal: &'a Literal,
    interner: &'a Interner,
}

impl fmt::Display for LiteralDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.literal.polarity {
            write!(f, "~")?;
        }
        write!(f, "{}", self.literal.atom.display(self.interner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_identity() {
        let mut interner = Interner::new();
        let p1 = Predicate::new(interner.intern_predicate("p"), 2);
        let p2 = Predicate::new(interner.intern_predicate("p"), 2);
        let q = Predicate::new(interner.intern_predicate("q"), 2);

        assert_eq!(p1, p2);
        assert_ne!(p1, q);
    }

    #[test]
    fn test_literal_display() {
        let mut interner = Interner::new();
        let p = Predicate::new(interner.intern_predicate("edge"), 2);
        let atom = Atom::new(p, vec![Term::Var(0), Term::Var(1)]);
        let lit = Literal::negative(atom);
        assert_eq!(lit.display(&interner).to_string(), "~edge(X0,X1)");
    }

    #[test]
    fn test_atom_vars() {
        let mut interner = Interner::new();
        let p = Predicate::new(interner.intern_predicate("p"), 2);
        let atom = Atom::new(p, vec![Term::Var(4), Term::Var(2)]);
        assert_eq!(atom.max_var(), Some(4));

        let mut vars = IndexSet::new();
        atom.collect_vars(&mut vars);
        assert_eq!(vars.into_iter().collect::<Vec<_>>(), vec![4, 2]);
    }
}
