//! First-order terms over the rule algebra.

use super::interner::{ConstantId, FunctionId, Interner};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A function symbol with arity
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub id: FunctionId,
    pub arity: u32,
}

impl FunctionSymbol {
    pub fn new(id: FunctionId, arity: u32) -> Self {
        FunctionSymbol { id, arity }
    }
}

/// A first-order term.
///
/// Free variables are dense rule-local indices; every rule is normalized so
/// its free variables are exactly `0..var_count`. `Bound` variables occur
/// only under an `Exists` binder inside an interpreted conjunct. They live
/// in a disjoint namespace: substitution, unification and renumbering all
/// leave them untouched, so quantified conjuncts cannot capture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Free variable, rule-local index
    Var(u32),
    /// Quantifier-bound variable (interpreted conjuncts only)
    Bound(u32),
    /// Integer literal
    Int(i64),
    /// Symbolic constant
    Const(ConstantId),
    /// Function application
    App(FunctionSymbol, Vec<Term>),
}

impl Term {
    /// Largest free-variable index in this term, if any
    pub fn max_var(&self) -> Option<u32> {
        match self {
            Term::Var(v) => Some(*v),
            Term::Bound(_) | Term::Int(_) | Term::Const(_) => None,
            Term::App(_, args) => args.iter().filter_map(Term::max_var).max(),
        }
    }

    /// Collect free variables in first-occurrence order
    pub fn collect_vars(&self, vars: &mut IndexSet<u32>) {
        match self {
            Term::Var(v) => {
                vars.insert(*v);
            }
            Term::Bound(_) | Term::Int(_) | Term::Const(_) => {}
            Term::App(_, args) => {
                for arg in args {
                    arg.collect_vars(vars);
                }
            }
        }
    }

    /// Does this term contain the free variable `var`?
    pub fn contains_var(&self, var: u32) -> bool {
        match self {
            Term::Var(v) => *v == var,
            Term::Bound(_) | Term::Int(_) | Term::Const(_) => false,
            Term::App(_, args) => args.iter().any(|a| a.contains_var(var)),
        }
    }

    /// True when the term has no free variables
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Var(_) | Term::Bound(_) => false,
            Term::Int(_) | Term::Const(_) => true,
            Term::App(_, args) => args.iter().all(Term::is_ground),
        }
    }

    /// An atomic value the simplifier can compare outright
    pub fn is_atomic_value(&self) -> bool {
        matches!(self, Term::Int(_) | Term::Const(_))
    }

    /// Rewrite every free variable through `f`, in place
    pub(crate) fn rename_vars(&mut self, f: &mut impl FnMut(u32) -> u32) {
        match self {
            Term::Var(v) => *v = f(*v),
            Term::Bound(_) | Term::Int(_) | Term::Const(_) => {}
            Term::App(_, args) => {
                for arg in args {
                    arg.rename_vars(f);
                }
            }
        }
    }

    /// Format this term with an interner for name resolution
    pub fn display<'a>(&'a self, interner: &'a Interner) -> TermDisplay<'a> {
        TermDisplay {
            term: self,
            interner,
        }
    }
}

/// Display wrapper resolving interned names
pub struct TermDisplay<'a> {
    term: &'a Term,
    interner: &'a Interner,
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.term {
            Term::Var(v) => write!(f, "X{}", v),
            Term::Bound(b) => write!(f, "?{}", b),
            Term::Int(i) => write!(f, "{}", i),
            Term::Const(c) => write!(f, "{}", self.interner.resolve_constant(*c)),
            Term::App(func, args) => {
                write!(f, "{}(", self.interner.resolve_function(func.id))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg.display(self.interner))?;
                }
                write!(f, ")")
            }
        }
    }
}
