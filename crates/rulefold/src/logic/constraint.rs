//! Interpreted tail conjuncts.
//!
//! Everything in a rule tail that is not a literal over a user predicate is
//! a `Constraint`: a built-in comparison between terms, a boolean constant,
//! or an existentially quantified conjunction. Quantified conjuncts make a
//! rule ineligible for inlining in either role.

use super::interner::Interner;
use super::term::Term;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of an interpreted conjunct
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
        };
        write!(f, "{}", s)
    }
}

/// An interpreted tail conjunct
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constraint {
    /// Boolean constant
    Lit(bool),
    /// Comparison between two terms
    Cmp(CmpOp, Term, Term),
    /// Existential quantification: `count` bound variables over a
    /// conjunction. Bound variables appear as [`Term::Bound`] in the body.
    Exists(u32, Vec<Constraint>),
}

impl Constraint {
    /// Does this conjunct contain a quantifier?
    pub fn has_quantifiers(&self) -> bool {
        match self {
            Constraint::Lit(_) | Constraint::Cmp(..) => false,
            Constraint::Exists(..) => true,
        }
    }

    /// Largest free-variable index in this conjunct, if any
    pub fn max_var(&self) -> Option<u32> {
        match self {
            Constraint::Lit(_) => None,
            Constraint::Cmp(_, a, b) => a.max_var().max(b.max_var()),
            Constraint::Exists(_, body) => body.iter().filter_map(Constraint::max_var).max(),
        }
    }

    /// Collect free variables in first-occurrence order
    pub fn collect_vars(&self, vars: &mut IndexSet<u32>) {
        match self {
            Constraint::Lit(_) => {}
            Constraint::Cmp(_, a, b) => {
                a.collect_vars(vars);
                b.collect_vars(vars);
            }
            Constraint::Exists(_, body) => {
                for c in body {
                    c.collect_vars(vars);
                }
            }
        }
    }

    /// Does this conjunct mention the free variable `var`?
    pub fn contains_var(&self, var: u32) -> bool {
        match self {
            Constraint::Lit(_) => false,
            Constraint::Cmp(_, a, b) => a.contains_var(var) || b.contains_var(var),
            Constraint::Exists(_, body) => body.iter().any(|c| c.contains_var(var)),
        }
    }

    /// Largest bound-variable index occurring in this conjunct, if any
    pub(crate) fn max_bound(&self) -> Option<u32> {
        fn term_max_bound(t: &Term) -> Option<u32> {
            match t {
                Term::Bound(b) => Some(*b),
                Term::Var(_) | Term::Int(_) | Term::Const(_) => None,
                Term::App(_, args) => args.iter().filter_map(term_max_bound).max(),
            }
        }
        match self {
            Constraint::Lit(_) => None,
            Constraint::Cmp(_, a, b) => term_max_bound(a).max(term_max_bound(b)),
            Constraint::Exists(_, body) => body.iter().filter_map(Constraint::max_bound).max(),
        }
    }

    /// Rewrite every free variable through `f`, in place
    pub(crate) fn rename_vars(&mut self, f: &mut impl FnMut(u32) -> u32) {
        match self {
            Constraint::Lit(_) => {}
            Constraint::Cmp(_, a, b) => {
                a.rename_vars(f);
                b.rename_vars(f);
            }
            Constraint::Exists(_, body) => {
                for c in body {
                    c.rename_vars(f);
                }
            }
        }
    }

    /// Rebuild the conjunct with every term rewritten through `f`. Used to
    /// push a substitution below binders; `f` must not touch bound
    /// variables.
    pub(crate) fn map_terms(&self, f: &mut impl FnMut(&Term) -> Term) -> Constraint {
        match self {
            Constraint::Lit(b) => Constraint::Lit(*b),
            Constraint::Cmp(op, a, b) => Constraint::Cmp(*op, f(a), f(b)),
            Constraint::Exists(n, body) => {
                Constraint::Exists(*n, body.iter().map(|c| c.map_terms(f)).collect())
            }
        }
    }

    /// Format this conjunct with an interner for name resolution
    pub fn display<'a>(&'a self, interner: &'a Interner) -> ConstraintDisplay<'a> {
        ConstraintDisplay {
            constraint: self,
            interner,
        }
    }
}

/// Display wrapper resolving interned names
pub struct ConstraintDisplay<'a> {
    constraint: &'a Constraint,
    interner: &'a Interner,
}

impl fmt::Display for ConstraintDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constraint {
            Constraint::Lit(b) => write!(f, "{}", b),
            Constraint::Cmp(op, a, b) => write!(
                f,
                "{} {} {}",
                a.display(self.interner),
                op,
                b.display(self.interner)
            ),
            Constraint::Exists(n, body) => {
                write!(f, "exists {}: (", n)?;
                for (i, c) in body.iter().enumerate() {
                    if i > 0 {
                        write!(f, " & ")?;
                    }
                    write!(f, "{}", c.display(self.interner))?;
                }
                write!(f, ")")
            }
        }
    }
}
