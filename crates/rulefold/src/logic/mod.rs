//! The term algebra: symbols, terms, atoms, constraints, rules, and the
//! two-sided unifier used by rule resolution.

pub mod constraint;
pub mod interner;
pub mod literal;
pub mod rule;
pub mod substitution;
pub mod term;

pub use constraint::{CmpOp, Constraint};
pub use interner::{ConstantId, FunctionId, Interner, PredicateId};
pub use literal::{Atom, Literal, Predicate};
pub use rule::{Rule, RuleRole};
pub use substitution::{RuleUnifier, Side};
pub use term::{FunctionSymbol, Term};
