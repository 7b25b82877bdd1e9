//! rulefold: a source-to-source Datalog rule inliner.
//!
//! Given a stratified rule set, the engine eliminates selected
//! intermediate predicates by resolving their defining rules into the
//! rules that reference them, returning an equivalent rule set (same
//! answers for the output predicates) with a smaller dependency graph.
//! Every deletion and resolution step is recorded in audit ledgers for
//! model reconstruction and proof replay.

pub mod config;
pub mod converter;
pub mod error;
pub mod inline;
pub mod json;
pub mod logic;
pub mod resolve;
pub mod ruleset;
pub mod simplify;
pub mod stratify;

// Re-export commonly used types
pub use config::InlinerConfig;
pub use converter::{Converter, ModelConverter, ProofConverter, ResolveStep};
pub use error::{InlineError, Result};
pub use inline::RuleInliner;
pub use logic::{
    Atom, CmpOp, Constraint, ConstantId, FunctionId, FunctionSymbol, Interner, Literal, Predicate,
    PredicateId, Rule, RuleRole, RuleUnifier, Side, Term,
};
pub use resolve::{ResolveOutcome, Resolver};
pub use ruleset::RuleSet;
pub use simplify::simplify_rule;
pub use stratify::Stratifier;
