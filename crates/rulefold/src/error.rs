//! Error types for the inlining engine.

use crate::logic::PredicateId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InlineError {
    /// A transformed rule set failed to stratify. The passes preserve
    /// stratification, so this is an internal invariant violation surfaced
    /// to the caller as a hard failure.
    #[error("rule set is not stratified: negation cycle through predicate {0}")]
    Unstratified(PredicateId),
}

pub type Result<T> = std::result::Result<T, InlineError>;
