//! JSON export of an inlining run.
//!
//! Rules and terms are rendered with interner-resolved names so the report
//! is readable without the interner at hand.

use crate::converter::{ModelConverter, ProofConverter, ResolveStep};
use crate::logic::Interner;
use crate::ruleset::RuleSet;
use serde_json::{json, Value};

/// Render the result set and both audit ledgers
pub fn report_to_json(
    rules: &RuleSet,
    model: &ModelConverter,
    proof: &ProofConverter,
    interner: &Interner,
) -> Value {
    json!({
        "rules": rules
            .iter()
            .map(|r| r.display(interner).to_string())
            .collect::<Vec<_>>(),
        "deleted": model
            .deleted()
            .iter()
            .map(|r| r.display(interner).to_string())
            .collect::<Vec<_>>(),
        "resolutions": proof
            .steps()
            .iter()
            .map(|s| step_to_json(s, interner))
            .collect::<Vec<_>>(),
    })
}

fn step_to_json(step: &ResolveStep, interner: &Interner) -> Value {
    json!({
        "target": step.target.display(interner).to_string(),
        "source": step.source.display(interner).to_string(),
        "tail_index": step.tail_index,
        "target_subst": step
            .target_subst
            .iter()
            .map(|t| t.display(interner).to_string())
            .collect::<Vec<_>>(),
        "source_subst": step
            .source_subst
            .iter()
            .map(|t| t.display(interner).to_string())
            .collect::<Vec<_>>(),
        "result": step.result.display(interner).to_string(),
    })
}
