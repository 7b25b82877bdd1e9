//! Audit ledgers for rule deletion and resolution.
//!
//! Every rule the engine drops and every resolution step it performs is
//! reported to the converters. The model converter keeps deleted rules (a
//! dropped rule is subsumed into its consumers, so model reconstruction
//! needs its body); the proof converter keeps resolution steps with both
//! substitution images so a proof over the input rules can be replayed
//! over the output.

use crate::logic::{Rule, Term};
use serde::Serialize;

/// One resolution step: `target` resolved with `source` at
/// `target`'s positive tail position `tail_index`, yielding `result`.
///
/// The substitution images map each variable of the respective rule to its
/// term in the joint variable space of the resolvent before normalization.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveStep {
    pub target: Rule,
    pub source: Rule,
    pub tail_index: usize,
    pub target_subst: Vec<Term>,
    pub source_subst: Vec<Term>,
    pub result: Rule,
}

/// Capability set shared by the converters. Each variant records the
/// events it cares about and ignores the rest.
pub trait Converter {
    fn append_delete(&mut self, _rule: &Rule) {}
    fn append_resolve(&mut self, _step: &ResolveStep) {}
}

/// Records deleted rules for model reconstruction
#[derive(Debug, Default)]
pub struct ModelConverter {
    deleted: Vec<Rule>,
}

impl ModelConverter {
    pub fn new() -> Self {
        ModelConverter::default()
    }

    pub fn deleted(&self) -> &[Rule] {
        &self.deleted
    }

    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty()
    }
}

impl Converter for ModelConverter {
    fn append_delete(&mut self, rule: &Rule) {
        self.deleted.push(rule.clone());
    }
}

/// Records resolution steps for proof replay
#[derive(Debug, Default)]
pub struct ProofConverter {
    steps: Vec<ResolveStep>,
}

impl ProofConverter {
    pub fn new() -> Self {
        ProofConverter::default()
    }

    pub fn steps(&self) -> &[ResolveStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Converter for ProofConverter {
    fn append_resolve(&mut self, step: &ResolveStep) {
        self.steps.push(step.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Atom, Interner, Predicate};

    fn some_rule() -> Rule {
        let mut interner = Interner::new();
        let p = Predicate::new(interner.intern_predicate("p"), 1);
        Rule::new(Atom::new(p, vec![Term::Var(0)]), vec![], vec![])
    }

    #[test]
    fn test_converters_record_their_events() {
        let rule = some_rule();
        let step = ResolveStep {
            target: rule.clone(),
            source: rule.clone(),
            tail_index: 0,
            target_subst: vec![],
            source_subst: vec![],
            result: rule.clone(),
        };

        let mut mc = ModelConverter::new();
        let mut pc = ProofConverter::new();

        mc.append_delete(&rule);
        mc.append_resolve(&step); // ignored
        pc.append_delete(&rule); // ignored
        pc.append_resolve(&step);

        assert_eq!(mc.deleted().len(), 1);
        assert_eq!(pc.steps().len(), 1);
    }
}
