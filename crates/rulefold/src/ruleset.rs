//! Rule sets: owned rule storage with a by-head index and a stratifier.

use crate::error::Result;
use crate::logic::{Predicate, Rule};
use crate::stratify::Stratifier;
use indexmap::IndexMap;

/// An unordered collection of rules, indexable by head predicate.
///
/// The set owns its rules; adding moves a rule in, and the result of a
/// transformation is returned by value. `close` recomputes the stratifier
/// and must be called before stratum queries.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    by_head: IndexMap<Predicate, Vec<usize>>,
    strat: Option<Stratifier>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet::default()
    }

    pub fn from_rules(rules: Vec<Rule>) -> Self {
        let mut set = RuleSet::new();
        for rule in rules {
            set.add_rule(rule);
        }
        set
    }

    /// Add a rule; invalidates the stratifier.
    pub fn add_rule(&mut self, rule: Rule) {
        let idx = self.rules.len();
        self.by_head
            .entry(rule.head().predicate)
            .or_default()
            .push(idx);
        self.rules.push(rule);
        self.strat = None;
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, idx: usize) -> &Rule {
        &self.rules[idx]
    }

    /// Indices of the rules defining `pred`
    pub fn rules_for(&self, pred: Predicate) -> &[usize] {
        self.by_head.get(&pred).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Recompute the stratifier. Fails when the set is not stratified with
    /// respect to negation — an invariant violation for transformed sets.
    pub fn close(&mut self) -> Result<()> {
        self.strat = Some(Stratifier::build(&self.rules)?);
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.strat.is_some()
    }

    /// The stratifier of a closed set.
    pub fn stratifier(&self) -> &Stratifier {
        self.strat.as_ref().expect("rule set not closed")
    }

    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }
}
