//! Inlining plan: which predicates to eliminate, and their pre-computed
//! inlined definitions.
//!
//! Phase A breaks cycles among the candidates by forbidding one predicate
//! per non-singleton stratum. Phase B suppresses multiplier combinations
//! that would blow up the rule count. Phase C walks the remaining
//! candidates bottom-up and inlines them into each other, so later
//! predicates see the already-resolved form of earlier ones.

use super::stats::OccurrenceStats;
use super::RuleInliner;
use crate::error::Result;
use crate::logic::Predicate;
use crate::ruleset::RuleSet;
use tracing::debug;

/// What the multiplier analysis decides for one positive tail occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MultiplierAction {
    /// The head predicate already multiplies something else; forbid it
    ForbidHead,
    /// The tail predicate is consumed in several places; forbid it
    ForbidTail(Predicate),
    /// Inlining the tail predicate multiplies the head's rule count
    UpdateCount(usize),
    NoChange,
}

impl RuleInliner {
    /// May `pred` be eliminated?
    ///
    /// The first four conditions are the soundness floor; the rest cap the
    /// potential blow-up, permitting limited duplication when every
    /// occurrence is unique.
    pub(crate) fn inlining_allowed(&self, pred: Predicate) -> bool {
        if self.output_preds.contains(&pred)
            || self.fact_preds.contains(&pred)
            || self.stats.is_negative(pred)
            || self.forbidden_preds.contains(&pred)
        {
            return false;
        }

        self.stats.head_count(pred) <= 1
            || (self.stats.tail_count(pred) <= 1 && self.stats.head_count(pred) <= 4)
    }

    /// The rules whose head predicate is currently allowed, closed.
    /// Stratification cannot fail: the candidate set is a subset of a
    /// stratified program and negatively-occurring predicates are never
    /// allowed.
    fn create_allowed_rule_set(&self, orig: &RuleSet) -> Result<RuleSet> {
        let mut res = RuleSet::new();
        for rule in orig.iter() {
            if self.inlining_allowed(rule.head().predicate) {
                res.add_rule(rule.clone());
            }
        }
        res.close()?;
        Ok(res)
    }

    /// Forbid one predicate from each non-singleton stratum of the
    /// candidate set. Returns whether anything was forbidden.
    fn forbid_preds_from_cycles(&mut self, candidate: &RuleSet) -> bool {
        let mut something_forbidden = false;
        let strata: Vec<Predicate> = candidate
            .stratifier()
            .strata()
            .iter()
            .filter(|stratum| stratum.len() > 1)
            .map(|stratum| stratum[0])
            .collect();
        for pred in strata {
            debug!(pred = %pred.id, "forbid_cycle_pred");
            self.forbidden_preds.insert(pred);
            something_forbidden = true;
        }
        something_forbidden
    }

    /// Decide what to do about one positive tail occurrence of
    /// `tail_pred` inside a rule defining `head_pred`.
    fn multiplier_action(
        &self,
        head_pred: Predicate,
        tail_pred: Predicate,
        is_multi_head: bool,
        is_multi_occurrence: bool,
    ) -> MultiplierAction {
        if !self.inlining_allowed(tail_pred) {
            return MultiplierAction::NoChange;
        }
        let tail_head_count = self.stats.head_count(tail_pred);
        if tail_head_count <= 1 {
            return MultiplierAction::NoChange;
        }
        if is_multi_head {
            return MultiplierAction::ForbidHead;
        }
        if is_multi_occurrence {
            MultiplierAction::ForbidTail(tail_pred)
        } else {
            MultiplierAction::UpdateCount(self.stats.head_count(head_pred) * tail_head_count)
        }
    }

    /// Forbid combinations where inlining would multiply rule counts
    /// through more than one axis. Returns whether anything was forbidden.
    fn forbid_multiple_multipliers(&mut self, orig: &RuleSet, candidate: &RuleSet) -> bool {
        let mut something_forbidden = false;

        // Candidate strata are singletons after cycle breaking
        let preds: Vec<Predicate> = candidate
            .stratifier()
            .strata()
            .iter()
            .map(|stratum| stratum[0])
            .collect();

        'next_pred: for head_pred in preds {
            let mut is_multi_head = self.stats.head_count(head_pred) > 1;
            let is_multi_occurrence = self.stats.tail_count(head_pred) > 1;

            let rule_idxs = candidate.rules_for(head_pred).to_vec();
            for ri in rule_idxs {
                let rule = candidate.rule(ri);
                for ti in 0..rule.positive_len() {
                    let action = self.multiplier_action(
                        head_pred,
                        rule.tail_pred(ti),
                        is_multi_head,
                        is_multi_occurrence,
                    );
                    match action {
                        MultiplierAction::NoChange => {}
                        MultiplierAction::ForbidHead => {
                            debug!(pred = %head_pred.id, "forbid_multi_head");
                            self.forbidden_preds.insert(head_pred);
                            something_forbidden = true;
                            continue 'next_pred;
                        }
                        MultiplierAction::ForbidTail(tail_pred) => {
                            debug!(pred = %tail_pred.id, "forbid_multi_tail");
                            self.forbidden_preds.insert(tail_pred);
                            something_forbidden = true;
                        }
                        MultiplierAction::UpdateCount(count) => {
                            self.stats.set_head_count(head_pred, count);
                            is_multi_head = true;
                        }
                    }
                }
            }
        }

        // Rules that stay in the output must not gain a cartesian product
        // of inlined definitions: keep at most one multi-definition tail
        // predicate per rule.
        for rule in orig.iter() {
            if self.inlining_allowed(rule.head().predicate) {
                continue;
            }
            let mut has_multi_head_pred = false;
            for ti in 0..rule.positive_len() {
                let pred = rule.tail_pred(ti);
                if !self.inlining_allowed(pred) || self.stats.head_count(pred) <= 1 {
                    continue;
                }
                if has_multi_head_pred {
                    debug!(pred = %pred.id, "forbid_cartesian_tail");
                    self.forbidden_preds.insert(pred);
                    something_forbidden = true;
                } else {
                    has_multi_head_pred = true;
                }
            }
        }

        something_forbidden
    }

    /// Compute the final set of eliminated predicates and their mutually
    /// inlined definitions.
    pub(crate) fn plan_inlining(&mut self, orig: &RuleSet) -> Result<()> {
        self.stats = OccurrenceStats::collect(orig);

        let mut candidate = self.create_allowed_rule_set(orig)?;
        while self.forbid_preds_from_cycles(&candidate) {
            candidate = self.create_allowed_rule_set(orig)?;
        }

        if self.forbid_multiple_multipliers(orig, &candidate) {
            candidate = self.create_allowed_rule_set(orig)?;
        }

        debug_assert!(self.inlined_rules.is_empty());

        // Bottom-up, so each predicate's rules are resolved against the
        // already-inlined form of its dependencies
        let preds: Vec<Predicate> = candidate
            .stratifier()
            .strata()
            .iter()
            .map(|stratum| stratum[0])
            .collect();
        for pred in preds {
            let rule_idxs = candidate.rules_for(pred).to_vec();
            for ri in rule_idxs {
                let rule = candidate.rule(ri).clone();
                let (emitted, _) = self.transform_rule(&rule);
                for resolved in emitted {
                    self.inlined_rules.add_rule(resolved);
                }
            }
        }

        debug!(
            inlined_rules = self.inlined_rules.len(),
            forbidden = self.forbidden_preds.len(),
            "plan_complete"
        );
        Ok(())
    }
}
