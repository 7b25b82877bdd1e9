//! Predicate occurrence statistics.

use crate::logic::Predicate;
use crate::ruleset::RuleSet;
use indexmap::{IndexMap, IndexSet};

/// Per-predicate occurrence counters over a rule set, computed in one
/// linear scan. The planner's multiplier analysis updates head counts in
/// place; counters are never recomputed mid-plan.
#[derive(Debug, Default)]
pub struct OccurrenceStats {
    head_count: IndexMap<Predicate, usize>,
    head_nonempty_tail_count: IndexMap<Predicate, usize>,
    tail_count: IndexMap<Predicate, usize>,
    neg_preds: IndexSet<Predicate>,
}

impl OccurrenceStats {
    pub fn collect(rules: &RuleSet) -> Self {
        let mut stats = OccurrenceStats::default();
        for rule in rules.iter() {
            let head_pred = rule.head().predicate;
            *stats.head_count.entry(head_pred).or_default() += 1;
            if rule.total_tail_len() > 0 {
                *stats.head_nonempty_tail_count.entry(head_pred).or_default() += 1;
            }
            for (i, lit) in rule.literals().iter().enumerate() {
                if lit.polarity {
                    debug_assert!(i < rule.positive_len());
                    *stats.tail_count.entry(lit.predicate()).or_default() += 1;
                } else {
                    stats.neg_preds.insert(lit.predicate());
                }
            }
        }
        stats
    }

    /// Number of rules defining `pred`
    pub fn head_count(&self, pred: Predicate) -> usize {
        self.head_count.get(&pred).copied().unwrap_or(0)
    }

    /// Overwrite the head count; used by the multiplier analysis
    pub fn set_head_count(&mut self, pred: Predicate, count: usize) {
        self.head_count.insert(pred, count);
    }

    /// Number of rules defining `pred` with a nonempty tail
    pub fn head_nonempty_tail_count(&self, pred: Predicate) -> usize {
        self.head_nonempty_tail_count
            .get(&pred)
            .copied()
            .unwrap_or(0)
    }

    /// Number of positive tail occurrences of `pred`
    pub fn tail_count(&self, pred: Predicate) -> usize {
        self.tail_count.get(&pred).copied().unwrap_or(0)
    }

    /// Does `pred` occur negatively anywhere?
    pub fn is_negative(&self, pred: Predicate) -> bool {
        self.neg_preds.contains(&pred)
    }
}
