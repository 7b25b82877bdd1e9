//! The main transform pass: rewrite every rule against the pre-computed
//! inlined definitions until no eligible tail predicate remains.

use super::RuleInliner;
use crate::logic::Rule;
use crate::resolve::ResolveOutcome;
use crate::ruleset::RuleSet;
use tracing::trace;

impl RuleInliner {
    /// Exhaustively inline eligible tail predicates of `r0`, returning the
    /// fully rewritten rules and whether any inlining happened.
    ///
    /// Worklist driven: each resolvent goes back on the list until its
    /// positive tail holds no predicate the planner eliminates. Quantified
    /// worklist items are discarded; unsatisfiable and non-unifiable
    /// resolvents are dropped silently.
    pub(crate) fn transform_rule(&mut self, r0: &Rule) -> (Vec<Rule>, bool) {
        let mut out = Vec::new();
        let mut modified = false;
        let mut todo = vec![r0.clone()];

        while let Some(rule) = todo.pop() {
            if rule.has_quantifiers() {
                continue;
            }

            let eligible = (0..rule.positive_len())
                .find(|&i| self.inlining_allowed(rule.tail_pred(i)));
            let Some(tail_index) = eligible else {
                // Nothing left to inline in this rule
                out.push(rule);
                continue;
            };
            modified = true;

            let pred = rule.tail_pred(tail_index);
            trace!(pred = %pred.id, tail_index, "inline_tail");
            let def_idxs = self.inlined_rules.rules_for(pred).to_vec();
            for di in def_idxs {
                let src = self.inlined_rules.rule(di).clone();
                match self.resolver.resolve(&rule, tail_index, &src) {
                    ResolveOutcome::Resolved(res) => {
                        let step = self.resolve_step(&rule, &src, tail_index, &res);
                        self.record_resolve(&step);
                        todo.push(res);
                    }
                    ResolveOutcome::Unsat | ResolveOutcome::NotApplicable => {}
                }
            }
        }

        (out, modified)
    }

    /// Transform every rule of `source` into `out`. Rules defining an
    /// eliminated predicate are dropped by omission; their content was
    /// folded into their consumers.
    pub(crate) fn transform_rules(&mut self, source: &RuleSet, out: &mut RuleSet) -> bool {
        let mut something_done = false;
        for rule in source.iter() {
            if self.inlining_allowed(rule.head().predicate) {
                continue;
            }
            let (emitted, modified) = self.transform_rule(rule);
            something_done |= modified;
            for r in emitted {
                out.add_rule(r);
            }
        }
        something_done
    }
}
