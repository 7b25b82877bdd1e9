//! Linear fusion: chains of single-literal rules are collapsed and the
//! consumed definitions deleted.
//!
//! A rule is *expandable* when its uninterpreted tail is exactly one
//! positive atom whose predicate is neither output nor fact-bearing, and
//! *removable* when the same holds for its head predicate. When an
//! expandable rule's tail atom has a unique unifiable definition, and that
//! definition's head has a unique consumer (unless branching is enabled),
//! the two rules are fused in place and the consumed rule is invalidated.

use super::RuleInliner;
use crate::logic::{Atom, Rule};
use crate::resolve::ResolveOutcome;
use crate::ruleset::RuleSet;
use indexmap::IndexMap;
use tracing::{debug, trace};

/// Map from atom fingerprint to the rules carrying that atom, in a fixed
/// position class (head or uninterpreted tail). Fingerprints are the
/// atoms' structural hashes; unification probes filter by predicate and
/// then test each distinct atom once per occurrence list.
#[derive(Debug, Default)]
struct AtomIndex {
    positions: IndexMap<Atom, Vec<usize>>,
}

impl AtomIndex {
    fn add(&mut self, atom: &Atom, idx: usize) {
        self.positions.entry(atom.clone()).or_default().push(idx);
    }

    fn remove(&mut self, atom: &Atom, idx: usize) {
        if let Some(occ) = self.positions.get_mut(atom) {
            occ.retain(|&i| i != idx);
        }
    }

    fn entries(&self) -> impl Iterator<Item = (&Atom, &[usize])> {
        self.positions
            .iter()
            .filter(|(_, occ)| !occ.is_empty())
            .map(|(atom, occ)| (atom, occ.as_slice()))
    }
}

/// Mutable per-pass bookkeeping: both indices plus the rule flags
#[derive(Debug, Default)]
struct LinearState {
    head_index: AtomIndex,
    tail_index: AtomIndex,
    valid: Vec<bool>,
    can_remove: Vec<bool>,
    can_expand: Vec<bool>,
}

impl RuleInliner {
    fn linear_flags(&self, rule: &Rule) -> (bool, bool) {
        let head_pred = rule.head().predicate;
        let can_remove =
            !self.output_preds.contains(&head_pred) && !self.fact_preds.contains(&head_pred);
        let can_expand = rule.literals().len() == 1 && rule.positive_len() == 1 && {
            let tail_pred = rule.tail_pred(0);
            !self.fact_preds.contains(&tail_pred) && !self.output_preds.contains(&tail_pred)
        };
        (can_remove, can_expand)
    }

    fn linear_add_rule(&self, state: &mut LinearState, rule: &Rule, idx: usize) {
        state.head_index.add(rule.head(), idx);
        for lit in rule.literals() {
            state.tail_index.add(&lit.atom, idx);
        }
        let (can_remove, can_expand) = self.linear_flags(rule);
        state.can_remove[idx] = can_remove;
        state.can_expand[idx] = can_expand;
    }

    fn linear_del_rule(state: &mut LinearState, rule: &Rule, idx: usize) {
        state.head_index.remove(rule.head(), idx);
        for lit in rule.literals() {
            state.tail_index.remove(&lit.atom, idx);
        }
    }

    /// Rule indices whose indexed atom unifies with `probe`
    fn unifying_positions(
        &mut self,
        index: &AtomIndex,
        probe: &Atom,
        var_cnt: u32,
    ) -> Vec<usize> {
        let mut hits = Vec::new();
        for (atom, occurrences) in index.entries() {
            if atom.predicate != probe.predicate {
                continue;
            }
            if self.resolver.atoms_unify(probe, atom, var_cnt) {
                hits.extend_from_slice(occurrences);
            }
        }
        hits
    }

    /// The linear fusion pass. Consumes the rule set and returns the new
    /// set plus whether anything was fused.
    pub(crate) fn inline_linear(&mut self, rules: RuleSet) -> (RuleSet, bool) {
        let sz = rules.len();
        let mut acc: Vec<Rule> = rules.into_rules();

        let mut state = LinearState {
            valid: vec![true; sz],
            can_remove: vec![false; sz],
            can_expand: vec![false; sz],
            ..LinearState::default()
        };
        for (i, rule) in acc.iter().enumerate() {
            self.linear_add_rule(&mut state, rule, i);
        }

        // The shared substitution buffer is sized by the largest variable
        // space seen so far; fused rules can only grow it
        let mut max_var_cnt: u32 = acc.iter().map(Rule::var_count).max().unwrap_or(0);

        let allow_branching = self.config.inline_linear_branch;
        let mut done_something = false;

        for i in 0..sz {
            loop {
                if !state.valid[i] || !state.can_expand[i] {
                    break;
                }

                let probe = acc[i].literals()[0].atom.clone();
                let head_unifiers =
                    self.unifying_positions(&state.head_index, &probe, max_var_cnt);
                if head_unifiers.len() != 1 {
                    trace!(count = head_unifiers.len(), "linear_no_unique_definition");
                    break;
                }
                let j = head_unifiers[0];
                if !state.can_remove[j] || !state.valid[j] || i == j {
                    break;
                }

                // The consumed head must feed only this body position
                // unless branching is allowed
                let consumer_probe = acc[j].head().clone();
                let tail_unifiers =
                    self.unifying_positions(&state.tail_index, &consumer_probe, max_var_cnt);
                let num_consumers = tail_unifiers.len();
                if !allow_branching && num_consumers != 1 {
                    trace!(count = num_consumers, "linear_multiple_consumers");
                    break;
                }

                let outcome = self.resolver.resolve(&acc[i], 0, &acc[j]);
                let ResolveOutcome::Resolved(fused) = outcome else {
                    // Failed or unsatisfiable fusion keeps the rule as is
                    break;
                };
                done_something = true;
                let step = self.resolve_step(&acc[i], &acc[j], 0, &fused);
                self.record_resolve(&step);
                debug!(slot = i, consumed = j, "linear_fused");

                Self::linear_del_rule(&mut state, &acc[i], i);
                self.linear_add_rule(&mut state, &fused, i);
                let inherited = state.can_expand[j];
                acc[i] = fused;
                state.can_expand[i] = inherited;

                if num_consumers == 1 {
                    state.valid[j] = false;
                    self.record_delete(&acc[j]);
                    Self::linear_del_rule(&mut state, &acc[j], j);
                }

                max_var_cnt = max_var_cnt.max(acc[i].var_count());
            }
        }

        if !done_something {
            return (RuleSet::from_rules(acc), false);
        }
        let mut out = RuleSet::new();
        for (i, rule) in acc.into_iter().enumerate() {
            if state.valid[i] {
                out.add_rule(rule);
            }
        }
        (out, true)
    }
}
