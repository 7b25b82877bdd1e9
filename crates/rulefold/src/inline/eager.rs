//! Eager inlining of tail atoms with a unique unifiable definition.
//!
//! For each positive tail atom: when no definition unifies and the
//! predicate has no facts, the rule can never fire and is deleted; when
//! exactly one definition unifies and that definition is oriented (its
//! positive tail is strictly below its head in the (stratum, arity, id)
//! order, which rules out rewrite loops), it is inlined on the spot.
//! Several unifiable definitions would grow the rule count, so the atom is
//! skipped.

use super::RuleInliner;
use crate::logic::Rule;
use crate::resolve::ResolveOutcome;
use crate::ruleset::RuleSet;
use crate::stratify::Stratifier;
use tracing::{debug, trace};

/// What one eager step did to a rule
pub(crate) enum EagerStep {
    Replaced(Rule),
    Deleted,
}

impl RuleInliner {
    /// Is `rule` oriented as a rewriter: every positive tail atom strictly
    /// below the head in the lexicographic (stratum, arity, predicate id)
    /// order?
    pub(crate) fn is_oriented_rewriter(&self, rule: &Rule, strat: &Stratifier) -> bool {
        let head_pred = rule.head().predicate;
        let head_stratum = strat.stratum(head_pred);

        for ti in 0..rule.positive_len() {
            let pred = rule.tail_pred(ti);
            let pred_stratum = strat.stratum(pred);
            debug_assert!(pred_stratum <= head_stratum);
            if pred_stratum == head_stratum
                && (pred.arity > head_pred.arity
                    || (pred.arity == head_pred.arity && pred.id >= head_pred.id))
            {
                return false;
            }
        }
        true
    }

    /// Try one eager step on `rule`. `rules` must be the entire current
    /// rule set, closed.
    fn eager_step(&mut self, rule: &Rule, rules: &RuleSet) -> Option<EagerStep> {
        let head_pred = rule.head().predicate;

        for ti in 0..rule.positive_len() {
            let pred = rule.tail_pred(ti);
            if pred == head_pred || self.fact_preds.contains(&pred) {
                continue;
            }

            // Count the definitions unifying with this tail atom
            let mut candidate = None;
            let mut ambiguous = false;
            for &di in rules.rules_for(pred) {
                if !self.resolver.unifies(rule, ti, rules.rule(di)) {
                    continue;
                }
                if candidate.is_some() {
                    // Two inlinable definitions: skip the atom rather than
                    // grow the overall number of rules
                    ambiguous = true;
                    break;
                }
                candidate = Some(di);
            }
            if ambiguous {
                continue;
            }

            let Some(di) = candidate else {
                // Nothing unifies and the predicate has no ground facts
                // either: the rule is unsatisfiable
                debug!(pred = %pred.id, "eager_delete_unsatisfiable");
                self.record_delete(rule);
                return Some(EagerStep::Deleted);
            };

            let src = rules.rule(di);
            if !self.is_oriented_rewriter(src, rules.stratifier()) {
                // Inlining an unoriented definition can loop forever
                trace!(pred = %pred.id, "eager_skip_unoriented");
                continue;
            }

            match self.resolver.resolve(rule, ti, src) {
                ResolveOutcome::Resolved(res) => {
                    let step = self.resolve_step(rule, src, ti, &res);
                    self.record_resolve(&step);
                    return Some(EagerStep::Replaced(res));
                }
                ResolveOutcome::Unsat => {
                    self.record_delete(rule);
                    return Some(EagerStep::Deleted);
                }
                ResolveOutcome::NotApplicable => {
                    // The definition carries quantifiers; leave the atom
                    continue;
                }
            }
        }
        None
    }

    /// One sweep over the whole set; every changed rule restarts its own
    /// tail scan. Returns whether anything changed; the driver iterates to
    /// fixpoint, re-closing in between.
    pub(crate) fn eager_sweep(&mut self, rules: &mut RuleSet) -> bool {
        let mut out = Vec::with_capacity(rules.len());
        let mut changed = false;

        for rule in rules.iter() {
            let mut current = rule.clone();
            let mut deleted = false;
            loop {
                match self.eager_step(&current, rules) {
                    Some(EagerStep::Replaced(res)) => {
                        current = res;
                        changed = true;
                    }
                    Some(EagerStep::Deleted) => {
                        deleted = true;
                        changed = true;
                        break;
                    }
                    None => break,
                }
            }
            if !deleted {
                out.push(current);
            }
        }

        if changed {
            *rules = RuleSet::from_rules(out);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InlinerConfig;
    use crate::logic::{Atom, CmpOp, Constraint, Interner, Literal, Predicate, Term};
    use indexmap::IndexSet;

    struct Ctx {
        interner: Interner,
    }

    impl Ctx {
        fn new() -> Self {
            Ctx {
                interner: Interner::new(),
            }
        }

        fn pred(&mut self, name: &str, arity: u32) -> Predicate {
            Predicate::new(self.interner.intern_predicate(name), arity)
        }

        fn atom(&mut self, name: &str, args: Vec<Term>) -> Atom {
            let p = self.pred(name, args.len() as u32);
            Atom::new(p, args)
        }
    }

    fn engine() -> RuleInliner {
        RuleInliner::new(InlinerConfig::default(), IndexSet::new(), IndexSet::new())
    }

    #[test]
    fn test_unsatisfiable_tail_deletes_rule() {
        let mut ctx = Ctx::new();
        // P(x) :- Q(x,x).   Q(a,b) :- a != b.   Q has no facts.
        let p_rule = Rule::new(
            ctx.atom("P", vec![Term::Var(0)]),
            vec![Literal::positive(
                ctx.atom("Q", vec![Term::Var(0), Term::Var(0)]),
            )],
            vec![],
        );
        let q_rule = Rule::new(
            ctx.atom("Q", vec![Term::Var(0), Term::Var(1)]),
            vec![],
            vec![Constraint::Cmp(CmpOp::Ne, Term::Var(0), Term::Var(1))],
        );

        let mut rules = RuleSet::new();
        rules.add_rule(p_rule);
        rules.add_rule(q_rule);
        rules.close().unwrap();

        let mut inliner = engine();
        assert!(inliner.eager_sweep(&mut rules));

        // P's rule is gone (resolving gave an unsatisfiable body) and the
        // deletion was reported
        let p = ctx.pred("P", 1);
        assert!(rules.iter().all(|r| r.head().predicate != p));
        assert_eq!(inliner.model_converter().deleted().len(), 1);
        assert_eq!(
            inliner.model_converter().deleted()[0].head().predicate,
            p
        );
    }

    #[test]
    fn test_no_unifiable_definition_deletes_rule() {
        let mut ctx = Ctx::new();
        let a = Term::Const(ctx.interner.intern_constant("a"));
        let b = Term::Const(ctx.interner.intern_constant("b"));

        // P(x) :- Q(a).   Q(b).   Q(a) never holds.
        let p_rule = Rule::new(
            ctx.atom("P", vec![Term::Var(0)]),
            vec![Literal::positive(ctx.atom("Q", vec![a]))],
            vec![],
        );
        let q_rule = Rule::new(ctx.atom("Q", vec![b]), vec![], vec![]);

        let mut rules = RuleSet::new();
        rules.add_rule(p_rule);
        rules.add_rule(q_rule);
        rules.close().unwrap();

        let mut inliner = engine();
        assert!(inliner.eager_sweep(&mut rules));
        let p = ctx.pred("P", 1);
        assert!(rules.iter().all(|r| r.head().predicate != p));
        assert_eq!(inliner.model_converter().deleted().len(), 1);
    }

    #[test]
    fn test_unique_definition_inlined() {
        let mut ctx = Ctx::new();
        // big(x,y) :- small(x), small(y).   small(z) :- z < 3.
        // small is below big in the (stratum, arity, id) order.
        let big_rule = Rule::new(
            ctx.atom("big", vec![Term::Var(0), Term::Var(1)]),
            vec![
                Literal::positive(ctx.atom("small", vec![Term::Var(0)])),
                Literal::positive(ctx.atom("small", vec![Term::Var(1)])),
            ],
            vec![],
        );
        let small_rule = Rule::new(
            ctx.atom("small", vec![Term::Var(0)]),
            vec![],
            vec![Constraint::Cmp(CmpOp::Lt, Term::Var(0), Term::Int(3))],
        );

        let mut rules = RuleSet::new();
        rules.add_rule(big_rule);
        rules.add_rule(small_rule.clone());
        rules.close().unwrap();

        let mut inliner = engine();
        assert!(inliner.eager_sweep(&mut rules));

        let big = ctx.pred("big", 2);
        let fused = rules
            .iter()
            .find(|r| r.head().predicate == big)
            .expect("big survives");
        // Both small atoms were replaced by their constraint
        assert!(fused.literals().is_empty());
        assert_eq!(fused.constraints().len(), 2);
        // small's definition itself is untouched by this pass
        assert!(rules.iter().any(|r| *r == small_rule));
    }

    #[test]
    fn test_fact_predicates_skipped() {
        let mut ctx = Ctx::new();
        let p_rule = Rule::new(
            ctx.atom("P", vec![Term::Var(0)]),
            vec![Literal::positive(ctx.atom("Q", vec![Term::Var(0)]))],
            vec![],
        );

        // Q has no rules but has facts: the empty-definition deletion must
        // not fire
        let q = ctx.pred("Q", 1);
        let mut rules = RuleSet::new();
        rules.add_rule(p_rule.clone());
        rules.close().unwrap();

        let mut inliner = RuleInliner::new(
            InlinerConfig::default(),
            IndexSet::new(),
            [q].into_iter().collect::<IndexSet<_>>(),
        );
        assert!(!inliner.eager_sweep(&mut rules));
        assert_eq!(rules.len(), 1);
        assert!(inliner.model_converter().is_empty());
    }

    #[test]
    fn test_self_recursive_rule_passes_through() {
        let mut ctx = Ctx::new();
        // p(x) :- p(x). The head predicate check skips the atom.
        let p_rule = Rule::new(
            ctx.atom("p", vec![Term::Var(0)]),
            vec![Literal::positive(ctx.atom("p", vec![Term::Var(0)]))],
            vec![],
        );
        let mut rules = RuleSet::new();
        rules.add_rule(p_rule);
        rules.close().unwrap();

        let mut inliner = engine();
        assert!(!inliner.eager_sweep(&mut rules));
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_orientation_check() {
        let mut ctx = Ctx::new();
        // wide(x,y) has arity 2; narrow(x) arity 1. A definition of
        // narrow in terms of wide within one stratum is not oriented.
        let narrow_from_wide = Rule::new(
            ctx.atom("narrow", vec![Term::Var(0)]),
            vec![Literal::positive(
                ctx.atom("wide", vec![Term::Var(0), Term::Var(0)]),
            )],
            vec![],
        );
        let wide_from_narrow = Rule::new(
            ctx.atom("wide", vec![Term::Var(0), Term::Var(1)]),
            vec![Literal::positive(ctx.atom("narrow", vec![Term::Var(0)]))],
            vec![],
        );

        // Mutually recursive: one stratum
        let mut rules = RuleSet::new();
        rules.add_rule(narrow_from_wide.clone());
        rules.add_rule(wide_from_narrow.clone());
        rules.close().unwrap();

        let inliner = engine();
        let strat = rules.stratifier();
        assert!(!inliner.is_oriented_rewriter(&narrow_from_wide, strat));
        assert!(inliner.is_oriented_rewriter(&wide_from_narrow, strat));
    }

    #[test]
    fn test_two_definitions_skip() {
        let mut ctx = Ctx::new();
        let p_rule = Rule::new(
            ctx.atom("P", vec![Term::Var(0)]),
            vec![Literal::positive(ctx.atom("Q", vec![Term::Var(0)]))],
            vec![],
        );
        let q1 = Rule::new(
            ctx.atom("Q", vec![Term::Var(0)]),
            vec![],
            vec![Constraint::Cmp(CmpOp::Lt, Term::Var(0), Term::Int(1))],
        );
        let q2 = Rule::new(
            ctx.atom("Q", vec![Term::Var(0)]),
            vec![],
            vec![Constraint::Cmp(CmpOp::Lt, Term::Int(1), Term::Var(0))],
        );

        let mut rules = RuleSet::new();
        rules.add_rule(p_rule);
        rules.add_rule(q1);
        rules.add_rule(q2);
        rules.close().unwrap();

        let mut inliner = engine();
        assert!(!inliner.eager_sweep(&mut rules));
        assert_eq!(rules.len(), 3);
    }
}
