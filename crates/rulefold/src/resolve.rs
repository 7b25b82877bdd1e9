//! Rule resolvent construction.
//!
//! `resolve(tgt, i, src)` unifies `tgt`'s positive tail atom at `i` with
//! `src`'s head and splices `src`'s tail into `tgt` in place of that atom:
//!
//! ```text
//! P(x) :- Q(y), phi(x,y)      Q(y) :- R(z), psi(y,z)
//! --------------------------------------------------
//!          P(x) :- R(z), phi(x,y), psi(y,z)
//! ```

use crate::logic::{Constraint, Literal, Rule, RuleUnifier, Side, Term};
use crate::simplify::simplify_rule;
use std::collections::HashSet;
use tracing::trace;

/// Outcome of a resolution attempt
#[derive(Debug)]
pub enum ResolveOutcome {
    /// The resolvent, simplified and variable-normalized
    Resolved(Rule),
    /// Unification succeeded but the interpreted tail is unsatisfiable
    Unsat,
    /// Unification failed, or `src` carries quantifiers
    NotApplicable,
}

/// Builds resolvents. Owns the reusable two-sided substitution buffer; the
/// engine is single-threaded, so one resolver serves all passes.
#[derive(Debug, Default)]
pub struct Resolver {
    unifier: RuleUnifier,
    fix_unbound_vars: bool,
}

impl Resolver {
    pub fn new(fix_unbound_vars: bool) -> Self {
        Resolver {
            unifier: RuleUnifier::new(),
            fix_unbound_vars,
        }
    }

    /// Attempt to resolve `tgt` at positive tail position `tail_index`
    /// against `src`.
    ///
    /// `tgt` must be variable-normalized; every rule held by a rule set is.
    pub fn resolve(&mut self, tgt: &Rule, tail_index: usize, src: &Rule) -> ResolveOutcome {
        debug_assert!(tail_index < tgt.positive_len());
        debug_assert!(tgt.literals()[tail_index].polarity);

        if src.has_quantifiers() {
            return ResolveOutcome::NotApplicable;
        }
        if !self.unifier.unify_rules(tgt, tail_index, src) {
            return ResolveOutcome::NotApplicable;
        }

        let head = self.unifier.apply_atom(tgt.head(), Side::Target);

        let mut literals = Vec::with_capacity(tgt.literals().len() + src.literals().len() - 1);
        for (i, lit) in tgt.literals().iter().enumerate() {
            if i != tail_index {
                literals.push(self.unifier.apply_literal(lit, Side::Target));
            }
        }
        for lit in src.literals() {
            literals.push(self.unifier.apply_literal(lit, Side::Source));
        }

        let mut constraints = Vec::with_capacity(tgt.constraints().len() + src.constraints().len());
        for c in tgt.constraints() {
            constraints.push(self.unifier.apply_constraint(c, Side::Target));
        }
        for c in src.constraints() {
            constraints.push(self.unifier.apply_constraint(c, Side::Source));
        }

        remove_duplicate_literals(&mut literals);
        remove_duplicate_constraints(&mut constraints);

        let mut rule = Rule::derived(head, literals, constraints);
        if self.fix_unbound_vars {
            rule.fix_unbound_vars();
        }

        match simplify_rule(rule) {
            Some(rule) => {
                trace!(tail_index, "resolved");
                ResolveOutcome::Resolved(rule)
            }
            None => {
                trace!(tail_index, "resolvent_unsat");
                ResolveOutcome::Unsat
            }
        }
    }

    /// Test whether `tgt`'s tail atom at `tail_index` unifies with `src`'s
    /// head, without building the resolvent.
    pub fn unifies(&mut self, tgt: &Rule, tail_index: usize, src: &Rule) -> bool {
        self.unifier.unify_rules(tgt, tail_index, src)
    }

    /// Atom-level unification probe for the linear-pass indices. `var_cnt`
    /// must cover the variable spaces of both owning rules.
    pub(crate) fn atoms_unify(
        &mut self,
        tgt_atom: &crate::logic::Atom,
        src_atom: &crate::logic::Atom,
        var_cnt: u32,
    ) -> bool {
        self.unifier.unify_atom_pair(tgt_atom, src_atom, var_cnt)
    }

    /// Per-variable substitution images of `rule`'s variables, for the
    /// proof ledger. Valid after a successful `resolve`.
    pub fn rule_subst(&self, rule: &Rule, side: Side) -> Vec<Term> {
        self.unifier.rule_subst(rule, side)
    }

    #[cfg(test)]
    pub(crate) fn set_offset_slack(&mut self, slack: u32) {
        self.unifier.offset_slack = slack;
    }
}

/// Collapse syntactically identical tail literals (same sign, same
/// structure); substitution commonly produces such duplicates.
fn remove_duplicate_literals(literals: &mut Vec<Literal>) {
    let mut seen = HashSet::new();
    literals.retain(|lit| seen.insert(lit.clone()));
}

fn remove_duplicate_constraints(constraints: &mut Vec<Constraint>) {
    let mut seen = HashSet::new();
    constraints.retain(|c| seen.insert(c.clone()));
}
