//! Horn rules: `head :- tail`.
//!
//! The tail is partitioned: positive literals first, then negative
//! literals, then interpreted conjuncts. Construction enforces the
//! partition and renumbers free variables densely from 0, so every rule
//! held by a rule set is variable-normalized. Rules are immutable value
//! objects; transformation produces new rules.

use super::constraint::Constraint;
use super::interner::Interner;
use super::literal::{Atom, Literal, Predicate};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::fmt;

/// Where a rule came from
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub enum RuleRole {
    /// Rule of the source program
    #[default]
    Input,
    /// Resolvent produced by an inlining pass
    Derived,
}

/// A Horn rule with a partitioned tail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    head: Atom,
    /// Uninterpreted tail, positive literals first
    literals: Vec<Literal>,
    positive_len: usize,
    /// Interpreted tail
    constraints: Vec<Constraint>,
    role: RuleRole,
}

impl Rule {
    /// Construct an input rule; partitions the tail and normalizes variables
    pub fn new(head: Atom, literals: Vec<Literal>, constraints: Vec<Constraint>) -> Self {
        Rule::assemble(head, literals, constraints, RuleRole::Input)
    }

    /// Construct a derived rule (a resolvent)
    pub fn derived(head: Atom, literals: Vec<Literal>, constraints: Vec<Constraint>) -> Self {
        Rule::assemble(head, literals, constraints, RuleRole::Derived)
    }

    pub(crate) fn assemble(
        head: Atom,
        mut literals: Vec<Literal>,
        constraints: Vec<Constraint>,
        role: RuleRole,
    ) -> Self {
        // Stable partition: positives keep their relative order, negatives
        // follow in theirs.
        let mut ordered = Vec::with_capacity(literals.len());
        let mut negatives = Vec::new();
        for lit in literals.drain(..) {
            if lit.polarity {
                ordered.push(lit);
            } else {
                negatives.push(lit);
            }
        }
        let positive_len = ordered.len();
        ordered.extend(negatives);

        let mut rule = Rule {
            head,
            literals: ordered,
            positive_len,
            constraints,
            role,
        };
        rule.norm_vars();
        rule
    }

    pub fn head(&self) -> &Atom {
        &self.head
    }

    /// The uninterpreted tail, positive prefix first
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// Length of the positive tail prefix
    pub fn positive_len(&self) -> usize {
        self.positive_len
    }

    /// The interpreted tail
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn role(&self) -> RuleRole {
        self.role
    }

    /// Predicate of the `i`-th uninterpreted tail literal
    pub fn tail_pred(&self, i: usize) -> Predicate {
        self.literals[i].atom.predicate
    }

    /// Total tail length, interpreted conjuncts included
    pub fn total_tail_len(&self) -> usize {
        self.literals.len() + self.constraints.len()
    }

    /// Largest free-variable index anywhere in the rule, if any
    pub fn max_var(&self) -> Option<u32> {
        let mut max = self.head.max_var();
        for lit in &self.literals {
            max = max.max(lit.atom.max_var());
        }
        for c in &self.constraints {
            max = max.max(c.max_var());
        }
        max
    }

    /// Number of distinct free variables (rules are normalized, so this is
    /// `max_var + 1`)
    pub fn var_count(&self) -> u32 {
        self.max_var().map_or(0, |m| m + 1)
    }

    /// Does any interpreted conjunct contain a quantifier?
    pub fn has_quantifiers(&self) -> bool {
        self.constraints.iter().any(Constraint::has_quantifiers)
    }

    /// Collect free variables in first-occurrence order: head, then
    /// uninterpreted tail, then interpreted tail
    pub fn collect_vars(&self, vars: &mut IndexSet<u32>) {
        self.head.collect_vars(vars);
        for lit in &self.literals {
            lit.atom.collect_vars(vars);
        }
        for c in &self.constraints {
            c.collect_vars(vars);
        }
    }

    /// Renumber free variables densely from 0 in first-occurrence order
    fn norm_vars(&mut self) {
        let mut vars = IndexSet::new();
        self.collect_vars(&mut vars);

        // Already dense and in order?
        if vars.iter().enumerate().all(|(i, &v)| i as u32 == v) {
            return;
        }

        let map: IndexMap<u32, u32> = vars
            .into_iter()
            .enumerate()
            .map(|(i, v)| (v, i as u32))
            .collect();
        let mut rename = |v: u32| map[&v];
        self.head.rename_vars(&mut rename);
        for lit in &mut self.literals {
            lit.atom.rename_vars(&mut rename);
        }
        for c in &mut self.constraints {
            c.rename_vars(&mut rename);
        }
    }

    /// Existentially quantify free variables that occur only in the
    /// interpreted tail.
    ///
    /// The affected conjuncts move under a single `Exists` binder with the
    /// unbound variables turned into `Bound` terms; the remaining free
    /// variables are renormalized. Bound indices are offset past any binder
    /// already present so nesting stays unambiguous.
    pub fn fix_unbound_vars(&mut self) {
        let mut bound_by_atoms = IndexSet::new();
        self.head.collect_vars(&mut bound_by_atoms);
        for lit in &self.literals {
            lit.atom.collect_vars(&mut bound_by_atoms);
        }

        let mut constraint_vars = IndexSet::new();
        for c in &self.constraints {
            c.collect_vars(&mut constraint_vars);
        }

        let unbound: Vec<u32> = constraint_vars
            .into_iter()
            .filter(|v| !bound_by_atoms.contains(v))
            .collect();
        if unbound.is_empty() {
            return;
        }

        let base = self
            .constraints
            .iter()
            .filter_map(Constraint::max_bound)
            .max()
            .map_or(0, |m| m + 1);
        let map: IndexMap<u32, u32> = unbound
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, base + i as u32))
            .collect();

        let mut quantified = Vec::new();
        let mut kept = Vec::new();
        for c in self.constraints.drain(..) {
            if unbound.iter().any(|&v| c.contains_var(v)) {
                quantified.push(c.map_terms(&mut |t| bind_vars(t, &map)));
            } else {
                kept.push(c);
            }
        }
        kept.push(Constraint::Exists(unbound.len() as u32, quantified));
        self.constraints = kept;
        self.norm_vars();
    }

    /// Decompose into parts; the simplifier reassembles via
    /// [`Rule::assemble`]
    pub(crate) fn into_parts(self) -> (Atom, Vec<Literal>, Vec<Constraint>, RuleRole) {
        (self.head, self.literals, self.constraints, self.role)
    }

    /// Format this rule with an interner for name resolution
    pub fn display<'a>(&'a self, interner: &'a Interner) -> RuleDisplay<'a> {
        RuleDisplay {
            rule: self,
            interner,
        }
    }
}

fn bind_vars(term: &super::term::Term, map: &IndexMap<u32, u32>) -> super::term::Term {
    use super::term::Term;
    match term {
        Term::Var(v) => match map.get(v) {
            Some(&b) => Term::Bound(b),
            None => term.clone(),
        },
        Term::Bound(_) | Term::Int(_) | Term::Const(_) => term.clone(),
        Term::App(f, args) => Term::App(*f, args.iter().map(|a| bind_vars(a, map)).collect()),
    }
}

/// Display wrapper resolving interned names
pub struct RuleDisplay<'a> {
    rule: &'a Rule,
    interner: &'a Interner,
}

impl fmt::Display for RuleDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rule.head.display(self.interner))?;
        if self.rule.total_tail_len() == 0 {
            return write!(f, ".");
        }
        write!(f, " :- ")?;
        let mut first = true;
        for lit in &self.rule.literals {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}", lit.display(self.interner))?;
        }
        for c in &self.rule.constraints {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}", c.display(self.interner))?;
        }
        write!(f, ".")
    }
}
