//! Two-sided substitution and unification for rule resolution.
//!
//! When a target rule's tail atom is unified with a source rule's head, the
//! two rules' variable spaces must not collide. Instead of renaming one
//! rule up front, variables are lifted into a joint space: target variables
//! keep their indices, source variables are shifted by `vmax + 1` where
//! `vmax` is the largest variable index of either rule. Bindings are stored
//! in a dense buffer over the joint space that is reset and resized per
//! unification rather than reallocated.

use super::constraint::Constraint;
use super::literal::{Atom, Literal};
use super::rule::Rule;
use super::term::Term;

/// Which rule a variable belongs to
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Target,
    Source,
}

/// Two-sided unifier with a reusable binding buffer.
///
/// Bindings map joint-space variables to joint-space terms. `apply_*`
/// produce joint-space results; rule construction renumbers them densely.
#[derive(Debug, Default)]
pub struct RuleUnifier {
    bindings: Vec<Option<Term>>,
    src_offset: u32,
    ready: bool,
    /// Extra headroom added to the source offset. The resolvent is
    /// invariant under this choice (up to renaming); tests exercise that.
    pub(crate) offset_slack: u32,
}

impl RuleUnifier {
    pub fn new() -> Self {
        RuleUnifier::default()
    }

    /// Did the last `unify_rules` / `unify_atom_pair` succeed?
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Offset applied to variables of `side` when lifting into the joint
    /// space
    pub fn offset(&self, side: Side) -> u32 {
        match side {
            Side::Target => 0,
            Side::Source => self.src_offset,
        }
    }

    /// Unify `tgt`'s tail atom at `tail_index` with `src`'s head.
    pub fn unify_rules(&mut self, tgt: &Rule, tail_index: usize, src: &Rule) -> bool {
        debug_assert!(tail_index < tgt.positive_len());
        let var_cnt = tgt.var_count().max(src.var_count());
        self.unify_atom_pair(&tgt.literals()[tail_index].atom, src.head(), var_cnt)
    }

    /// Unify a target-side atom with a source-side atom given the joint
    /// variable count of their rules.
    pub fn unify_atom_pair(&mut self, tgt_atom: &Atom, src_atom: &Atom, var_cnt: u32) -> bool {
        self.reset(var_cnt + self.offset_slack);

        if tgt_atom.predicate != src_atom.predicate || tgt_atom.args.len() != src_atom.args.len() {
            self.ready = false;
            return false;
        }
        for (a, b) in tgt_atom.args.iter().zip(src_atom.args.iter()) {
            let a = self.lift(a, Side::Target);
            let b = self.lift(b, Side::Source);
            if !self.unify_joint(&a, &b) {
                self.ready = false;
                return false;
            }
        }
        self.ready = true;
        true
    }

    fn reset(&mut self, var_cnt: u32) {
        self.src_offset = var_cnt;
        self.bindings.clear();
        self.bindings.resize(2 * var_cnt as usize, None);
        self.ready = false;
    }

    /// Shift a concrete term into the joint variable space
    fn lift(&self, term: &Term, side: Side) -> Term {
        let off = self.offset(side);
        if off == 0 {
            return term.clone();
        }
        let mut t = term.clone();
        t.rename_vars(&mut |v| v + off);
        t
    }

    /// Robinson unification on joint-space terms
    fn unify_joint(&mut self, a: &Term, b: &Term) -> bool {
        let a = self.resolve(a);
        let b = self.resolve(b);

        match (&a, &b) {
            _ if a == b => true,

            (Term::Var(v), t) | (t, Term::Var(v)) => {
                if t.contains_var(*v) {
                    return false; // occurs check
                }
                self.bindings[*v as usize] = Some(t.clone());
                true
            }

            (Term::App(f, args_a), Term::App(g, args_b)) => {
                if f != g || args_a.len() != args_b.len() {
                    return false;
                }
                for (x, y) in args_a.iter().zip(args_b.iter()) {
                    if !self.unify_joint(x, y) {
                        return false;
                    }
                }
                true
            }

            // Distinct atomic values, or a bound variable leaking into an
            // atom (cannot happen for well-formed rules)
            _ => false,
        }
    }

    /// Fully apply the current bindings to a joint-space term
    fn resolve(&self, term: &Term) -> Term {
        match term {
            Term::Var(v) => match self.bindings.get(*v as usize).and_then(|b| b.as_ref()) {
                Some(bound) => self.resolve(bound),
                None => term.clone(),
            },
            Term::Bound(_) | Term::Int(_) | Term::Const(_) => term.clone(),
            Term::App(f, args) => {
                Term::App(*f, args.iter().map(|a| self.resolve(a)).collect())
            }
        }
    }

    /// Apply the substitution to a concrete term of `side`, producing a
    /// joint-space term
    pub fn apply_term(&self, term: &Term, side: Side) -> Term {
        let lifted = self.lift(term, side);
        self.resolve(&lifted)
    }

    /// Apply the substitution to an atom of `side`
    pub fn apply_atom(&self, atom: &Atom, side: Side) -> Atom {
        Atom {
            predicate: atom.predicate,
            args: atom.args.iter().map(|a| self.apply_term(a, side)).collect(),
        }
    }

    /// Apply the substitution to a literal of `side`, preserving polarity
    pub fn apply_literal(&self, literal: &Literal, side: Side) -> Literal {
        Literal {
            atom: self.apply_atom(&literal.atom, side),
            polarity: literal.polarity,
        }
    }

    /// Apply the substitution to an interpreted conjunct of `side`. Bound
    /// variables under quantifiers are untouched.
    pub fn apply_constraint(&self, constraint: &Constraint, side: Side) -> Constraint {
        constraint.map_terms(&mut |t| self.apply_term(t, side))
    }

    /// Image of every variable of `rule` under the substitution, for the
    /// proof ledger. Results are in the joint space of the resolvent before
    /// normalization.
    pub fn rule_subst(&self, rule: &Rule, side: Side) -> Vec<Term> {
        (0..rule.var_count())
            .map(|v| self.apply_term(&Term::Var(v), side))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::interner::Interner;
    use crate::logic::literal::Predicate;
    use crate::logic::rule::Rule;
    use crate::logic::term::FunctionSymbol;

    struct Ctx {
        interner: Interner,
    }

    impl Ctx {
        fn new() -> Self {
            Ctx {
                interner: Interner::new(),
            }
        }

        fn atom(&mut self, name: &str, args: Vec<Term>) -> Atom {
            let p = Predicate::new(self.interner.intern_predicate(name), args.len() as u32);
            Atom::new(p, args)
        }

        fn func(&mut self, name: &str, args: Vec<Term>) -> Term {
            let id = self.interner.intern_function(name);
            Term::App(FunctionSymbol::new(id, args.len() as u32), args)
        }

        fn cnst(&mut self, name: &str) -> Term {
            Term::Const(self.interner.intern_constant(name))
        }
    }

    #[test]
    fn test_same_index_different_sides_are_distinct() {
        let mut ctx = Ctx::new();
        let a = ctx.cnst("a");

        // p(X0, a) as target tail vs p(a, X0) as source head:
        // X0@Target and X0@Source are different variables.
        let tgt_atom = ctx.atom("p", vec![Term::Var(0), a.clone()]);
        let src_atom = ctx.atom("p", vec![a.clone(), Term::Var(0)]);

        let mut unifier = RuleUnifier::new();
        assert!(unifier.unify_atom_pair(&tgt_atom, &src_atom, 1));
        assert_eq!(unifier.apply_term(&Term::Var(0), Side::Target), a);
        assert_eq!(unifier.apply_term(&Term::Var(0), Side::Source), a);
    }

    #[test]
    fn test_shared_binding_chases() {
        let mut ctx = Ctx::new();
        let a = ctx.cnst("a");
        let f_x = ctx.func("f", vec![Term::Var(0)]);

        // p(X0, f(X0)) vs p(a, X1): X0@T = a, X1@S = f(a)
        let tgt_atom = ctx.atom("p", vec![Term::Var(0), f_x.clone()]);
        let src_atom = ctx.atom("p", vec![a.clone(), Term::Var(1)]);

        let mut unifier = RuleUnifier::new();
        assert!(unifier.unify_atom_pair(&tgt_atom, &src_atom, 2));
        let f_a = ctx.func("f", vec![a.clone()]);
        assert_eq!(unifier.apply_term(&Term::Var(1), Side::Source), f_a);
    }

    #[test]
    fn test_occurs_check() {
        let mut ctx = Ctx::new();
        let f_x = ctx.func("f", vec![Term::Var(0)]);

        // p(X0) vs p(f(X0)) across sides unifies (the variables are
        // distinct) ...
        let tgt_atom = ctx.atom("p", vec![Term::Var(0)]);
        let src_atom = ctx.atom("p", vec![f_x.clone()]);
        let mut unifier = RuleUnifier::new();
        assert!(unifier.unify_atom_pair(&tgt_atom, &src_atom, 1));

        // ... but q(X0, X0) vs q(X1, f(X1)) forces X1@S = f(X1@S): occurs.
        let f_x1 = ctx.func("f", vec![Term::Var(1)]);
        let tgt_atom = ctx.atom("q", vec![Term::Var(0), Term::Var(0)]);
        let src_atom = ctx.atom("q", vec![Term::Var(1), f_x1]);
        assert!(!unifier.unify_atom_pair(&tgt_atom, &src_atom, 2));
    }

    #[test]
    fn test_function_clash() {
        let mut ctx = Ctx::new();
        let a = ctx.cnst("a");
        let fa = ctx.func("f", vec![a.clone()]);
        let ga = ctx.func("g", vec![a]);

        let tgt_atom = ctx.atom("p", vec![fa]);
        let src_atom = ctx.atom("p", vec![ga]);
        let mut unifier = RuleUnifier::new();
        assert!(!unifier.unify_atom_pair(&tgt_atom, &src_atom, 0));
    }

    #[test]
    fn test_predicate_mismatch() {
        let mut ctx = Ctx::new();
        let tgt_atom = ctx.atom("p", vec![Term::Var(0)]);
        let src_atom = ctx.atom("q", vec![Term::Var(0)]);
        let mut unifier = RuleUnifier::new();
        assert!(!unifier.unify_atom_pair(&tgt_atom, &src_atom, 1));
    }

    #[test]
    fn test_unify_rules_offsets() {
        let mut ctx = Ctx::new();
        // tgt: p(X0) :- q(X0).   src: q(f(X0)).
        let p_head = ctx.atom("p", vec![Term::Var(0)]);
        let q_tail = ctx.atom("q", vec![Term::Var(0)]);
        let tgt = Rule::new(p_head, vec![Literal::positive(q_tail)], vec![]);

        let f_x = ctx.func("f", vec![Term::Var(0)]);
        let q_head = ctx.atom("q", vec![f_x.clone()]);
        let src = Rule::new(q_head, vec![], vec![]);

        let mut unifier = RuleUnifier::new();
        assert!(unifier.unify_rules(&tgt, 0, &src));
        // X0@Target is bound to f(X0@Source); the source offset is vmax+1 = 1
        let expected = {
            let mut t = f_x.clone();
            t.rename_vars(&mut |v| v + unifier.offset(Side::Source));
            t
        };
        assert_eq!(unifier.apply_term(&Term::Var(0), Side::Target), expected);
    }

    #[test]
    fn test_binding_buffer_reuse() {
        let mut ctx = Ctx::new();
        let a = ctx.cnst("a");
        let b = ctx.cnst("b");

        let mut unifier = RuleUnifier::new();
        let tgt_atom = ctx.atom("p", vec![Term::Var(0)]);
        let src_atom = ctx.atom("p", vec![a.clone()]);
        assert!(unifier.unify_atom_pair(&tgt_atom, &src_atom, 1));
        assert_eq!(unifier.apply_term(&Term::Var(0), Side::Target), a);

        // A later unification must not see stale bindings
        let src_atom2 = ctx.atom("p", vec![b.clone()]);
        assert!(unifier.unify_atom_pair(&tgt_atom, &src_atom2, 1));
        assert_eq!(unifier.apply_term(&Term::Var(0), Side::Target), b);
    }
}
