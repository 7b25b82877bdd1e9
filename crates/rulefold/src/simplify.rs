//! Interpreted-tail simplifier.
//!
//! Constant-folds the interpreted conjuncts of a rule and performs a local
//! satisfiability check: a conjunct folding to `false`, or a pair of
//! directly complementary conjuncts, makes the rule body unsatisfiable.
//! Comparisons fold on identical terms and on atomic ground values; ground
//! terms of the Datalog term algebra are equal exactly when they are
//! syntactically equal.

use crate::logic::{CmpOp, Constraint, Rule, Term};

/// Simplify the interpreted tail of `rule`. Returns `None` when the
/// interpreted conjuncts are unsatisfiable, otherwise the rule with `true`
/// conjuncts dropped and the rest folded.
pub fn simplify_rule(rule: Rule) -> Option<Rule> {
    let (head, literals, constraints, role) = rule.into_parts();

    let mut kept: Vec<Constraint> = Vec::with_capacity(constraints.len());
    for constraint in constraints {
        match fold(constraint) {
            Constraint::Lit(true) => {}
            Constraint::Lit(false) => return None,
            c => kept.push(c),
        }
    }

    for i in 0..kept.len() {
        for j in (i + 1)..kept.len() {
            if complementary(&kept[i], &kept[j]) {
                return None;
            }
        }
    }

    Some(Rule::assemble(head, literals, kept, role))
}

/// Fold a single conjunct
fn fold(constraint: Constraint) -> Constraint {
    match constraint {
        Constraint::Lit(b) => Constraint::Lit(b),
        Constraint::Cmp(op, a, b) => fold_cmp(op, a, b),
        Constraint::Exists(n, body) => {
            let mut kept = Vec::with_capacity(body.len());
            for c in body {
                match fold(c) {
                    Constraint::Lit(true) => {}
                    Constraint::Lit(false) => return Constraint::Lit(false),
                    c => kept.push(c),
                }
            }
            if kept.is_empty() {
                Constraint::Lit(true)
            } else {
                Constraint::Exists(n, kept)
            }
        }
    }
}

fn fold_cmp(op: CmpOp, a: Term, b: Term) -> Constraint {
    match op {
        CmpOp::Eq => {
            if a == b {
                Constraint::Lit(true)
            } else if distinct_values(&a, &b) {
                Constraint::Lit(false)
            } else {
                Constraint::Cmp(op, a, b)
            }
        }
        CmpOp::Ne => {
            if a == b {
                Constraint::Lit(false)
            } else if distinct_values(&a, &b) {
                Constraint::Lit(true)
            } else {
                Constraint::Cmp(op, a, b)
            }
        }
        CmpOp::Lt => match (&a, &b) {
            (Term::Int(x), Term::Int(y)) => Constraint::Lit(x < y),
            _ if a == b => Constraint::Lit(false),
            _ => Constraint::Cmp(op, a, b),
        },
        CmpOp::Le => match (&a, &b) {
            (Term::Int(x), Term::Int(y)) => Constraint::Lit(x <= y),
            _ if a == b => Constraint::Lit(true),
            _ => Constraint::Cmp(op, a, b),
        },
    }
}

/// Distinct atomic ground values (ints and symbolic constants)
fn distinct_values(a: &Term, b: &Term) -> bool {
    a.is_atomic_value() && b.is_atomic_value() && a != b
}

/// Two folded conjuncts that cannot hold together
fn complementary(a: &Constraint, b: &Constraint) -> bool {
    let (Constraint::Cmp(op_a, a1, a2), Constraint::Cmp(op_b, b1, b2)) = (a, b) else {
        return false;
    };
    let same = a1 == b1 && a2 == b2;
    let swapped = a1 == b2 && a2 == b1;
    match (op_a, op_b) {
        // = and != over the same pair (either orientation, both symmetric)
        (CmpOp::Eq, CmpOp::Ne) | (CmpOp::Ne, CmpOp::Eq) => same || swapped,
        // a < b together with b <= a, or with b < a
        (CmpOp::Lt, CmpOp::Le) | (CmpOp::Le, CmpOp::Lt) | (CmpOp::Lt, CmpOp::Lt) => swapped,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Atom, Interner, Predicate};

    fn plain_rule(constraints: Vec<Constraint>) -> Rule {
        let mut interner = Interner::new();
        let p = Predicate::new(interner.intern_predicate("p"), 1);
        Rule::new(Atom::new(p, vec![Term::Var(0)]), vec![], constraints)
    }

    #[test]
    fn test_reflexive_disequality_is_unsat() {
        let rule = plain_rule(vec![Constraint::Cmp(CmpOp::Ne, Term::Var(0), Term::Var(0))]);
        assert!(simplify_rule(rule).is_none());
    }

    #[test]
    fn test_true_conjuncts_dropped() {
        let rule = plain_rule(vec![
            Constraint::Cmp(CmpOp::Eq, Term::Int(1), Term::Int(1)),
            Constraint::Cmp(CmpOp::Lt, Term::Var(0), Term::Int(5)),
        ]);
        let simplified = simplify_rule(rule).unwrap();
        assert_eq!(simplified.constraints().len(), 1);
        assert!(matches!(
            simplified.constraints()[0],
            Constraint::Cmp(CmpOp::Lt, ..)
        ));
    }

    #[test]
    fn test_ground_folding() {
        assert!(simplify_rule(plain_rule(vec![Constraint::Cmp(
            CmpOp::Lt,
            Term::Int(3),
            Term::Int(2)
        )]))
        .is_none());

        let mut interner = Interner::new();
        let a = Term::Const(interner.intern_constant("a"));
        let b = Term::Const(interner.intern_constant("b"));
        assert!(simplify_rule(plain_rule(vec![Constraint::Cmp(CmpOp::Eq, a, b)])).is_none());
    }

    #[test]
    fn test_complementary_pair_is_unsat() {
        let eq = Constraint::Cmp(CmpOp::Eq, Term::Var(0), Term::Int(1));
        let ne = Constraint::Cmp(CmpOp::Ne, Term::Int(1), Term::Var(0));
        assert!(simplify_rule(plain_rule(vec![eq, ne])).is_none());

        let lt = Constraint::Cmp(CmpOp::Lt, Term::Var(0), Term::Var(1));
        let le = Constraint::Cmp(CmpOp::Le, Term::Var(1), Term::Var(0));
        assert!(simplify_rule(plain_rule(vec![lt, le])).is_none());
    }

    #[test]
    fn test_quantified_body_folds() {
        let rule = plain_rule(vec![Constraint::Exists(
            1,
            vec![
                Constraint::Cmp(CmpOp::Eq, Term::Int(2), Term::Int(2)),
                Constraint::Cmp(CmpOp::Lt, Term::Bound(0), Term::Var(0)),
            ],
        )]);
        let simplified = simplify_rule(rule).unwrap();
        let Constraint::Exists(1, body) = &simplified.constraints()[0] else {
            panic!("expected quantifier to survive");
        };
        assert_eq!(body.len(), 1);

        let unsat = plain_rule(vec![Constraint::Exists(
            1,
            vec![Constraint::Cmp(CmpOp::Ne, Term::Var(0), Term::Var(0))],
        )]);
        assert!(simplify_rule(unsat).is_none());
    }

    #[test]
    fn test_undecided_comparisons_kept() {
        let rule = plain_rule(vec![Constraint::Cmp(CmpOp::Eq, Term::Var(0), Term::Int(7))]);
        let simplified = simplify_rule(rule).unwrap();
        assert_eq!(simplified.constraints().len(), 1);
    }
}
