//! Stratification of the predicate dependency graph.
//!
//! The head-to-tail dependency graph is decomposed into strongly connected
//! components; each component is a stratum of mutually recursive
//! predicates. Components are ordered bottom-up (dependencies first), so a
//! predicate's stratum index is higher the later it can be evaluated.
//! Negation is only admitted across strictly lower strata; a negative
//! dependency inside one component fails stratification.

use crate::error::{InlineError, Result};
use crate::logic::{Predicate, Rule};
use indexmap::{IndexMap, IndexSet};

/// Ordered strongly-connected-component decomposition of a rule set's
/// predicate dependency graph.
#[derive(Debug, Clone)]
pub struct Stratifier {
    strata: Vec<Vec<Predicate>>,
    stratum_of: IndexMap<Predicate, usize>,
}

impl Stratifier {
    /// Build the stratifier for `rules`, verifying negation
    /// stratification.
    pub fn build(rules: &[Rule]) -> Result<Stratifier> {
        // Nodes in deterministic first-appearance order
        let mut nodes: IndexSet<Predicate> = IndexSet::new();
        for rule in rules {
            nodes.insert(rule.head().predicate);
            for lit in rule.literals() {
                nodes.insert(lit.predicate());
            }
        }

        // Edges head -> tail predicate (dependency direction)
        let mut edges: Vec<IndexSet<usize>> = vec![IndexSet::new(); nodes.len()];
        for rule in rules {
            let from = nodes.get_index_of(&rule.head().predicate).unwrap_or(0);
            for lit in rule.literals() {
                let to = nodes.get_index_of(&lit.predicate()).unwrap_or(0);
                edges[from].insert(to);
            }
        }

        let sccs = tarjan(nodes.len(), &edges);

        let mut strata = Vec::with_capacity(sccs.len());
        let mut stratum_of = IndexMap::new();
        for (si, scc) in sccs.into_iter().enumerate() {
            let mut preds = Vec::with_capacity(scc.len());
            for node in scc {
                let pred = nodes[node];
                stratum_of.insert(pred, si);
                preds.push(pred);
            }
            strata.push(preds);
        }

        let strat = Stratifier { strata, stratum_of };

        // Negation only across strictly lower strata
        for rule in rules {
            let head_stratum = strat.stratum(rule.head().predicate);
            for lit in rule.literals() {
                if !lit.polarity && strat.stratum(lit.predicate()) == head_stratum {
                    return Err(InlineError::Unstratified(lit.predicate().id));
                }
            }
        }

        Ok(strat)
    }

    /// Stratum index of `pred`; higher means later. Predicates outside the
    /// graph sit in the bottom stratum.
    pub fn stratum(&self, pred: Predicate) -> usize {
        self.stratum_of.get(&pred).copied().unwrap_or(0)
    }

    /// Components in bottom-up order
    pub fn strata(&self) -> &[Vec<Predicate>] {
        &self.strata
    }
}

/// Tarjan's algorithm. Components are emitted dependencies-first, which is
/// exactly the bottom-up stratum order.
fn tarjan(n: usize, edges: &[IndexSet<usize>]) -> Vec<Vec<usize>> {
    struct State<'a> {
        edges: &'a [IndexSet<usize>],
        index: Vec<Option<u32>>,
        low: Vec<u32>,
        on_stack: Vec<bool>,
        stack: Vec<usize>,
        next: u32,
        sccs: Vec<Vec<usize>>,
    }

    fn connect(v: usize, st: &mut State<'_>) {
        st.index[v] = Some(st.next);
        st.low[v] = st.next;
        st.next += 1;
        st.stack.push(v);
        st.on_stack[v] = true;

        for wi in 0..st.edges[v].len() {
            let w = st.edges[v][wi];
            match st.index[w] {
                None => {
                    connect(w, st);
                    st.low[v] = st.low[v].min(st.low[w]);
                }
                Some(idx) if st.on_stack[w] => {
                    st.low[v] = st.low[v].min(idx);
                }
                Some(_) => {}
            }
        }

        if Some(st.low[v]) == st.index[v] {
            let mut scc = Vec::new();
            loop {
                let w = match st.stack.pop() {
                    Some(w) => w,
                    None => break,
                };
                st.on_stack[w] = false;
                scc.push(w);
                if w == v {
                    break;
                }
            }
            st.sccs.push(scc);
        }
    }

    let mut st = State {
        edges,
        index: vec![None; n],
        low: vec![0; n],
        on_stack: vec![false; n],
        stack: Vec::new(),
        next: 0,
        sccs: Vec::new(),
    };
    for v in 0..n {
        if st.index[v].is_none() {
            connect(v, &mut st);
        }
    }
    st.sccs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Atom, Interner, Literal, Term};

    struct Ctx {
        interner: Interner,
    }

    impl Ctx {
        fn new() -> Self {
            Ctx {
                interner: Interner::new(),
            }
        }

        fn pred(&mut self, name: &str) -> Predicate {
            Predicate::new(self.interner.intern_predicate(name), 1)
        }

        fn atom(&mut self, name: &str) -> Atom {
            let p = self.pred(name);
            Atom::new(p, vec![Term::Var(0)])
        }

        fn rule(&mut self, head: &str, pos: &[&str], neg: &[&str]) -> Rule {
            let head = self.atom(head);
            let mut literals = Vec::new();
            for p in pos {
                literals.push(Literal::positive(self.atom(p)));
            }
            for n in neg {
                literals.push(Literal::negative(self.atom(n)));
            }
            Rule::new(head, literals, vec![])
        }
    }

    #[test]
    fn test_dependencies_come_first() {
        let mut ctx = Ctx::new();
        // path :- edge.   path :- path, edge.
        let rules = vec![
            ctx.rule("path", &["edge"], &[]),
            ctx.rule("path", &["path", "edge"], &[]),
        ];
        let strat = Stratifier::build(&rules).unwrap();

        let edge = ctx.pred("edge");
        let path = ctx.pred("path");
        assert!(strat.stratum(edge) < strat.stratum(path));
    }

    #[test]
    fn test_mutual_recursion_single_component() {
        let mut ctx = Ctx::new();
        // a :- b.   b :- a.   c :- a.
        let rules = vec![
            ctx.rule("a", &["b"], &[]),
            ctx.rule("b", &["a"], &[]),
            ctx.rule("c", &["a"], &[]),
        ];
        let strat = Stratifier::build(&rules).unwrap();

        let a = ctx.pred("a");
        let b = ctx.pred("b");
        let c = ctx.pred("c");
        assert_eq!(strat.stratum(a), strat.stratum(b));
        assert!(strat.stratum(a) < strat.stratum(c));

        let big: Vec<_> = strat.strata().iter().filter(|s| s.len() > 1).collect();
        assert_eq!(big.len(), 1);
        assert_eq!(big[0].len(), 2);
    }

    #[test]
    fn test_self_loop_is_singleton_component() {
        let mut ctx = Ctx::new();
        let rules = vec![ctx.rule("p", &["p"], &[])];
        let strat = Stratifier::build(&rules).unwrap();
        assert_eq!(strat.strata().len(), 1);
        assert_eq!(strat.strata()[0].len(), 1);
    }

    #[test]
    fn test_negation_across_strata_ok() {
        let mut ctx = Ctx::new();
        // q :- r, ~p.   p :- r.
        let rules = vec![
            ctx.rule("q", &["r"], &["p"]),
            ctx.rule("p", &["r"], &[]),
        ];
        let strat = Stratifier::build(&rules).unwrap();
        assert!(strat.stratum(ctx.pred("p")) < strat.stratum(ctx.pred("q")));
    }

    #[test]
    fn test_negation_cycle_fails() {
        let mut ctx = Ctx::new();
        // p :- ~q.   q :- p.
        let rules = vec![
            ctx.rule("p", &[], &["q"]),
            ctx.rule("q", &["p"], &[]),
        ];
        assert!(matches!(
            Stratifier::build(&rules),
            Err(InlineError::Unstratified(_))
        ));
    }
}
