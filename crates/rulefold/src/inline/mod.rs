//! The rule inlining engine.
//!
//! Eliminates selected intermediate predicates from a stratified rule set
//! by resolving their defining rules into the rules that reference them.
//! Three passes run in sequence over the source set:
//!
//! 1. planned mutual inlining (the planner picks the predicates to
//!    eliminate and pre-computes their inlined definitions),
//! 2. eager inlining of unique-definition tail atoms,
//! 3. linear fusion of single-literal rules.
//!
//! Deletions and resolution steps are reported to the converters
//! throughout.

pub mod eager;
pub mod linear;
pub mod planner;
pub mod stats;
pub mod transform;

use crate::config::InlinerConfig;
use crate::converter::{Converter, ModelConverter, ProofConverter, ResolveStep};
use crate::error::Result;
use crate::logic::{Predicate, Rule};
use crate::resolve::Resolver;
use crate::ruleset::RuleSet;
use indexmap::IndexSet;
use self::stats::OccurrenceStats;
use tracing::debug;

/// The inlining engine. Single-threaded; owns all working state for one
/// transformation and is consumed by reading the converters afterwards.
pub struct RuleInliner {
    config: InlinerConfig,
    output_preds: IndexSet<Predicate>,
    fact_preds: IndexSet<Predicate>,
    stats: OccurrenceStats,
    forbidden_preds: IndexSet<Predicate>,
    inlined_rules: RuleSet,
    resolver: Resolver,
    model_converter: ModelConverter,
    proof_converter: ProofConverter,
}

impl RuleInliner {
    /// `output_preds` are the predicates whose answers must be preserved;
    /// `fact_preds` are the predicates that also have extensional facts.
    pub fn new(
        config: InlinerConfig,
        output_preds: IndexSet<Predicate>,
        fact_preds: IndexSet<Predicate>,
    ) -> Self {
        let fix_unbound_vars = config.fix_unbound_vars;
        RuleInliner {
            config,
            output_preds,
            fact_preds,
            stats: OccurrenceStats::default(),
            forbidden_preds: IndexSet::new(),
            inlined_rules: RuleSet::new(),
            resolver: Resolver::new(fix_unbound_vars),
            model_converter: ModelConverter::new(),
            proof_converter: ProofConverter::new(),
        }
    }

    /// Run the transformation. Returns `Ok(None)` when no pass changed
    /// anything, in which case the caller keeps the input.
    pub fn apply(&mut self, source: &RuleSet) -> Result<Option<RuleSet>> {
        if source.is_empty() {
            return Ok(Some(RuleSet::new()));
        }

        self.plan_inlining(source)?;

        let mut res = RuleSet::new();
        let mut progress = self.transform_rules(source, &mut res);

        // The transformation preserves negation stratification
        res.close()?;

        // Eager inlining to fixpoint. Each sweep sees the entire current
        // rule set, freshly closed; that is what justifies deleting rules
        // whose tail atom has no unifiable definition and no facts.
        loop {
            if !self.eager_sweep(&mut res) {
                break;
            }
            progress = true;
            res.close()?;
        }

        if self.config.inline_linear {
            let (fused, changed) = self.inline_linear(res);
            res = fused;
            progress |= changed;
        }

        if !progress {
            debug!("no_change");
            return Ok(None);
        }
        res.close()?;
        Ok(Some(res))
    }

    /// Rules deleted during the transformation
    pub fn model_converter(&self) -> &ModelConverter {
        &self.model_converter
    }

    /// Resolution steps performed during the transformation
    pub fn proof_converter(&self) -> &ProofConverter {
        &self.proof_converter
    }

    pub(crate) fn record_delete(&mut self, rule: &Rule) {
        self.model_converter.append_delete(rule);
        self.proof_converter.append_delete(rule);
    }

    pub(crate) fn record_resolve(&mut self, step: &ResolveStep) {
        self.model_converter.append_resolve(step);
        self.proof_converter.append_resolve(step);
    }

    /// Build the ledger entry for a just-completed `resolve` call. Must be
    /// invoked before the resolver's substitution is reused.
    pub(crate) fn resolve_step(
        &self,
        target: &Rule,
        source: &Rule,
        tail_index: usize,
        result: &Rule,
    ) -> ResolveStep {
        use crate::logic::Side;
        ResolveStep {
            target: target.clone(),
            source: source.clone(),
            tail_index,
            target_subst: self.resolver.rule_subst(target, Side::Target),
            source_subst: self.resolver.rule_subst(source, Side::Source),
            result: result.clone(),
        }
    }
}
