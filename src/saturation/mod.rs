//! The given-clause saturation loop
//!
//! `Prover` owns the logical context, the clause sets, the index
//! registry, the rule lists and the event bus, and drives the given-clause
//! algorithm: pop the best passive clause, simplify it forward, simplify
//! the active set backward with it, activate it, generate inferences
//! against the active set, and push the surviving conclusions back into
//! the passive queue. The loop ends with a refutation (the empty clause),
//! saturation (passive drained), or budget exhaustion.
//!
//! Cancellation is cooperative: the token is polled between given-clause
//! steps, never mid-inference.

pub mod events;
pub mod profile;
pub mod state;

pub use events::{ClauseEventListener, EventBus};
pub use profile::SaturationProfile;
pub use state::{
    EventLog, GeneratingInference, Proof, ProofStep, RuleContext, SaturationState, Simplification,
    SimplifyingInference, StateChange,
};

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, trace};

use crate::config::{OrderingChoice, ProverConfig, SelectionStrategy};
use crate::index::Indexes;
use crate::inference::{
    EqualityFactoringRule, EqualityResolutionRule, FactoringRule, ResolutionRule,
    SuperpositionRule,
};
use crate::logic::clause::{Clause, ClauseId, Derivation};
use crate::logic::context::Context;
use crate::logic::interner::SignatureConflict;
use crate::logic::literal::Literal;
use crate::logic::ordering::{TermOrder, KBO, RPO};
use crate::logic::types::TypeError;
use crate::selection::{
    LiteralSelector, SelectAllNegative, SelectComplex, SelectFirstNegative, SelectNone,
};
use crate::simplifying::{DemodulationRule, SimplifyReflectRule, SubsumptionRule, TautologyRule};

/// User-visible and internal error kinds of the prover boundary.
#[derive(Debug, Clone, Error)]
pub enum ProverError {
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Signature(#[from] SignatureConflict),
    #[error("literal sides have different types")]
    IllTypedLiteral,
    #[error("invalid configuration: {0}")]
    Config(String),
    /// An invariant the calculus relies on was violated; the saturation
    /// is irrecoverable
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// Result of a saturation run.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The empty clause was derived; the proof DAG is attached
    Refutation(Proof),
    /// No rule produces a new non-redundant clause
    Saturated,
    /// Wall-clock, step or clause budget exhausted; the prover state
    /// stays valid and inspectable
    Timeout,
    /// User or internal error
    Error(ProverError),
}

/// Redundancy predicate plugin: a clause it accepts is discarded.
pub type RedundancyHook = Box<dyn Fn(&Context, &Clause) -> bool + Send + Sync>;

/// Per-problem saturation engine.
pub struct Prover {
    config: ProverConfig,
    ctx: Context,
    ordering: Box<dyn TermOrder>,
    selector: Box<dyn LiteralSelector>,
    state: SaturationState,
    indices: Indexes,
    generating: Vec<Box<dyn GeneratingInference>>,
    simplifying: Vec<Box<dyn SimplifyingInference>>,
    redundancy_hooks: Vec<RedundancyHook>,
    events: EventBus,
    profile: Option<SaturationProfile>,
    /// Set to true to stop the loop at the next step boundary
    cancel: Arc<AtomicBool>,
    empty_clause: Option<ClauseId>,
}

impl Prover {
    /// Build a prover over a logical context. Incomplete or inconsistent
    /// configuration is rejected here.
    pub fn new(ctx: Context, config: ProverConfig) -> Result<Prover, ProverError> {
        if config.precedence.variable_weight == 0 {
            return Err(ProverError::Config(
                "variable weight must be positive".into(),
            ));
        }

        let ordering: Box<dyn TermOrder> = match config.ordering {
            OrderingChoice::Kbo => Box::new(KBO::new(config.precedence.clone())),
            OrderingChoice::Rpo => Box::new(RPO::new(config.precedence.clone())),
        };

        let selector: Box<dyn LiteralSelector> = match config.selection {
            SelectionStrategy::None => Box::new(SelectNone),
            SelectionStrategy::AllNegative => Box::new(SelectAllNegative),
            SelectionStrategy::FirstNegative => Box::new(SelectFirstNegative),
            SelectionStrategy::Complex => Box::new(SelectComplex),
        };

        let generating: Vec<Box<dyn GeneratingInference>> = vec![
            Box::new(FactoringRule::new()),
            Box::new(EqualityResolutionRule::new()),
            Box::new(EqualityFactoringRule::new()),
            Box::new(ResolutionRule::new()),
            Box::new(SuperpositionRule::new()),
        ];
        let simplifying: Vec<Box<dyn SimplifyingInference>> = vec![
            Box::new(TautologyRule::new()),
            Box::new(DemodulationRule::new()),
            Box::new(SimplifyReflectRule::new()),
            Box::new(SubsumptionRule::new()),
        ];

        let profile = config.enable_profiling.then(SaturationProfile::default);
        let state = SaturationState::new(config.age_weight_ratio);

        Ok(Prover {
            config,
            ctx,
            ordering,
            selector,
            state,
            indices: Indexes::new(),
            generating,
            simplifying,
            redundancy_hooks: Vec::new(),
            events: EventBus::new(),
            profile,
            cancel: Arc::new(AtomicBool::new(false)),
            empty_clause: None,
        })
    }

    // =========================================================================
    // Ingress
    // =========================================================================

    /// Ingest one initial clause as a list of signed equations. Surfaces
    /// type errors to the caller; well-typed clauses are normalized and
    /// queued.
    pub fn add_initial(&mut self, literals: Vec<Literal>) -> Result<ClauseId, ProverError> {
        for lit in &literals {
            if self.ctx.bank().ty(lit.left) != self.ctx.bank().ty(lit.right) {
                return Err(ProverError::IllTypedLiteral);
            }
        }

        let clause = Clause::make(
            &mut self.ctx,
            self.ordering.as_ref(),
            literals,
            Derivation::input(),
        );
        let (id, fresh) = self.state.store.insert(clause);
        if fresh {
            self.state.initial_count += 1;
            self.state.event_log.push(StateChange::Add {
                clause: id,
                rule: "Input".into(),
                parents: Vec::new(),
            });
            if self.state.store.get(id).is_empty() {
                self.empty_clause = Some(id);
            } else {
                self.state.new.push(id);
            }
        }
        Ok(id)
    }

    // =========================================================================
    // Plugin hooks
    // =========================================================================

    /// Register an extra generating rule (unary or binary; binary rules
    /// reach the active set through the index registry).
    pub fn add_generating_rule(&mut self, rule: Box<dyn GeneratingInference>) {
        self.generating.push(rule);
    }

    /// Register an extra simplification rule.
    pub fn add_simplifying_rule(&mut self, rule: Box<dyn SimplifyingInference>) {
        self.simplifying.push(rule);
    }

    /// Register a redundancy predicate; accepted clauses are discarded
    /// before simplification.
    pub fn add_redundancy_hook(&mut self, hook: RedundancyHook) {
        self.redundancy_hooks.push(hook);
    }

    /// Subscribe to clause lifecycle events.
    pub fn add_listener(&mut self, listener: Box<dyn ClauseEventListener>) {
        self.events.register(listener);
    }

    /// The cooperative cancellation token, polled between steps.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Mutable context access for building ingress terms.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn active_len(&self) -> usize {
        self.state.active.len()
    }

    pub fn passive_len(&self) -> usize {
        self.state.passive.len()
    }

    /// Iterate all stored clauses (checkpointing, plugins).
    pub fn clauses(&self) -> impl Iterator<Item = &Arc<Clause>> {
        self.state.store.iter()
    }

    pub fn clause(&self, id: ClauseId) -> &Arc<Clause> {
        self.state.store.get(id)
    }

    pub fn event_log(&self) -> &[StateChange] {
        &self.state.event_log
    }

    pub fn profile(&self) -> Option<&SaturationProfile> {
        self.profile.as_ref()
    }

    pub fn iterations(&self) -> u32 {
        self.state.iteration
    }

    // =========================================================================
    // The loop
    // =========================================================================

    /// Run the given-clause loop until refutation, saturation or budget
    /// exhaustion. A `deadline` overrides the configured timeout.
    pub fn saturate(&mut self, deadline: Option<Duration>) -> Outcome {
        let start = Instant::now();
        let timeout = deadline.unwrap_or(self.config.timeout);

        if let Some(id) = self.empty_clause {
            return Outcome::Refutation(self.state.extract_proof(id));
        }

        let outcome = loop {
            // Cooperative cancellation point, between steps only
            if self.cancel.load(AtomicOrdering::Relaxed) || start.elapsed() > timeout {
                break Outcome::Timeout;
            }
            if self.config.max_iterations > 0
                && self.state.iteration as usize >= self.config.max_iterations
            {
                break Outcome::Timeout;
            }

            if let Some(outcome) = self.step() {
                break outcome;
            }
        };

        if let Some(p) = self.profile.as_mut() {
            p.iterations = self.state.iteration as u64;
            p.total_time = start.elapsed();
        }

        match &outcome {
            Outcome::Refutation(_) => info!(iterations = self.state.iteration, "refutation found"),
            Outcome::Saturated => info!(iterations = self.state.iteration, "saturated"),
            Outcome::Timeout => info!(iterations = self.state.iteration, "budget exhausted"),
            Outcome::Error(e) => info!(error = %e, "saturation aborted"),
        }
        outcome
    }

    /// One given-clause step. Returns `Some` when the search is over.
    pub fn step(&mut self) -> Option<Outcome> {
        // 1. Forward-simplify every new clause and move survivors to passive
        if let Some(outcome) = self.process_new() {
            return Some(outcome);
        }

        // 2. Empty passive set means saturation
        let given = match self.state.passive.pop() {
            Some(id) => id,
            None => return Some(Outcome::Saturated),
        };

        // 3. Re-run forward simplification: the sets have grown since the
        // clause was queued
        let given_clause = self.state.store.get(given).clone();
        if let Some((rule, simplification)) = self.forward_simplify(&given_clause) {
            if let Some(p) = self.profile.as_mut() {
                p.forward_simplified += 1;
            }
            return self.apply_removal(given, rule, simplification);
        }

        // Literal selection, exactly once per clause
        let selection = self.selector.select(self.ctx.bank(), &given_clause);
        if let Err(e) = given_clause.select(&selection) {
            return Some(Outcome::Error(ProverError::Internal(e.to_string())));
        }

        // 4. Backward-simplify active and passive sets with the given clause
        let mut backward: Vec<(ClauseId, &'static str, Simplification)> = Vec::new();
        for rule in &self.simplifying {
            let mut rc = RuleContext {
                ctx: &mut self.ctx,
                ordering: self.ordering.as_ref(),
                selector: self.selector.as_ref(),
            };
            for (victim, simplification) in
                rule.simplify_backward(given, &self.state, &mut rc, &self.indices)
            {
                backward.push((victim, rule.name(), simplification));
            }
        }
        for (victim, rule, simplification) in backward {
            if let Some(p) = self.profile.as_mut() {
                p.backward_simplified += 1;
            }
            if let Some(outcome) = self.apply_removal(victim, rule, simplification) {
                return Some(outcome);
            }
        }

        // 5. Activate the given clause
        self.state.active.insert(given);
        self.indices
            .on_activate(self.ctx.bank(), self.ctx.top(), given, &given_clause);
        self.events.emit_added_to_active(given, &given_clause);
        self.state.event_log.push(StateChange::Activate { clause: given });
        self.state.iteration += 1;
        debug!(
            given = %given,
            literals = given_clause.len(),
            active = self.state.active.len(),
            passive = self.state.passive.len(),
            "activated"
        );

        // 6. Generate inferences between the given clause and the active set
        let mut conclusions: Vec<Clause> = Vec::new();
        for rule in &self.generating {
            let mut rc = RuleContext {
                ctx: &mut self.ctx,
                ordering: self.ordering.as_ref(),
                selector: self.selector.as_ref(),
            };
            let produced = rule.generate(given, &self.state, &mut rc, &self.indices);
            if let Some(p) = self.profile.as_mut() {
                p.clauses_generated += produced.len() as u64;
                p.record_rule(rule.name(), produced.len());
            }
            conclusions.extend(produced);
        }
        trace!(given = %given, conclusions = conclusions.len(), "generated");

        for clause in conclusions {
            if clause.len() > self.config.max_clause_size {
                continue;
            }
            if let Some(outcome) = self.integrate(clause, None) {
                return Some(outcome);
            }
        }

        None
    }

    /// Drain the new-clause stack through forward simplification.
    fn process_new(&mut self) -> Option<Outcome> {
        while let Some(&id) = self.state.new.last() {
            let clause = self.state.store.get(id).clone();

            if self
                .redundancy_hooks
                .iter()
                .any(|hook| hook(&self.ctx, &clause))
            {
                self.state.new.pop();
                self.state.event_log.push(StateChange::Simplify {
                    clause: id,
                    replacement: None,
                    rule: "Redundancy".into(),
                    by: Vec::new(),
                });
                continue;
            }

            match self.forward_simplify(&clause) {
                Some((rule, Simplification::Redundant { by })) => {
                    self.state.new.pop();
                    if let Some(p) = self.profile.as_mut() {
                        p.forward_simplified += 1;
                    }
                    self.state.event_log.push(StateChange::Simplify {
                        clause: id,
                        replacement: None,
                        rule: rule.into(),
                        by,
                    });
                }
                Some((rule, Simplification::Rewritten { replacement, by })) => {
                    self.state.new.pop();
                    if let Some(p) = self.profile.as_mut() {
                        p.forward_simplified += 1;
                    }
                    if let Some(outcome) = self.integrate(replacement, Some((id, rule, by))) {
                        return Some(outcome);
                    }
                }
                None => {
                    // Transfer to passive
                    self.state.new.pop();
                    let weight = clause.weight + clause.penalty;
                    self.state.passive.push(id, weight, clause.age);
                    self.state.event_log.push(StateChange::Transfer { clause: id });
                    if let Some(p) = self.profile.as_mut() {
                        p.clauses_kept += 1;
                    }
                }
            }
        }
        None
    }

    /// Run the forward simplification rules; the first applicable wins.
    fn forward_simplify(&mut self, clause: &Clause) -> Option<(&'static str, Simplification)> {
        for rule in &self.simplifying {
            let mut rc = RuleContext {
                ctx: &mut self.ctx,
                ordering: self.ordering.as_ref(),
                selector: self.selector.as_ref(),
            };
            if let Some(simplification) =
                rule.simplify_forward(clause, &self.state, &mut rc, &self.indices)
            {
                return Some((rule.name(), simplification));
            }
        }
        None
    }

    /// Remove a simplified clause from its set, cancel its passive
    /// descendants, and integrate a replacement if any.
    fn apply_removal(
        &mut self,
        victim: ClauseId,
        rule: &'static str,
        simplification: Simplification,
    ) -> Option<Outcome> {
        if self.state.active.shift_remove(&victim) {
            self.indices.on_delete(victim);
            let clause = self.state.store.get(victim).clone();
            self.events.emit_removed_from_active(victim, &clause);
        } else {
            self.state.passive.remove(victim);
        }

        // Orphan cancellation: descendants waiting in passive lose a parent
        let orphans: Vec<ClauseId> = self
            .state
            .passive
            .iter()
            .filter(|&pid| {
                self.state
                    .store
                    .get(pid)
                    .derivation
                    .parents
                    .contains(&victim)
            })
            .collect();
        for orphan in orphans {
            self.state.passive.remove(orphan);
            self.state.event_log.push(StateChange::Simplify {
                clause: orphan,
                replacement: None,
                rule: "Orphan".into(),
                by: vec![victim],
            });
        }

        match simplification {
            Simplification::Redundant { by } => {
                self.state.event_log.push(StateChange::Simplify {
                    clause: victim,
                    replacement: None,
                    rule: rule.into(),
                    by,
                });
                None
            }
            Simplification::Rewritten { replacement, by } => {
                self.integrate(replacement, Some((victim, rule, by)))
            }
        }
    }

    /// Intern a clause, log the event, and queue it for simplification.
    /// Duplicates of known clauses are discarded.
    fn integrate(
        &mut self,
        mut clause: Clause,
        simplifies: Option<(ClauseId, &'static str, Vec<ClauseId>)>,
    ) -> Option<Outcome> {
        clause.age = self.state.iteration;
        let (id, fresh) = self.state.store.insert(clause);

        match simplifies {
            Some((old, rule, by)) => {
                self.state.event_log.push(StateChange::Simplify {
                    clause: old,
                    replacement: Some(id),
                    rule: rule.into(),
                    by,
                });
            }
            None if fresh => {
                let (rule, parents) = {
                    let stored = self.state.store.get(id);
                    (
                        stored.derivation.rule.clone(),
                        stored.derivation.parents.clone(),
                    )
                };
                self.state
                    .event_log
                    .push(StateChange::Add { clause: id, rule, parents });
            }
            None => {}
        }

        if !fresh {
            return None;
        }

        let stored = self.state.store.get(id).clone();
        if stored.is_empty() {
            self.events.emit_empty_clause(id, &stored);
            self.empty_clause = Some(id);
            return Some(Outcome::Refutation(self.state.extract_proof(id)));
        }

        self.state.new.push(id);

        if self.config.max_clauses > 0 && self.state.store.len() >= self.config.max_clauses {
            return Some(Outcome::Timeout);
        }
        None
    }
}
