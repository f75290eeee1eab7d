//! Saturation state: clause storage, clause sets, event log, rule traits
//!
//! `SaturationState` is a lean data container holding the clause store,
//! the active set and the new-clause stack. The passive queue lives next
//! to it in the `Prover`, which owns the algorithm. Every state
//! transition is recorded in an append-only event log.

use indexmap::IndexSet;
use serde::Serialize;

use crate::index::Indexes;
use crate::logic::clause::{Clause, ClauseId, ClauseStore};
use crate::logic::context::Context;
use crate::logic::literal::Literal;
use crate::logic::ordering::TermOrder;
use crate::logic::term::{TermId, VarId};
use crate::selection::{LiteralSelector, PassiveQueue};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Atomic operations on the proof state, as recorded in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StateChange {
    /// Clause entered the store and the new-clause stack
    Add {
        clause: ClauseId,
        rule: String,
        parents: Vec<ClauseId>,
    },
    /// Clause deleted, optionally replaced by a simpler one
    Simplify {
        clause: ClauseId,
        replacement: Option<ClauseId>,
        rule: String,
        by: Vec<ClauseId>,
    },
    /// Clause survived forward simplification and moved to passive
    Transfer { clause: ClauseId },
    /// Clause became the given clause and moved to active
    Activate { clause: ClauseId },
}

/// Append-only log of state changes.
pub type EventLog = Vec<StateChange>;

/// Clause storage plus the clause sets and new-clause stack.
pub struct SaturationState {
    pub store: ClauseStore,
    /// Clauses available as inference premises
    pub active: IndexSet<ClauseId>,
    /// Clauses awaiting selection, in priority order
    pub passive: PassiveQueue,
    /// Freshly derived clauses awaiting forward simplification
    pub new: Vec<ClauseId>,
    pub event_log: EventLog,
    /// Given-clause iterations completed
    pub iteration: u32,
    /// Number of initial input clauses
    pub initial_count: usize,
}

impl SaturationState {
    pub fn new(age_weight_ratio: (u32, u32)) -> Self {
        SaturationState {
            store: ClauseStore::new(),
            active: IndexSet::new(),
            passive: PassiveQueue::new(age_weight_ratio),
            new: Vec::new(),
            event_log: Vec::new(),
            iteration: 0,
            initial_count: 0,
        }
    }

    pub fn clause(&self, id: ClauseId) -> &Arc<Clause> {
        self.store.get(id)
    }

    /// Extract the proof DAG ending in `from` by backward traversal over
    /// clause derivations.
    pub fn extract_proof(&self, from: ClauseId) -> Proof {
        let mut ids: Vec<ClauseId> = Vec::new();
        let mut visited: HashSet<ClauseId> = HashSet::new();
        let mut to_visit = vec![from];

        while let Some(id) = to_visit.pop() {
            if !visited.insert(id) {
                continue;
            }
            ids.push(id);
            to_visit.extend(self.store.get(id).derivation.parents.iter().copied());
        }

        ids.sort();

        let steps = ids
            .into_iter()
            .map(|id| {
                let clause = self.store.get(id);
                ProofStep {
                    clause: id,
                    rule: clause.derivation.rule.clone(),
                    parents: clause.derivation.parents.clone(),
                    literals: clause.literals.clone(),
                    bindings: clause.derivation.bindings.clone(),
                }
            })
            .collect();

        Proof {
            empty_clause: from,
            steps,
        }
    }
}

impl Default for SaturationState {
    fn default() -> Self {
        SaturationState::new((1, 4))
    }
}

// =============================================================================
// Proof objects
// =============================================================================

/// One step of a proof: a clause, the rule that produced it, its parents
/// and the unifier the rule applied.
#[derive(Debug, Clone, Serialize)]
pub struct ProofStep {
    pub clause: ClauseId,
    pub rule: String,
    pub parents: Vec<ClauseId>,
    pub literals: Vec<Literal>,
    pub bindings: Vec<(VarId, TermId)>,
}

/// A proof DAG ending in the empty clause, steps in clause-id order.
#[derive(Debug, Clone, Serialize)]
pub struct Proof {
    pub empty_clause: ClauseId,
    pub steps: Vec<ProofStep>,
}

impl Proof {
    /// The step deriving a given clause, if it is part of this proof
    pub fn step(&self, id: ClauseId) -> Option<&ProofStep> {
        self.steps.iter().find(|s| s.clause == id)
    }

    /// Render the proof with symbol names for debugging; serialization to
    /// external formats is the caller's concern.
    pub fn display<'a>(&'a self, ctx: &'a Context) -> ProofDisplay<'a> {
        ProofDisplay { proof: self, ctx }
    }
}

pub struct ProofDisplay<'a> {
    proof: &'a Proof,
    ctx: &'a Context,
}

impl<'a> fmt::Display for ProofDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.proof.steps {
            write!(f, "{}. ", step.clause)?;
            if step.literals.is_empty() {
                write!(f, "$false")?;
            } else {
                for (i, lit) in step.literals.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(
                        f,
                        "{}",
                        lit.display(self.ctx.bank(), &self.ctx.symbols, self.ctx.top())
                    )?;
                }
            }
            write!(f, "  [{}", step.rule)?;
            for p in &step.parents {
                write!(f, " {}", p)?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

// =============================================================================
// Rule traits
// =============================================================================

/// Shared mutable context handed to rules: the term/clause interners, the
/// term ordering, and the literal selection function.
pub struct RuleContext<'a> {
    pub ctx: &'a mut Context,
    pub ordering: &'a dyn TermOrder,
    pub selector: &'a dyn LiteralSelector,
}

/// The outcome of a successful simplification.
pub enum Simplification {
    /// The clause is redundant and is deleted outright
    Redundant { by: Vec<ClauseId> },
    /// The clause is replaced by a simpler one
    Rewritten { replacement: Clause, by: Vec<ClauseId> },
}

/// Trait for generating inference rules (superposition, resolution,
/// factoring, equality resolution, equality factoring, and plugin rules).
///
/// Rules receive the saturation state, rule context and index registry at
/// call time; they keep no lifecycle state of their own. Premises are
/// never mutated; every conclusion is a fresh clause.
pub trait GeneratingInference: Send + Sync {
    fn name(&self) -> &'static str;

    /// Generate all inferences between the given clause and the active
    /// set (the given clause is itself active at this point, so
    /// self-inferences are included).
    fn generate(
        &self,
        given: ClauseId,
        state: &SaturationState,
        rc: &mut RuleContext<'_>,
        indices: &Indexes,
    ) -> Vec<Clause>;
}

/// Trait for simplification rules (tautology, demodulation,
/// simplify-reflect, subsumption, and plugin rules).
pub trait SimplifyingInference: Send + Sync {
    fn name(&self) -> &'static str;

    /// Forward simplification: try to delete or rewrite a new clause
    /// using the active/simplification sets. Never surfaces errors; a
    /// `None` keeps the clause.
    fn simplify_forward(
        &self,
        clause: &Clause,
        state: &SaturationState,
        rc: &mut RuleContext<'_>,
        indices: &Indexes,
    ) -> Option<Simplification>;

    /// Backward simplification: find clauses in the active set that the
    /// newly activated clause simplifies away.
    fn simplify_backward(
        &self,
        _given: ClauseId,
        _state: &SaturationState,
        _rc: &mut RuleContext<'_>,
        _indices: &Indexes,
    ) -> Vec<(ClauseId, Simplification)> {
        Vec::new()
    }
}
