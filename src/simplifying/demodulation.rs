//! Demodulation: rewriting with oriented unit equations
//!
//! A unit equation whose instantiated left side strictly dominates its
//! right side rewrites matching subterms anywhere in another clause. The
//! strict ordering decrease makes every rewrite chain terminate.
//!
//! Forward: a new clause is rewritten by the active rewrite rules, one
//! step at a time (the replacement re-enters the new-clause queue, so
//! normal forms are reached through the loop). Backward: a newly
//! activated unit equation rewrites the active clauses that contain an
//! instance of its left side.

use std::collections::HashSet;

use crate::index::Indexes;
use crate::logic::clause::{Clause, ClauseId, Derivation};
use crate::logic::literal::Literal;
use crate::logic::ordering::TermOrdering;
use crate::logic::position::{Position, Step};
use crate::logic::substitution::{Renaming, Scoped, Substitution};
use crate::logic::term::TermId;
use crate::saturation::state::{RuleContext, SaturationState, Simplification, SimplifyingInference};
use crate::unification::match_into;

/// Demodulation rule.
pub struct DemodulationRule;

impl DemodulationRule {
    pub fn new() -> Self {
        DemodulationRule
    }
}

impl Default for DemodulationRule {
    fn default() -> Self {
        Self::new()
    }
}

/// One rewrite of `clause` at literal `lit_idx`, side `step`, inner
/// position `inner`, replacing the subterm with `replacement`.
fn rewrite_clause(
    rc: &mut RuleContext<'_>,
    clause: &Clause,
    lit_idx: usize,
    step: Step,
    inner: &[Step],
    replacement: TermId,
    parents: Vec<ClauseId>,
) -> Option<Clause> {
    let lit = clause.literals[lit_idx];
    let new_lit = match step {
        Step::Left => {
            let side = rc.ctx.terms.replace_at(lit.left, inner, replacement)?;
            Literal::new(lit.positive, side, lit.right)
        }
        _ => {
            let side = rc.ctx.terms.replace_at(lit.right, inner, replacement)?;
            Literal::new(lit.positive, lit.left, side)
        }
    };

    let mut literals = clause.literals.clone();
    literals[lit_idx] = new_lit;

    Some(Clause::make(
        rc.ctx,
        rc.ordering,
        literals,
        Derivation::new("Demodulation", parents),
    ))
}

/// Try to rewrite one subterm of `clause` with the rule clause `eq_id`,
/// whose oriented left side is `lhs` (the side named by `lhs_step`).
/// Returns the rewritten clause on success.
#[allow(clippy::too_many_arguments)]
fn try_rule_at(
    rc: &mut RuleContext<'_>,
    state: &SaturationState,
    clause: &Clause,
    lit_idx: usize,
    side_step: Step,
    sub: TermId,
    inner: &[Step],
    eq_id: ClauseId,
    lhs_step: Step,
) -> Option<Clause> {
    let eq_clause = state.store.get(eq_id);
    let eq_lit = eq_clause.literals[0];
    let (lhs, rhs) = match lhs_step {
        Step::Left => (eq_lit.left, eq_lit.right),
        _ => (eq_lit.right, eq_lit.left),
    };

    let mut subst = Substitution::new();
    if !match_into(rc.ctx.bank(), Scoped(lhs, 1), Scoped(sub, 0), &mut subst) {
        return None;
    }

    // Keep the target clause's variables; fresh ids only for unbound
    // rule variables (those fail the ordering check anyway)
    let next_var = clause.free_vars.len() as u32;
    let mut renaming = Renaming::preserving(0, next_var);
    let rhs_sigma = rc.ctx.apply_subst(&subst, &mut renaming, Scoped(rhs, 1));

    // Strict decrease, checked on the instantiated sides
    if rc.ordering.compare(rc.ctx.bank(), sub, rhs_sigma) != TermOrdering::Greater {
        return None;
    }

    let target_id = clause.id?;
    rewrite_clause(
        rc,
        clause,
        lit_idx,
        side_step,
        inner,
        rhs_sigma,
        vec![target_id, eq_id],
    )
}

impl SimplifyingInference for DemodulationRule {
    fn name(&self) -> &'static str {
        "Demodulation"
    }

    fn simplify_forward(
        &self,
        clause: &Clause,
        state: &SaturationState,
        rc: &mut RuleContext<'_>,
        indices: &Indexes,
    ) -> Option<Simplification> {
        for (lit_idx, lit) in clause.literals.iter().enumerate() {
            for (side, side_step) in [(lit.left, Step::Left), (lit.right, Step::Right)] {
                let bank = rc.ctx.bank();
                let positions: Vec<(TermId, Position)> = bank
                    .positions(side)
                    .filter(|(sub, _)| !bank.is_var(*sub))
                    .collect();
                for (sub, pos) in positions {
                    let rules = indices.generalizing_rules(rc.ctx.bank(), sub);
                    for (_, entry) in rules {
                        if Some(entry.clause) == clause.id {
                            continue;
                        }
                        let lhs_step = entry.position.steps[0];
                        if let Some(replacement) = try_rule_at(
                            rc,
                            state,
                            clause,
                            lit_idx,
                            side_step,
                            sub,
                            &pos.steps,
                            entry.clause,
                            lhs_step,
                        ) {
                            return Some(Simplification::Rewritten {
                                replacement,
                                by: vec![entry.clause],
                            });
                        }
                    }
                }
            }
        }
        None
    }

    fn simplify_backward(
        &self,
        given: ClauseId,
        state: &SaturationState,
        rc: &mut RuleContext<'_>,
        indices: &Indexes,
    ) -> Vec<(ClauseId, Simplification)> {
        let top = rc.ctx.top();
        let given_clause = state.store.get(given).clone();
        if !given_clause.is_unit_equation(top) {
            return Vec::new();
        }

        let lit = given_clause.literals[0];
        let mut changes = Vec::new();
        let mut rewritten: HashSet<ClauseId> = HashSet::new();

        let sides: Vec<(TermId, Step)> = match given_clause.orientations[0] {
            TermOrdering::Greater => vec![(lit.left, Step::Left)],
            TermOrdering::Less => vec![(lit.right, Step::Right)],
            TermOrdering::Incomparable => {
                vec![(lit.left, Step::Left), (lit.right, Step::Right)]
            }
            TermOrdering::Equal => Vec::new(),
        };

        for (lhs, lhs_step) in sides {
            let candidates = indices.instance_subterms(rc.ctx.bank(), lhs);
            for (sub, entry) in candidates {
                if entry.clause == given || rewritten.contains(&entry.clause) {
                    continue;
                }
                if !state.active.contains(&entry.clause) {
                    continue;
                }
                let target = state.store.get(entry.clause).clone();
                let side_step = entry.position.steps[0];
                if let Some(replacement) = try_rule_at(
                    rc,
                    state,
                    &target,
                    entry.literal,
                    side_step,
                    sub,
                    &entry.position.steps[1..],
                    given,
                    lhs_step,
                ) {
                    rewritten.insert(entry.clause);
                    changes.push((
                        entry.clause,
                        Simplification::Rewritten {
                            replacement,
                            by: vec![given],
                        },
                    ));
                }
            }
        }

        changes
    }
}
