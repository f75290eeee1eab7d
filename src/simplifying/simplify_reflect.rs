//! Positive and negative simplify-reflect
//!
//! A unit equation `l = r` refutes any negative literal `s != t` that is
//! an instance of it, and a unit inequation `l != r` refutes any positive
//! literal `s = t` that is an instance: the refuted literal is deleted
//! from the clause. On encoded predicate atoms this is unit resolution
//! performed as a simplification.

use crate::index::Indexes;
use crate::logic::clause::{Clause, ClauseId, Derivation};
use crate::logic::literal::Literal;
use crate::logic::substitution::{Scoped, Substitution};
use crate::logic::term::TermBank;
use crate::saturation::state::{RuleContext, SaturationState, Simplification, SimplifyingInference};
use crate::unification::match_into;

/// Simplify-reflect rule (both polarities).
pub struct SimplifyReflectRule;

impl SimplifyReflectRule {
    pub fn new() -> Self {
        SimplifyReflectRule
    }
}

impl Default for SimplifyReflectRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Does the unit literal match the target pair, in either orientation?
fn pair_matches(bank: &TermBank, unit: &Literal, target: &Literal) -> bool {
    let straight = {
        let mut subst = Substitution::new();
        match_into(bank, Scoped(unit.left, 1), Scoped(target.left, 0), &mut subst)
            && match_into(bank, Scoped(unit.right, 1), Scoped(target.right, 0), &mut subst)
    };
    if straight {
        return true;
    }
    let mut subst = Substitution::new();
    match_into(bank, Scoped(unit.left, 1), Scoped(target.right, 0), &mut subst)
        && match_into(bank, Scoped(unit.right, 1), Scoped(target.left, 0), &mut subst)
}

impl SimplifyingInference for SimplifyReflectRule {
    fn name(&self) -> &'static str {
        "SimplifyReflect"
    }

    fn simplify_forward(
        &self,
        clause: &Clause,
        state: &SaturationState,
        rc: &mut RuleContext<'_>,
        indices: &Indexes,
    ) -> Option<Simplification> {
        let clause_id = clause.id?;
        let units: Vec<ClauseId> = indices.units().collect();

        for unit_id in units {
            if Some(unit_id) == clause.id {
                continue;
            }
            let unit = state.store.get(unit_id);
            let unit_lit = unit.literals[0];

            for (j, lit) in clause.literals.iter().enumerate() {
                if lit.positive == unit_lit.positive {
                    continue;
                }
                if !pair_matches(rc.ctx.bank(), &unit_lit, lit) {
                    continue;
                }

                let literals: Vec<Literal> = clause
                    .literals
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| *k != j)
                    .map(|(_, l)| *l)
                    .collect();

                let replacement = Clause::make(
                    rc.ctx,
                    rc.ordering,
                    literals,
                    Derivation::new("SimplifyReflect", vec![clause_id, unit_id]),
                );
                return Some(Simplification::Rewritten {
                    replacement,
                    by: vec![unit_id],
                });
            }
        }
        None
    }
}
