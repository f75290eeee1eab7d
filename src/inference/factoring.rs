//! Factoring on encoded predicate literals
//!
//! Two same-sign atoms of one clause that unify collapse into one:
//! from `P | P' | C` with `sigma = mgu(P, P')` derive `(P | C)sigma`.
//! Positive factoring only; negative duplicates are handled by
//! normalization and subsumption in practice.

use crate::index::Indexes;
use crate::logic::clause::{Clause, ClauseId, Derivation};
use crate::logic::substitution::{Renaming, Scoped, Substitution};
use crate::saturation::state::{GeneratingInference, RuleContext, SaturationState};
use crate::unification::unify_into;

/// Positive factoring rule.
pub struct FactoringRule;

impl FactoringRule {
    pub fn new() -> Self {
        FactoringRule
    }
}

impl Default for FactoringRule {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratingInference for FactoringRule {
    fn name(&self) -> &'static str {
        "Factoring"
    }

    fn generate(
        &self,
        given: ClauseId,
        state: &SaturationState,
        rc: &mut RuleContext<'_>,
        _indices: &Indexes,
    ) -> Vec<Clause> {
        let mut results = Vec::new();
        let given_clause = state.store.get(given).clone();
        let top = rc.ctx.top();

        if given_clause.len() < 2 {
            return results;
        }

        for i in given_clause.eligible() {
            let lit = given_clause.literals[i];
            if !lit.positive || !lit.is_predicate(top) {
                continue;
            }

            for (j, other) in given_clause.literals.iter().enumerate() {
                if j == i || !other.positive || !other.is_predicate(top) {
                    continue;
                }

                let mut subst = Substitution::new();
                if !unify_into(
                    rc.ctx.bank(),
                    Scoped(lit.left, 0),
                    Scoped(other.left, 0),
                    &mut subst,
                ) {
                    continue;
                }

                let mut renaming = Renaming::new(0);
                let literals = super::common::collect_literals_except(
                    rc.ctx,
                    &subst,
                    &mut renaming,
                    &given_clause,
                    &[j],
                    0,
                );

                let bindings = super::common::render_bindings(rc.ctx, &subst, &mut renaming);
                results.push(Clause::make(
                    rc.ctx,
                    rc.ordering,
                    literals,
                    Derivation::new("Factoring", vec![given]).with_bindings(bindings),
                ));
            }
        }

        results
    }
}
