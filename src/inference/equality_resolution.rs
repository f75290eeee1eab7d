//! Equality resolution
//!
//! From `s != t | C` with `sigma = mgu(s, t)` derive `C sigma`, provided
//! the resolved literal is eligible. The refutation of `a != a` is the
//! one-step instance.

use crate::index::Indexes;
use crate::logic::clause::{Clause, ClauseId, Derivation};
use crate::logic::substitution::{Renaming, Scoped, Substitution};
use crate::saturation::state::{GeneratingInference, RuleContext, SaturationState};
use crate::unification::unify_into;

/// Equality resolution rule.
pub struct EqualityResolutionRule;

impl EqualityResolutionRule {
    pub fn new() -> Self {
        EqualityResolutionRule
    }
}

impl Default for EqualityResolutionRule {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratingInference for EqualityResolutionRule {
    fn name(&self) -> &'static str {
        "EqualityResolution"
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

        for i in given_clause.eligible() {
            let lit = given_clause.literals[i];
            if lit.positive {
                continue;
            }

            let mut subst = Substitution::new();
            if !unify_into(
                rc.ctx.bank(),
                Scoped(lit.left, 0),
                Scoped(lit.right, 0),
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
                &[i],
                0,
            );

            let bindings = super::common::render_bindings(rc.ctx, &subst, &mut renaming);
            results.push(Clause::make(
                rc.ctx,
                rc.ordering,
                literals,
                Derivation::new("EqualityResolution", vec![given]).with_bindings(bindings),
            ));
        }

        results
    }
}
