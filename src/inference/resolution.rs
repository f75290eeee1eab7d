//! Binary resolution on encoded predicate literals
//!
//! Complementary atoms `P | C` and `~P' | D` with `sigma = mgu(P, P')`
//! resolve to `(C | D)sigma`. Equations are handled by superposition and
//! equality resolution, so this rule only looks at `atom = $true`
//! literals. Candidates come from the subterm index: an eligible atom is
//! indexed at the root of its left side.

use crate::index::Indexes;
use crate::logic::clause::{Clause, ClauseId, Derivation};
use crate::logic::position::Step;
use crate::logic::substitution::{Renaming, Scoped, Substitution};
use crate::saturation::state::{GeneratingInference, RuleContext, SaturationState};
use crate::unification::unify_into;

/// Binary resolution rule.
pub struct ResolutionRule;

impl ResolutionRule {
    pub fn new() -> Self {
        ResolutionRule
    }
}

impl Default for ResolutionRule {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratingInference for ResolutionRule {
    fn name(&self) -> &'static str {
        "Resolution"
    }

    fn generate(
        &self,
        given: ClauseId,
        state: &SaturationState,
        rc: &mut RuleContext<'_>,
        indices: &Indexes,
    ) -> Vec<Clause> {
        let mut results = Vec::new();
        let given_clause = state.store.get(given).clone();
        let top = rc.ctx.top();

        for i in given_clause.eligible() {
            let lit = given_clause.literals[i];
            if !lit.is_predicate(top) {
                continue;
            }

            let candidates = indices.unifiable_subterms(rc.ctx.bank(), lit.left);
            for (_, entry) in candidates {
                // Only whole atoms of complementary eligible literals
                if entry.position.steps != [Step::Left] {
                    continue;
                }
                let other = state.store.get(entry.clause).clone();
                let other_lit = other.literals[entry.literal];
                if !other_lit.is_predicate(top) || other_lit.positive == lit.positive {
                    continue;
                }
                // Each unordered pair resolves once per activation; the
                // given clause itself is in the index, so self-resolution
                // needs the ordered guard to avoid double emission
                if entry.clause == given && entry.literal < i {
                    continue;
                }

                let mut subst = Substitution::new();
                if !unify_into(
                    rc.ctx.bank(),
                    Scoped(lit.left, 0),
                    Scoped(other_lit.left, 1),
                    &mut subst,
                ) {
                    continue;
                }

                let mut renaming = Renaming::new(0);
                let mut literals = super::common::collect_literals_except(
                    rc.ctx,
                    &subst,
                    &mut renaming,
                    &given_clause,
                    &[i],
                    0,
                );
                literals.extend(super::common::collect_literals_except(
                    rc.ctx,
                    &subst,
                    &mut renaming,
                    &other,
                    &[entry.literal],
                    1,
                ));

                let bindings = super::common::render_bindings(rc.ctx, &subst, &mut renaming);
                results.push(Clause::make(
                    rc.ctx,
                    rc.ordering,
                    literals,
                    Derivation::new("Resolution", vec![given, entry.clause])
                        .with_bindings(bindings),
                ));
            }
        }

        results
    }
}
