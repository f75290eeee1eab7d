//! Equality factoring
//!
//! From `s = t | s' = t' | C` with `sigma = mgu(s, s')`, derive
//! `(t != t' | s' = t' | C)sigma`, provided `s = t` is eligible and
//! `s sigma` is not smaller than `t sigma`. Merges overlapping positive
//! equations so the ordering restriction on superposition stays complete.

use crate::index::Indexes;
use crate::logic::clause::{Clause, ClauseId, Derivation};
use crate::logic::literal::Literal;
use crate::logic::ordering::not_smaller;
use crate::logic::substitution::{Renaming, Scoped, Substitution};
use crate::saturation::state::{GeneratingInference, RuleContext, SaturationState};
use crate::unification::unify_into;

/// Equality factoring rule.
pub struct EqualityFactoringRule;

impl EqualityFactoringRule {
    pub fn new() -> Self {
        EqualityFactoringRule
    }
}

impl Default for EqualityFactoringRule {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratingInference for EqualityFactoringRule {
    fn name(&self) -> &'static str {
        "EqualityFactoring"
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

        for i in given_clause.positive_eligible() {
            let lit = given_clause.literals[i];
            if !lit.is_equation(top) {
                continue;
            }

            for (s, t) in super::common::directions(&lit, given_clause.orientations[i]) {
                for (j, other) in given_clause.literals.iter().enumerate() {
                    if j == i || !other.positive || !other.is_equation(top) {
                        continue;
                    }

                    for (s2, t2) in
                        super::common::directions(other, given_clause.orientations[j])
                    {
                        let mut subst = Substitution::new();
                        if !unify_into(rc.ctx.bank(), Scoped(s, 0), Scoped(s2, 0), &mut subst) {
                            continue;
                        }

                        let mut renaming = Renaming::new(0);
                        let s_sigma = rc.ctx.apply_subst(&subst, &mut renaming, Scoped(s, 0));
                        let t_sigma = rc.ctx.apply_subst(&subst, &mut renaming, Scoped(t, 0));
                        if !not_smaller(rc.ordering.compare(rc.ctx.bank(), s_sigma, t_sigma)) {
                            continue;
                        }
                        let t2_sigma = rc.ctx.apply_subst(&subst, &mut renaming, Scoped(t2, 0));

                        // (t != t' | s' = t' | C)sigma
                        let mut literals = vec![Literal::neq(t_sigma, t2_sigma)];
                        let mut rest = super::common::collect_literals_except(
                            rc.ctx,
                            &subst,
                            &mut renaming,
                            &given_clause,
                            &[i],
                            0,
                        );
                        literals.append(&mut rest);

                        let bindings =
                            super::common::render_bindings(rc.ctx, &subst, &mut renaming);
                        results.push(Clause::make(
                            rc.ctx,
                            rc.ordering,
                            literals,
                            Derivation::new("EqualityFactoring", vec![given])
                                .with_bindings(bindings),
                        ));
                    }
                }
            }
        }

        results
    }
}
