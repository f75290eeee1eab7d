//! Superposition: conditional rewriting of one clause by an equation from
//! another
//!
//! From premise `l = r | C` and into premise `L[l'] | D`, with
//! `sigma = mgu(l, l')` and `l'` not a variable, derive
//! `(C | D | L[r])sigma`, subject to the ordering constraints checked
//! after the unifier is known: `l sigma` not smaller than `r sigma`, and
//! the rewritten equation side not smaller than its other side.
//!
//! The given clause plays both roles: its eligible positive equations are
//! paired with indexed subterms of the active set, and its eligible
//! subterms are paired with indexed equation sides.

use crate::index::{IndexEntry, Indexes};
use crate::logic::clause::{Clause, ClauseId, Derivation};
use crate::logic::literal::Literal;
use crate::logic::ordering::not_smaller;
use crate::logic::position::{Position, Step};
use crate::logic::substitution::{Renaming, Scoped, Substitution};
use crate::logic::term::TermId;
use crate::saturation::state::{GeneratingInference, RuleContext, SaturationState};
use crate::unification::unify_into;

/// Superposition inference rule.
pub struct SuperpositionRule;

impl SuperpositionRule {
    pub fn new() -> Self {
        SuperpositionRule
    }
}

impl Default for SuperpositionRule {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratingInference for SuperpositionRule {
    fn name(&self) -> &'static str {
        "Superposition"
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

        // Given as the from premise: its eligible positive equations
        // rewrite indexed subterms of active clauses (itself included).
        for i in given_clause.positive_eligible() {
            let lit = given_clause.literals[i];
            if !lit.is_equation(top) {
                continue;
            }
            for (l, r) in super::common::directions(&lit, given_clause.orientations[i]) {
                let candidates = indices.unifiable_subterms(rc.ctx.bank(), l);
                for (sub, entry) in candidates {
                    let into_clause = state.store.get(entry.clause).clone();
                    let mut subst = Substitution::new();
                    if !unify_into(rc.ctx.bank(), Scoped(l, 0), Scoped(sub, 1), &mut subst) {
                        continue;
                    }
                    if let Some(clause) = build_conclusion(
                        rc,
                        top,
                        &given_clause,
                        given,
                        i,
                        l,
                        r,
                        &into_clause,
                        &entry,
                        &subst,
                    ) {
                        results.push(clause);
                    }
                }
            }
        }

        // Given as the into premise: its eligible non-variable subterms
        // are rewritten by indexed equation sides of other active clauses.
        // The self pairing is already covered above.
        for i in given_clause.eligible() {
            let lit = given_clause.literals[i];
            let sides: &[(TermId, Step)] = if lit.is_predicate(top) {
                &[(lit.left, Step::Left)]
            } else {
                &[(lit.left, Step::Left), (lit.right, Step::Right)]
            };
            for &(side, step) in sides {
                let bank = rc.ctx.bank();
                let positions: Vec<(TermId, Position)> = bank
                    .positions(side)
                    .filter(|(sub, _)| !bank.is_var(*sub))
                    .collect();
                for (sub, pos) in positions {
                    let candidates = indices.unifiable_equations(rc.ctx.bank(), sub);
                    for (eq_side, from_entry) in candidates {
                        if from_entry.clause == given {
                            continue;
                        }
                        let from_clause = state.store.get(from_entry.clause).clone();
                        let from_lit = from_clause.literals[from_entry.literal];
                        let (l, r) = match from_entry.position.steps[0] {
                            Step::Left => (from_lit.left, from_lit.right),
                            _ => (from_lit.right, from_lit.left),
                        };
                        debug_assert_eq!(eq_side, l);
                        let mut subst = Substitution::new();
                        if !unify_into(rc.ctx.bank(), Scoped(l, 0), Scoped(sub, 1), &mut subst) {
                            continue;
                        }
                        let into_entry = IndexEntry {
                            clause: given,
                            literal: i,
                            position: pos.clone().below(step),
                        };
                        if let Some(clause) = build_conclusion(
                            rc,
                            top,
                            &from_clause,
                            from_entry.clause,
                            from_entry.literal,
                            l,
                            r,
                            &given_clause,
                            &into_entry,
                            &subst,
                        ) {
                            results.push(clause);
                        }
                    }
                }
            }
        }

        results
    }
}

/// Apply the post-unifier ordering checks and assemble the conclusion.
/// The from premise lives in scope 0, the into premise in scope 1.
#[allow(clippy::too_many_arguments)]
fn build_conclusion(
    rc: &mut RuleContext<'_>,
    top: TermId,
    from_clause: &Clause,
    from_id: ClauseId,
    from_idx: usize,
    l: TermId,
    r: TermId,
    into_clause: &Clause,
    into_entry: &IndexEntry,
    subst: &Substitution,
) -> Option<Clause> {
    let mut renaming = Renaming::new(0);

    // l sigma must not be smaller than r sigma
    let l_sigma = rc.ctx.apply_subst(subst, &mut renaming, Scoped(l, 0));
    let r_sigma = rc.ctx.apply_subst(subst, &mut renaming, Scoped(r, 0));
    if !not_smaller(rc.ordering.compare(rc.ctx.bank(), l_sigma, r_sigma)) {
        return None;
    }

    let into_lit = into_clause.literals[into_entry.literal];
    let side_step = into_entry.position.steps[0];

    // The rewritten side must not be smaller than the literal's other side
    let s_sigma = rc
        .ctx
        .apply_subst(subst, &mut renaming, Scoped(into_lit.left, 1));
    let t_sigma = rc
        .ctx
        .apply_subst(subst, &mut renaming, Scoped(into_lit.right, 1));
    if into_lit.is_equation(top) {
        let (rewritten_side, other_side) = match side_step {
            Step::Left => (s_sigma, t_sigma),
            _ => (t_sigma, s_sigma),
        };
        if !not_smaller(rc.ordering.compare(rc.ctx.bank(), rewritten_side, other_side)) {
            return None;
        }
    }

    // Splice r sigma into the rewritten side. The unifier cannot change
    // the spine above l', so the position stays valid after application.
    let inner = &into_entry.position.steps[1..];
    let new_lit = match side_step {
        Step::Left => {
            let rewritten = rc.ctx.terms.replace_at(s_sigma, inner, r_sigma)?;
            Literal::new(into_lit.positive, rewritten, t_sigma)
        }
        _ => {
            let rewritten = rc.ctx.terms.replace_at(t_sigma, inner, r_sigma)?;
            Literal::new(into_lit.positive, s_sigma, rewritten)
        }
    };

    let mut literals = super::common::collect_literals_except(
        rc.ctx,
        subst,
        &mut renaming,
        from_clause,
        &[from_idx],
        0,
    );
    literals.push(new_lit);
    literals.extend(super::common::collect_literals_except(
        rc.ctx,
        subst,
        &mut renaming,
        into_clause,
        &[into_entry.literal],
        1,
    ));

    let bindings = super::common::render_bindings(rc.ctx, subst, &mut renaming);
    Some(Clause::make(
        rc.ctx,
        rc.ordering,
        literals,
        Derivation::new("Superposition", vec![from_id, into_entry.clause]).with_bindings(bindings),
    ))
}
