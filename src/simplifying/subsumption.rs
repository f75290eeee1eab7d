//! Subsumption: multiset clause matching for redundancy elimination
//!
//! Clause C subsumes clause D when some substitution sends every literal
//! of C to a distinct literal of D. Subsumed clauses are redundant and
//! deleted, forward (a new clause against active and passive) and
//! backward (active and passive against the newly activated clause).
//!
//! The matcher is tiered: cheap length/weight prefilters, then a
//! backtracking multi-literal search that tries both orientations of
//! equation literals.

use crate::index::Indexes;
use crate::logic::clause::{Clause, ClauseId};
use crate::logic::literal::Literal;
use crate::logic::substitution::{Scoped, Substitution};
use crate::logic::term::TermBank;
use crate::saturation::state::{RuleContext, SaturationState, Simplification, SimplifyingInference};
use crate::unification::match_into;

/// Does `subsumer` subsume `subsumee`?
pub fn subsumes(bank: &TermBank, subsumer: &Clause, subsumee: &Clause) -> bool {
    if subsumer.literals.len() > subsumee.literals.len() {
        return false;
    }
    // Instantiation never shrinks a literal
    if subsumer.weight > subsumee.weight {
        return false;
    }

    let mut used = vec![false; subsumee.literals.len()];
    let subst = Substitution::new();
    search(bank, subsumer, subsumee, 0, &mut used, &subst)
}

/// Match one pattern literal (scope 1) onto a target literal (scope 0),
/// in the given orientation, extending a snapshot of the substitution.
fn match_literal(
    bank: &TermBank,
    pattern: &Literal,
    target: &Literal,
    flipped: bool,
    subst: &Substitution,
) -> Option<Substitution> {
    let (tl, tr) = if flipped {
        (target.right, target.left)
    } else {
        (target.left, target.right)
    };
    let mut snapshot = subst.clone();
    if match_into(bank, Scoped(pattern.left, 1), Scoped(tl, 0), &mut snapshot)
        && match_into(bank, Scoped(pattern.right, 1), Scoped(tr, 0), &mut snapshot)
    {
        Some(snapshot)
    } else {
        None
    }
}

fn search(
    bank: &TermBank,
    subsumer: &Clause,
    subsumee: &Clause,
    idx: usize,
    used: &mut [bool],
    subst: &Substitution,
) -> bool {
    if idx == subsumer.literals.len() {
        return true;
    }
    let pattern = subsumer.literals[idx];

    for k in 0..subsumee.literals.len() {
        if used[k] {
            continue;
        }
        let target = subsumee.literals[k];
        if target.positive != pattern.positive {
            continue;
        }

        for flipped in [false, true] {
            // A symmetric pair only needs one orientation
            if flipped && target.left == target.right {
                continue;
            }
            if let Some(extended) = match_literal(bank, &pattern, &target, flipped, subst) {
                used[k] = true;
                if search(bank, subsumer, subsumee, idx + 1, used, &extended) {
                    return true;
                }
                used[k] = false;
            }
        }
    }
    false
}

/// Forward and backward subsumption rule.
pub struct SubsumptionRule;

impl SubsumptionRule {
    pub fn new() -> Self {
        SubsumptionRule
    }
}

impl Default for SubsumptionRule {
    fn default() -> Self {
        Self::new()
    }
}

impl SimplifyingInference for SubsumptionRule {
    fn name(&self) -> &'static str {
        "Subsumption"
    }

    fn simplify_forward(
        &self,
        clause: &Clause,
        state: &SaturationState,
        rc: &mut RuleContext<'_>,
        _indices: &Indexes,
    ) -> Option<Simplification> {
        let bank = rc.ctx.bank();
        let candidates = state
            .active
            .iter()
            .copied()
            .chain(state.passive.iter());

        for id in candidates {
            if Some(id) == clause.id {
                continue;
            }
            let candidate = state.store.get(id);
            if subsumes(bank, candidate, clause) {
                return Some(Simplification::Redundant { by: vec![id] });
            }
        }
        None
    }

    fn simplify_backward(
        &self,
        given: ClauseId,
        state: &SaturationState,
        rc: &mut RuleContext<'_>,
        _indices: &Indexes,
    ) -> Vec<(ClauseId, Simplification)> {
        let bank = rc.ctx.bank();
        let given_clause = state.store.get(given);
        let mut changes = Vec::new();

        let candidates: Vec<ClauseId> = state
            .active
            .iter()
            .copied()
            .chain(state.passive.iter())
            .filter(|&id| id != given)
            .collect();

        for id in candidates {
            let candidate = state.store.get(id);
            if subsumes(bank, given_clause, candidate) {
                changes.push((id, Simplification::Redundant { by: vec![given] }));
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::clause::Derivation;
    use crate::logic::context::Context;
    use crate::logic::ordering::{Precedence, KBO};

    fn kbo() -> KBO {
        KBO::new(Precedence::default())
    }

    #[test]
    fn test_unit_subsumption() {
        let mut ctx = Context::new();
        let p = ctx.declare_pred("p", 1);
        let x = ctx.var(0);
        let a = ctx.parse_const("a");
        let px = ctx.atom(p, vec![x]).unwrap();
        let pa = ctx.atom(p, vec![a]).unwrap();
        let q = ctx.declare_pred("q", 0);
        let q_atom = ctx.atom(q, vec![]).unwrap();
        let ord = kbo();

        let lit_px = ctx.prop(px, true);
        let lit_pa = ctx.prop(pa, true);
        let lit_q = ctx.prop(q_atom, true);

        let general = Clause::make(&mut ctx, &ord, vec![lit_px], Derivation::input());
        let instance = Clause::make(&mut ctx, &ord, vec![lit_pa, lit_q], Derivation::input());

        assert!(subsumes(ctx.bank(), &general, &instance));
        assert!(!subsumes(ctx.bank(), &instance, &general));
    }

    #[test]
    fn test_polarity_blocks_subsumption() {
        let mut ctx = Context::new();
        let p = ctx.declare_pred("p", 1);
        let x = ctx.var(0);
        let a = ctx.parse_const("a");
        let px = ctx.atom(p, vec![x]).unwrap();
        let pa = ctx.atom(p, vec![a]).unwrap();
        let ord = kbo();

        let pos = ctx.prop(px, true);
        let neg = ctx.prop(pa, false);
        let general = Clause::make(&mut ctx, &ord, vec![pos], Derivation::input());
        let negative = Clause::make(&mut ctx, &ord, vec![neg], Derivation::input());

        assert!(!subsumes(ctx.bank(), &general, &negative));
    }

    #[test]
    fn test_multiset_matching_is_injective() {
        // p(X) | p(Y) does not subsume p(a): two pattern literals cannot
        // share one target literal
        let mut ctx = Context::new();
        let p = ctx.declare_pred("p", 1);
        let x = ctx.var(0);
        let y = ctx.var(1);
        let a = ctx.parse_const("a");
        let px = ctx.atom(p, vec![x]).unwrap();
        let py = ctx.atom(p, vec![y]).unwrap();
        let pa = ctx.atom(p, vec![a]).unwrap();
        let ord = kbo();

        let lx = ctx.prop(px, true);
        let ly = ctx.prop(py, true);
        let la = ctx.prop(pa, true);

        let two = Clause::make(&mut ctx, &ord, vec![lx, ly], Derivation::input());
        let one = Clause::make(&mut ctx, &ord, vec![la], Derivation::input());

        assert!(!subsumes(ctx.bank(), &two, &one));
        assert!(subsumes(ctx.bank(), &one, &one.clone()));
    }

    #[test]
    fn test_consistent_bindings_required() {
        // p(X, X) subsumes p(a, a) but not p(a, b)
        let mut ctx = Context::new();
        let p = ctx.declare_pred("p", 2);
        let x = ctx.var(0);
        let a = ctx.parse_const("a");
        let b = ctx.parse_const("b");
        let pxx = ctx.atom(p, vec![x, x]).unwrap();
        let paa = ctx.atom(p, vec![a, a]).unwrap();
        let pab = ctx.atom(p, vec![a, b]).unwrap();
        let ord = kbo();

        let lxx = ctx.prop(pxx, true);
        let laa = ctx.prop(paa, true);
        let lab = ctx.prop(pab, true);

        let pattern = Clause::make(&mut ctx, &ord, vec![lxx], Derivation::input());
        let good = Clause::make(&mut ctx, &ord, vec![laa], Derivation::input());
        let bad = Clause::make(&mut ctx, &ord, vec![lab], Derivation::input());

        assert!(subsumes(ctx.bank(), &pattern, &good));
        assert!(!subsumes(ctx.bank(), &pattern, &bad));
    }

    #[test]
    fn test_equation_subsumption_flips_sides() {
        let mut ctx = Context::new();
        let f = ctx.declare_fun("f", 1);
        let x = ctx.var(0);
        let a = ctx.parse_const("a");
        let fx = ctx.fun(f, vec![x]).unwrap();
        let fa = ctx.fun(f, vec![a]).unwrap();
        let ord = kbo();

        // f(X) = X subsumes a = f(a) via the flipped orientation
        let general = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::eq(fx, x)],
            Derivation::input(),
        );
        let instance = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::eq(a, fa)],
            Derivation::input(),
        );
        assert!(subsumes(ctx.bank(), &general, &instance));
    }

    #[test]
    fn test_subsumption_transitivity_sample() {
        let mut ctx = Context::new();
        let p = ctx.declare_pred("p", 1);
        let f = ctx.declare_fun("f", 1);
        let x = ctx.var(0);
        let a = ctx.parse_const("a");
        let px = ctx.atom(p, vec![x]).unwrap();
        let fx = ctx.fun(f, vec![x]).unwrap();
        let pfx = ctx.atom(p, vec![fx]).unwrap();
        let fa = ctx.fun(f, vec![a]).unwrap();
        let pfa = ctx.atom(p, vec![fa]).unwrap();
        let q = ctx.declare_pred("q", 0);
        let q_atom = ctx.atom(q, vec![]).unwrap();
        let ord = kbo();

        let l_px = ctx.prop(px, true);
        let l_pfx = ctx.prop(pfx, true);
        let l_pfa = ctx.prop(pfa, true);
        let l_q = ctx.prop(q_atom, false);

        let c = Clause::make(&mut ctx, &ord, vec![l_px], Derivation::input());
        let d = Clause::make(&mut ctx, &ord, vec![l_pfx], Derivation::input());
        let e = Clause::make(&mut ctx, &ord, vec![l_pfa, l_q], Derivation::input());

        assert!(subsumes(ctx.bank(), &c, &d));
        assert!(subsumes(ctx.bank(), &d, &e));
        assert!(subsumes(ctx.bank(), &c, &e));
    }
}
