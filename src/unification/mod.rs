//! Unification, matching and variant checking
//!
//! All three share one lockstep walk over two scoped terms and differ only
//! in how variables may bind:
//!
//! - `unify`: a variable on either side binds to anything type-compatible;
//!   the occurs check runs across scopes.
//! - `match_into`: only variables on the pattern side bind, consistently.
//! - `variant`: both sides bind, but only variable to variable, and the
//!   induced map must be a bijection.
//!
//! Failure means "does not apply" and is reported through `bool`/`Option`,
//! never through an error value. Bindings are written into a shared
//! `Substitution` so multi-literal callers (subsumption, rule premises)
//! can thread constraints through consecutive calls.


use std::collections::HashMap;

use crate::logic::substitution::{Scope, Scoped, Substitution};
use crate::logic::term::{TermBank, TermId, TermView, VarId};

/// Unify two scoped terms, returning a most general unifier if one exists.
pub fn unify(bank: &TermBank, s: Scoped<TermId>, t: Scoped<TermId>) -> Option<Substitution> {
    let mut subst = Substitution::new();
    if unify_into(bank, s, t, &mut subst) {
        Some(subst)
    } else {
        None
    }
}

/// Unify two scoped terms under an existing substitution.
///
/// On failure the substitution may hold partial bindings; callers discard
/// it or track their own undo point.
pub fn unify_into(bank: &TermBank, s: Scoped<TermId>, t: Scoped<TermId>, subst: &mut Substitution) -> bool {
    let s = subst.resolve(bank, s);
    let t = subst.resolve(bank, t);

    if s == t || (s.0 == t.0 && bank.is_ground(s.0)) {
        return true;
    }

    match (bank.view(s.0), bank.view(t.0)) {
        (TermView::Var(v, ty), _) => bind_var(bank, subst, Scoped(v, s.1), t, ty),
        (_, TermView::Var(v, ty)) => bind_var(bank, subst, Scoped(v, t.1), s, ty),
        (
            TermView::App { head: h1, args: a1 },
            TermView::App { head: h2, args: a2 },
        ) => {
            if a1.len() != a2.len() {
                return false;
            }
            if !unify_into(bank, Scoped(h1, s.1), Scoped(h2, t.1), subst) {
                return false;
            }
            a1.iter()
                .zip(a2)
                .all(|(&x, &y)| unify_into(bank, Scoped(x, s.1), Scoped(y, t.1), subst))
        }
        (
            TermView::Lambda { arg: ty1, body: b1 },
            TermView::Lambda { arg: ty2, body: b2 },
        ) => ty1 == ty2 && unify_into(bank, Scoped(b1, s.1), Scoped(b2, t.1), subst),
        // Distinct constants, distinct bound indices, and mixed shapes all clash
        _ => false,
    }
}

/// Bind a variable after the type and occurs checks.
fn bind_var(
    bank: &TermBank,
    subst: &mut Substitution,
    var: Scoped<VarId>,
    term: Scoped<TermId>,
    var_ty: crate::logic::types::TypeId,
) -> bool {
    if bank.ty(term.0) != var_ty {
        return false;
    }
    if occurs(bank, subst, var, term) {
        return false;
    }
    subst.insert(var, term);
    true
}

/// Occurs check through the substitution: does `var` occur in `term`?
fn occurs(bank: &TermBank, subst: &Substitution, var: Scoped<VarId>, term: Scoped<TermId>) -> bool {
    let term = subst.resolve(bank, term);
    if bank.is_ground(term.0) {
        return false;
    }
    match bank.view(term.0) {
        TermView::Var(v, _) => Scoped(v, term.1) == var,
        TermView::Bound(_, _) | TermView::Const(_, _) => false,
        TermView::App { head, args } => {
            occurs(bank, subst, var, Scoped(head, term.1))
                || args
                    .iter()
                    .any(|&a| occurs(bank, subst, var, Scoped(a, term.1)))
        }
        TermView::Lambda { body, .. } => occurs(bank, subst, var, Scoped(body, term.1)),
    }
}

/// One-way match: find a substitution taking the pattern to the target.
///
/// Only variables in the pattern's scope may bind; the target is rigid.
/// The pattern and target must live in distinct scopes unless the pattern
/// is ground.
pub fn matches(bank: &TermBank, pattern: Scoped<TermId>, target: Scoped<TermId>) -> Option<Substitution> {
    let mut subst = Substitution::new();
    if match_into(bank, pattern, target, &mut subst) {
        Some(subst)
    } else {
        None
    }
}

/// One-way match under an existing substitution.
pub fn match_into(
    bank: &TermBank,
    pattern: Scoped<TermId>,
    target: Scoped<TermId>,
    subst: &mut Substitution,
) -> bool {
    match_rec(bank, pattern, target, pattern.1, subst)
}

fn match_rec(
    bank: &TermBank,
    pattern: Scoped<TermId>,
    target: Scoped<TermId>,
    pattern_scope: Scope,
    subst: &mut Substitution,
) -> bool {
    let pattern = subst.resolve(bank, pattern);

    if pattern == target || (pattern.0 == target.0 && bank.is_ground(pattern.0)) {
        return true;
    }

    match (bank.view(pattern.0), bank.view(target.0)) {
        (TermView::Var(v, ty), _) => {
            // A pattern variable binds once; a variable resolved into the
            // target side is rigid and only equal to itself (handled above)
            pattern.1 == pattern_scope
                && ty == bank.ty(target.0)
                && {
                    subst.insert(Scoped(v, pattern.1), target);
                    true
                }
        }
        (
            TermView::App { head: h1, args: a1 },
            TermView::App { head: h2, args: a2 },
        ) => {
            a1.len() == a2.len()
                && match_rec(bank, Scoped(h1, pattern.1), Scoped(h2, target.1), pattern_scope, subst)
                && a1.iter().zip(a2).all(|(&x, &y)| {
                    match_rec(bank, Scoped(x, pattern.1), Scoped(y, target.1), pattern_scope, subst)
                })
        }
        (
            TermView::Lambda { arg: ty1, body: b1 },
            TermView::Lambda { arg: ty2, body: b2 },
        ) => {
            ty1 == ty2
                && match_rec(bank, Scoped(b1, pattern.1), Scoped(b2, target.1), pattern_scope, subst)
        }
        _ => false,
    }
}

/// Variant check: are the two terms equal up to a bijective renaming of
/// variables? Returns the renaming as a substitution on the left term.
pub fn variant(bank: &TermBank, a: Scoped<TermId>, b: Scoped<TermId>) -> Option<Substitution> {
    let mut fwd: HashMap<Scoped<VarId>, Scoped<TermId>> = HashMap::new();
    let mut bwd: HashMap<Scoped<VarId>, Scoped<VarId>> = HashMap::new();
    if variant_rec(bank, a, b, &mut fwd, &mut bwd) {
        let mut subst = Substitution::new();
        for (var, term) in fwd {
            subst.insert(var, term);
        }
        Some(subst)
    } else {
        None
    }
}

fn variant_rec(
    bank: &TermBank,
    a: Scoped<TermId>,
    b: Scoped<TermId>,
    fwd: &mut HashMap<Scoped<VarId>, Scoped<TermId>>,
    bwd: &mut HashMap<Scoped<VarId>, Scoped<VarId>>,
) -> bool {
    if a.0 == b.0 && bank.is_ground(a.0) {
        return true;
    }
    match (bank.view(a.0), bank.view(b.0)) {
        (TermView::Var(v1, ty1), TermView::Var(v2, ty2)) => {
            if ty1 != ty2 {
                return false;
            }
            let av = Scoped(v1, a.1);
            let bv = Scoped(v2, b.1);
            match (fwd.get(&av), bwd.get(&bv)) {
                (None, None) => {
                    fwd.insert(av, b);
                    bwd.insert(bv, av);
                    true
                }
                (Some(&mapped), Some(&reverse)) => mapped == b && reverse == av,
                // One side already committed elsewhere: not a bijection
                _ => false,
            }
        }
        (TermView::Const(s1, _), TermView::Const(s2, _)) => s1 == s2,
        (TermView::Bound(i, ty1), TermView::Bound(j, ty2)) => i == j && ty1 == ty2,
        (
            TermView::App { head: h1, args: a1 },
            TermView::App { head: h2, args: a2 },
        ) => {
            a1.len() == a2.len()
                && variant_rec(bank, Scoped(h1, a.1), Scoped(h2, b.1), fwd, bwd)
                && a1
                    .iter()
                    .zip(a2)
                    .all(|(&x, &y)| variant_rec(bank, Scoped(x, a.1), Scoped(y, b.1), fwd, bwd))
        }
        (
            TermView::Lambda { arg: ty1, body: b1 },
            TermView::Lambda { arg: ty2, body: b2 },
        ) => ty1 == ty2 && variant_rec(bank, Scoped(b1, a.1), Scoped(b2, b.1), fwd, bwd),
        _ => false,
    }
}
