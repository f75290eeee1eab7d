//! Shared helpers for inference rules.

use crate::logic::clause::Clause;
use crate::logic::context::Context;
use crate::logic::literal::Literal;
use crate::logic::ordering::TermOrdering;
use crate::logic::substitution::{Renaming, Scope, Substitution};
use crate::logic::term::{TermId, VarId};

/// Collect the literals of a clause except the excluded indices, with the
/// substitution applied at the given scope.
pub fn collect_literals_except(
    ctx: &mut Context,
    subst: &Substitution,
    renaming: &mut Renaming,
    clause: &Clause,
    exclude: &[usize],
    scope: Scope,
) -> Vec<Literal> {
    clause
        .literals
        .iter()
        .enumerate()
        .filter(|(i, _)| !exclude.contains(i))
        .map(|(_, lit)| ctx.apply_literal(subst, renaming, lit, scope))
        .collect()
}

/// Render the unifier into result-clause variables for the derivation
/// record, sorted for determinism.
pub fn render_bindings(
    ctx: &mut Context,
    subst: &Substitution,
    renaming: &mut Renaming,
) -> Vec<(VarId, TermId)> {
    let mut raw: Vec<_> = subst.iter().collect();
    raw.sort_by_key(|(var, _)| (var.1, var.0));

    let mut out = Vec::with_capacity(raw.len());
    for (var, value) in raw {
        let key = renaming.rename(var);
        let rendered = ctx.apply_subst(subst, renaming, value);
        out.push((key, rendered));
    }
    out
}

/// The rewrite directions a literal admits under its cached orientation:
/// (larger, smaller) pairs that may act as left and right of a rule.
/// Equations are stored larger-side-left, so `Less` never occurs.
pub fn directions(lit: &Literal, orientation: TermOrdering) -> Vec<(TermId, TermId)> {
    match orientation {
        TermOrdering::Greater => vec![(lit.left, lit.right)],
        TermOrdering::Less => vec![(lit.right, lit.left)],
        TermOrdering::Incomparable => {
            vec![(lit.left, lit.right), (lit.right, lit.left)]
        }
        TermOrdering::Equal => Vec::new(),
    }
}
