//! Index registry for the saturation loop
//!
//! Three discrimination trees plus a unit-clause set, updated on clause
//! lifecycle events:
//!
//! - `superpos_into`: every non-variable subterm of an eligible literal of
//!   an active clause (targets for superposition and backward
//!   demodulation)
//! - `superpos_from`: the orientable sides of eligible positive equations
//!   of active clauses (sources for superposition)
//! - `demod`: the orientable sides of active unit equations (rewrite
//!   rules for demodulation)
//! - `units`: all active unit clauses (for simplify-reflect)
//!
//! Deletion is lazy: a `live` set masks retrieval, so backward-simplified
//! clauses stop appearing without walking the tries.

pub mod discrimination_tree;

pub use discrimination_tree::{DiscriminationTree, IndexEntry};

use indexmap::IndexSet;
use std::collections::HashSet;

use crate::logic::clause::{Clause, ClauseId};
use crate::logic::ordering::TermOrdering;
use crate::logic::position::{Position, Step};
use crate::logic::term::{TermBank, TermId};

/// The saturation loop's shared indices.
#[derive(Debug, Default)]
pub struct Indexes {
    superpos_into: DiscriminationTree,
    superpos_from: DiscriminationTree,
    demod: DiscriminationTree,
    units: IndexSet<ClauseId>,
    live: HashSet<ClauseId>,
}

impl Indexes {
    pub fn new() -> Self {
        Indexes::default()
    }

    /// Is the clause still live in the index?
    pub fn is_live(&self, id: ClauseId) -> bool {
        self.live.contains(&id)
    }

    /// Index an activated clause. Selection must already be recorded on
    /// the clause, since eligibility drives what gets indexed.
    pub fn on_activate(&mut self, bank: &TermBank, top: TermId, id: ClauseId, clause: &Clause) {
        for i in clause.eligible() {
            let lit = &clause.literals[i];
            let sides: &[(TermId, Step)] = if lit.is_predicate(top) {
                &[(lit.left, Step::Left)]
            } else {
                &[(lit.left, Step::Left), (lit.right, Step::Right)]
            };
            for &(side, step) in sides {
                for (sub, pos) in bank.positions(side) {
                    if bank.is_var(sub) {
                        continue;
                    }
                    self.superpos_into.insert(
                        bank,
                        sub,
                        IndexEntry {
                            clause: id,
                            literal: i,
                            position: pos.below(step),
                        },
                    );
                }
            }
        }

        for i in clause.positive_eligible() {
            let lit = &clause.literals[i];
            if !lit.is_equation(top) {
                continue;
            }
            let orientation = clause.orientations[i];
            if orientation != TermOrdering::Less {
                self.superpos_from.insert(
                    bank,
                    lit.left,
                    IndexEntry {
                        clause: id,
                        literal: i,
                        position: Position::side(Step::Left),
                    },
                );
            }
            if orientation != TermOrdering::Greater {
                self.superpos_from.insert(
                    bank,
                    lit.right,
                    IndexEntry {
                        clause: id,
                        literal: i,
                        position: Position::side(Step::Right),
                    },
                );
            }
        }

        if clause.is_unit_equation(top) {
            let lit = &clause.literals[0];
            match clause.orientations[0] {
                TermOrdering::Greater => {
                    self.demod.insert(
                        bank,
                        lit.left,
                        IndexEntry {
                            clause: id,
                            literal: 0,
                            position: Position::side(Step::Left),
                        },
                    );
                }
                TermOrdering::Less => {
                    self.demod.insert(
                        bank,
                        lit.right,
                        IndexEntry {
                            clause: id,
                            literal: 0,
                            position: Position::side(Step::Right),
                        },
                    );
                }
                TermOrdering::Incomparable => {
                    // Either side may dominate once instantiated; the
                    // matcher re-checks the ordering per rewrite
                    self.demod.insert(
                        bank,
                        lit.left,
                        IndexEntry {
                            clause: id,
                            literal: 0,
                            position: Position::side(Step::Left),
                        },
                    );
                    self.demod.insert(
                        bank,
                        lit.right,
                        IndexEntry {
                            clause: id,
                            literal: 0,
                            position: Position::side(Step::Right),
                        },
                    );
                }
                TermOrdering::Equal => {}
            }
        }

        if clause.is_unit() {
            self.units.insert(id);
        }

        self.live.insert(id);
    }

    /// Remove a clause from retrieval (lazy: entries stay in the tries).
    pub fn on_delete(&mut self, id: ClauseId) {
        self.live.remove(&id);
        self.units.shift_remove(&id);
    }

    /// Active-clause subterms that may unify with the query.
    pub fn unifiable_subterms(&self, bank: &TermBank, query: TermId) -> Vec<(TermId, IndexEntry)> {
        self.filter_live(self.superpos_into.retrieve_unifiable(bank, query))
    }

    /// Active-clause subterms that may be instances of the query (for
    /// backward demodulation).
    pub fn instance_subterms(&self, bank: &TermBank, query: TermId) -> Vec<(TermId, IndexEntry)> {
        self.filter_live(self.superpos_into.retrieve_instances(bank, query))
    }

    /// Eligible equation sides of active clauses that may unify with the
    /// query.
    pub fn unifiable_equations(&self, bank: &TermBank, query: TermId) -> Vec<(TermId, IndexEntry)> {
        self.filter_live(self.superpos_from.retrieve_unifiable(bank, query))
    }

    /// Unit-equation sides that may generalize the query (for forward
    /// demodulation).
    pub fn generalizing_rules(&self, bank: &TermBank, query: TermId) -> Vec<(TermId, IndexEntry)> {
        self.filter_live(self.demod.retrieve_generalizations(bank, query))
    }

    /// Active unit clauses, in activation order.
    pub fn units(&self) -> impl Iterator<Item = ClauseId> + '_ {
        self.units.iter().copied()
    }

    fn filter_live(&self, mut results: Vec<(TermId, IndexEntry)>) -> Vec<(TermId, IndexEntry)> {
        results.retain(|(_, e)| self.live.contains(&e.clause));
        results
    }

    /// Drop everything. Used between problems.
    pub fn clear(&mut self) {
        *self = Indexes::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::clause::{Clause, Derivation};
    use crate::logic::context::Context;
    use crate::logic::literal::Literal;
    use crate::logic::ordering::{Precedence, KBO};

    #[test]
    fn test_unit_equation_indexed_for_demodulation() {
        let mut ctx = Context::new();
        let f = ctx.declare_fun("f", 1);
        let a = ctx.parse_const("a");
        let b = ctx.parse_const("b");
        let fa = ctx.fun(f, vec![a]).unwrap();
        let ord = KBO::new(Precedence::default());

        // f(a) = b orients left to right
        let clause = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::eq(fa, b)],
            Derivation::input(),
        );
        clause.select(&[]).unwrap();

        let mut idx = Indexes::new();
        idx.on_activate(ctx.bank(), ctx.top(), ClauseId(0), &clause);

        let rules = idx.generalizing_rules(ctx.bank(), fa);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].1.clause, ClauseId(0));

        // The smaller side is not a rewrite rule
        assert!(idx.generalizing_rules(ctx.bank(), b).is_empty());

        idx.on_delete(ClauseId(0));
        assert!(idx.generalizing_rules(ctx.bank(), fa).is_empty());
    }

    #[test]
    fn test_eligible_subterms_indexed() {
        let mut ctx = Context::new();
        let p = ctx.declare_pred("p", 1);
        let g = ctx.declare_fun("g", 1);
        let a = ctx.parse_const("a");
        let ga = ctx.fun(g, vec![a]).unwrap();
        let atom = ctx.atom(p, vec![ga]).unwrap();
        let ord = KBO::new(Precedence::default());

        let lit = ctx.prop(atom, true);
        let clause = Clause::make(&mut ctx, &ord, vec![lit], Derivation::input());
        clause.select(&[]).unwrap();

        let mut idx = Indexes::new();
        idx.on_activate(ctx.bank(), ctx.top(), ClauseId(3), &clause);

        // The atom itself, g(a), and a are all indexed
        for sub in [atom, ga, a] {
            let hits = idx.unifiable_subterms(ctx.bank(), sub);
            assert!(
                hits.iter().any(|(t, e)| *t == sub && e.clause == ClauseId(3)),
                "missing subterm"
            );
        }
    }

    #[test]
    fn test_from_index_respects_orientation() {
        let mut ctx = Context::new();
        let f = ctx.declare_fun("f", 1);
        let a = ctx.parse_const("a");
        let fa = ctx.fun(f, vec![a]).unwrap();
        let ord = KBO::new(Precedence::default());

        let clause = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::eq(fa, a)],
            Derivation::input(),
        );
        clause.select(&[]).unwrap();

        let mut idx = Indexes::new();
        idx.on_activate(ctx.bank(), ctx.top(), ClauseId(1), &clause);

        // Only the greater side is a superposition source
        let x = ctx.var(0);
        let fx = ctx.fun(f, vec![x]).unwrap();
        let hits = idx.unifiable_equations(ctx.bank(), fx);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, fa);
    }
}
