//! Literal selection strategies
//!
//! A selection function returns a set of negative literal indices that
//! must be resolved upon before the clause does any positive work. An
//! empty result means the eligibility rules fall back to the maximal
//! literals of the clause.

use crate::logic::clause::Clause;
use crate::logic::term::TermBank;

/// Trait for literal selection strategies.
pub trait LiteralSelector: Send + Sync {
    /// Get the name of this selection strategy
    fn name(&self) -> &str;

    /// Select negative literal indices from a clause. Empty means no
    /// selection (maximal literals become eligible).
    fn select(&self, bank: &TermBank, clause: &Clause) -> Vec<usize>;
}

/// Select nothing: inference eligibility comes from maximal literals only.
pub struct SelectNone;

impl LiteralSelector for SelectNone {
    fn name(&self) -> &str {
        "none"
    }

    fn select(&self, _bank: &TermBank, _clause: &Clause) -> Vec<usize> {
        Vec::new()
    }
}

/// Select every negative literal.
pub struct SelectAllNegative;

impl LiteralSelector for SelectAllNegative {
    fn name(&self) -> &str {
        "all-negative"
    }

    fn select(&self, _bank: &TermBank, clause: &Clause) -> Vec<usize> {
        clause
            .literals
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.positive)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Select the first negative literal, if any.
pub struct SelectFirstNegative;

impl LiteralSelector for SelectFirstNegative {
    fn name(&self) -> &str {
        "first-negative"
    }

    fn select(&self, _bank: &TermBank, clause: &Clause) -> Vec<usize> {
        clause
            .literals
            .iter()
            .position(|l| !l.positive)
            .map(|i| vec![i])
            .unwrap_or_default()
    }
}

/// Select one maximal negative literal containing the deepest variable
/// occurrence, ties broken by literal size.
pub struct SelectComplex;

impl SelectComplex {
    fn score(bank: &TermBank, clause: &Clause, i: usize) -> (u32, u32) {
        let lit = &clause.literals[i];
        let depth = bank
            .max_var_depth(lit.left)
            .max(bank.max_var_depth(lit.right))
            .unwrap_or(0);
        (depth, lit.weight(bank))
    }
}

impl LiteralSelector for SelectComplex {
    fn name(&self) -> &str {
        "complex"
    }

    fn select(&self, bank: &TermBank, clause: &Clause) -> Vec<usize> {
        let negatives: Vec<usize> = clause
            .literals
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.positive)
            .map(|(i, _)| i)
            .collect();
        if negatives.is_empty() {
            return Vec::new();
        }

        // Prefer negatives that are also maximal in the clause
        let pool: Vec<usize> = {
            let max_neg: Vec<usize> = negatives
                .iter()
                .copied()
                .filter(|&i| clause.maximal[i])
                .collect();
            if max_neg.is_empty() {
                negatives
            } else {
                max_neg
            }
        };

        pool.into_iter()
            .max_by_key(|&i| {
                let (depth, size) = Self::score(bank, clause, i);
                // Lowest index wins ties deterministically
                (depth, size, usize::MAX - i)
            })
            .map(|best| vec![best])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::clause::Derivation;
    use crate::logic::context::Context;
    use crate::logic::literal::Literal;
    use crate::logic::ordering::{Precedence, KBO};

    fn fixture() -> (Context, KBO) {
        (Context::new(), KBO::new(Precedence::default()))
    }

    #[test]
    fn test_select_none() {
        let (mut ctx, ord) = fixture();
        let a = ctx.parse_const("a");
        let b = ctx.parse_const("b");
        let clause = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::neq(a, b)],
            Derivation::input(),
        );
        assert!(SelectNone.select(ctx.bank(), &clause).is_empty());
    }

    #[test]
    fn test_select_all_negative() {
        let (mut ctx, ord) = fixture();
        let a = ctx.parse_const("a");
        let b = ctx.parse_const("b");
        let c = ctx.parse_const("c");
        let clause = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::neq(a, b), Literal::eq(a, c), Literal::neq(b, c)],
            Derivation::input(),
        );
        let sel = SelectAllNegative.select(ctx.bank(), &clause);
        assert_eq!(sel.len(), 2);
        assert!(sel.iter().all(|&i| !clause.literals[i].positive));
    }

    #[test]
    fn test_select_first_negative() {
        let (mut ctx, ord) = fixture();
        let a = ctx.parse_const("a");
        let b = ctx.parse_const("b");

        let all_pos = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::eq(a, b)],
            Derivation::input(),
        );
        assert!(SelectFirstNegative
            .select(ctx.bank(), &all_pos)
            .is_empty());

        let mixed = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::eq(a, b), Literal::neq(a, b)],
            Derivation::input(),
        );
        let sel = SelectFirstNegative.select(ctx.bank(), &mixed);
        assert_eq!(sel.len(), 1);
        assert!(!mixed.literals[sel[0]].positive);
    }

    #[test]
    fn test_select_complex_prefers_deep_variables() {
        let (mut ctx, ord) = fixture();
        let f = ctx.declare_fun("f", 1);
        let a = ctx.parse_const("a");
        let x = ctx.var(0);
        let fx = ctx.fun(f, vec![x]).unwrap();
        let ffx = ctx.fun(f, vec![fx]).unwrap();

        // f(f(X)) != a has a deeper variable than X != a
        let clause = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::neq(x, a), Literal::neq(ffx, a)],
            Derivation::input(),
        );
        let sel = SelectComplex.select(ctx.bank(), &clause);
        assert_eq!(sel.len(), 1);
        let lit = &clause.literals[sel[0]];
        assert_eq!(ctx.bank().max_var_depth(lit.left), Some(2));
    }
}
