//! Clauses: interned multisets of literals with proof parentage
//!
//! `Clause::make` runs the normalization pipeline exactly once, at
//! creation time: duplicate removal, canonical literal order, dense
//! variable renumbering, and the ordering caches (orientation per literal
//! and the maximal-literal bit-array). Normalized clauses intern through a
//! `ClauseStore` so alpha-equivalent clauses share one `ClauseId`.
//!
//! Interned clauses are immutable except for the selected-literal cache,
//! which is set exactly once by literal selection.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use super::context::Context;
use super::interner::Interner;
use super::literal::Literal;
use super::ordering::{TermOrder, TermOrdering};
use super::substitution::Renaming;
use super::substitution::Substitution;
use super::term::{TermBank, TermId, VarId};

/// ID of an interned clause
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClauseId(pub(crate) u32);

impl ClauseId {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ClauseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// The inference step that produced a clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
    /// Rule name ("Input" for initial clauses)
    pub rule: String,
    /// Parent clauses, outermost premise first
    pub parents: Vec<ClauseId>,
    /// The unifier applied by the step, rendered into result variables
    pub bindings: Vec<(VarId, TermId)>,
}

impl Derivation {
    pub fn input() -> Self {
        Derivation {
            rule: "Input".into(),
            parents: Vec::new(),
            bindings: Vec::new(),
        }
    }

    pub fn new(rule: &str, parents: Vec<ClauseId>) -> Self {
        Derivation {
            rule: rule.into(),
            parents,
            bindings: Vec::new(),
        }
    }

    pub fn with_bindings(mut self, bindings: Vec<(VarId, TermId)>) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn is_input(&self) -> bool {
        self.rule == "Input"
    }
}

/// Errors from the selection cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Selection already set; interned clauses are otherwise immutable
    #[error("clause selection is frozen")]
    Frozen,
    /// A selected index refers to a positive literal
    #[error("selected literal {0} is not negative")]
    NotNegative(usize),
}

/// A clause: a fixed array of literals, normalized at creation.
#[derive(Debug)]
pub struct Clause {
    pub id: Option<ClauseId>,
    pub literals: Vec<Literal>,
    /// Symbol count over all literals
    pub weight: u32,
    /// Free variables, the dense prefix 0..k-1 after normalization
    pub free_vars: Vec<VarId>,
    /// Bit-array: literal i is maximal under the ordering
    pub maximal: Vec<bool>,
    /// Cached side comparison per literal under the ordering
    pub orientations: Vec<TermOrdering>,
    /// Selected-literal bit-array, set exactly once
    selected: OnceLock<Vec<bool>>,
    pub derivation: Derivation,
    /// Priority modifier for the passive queue
    pub penalty: u32,
    /// Iteration at which the clause was created
    pub age: u32,
}

impl Clone for Clause {
    fn clone(&self) -> Self {
        Clause {
            id: self.id,
            literals: self.literals.clone(),
            weight: self.weight,
            free_vars: self.free_vars.clone(),
            maximal: self.maximal.clone(),
            orientations: self.orientations.clone(),
            selected: self.selected.clone(),
            derivation: self.derivation.clone(),
            penalty: self.penalty,
            age: self.age,
        }
    }
}

impl Clause {
    /// Build a clause from literals, running the normalization pipeline:
    ///
    /// 1. orient each equation so the larger side is on the left, then
    ///    remove duplicate literals
    /// 2. sort by a variable-blind structural key (canonical order that
    ///    does not depend on incoming variable names)
    /// 3. renumber free variables to the dense prefix 0..k-1
    /// 4. final sort by literal hash
    ///
    /// Trivially false literals are kept: deleting them is the business of
    /// equality resolution, so refutations carry their proof steps.
    pub fn make(
        ctx: &mut Context,
        ord: &dyn TermOrder,
        literals: Vec<Literal>,
        derivation: Derivation,
    ) -> Clause {
        let mut lits: Vec<Literal> = Vec::with_capacity(literals.len());
        for lit in literals {
            // Orient equations so the larger side is on the left
            let lit = if ord.compare(ctx.bank(), lit.left, lit.right) == TermOrdering::Less {
                lit.flip()
            } else {
                lit
            };
            if !lits.contains(&lit) {
                lits.push(lit);
            }
        }

        lits.sort_by_key(|l| l.var_blind_key(ctx.bank()));

        // Dense renaming in traversal order of the canonical literal order
        let empty = Substitution::new();
        let mut renaming = Renaming::new(0);
        let mut renamed: Vec<Literal> = Vec::with_capacity(lits.len());
        for lit in &lits {
            renamed.push(ctx.apply_literal(&empty, &mut renaming, lit, 0));
        }

        renamed.sort_by_key(|l| l.hash_key(ctx.bank()));

        let bank = ctx.bank();
        let weight = renamed.iter().map(|l| l.weight(bank)).sum();
        let orientations: Vec<TermOrdering> = renamed
            .iter()
            .map(|l| ord.compare(bank, l.left, l.right))
            .collect();

        let mut free_vars: Vec<VarId> = Vec::new();
        for lit in &renamed {
            bank.collect_vars(lit.left, &mut free_vars);
            bank.collect_vars(lit.right, &mut free_vars);
        }
        free_vars.sort();

        let maximal = compute_maximal(bank, ord, &renamed);

        Clause {
            id: None,
            literals: renamed,
            weight,
            free_vars,
            maximal,
            orientations,
            selected: OnceLock::new(),
            derivation,
            penalty: 0,
            age: 0,
        }
    }

    /// The empty clause (a contradiction)?
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// A tautology: contains a reflexive positive equation or a
    /// complementary literal pair.
    pub fn is_tautology(&self) -> bool {
        for (i, lit) in self.literals.iter().enumerate() {
            if lit.is_trivial() {
                return true;
            }
            for other in &self.literals[i + 1..] {
                if lit.positive != other.positive
                    && ((lit.left == other.left && lit.right == other.right)
                        || (lit.left == other.right && lit.right == other.left))
                {
                    return true;
                }
            }
        }
        false
    }

    /// A unit positive equation (a rewrite rule candidate)?
    pub fn is_unit_equation(&self, top: TermId) -> bool {
        self.literals.len() == 1
            && self.literals[0].positive
            && self.literals[0].is_equation(top)
    }

    /// A unit clause of either sign
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }

    /// Indices of maximal literals
    pub fn maximal_indices(&self) -> Vec<usize> {
        self.maximal
            .iter()
            .enumerate()
            .filter(|(_, &m)| m)
            .map(|(i, _)| i)
            .collect()
    }

    /// Record the literal selection, exactly once. Indices must refer to
    /// negative literals.
    pub fn select(&self, indices: &[usize]) -> Result<(), SelectionError> {
        for &i in indices {
            if self.literals.get(i).map_or(true, |l| l.positive) {
                return Err(SelectionError::NotNegative(i));
            }
        }
        let mut bits = vec![false; self.literals.len()];
        for &i in indices {
            bits[i] = true;
        }
        self.selected.set(bits).map_err(|_| SelectionError::Frozen)
    }

    /// The selection bit-array, None until selection ran
    pub fn selected(&self) -> Option<&[bool]> {
        self.selected.get().map(|v| v.as_slice())
    }

    fn selection_nonempty(&self) -> bool {
        self.selected
            .get()
            .map_or(false, |bits| bits.iter().any(|&b| b))
    }

    /// Literals eligible for resolution-style inferences: the selected
    /// literals when selection is non-empty, the maximal ones otherwise.
    pub fn eligible(&self) -> Vec<usize> {
        if let Some(bits) = self.selected.get() {
            if bits.iter().any(|&b| b) {
                return bits
                    .iter()
                    .enumerate()
                    .filter(|(_, &b)| b)
                    .map(|(i, _)| i)
                    .collect();
            }
        }
        self.maximal_indices()
    }

    /// Positive literals eligible as paramodulation-from premises. A
    /// clause with selected (negative) literals contributes none.
    pub fn positive_eligible(&self) -> Vec<usize> {
        if self.selection_nonempty() {
            return Vec::new();
        }
        self.maximal
            .iter()
            .enumerate()
            .filter(|(i, &m)| m && self.literals[*i].positive)
            .map(|(i, _)| i)
            .collect()
    }

    /// Format for display with an interner for name resolution
    pub fn display<'a>(
        &'a self,
        bank: &'a TermBank,
        interner: &'a Interner,
        top: TermId,
    ) -> ClauseDisplay<'a> {
        ClauseDisplay {
            clause: self,
            bank,
            interner,
            top,
        }
    }
}

fn compute_maximal(bank: &TermBank, ord: &dyn TermOrder, literals: &[Literal]) -> Vec<bool> {
    let n = literals.len();
    let mut maximal = vec![true; n];
    for i in 0..n {
        for j in 0..n {
            if i != j && literals[j].compare(bank, ord, &literals[i]) == TermOrdering::Greater {
                maximal[i] = false;
                break;
            }
        }
    }
    maximal
}

/// Display wrapper for a clause
pub struct ClauseDisplay<'a> {
    clause: &'a Clause,
    bank: &'a TermBank,
    interner: &'a Interner,
    top: TermId,
}

impl<'a> fmt::Display for ClauseDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clause.is_empty() {
            write!(f, "$false")
        } else {
            for (i, lit) in self.clause.literals.iter().enumerate() {
                if i > 0 {
                    write!(f, " | ")?;
                }
                write!(f, "{}", lit.display(self.bank, self.interner, self.top))?;
            }
            Ok(())
        }
    }
}

/// Hash-consing store for clauses, keyed on the normalized literal array.
///
/// Alpha-equivalent clauses normalize to the same literals and intern to
/// the same `ClauseId`. Removal from a clause set never destroys the
/// clause; the store owns every clause for the lifetime of the run.
#[derive(Debug, Default)]
pub struct ClauseStore {
    clauses: Vec<Arc<Clause>>,
    lookup: HashMap<Vec<Literal>, ClauseId>,
}

impl ClauseStore {
    pub fn new() -> Self {
        ClauseStore {
            clauses: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Intern a normalized clause. Returns the id and whether the clause
    /// was fresh; an existing alpha-equivalent clause keeps its first
    /// derivation.
    pub fn insert(&mut self, mut clause: Clause) -> (ClauseId, bool) {
        if let Some(&id) = self.lookup.get(&clause.literals) {
            return (id, false);
        }
        let id = ClauseId(self.clauses.len() as u32);
        clause.id = Some(id);
        self.lookup.insert(clause.literals.clone(), id);
        self.clauses.push(Arc::new(clause));
        (id, true)
    }

    pub fn get(&self, id: ClauseId) -> &Arc<Clause> {
        &self.clauses[id.as_usize()]
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Clause>> {
        self.clauses.iter()
    }

    /// Drop all clauses. Used between problems.
    pub fn clear(&mut self) {
        self.clauses.clear();
        self.lookup.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ordering::{Precedence, KBO};

    fn kbo() -> KBO {
        KBO::new(Precedence::default())
    }

    #[test]
    fn test_make_removes_duplicates() {
        let mut ctx = Context::new();
        let a = ctx.parse_const("a");
        let b = ctx.parse_const("b");
        let ord = kbo();

        let clause = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::eq(a, b), Literal::eq(a, b), Literal::neq(a, b)],
            Derivation::input(),
        );
        assert_eq!(clause.len(), 2);
    }

    #[test]
    fn test_make_keeps_absurd_literals() {
        let mut ctx = Context::new();
        let a = ctx.parse_const("a");
        let ord = kbo();

        let clause = Clause::make(&mut ctx, &ord, vec![Literal::neq(a, a)], Derivation::input());
        assert_eq!(clause.len(), 1);
        assert!(clause.literals[0].is_absurd());
        assert!(!clause.is_empty());
    }

    #[test]
    fn test_variable_normalization() {
        let mut ctx = Context::new();
        let f = ctx.declare_fun("f", 1);
        let x = ctx.var(17);
        let fx = ctx.fun(f, vec![x]).unwrap();
        let y = ctx.var(99);
        let ord = kbo();

        let clause = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::eq(fx, y)],
            Derivation::input(),
        );
        assert_eq!(clause.free_vars, vec![VarId(0), VarId(1)]);
    }

    #[test]
    fn test_alpha_equivalent_clauses_intern_together() {
        let mut ctx = Context::new();
        let f = ctx.declare_fun("f", 1);
        let p = ctx.declare_pred("p", 1);
        let ord = kbo();

        // p(f(X5)) | f(X5) = X7   vs   f(X2) = X4 | p(f(X2))
        let x5 = ctx.var(5);
        let x7 = ctx.var(7);
        let fx5 = ctx.fun(f, vec![x5]).unwrap();
        let p_fx5 = ctx.atom(p, vec![fx5]).unwrap();
        let l1a = ctx.prop(p_fx5, true);
        let l1b = Literal::eq(fx5, x7);

        let x2 = ctx.var(2);
        let x4 = ctx.var(4);
        let fx2 = ctx.fun(f, vec![x2]).unwrap();
        let p_fx2 = ctx.atom(p, vec![fx2]).unwrap();
        let l2a = Literal::eq(fx2, x4);
        let l2b = ctx.prop(p_fx2, true);

        let c1 = Clause::make(&mut ctx, &ord, vec![l1a, l1b], Derivation::input());
        let c2 = Clause::make(&mut ctx, &ord, vec![l2a, l2b], Derivation::input());
        assert_eq!(c1.literals, c2.literals);

        let mut store = ClauseStore::new();
        let (id1, fresh1) = store.insert(c1);
        let (id2, fresh2) = store.insert(c2);
        assert!(fresh1);
        assert!(!fresh2);
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_tautology_detection() {
        let mut ctx = Context::new();
        let a = ctx.parse_const("a");
        let b = ctx.parse_const("b");
        let p = ctx.declare_pred("p", 1);
        let pa = ctx.atom(p, vec![a]).unwrap();
        let ord = kbo();

        let refl = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::eq(a, a), Literal::eq(a, b)],
            Derivation::input(),
        );
        assert!(refl.is_tautology());

        let pos = ctx.prop(pa, true);
        let neg = ctx.prop(pa, false);
        let comp = Clause::make(&mut ctx, &ord, vec![pos, neg], Derivation::input());
        assert!(comp.is_tautology());

        let fine = Clause::make(&mut ctx, &ord, vec![pos], Derivation::input());
        assert!(!fine.is_tautology());

        // s = t with t != s flipped counts as complementary too
        let eq = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::eq(a, b), Literal::neq(b, a)],
            Derivation::input(),
        );
        assert!(eq.is_tautology());
    }

    #[test]
    fn test_maximal_literals() {
        let mut ctx = Context::new();
        let f = ctx.declare_fun("f", 1);
        let a = ctx.parse_const("a");
        let fa = ctx.fun(f, vec![a]).unwrap();
        let ffa = ctx.fun(f, vec![fa]).unwrap();
        let ord = kbo();

        // f(f(a)) = a is strictly larger than f(a) = a
        let clause = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::eq(fa, a), Literal::eq(ffa, a)],
            Derivation::input(),
        );
        let max = clause.maximal_indices();
        assert_eq!(max.len(), 1);
        let lit = &clause.literals[max[0]];
        assert_eq!(lit.left, ffa);
    }

    #[test]
    fn test_selection_is_set_once() {
        let mut ctx = Context::new();
        let a = ctx.parse_const("a");
        let b = ctx.parse_const("b");
        let ord = kbo();

        let clause = Clause::make(
            &mut ctx,
            &ord,
            vec![Literal::neq(a, b), Literal::eq(a, b)],
            Derivation::input(),
        );
        assert!(clause.selected().is_none());

        let neg_idx = clause
            .literals
            .iter()
            .position(|l| !l.positive)
            .unwrap();
        let pos_idx = clause.literals.iter().position(|l| l.positive).unwrap();

        assert_eq!(
            clause.select(&[pos_idx]),
            Err(SelectionError::NotNegative(pos_idx))
        );
        clause.select(&[neg_idx]).unwrap();
        assert_eq!(clause.select(&[neg_idx]), Err(SelectionError::Frozen));

        assert_eq!(clause.eligible(), vec![neg_idx]);
        assert!(clause.positive_eligible().is_empty());
    }

    #[test]
    fn test_unit_equation_recognition() {
        let mut ctx = Context::new();
        let a = ctx.parse_const("a");
        let b = ctx.parse_const("b");
        let p = ctx.declare_pred("p", 0);
        let pa = ctx.atom(p, vec![]).unwrap();
        let ord = kbo();

        let top = ctx.top();
        let eq = Clause::make(&mut ctx, &ord, vec![Literal::eq(a, b)], Derivation::input());
        assert!(eq.is_unit_equation(top));

        let lit = ctx.prop(pa, true);
        let prop = Clause::make(&mut ctx, &ord, vec![lit], Derivation::input());
        assert!(!prop.is_unit_equation(top));
        assert!(prop.is_unit());
    }
}
