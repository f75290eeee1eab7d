//! Term orderings (Knuth-Bendix and recursive path)
//!
//! A `Precedence` is a total order on symbols with a per-symbol status and
//! weight. Two reduction orderings are provided behind the `TermOrder`
//! trait: KBO (weight first, then precedence, then lexicographic
//! arguments) and RPO (recursive path comparison with lexicographic or
//! multiset status per head symbol).
//!
//! Both are stable under substitution and monotone under context. Terms
//! with binders or loose de Bruijn indices are only comparable when
//! syntactically equal; the first-order calculus never feeds them in.

use std::collections::HashMap;

use super::interner::SymbolId;
use super::term::{TermBank, TermId, TermView, VarId};

/// Result of comparing two terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermOrdering {
    Greater,
    Less,
    Equal,
    Incomparable,
}

impl TermOrdering {
    /// Flip the direction of a comparison
    pub fn reverse(self) -> TermOrdering {
        match self {
            TermOrdering::Greater => TermOrdering::Less,
            TermOrdering::Less => TermOrdering::Greater,
            other => other,
        }
    }
}

/// True when `o` is Greater or Incomparable. Inference ordering
/// constraints require "not smaller than", which this encodes.
pub fn not_smaller(o: TermOrdering) -> bool {
    matches!(o, TermOrdering::Greater | TermOrdering::Incomparable)
}

/// Argument comparison status of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Lexicographic,
    Multiset,
}

/// Total order on symbols plus per-symbol weight and status.
///
/// Unlisted symbols rank by id, weigh 1 and compare lexicographically, so
/// symbols interned after the precedence was built slot in without
/// disturbing any existing comparison.
#[derive(Debug, Clone)]
pub struct Precedence {
    rank: HashMap<SymbolId, usize>,
    status: HashMap<SymbolId, Status>,
    weight: HashMap<SymbolId, usize>,
    /// Weight shared by all variables (must be positive)
    pub variable_weight: usize,
}

impl Default for Precedence {
    fn default() -> Self {
        Precedence {
            rank: HashMap::new(),
            status: HashMap::new(),
            weight: HashMap::new(),
            variable_weight: 1,
        }
    }
}

impl Precedence {
    pub fn new() -> Self {
        Precedence::default()
    }

    /// Assign an explicit rank (higher rank wins) to a symbol
    pub fn set_rank(&mut self, symbol: SymbolId, rank: usize) {
        self.rank.insert(symbol, rank);
    }

    /// Assign an argument comparison status to a symbol
    pub fn set_status(&mut self, symbol: SymbolId, status: Status) {
        self.status.insert(symbol, status);
    }

    /// Assign a weight to a symbol (default 1)
    pub fn set_weight(&mut self, symbol: SymbolId, weight: usize) {
        self.weight.insert(symbol, weight);
    }

    pub fn weight_of(&self, symbol: SymbolId) -> usize {
        self.weight.get(&symbol).copied().unwrap_or(1)
    }

    pub fn status_of(&self, symbol: SymbolId) -> Status {
        self.status.get(&symbol).copied().unwrap_or_default()
    }

    /// Total comparison of two symbols: explicit rank first, symbol id as
    /// the tie breaker.
    pub fn cmp_symbols(&self, f: SymbolId, g: SymbolId) -> std::cmp::Ordering {
        let rf = self.rank.get(&f).copied().unwrap_or(0);
        let rg = self.rank.get(&g).copied().unwrap_or(0);
        rf.cmp(&rg).then_with(|| f.as_u32().cmp(&g.as_u32()))
    }
}

/// Trait for reduction orderings on terms.
pub trait TermOrder: Send + Sync {
    fn name(&self) -> &str;

    /// Compare two terms from the same variable scope.
    fn compare(&self, bank: &TermBank, s: TermId, t: TermId) -> TermOrdering;
}

/// The head symbol of a first-order term, if it has one.
fn head_symbol(bank: &TermBank, t: TermId) -> Option<(SymbolId, Vec<TermId>)> {
    match bank.view(t) {
        TermView::Const(s, _) => Some((s, Vec::new())),
        TermView::App { head, args } => match bank.view(head) {
            TermView::Const(s, _) => Some((s, args.to_vec())),
            _ => None,
        },
        _ => None,
    }
}

// =============================================================================
// Knuth-Bendix ordering
// =============================================================================

/// Knuth-Bendix ordering: weight first (with the variable-count
/// condition), then head precedence, then lexicographic arguments.
pub struct KBO {
    prec: Precedence,
}

impl KBO {
    pub fn new(prec: Precedence) -> Self {
        KBO { prec }
    }

    pub fn precedence(&self) -> &Precedence {
        &self.prec
    }

    /// Weighted symbol count of a term
    pub fn term_weight(&self, bank: &TermBank, t: TermId) -> usize {
        match bank.view(t) {
            TermView::Var(_, _) | TermView::Bound(_, _) => self.prec.variable_weight,
            TermView::Const(s, _) => self.prec.weight_of(s),
            TermView::App { head, args } => {
                let mut w = self.term_weight(bank, head);
                for &a in args {
                    w += self.term_weight(bank, a);
                }
                w
            }
            TermView::Lambda { body, .. } => 1 + self.term_weight(bank, body),
        }
    }

    /// Lexicographic comparison for terms of equal weight
    fn compare_lex(&self, bank: &TermBank, s: TermId, t: TermId) -> TermOrdering {
        if s == t {
            return TermOrdering::Equal;
        }
        match (bank.view(s), bank.view(t)) {
            // Distinct variables are never lex-comparable; the variable
            // condition in `compare` keeps this case from deciding anything
            (TermView::Var(_, _), TermView::Var(_, _)) => TermOrdering::Incomparable,
            (TermView::Var(_, _), _) => TermOrdering::Less,
            (_, TermView::Var(_, _)) => TermOrdering::Greater,
            _ => {
                let (f, s_args) = match head_symbol(bank, s) {
                    Some(h) => h,
                    None => return TermOrdering::Incomparable,
                };
                let (g, t_args) = match head_symbol(bank, t) {
                    Some(h) => h,
                    None => return TermOrdering::Incomparable,
                };
                if f != g {
                    return match self.prec.cmp_symbols(f, g) {
                        std::cmp::Ordering::Greater => TermOrdering::Greater,
                        std::cmp::Ordering::Less => TermOrdering::Less,
                        std::cmp::Ordering::Equal => TermOrdering::Incomparable,
                    };
                }
                for (&a, &b) in s_args.iter().zip(&t_args) {
                    match self.compare(bank, a, b) {
                        TermOrdering::Equal => continue,
                        other => return other,
                    }
                }
                TermOrdering::Equal
            }
        }
    }
}

impl TermOrder for KBO {
    fn name(&self) -> &str {
        "kbo"
    }

    fn compare(&self, bank: &TermBank, s: TermId, t: TermId) -> TermOrdering {
        if s == t {
            return TermOrdering::Equal;
        }

        // Variable condition: s > t requires #(x, s) >= #(x, t) for all x
        let mut vars_s = HashMap::new();
        let mut vars_t = HashMap::new();
        bank.count_vars(s, &mut vars_s);
        bank.count_vars(t, &mut vars_t);

        let s_covers_t = vars_t
            .iter()
            .all(|(v, &n)| vars_s.get(v).copied().unwrap_or(0) >= n);
        let t_covers_s = vars_s
            .iter()
            .all(|(v, &n)| vars_t.get(v).copied().unwrap_or(0) >= n);

        let ws = self.term_weight(bank, s);
        let wt = self.term_weight(bank, t);

        if ws > wt && s_covers_t {
            TermOrdering::Greater
        } else if wt > ws && t_covers_s {
            TermOrdering::Less
        } else if ws == wt {
            if s_covers_t && t_covers_s {
                self.compare_lex(bank, s, t)
            } else if s_covers_t {
                match self.compare_lex(bank, s, t) {
                    o @ (TermOrdering::Greater | TermOrdering::Equal) => o,
                    _ => TermOrdering::Incomparable,
                }
            } else if t_covers_s {
                match self.compare_lex(bank, s, t) {
                    o @ (TermOrdering::Less | TermOrdering::Equal) => o,
                    _ => TermOrdering::Incomparable,
                }
            } else {
                TermOrdering::Incomparable
            }
        } else {
            TermOrdering::Incomparable
        }
    }
}

// =============================================================================
// Recursive path ordering
// =============================================================================

/// Recursive path ordering with per-symbol lexicographic or multiset
/// status.
pub struct RPO {
    prec: Precedence,
}

impl RPO {
    pub fn new(prec: Precedence) -> Self {
        RPO { prec }
    }

    pub fn precedence(&self) -> &Precedence {
        &self.prec
    }

    /// Strict s > t
    fn gt(&self, bank: &TermBank, s: TermId, t: TermId) -> bool {
        if s == t {
            return false;
        }

        // A variable is below anything it properly occurs in
        if let TermView::Var(v, _) = bank.view(t) {
            return occurs_free(bank, v, s);
        }

        let (f, s_args) = match head_symbol(bank, s) {
            Some(h) => h,
            None => return false,
        };
        let (g, t_args) = match head_symbol(bank, t) {
            Some(h) => h,
            None => return false,
        };

        // (1) some argument of s dominates t
        if s_args.iter().any(|&si| si == t || self.gt(bank, si, t)) {
            return true;
        }

        match self.prec.cmp_symbols(f, g) {
            std::cmp::Ordering::Greater => t_args.iter().all(|&tj| self.gt(bank, s, tj)),
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => {
                // Same symbol: compare arguments by the symbol's status
                if !t_args.iter().all(|&tj| self.gt(bank, s, tj)) {
                    return false;
                }
                match self.prec.status_of(f) {
                    Status::Lexicographic => self.lex_gt(bank, &s_args, &t_args),
                    Status::Multiset => {
                        multiset_compare_by(bank, &s_args, &t_args, &|b, x, y| self.cmp(b, x, y))
                            == TermOrdering::Greater
                    }
                }
            }
        }
    }

    fn lex_gt(&self, bank: &TermBank, s_args: &[TermId], t_args: &[TermId]) -> bool {
        for (&a, &b) in s_args.iter().zip(t_args) {
            if a == b {
                continue;
            }
            return self.gt(bank, a, b);
        }
        s_args.len() > t_args.len()
    }

    fn cmp(&self, bank: &TermBank, s: TermId, t: TermId) -> TermOrdering {
        if s == t {
            TermOrdering::Equal
        } else if self.gt(bank, s, t) {
            TermOrdering::Greater
        } else if self.gt(bank, t, s) {
            TermOrdering::Less
        } else {
            TermOrdering::Incomparable
        }
    }
}

impl TermOrder for RPO {
    fn name(&self) -> &str {
        "rpo"
    }

    fn compare(&self, bank: &TermBank, s: TermId, t: TermId) -> TermOrdering {
        self.cmp(bank, s, t)
    }
}

/// Does variable `v` occur free in `t`?
fn occurs_free(bank: &TermBank, v: VarId, t: TermId) -> bool {
    if bank.is_ground(t) {
        return false;
    }
    match bank.view(t) {
        TermView::Var(w, _) => w == v,
        TermView::Bound(_, _) | TermView::Const(_, _) => false,
        TermView::App { head, args } => {
            occurs_free(bank, v, head) || args.iter().any(|&a| occurs_free(bank, v, a))
        }
        TermView::Lambda { body, .. } => occurs_free(bank, v, body),
    }
}

// =============================================================================
// Multiset extension
// =============================================================================

/// Compare two term multisets under a base comparison.
///
/// Used for the multiset status of RPO and for the literal ordering
/// (a literal is the multiset of its sides, doubled when negative).
pub fn multiset_compare_by(
    bank: &TermBank,
    a: &[TermId],
    b: &[TermId],
    cmp: &dyn Fn(&TermBank, TermId, TermId) -> TermOrdering,
) -> TermOrdering {
    // Cancel common elements with multiplicity
    let mut rest_a: Vec<TermId> = a.to_vec();
    let mut rest_b: Vec<TermId> = b.to_vec();
    let mut i = 0;
    while i < rest_a.len() {
        if let Some(j) = rest_b.iter().position(|&x| x == rest_a[i]) {
            rest_a.swap_remove(i);
            rest_b.swap_remove(j);
        } else {
            i += 1;
        }
    }

    match (rest_a.is_empty(), rest_b.is_empty()) {
        (true, true) => TermOrdering::Equal,
        (false, true) => TermOrdering::Greater,
        (true, false) => TermOrdering::Less,
        (false, false) => {
            let a_dominates = rest_b
                .iter()
                .all(|&y| rest_a.iter().any(|&x| cmp(bank, x, y) == TermOrdering::Greater));
            let b_dominates = rest_a
                .iter()
                .all(|&x| rest_b.iter().any(|&y| cmp(bank, y, x) == TermOrdering::Greater));
            match (a_dominates, b_dominates) {
                (true, _) => TermOrdering::Greater,
                (_, true) => TermOrdering::Less,
                _ => TermOrdering::Incomparable,
            }
        }
    }
}

/// Multiset comparison under a `TermOrder`.
pub fn multiset_compare(
    bank: &TermBank,
    ord: &dyn TermOrder,
    a: &[TermId],
    b: &[TermId],
) -> TermOrdering {
    multiset_compare_by(bank, a, b, &|bk, x, y| ord.compare(bk, x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::interner::Interner;
    use crate::logic::types::{TypeBank, TypeId};

    struct Fixture {
        interner: Interner,
        types: TypeBank,
        terms: TermBank,
        indiv: TypeId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut interner = Interner::new();
            let mut types = TypeBank::new();
            let indiv = types.atom(interner.intern("$i"));
            Fixture {
                interner,
                types,
                terms: TermBank::new(),
                indiv,
            }
        }

        fn var(&mut self, id: u32) -> TermId {
            self.terms.var(VarId(id), self.indiv)
        }

        fn const_(&mut self, name: &str) -> TermId {
            let sym = self.interner.intern(name);
            self.terms.cst(sym, self.indiv)
        }

        fn func(&mut self, name: &str, args: Vec<TermId>) -> TermId {
            let sym = self.interner.intern(name);
            let fn_ty = self
                .types
                .function(vec![self.indiv; args.len()], self.indiv);
            let head = self.terms.cst(sym, fn_ty);
            self.terms.app(&self.types, head, args).unwrap()
        }
    }

    #[test]
    fn test_kbo_weight() {
        let mut fx = Fixture::new();
        let x = fx.var(0);
        let a = fx.const_("a");
        let fax = fx.func("f", vec![a, x]);

        let kbo = KBO::new(Precedence::default());
        assert_eq!(kbo.term_weight(&fx.terms, x), 1);
        assert_eq!(kbo.term_weight(&fx.terms, a), 1);
        assert_eq!(kbo.term_weight(&fx.terms, fax), 3);
    }

    #[test]
    fn test_kbo_variable_condition() {
        let mut fx = Fixture::new();
        let x = fx.var(0);
        let y = fx.var(1);
        let a = fx.const_("a");
        let f_x = fx.func("f", vec![x]);

        let kbo = KBO::new(Precedence::default());

        assert_eq!(kbo.compare(&fx.terms, x, y), TermOrdering::Incomparable);
        assert_eq!(kbo.compare(&fx.terms, a, x), TermOrdering::Incomparable);
        assert_eq!(kbo.compare(&fx.terms, f_x, x), TermOrdering::Greater);
        assert_eq!(kbo.compare(&fx.terms, x, f_x), TermOrdering::Less);
    }

    #[test]
    fn test_kbo_precedence() {
        let mut fx = Fixture::new();
        let a = fx.const_("a");
        let fa = fx.func("f", vec![a]);
        let ga = fx.func("g", vec![a]);

        let f_sym = fx.interner.get("f").unwrap();
        let g_sym = fx.interner.get("g").unwrap();
        let mut prec = Precedence::default();
        prec.set_rank(f_sym, 2);
        prec.set_rank(g_sym, 1);

        let kbo = KBO::new(prec);
        assert_eq!(kbo.compare(&fx.terms, fa, ga), TermOrdering::Greater);
        assert_eq!(kbo.compare(&fx.terms, ga, fa), TermOrdering::Less);
    }

    #[test]
    fn test_kbo_ground_total() {
        let mut fx = Fixture::new();
        let a = fx.const_("a");
        let b = fx.const_("b");
        let fa = fx.func("f", vec![a]);
        let fb = fx.func("f", vec![b]);

        let kbo = KBO::new(Precedence::default());
        // Ground terms of equal weight decide by precedence then arguments
        assert_ne!(kbo.compare(&fx.terms, a, b), TermOrdering::Incomparable);
        assert_ne!(kbo.compare(&fx.terms, fa, fb), TermOrdering::Incomparable);
        assert_eq!(
            kbo.compare(&fx.terms, fa, fb),
            kbo.compare(&fx.terms, a, b)
        );
    }

    #[test]
    fn test_rpo_subterm() {
        let mut fx = Fixture::new();
        let x = fx.var(0);
        let a = fx.const_("a");
        let f_x = fx.func("f", vec![x]);
        let gfa = {
            let fa = fx.func("f", vec![a]);
            fx.func("g", vec![fa])
        };
        let fa = fx.func("f", vec![a]);

        let rpo = RPO::new(Precedence::default());
        assert_eq!(rpo.compare(&fx.terms, f_x, x), TermOrdering::Greater);
        assert_eq!(rpo.compare(&fx.terms, x, f_x), TermOrdering::Less);
        assert_eq!(rpo.compare(&fx.terms, gfa, fa), TermOrdering::Greater);
        assert_eq!(rpo.compare(&fx.terms, gfa, a), TermOrdering::Greater);
    }

    #[test]
    fn test_rpo_precedence_and_status() {
        let mut fx = Fixture::new();
        let a = fx.const_("a");
        let b = fx.const_("b");
        let fab = fx.func("f", vec![a, b]);
        let fba = fx.func("f", vec![b, a]);

        let rpo = RPO::new(Precedence::default());
        // b > a by id, so f(b,a) >lex f(a,b)
        assert_eq!(rpo.compare(&fx.terms, fba, fab), TermOrdering::Greater);

        let f_sym = fx.interner.get("f").unwrap();
        let mut prec = Precedence::default();
        prec.set_status(f_sym, Status::Multiset);
        let rpo_ms = RPO::new(prec);
        // As multisets {a,b} = {b,a}: neither side is greater
        assert_eq!(
            rpo_ms.compare(&fx.terms, fba, fab),
            TermOrdering::Incomparable
        );
    }

    #[test]
    fn test_orderings_stable_under_substitution_sample() {
        // f(g(X)) > g(X) stays strict after instantiating X with a
        let mut fx = Fixture::new();
        let x = fx.var(0);
        let gx = fx.func("g", vec![x]);
        let fgx = fx.func("f", vec![gx]);
        let a = fx.const_("a");
        let ga = fx.func("g", vec![a]);
        let fga = fx.func("f", vec![ga]);

        let kbo = KBO::new(Precedence::default());
        let rpo = RPO::new(Precedence::default());
        for ord in [&kbo as &dyn TermOrder, &rpo as &dyn TermOrder] {
            assert_eq!(ord.compare(&fx.terms, fgx, gx), TermOrdering::Greater);
            assert_eq!(ord.compare(&fx.terms, fga, ga), TermOrdering::Greater);
        }
    }

    #[test]
    fn test_multiset_compare() {
        let mut fx = Fixture::new();
        let a = fx.const_("a");
        let b = fx.const_("b");
        let fa = fx.func("f", vec![a]);

        let kbo = KBO::new(Precedence::default());

        assert_eq!(
            multiset_compare(&fx.terms, &kbo, &[fa, a], &[a, fa]),
            TermOrdering::Equal
        );
        assert_eq!(
            multiset_compare(&fx.terms, &kbo, &[fa, a], &[a]),
            TermOrdering::Greater
        );
        assert_eq!(
            multiset_compare(&fx.terms, &kbo, &[fa], &[a, b]),
            TermOrdering::Greater
        );
        assert_eq!(
            multiset_compare(&fx.terms, &kbo, &[a, b], &[fa]),
            TermOrdering::Less
        );
    }
}
