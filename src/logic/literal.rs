//! Literals: signed equations between terms
//!
//! Every literal is an oriented equation `left = right` with a sign.
//! Propositional atoms are encoded as `P = $true`, so one representation
//! covers predicate and equality reasoning uniformly. Terms are handles,
//! so literals are small Copy values.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::interner::Interner;
use super::ordering::{multiset_compare, TermOrder, TermOrdering};
use super::term::{TermBank, TermId, TermView};

/// A signed equation between two terms of the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub left: TermId,
    pub right: TermId,
    pub positive: bool,
}

impl Literal {
    /// Positive equation `left = right`
    pub fn eq(left: TermId, right: TermId) -> Self {
        Literal {
            left,
            right,
            positive: true,
        }
    }

    /// Negative equation `left != right`
    pub fn neq(left: TermId, right: TermId) -> Self {
        Literal {
            left,
            right,
            positive: false,
        }
    }

    pub fn new(positive: bool, left: TermId, right: TermId) -> Self {
        Literal {
            left,
            right,
            positive,
        }
    }

    /// The complement of this literal
    pub fn negate(&self) -> Literal {
        Literal {
            left: self.left,
            right: self.right,
            positive: !self.positive,
        }
    }

    /// Reflexive and positive: true in every interpretation
    pub fn is_trivial(&self) -> bool {
        self.positive && self.left == self.right
    }

    /// Reflexive and negative: false in every interpretation
    pub fn is_absurd(&self) -> bool {
        !self.positive && self.left == self.right
    }

    /// Encoded predicate atom (`P = $true`)?
    pub fn is_predicate(&self, top: TermId) -> bool {
        self.right == top
    }

    /// Proper equation between individuals (not an encoded atom)?
    pub fn is_equation(&self, top: TermId) -> bool {
        self.right != top && self.left != top
    }

    /// Swap the two sides
    pub fn flip(&self) -> Literal {
        Literal {
            left: self.right,
            right: self.left,
            positive: self.positive,
        }
    }

    /// Symbol count of both sides
    pub fn weight(&self, bank: &TermBank) -> u32 {
        bank.weight(self.left) + bank.weight(self.right)
    }

    /// The multiset of sides used by the literal ordering: {s, t} for a
    /// positive literal, {s, s, t, t} for a negative one.
    pub fn side_multiset(&self) -> Vec<TermId> {
        if self.positive {
            vec![self.left, self.right]
        } else {
            vec![self.left, self.left, self.right, self.right]
        }
    }

    /// Partial comparison of two literals under a term ordering, via the
    /// multiset extension over their side multisets.
    pub fn compare(&self, bank: &TermBank, ord: &dyn TermOrder, other: &Literal) -> TermOrdering {
        if self == other {
            return TermOrdering::Equal;
        }
        multiset_compare(bank, ord, &self.side_multiset(), &other.side_multiset())
    }

    /// Structural hash of the literal (depends on term identity).
    pub fn hash_key(&self, bank: &TermBank) -> u64 {
        let mut h = DefaultHasher::new();
        self.positive.hash(&mut h);
        bank.hash_of(self.left).hash(&mut h);
        bank.hash_of(self.right).hash(&mut h);
        h.finish()
    }

    /// Structural hash treating every variable alike. Equal for any two
    /// literals that differ only in variable names, so it can order
    /// literals before renaming.
    pub fn var_blind_key(&self, bank: &TermBank) -> u64 {
        let mut h = DefaultHasher::new();
        self.positive.hash(&mut h);
        var_blind_term_hash(bank, self.left, &mut h);
        var_blind_term_hash(bank, self.right, &mut h);
        h.finish()
    }

    /// Format for display with an interner for name resolution
    pub fn display<'a>(
        &'a self,
        bank: &'a TermBank,
        interner: &'a Interner,
        top: TermId,
    ) -> LiteralDisplay<'a> {
        LiteralDisplay {
            literal: self,
            bank,
            interner,
            top,
        }
    }
}

fn var_blind_term_hash(bank: &TermBank, t: TermId, h: &mut DefaultHasher) {
    match bank.view(t) {
        TermView::Var(_, ty) => {
            0u8.hash(h);
            ty.hash(h);
        }
        TermView::Bound(i, ty) => {
            1u8.hash(h);
            i.hash(h);
            ty.hash(h);
        }
        TermView::Const(s, _) => {
            2u8.hash(h);
            s.hash(h);
        }
        TermView::App { head, args } => {
            3u8.hash(h);
            var_blind_term_hash(bank, head, h);
            args.len().hash(h);
            for &a in args {
                var_blind_term_hash(bank, a, h);
            }
        }
        TermView::Lambda { arg, body } => {
            4u8.hash(h);
            arg.hash(h);
            var_blind_term_hash(bank, body, h);
        }
    }
}

/// Display wrapper for a literal
pub struct LiteralDisplay<'a> {
    literal: &'a Literal,
    bank: &'a TermBank,
    interner: &'a Interner,
    top: TermId,
}

impl<'a> fmt::Display for LiteralDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lit = self.literal;
        if lit.is_predicate(self.top) {
            if !lit.positive {
                write!(f, "~")?;
            }
            write!(f, "{}", self.bank.display(lit.left, self.interner))
        } else {
            write!(
                f,
                "{} {} {}",
                self.bank.display(lit.left, self.interner),
                if lit.positive { "=" } else { "!=" },
                self.bank.display(lit.right, self.interner)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::context::Context;
    use crate::logic::ordering::{Precedence, KBO};

    #[test]
    fn test_trivial_and_absurd() {
        let mut ctx = Context::new();
        let a = ctx.parse_const("a");
        let b = ctx.parse_const("b");

        assert!(Literal::eq(a, a).is_trivial());
        assert!(!Literal::eq(a, b).is_trivial());
        assert!(Literal::neq(a, a).is_absurd());
        assert!(!Literal::neq(a, b).is_absurd());
    }

    #[test]
    fn test_predicate_encoding() {
        let mut ctx = Context::new();
        let p = ctx.declare_pred("p", 1);
        let a = ctx.parse_const("a");
        let atom = ctx.atom(p, vec![a]).unwrap();

        let lit = ctx.prop(atom, true);
        assert!(lit.is_predicate(ctx.top()));
        assert!(!lit.is_equation(ctx.top()));
        assert!(lit.positive);

        let eq_lit = Literal::eq(a, a);
        assert!(eq_lit.is_equation(ctx.top()));
    }

    #[test]
    fn test_literal_compare_negative_dominates() {
        // s != t is larger than s = t in the literal ordering
        let mut ctx = Context::new();
        let a = ctx.parse_const("a");
        let b = ctx.parse_const("b");

        let kbo = KBO::new(Precedence::default());
        let pos = Literal::eq(a, b);
        let neg = Literal::neq(a, b);

        assert_eq!(
            neg.compare(ctx.bank(), &kbo, &pos),
            TermOrdering::Greater
        );
        assert_eq!(pos.compare(ctx.bank(), &kbo, &neg), TermOrdering::Less);
        assert_eq!(pos.compare(ctx.bank(), &kbo, &pos), TermOrdering::Equal);
    }

    #[test]
    fn test_var_blind_key() {
        let mut ctx = Context::new();
        let x = ctx.var(0);
        let y = ctx.var(5);
        let f = ctx.declare_fun("f", 1);
        let fx = ctx.fun(f, vec![x]).unwrap();
        let fy = ctx.fun(f, vec![y]).unwrap();
        let a = ctx.parse_const("a");

        let l1 = Literal::eq(fx, a);
        let l2 = Literal::eq(fy, a);
        let l3 = Literal::eq(a, fx);

        assert_eq!(
            l1.var_blind_key(ctx.bank()),
            l2.var_blind_key(ctx.bank())
        );
        assert_ne!(
            l1.var_blind_key(ctx.bank()),
            l3.var_blind_key(ctx.bank())
        );
        assert_ne!(l1.hash_key(ctx.bank()), l2.hash_key(ctx.bank()));
    }
}
