//! Hash-consed terms
//!
//! Terms live in a `TermBank` owned by the prover's `Context` and are
//! referred to by `TermId` handles. Structurally equal terms intern to the
//! same handle, so term equality and hashing are O(1).
//!
//! Five shapes: free variable, bound variable (de Bruijn), constant,
//! application, lambda. Each interned cell caches its type, ground flag,
//! weight (symbol count), maximum free-variable id and structural hash.
//!
//! Invariants maintained by the constructors:
//! - applications are left-flat: the head of an `App` is never an `App`
//! - the cached type equals the computed result type of the shape
//! - `hash` and equality agree with intern-table identity

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use super::interner::{Interner, SymbolId};
use super::position::{Position, Step};
use super::types::{TypeBank, TypeError, TypeId};

/// ID of a free variable. Clause normalization renumbers these to a dense
/// prefix starting at 0, so variables are integers rather than names.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub u32);

impl VarId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}", self.0)
    }
}

/// ID for an interned term
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TermId(pub(crate) u32);

impl TermId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Interned shape of a term (the hash-cons key)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TermShape {
    Var(VarId, TypeId),
    Bound(u32, TypeId),
    Const(SymbolId, TypeId),
    App(TermId, Vec<TermId>),
    Lambda(TypeId, TermId),
}

/// Borrowed view of a term's shape, for pattern-matching callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermView<'a> {
    Var(VarId, TypeId),
    Bound(u32, TypeId),
    Const(SymbolId, TypeId),
    App { head: TermId, args: &'a [TermId] },
    Lambda { arg: TypeId, body: TermId },
}

/// Errors from term construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermError {
    #[error("de Bruijn index would become unbound (index {index}, shift {shift})")]
    DeBruijnUnbound { index: u32, shift: i32 },
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// One interned term with its cached invariants
#[derive(Debug, Clone)]
struct TermCell {
    shape: TermShape,
    ty: TypeId,
    /// No free variables anywhere below this node
    ground: bool,
    /// Symbol count
    weight: u32,
    /// Largest free variable id below this node
    max_var: Option<VarId>,
    /// 1 + the largest loose de Bruijn index below this node (0 if closed)
    loose: u32,
    /// Structural hash, equal for equal shapes
    hash: u64,
}

/// Hash-consing store for terms.
#[derive(Debug, Clone, Default)]
pub struct TermBank {
    cells: Vec<TermCell>,
    lookup: HashMap<TermShape, u32>,
}

impl TermBank {
    pub fn new() -> Self {
        TermBank {
            cells: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    fn cell(&self, t: TermId) -> &TermCell {
        &self.cells[t.0 as usize]
    }

    /// Intern a shape whose type is already known. Computes the remaining
    /// caches from the children.
    fn intern(&mut self, shape: TermShape, ty: TypeId) -> TermId {
        if let Some(&id) = self.lookup.get(&shape) {
            return TermId(id);
        }

        let (ground, weight, max_var, loose) = match &shape {
            TermShape::Var(v, _) => (false, 1, Some(*v), 0),
            TermShape::Bound(i, _) => (true, 1, None, i + 1),
            TermShape::Const(_, _) => (true, 1, None, 0),
            TermShape::App(head, args) => {
                let mut ground = self.cell(*head).ground;
                let mut weight = self.cell(*head).weight;
                let mut max_var = self.cell(*head).max_var;
                let mut loose = self.cell(*head).loose;
                for &a in args {
                    let c = self.cell(a);
                    ground &= c.ground;
                    weight += c.weight;
                    max_var = max_var.max(c.max_var);
                    loose = loose.max(c.loose);
                }
                (ground, weight, max_var, loose)
            }
            TermShape::Lambda(_, body) => {
                let c = self.cell(*body);
                (c.ground, 1 + c.weight, c.max_var, c.loose.saturating_sub(1))
            }
        };

        let hash = self.shape_hash(&shape);
        let id = self.cells.len() as u32;
        self.cells.push(TermCell {
            shape: shape.clone(),
            ty,
            ground,
            weight,
            max_var,
            loose,
            hash,
        });
        self.lookup.insert(shape, id);
        TermId(id)
    }

    fn shape_hash(&self, shape: &TermShape) -> u64 {
        let mut h = DefaultHasher::new();
        match shape {
            TermShape::Var(v, ty) => {
                0u8.hash(&mut h);
                v.hash(&mut h);
                ty.hash(&mut h);
            }
            TermShape::Bound(i, ty) => {
                1u8.hash(&mut h);
                i.hash(&mut h);
                ty.hash(&mut h);
            }
            TermShape::Const(s, ty) => {
                2u8.hash(&mut h);
                s.hash(&mut h);
                ty.hash(&mut h);
            }
            TermShape::App(head, args) => {
                3u8.hash(&mut h);
                self.cell(*head).hash.hash(&mut h);
                for &a in args {
                    self.cell(a).hash.hash(&mut h);
                }
            }
            TermShape::Lambda(ty, body) => {
                4u8.hash(&mut h);
                ty.hash(&mut h);
                self.cell(*body).hash.hash(&mut h);
            }
        }
        h.finish()
    }

    // === Constructors ===

    /// Free variable with the given id and type
    pub fn var(&mut self, id: VarId, ty: TypeId) -> TermId {
        self.intern(TermShape::Var(id, ty), ty)
    }

    /// Bound variable (de Bruijn index) with the given type
    pub fn bvar(&mut self, index: u32, ty: TypeId) -> TermId {
        self.intern(TermShape::Bound(index, ty), ty)
    }

    /// Constant with the given symbol and type
    pub fn cst(&mut self, symbol: SymbolId, ty: TypeId) -> TermId {
        self.intern(TermShape::Const(symbol, ty), ty)
    }

    /// Application of a head term to arguments.
    ///
    /// Empty argument lists return the head unchanged. Nested applications
    /// are flattened so the stored head is never itself an application.
    /// Type-checks the application against the head's cached type.
    pub fn app(&mut self, types: &TypeBank, head: TermId, args: Vec<TermId>) -> Result<TermId, TermError> {
        if args.is_empty() {
            return Ok(head);
        }
        let arg_tys: Vec<TypeId> = args.iter().map(|&a| self.ty(a)).collect();
        let ty = types.apply(self.ty(head), &arg_tys)?;

        // Left-flatten: merge into the head's own application if present
        let shape = match &self.cell(head).shape {
            TermShape::App(inner_head, inner_args) => {
                let mut all = inner_args.clone();
                let inner_head = *inner_head;
                all.extend(args);
                TermShape::App(inner_head, all)
            }
            _ => TermShape::App(head, args),
        };
        Ok(self.intern(shape, ty))
    }

    /// Rebuild an application whose type is already known (internal fast
    /// path for substitution and rewriting, where types are preserved).
    pub(crate) fn app_unchecked(&mut self, head: TermId, args: Vec<TermId>, ty: TypeId) -> TermId {
        if args.is_empty() {
            return head;
        }
        let shape = match &self.cell(head).shape {
            TermShape::App(inner_head, inner_args) => {
                let mut all = inner_args.clone();
                let inner_head = *inner_head;
                all.extend(args);
                TermShape::App(inner_head, all)
            }
            _ => TermShape::App(head, args),
        };
        self.intern(shape, ty)
    }

    /// Lambda abstraction over `arg` with the given body
    pub fn lambda(&mut self, types: &mut TypeBank, arg: TypeId, body: TermId) -> TermId {
        let body_ty = self.ty(body);
        let ty = types.function(vec![arg], body_ty);
        self.intern(TermShape::Lambda(arg, body), ty)
    }

    // === Accessors ===

    /// Cached type of a term, O(1)
    pub fn ty(&self, t: TermId) -> TypeId {
        self.cell(t).ty
    }

    /// View the shape of a term for pattern matching
    pub fn view(&self, t: TermId) -> TermView<'_> {
        match &self.cell(t).shape {
            TermShape::Var(v, ty) => TermView::Var(*v, *ty),
            TermShape::Bound(i, ty) => TermView::Bound(*i, *ty),
            TermShape::Const(s, ty) => TermView::Const(*s, *ty),
            TermShape::App(head, args) => TermView::App {
                head: *head,
                args,
            },
            TermShape::Lambda(arg, body) => TermView::Lambda {
                arg: *arg,
                body: *body,
            },
        }
    }

    /// Cached ground flag (no free variables), O(1)
    pub fn is_ground(&self, t: TermId) -> bool {
        self.cell(t).ground
    }

    /// Cached symbol count, O(1)
    pub fn weight(&self, t: TermId) -> u32 {
        self.cell(t).weight
    }

    /// Cached maximum free-variable id, O(1)
    pub fn max_var(&self, t: TermId) -> Option<VarId> {
        self.cell(t).max_var
    }

    /// Cached structural hash, O(1). Equal terms have equal hashes.
    pub fn hash_of(&self, t: TermId) -> u64 {
        self.cell(t).hash
    }

    /// True if the term has no loose de Bruijn indices
    pub fn is_closed(&self, t: TermId) -> bool {
        self.cell(t).loose == 0
    }

    pub fn is_var(&self, t: TermId) -> bool {
        matches!(self.cell(t).shape, TermShape::Var(_, _))
    }

    /// Number of interned terms
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Drop all interned terms. Used between problems; existing `TermId`s
    /// become dangling and must not be reused.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.lookup.clear();
    }

    // === Structural operations ===

    /// Structural subterm test: does `sub` occur in `t`?
    pub fn subterm(&self, sub: TermId, t: TermId) -> bool {
        if sub == t {
            return true;
        }
        match &self.cell(t).shape {
            TermShape::Var(_, _) | TermShape::Bound(_, _) | TermShape::Const(_, _) => false,
            TermShape::App(head, args) => {
                self.subterm(sub, *head) || args.iter().any(|&a| self.subterm(sub, a))
            }
            TermShape::Lambda(_, body) => self.subterm(sub, *body),
        }
    }

    /// Collect all free variable ids in a term, in first-occurrence order.
    pub fn collect_vars(&self, t: TermId, out: &mut Vec<VarId>) {
        if self.cell(t).ground {
            return;
        }
        match &self.cell(t).shape {
            TermShape::Var(v, _) => {
                if !out.contains(v) {
                    out.push(*v);
                }
            }
            TermShape::Bound(_, _) | TermShape::Const(_, _) => {}
            TermShape::App(head, args) => {
                self.collect_vars(*head, out);
                for &a in args {
                    self.collect_vars(a, out);
                }
            }
            TermShape::Lambda(_, body) => self.collect_vars(*body, out),
        }
    }

    /// Count occurrences of each free variable in a term.
    pub fn count_vars(&self, t: TermId, counts: &mut HashMap<VarId, usize>) {
        if self.cell(t).ground {
            return;
        }
        match &self.cell(t).shape {
            TermShape::Var(v, _) => {
                *counts.entry(*v).or_insert(0) += 1;
            }
            TermShape::Bound(_, _) | TermShape::Const(_, _) => {}
            TermShape::App(head, args) => {
                self.count_vars(*head, counts);
                for &a in args {
                    self.count_vars(a, counts);
                }
            }
            TermShape::Lambda(_, body) => self.count_vars(*body, counts),
        }
    }

    /// Maximum nesting depth of any free variable occurrence (None if ground).
    pub fn max_var_depth(&self, t: TermId) -> Option<u32> {
        if self.cell(t).ground {
            return None;
        }
        match &self.cell(t).shape {
            TermShape::Var(_, _) => Some(0),
            TermShape::Bound(_, _) | TermShape::Const(_, _) => None,
            TermShape::App(head, args) => {
                let mut best = self.max_var_depth(*head);
                for &a in args {
                    if let Some(d) = self.max_var_depth(a) {
                        best = Some(best.map_or(d + 1, |b| b.max(d + 1)));
                    }
                }
                best
            }
            TermShape::Lambda(_, body) => self.max_var_depth(*body).map(|d| d + 1),
        }
    }

    /// Lazy enumeration of all (subterm, position) pairs, root first.
    pub fn positions(&self, t: TermId) -> Positions<'_> {
        Positions {
            bank: self,
            stack: vec![(t, Position::root())],
        }
    }

    /// The subterm of `t` at `steps`, if the path is valid. Only `Arg` and
    /// `Body` steps apply below a literal side.
    pub fn at(&self, t: TermId, steps: &[Step]) -> Option<TermId> {
        let mut cur = t;
        for step in steps {
            cur = match (step, &self.cell(cur).shape) {
                (Step::Arg(i), TermShape::App(_, args)) => *args.get(*i as usize)?,
                (Step::Body, TermShape::Lambda(_, body)) => *body,
                _ => return None,
            };
        }
        Some(cur)
    }

    /// Replace the subterm of `t` at `steps` with `replacement`.
    ///
    /// The replacement must have the type of the replaced subterm; the
    /// rebuilt spine reuses the cached types along the path.
    pub fn replace_at(&mut self, t: TermId, steps: &[Step], replacement: TermId) -> Option<TermId> {
        if steps.is_empty() {
            return Some(replacement);
        }
        let cell_ty = self.cell(t).ty;
        match self.cell(t).shape.clone() {
            TermShape::App(head, args) => {
                if let Step::Arg(i) = steps[0] {
                    let i = i as usize;
                    if i >= args.len() {
                        return None;
                    }
                    let new_arg = self.replace_at(args[i], &steps[1..], replacement)?;
                    let mut new_args = args;
                    new_args[i] = new_arg;
                    Some(self.app_unchecked(head, new_args, cell_ty))
                } else {
                    None
                }
            }
            TermShape::Lambda(arg, body) => {
                if let Step::Body = steps[0] {
                    let new_body = self.replace_at(body, &steps[1..], replacement)?;
                    Some(self.intern(TermShape::Lambda(arg, new_body), cell_ty))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Shift all loose de Bruijn indices of `t` by `by` (used when moving a
    /// term under or out of binders). Negative shifts that would expose an
    /// index below zero fail with `DeBruijnUnbound`.
    pub fn lift(&mut self, t: TermId, by: i32) -> Result<TermId, TermError> {
        if by == 0 {
            return Ok(t);
        }
        self.lift_above(t, 0, by)
    }

    fn lift_above(&mut self, t: TermId, cutoff: u32, by: i32) -> Result<TermId, TermError> {
        // Nothing loose at or above the cutoff below this node
        if self.cell(t).loose <= cutoff {
            return Ok(t);
        }
        let ty = self.cell(t).ty;
        match self.cell(t).shape.clone() {
            TermShape::Bound(i, bty) => {
                debug_assert!(i >= cutoff);
                let shifted = i as i64 + by as i64;
                if shifted < cutoff as i64 {
                    return Err(TermError::DeBruijnUnbound { index: i, shift: by });
                }
                Ok(self.bvar(shifted as u32, bty))
            }
            TermShape::App(head, args) => {
                let new_head = self.lift_above(head, cutoff, by)?;
                let mut new_args = Vec::with_capacity(args.len());
                for a in args {
                    new_args.push(self.lift_above(a, cutoff, by)?);
                }
                Ok(self.app_unchecked(new_head, new_args, ty))
            }
            TermShape::Lambda(arg, body) => {
                let new_body = self.lift_above(body, cutoff + 1, by)?;
                Ok(self.intern(TermShape::Lambda(arg, new_body), ty))
            }
            TermShape::Var(_, _) | TermShape::Const(_, _) => Ok(t),
        }
    }

    /// Format a term for display with an interner for name resolution
    pub fn display<'a>(&'a self, t: TermId, interner: &'a Interner) -> TermDisplay<'a> {
        TermDisplay {
            bank: self,
            t,
            interner,
        }
    }
}

/// Iterator over (subterm, position) pairs in preorder.
pub struct Positions<'a> {
    bank: &'a TermBank,
    stack: Vec<(TermId, Position)>,
}

impl<'a> Iterator for Positions<'a> {
    type Item = (TermId, Position);

    fn next(&mut self) -> Option<Self::Item> {
        let (t, pos) = self.stack.pop()?;
        match &self.bank.cell(t).shape {
            TermShape::App(_, args) => {
                // Push in reverse so arguments come out left to right
                for (i, &a) in args.iter().enumerate().rev() {
                    self.stack.push((a, pos.child(Step::Arg(i as u32))));
                }
            }
            TermShape::Lambda(_, body) => {
                self.stack.push((*body, pos.child(Step::Body)));
            }
            _ => {}
        }
        Some((t, pos))
    }
}

/// Display wrapper that resolves symbol names through an interner
pub struct TermDisplay<'a> {
    bank: &'a TermBank,
    t: TermId,
    interner: &'a Interner,
}

impl<'a> fmt::Display for TermDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bank.view(self.t) {
            TermView::Var(v, _) => write!(f, "{}", v),
            TermView::Bound(i, _) => write!(f, "#{}", i),
            TermView::Const(s, _) => write!(f, "{}", self.interner.resolve(s)),
            TermView::App { head, args } => {
                write!(f, "{}(", self.bank.display(head, self.interner))?;
                for (i, &a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", self.bank.display(a, self.interner))?;
                }
                write!(f, ")")
            }
            TermView::Lambda { body, .. } => {
                write!(f, "^[{}]", self.bank.display(body, self.interner))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_interning_is_canonical() {
        let mut fx = Fixture::new();

        let a1 = fx.const_("a");
        let a2 = fx.const_("a");
        assert_eq!(a1, a2);

        let x = fx.var(0);
        let t1 = fx.func("f", vec![x, a1]);
        let t2 = fx.func("f", vec![x, a2]);
        assert_eq!(t1, t2);
        assert_eq!(fx.terms.hash_of(t1), fx.terms.hash_of(t2));

        let t3 = fx.func("f", vec![a1, x]);
        assert_ne!(t1, t3);
    }

    #[test]
    fn test_caches() {
        let mut fx = Fixture::new();

        let a = fx.const_("a");
        let x = fx.var(3);
        let fa = fx.func("f", vec![a]);
        let fxa = fx.func("g", vec![x, fa]);

        assert!(fx.terms.is_ground(fa));
        assert!(!fx.terms.is_ground(fxa));
        assert_eq!(fx.terms.weight(fa), 2);
        assert_eq!(fx.terms.weight(fxa), 4);
        assert_eq!(fx.terms.max_var(fxa), Some(VarId(3)));
        assert_eq!(fx.terms.max_var(fa), None);
        assert_eq!(fx.terms.ty(fxa), fx.indiv);
    }

    #[test]
    fn test_app_type_mismatch() {
        let mut fx = Fixture::new();
        let o = {
            let sym = fx.interner.intern("$o");
            fx.types.atom(sym)
        };
        let p_sym = fx.interner.intern("p");
        let p_ty = fx.types.function(vec![fx.indiv], o);
        let p = fx.terms.cst(p_sym, p_ty);
        let q = fx.terms.cst(fx.interner.intern("q"), o);

        // p expects an individual, not a boolean
        let err = fx.terms.app(&fx.types, p, vec![q]);
        assert!(matches!(err, Err(TermError::Type(TypeError::Mismatch { .. }))));
    }

    #[test]
    fn test_app_flattening() {
        let mut fx = Fixture::new();
        let a = fx.const_("a");
        let b = fx.const_("b");

        // Build f : (i, i) -> i, apply in two steps via a curried type
        let i = fx.indiv;
        let fi = fx.types.function(vec![i], i);
        let fii = fx.types.function(vec![i], fi);
        let f = fx.terms.cst(fx.interner.intern("f"), fii);

        let fa = fx.terms.app(&fx.types, f, vec![a]).unwrap();
        let fab = fx.terms.app(&fx.types, fa, vec![b]).unwrap();

        // The stored head must be f itself, not the partial application
        match fx.terms.view(fab) {
            TermView::App { head, args } => {
                assert_eq!(head, f);
                assert_eq!(args, &[a, b]);
            }
            _ => panic!("expected application"),
        }
    }

    #[test]
    fn test_subterm_and_positions() {
        let mut fx = Fixture::new();
        let a = fx.const_("a");
        let x = fx.var(0);
        let fa = fx.func("f", vec![a]);
        let t = fx.func("g", vec![x, fa]);

        assert!(fx.terms.subterm(a, t));
        assert!(fx.terms.subterm(fa, t));
        assert!(fx.terms.subterm(x, t));
        assert!(!fx.terms.subterm(t, fa));

        let all: Vec<_> = fx.terms.positions(t).collect();
        // g(x, f(a)): the term, x, f(a), a
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].0, t);
        assert!(all[0].1.is_root());
        assert!(all.iter().any(|(s, p)| *s == a && p.len() == 2));
    }

    #[test]
    fn test_replace_at() {
        let mut fx = Fixture::new();
        let a = fx.const_("a");
        let b = fx.const_("b");
        let fa = fx.func("f", vec![a]);
        let t = fx.func("g", vec![fa, a]);

        // Replace the inner a of f(a)
        let got = fx
            .terms
            .replace_at(t, &[Step::Arg(0), Step::Arg(0)], b)
            .unwrap();
        let fb = fx.func("f", vec![b]);
        let expected = fx.func("g", vec![fb, a]);
        assert_eq!(got, expected);

        // Invalid path
        assert!(fx.terms.replace_at(t, &[Step::Arg(5)], b).is_none());
    }

    #[test]
    fn test_lift() {
        let mut fx = Fixture::new();
        let i = fx.indiv;
        let b0 = fx.terms.bvar(0, i);
        let b2 = fx.terms.bvar(2, i);

        assert_eq!(fx.terms.lift(b0, 1).unwrap(), fx.terms.bvar(1, i));
        assert_eq!(fx.terms.lift(b2, -1).unwrap(), fx.terms.bvar(1, i));
        assert!(matches!(
            fx.terms.lift(b0, -1),
            Err(TermError::DeBruijnUnbound { .. })
        ));

        // Indices under a binder below the cutoff stay put
        let lam = fx.terms.lambda(&mut fx.types, i, b0);
        assert_eq!(fx.terms.lift(lam, 1).unwrap(), lam);
        assert!(fx.terms.is_closed(lam));
    }

    #[test]
    fn test_ground_short_circuit_data() {
        let mut fx = Fixture::new();
        let a = fx.const_("a");
        let mut vars = Vec::new();
        fx.terms.collect_vars(a, &mut vars);
        assert!(vars.is_empty());

        let x = fx.var(1);
        let y = fx.var(0);
        let t = fx.func("f", vec![x, y]);
        let gt = fx.func("g", vec![t, x]);
        let mut vars = Vec::new();
        fx.terms.collect_vars(gt, &mut vars);
        // First-occurrence order
        assert_eq!(vars, vec![VarId(1), VarId(0)]);
    }

    #[test]
    fn test_max_var_depth() {
        let mut fx = Fixture::new();
        let x = fx.var(0);
        let a = fx.const_("a");
        assert_eq!(fx.terms.max_var_depth(x), Some(0));
        assert_eq!(fx.terms.max_var_depth(a), None);

        let fx_t = fx.func("f", vec![x]);
        let gfx = fx.func("g", vec![fx_t, a]);
        assert_eq!(fx.terms.max_var_depth(gfx), Some(2));
    }
}
