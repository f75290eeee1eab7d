//! Scoped substitutions and renamings
//!
//! Binary inference rules never rename a partner clause up front. Instead,
//! every term carries a scope tag during unification: the same variable id
//! in different scopes denotes different instances. A `Substitution` binds
//! scoped variables to scoped terms; a `Renaming` materializes the scoped
//! variables that survive into a result clause as fresh unscoped ids.
//!
//! Renamings are per-inference scratch and must be cleared between
//! inferences so free-variable ids do not grow without bound.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use super::interner::Interner;
use super::term::{TermBank, TermId, TermView, VarId};

/// Scope tag distinguishing variable instances during unification.
/// Scope 0 and 1 are conventionally the two premises of a binary rule.
pub type Scope = u8;

/// A value tagged with the scope it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scoped<T>(pub T, pub Scope);

impl<T> Scoped<T> {
    pub fn new(item: T, scope: Scope) -> Self {
        Scoped(item, scope)
    }
}

/// Binding a variable that is already bound to a different value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("variable {var}@{scope} is already bound to a different term")]
pub struct InconsistentBinding {
    pub var: VarId,
    pub scope: Scope,
}

/// What a scoped variable dereferences to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deref {
    /// The chain ends at an unbound variable
    Unbound(Scoped<VarId>),
    /// The chain ends at a non-variable term
    Bound(Scoped<TermId>),
}

/// A substitution over scoped variables.
///
/// Bindings may chain through variables; `resolve` follows chains until a
/// non-variable term or an unbound variable position.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    map: HashMap<Scoped<VarId>, Scoped<TermId>>,
}

impl Substitution {
    pub fn new() -> Self {
        Substitution {
            map: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Raw lookup without chain chasing
    pub fn get(&self, var: Scoped<VarId>) -> Option<Scoped<TermId>> {
        self.map.get(&var).copied()
    }

    /// Insert without consistency checking. Callers (the unification
    /// walk) guarantee the variable position is unbound.
    pub(crate) fn insert(&mut self, var: Scoped<VarId>, term: Scoped<TermId>) {
        debug_assert!(!self.map.contains_key(&var));
        self.map.insert(var, term);
    }

    /// Follow the binding chain from a scoped variable.
    pub fn deref(&self, bank: &TermBank, var: Scoped<VarId>) -> Deref {
        let mut cur = var;
        loop {
            match self.map.get(&cur) {
                None => return Deref::Unbound(cur),
                Some(&bound) => match bank.view(bound.0) {
                    TermView::Var(v, _) => cur = Scoped(v, bound.1),
                    _ => return Deref::Bound(bound),
                },
            }
        }
    }

    /// Chase a scoped term through the substitution: if it is a bound
    /// variable, follow chains to its binding; otherwise return it as is.
    pub fn resolve(&self, bank: &TermBank, t: Scoped<TermId>) -> Scoped<TermId> {
        let mut cur = t;
        loop {
            match bank.view(cur.0) {
                TermView::Var(v, _) => match self.map.get(&Scoped(v, cur.1)) {
                    Some(&bound) => cur = bound,
                    None => return cur,
                },
                _ => return cur,
            }
        }
    }

    /// Bind a variable, failing if it already resolves to a different
    /// canonical value in the same scope.
    pub fn bind(
        &mut self,
        bank: &TermBank,
        var: Scoped<VarId>,
        value: Scoped<TermId>,
    ) -> Result<(), InconsistentBinding> {
        let value = self.resolve(bank, value);
        match self.deref(bank, var) {
            Deref::Unbound(end) => {
                // Binding a variable to itself is the identity
                if let TermView::Var(v, _) = bank.view(value.0) {
                    if Scoped(v, value.1) == end {
                        return Ok(());
                    }
                }
                self.map.insert(end, value);
                Ok(())
            }
            Deref::Bound(existing) => {
                if existing == value {
                    Ok(())
                } else {
                    Err(InconsistentBinding {
                        var: var.0,
                        scope: var.1,
                    })
                }
            }
        }
    }

    /// Union of two substitutions. Fails if they bind a common variable to
    /// different canonical values.
    pub fn merge(&self, bank: &TermBank, other: &Substitution) -> Result<Substitution, InconsistentBinding> {
        let mut result = self.clone();
        for (&var, &term) in &other.map {
            result.bind(bank, var, term)?;
        }
        Ok(result)
    }

    /// Iterate over the raw bindings
    pub fn iter(&self) -> impl Iterator<Item = (Scoped<VarId>, Scoped<TermId>)> + '_ {
        self.map.iter().map(|(&v, &t)| (v, t))
    }
}

/// Scratch map materializing scoped variables into fresh unscoped ids.
///
/// Fresh ids are allocated sequentially from the starting id, one per
/// first access. Cleared between inferences.
#[derive(Debug, Clone, Default)]
pub struct Renaming {
    map: HashMap<Scoped<VarId>, VarId>,
    next: u32,
    /// Variables in this scope keep their original ids (in-place
    /// simplification splices results back into an existing clause)
    preserved: Option<Scope>,
}

impl Renaming {
    /// A renaming allocating fresh ids from `start` upward
    pub fn new(start: u32) -> Self {
        Renaming {
            map: HashMap::new(),
            next: start,
            preserved: None,
        }
    }

    /// A renaming that keeps ids of variables in `scope` and allocates
    /// fresh ids from `start` for every other scope.
    pub fn preserving(scope: Scope, start: u32) -> Self {
        Renaming {
            map: HashMap::new(),
            next: start,
            preserved: Some(scope),
        }
    }

    /// The fresh id for a scoped variable (allocating on first access)
    pub fn rename(&mut self, var: Scoped<VarId>) -> VarId {
        if self.preserved == Some(var.1) {
            return var.0;
        }
        if let Some(&v) = self.map.get(&var) {
            return v;
        }
        let fresh = VarId(self.next);
        self.next += 1;
        self.map.insert(var, fresh);
        fresh
    }

    /// Number of variables renamed so far
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Reset for the next inference
    pub fn clear(&mut self, start: u32) {
        self.map.clear();
        self.next = start;
    }
}

/// Display wrapper for debugging substitutions
pub struct SubstDisplay<'a> {
    pub subst: &'a Substitution,
    pub bank: &'a TermBank,
    pub interner: &'a Interner,
}

impl<'a> fmt::Display for SubstDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (var, term)) in self.subst.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(
                f,
                "{}@{} -> {}@{}",
                var.0,
                var.1,
                self.bank.display(term.0, self.interner),
                term.1
            )?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::types::TypeBank;

    struct Fixture {
        interner: Interner,
        types: TypeBank,
        terms: TermBank,
        indiv: crate::logic::types::TypeId,
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
    }

    #[test]
    fn test_bind_and_resolve() {
        let mut fx = Fixture::new();
        let x = fx.var(0);
        let a = fx.const_("a");

        let mut subst = Substitution::new();
        subst
            .bind(&fx.terms, Scoped(VarId(0), 0), Scoped(a, 1))
            .unwrap();

        assert_eq!(subst.resolve(&fx.terms, Scoped(x, 0)), Scoped(a, 1));
        // Same variable in a different scope is unbound
        assert_eq!(subst.resolve(&fx.terms, Scoped(x, 1)), Scoped(x, 1));
    }

    #[test]
    fn test_bind_chains() {
        let mut fx = Fixture::new();
        let y = fx.var(1);
        let a = fx.const_("a");

        let mut subst = Substitution::new();
        // X@0 -> Y@0, then Y@0 -> a
        subst
            .bind(&fx.terms, Scoped(VarId(0), 0), Scoped(y, 0))
            .unwrap();
        subst
            .bind(&fx.terms, Scoped(VarId(1), 0), Scoped(a, 0))
            .unwrap();

        let x = fx.var(0);
        assert_eq!(subst.resolve(&fx.terms, Scoped(x, 0)), Scoped(a, 0));
        assert_eq!(
            subst.deref(&fx.terms, Scoped(VarId(0), 0)),
            Deref::Bound(Scoped(a, 0))
        );
    }

    #[test]
    fn test_inconsistent_binding() {
        let mut fx = Fixture::new();
        let a = fx.const_("a");
        let b = fx.const_("b");

        let mut subst = Substitution::new();
        subst
            .bind(&fx.terms, Scoped(VarId(0), 0), Scoped(a, 0))
            .unwrap();
        // Rebinding to the same value is fine
        assert!(subst.bind(&fx.terms, Scoped(VarId(0), 0), Scoped(a, 0)).is_ok());
        // A different value is not
        assert!(subst.bind(&fx.terms, Scoped(VarId(0), 0), Scoped(b, 0)).is_err());
    }

    #[test]
    fn test_merge() {
        let mut fx = Fixture::new();
        let a = fx.const_("a");
        let b = fx.const_("b");

        let mut s1 = Substitution::new();
        s1.bind(&fx.terms, Scoped(VarId(0), 0), Scoped(a, 0)).unwrap();
        let mut s2 = Substitution::new();
        s2.bind(&fx.terms, Scoped(VarId(1), 0), Scoped(b, 0)).unwrap();

        let merged = s1.merge(&fx.terms, &s2).unwrap();
        assert_eq!(merged.len(), 2);

        let mut s3 = Substitution::new();
        s3.bind(&fx.terms, Scoped(VarId(0), 0), Scoped(b, 0)).unwrap();
        assert!(s1.merge(&fx.terms, &s3).is_err());
    }

    #[test]
    fn test_renaming_is_stable() {
        let mut ren = Renaming::new(0);
        let a = ren.rename(Scoped(VarId(7), 0));
        let b = ren.rename(Scoped(VarId(7), 1));
        let a2 = ren.rename(Scoped(VarId(7), 0));

        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(a, VarId(0));
        assert_eq!(b, VarId(1));

        ren.clear(5);
        assert_eq!(ren.rename(Scoped(VarId(7), 0)), VarId(5));
    }
}
