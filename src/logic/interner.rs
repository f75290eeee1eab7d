//! Symbol interning and the signature
//!
//! Symbols are interned once per context and identified by a `SymbolId`.
//! Benefits:
//! - O(1) comparison and hashing (u32 vs String)
//! - Copy semantics (no heap allocation on clone)
//!
//! The interner is owned by the prover's `Context` rather than being global
//! state, so a process can host several independent prover instances.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use super::types::TypeId;

/// ID for an interned symbol
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    /// Get the raw ID value (for debugging/serialization)
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Attribute bitset attached to a symbol.
///
/// Attributes do not participate in symbol identity; they are bookkeeping
/// for the calculus (AC symbols, skolem constants, ...) and for printing
/// (infix operators).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SymbolAttrs(u16);

impl SymbolAttrs {
    pub const SKOLEM: SymbolAttrs = SymbolAttrs(1 << 0);
    pub const SPLIT: SymbolAttrs = SymbolAttrs(1 << 1);
    pub const BINDER: SymbolAttrs = SymbolAttrs(1 << 2);
    pub const INFIX: SymbolAttrs = SymbolAttrs(1 << 3);
    pub const AC: SymbolAttrs = SymbolAttrs(1 << 4);
    pub const COMMUTATIVE: SymbolAttrs = SymbolAttrs(1 << 5);
    pub const FRESH: SymbolAttrs = SymbolAttrs(1 << 6);

    pub fn empty() -> Self {
        SymbolAttrs(0)
    }

    pub fn contains(self, other: SymbolAttrs) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: SymbolAttrs) {
        self.0 |= other.0;
    }

    pub fn union(self, other: SymbolAttrs) -> SymbolAttrs {
        SymbolAttrs(self.0 | other.0)
    }
}

/// Symbol interner backed by a string arena.
///
/// Stores each distinct name once; lookup is get-or-create. Attributes are
/// stored per symbol in a parallel array.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    names: Vec<String>,
    attrs: Vec<SymbolAttrs>,
    lookup: HashMap<String, u32>,
    fresh_counter: u32,
}

impl Interner {
    /// Create a new empty interner
    pub fn new() -> Self {
        Interner {
            names: Vec::new(),
            attrs: Vec::new(),
            lookup: HashMap::new(),
            fresh_counter: 0,
        }
    }

    /// Intern a name, returning its ID (get-or-create)
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.lookup.get(name) {
            return SymbolId(id);
        }
        let id = self.names.len() as u32;
        self.names.push(name.to_string());
        self.attrs.push(SymbolAttrs::empty());
        self.lookup.insert(name.to_string(), id);
        SymbolId(id)
    }

    /// Intern a name and set attributes on it
    pub fn intern_with_attrs(&mut self, name: &str, attrs: SymbolAttrs) -> SymbolId {
        let id = self.intern(name);
        self.attrs[id.0 as usize].insert(attrs);
        id
    }

    /// Allocate a symbol with a guaranteed-fresh name derived from `prefix`.
    ///
    /// The symbol is tagged with the fresh-constant attribute. Used for
    /// skolemization and splitting, which introduce names mid-run.
    pub fn fresh(&mut self, prefix: &str) -> SymbolId {
        loop {
            let candidate = format!("{}_{}", prefix, self.fresh_counter);
            self.fresh_counter += 1;
            if !self.lookup.contains_key(&candidate) {
                return self.intern_with_attrs(&candidate, SymbolAttrs::FRESH);
            }
        }
    }

    /// Resolve an ID to its name
    pub fn resolve(&self, id: SymbolId) -> &str {
        &self.names[id.0 as usize]
    }

    /// Get the attributes of a symbol
    pub fn attrs(&self, id: SymbolId) -> SymbolAttrs {
        self.attrs[id.0 as usize]
    }

    /// Get the ID for an already-interned name (returns None if not found)
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.lookup.get(name).copied().map(SymbolId)
    }

    /// Check if a name is already interned
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Number of interned symbols
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Drop all interned symbols. Used between problems; existing
    /// `SymbolId`s become dangling and must not be reused.
    pub fn clear(&mut self) {
        self.names.clear();
        self.attrs.clear();
        self.lookup.clear();
        self.fresh_counter = 0;
    }
}

/// Declaring a symbol twice with incompatible types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("symbol {symbol} declared with conflicting types ({existing:?} vs {declared:?})")]
pub struct SignatureConflict {
    pub symbol: SymbolId,
    pub existing: TypeId,
    pub declared: TypeId,
}

/// Map from symbols to their declared types.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    types: HashMap<SymbolId, TypeId>,
}

impl Signature {
    pub fn new() -> Self {
        Signature {
            types: HashMap::new(),
        }
    }

    /// Declare a symbol's type. Re-declaring with the same type is a no-op;
    /// a different type is a `SignatureConflict`.
    pub fn declare(&mut self, symbol: SymbolId, ty: TypeId) -> Result<(), SignatureConflict> {
        match self.types.get(&symbol) {
            Some(&existing) if existing != ty => Err(SignatureConflict {
                symbol,
                existing,
                declared: ty,
            }),
            Some(_) => Ok(()),
            None => {
                self.types.insert(symbol, ty);
                Ok(())
            }
        }
    }

    /// Get the declared type of a symbol
    pub fn type_of(&self, symbol: SymbolId) -> Option<TypeId> {
        self.types.get(&symbol).copied()
    }

    /// Number of declared symbols
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over all declarations
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, TypeId)> + '_ {
        self.types.iter().map(|(&s, &t)| (s, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning() {
        let mut interner = Interner::new();

        let f1 = interner.intern("f");
        let f2 = interner.intern("f");
        let g = interner.intern("g");

        assert_eq!(f1, f2);
        assert_ne!(f1, g);
        assert_eq!(interner.resolve(f1), "f");
        assert_eq!(interner.resolve(g), "g");
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_get_and_contains() {
        let mut interner = Interner::new();

        assert!(!interner.contains("f"));
        assert!(interner.get("f").is_none());

        let f = interner.intern("f");

        assert!(interner.contains("f"));
        assert_eq!(interner.get("f"), Some(f));
    }

    #[test]
    fn test_attrs() {
        let mut interner = Interner::new();

        let plus = interner.intern_with_attrs("+", SymbolAttrs::AC.union(SymbolAttrs::INFIX));
        assert!(interner.attrs(plus).contains(SymbolAttrs::AC));
        assert!(interner.attrs(plus).contains(SymbolAttrs::INFIX));
        assert!(!interner.attrs(plus).contains(SymbolAttrs::SKOLEM));

        // Re-interning keeps attributes
        let plus2 = interner.intern("+");
        assert_eq!(plus, plus2);
        assert!(interner.attrs(plus2).contains(SymbolAttrs::AC));
    }

    #[test]
    fn test_fresh_symbols_are_distinct() {
        let mut interner = Interner::new();
        let a = interner.fresh("sk");
        let b = interner.fresh("sk");
        assert_ne!(a, b);
        assert!(interner.attrs(a).contains(SymbolAttrs::FRESH));
        assert_ne!(interner.resolve(a), interner.resolve(b));
    }

    #[test]
    fn test_fresh_avoids_existing_names() {
        let mut interner = Interner::new();
        interner.intern("sk_0");
        let a = interner.fresh("sk");
        assert_ne!(interner.resolve(a), "sk_0");
    }

    #[test]
    fn test_signature_conflict() {
        let mut interner = Interner::new();
        let f = interner.intern("f");

        let mut sig = Signature::new();
        let t1 = TypeId(0);
        let t2 = TypeId(1);

        assert!(sig.declare(f, t1).is_ok());
        assert!(sig.declare(f, t1).is_ok());
        let err = sig.declare(f, t2).unwrap_err();
        assert_eq!(err.symbol, f);
        assert_eq!(sig.type_of(f), Some(t1));
    }

    #[test]
    fn test_id_ordering() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        assert!(a < b);
    }
}
