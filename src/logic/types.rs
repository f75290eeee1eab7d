//! Simple polymorphic types over symbols
//!
//! Types are trees of atomic (symbol) and function (arguments, result)
//! nodes, hash-consed into a `TypeBank` so type equality is handle
//! equality. Application has strict arity.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use super::interner::{Interner, SymbolId};

/// ID for an interned type
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Shape of a type node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// Atomic type named by a symbol
    Atom(SymbolId),
    /// Function type: argument list and result
    Fun(Vec<TypeId>, TypeId),
}

/// Errors from type construction and application
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("type mismatch at argument {position}: expected {expected:?}, found {found:?}")]
    Mismatch {
        expected: TypeId,
        found: TypeId,
        position: usize,
    },
    #[error("applied a non-function type {0:?}")]
    NotAFunction(TypeId),
    #[error("arity mismatch: expected {expected} arguments, found {found}")]
    ArityMismatch { expected: usize, found: usize },
}

/// Hash-consing store for types.
#[derive(Debug, Clone, Default)]
pub struct TypeBank {
    shapes: Vec<TypeShape>,
    lookup: HashMap<TypeShape, u32>,
}

impl TypeBank {
    pub fn new() -> Self {
        TypeBank {
            shapes: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    fn intern(&mut self, shape: TypeShape) -> TypeId {
        if let Some(&id) = self.lookup.get(&shape) {
            return TypeId(id);
        }
        let id = self.shapes.len() as u32;
        self.shapes.push(shape.clone());
        self.lookup.insert(shape, id);
        TypeId(id)
    }

    /// Construct an atomic type from a symbol
    pub fn atom(&mut self, symbol: SymbolId) -> TypeId {
        self.intern(TypeShape::Atom(symbol))
    }

    /// Construct a function type `args -> result`.
    ///
    /// A 0-ary function type collapses to the result type.
    pub fn function(&mut self, args: Vec<TypeId>, result: TypeId) -> TypeId {
        if args.is_empty() {
            return result;
        }
        self.intern(TypeShape::Fun(args, result))
    }

    /// Apply a function type to a list of argument types.
    ///
    /// Checks pointwise equality against the declared argument types and
    /// returns the result type.
    pub fn apply(&self, fn_ty: TypeId, arg_tys: &[TypeId]) -> Result<TypeId, TypeError> {
        match self.view(fn_ty) {
            TypeShape::Fun(params, result) => {
                if params.len() != arg_tys.len() {
                    return Err(TypeError::ArityMismatch {
                        expected: params.len(),
                        found: arg_tys.len(),
                    });
                }
                for (i, (&expected, &found)) in params.iter().zip(arg_tys).enumerate() {
                    if expected != found {
                        return Err(TypeError::Mismatch {
                            expected,
                            found,
                            position: i,
                        });
                    }
                }
                Ok(*result)
            }
            TypeShape::Atom(_) => Err(TypeError::NotAFunction(fn_ty)),
        }
    }

    /// View the shape of a type
    pub fn view(&self, ty: TypeId) -> &TypeShape {
        &self.shapes[ty.0 as usize]
    }

    /// The result type of a function type, or the type itself if atomic
    pub fn result_of(&self, ty: TypeId) -> TypeId {
        match self.view(ty) {
            TypeShape::Fun(_, result) => *result,
            TypeShape::Atom(_) => ty,
        }
    }

    /// Declared arity of a type (0 for atomic types)
    pub fn arity_of(&self, ty: TypeId) -> usize {
        match self.view(ty) {
            TypeShape::Fun(params, _) => params.len(),
            TypeShape::Atom(_) => 0,
        }
    }

    /// Number of interned types
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Drop all interned types. Used between problems.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.lookup.clear();
    }

    /// Format a type for display with an interner for name resolution
    pub fn display<'a>(&'a self, ty: TypeId, interner: &'a Interner) -> TypeDisplay<'a> {
        TypeDisplay {
            bank: self,
            ty,
            interner,
        }
    }
}

/// Display wrapper for a type that resolves symbol names
pub struct TypeDisplay<'a> {
    bank: &'a TypeBank,
    ty: TypeId,
    interner: &'a Interner,
}

impl<'a> fmt::Display for TypeDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bank.view(self.ty) {
            TypeShape::Atom(sym) => write!(f, "{}", self.interner.resolve(*sym)),
            TypeShape::Fun(params, result) => {
                write!(f, "(")?;
                for (i, &p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, " * ")?;
                    }
                    write!(f, "{}", self.bank.display(p, self.interner))?;
                }
                write!(f, ") > {}", self.bank.display(*result, self.interner))
            }
        }
    }
}
