//! Logical core: symbols, types, terms, substitutions, orderings,
//! literals and clauses.


pub mod clause;
pub mod context;
pub mod interner;
pub mod literal;
pub mod ordering;
pub mod position;
pub mod substitution;
pub mod term;
pub mod types;

pub use clause::{Clause, ClauseId, ClauseStore, Derivation, SelectionError};
pub use context::{Builtins, Context};
pub use interner::{Interner, Signature, SignatureConflict, SymbolAttrs, SymbolId};
pub use literal::Literal;
pub use ordering::{
    multiset_compare, not_smaller, Precedence, Status, TermOrder, TermOrdering, KBO, RPO,
};
pub use position::{Position, Step};
pub use substitution::{InconsistentBinding, Renaming, Scope, Scoped, Substitution};
pub use term::{TermBank, TermError, TermId, TermView, VarId};
pub use types::{TypeBank, TypeError, TypeId};
