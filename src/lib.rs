//! Satura: a saturation-based theorem prover core for first-order logic
//! with equality
//!
//! The crate implements the superposition calculus around a given-clause
//! loop: hash-consed terms with scoped unification, literal and clause
//! algebra under a reduction ordering (KBO or RPO), discrimination-tree
//! indexing, the generating rules (superposition, resolution, factoring,
//! equality resolution, equality factoring) and the simplification layer
//! (demodulation, simplify-reflect, subsumption, tautology deletion).
//!
//! It is a library, not an executable: clauses arrive as lists of signed
//! equations through [`Prover::add_initial`], and [`Prover::saturate`]
//! answers with a refutation proof, saturation, or budget exhaustion.
//! Parsers, CNF conversion, proof printing and solver integrations are
//! external collaborators that plug in through the rule, redundancy and
//! event hooks.
//!
//! ```
//! use satura::{Context, Literal, Outcome, Prover, ProverConfig};
//!
//! let mut ctx = Context::new();
//! let a = ctx.parse_const("a");
//! let mut prover = Prover::new(ctx, ProverConfig::default()).unwrap();
//! prover.add_initial(vec![Literal::neq(a, a)]).unwrap();
//! assert!(matches!(prover.saturate(None), Outcome::Refutation(_)));
//! ```

pub mod config;
pub mod index;
pub mod inference;
pub mod logic;
pub mod saturation;
pub mod selection;
pub mod simplifying;
pub mod unification;

pub use config::{OrderingChoice, ProverConfig, SelectionStrategy};
pub use logic::{
    Clause, ClauseId, ClauseStore, Context, Derivation, Interner, Literal, Position, Precedence,
    Renaming, Scope, Scoped, Signature, SignatureConflict, Status, Step, Substitution, SymbolAttrs,
    SymbolId, TermBank, TermError, TermId, TermOrder, TermOrdering, TermView, TypeBank, TypeError,
    TypeId, VarId, KBO, RPO,
};
pub use saturation::{
    ClauseEventListener, EventBus, EventLog, GeneratingInference, Outcome, Proof, ProofStep,
    Prover, ProverError, RuleContext, SaturationProfile, SaturationState, Simplification,
    SimplifyingInference, StateChange,
};
pub use selection::{
    LiteralSelector, PassiveQueue, SelectAllNegative, SelectComplex, SelectFirstNegative,
    SelectNone,
};
pub use simplifying::subsumes;
pub use unification::{match_into, matches, unify, unify_into, variant};
