//! Generating inference rules of the superposition calculus.

pub mod common;
pub mod equality_factoring;
pub mod equality_resolution;
pub mod factoring;
pub mod resolution;
pub mod superposition;

pub use equality_factoring::EqualityFactoringRule;
pub use equality_resolution::EqualityResolutionRule;
pub use factoring::FactoringRule;
pub use resolution::ResolutionRule;
pub use superposition::SuperpositionRule;
