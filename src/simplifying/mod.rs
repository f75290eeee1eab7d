//! Simplification and redundancy elimination rules.

pub mod demodulation;
pub mod simplify_reflect;
pub mod subsumption;
pub mod tautology;

pub use demodulation::DemodulationRule;
pub use simplify_reflect::SimplifyReflectRule;
pub use subsumption::{subsumes, SubsumptionRule};
pub use tautology::TautologyRule;
