//! Prover configuration types.

use std::time::Duration;

use crate::logic::ordering::Precedence;

/// Which reduction ordering restricts the calculus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingChoice {
    /// Knuth-Bendix ordering
    #[default]
    Kbo,
    /// Recursive path ordering
    Rpo,
}

/// Which literal selection function runs on every given clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStrategy {
    /// No selection; maximal literals are eligible
    #[default]
    None,
    /// Select every negative literal
    AllNegative,
    /// Select the first negative literal
    FirstNegative,
    /// Select a maximal negative literal with the deepest variable
    Complex,
}

/// Configuration for the saturation loop.
#[derive(Debug, Clone)]
pub struct ProverConfig {
    /// Stop after this many stored clauses (0 means no limit)
    pub max_clauses: usize,
    /// Stop after this many given-clause iterations (0 means no limit)
    pub max_iterations: usize,
    /// Drop derived clauses with more literals than this
    pub max_clause_size: usize,
    /// Wall-clock budget for `saturate`
    pub timeout: Duration,
    pub ordering: OrderingChoice,
    pub selection: SelectionStrategy,
    /// Symbol precedence, weights and statuses for the ordering
    pub precedence: Precedence,
    /// Age picks vs weight picks per passive-queue cycle
    pub age_weight_ratio: (u32, u32),
    /// Record counters and rule statistics (zero overhead when false)
    pub enable_profiling: bool,
}

impl Default for ProverConfig {
    fn default() -> Self {
        ProverConfig {
            max_clauses: 0,
            max_iterations: 0,
            max_clause_size: 100,
            timeout: Duration::from_secs(60),
            ordering: OrderingChoice::default(),
            selection: SelectionStrategy::default(),
            precedence: Precedence::default(),
            age_weight_ratio: (1, 4),
            enable_profiling: false,
        }
    }
}
