//! Tautology deletion
//!
//! A clause containing a reflexive positive equation or a complementary
//! literal pair is true in every interpretation and never contributes to
//! a refutation.

use crate::index::Indexes;
use crate::logic::clause::Clause;
use crate::saturation::state::{RuleContext, SaturationState, Simplification, SimplifyingInference};

/// Tautology deletion rule.
pub struct TautologyRule;

impl TautologyRule {
    pub fn new() -> Self {
        TautologyRule
    }
}

impl Default for TautologyRule {
    fn default() -> Self {
        Self::new()
    }
}

impl SimplifyingInference for TautologyRule {
    fn name(&self) -> &'static str {
        "Tautology"
    }

    fn simplify_forward(
        &self,
        clause: &Clause,
        _state: &SaturationState,
        _rc: &mut RuleContext<'_>,
        _indices: &Indexes,
    ) -> Option<Simplification> {
        if clause.is_tautology() {
            Some(Simplification::Redundant { by: Vec::new() })
        } else {
            None
        }
    }
}
