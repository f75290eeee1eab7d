//! Saturation statistics (populated only when profiling is enabled).

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Counters for one saturation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SaturationProfile {
    /// Given-clause iterations completed
    pub iterations: u64,
    /// Conclusions produced by generating rules (before simplification)
    pub clauses_generated: u64,
    /// Clauses that survived into the passive queue
    pub clauses_kept: u64,
    /// New clauses deleted or rewritten by forward simplification
    pub forward_simplified: u64,
    /// Active/passive clauses removed by backward simplification
    pub backward_simplified: u64,
    /// Per-rule conclusion counts
    pub rule_counts: BTreeMap<String, u64>,
    /// Wall-clock time of the run
    #[serde(serialize_with = "serialize_secs")]
    pub total_time: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl SaturationProfile {
    pub fn record_rule(&mut self, rule: &str, count: usize) {
        if count > 0 {
            *self.rule_counts.entry(rule.to_string()).or_insert(0) += count as u64;
        }
    }
}
