//! Generation metrics
//!
//! A failure is counted even when a fallback later produces a fragment; that
//! generation then also counts as successful with `fallback_generations`
//! incremented.

use livepatch_core::serde_util::duration_micros;
use livepatch_core::Strategy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetrics {
    pub total_generations: u64,
    pub successful_generations: u64,
    pub failed_generations: u64,
    pub fallback_generations: u64,
    /// Keyed by strategy name
    pub strategy_counts: BTreeMap<String, u64>,
    #[serde(with = "duration_micros")]
    pub average_generation_time: Duration,
    /// Generations slower than the advisory budget
    pub slow_generations: u64,
    /// Bytes of new HTML the fragments stand in for
    pub original_bytes: u64,
    /// Bytes of serialized payloads actually produced
    pub encoded_bytes: u64,
    pub tree_updates: u64,
    /// Serialized bytes of tree updates
    pub tree_bytes: u64,
    #[serde(skip)]
    timed_generations: u64,
}

impl GenerationMetrics {
    /// Count the start of one generation
    pub fn record_attempt(&mut self) {
        self.total_generations += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed_generations += 1;
    }

    pub fn record_fragment(
        &mut self,
        strategy: Strategy,
        original_size: usize,
        encoded_size: usize,
        fallback_used: bool,
    ) {
        *self
            .strategy_counts
            .entry(strategy.name().to_string())
            .or_default() += 1;
        self.original_bytes += original_size as u64;
        self.encoded_bytes += encoded_size as u64;
        if fallback_used {
            self.fallback_generations += 1;
        }
    }

    pub fn record_tree_update(&mut self, encoded_size: usize) {
        self.tree_updates += 1;
        self.tree_bytes += encoded_size as u64;
    }

    /// Count a finished generation and fold its time into the average
    pub fn record_success(&mut self, elapsed: Duration, slow: bool) {
        self.successful_generations += 1;
        if slow {
            self.slow_generations += 1;
        }
        self.timed_generations += 1;
        let n = self.timed_generations as u32;
        let average = self.average_generation_time;
        self.average_generation_time = if elapsed >= average {
            average + (elapsed - average) / n
        } else {
            average - (average - elapsed) / n
        };
    }

    /// Failed generations over attempts
    pub fn error_rate(&self) -> f64 {
        if self.total_generations == 0 {
            0.0
        } else {
            self.failed_generations as f64 / self.total_generations as f64
        }
    }

    /// Fraction of HTML bytes not sent, 0 when nothing was generated
    pub fn bandwidth_saving(&self) -> f64 {
        if self.original_bytes == 0 {
            0.0
        } else {
            1.0 - self.encoded_bytes as f64 / self.original_bytes as f64
        }
    }

    pub fn usage(&self, strategy: Strategy) -> u64 {
        self.strategy_counts.get(strategy.name()).copied().unwrap_or(0)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
