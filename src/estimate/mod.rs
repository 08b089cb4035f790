//! Cardinality estimation for cost-based planning
//!
//! The batch engine's optimizer asks each source for a statistical size
//! range before choosing an execution strategy. For a REST source the only
//! honest signal is the materialized response itself, so the estimator
//! forces the cached fetch and derives a tight band around the observed
//! count. When the source cannot be measured it substitutes a deliberately
//! wide fixed fallback rather than failing the planning pass.
//!
//! The estimator is stateless: memoizing estimates per request key across
//! planning calls is the optimizer's job (see `RequestSpec::cache_key`).


use crate::error::{Error, Result};
use crate::source::CachedSource;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Statistical size range consumed by a cost-based planner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardinalityEstimate {
    /// Lower bound on the record count
    pub lower_bound: u64,
    /// Upper bound on the record count
    pub upper_bound: u64,
    /// Probability that the true count falls inside the bounds, in (0, 1]
    pub confidence: f64,
}

impl CardinalityEstimate {
    /// Create an estimate
    pub fn new(lower_bound: u64, upper_bound: u64, confidence: f64) -> Self {
        Self {
            lower_bound,
            upper_bound,
            confidence,
        }
    }
}

/// Derives [`CardinalityEstimate`]s from a cached source
#[derive(Debug, Clone, Copy, Default)]
pub struct CardinalityEstimator;

impl CardinalityEstimator {
    /// Confidence attached to a measured estimate
    pub const CORRECTNESS_PROBABILITY: f64 = 0.95;

    /// Relative deviation applied around the measured count
    pub const EXPECTED_ESTIMATE_DEVIATION: f64 = 0.05;

    /// Fixed estimate substituted when the source cannot be measured
    pub const FALLBACK_ESTIMATE: CardinalityEstimate = CardinalityEstimate {
        lower_bound: 1_000,
        upper_bound: 100_000_000,
        confidence: 0.7,
    };

    /// Create a new estimator
    pub fn new() -> Self {
        Self
    }

    /// Estimate the cardinality of the given source
    ///
    /// Forces the source's fetch if it has not happened yet. Total: any
    /// failure (including a failed forced fetch) yields the fallback
    /// estimate, never an error.
    pub async fn estimate(&self, source: &CachedSource) -> CardinalityEstimate {
        match self.try_estimate(source).await {
            Ok(estimate) => estimate,
            Err(e) => {
                warn!(
                    url = source.spec().url(),
                    error = %e,
                    "failed to estimate cardinality, using fallback estimate"
                );
                Self::FALLBACK_ESTIMATE
            }
        }
    }

    async fn try_estimate(&self, source: &CachedSource) -> Result<CardinalityEstimate> {
        let records = source.get().await;

        if source.fetch_failed() {
            return Err(Error::estimation(format!(
                "source fetch failed for {}",
                source.spec().url()
            )));
        }

        let count = records.len() as u64;
        let deviation = count as f64 * Self::EXPECTED_ESTIMATE_DEVIATION;

        Ok(CardinalityEstimate::new(
            (count as f64 - deviation) as u64,
            (count as f64 + deviation) as u64,
            Self::CORRECTNESS_PROBABILITY,
        ))
    }

    /// Average serialized bytes per record of the cached sequence
    ///
    /// Forces the fetch if needed. Returns `None` (with a warning) when the
    /// sequence is empty, since there is no meaningful per-record size.
    pub async fn bytes_per_record(&self, source: &CachedSource) -> Option<f64> {
        let records = source.get().await;

        if records.is_empty() {
            warn!(
                url = source.spec().url(),
                "could not find any records to size"
            );
            return None;
        }

        let serialized = serde_json::to_string(&*records).ok()?;
        Some(serialized.len() as f64 / records.len() as f64)
    }
}
