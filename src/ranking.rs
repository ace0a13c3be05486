//! Latency ranking
//!
//! Candidates are stable-sorted by ascending latency. Unreachable candidates all carry the
//! same sentinel, so they sink to the bottom and keep their feed order, as do any other ties.

use crate::EndpointCandidate;
use crate::client_config::ClientConfig;
use crate::error::{Result, SelectorError};
use tracing::{info, warn};

/// Candidates ordered best first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranking {
    candidates: Vec<EndpointCandidate>,
}

impl Ranking {
    /// Orders `candidates` by latency; ties keep their input order.
    pub fn rank(mut candidates: Vec<EndpointCandidate>) -> Self {
        // `sort_by_key` is stable.
        candidates.sort_by_key(|candidate| candidate.latency);
        Ranking { candidates }
    }

    /// The lowest-latency candidate.
    ///
    /// # Errors
    ///
    /// Returns `NoCandidates` if the ranking is empty.
    pub fn best(&self) -> Result<&EndpointCandidate> {
        self.candidates.first().ok_or(SelectorError::NoCandidates)
    }

    /// All candidates, best first.
    pub fn candidates(&self) -> &[EndpointCandidate] {
        &self.candidates
    }

    /// Number of ranked candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether there is nothing to select from.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Number of candidates whose probe succeeded.
    pub fn reachable_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.is_reachable()).count()
    }

    /// Logs the full listing at `info`, one JSON record per candidate.
    pub fn log_listing(&self) {
        for (rank, candidate) in self.candidates.iter().enumerate() {
            match ClientConfig::from(candidate).to_json(false) {
                Ok(json) => info!(rank = rank + 1, "{}", json),
                Err(e) => warn!(rank = rank + 1, error = %e, "cannot render candidate"),
            }
        }
    }

    /// Consumes the ranking.
    pub fn into_candidates(self) -> Vec<EndpointCandidate> {
        self.candidates
    }
}
