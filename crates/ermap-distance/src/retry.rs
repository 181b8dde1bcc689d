//! The per-pair attempt loop.
//!
//! [`query_with_retries`] asks the oracle the same question until a reply
//! extracts completely or attempts run out. Oracle errors and unreadable
//! replies are handled the same way: log, sleep the fixed back-off, retry.

use std::time::Duration;

use tokio::time::Instant;

use crate::extract::{DistanceExtractor, Extraction, ExtractionStatus};
use crate::{MapOracle, OracleError};

pub(crate) const DEADLINE_EXCEEDED: &str = "deadline exceeded";

#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    /// Total attempts, at least 1.
    pub max_attempts: u32,
    pub backoff: Duration,
    pub deadline: Option<Instant>,
}

impl RetryPolicy {
    fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// What the loop ended with.
#[derive(Debug)]
pub(crate) enum Outcome {
    Resolved {
        distance_km: f64,
        duration_min: u32,
        attempts: u32,
    },
    Exhausted {
        /// Extraction of the last reply received, if any reply came back.
        last_extraction: Option<Extraction>,
        /// Error raised by the final attempt.
        error: Option<String>,
        attempts: u32,
    },
}

pub(crate) async fn query_with_retries<O: MapOracle>(
    oracle: &mut O,
    extractor: &DistanceExtractor,
    query: &str,
    policy: RetryPolicy,
) -> Outcome {
    let max_attempts = policy.max_attempts.max(1);
    let mut last_extraction = None;
    let mut error = None;
    let mut attempts = 0u32;

    for attempt in 1..=max_attempts {
        if policy.expired() {
            error = Some(DEADLINE_EXCEEDED.to_string());
            break;
        }
        attempts = attempt;

        let reply = match policy.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, oracle.process_query(query))
                .await
                .unwrap_or(Err(OracleError::DeadlineExceeded)),
            None => oracle.process_query(query).await,
        };

        match reply {
            Ok(text) => {
                let extraction = extractor.extract(&text);
                if let (ExtractionStatus::Complete, Some(distance_km), Some(duration_min)) = (
                    extraction.status,
                    extraction.distance_km,
                    extraction.duration_min,
                ) {
                    if attempt > 1 {
                        tracing::info!(query, attempt, "distance resolved after retry");
                    }
                    return Outcome::Resolved {
                        distance_km,
                        duration_min,
                        attempts: attempt,
                    };
                }
                tracing::warn!(
                    attempt,
                    max_attempts,
                    query,
                    status = %extraction.status,
                    distance_patterns_tried = extraction.distance_patterns_tried,
                    duration_patterns_tried = extraction.duration_patterns_tried,
                    raw_response = extraction.raw_response.as_deref().unwrap_or_default(),
                    "could not read distance from oracle reply"
                );
                last_extraction = Some(extraction);
                error = None;
            }
            Err(OracleError::DeadlineExceeded) => {
                tracing::warn!(attempt, query, "oracle query cut off by run deadline");
                error = Some(DEADLINE_EXCEEDED.to_string());
                break;
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    query,
                    error = %e,
                    "oracle query failed"
                );
                error = Some(e.to_string());
            }
        }

        if attempt < max_attempts {
            // A backoff that outlasts the deadline ends at the deadline; the
            // expiry check at the top of the loop then stops the pair.
            let wake = Instant::now() + policy.backoff;
            tokio::time::sleep_until(policy.deadline.map_or(wake, |d| wake.min(d))).await;
        }
    }

    Outcome::Exhausted {
        last_extraction,
        error,
        attempts,
    }
}
