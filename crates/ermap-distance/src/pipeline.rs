//! Orchestration of many distance queries over one oracle session.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::time::Instant;

use ermap_core::{Location, Warehouse};

use crate::extract::{DistanceExtractor, ExtractionStatus};
use crate::report::{DistanceResult, Endpoint, OriginReport, PairReport};
use crate::resolve::TextLocationResolver;
use crate::retry::{query_with_retries, Outcome, RetryPolicy};
use crate::{MapOracle, PipelineError};

/// Knobs for one resolution run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Total attempts per pair. Values below 1 are treated as 1.
    pub max_retries: u32,
    /// Fixed pause between attempts on the same pair.
    pub backoff: Duration,
    /// Upper bound on a whole run. Pairs not finished in time are reported
    /// as failed rather than dropped.
    pub deadline: Option<Duration>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(1),
            deadline: None,
        }
    }
}

/// Resolves origin→warehouse and warehouse↔warehouse distances.
///
/// Queries are issued one at a time. A pair that cannot be resolved becomes
/// a failed [`DistanceResult`]; it never stops the rest of the run.
#[derive(Default)]
pub struct DistancePipeline {
    extractor: DistanceExtractor,
    resolver: TextLocationResolver,
    options: PipelineOptions,
}

impl DistancePipeline {
    #[must_use]
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            extractor: DistanceExtractor::new(),
            resolver: TextLocationResolver::new(),
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Distance from `origin` to every warehouse, in warehouse order.
    ///
    /// A named origin is geocoded once before the first pair; if that fails
    /// the name itself is used in queries.
    pub async fn resolve_many<O: MapOracle>(
        &self,
        oracle: &mut O,
        origin: &Location,
        warehouses: &[Warehouse],
    ) -> OriginReport {
        let deadline = self.run_deadline();
        let label = origin.to_string();

        let resolved_origin = match origin {
            Location::Coordinates(c) => c.to_query(),
            Location::Named(name) => self.resolve_origin(oracle, name, deadline).await,
        };
        let from = Endpoint::place(label.clone(), resolved_origin.clone());

        tracing::info!(
            origin = %label,
            resolved = %resolved_origin,
            warehouses = warehouses.len(),
            "resolving distances from origin"
        );

        let mut results = Vec::with_capacity(warehouses.len());
        for warehouse in warehouses {
            let to = Endpoint::warehouse(warehouse);
            results.push(self.resolve_pair(oracle, &from, &to, deadline).await);
        }

        let report = OriginReport {
            origin: label,
            resolved_origin,
            results,
        };
        tracing::info!(
            origin = %report.origin,
            succeeded = report.success_count(),
            total = report.results.len(),
            "origin distances finished"
        );
        report
    }

    /// One result per unordered warehouse pair, `n·(n−1)/2` in total.
    ///
    /// Pairs are visited in `(i, j)` order with `i < j`; the reverse
    /// direction is never queried.
    pub async fn resolve_all_pairs<O: MapOracle>(
        &self,
        oracle: &mut O,
        warehouses: &[Warehouse],
    ) -> PairReport {
        let deadline = self.run_deadline();
        let endpoints: Vec<Endpoint> = warehouses.iter().map(Endpoint::warehouse).collect();
        let n = endpoints.len();

        tracing::info!(
            warehouses = n,
            pairs = n * n.saturating_sub(1) / 2,
            "resolving inter-warehouse distances"
        );

        let mut results = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for (i, from) in endpoints.iter().enumerate() {
            for to in &endpoints[i + 1..] {
                results.push(self.resolve_pair(oracle, from, to, deadline).await);
            }
        }

        let report = PairReport { results };
        tracing::info!(
            succeeded = report.success_count(),
            total = report.results.len(),
            "inter-warehouse distances finished"
        );
        report
    }

    /// Runs the attempt loop for a single pair.
    pub async fn resolve_pair<O: MapOracle>(
        &self,
        oracle: &mut O,
        from: &Endpoint,
        to: &Endpoint,
        deadline: Option<Instant>,
    ) -> DistanceResult {
        let query = format!("从{}到{}的车辆行驶距离", from.query, to.query);
        let policy = RetryPolicy {
            max_attempts: self.options.max_retries.max(1),
            backoff: self.options.backoff,
            deadline,
        };

        match query_with_retries(oracle, &self.extractor, &query, policy).await {
            Outcome::Resolved {
                distance_km,
                duration_min,
                attempts,
            } => {
                tracing::debug!(
                    from = %from.name,
                    to = %to.name,
                    distance_km,
                    duration_min,
                    attempts,
                    "pair resolved"
                );
                DistanceResult::resolved(from.clone(), to.clone(), distance_km, duration_min, attempts)
            }
            Outcome::Exhausted {
                last_extraction,
                error,
                attempts,
            } => {
                tracing::warn!(
                    from = %from.name,
                    to = %to.name,
                    attempts,
                    error = error.as_deref().unwrap_or("unreadable reply"),
                    "pair failed"
                );
                let (distance_km, duration_min, status, raw) = match last_extraction {
                    Some(e) => (
                        e.distance_km,
                        e.duration_min,
                        e.status,
                        e.raw_response.unwrap_or_default(),
                    ),
                    None => (
                        None,
                        None,
                        ExtractionStatus::Failed,
                        error.clone().unwrap_or_default(),
                    ),
                };
                DistanceResult::failed(
                    from.clone(),
                    to.clone(),
                    distance_km,
                    duration_min,
                    status,
                    attempts,
                    raw,
                    error,
                )
            }
        }
    }

    fn run_deadline(&self) -> Option<Instant> {
        self.options.deadline.map(|d| Instant::now() + d)
    }

    async fn resolve_origin<O: MapOracle>(
        &self,
        oracle: &mut O,
        name: &str,
        deadline: Option<Instant>,
    ) -> String {
        match deadline {
            Some(deadline) => {
                tokio::time::timeout_at(deadline, self.resolver.resolve(oracle, name))
                    .await
                    .unwrap_or_else(|_| name.to_string())
            }
            None => self.resolver.resolve(oracle, name).await,
        }
    }
}

/// Connects `oracle`, runs `job` against it, and disconnects afterwards.
///
/// The oracle is disconnected on every path out of the job, including a
/// panic, which is resumed after cleanup. The job's future may only borrow
/// the oracle, so move anything else it needs into the closure.
///
/// # Errors
///
/// Returns [`PipelineError::Connect`] if the oracle cannot connect; `job`
/// is not run in that case.
pub async fn with_session<O, T, F>(oracle: &mut O, job: F) -> Result<T, PipelineError>
where
    O: MapOracle,
    F: for<'a> FnOnce(&'a mut O) -> BoxFuture<'a, T>,
{
    match oracle.connect().await {
        Ok(tools) => {
            tracing::info!(tools = tools.len(), "map oracle session opened");
        }
        Err(e) => {
            oracle.disconnect().await;
            return Err(PipelineError::Connect(e));
        }
    }

    let outcome = AssertUnwindSafe(job(&mut *oracle)).catch_unwind().await;
    oracle.disconnect().await;
    tracing::debug!("map oracle session closed");

    match outcome {
        Ok(value) => Ok(value),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
