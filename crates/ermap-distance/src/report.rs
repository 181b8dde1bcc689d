//! Per-pair results and the reports that collect them.

use serde::Serialize;

use ermap_core::{DistanceStatus, StoredDistance, Warehouse};

use crate::ExtractionStatus;

/// One end of a distance query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    /// Warehouse id, when the endpoint is a warehouse.
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Text placed in the oracle query: coordinates when known, else the name.
    pub query: String,
}

impl Endpoint {
    #[must_use]
    pub fn place(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            query: query.into(),
        }
    }

    /// Warehouses are queried by their stored coordinates.
    #[must_use]
    pub fn warehouse(warehouse: &Warehouse) -> Self {
        Self {
            id: Some(warehouse.id.clone()),
            name: warehouse.name.clone(),
            query: warehouse.coordinates().to_query(),
        }
    }
}

/// The outcome of resolving one origin/destination pair.
///
/// A successful result always carries both distance and duration; a failed
/// one always carries the raw reply (or the error text when no reply came
/// back).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceResult {
    origin: Endpoint,
    destination: Endpoint,
    distance_km: Option<f64>,
    duration_min: Option<u32>,
    success: bool,
    status: ExtractionStatus,
    attempts: u32,
    raw_response: Option<String>,
    error: Option<String>,
}

impl DistanceResult {
    #[must_use]
    pub fn resolved(
        origin: Endpoint,
        destination: Endpoint,
        distance_km: f64,
        duration_min: u32,
        attempts: u32,
    ) -> Self {
        Self {
            origin,
            destination,
            distance_km: Some(distance_km),
            duration_min: Some(duration_min),
            success: true,
            status: ExtractionStatus::Complete,
            attempts,
            raw_response: None,
            error: None,
        }
    }

    /// A pair that ran out of attempts. Partially extracted values are kept
    /// for display only.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn failed(
        origin: Endpoint,
        destination: Endpoint,
        distance_km: Option<f64>,
        duration_min: Option<u32>,
        status: ExtractionStatus,
        attempts: u32,
        raw_response: String,
        error: Option<String>,
    ) -> Self {
        let status = match status {
            ExtractionStatus::Complete => ExtractionStatus::Failed,
            other => other,
        };
        Self {
            origin,
            destination,
            distance_km,
            duration_min,
            success: false,
            status,
            attempts,
            raw_response: Some(raw_response),
            error,
        }
    }

    #[must_use]
    pub fn origin(&self) -> &Endpoint {
        &self.origin
    }

    #[must_use]
    pub fn destination(&self) -> &Endpoint {
        &self.destination
    }

    #[must_use]
    pub fn distance_km(&self) -> Option<f64> {
        self.distance_km
    }

    #[must_use]
    pub fn duration_min(&self) -> Option<u32> {
        self.duration_min
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.success
    }

    #[must_use]
    pub fn status(&self) -> ExtractionStatus {
        self.status
    }

    /// 1-indexed attempt that succeeded, or the number of attempts spent.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn raw_response(&self) -> Option<&str> {
        self.raw_response.as_deref()
    }

    /// Message of the oracle error raised by the final attempt, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// `(km, minutes)` when the pair resolved.
    #[must_use]
    pub fn measured(&self) -> Option<(f64, u32)> {
        if self.success {
            self.distance_km.zip(self.duration_min)
        } else {
            None
        }
    }
}

/// Distances from one origin to each warehouse, in warehouse order.
#[derive(Debug, Clone, Serialize)]
pub struct OriginReport {
    /// The origin as the caller gave it.
    pub origin: String,
    /// The form used in queries after resolution.
    pub resolved_origin: String,
    pub results: Vec<DistanceResult>,
}

impl OriginReport {
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success()).count()
    }

    pub fn successes(&self) -> impl Iterator<Item = &DistanceResult> {
        self.results.iter().filter(|r| r.success())
    }

    /// Closest warehouse by road distance among successful results.
    #[must_use]
    pub fn nearest(&self) -> Option<&DistanceResult> {
        self.successes().min_by(|a, b| {
            let a = a.distance_km.unwrap_or(f64::INFINITY);
            let b = b.distance_km.unwrap_or(f64::INFINITY);
            a.total_cmp(&b)
        })
    }

    /// Result for the warehouse with `id`.
    #[must_use]
    pub fn to_warehouse(&self, id: &str) -> Option<&DistanceResult> {
        self.results
            .iter()
            .find(|r| r.destination.id.as_deref() == Some(id))
    }
}

/// One result per unordered warehouse pair.
#[derive(Debug, Clone, Serialize)]
pub struct PairReport {
    pub results: Vec<DistanceResult>,
}

impl PairReport {
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success()).count()
    }

    /// Looks up the pair `a`–`b` in either direction.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<&DistanceResult> {
        self.results.iter().find(|r| {
            let from = r.origin.id.as_deref();
            let to = r.destination.id.as_deref();
            (from == Some(a) && to == Some(b)) || (from == Some(b) && to == Some(a))
        })
    }

    /// Rows for the persisted distance table.
    #[must_use]
    pub fn to_stored(&self) -> Vec<StoredDistance> {
        self.results
            .iter()
            .filter_map(|r| {
                Some(StoredDistance {
                    from_id: r.origin.id.clone()?,
                    to_id: r.destination.id.clone()?,
                    distance_km: r.distance_km,
                    duration_min: r.duration_min,
                    status: if r.success {
                        DistanceStatus::Success
                    } else {
                        DistanceStatus::Failure
                    },
                    attempts: Some(r.attempts),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wh(id: &str) -> Endpoint {
        Endpoint {
            id: Some(id.to_string()),
            name: format!("仓库{id}"),
            query: "104.0,30.0".to_string(),
        }
    }

    fn origin() -> Endpoint {
        Endpoint::place("天府广场", "104.0657,30.6598")
    }

    fn failed(dest: Endpoint) -> DistanceResult {
        DistanceResult::failed(
            origin(),
            dest,
            Some(4.0),
            None,
            ExtractionStatus::Partial,
            3,
            "约4公里".to_string(),
            None,
        )
    }

    #[test]
    fn nearest_ignores_failed_results() {
        let report = OriginReport {
            origin: "天府广场".to_string(),
            resolved_origin: "104.0657,30.6598".to_string(),
            results: vec![
                DistanceResult::resolved(origin(), wh("A"), 9.5, 20, 1),
                failed(wh("B")),
                DistanceResult::resolved(origin(), wh("C"), 6.1, 18, 2),
            ],
        };
        assert_eq!(report.success_count(), 2);
        assert_eq!(
            report.nearest().unwrap().destination().id.as_deref(),
            Some("C")
        );
        assert!(report.to_warehouse("B").unwrap().measured().is_none());
    }

    #[test]
    fn failed_result_never_claims_complete() {
        let r = DistanceResult::failed(
            origin(),
            wh("A"),
            Some(1.0),
            Some(2),
            ExtractionStatus::Complete,
            1,
            "deadline exceeded".to_string(),
            Some("deadline exceeded".to_string()),
        );
        assert!(!r.success());
        assert_eq!(r.status(), ExtractionStatus::Failed);
        assert_eq!(r.raw_response(), Some("deadline exceeded"));
    }

    #[test]
    fn pair_lookup_is_symmetric() {
        let report = PairReport {
            results: vec![DistanceResult::resolved(wh("A"), wh("B"), 7.4, 21, 1)],
        };
        assert!(report.get("A", "B").is_some());
        assert!(report.get("B", "A").is_some());
        assert!(report.get("A", "C").is_none());
    }

    #[test]
    fn stored_rows_carry_status_and_attempts() {
        let mut b_to_c = failed(wh("C"));
        b_to_c.origin = wh("B");
        let report = PairReport {
            results: vec![DistanceResult::resolved(wh("A"), wh("B"), 7.4, 21, 1), b_to_c],
        };
        let rows = report.to_stored();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_usable());
        assert_eq!(rows[1].status, DistanceStatus::Failure);
        assert_eq!(rows[1].attempts, Some(3));
    }
}
