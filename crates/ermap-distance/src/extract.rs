//! Distance and duration extraction from free-text oracle replies.
//!
//! Replies come back as prose such as "驾车距离约12.5公里，预计需要25分钟".
//! Each quantity is read by an ordered list of rules; the first rule that
//! matches wins, so more specific (prefixed) forms are listed before bare
//! ones. A rule pairs a pattern with the unit its capture is expressed in,
//! and the unit knows how to normalise to kilometres or minutes.

use regex::{Captures, Regex};
use serde::Serialize;

/// Unit of a rule's capture.
trait Unit: Copy {
    /// A match directly followed by this text is skipped.
    fn reject_suffix(self) -> Option<&'static str> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DistanceUnit {
    Kilometers,
    Meters,
    /// Bare `m`, which must not be the start of "min".
    MetersAbbrev,
}

impl DistanceUnit {
    fn to_km(self, caps: &Captures<'_>) -> Option<f64> {
        let value = caps[1].parse::<f64>().ok()?;
        Some(match self {
            DistanceUnit::Kilometers => value,
            DistanceUnit::Meters | DistanceUnit::MetersAbbrev => {
                (value / 1000.0 * 100.0).round() / 100.0
            }
        })
    }
}

impl Unit for DistanceUnit {
    fn reject_suffix(self) -> Option<&'static str> {
        (self == DistanceUnit::MetersAbbrev).then_some("in")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DurationUnit {
    Minutes,
    Seconds,
    Hours,
    /// Two captures: hours, then minutes.
    HoursMinutes,
}

impl Unit for DurationUnit {}

impl DurationUnit {
    /// Every capture may carry a decimal part ("12.5分钟", "1.5小时"); the
    /// total is rounded to whole minutes, ties to even.
    fn to_minutes(self, caps: &Captures<'_>) -> Option<u32> {
        let value = caps[1].parse::<f64>().ok()?;
        let minutes = match self {
            DurationUnit::Minutes => value,
            DurationUnit::Seconds => value / 60.0,
            DurationUnit::Hours => value * 60.0,
            DurationUnit::HoursMinutes => value * 60.0 + caps[2].parse::<f64>().ok()?,
        };
        whole_minutes(minutes)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_minutes(minutes: f64) -> Option<u32> {
    let minutes = minutes.round_ties_even();
    (minutes.is_finite() && (0.0..=f64::from(u32::MAX)).contains(&minutes))
        .then_some(minutes as u32)
}

const DISTANCE_RULES: &[(&str, DistanceUnit)] = &[
    (
        r"距离[：:为是]?\s*([0-9]+(?:\.[0-9]+)?)\s*(?:公里|千米)",
        DistanceUnit::Kilometers,
    ),
    (
        r"距离[：:为是]?\s*([0-9]+(?:\.[0-9]+)?)\s*(?i:km)",
        DistanceUnit::Kilometers,
    ),
    (
        r"距离[：:为是]?\s*([0-9]+(?:\.[0-9]+)?)\s*米",
        DistanceUnit::Meters,
    ),
    // `约` also covers `大约`.
    (
        r"约\s*([0-9]+(?:\.[0-9]+)?)\s*(?:公里|千米)",
        DistanceUnit::Kilometers,
    ),
    (r"约\s*([0-9]+(?:\.[0-9]+)?)\s*米", DistanceUnit::Meters),
    (
        r"([0-9]+(?:\.[0-9]+)?)\s*(?:公里|千米)",
        DistanceUnit::Kilometers,
    ),
    (r"([0-9]+(?:\.[0-9]+)?)\s*(?i:km)", DistanceUnit::Kilometers),
    (r"([0-9]+(?:\.[0-9]+)?)\s*米", DistanceUnit::Meters),
    (r"([0-9]+(?:\.[0-9]+)?)\s*m", DistanceUnit::MetersAbbrev),
];

const DURATION_RULES: &[(&str, DurationUnit)] = &[
    (
        r"([0-9]+(?:\.[0-9]+)?)\s*小时\s*([0-9]+(?:\.[0-9]+)?)\s*分钟?",
        DurationUnit::HoursMinutes,
    ),
    (
        r"(?:时间|需要|耗时|用时|约)[：:为是]?\s*([0-9]+(?:\.[0-9]+)?)\s*分钟",
        DurationUnit::Minutes,
    ),
    (
        r"(?:时间|需要|耗时|用时|约)[：:为是]?\s*([0-9]+(?:\.[0-9]+)?)\s*秒",
        DurationUnit::Seconds,
    ),
    (r"([0-9]+(?:\.[0-9]+)?)\s*分钟", DurationUnit::Minutes),
    (r"([0-9]+(?:\.[0-9]+)?)\s*小时", DurationUnit::Hours),
    (r"([0-9]+(?:\.[0-9]+)?)\s*秒", DurationUnit::Seconds),
];

/// Last-resort duration scan: a number followed by any time-unit token.
const DURATION_FALLBACK: &str =
    r"(?i)([0-9]+(?:\.[0-9]+)?) ?(分钟|小时|秒|minutes?|mins?|hours?|hrs?|h|seconds?|secs?|s)";

struct Rule<U> {
    pattern: Regex,
    unit: U,
}

impl<U: Unit> Rule<U> {
    fn compile(table: &[(&str, U)]) -> Vec<Self> {
        table
            .iter()
            .map(|&(pattern, unit)| Rule {
                pattern: Regex::new(pattern).expect("valid extraction rule regex"),
                unit,
            })
            .collect()
    }

    fn first_match<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        let suffix = self.unit.reject_suffix();
        self.pattern.captures_iter(text).find(|caps| match suffix {
            Some(suffix) => {
                let end = caps.get(0).map_or(0, |m| m.end());
                !text[end..].starts_with(suffix)
            }
            None => true,
        })
    }
}

/// How much of a reply could be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    /// Distance and duration both found.
    Complete,
    /// Distance found, duration missing. Shown to users but never usable.
    Partial,
    Failed,
}

impl ExtractionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionStatus::Complete => "complete",
            ExtractionStatus::Partial => "partial",
            ExtractionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What [`DistanceExtractor::extract`] could read from one reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub distance_km: Option<f64>,
    pub duration_min: Option<u32>,
    pub status: ExtractionStatus,
    /// The reply verbatim, kept whenever extraction was not complete.
    pub raw_response: Option<String>,
    /// Distance rules evaluated before a match (all of them on a miss).
    pub distance_patterns_tried: usize,
    /// Duration rules evaluated before a match, fallback included.
    pub duration_patterns_tried: usize,
}

impl Extraction {
    /// Usable for planning: both distance and duration were found.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ExtractionStatus::Complete
    }
}

/// Reads distance (km) and duration (minutes) out of free text.
pub struct DistanceExtractor {
    distance_rules: Vec<Rule<DistanceUnit>>,
    duration_rules: Vec<Rule<DurationUnit>>,
    duration_fallback: Regex,
}

impl Default for DistanceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DistanceExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            distance_rules: Rule::compile(DISTANCE_RULES),
            duration_rules: Rule::compile(DURATION_RULES),
            duration_fallback: Regex::new(DURATION_FALLBACK)
                .expect("valid duration fallback regex"),
        }
    }

    /// Extracts the first distance and the first duration found in `text`.
    ///
    /// Meters are converted to kilometres rounded to two decimals; seconds
    /// and hours are converted to whole minutes, halves going to the even
    /// minute. Never fails: an unreadable
    /// reply yields [`ExtractionStatus::Failed`] with the text preserved.
    #[must_use]
    pub fn extract(&self, text: &str) -> Extraction {
        let (distance_km, distance_patterns_tried) = self.find_distance(text);
        let (duration_min, duration_patterns_tried) = self.find_duration(text);

        let status = match (distance_km, duration_min) {
            (Some(_), Some(_)) => ExtractionStatus::Complete,
            (Some(_), None) => ExtractionStatus::Partial,
            (None, _) => ExtractionStatus::Failed,
        };

        Extraction {
            distance_km,
            duration_min,
            status,
            raw_response: (status != ExtractionStatus::Complete).then(|| text.to_string()),
            distance_patterns_tried,
            duration_patterns_tried,
        }
    }

    fn find_distance(&self, text: &str) -> (Option<f64>, usize) {
        for (index, rule) in self.distance_rules.iter().enumerate() {
            if let Some(km) = rule.first_match(text).and_then(|caps| rule.unit.to_km(&caps)) {
                return (Some(km), index + 1);
            }
        }
        (None, self.distance_rules.len())
    }

    fn find_duration(&self, text: &str) -> (Option<u32>, usize) {
        for (index, rule) in self.duration_rules.iter().enumerate() {
            if let Some(minutes) = rule
                .first_match(text)
                .and_then(|caps| rule.unit.to_minutes(&caps))
            {
                return (Some(minutes), index + 1);
            }
        }
        (self.fallback_duration(text), self.duration_rules.len() + 1)
    }

    fn fallback_duration(&self, text: &str) -> Option<u32> {
        self.duration_fallback
            .captures_iter(text)
            .filter(|caps| {
                let end = caps.get(0).map_or(0, |m| m.end());
                !text[end..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic())
            })
            .find_map(|caps| {
                let token = caps[2].to_lowercase();
                let unit = if token.starts_with('秒') || token.starts_with('s') {
                    DurationUnit::Seconds
                } else if token.starts_with('小') || token.starts_with('h') {
                    DurationUnit::Hours
                } else {
                    DurationUnit::Minutes
                };
                unit.to_minutes(&caps)
            })
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
