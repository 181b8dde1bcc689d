//! Places named by free text or by a longitude/latitude pair.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Strict `<lon>,<lat>` form: optional sign, optional decimals, whitespace
/// allowed around the comma and at both ends.
static STRICT_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?[0-9]+\.?[0-9]*)\s*,\s*(-?[0-9]+\.?[0-9]*)\s*$")
        .expect("valid coordinate pair regex")
});

/// A longitude/latitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Parses the strict `<lon>,<lat>` form. Anything else returns `None`.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let caps = STRICT_PAIR.captures(input)?;
        let longitude = caps[1].parse::<f64>().ok()?;
        let latitude = caps[2].parse::<f64>().ok()?;
        Some(Self::new(longitude, latitude))
    }

    /// Returns `true` when `input` is already in coordinate form and needs no
    /// geocoding.
    #[must_use]
    pub fn is_coordinate_form(input: &str) -> bool {
        STRICT_PAIR.is_match(input)
    }

    /// Longitude within `[-180, 180]` and latitude within `[-90, 90]`.
    #[must_use]
    pub fn in_range(&self) -> bool {
        (-180.0..=180.0).contains(&self.longitude) && (-90.0..=90.0).contains(&self.latitude)
    }

    /// Query form handed to the map oracle: `"<lon>,<lat>"`.
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.longitude, self.latitude)
    }
}

/// A place the caller wants distances from.
///
/// Once a name has been resolved to coordinates the coordinate form is the
/// one used for every later query.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Named(String),
    Coordinates(Coordinates),
}

impl Location {
    /// Classifies raw user input: coordinate-shaped text becomes
    /// [`Location::Coordinates`], everything else stays a name.
    #[must_use]
    pub fn from_input(input: &str) -> Self {
        match Coordinates::parse(input) {
            Some(coords) => Self::Coordinates(coords),
            None => Self::Named(input.trim().to_string()),
        }
    }

    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Self::Coordinates(c) => Some(*c),
            Self::Named(_) => None,
        }
    }

    /// Text used when this location appears in an oracle query.
    #[must_use]
    pub fn query_form(&self) -> String {
        match self {
            Self::Named(name) => name.clone(),
            Self::Coordinates(c) => c.to_query(),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Coordinates(c) => write!(f, "{c}"),
        }
    }
}
