//! Search intent types produced by the interpreter

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which search domain a query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    Flight,
    Hotel,
    Car,
    /// No trigger matched
    Unknown,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::Flight => "flight",
            TripType::Hotel => "hotel",
            TripType::Car => "car",
            TripType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A place as it was written in the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceMention {
    /// Text captured from the normalized query
    pub text: String,
    /// Airport/city code when the text is in the gazetteer
    pub code: Option<String>,
    /// English city name when the text is in the gazetteer
    pub city: Option<String>,
}

impl PlaceMention {
    pub fn is_resolved(&self) -> bool {
        self.code.is_some()
    }
}

/// Structured search parameters extracted from one free-text query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIntent {
    #[serde(rename = "type")]
    pub trip_type: TripType,

    /// Departure code, defaulted when the query names no known origin
    pub origin: String,

    /// Arrival or stay code, defaulted when the query names no known destination
    pub destination: String,

    pub origin_place: Option<PlaceMention>,
    pub destination_place: Option<PlaceMention>,

    /// Travel or check-in date
    pub date: NaiveDate,

    /// Name of the relative-date rule that set `date`, if any
    pub date_keyword: Option<String>,

    pub nights: Option<u32>,

    /// Requested minimum star rating; `None` means no filter
    pub stars: Option<u8>,

    pub car_type: Option<String>,

    pub hotel_needed: bool,
    pub car_needed: bool,
}

impl SearchIntent {
    /// Route key used by the fixture catalog, e.g. `DMM-RUH`
    pub fn route_key(&self) -> String {
        format!("{}-{}", self.origin, self.destination)
    }

    /// Whether the query ended up with no recognized trip type
    pub fn is_unrecognized(&self) -> bool {
        self.trip_type == TripType::Unknown
    }
}
