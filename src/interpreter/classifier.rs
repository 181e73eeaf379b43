//! Trip type classification over normalized text

use super::TripType;
use crate::patterns::PatternRegistry;

/// Pick the trip type of the first intent rule that matches
///
/// Rules are already in priority order, so a query that mentions both a
/// flight and a hotel classifies as a flight.
pub fn classify(registry: &PatternRegistry, normalized: &str) -> TripType {
    registry
        .intents
        .iter()
        .find(|rule| rule.is_match(normalized))
        .map(|rule| rule.trip_type)
        .unwrap_or(TripType::Unknown)
}

/// Whether any trigger for `trip_type` appears anywhere in the text
pub fn mentions(registry: &PatternRegistry, normalized: &str, trip_type: TripType) -> bool {
    registry
        .intents
        .iter()
        .filter(|rule| rule.trip_type == trip_type)
        .any(|rule| rule.is_match(normalized))
}
