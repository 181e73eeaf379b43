//! Query interpreter
//!
//! Maps one free-text travel query to a [`SearchIntent`]:
//! normalize, classify, extract the applicable slots, then apply the default
//! and collision rules. Interpretation never fails; a query with no trigger
//! comes back as `TripType::Unknown` with default locations.

mod classifier;
mod intent;
mod normalizer;
mod slots;

pub use classifier::{classify, mentions};
pub use intent::{PlaceMention, SearchIntent, TripType};
pub use normalizer::normalize;
pub use slots::{
    extract_car_type, extract_date, extract_destination, extract_nights, extract_origin,
    extract_stars,
};

use crate::config::{expand_path, Config, InterpreterConfig};
use crate::error::Result;
use crate::patterns::PatternRegistry;
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Codes used when a location is missing or collides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionPolicy {
    pub default_origin: String,
    pub default_destination: String,
    /// Destination forced on collision
    pub collision_fallback: String,
    /// Destination forced on collision when the origin is `collision_fallback`
    pub collision_alternate: String,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            default_origin: "DMM".to_string(),
            default_destination: "JED".to_string(),
            collision_fallback: "JED".to_string(),
            collision_alternate: "RUH".to_string(),
        }
    }
}

impl From<&InterpreterConfig> for ResolutionPolicy {
    fn from(config: &InterpreterConfig) -> Self {
        Self {
            default_origin: config.default_origin.clone(),
            default_destination: config.default_destination.clone(),
            collision_fallback: config.collision_fallback.clone(),
            collision_alternate: config.collision_alternate.clone(),
        }
    }
}

impl ResolutionPolicy {
    /// Fill in missing codes and force origin and destination apart
    pub fn resolve(&self, origin: Option<&str>, destination: Option<&str>) -> (String, String) {
        let origin = origin.unwrap_or(&self.default_origin).to_string();
        let mut destination = destination.unwrap_or(&self.default_destination).to_string();

        if origin == destination {
            let forced = if origin == self.collision_fallback {
                &self.collision_alternate
            } else {
                &self.collision_fallback
            };
            warn!(
                "Origin and destination both resolved to {}, using {} as destination",
                origin, forced
            );
            destination = forced.clone();
        }

        (origin, destination)
    }
}

/// Rule-based interpreter over a compiled vocabulary
///
/// Immutable after construction; share it across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Interpreter {
    registry: PatternRegistry,
    policy: ResolutionPolicy,
}

impl Interpreter {
    pub fn new(registry: PatternRegistry, policy: ResolutionPolicy) -> Self {
        Self { registry, policy }
    }

    /// Interpreter over the embedded vocabulary with the default policy
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(PatternRegistry::builtin()?, ResolutionPolicy::default()))
    }

    /// Build from configuration, loading a user vocabulary when one is set
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = match &config.interpreter.vocabulary_path {
            Some(path) => {
                debug!("Loading vocabulary from {:?}", path);
                PatternRegistry::from_file(&expand_path(path)?)?
            }
            None => PatternRegistry::builtin()?,
        };

        Ok(Self::new(registry, ResolutionPolicy::from(&config.interpreter)))
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &ResolutionPolicy {
        &self.policy
    }

    /// Interpret a query relative to the local calendar date
    pub fn interpret(&self, query: &str) -> SearchIntent {
        self.interpret_on(query, chrono::Local::now().date_naive())
    }

    /// Interpret a query relative to an explicit reference date
    pub fn interpret_on(&self, query: &str, today: NaiveDate) -> SearchIntent {
        let text = normalize(query);
        let registry = &self.registry;

        let trip_type = classify(registry, &text);
        let hotel_needed = mentions(registry, &text, TripType::Hotel);
        let car_needed = mentions(registry, &text, TripType::Car);
        debug!(
            "Classified {:?} as {} (hotel_needed={}, car_needed={})",
            text, trip_type, hotel_needed, car_needed
        );

        let origin_place = extract_origin(registry, &text);
        let destination_place = extract_destination(registry, &text);

        let (origin, destination) = self.policy.resolve(
            origin_place.as_ref().and_then(|p| p.code.as_deref()),
            destination_place.as_ref().and_then(|p| p.code.as_deref()),
        );

        let (date, date_keyword) = extract_date(registry, &text, today);

        let wants_hotel = trip_type == TripType::Hotel || hotel_needed;
        let wants_car = trip_type == TripType::Car || car_needed;

        let (stars, nights) = if wants_hotel {
            (extract_stars(registry, &text), extract_nights(registry, &text))
        } else {
            (None, None)
        };

        let car_type = if wants_car {
            extract_car_type(registry, &text)
        } else {
            None
        };

        debug!(
            "Slots: {}-{} date={} keyword={:?} stars={:?} nights={:?} car_type={:?}",
            origin, destination, date, date_keyword, stars, nights, car_type
        );

        SearchIntent {
            trip_type,
            origin,
            destination,
            origin_place,
            destination_place,
            date,
            date_keyword,
            nights,
            stars,
            car_type,
            hotel_needed,
            car_needed,
        }
    }
}
