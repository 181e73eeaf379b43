//! Static travel fixtures and the planner that queries them
//!
//! Flights are indexed by route key (`DMM-RUH`), hotels and car rentals by
//! destination code. The built-in fixtures are embedded from
//! config-templates/catalog.toml; a user file may replace them.

use crate::config::{expand_path, CatalogConfig};
use crate::error::{RahalahError, Result};
use crate::interpreter::{SearchIntent, TripType};
use crate::patterns::is_valid_code;
use ahash::{HashMap, HashMapExt};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

mod filter;

pub use filter::{duration_minutes, ResultFilter, SortOrder};

const BUILTIN_CATALOG: &str = include_str!("../../config-templates/catalog.toml");

/// Scheduled flight on a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Flight {
    pub origin: String,
    pub destination: String,
    pub airline: String,
    pub flight_number: String,
    pub departure_time: String,
    /// May carry a `+1` day suffix
    pub arrival_time: String,
    pub duration: String,
    pub price: u32,
    pub currency: String,
    pub stops: u8,
    #[serde(default)]
    pub stop_airports: Vec<String>,
    pub aircraft: String,
}

/// A flight stamped with the requested departure date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    #[serde(flatten)]
    pub flight: Flight,
    pub depart_date: NaiveDate,
}

/// Hotel at a destination; price is per night
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Hotel {
    pub destination: String,
    pub name: String,
    pub stars: u8,
    pub price: u32,
    pub currency: String,
    pub address: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub rating: f32,
    pub review_count: u32,
}

/// Car rental offer at a destination; price is per day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct CarRental {
    pub destination: String,
    pub company: String,
    pub car_type: String,
    pub price: u32,
    pub currency: String,
    #[serde(default)]
    pub pickup_locations: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Catalog file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub flight: Vec<Flight>,
    #[serde(default)]
    pub hotel: Vec<Hotel>,
    #[serde(default)]
    pub car: Vec<CarRental>,
}

/// Everything the catalog holds for one intent
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelPlan {
    pub intent: SearchIntent,
    pub flights: Vec<FlightOffer>,
    pub hotels: Vec<Hotel>,
    pub cars: Vec<CarRental>,
}

impl TravelPlan {
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty() && self.hotels.is_empty() && self.cars.is_empty()
    }

    pub fn cheapest_flight(&self) -> Option<&FlightOffer> {
        self.flights.iter().min_by_key(|offer| offer.flight.price)
    }
}

/// Indexed fixture catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    flights: HashMap<String, Vec<Flight>>,
    hotels: HashMap<String, Vec<Hotel>>,
    cars: HashMap<String, Vec<CarRental>>,
}

impl Catalog {
    /// Catalog over the embedded fixtures
    pub fn builtin() -> Result<Self> {
        let file: CatalogFile = toml::from_str(BUILTIN_CATALOG)?;
        Self::from_fixtures(file)
    }

    /// Load and index a catalog file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RahalahError::Io {
            source: e,
            context: format!("Failed to read catalog file: {:?}", path),
        })?;
        let file: CatalogFile = toml::from_str(&content)?;

        Self::from_fixtures(file)
    }

    /// Catalog from configuration: the configured file, or the built-in fixtures
    pub fn load(config: &CatalogConfig) -> Result<Self> {
        match &config.catalog_path {
            Some(path) => {
                debug!("Loading catalog from {:?}", path);
                Self::from_file(&expand_path(path)?)
            }
            None => Self::builtin(),
        }
    }

    /// Validate and index parsed fixtures, keeping file order within each key
    pub fn from_fixtures(file: CatalogFile) -> Result<Self> {
        let mut flights: HashMap<String, Vec<Flight>> = HashMap::new();
        for flight in file.flight {
            check_code(&flight.origin, &flight.flight_number)?;
            check_code(&flight.destination, &flight.flight_number)?;
            if flight.origin == flight.destination {
                return Err(RahalahError::Catalog(format!(
                    "Flight {} departs and arrives at {}",
                    flight.flight_number, flight.origin
                )));
            }
            let key = route_key(&flight.origin, &flight.destination);
            flights.entry(key).or_default().push(flight);
        }

        let mut hotels: HashMap<String, Vec<Hotel>> = HashMap::new();
        for hotel in file.hotel {
            check_code(&hotel.destination, &hotel.name)?;
            if !(1..=5).contains(&hotel.stars) {
                return Err(RahalahError::Catalog(format!(
                    "Hotel '{}' has {} stars, expected 1 to 5",
                    hotel.name, hotel.stars
                )));
            }
            hotels.entry(hotel.destination.clone()).or_default().push(hotel);
        }

        let mut cars: HashMap<String, Vec<CarRental>> = HashMap::new();
        for car in file.car {
            check_code(&car.destination, &car.company)?;
            cars.entry(car.destination.clone()).or_default().push(car);
        }

        debug!(
            "Catalog indexed: {} routes, {} hotel destinations, {} car destinations",
            flights.len(),
            hotels.len(),
            cars.len()
        );

        Ok(Self {
            flights,
            hotels,
            cars,
        })
    }

    /// Flights on `origin-destination`, each stamped with `date`
    pub fn flights(&self, origin: &str, destination: &str, date: NaiveDate) -> Vec<FlightOffer> {
        self.flights
            .get(&route_key(origin, destination))
            .map(|flights| {
                flights
                    .iter()
                    .map(|flight| FlightOffer {
                        flight: flight.clone(),
                        depart_date: date,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Hotels at `destination`, keeping only `stars >= min_stars` when given
    pub fn hotels(&self, destination: &str, min_stars: Option<u8>) -> Vec<Hotel> {
        self.hotels
            .get(destination)
            .map(|hotels| {
                hotels
                    .iter()
                    .filter(|hotel| min_stars.map_or(true, |min| hotel.stars >= min))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn cars(&self, destination: &str) -> Vec<CarRental> {
        self.cars.get(destination).cloned().unwrap_or_default()
    }

    /// Route keys that have at least one flight
    pub fn routes(&self) -> Vec<&str> {
        let mut routes: Vec<&str> = self.flights.keys().map(String::as_str).collect();
        routes.sort_unstable();
        routes
    }

    /// Run the lookups an intent asks for
    ///
    /// Flights are searched unless the query is a pure hotel or car search.
    /// Hotels and cars are searched when they are the trip type or were
    /// mentioned alongside it.
    pub fn plan(&self, intent: &SearchIntent) -> TravelPlan {
        let flights = match intent.trip_type {
            TripType::Flight | TripType::Unknown => {
                self.flights(&intent.origin, &intent.destination, intent.date)
            }
            TripType::Hotel | TripType::Car => Vec::new(),
        };

        let hotels = if intent.trip_type == TripType::Hotel || intent.hotel_needed {
            self.hotels(&intent.destination, intent.stars)
        } else {
            Vec::new()
        };

        let cars = if intent.trip_type == TripType::Car || intent.car_needed {
            self.cars(&intent.destination)
        } else {
            Vec::new()
        };

        debug!(
            "Plan for {}: {} flights, {} hotels, {} cars",
            intent.route_key(),
            flights.len(),
            hotels.len(),
            cars.len()
        );

        TravelPlan {
            intent: intent.clone(),
            flights,
            hotels,
            cars,
        }
    }
}

fn route_key(origin: &str, destination: &str) -> String {
    format!("{}-{}", origin, destination)
}

fn check_code(code: &str, owner: &str) -> Result<()> {
    if is_valid_code(code) {
        Ok(())
    } else {
        Err(RahalahError::Catalog(format!(
            "Invalid code '{}' on '{}'",
            code, owner
        )))
    }
}
