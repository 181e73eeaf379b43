//! Result filtering and ordering over a [`TravelPlan`]

use crate::catalog::{CarRental, FlightOffer, Hotel, TravelPlan};
use crate::error::{RahalahError, Result};
use std::cmp::Reverse;
use std::str::FromStr;

/// Ordering applied after filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    PriceAsc,
    PriceDesc,
    /// Hotels only; flights and cars keep their order
    RatingDesc,
    /// Flights only; hotels and cars keep their order
    DurationAsc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price-asc",
            SortOrder::PriceDesc => "price-desc",
            SortOrder::RatingDesc => "rating-desc",
            SortOrder::DurationAsc => "duration-asc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = RahalahError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "price-asc" => Ok(SortOrder::PriceAsc),
            "price-desc" => Ok(SortOrder::PriceDesc),
            "rating-desc" => Ok(SortOrder::RatingDesc),
            "duration-asc" => Ok(SortOrder::DurationAsc),
            other => Err(RahalahError::Config(format!("Unknown sort order '{}'", other))),
        }
    }
}

/// Filter over plan results
///
/// Empty fields do not filter. The price range applies to every result; star
/// and amenity sets only to hotels; the location to hotel addresses and car
/// pickup locations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultFilter {
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    /// Hotel star ratings to keep
    pub stars: Vec<u8>,
    /// Keep hotels offering at least one of these, compared case-insensitively
    pub amenities: Vec<String>,
    /// Case-insensitive substring of the location
    pub location: Option<String>,
    pub sort: Option<SortOrder>,
}

impl ResultFilter {
    /// Number of filters that would drop results
    pub fn active_count(&self) -> usize {
        let price = self.min_price.is_some_and(|min| min > 0) || self.max_price.is_some();
        let location = self.location.as_deref().is_some_and(|l| !l.trim().is_empty());

        [price, !self.stars.is_empty(), !self.amenities.is_empty(), location]
            .into_iter()
            .filter(|active| *active)
            .count()
    }

    /// Drop non-matching results from `plan`, then order what is left
    pub fn apply(&self, plan: &mut TravelPlan) {
        let before = plan.flights.len() + plan.hotels.len() + plan.cars.len();

        plan.flights.retain(|offer| self.keep_flight(offer));
        plan.hotels.retain(|hotel| self.keep_hotel(hotel));
        plan.cars.retain(|car| self.keep_car(car));

        if let Some(order) = self.sort {
            sort_plan(plan, order);
        }

        tracing::debug!(
            "Filtered plan from {} to {} results ({} active filters)",
            before,
            plan.flights.len() + plan.hotels.len() + plan.cars.len(),
            self.active_count()
        );
    }

    fn in_price_range(&self, price: u32) -> bool {
        self.min_price.map_or(true, |min| price >= min)
            && self.max_price.map_or(true, |max| price <= max)
    }

    fn keep_flight(&self, offer: &FlightOffer) -> bool {
        self.in_price_range(offer.flight.price)
    }

    fn keep_hotel(&self, hotel: &Hotel) -> bool {
        if !self.in_price_range(hotel.price) {
            return false;
        }
        if !self.stars.is_empty() && !self.stars.contains(&hotel.stars) {
            return false;
        }
        // Hotels that list no amenities are not filtered by them
        if !self.amenities.is_empty() && !hotel.amenities.is_empty() {
            let offered = hotel.amenities.iter().any(|have| {
                self.amenities
                    .iter()
                    .any(|want| want.eq_ignore_ascii_case(have))
            });
            if !offered {
                return false;
            }
        }
        match self.location_needle() {
            Some(needle) => hotel.address.to_lowercase().contains(&needle),
            None => true,
        }
    }

    fn keep_car(&self, car: &CarRental) -> bool {
        if !self.in_price_range(car.price) {
            return false;
        }
        match self.location_needle() {
            Some(needle) if !car.pickup_locations.is_empty() => car
                .pickup_locations
                .iter()
                .any(|location| location.to_lowercase().contains(&needle)),
            _ => true,
        }
    }

    fn location_needle(&self) -> Option<String> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_lowercase)
    }
}

fn sort_plan(plan: &mut TravelPlan, order: SortOrder) {
    // All sorts are stable so equal keys keep catalog order
    match order {
        SortOrder::PriceAsc => {
            plan.flights.sort_by_key(|offer| offer.flight.price);
            plan.hotels.sort_by_key(|hotel| hotel.price);
            plan.cars.sort_by_key(|car| car.price);
        }
        SortOrder::PriceDesc => {
            plan.flights.sort_by_key(|offer| Reverse(offer.flight.price));
            plan.hotels.sort_by_key(|hotel| Reverse(hotel.price));
            plan.cars.sort_by_key(|car| Reverse(car.price));
        }
        SortOrder::RatingDesc => {
            plan.hotels.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        }
        SortOrder::DurationAsc => {
            // Unparseable durations sort last
            plan.flights.sort_by_key(|offer| {
                duration_minutes(&offer.flight.duration).unwrap_or(u32::MAX)
            });
        }
    }
}

/// Minutes in a duration such as "2h 20m", "45m" or "7h"
pub fn duration_minutes(duration: &str) -> Option<u32> {
    let mut total: u32 = 0;
    let mut seen = false;

    for part in duration.split_whitespace() {
        let (digits, unit) = part.split_at(part.find(|c: char| !c.is_ascii_digit())?);
        let value: u32 = digits.parse().ok()?;
        let minutes = match unit {
            "h" => value.checked_mul(60)?,
            "m" => value,
            _ => return None,
        };
        total = total.checked_add(minutes)?;
        seen = true;
    }

    seen.then_some(total)
}
