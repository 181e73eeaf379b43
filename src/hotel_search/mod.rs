//! Hotel search API mapping
//!
//! Builds the query string of a Google Hotels style search endpoint from a
//! [`SearchIntent`] and normalizes that endpoint's JSON response. Requests are
//! only built here; nothing is sent.

use crate::config::HotelSearchConfig;
use crate::error::{RahalahError, Result};
use crate::interpreter::SearchIntent;
use crate::locale::Language;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Parameters of one hotel search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchRequest {
    pub base_url: String,
    pub engine: String,
    pub query: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub star_rating: Option<u8>,
    /// Display language code sent as `gl`
    pub language: String,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub amenities: Vec<String>,
}

impl HotelSearchRequest {
    /// Map an interpreted query onto request parameters
    ///
    /// Check-in is the intent date when a relative date was recognized,
    /// otherwise `check_in_offset_days` after it. The stay lasts the
    /// requested nights, or `default_nights`. Results are requested in
    /// `language`.
    pub fn from_intent(
        intent: &SearchIntent,
        config: &HotelSearchConfig,
        language: Language,
    ) -> Self {
        let query = match &intent.destination_place {
            Some(place) => match &place.city {
                Some(city) => format!("Hotels in {}", city),
                None => place.text.clone(),
            },
            None => "hotels".to_string(),
        };

        let check_in = if intent.date_keyword.is_some() {
            intent.date
        } else {
            add_days(intent.date, config.check_in_offset_days)
        };
        let nights = intent.nights.unwrap_or(config.default_nights).max(1);
        let check_out = add_days(check_in, nights);

        Self {
            base_url: config.base_url.clone(),
            engine: config.engine.clone(),
            query,
            check_in,
            check_out,
            adults: config.adults,
            star_rating: intent.stars,
            language: language.code().to_string(),
            min_price: None,
            max_price: None,
            amenities: Vec::new(),
        }
    }

    pub fn with_price_range(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn with_amenities(mut self, amenities: Vec<String>) -> Self {
        self.amenities = amenities;
        self
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Query string pairs in request order, without the API key
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("engine", self.engine.clone()),
            ("q", self.query.clone()),
            ("check_in", self.check_in.format("%Y-%m-%d").to_string()),
            ("check_out", self.check_out.format("%Y-%m-%d").to_string()),
            ("adults", self.adults.to_string()),
        ];

        if let Some(stars) = self.star_rating {
            pairs.push(("star_rating", stars.to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("min_price", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("max_price", max.to_string()));
        }
        if !self.amenities.is_empty() {
            pairs.push(("amenities", self.amenities.join(",")));
        }
        pairs.push(("gl", self.language.clone()));

        pairs
    }

    /// Encoded request URL; `api_key` is appended after `engine` when given
    pub fn url(&self, api_key: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in self.query_pairs() {
                query.append_pair(name, &value);
                if name == "engine" {
                    if let Some(key) = api_key {
                        query.append_pair("api_key", key);
                    }
                }
            }
        }
        Ok(url)
    }
}

fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(date)
}

/// One hotel from an API response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelResult {
    pub id: String,
    pub name: String,
    pub address: String,
    pub rating: f64,
    pub review_count: u64,
    pub price: Option<u64>,
    pub thumbnail: String,
    pub amenities: Vec<String>,
    pub stars: Option<u8>,
    pub url: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Normalized hotel search response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelResults {
    pub hotels: Vec<HotelResult>,
    pub total_results: u64,
    pub currency: String,
}

impl HotelResults {
    /// Normalize a raw API response
    ///
    /// Fails only when `hotel_results` is missing or not an array; every
    /// per-hotel field falls back to an empty value.
    pub fn from_response(response: &Value) -> Result<Self> {
        let raw_hotels = response
            .get("hotel_results")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                RahalahError::InvalidResponse("expected a 'hotel_results' array".to_string())
            })?;

        let hotels: Vec<HotelResult> = raw_hotels
            .iter()
            .enumerate()
            .map(|(idx, hotel)| normalize_hotel(idx, hotel))
            .collect();

        let info = response.get("search_information");
        let total_results = info
            .and_then(|i| i.get("total_results"))
            .and_then(Value::as_u64)
            .filter(|&n| n > 0)
            .unwrap_or(hotels.len() as u64);
        let currency = info
            .and_then(|i| i.get("currency"))
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .unwrap_or("USD")
            .to_string();

        tracing::debug!("Normalized {} hotels ({} total)", hotels.len(), total_results);

        Ok(Self {
            hotels,
            total_results,
            currency,
        })
    }

    /// Parse and normalize a response body
    pub fn from_json_str(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body).map_err(|e| RahalahError::Json {
            source: e,
            context: "Failed to parse hotel search response".to_string(),
        })?;
        Self::from_response(&value)
    }

    pub fn cheapest(&self) -> Option<&HotelResult> {
        self.hotels
            .iter()
            .filter(|h| h.price.is_some())
            .min_by_key(|h| h.price)
    }
}

fn normalize_hotel(idx: usize, hotel: &Value) -> HotelResult {
    let text = |key: &str| {
        hotel
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let id = match hotel.get("hotel_id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("hotel-{}", idx + 1),
    };

    let name = Some(text("name"))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown Hotel".to_string());

    let amenities = hotel
        .get("amenities")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let gps = hotel.get("gps_coordinates");
    let coordinate = |key: &str| {
        hotel
            .get(key)
            .and_then(Value::as_f64)
            .or_else(|| gps.and_then(|g| g.get(key)).and_then(Value::as_f64))
    };

    HotelResult {
        id,
        name,
        address: text("address"),
        rating: hotel.get("rating").and_then(number_or_numeric_str).unwrap_or(0.0),
        review_count: hotel.get("reviews").and_then(Value::as_u64).unwrap_or(0),
        price: hotel.get("price").and_then(extract_price),
        thumbnail: text("thumbnail"),
        amenities,
        stars: extract_stars(hotel),
        url: text("link"),
        latitude: coordinate("latitude"),
        longitude: coordinate("longitude"),
    }
}

fn number_or_numeric_str(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First run of digits in a price such as "$120" or "120 SAR"
fn extract_price(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Value::String(s) => first_digit_run(s).and_then(|d| d.parse().ok()),
        _ => None,
    }
}

/// Explicit `stars`, else `N-star` inside `class`
fn extract_stars(hotel: &Value) -> Option<u8> {
    if let Some(stars) = hotel.get("stars") {
        let parsed = match stars {
            Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
            Value::String(s) => first_digit_run(s).and_then(|d| d.parse().ok()),
            _ => None,
        };
        if parsed.is_some() {
            return parsed;
        }
    }

    let class = hotel.get("class").and_then(Value::as_str)?.to_ascii_lowercase();
    let marker = class.find("-star")?;
    let digits: String = class[..marker]
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    digits.parse().ok()
}

fn first_digit_run(s: &str) -> Option<&str> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Interpreter;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request_for(query: &str) -> HotelSearchRequest {
        let intent = Interpreter::builtin()
            .unwrap()
            .interpret_on(query, day(2025, 5, 1));
        HotelSearchRequest::from_intent(&intent, &HotelSearchConfig::default(), Language::Ar)
    }

    #[test]
    fn test_request_defaults_to_next_week() {
        let request = request_for("فندق في بانكوك");

        assert_eq!(request.query, "Hotels in Bangkok");
        assert_eq!(request.check_in, day(2025, 5, 8));
        assert_eq!(request.check_out, day(2025, 5, 11));
        assert_eq!(request.nights(), 3);
        assert_eq!(request.adults, 2);
        assert_eq!(request.star_rating, None);
    }

    #[test]
    fn test_request_uses_date_keyword_and_nights() {
        let request = request_for("فندق 4 نجوم في دبي غدا لمدة 5 ليالي");

        assert_eq!(request.query, "Hotels in Dubai");
        assert_eq!(request.check_in, day(2025, 5, 2));
        assert_eq!(request.check_out, day(2025, 5, 7));
        assert_eq!(request.star_rating, Some(4));
    }

    #[test]
    fn test_request_query_fallbacks() {
        assert_eq!(request_for("فندق في ابها").query, "ابها");
        assert_eq!(request_for("فندق رخيص").query, "hotels");
    }

    #[test]
    fn test_query_pairs_order() {
        let request = request_for("فندق خمس نجوم في بانكوك");
        let names: Vec<&str> = request.query_pairs().iter().map(|(n, _)| *n).collect();

        assert_eq!(
            names,
            vec!["engine", "q", "check_in", "check_out", "adults", "star_rating", "gl"]
        );
    }

    #[test]
    fn test_url_encoding_and_api_key() {
        let request = request_for("فندق في بانكوك")
            .with_price_range(Some(100), None)
            .with_amenities(vec!["Pool".to_string(), "Spa".to_string()]);
        let url = request.url(Some("secret")).unwrap();

        assert_eq!(url.host_str(), Some("www.searchapi.io"));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[0], ("engine".to_string(), "google_hotels".to_string()));
        assert_eq!(pairs[1], ("api_key".to_string(), "secret".to_string()));
        assert!(pairs.contains(&("q".to_string(), "Hotels in Bangkok".to_string())));
        assert!(pairs.contains(&("min_price".to_string(), "100".to_string())));
        assert!(pairs.contains(&("amenities".to_string(), "Pool,Spa".to_string())));

        let without_key = request.url(None).unwrap();
        assert!(!without_key.as_str().contains("api_key"));
    }

    #[test]
    fn test_from_response() {
        let response = json!({
            "search_information": { "total_results": 120, "currency": "SAR" },
            "hotel_results": [
                {
                    "hotel_id": "abc",
                    "name": "Marriott Dammam",
                    "address": "King Saud St",
                    "rating": "4.5",
                    "reviews": 812,
                    "price": "SAR 650 per night",
                    "amenities": ["Pool", "Free WiFi"],
                    "class": "5-star hotel",
                    "link": "https://example.com/h/abc",
                    "gps_coordinates": { "latitude": 26.43, "longitude": 50.1 }
                },
                { "price": "$120", "stars": 3 }
            ]
        });

        let results = HotelResults::from_response(&response).unwrap();
        assert_eq!(results.total_results, 120);
        assert_eq!(results.currency, "SAR");
        assert_eq!(results.hotels.len(), 2);

        let first = &results.hotels[0];
        assert_eq!(first.id, "abc");
        assert_eq!(first.rating, 4.5);
        assert_eq!(first.review_count, 812);
        assert_eq!(first.price, Some(650));
        assert_eq!(first.stars, Some(5));
        assert_eq!(first.latitude, Some(26.43));

        let second = &results.hotels[1];
        assert_eq!(second.id, "hotel-2");
        assert_eq!(second.name, "Unknown Hotel");
        assert_eq!(second.price, Some(120));
        assert_eq!(second.stars, Some(3));
        assert_eq!(second.rating, 0.0);
        assert!(second.amenities.is_empty());

        assert_eq!(results.cheapest().map(|h| h.id.as_str()), Some("hotel-2"));
    }

    #[test]
    fn test_from_response_defaults() {
        let results = HotelResults::from_response(&json!({ "hotel_results": [{}] })).unwrap();
        assert_eq!(results.currency, "USD");
        assert_eq!(results.total_results, 1);
        assert_eq!(results.hotels[0].price, None);
        assert_eq!(results.hotels[0].stars, None);
    }

    #[test]
    fn test_from_response_rejects_bad_shape() {
        assert!(matches!(
            HotelResults::from_response(&json!({ "properties": [] })),
            Err(RahalahError::InvalidResponse(_))
        ));
        assert!(HotelResults::from_response(&json!({ "hotel_results": "none" })).is_err());
        assert!(HotelResults::from_json_str("not json").is_err());
    }

    #[test]
    fn test_first_digit_run() {
        assert_eq!(first_digit_run("$120"), Some("120"));
        assert_eq!(first_digit_run("1,200 SAR"), Some("1"));
        assert_eq!(first_digit_run("free"), None);
    }
}
