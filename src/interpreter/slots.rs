//! Slot extractors
//!
//! Each extractor is a pure function over normalized text. A slot that is not
//! present yields `None`; extractors never fail.

use super::PlaceMention;
use crate::patterns::{CompiledLocationPattern, PatternRegistry};
use chrono::{Days, NaiveDate};

/// Origin mentioned after a "from" preposition
pub fn extract_origin(registry: &PatternRegistry, normalized: &str) -> Option<PlaceMention> {
    extract_place(registry, &registry.origin, normalized)
}

/// Destination mentioned after a "to", "towards" or "in" preposition
pub fn extract_destination(registry: &PatternRegistry, normalized: &str) -> Option<PlaceMention> {
    extract_place(registry, &registry.destination, normalized)
}

/// Run location patterns in order over every capture
///
/// The first capture that resolves through the gazetteer wins. Failing that,
/// the first capture from a `keep_unresolved` pattern is kept without a code.
fn extract_place(
    registry: &PatternRegistry,
    patterns: &[CompiledLocationPattern],
    normalized: &str,
) -> Option<PlaceMention> {
    let mut fallback: Option<PlaceMention> = None;

    for pattern in patterns {
        for caps in pattern.regex.captures_iter(normalized) {
            let Some(capture) = caps.name("place") else {
                continue;
            };
            let text = capture.as_str().trim();
            if text.is_empty() {
                continue;
            }

            if let Some((place, matched)) = registry.resolve_place(text) {
                return Some(PlaceMention {
                    text: matched,
                    code: Some(place.code.clone()),
                    city: Some(place.city.clone()),
                });
            }

            if pattern.keep_unresolved && fallback.is_none() {
                fallback = Some(PlaceMention {
                    text: text.to_string(),
                    code: None,
                    city: None,
                });
            }
        }
    }

    fallback
}

/// Apply the first matching relative-date rule to `today`
///
/// Returns the date and the rule name, or `today` and `None` when no rule fires.
pub fn extract_date(
    registry: &PatternRegistry,
    normalized: &str,
    today: NaiveDate,
) -> (NaiveDate, Option<String>) {
    let Some(rule) = registry
        .relative_dates
        .iter()
        .find(|rule| rule.is_match(normalized))
    else {
        return (today, None);
    };

    let days = Days::new(rule.offset_days.max(0) as u64);
    let date = today.checked_add_days(days).unwrap_or(today);

    (date, Some(rule.name.clone()))
}

/// Star rating of the first matching rule (5 first, then 4 and lower)
pub fn extract_stars(registry: &PatternRegistry, normalized: &str) -> Option<u8> {
    registry
        .stars
        .iter()
        .find(|rule| rule.is_match(normalized))
        .map(|rule| rule.value)
}

/// Stay duration in nights
///
/// A rule's `count` capture is parsed as a numeral or number word; captures
/// that are neither (e.g. "لمده") are skipped so later matches still apply.
pub fn extract_nights(registry: &PatternRegistry, normalized: &str) -> Option<u32> {
    for rule in &registry.nights {
        for caps in rule.regex.captures_iter(normalized) {
            let counted = caps
                .name("count")
                .and_then(|m| registry.parse_count(m.as_str()));

            match counted.or(rule.value) {
                Some(n) if n > 0 => return Some(n),
                _ => continue,
            }
        }
    }

    None
}

/// Vehicle category written after the car noun
///
/// Takes words up to the first stop word, at most `max_words` of them.
pub fn extract_car_type(registry: &PatternRegistry, normalized: &str) -> Option<String> {
    let car = &registry.car_type;

    for pattern in &car.patterns {
        for caps in pattern.captures_iter(normalized) {
            let Some(kind) = caps.name("kind") else {
                continue;
            };

            let words: Vec<&str> = kind
                .as_str()
                .split_whitespace()
                .take_while(|w| !car.stop_words.contains(*w))
                .take(car.max_words)
                .collect();

            if !words.is_empty() {
                return Some(words.join(" "));
            }
        }
    }

    None
}
