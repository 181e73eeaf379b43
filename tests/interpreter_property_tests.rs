//! Property-based tests for normalization and interpretation

use chrono::NaiveDate;
use proptest::prelude::*;
use rahalah::interpreter::{normalize, Interpreter};
use std::sync::OnceLock;

const WORDS: &[&str] = &[
    "رحلة", "رحلـة", "طيران", "حجز", "فندق", "سيارة", "استئجار", "من", "إلى", "الى", "في",
    "مع", "لمدة", "الرياض", "للرياض", "جدة", "لجدة", "الدمام", "دبي", "بانكوك", "المدينة",
    "المنورة", "القاهرة", "أبها", "غدا", "غداً", "بعد", "غد", "الأسبوع", "القادم", "صباحا",
    "خمس", "أربع", "نجوم", "ثلاث", "ليالي", "0", "٣", "flight", "from", "to", "hotel",
];

fn interpreter() -> &'static Interpreter {
    static INTERPRETER: OnceLock<Interpreter> = OnceLock::new();
    INTERPRETER.get_or_init(|| Interpreter::builtin().unwrap())
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

/// Arabic block code points mixed with spaces
fn arabic_text() -> impl Strategy<Value = String> {
    "[\u{0600}-\u{06FF} \t]{0,40}"
}

/// Queries assembled from vocabulary words in any order
fn vocabulary_query() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 0..12).prop_map(|words| words.join(" "))
}

fn query() -> impl Strategy<Value = String> {
    prop_oneof![any::<String>(), arabic_text(), vocabulary_query()]
}

proptest! {
    #[test]
    fn prop_normalize_is_idempotent(text in prop_oneof![any::<String>(), arabic_text()]) {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once.clone());
    }

    #[test]
    fn prop_normalized_text_is_canonical(text in prop_oneof![any::<String>(), arabic_text()]) {
        let normalized = normalize(&text);

        prop_assert_eq!(normalized.trim(), normalized.as_str());
        prop_assert!(!normalized.contains("  "));
        prop_assert!(!normalized.contains('\u{0640}'), "normalized text contains tatweel");
        prop_assert!(!normalized.chars().any(|c| ('\u{064B}'..='\u{065F}').contains(&c)), "normalized text contains harakat");
        prop_assert!(!normalized.chars().any(|c| matches!(c, 'أ' | 'إ' | 'آ' | 'ة' | 'ى')));
    }

    #[test]
    fn prop_interpretation_is_total(text in query()) {
        let intent = interpreter().interpret_on(&text, today());

        prop_assert!(!intent.origin.is_empty());
        prop_assert!(!intent.destination.is_empty());
        prop_assert!(intent.date >= today());
    }

    #[test]
    fn prop_origin_differs_from_destination(text in query()) {
        let intent = interpreter().interpret_on(&text, today());
        prop_assert_ne!(intent.origin, intent.destination);
    }

    #[test]
    fn prop_counts_stay_in_range(text in vocabulary_query()) {
        let intent = interpreter().interpret_on(&text, today());

        if let Some(stars) = intent.stars {
            prop_assert!((1..=5).contains(&stars));
        }
        prop_assert_ne!(intent.nights, Some(0));
    }
}
