//! Integration tests for query interpretation through the public API

use chrono::NaiveDate;
use rahalah::interpreter::{normalize, Interpreter, ResolutionPolicy, TripType};
use rahalah::patterns::{PatternRegistry, VocabularyConfig};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_documented_queries() {
    let interpreter = Interpreter::builtin().unwrap();
    let today = day(2025, 11, 20);

    let flight = interpreter.interpret_on("رحلة من الدمام الى الرياض غدا", today);
    assert_eq!(flight.trip_type, TripType::Flight);
    assert_eq!((flight.origin.as_str(), flight.destination.as_str()), ("DMM", "RUH"));
    assert_eq!(flight.date, day(2025, 11, 21));

    let hotel = interpreter.interpret_on("فندق خمس نجوم في بانكوك لمدة ثلاث ليالي", today);
    assert_eq!(hotel.trip_type, TripType::Hotel);
    assert_eq!(hotel.destination, "BKK");
    assert_eq!(hotel.stars, Some(5));
    assert_eq!(hotel.nights, Some(3));

    let car = interpreter.interpret_on("استئجار سيارة في بانكوك الأسبوع القادم", today);
    assert_eq!(car.trip_type, TripType::Car);
    assert_eq!(car.destination, "BKK");
    assert_eq!(car.date, day(2025, 11, 27));

    let empty = interpreter.interpret_on("", today);
    assert_eq!(empty.trip_type, TripType::Unknown);
    assert_eq!((empty.origin.as_str(), empty.destination.as_str()), ("DMM", "JED"));
    assert_eq!(empty.date, today);
}

#[test]
fn test_diacritics_and_spelling_variants_agree() {
    let interpreter = Interpreter::builtin().unwrap();
    let today = day(2025, 11, 20);

    let plain = interpreter.interpret_on("رحلة من الدمام الى جدة غدا", today);
    let marked = interpreter.interpret_on("رِحْلَة  مِنَ الدَّمَّام إلى جدّه غداً", today);

    assert_eq!(plain.trip_type, marked.trip_type);
    assert_eq!(plain.origin, marked.origin);
    assert_eq!(plain.destination, marked.destination);
    assert_eq!(plain.date, marked.date);
}

#[test]
fn test_intent_json_shape() {
    let interpreter = Interpreter::builtin().unwrap();
    let intent = interpreter.interpret_on("رحلة من الرياض إلى جدة مع فندق", day(2025, 1, 5));
    let json = serde_json::to_value(&intent).unwrap();

    assert_eq!(json["type"], "flight");
    assert_eq!(json["origin"], "RUH");
    assert_eq!(json["destination"], "JED");
    assert_eq!(json["date"], "2025-01-05");
    assert_eq!(json["dateKeyword"], serde_json::Value::Null);
    assert_eq!(json["hotelNeeded"], true);
    assert_eq!(json["originPlace"]["city"], "Riyadh");
}

#[test]
fn test_never_panics_on_odd_input() {
    let interpreter = Interpreter::builtin().unwrap();
    let today = day(2025, 1, 5);
    let inputs = [
        "\u{064B}\u{064C}\u{064D}",
        "من",
        "إلى",
        "في في في",
        "٩٩٩٩٩٩٩٩٩٩٩٩ ليالي فندق",
        "فندق 0 ليالي",
        "🙂 رحلة 🙂",
        "سيارة سيارة سيارة",
        "\n\t\r",
    ];

    for input in inputs {
        let intent = interpreter.interpret_on(input, today);
        assert_ne!(intent.origin, intent.destination, "input {:?}", input);
        assert!(intent.stars.map_or(true, |s| (1..=5).contains(&s)));
        assert_ne!(intent.nights, Some(0));
    }
}

#[test]
fn test_interpreter_shared_across_threads() {
    let interpreter = Arc::new(Interpreter::builtin().unwrap());
    let today = day(2025, 1, 5);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let interp = Arc::clone(&interpreter);
            thread::spawn(move || interp.interpret_on("فندق في دبي لمدة ليلتين", today))
        })
        .collect();

    for handle in handles {
        let intent = handle.join().unwrap();
        assert_eq!(intent.destination, "DXB");
        assert_eq!(intent.nights, Some(2));
    }
}

#[test]
fn test_custom_vocabulary_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("vocabulary.toml");

    // Extend the built-in gazetteer with one more city
    let mut vocabulary = VocabularyConfig::builtin().unwrap();
    vocabulary.place.push(rahalah::patterns::PlaceConfig {
        code: "AHB".to_string(),
        city: "Abha".to_string(),
        aliases: vec!["أبها".to_string(), "abha".to_string()],
    });
    std::fs::write(&path, toml::to_string_pretty(&vocabulary).unwrap()).unwrap();

    let registry = PatternRegistry::from_file(&path).unwrap();
    let interpreter = Interpreter::new(registry, ResolutionPolicy::default());
    let intent = interpreter.interpret_on("رحلة من الرياض إلى أبها", day(2025, 1, 5));

    assert_eq!(intent.destination, "AHB");
    assert_eq!(
        intent.destination_place.and_then(|p| p.city).as_deref(),
        Some("Abha")
    );
}

#[test]
fn test_invalid_vocabulary_file_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("vocabulary.toml");

    let mut vocabulary = VocabularyConfig::builtin().unwrap();
    vocabulary.stars[0].value = 0;
    std::fs::write(&path, toml::to_string_pretty(&vocabulary).unwrap()).unwrap();
    assert!(PatternRegistry::from_file(&path).is_err());

    std::fs::write(&path, "not = [valid").unwrap();
    assert!(PatternRegistry::from_file(&path).is_err());

    assert!(PatternRegistry::from_file(&temp_dir.path().join("missing.toml")).is_err());
}

#[test]
fn test_normalize_is_idempotent_on_queries() {
    let queries = [
        "رحلة من الدمام الى الرياض غداً",
        "فندق خمسة نجوم في جدّة",
        "  إقامة   في   المدينة المنورة ",
    ];
    for query in queries {
        let once = normalize(query);
        assert_eq!(normalize(&once), once);
    }
}
