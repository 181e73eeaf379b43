//! Integration tests for configuration files

use rahalah::catalog::Catalog;
use rahalah::config::{Config, ProfileOverrides};
use rahalah::interpreter::Interpreter;
use rahalah::RahalahError;
use chrono::NaiveDate;
use tempfile::TempDir;

#[test]
fn test_save_and_load_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");

    let mut config = Config::default();
    config.hotel_search.default_nights = 4;
    config.locale.language = "en".to_string();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.meta.schema_version, "1.0.0");
    assert_eq!(loaded.hotel_search.default_nights, 4);
    assert_eq!(loaded.locale.language, "en");
    assert_eq!(loaded.interpreter.default_destination, "JED");
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = Config::load(&temp_dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, RahalahError::ConfigNotFound { .. }));
}

#[test]
fn test_load_rejects_invalid_values() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");

    let mut config = Config::default();
    config.interpreter.default_origin = "JED".to_string();
    config.save(&path).unwrap();

    match Config::load(&path) {
        Err(RahalahError::ConfigValidation { errors }) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].path, "interpreter.default_destination");
        }
        other => panic!("expected validation error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_profile_applied_on_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");

    let mut config = Config::default();
    config.profiles.insert(
        "hajj".to_string(),
        ProfileOverrides {
            default_origin: Some("RUH".to_string()),
            default_destination: None,
            language: None,
        },
    );
    config.save(&path).unwrap();

    let loaded = Config::load_with_profile(&path, "hajj").unwrap();
    assert_eq!(loaded.interpreter.default_origin, "RUH");

    assert!(Config::load_with_profile(&path, "missing").is_err());
}

#[test]
fn test_config_drives_interpreter_and_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let vocabulary_path = temp_dir.path().join("vocabulary.toml");
    let catalog_path = temp_dir.path().join("catalog.toml");

    std::fs::write(
        &vocabulary_path,
        include_str!("../config-templates/vocabulary.toml"),
    )
    .unwrap();
    std::fs::write(
        &catalog_path,
        r#"
[[hotel]]
destination = "DXB"
name = "Atlantis The Palm"
stars = 5
price = 2100
currency = "AED"
address = "Palm Jumeirah"
rating = 4.6
review_count = 10422
"#,
    )
    .unwrap();

    let mut config = Config::default();
    config.interpreter.default_origin = "RUH".to_string();
    config.interpreter.default_destination = "DXB".to_string();
    config.interpreter.vocabulary_path = Some(vocabulary_path);
    config.catalog.catalog_path = Some(catalog_path);

    let interpreter = Interpreter::from_config(&config).unwrap();
    let catalog = Catalog::load(&config.catalog).unwrap();

    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let intent = interpreter.interpret_on("فندق خمس نجوم", today);
    assert_eq!(intent.origin, "RUH");
    assert_eq!(intent.destination, "DXB");

    let plan = catalog.plan(&intent);
    assert_eq!(plan.hotels.len(), 1);
    assert_eq!(plan.hotels[0].name, "Atlantis The Palm");
}

#[test]
fn test_missing_vocabulary_file_fails_construction() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.interpreter.vocabulary_path = Some(temp_dir.path().join("absent.toml"));

    assert!(matches!(
        Interpreter::from_config(&config),
        Err(RahalahError::Io { .. })
    ));
}
