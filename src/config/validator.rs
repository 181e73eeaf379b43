use crate::config::Config;
use crate::error::{RahalahError, Result, ValidationError};
use crate::locale::Language;
use crate::patterns::is_valid_code;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        // Validate schema version
        Self::validate_schema_version(config, &mut errors);

        // Validate location defaults
        Self::validate_interpreter(config, &mut errors);

        // Validate hotel search settings
        Self::validate_hotel_search(config, &mut errors);

        // Validate display language
        Self::validate_locale(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RahalahError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_interpreter(config: &Config, errors: &mut Vec<ValidationError>) {
        let interp = &config.interpreter;
        let codes = [
            ("interpreter.default_origin", &interp.default_origin),
            ("interpreter.default_destination", &interp.default_destination),
            ("interpreter.collision_fallback", &interp.collision_fallback),
            ("interpreter.collision_alternate", &interp.collision_alternate),
        ];

        for (path, code) in codes {
            if !is_valid_code(code) {
                errors.push(ValidationError::new(
                    path,
                    format!("Expected a three-letter uppercase code, got '{}'", code),
                ));
            }
        }

        if interp.default_origin == interp.default_destination {
            errors.push(ValidationError::new(
                "interpreter.default_destination",
                "Default destination must differ from the default origin",
            ));
        }

        // The alternate is used exactly when the origin equals the fallback
        if interp.collision_fallback == interp.collision_alternate {
            errors.push(ValidationError::new(
                "interpreter.collision_alternate",
                "Collision alternate must differ from the collision fallback",
            ));
        }

        if let Some(path) = &interp.vocabulary_path {
            if path.as_os_str().is_empty() {
                errors.push(ValidationError::new(
                    "interpreter.vocabulary_path",
                    "Vocabulary file path cannot be empty",
                ));
            }
        }

        if let Some(path) = &config.catalog.catalog_path {
            if path.as_os_str().is_empty() {
                errors.push(ValidationError::new(
                    "catalog.catalog_path",
                    "Catalog file path cannot be empty",
                ));
            }
        }
    }

    fn validate_hotel_search(config: &Config, errors: &mut Vec<ValidationError>) {
        let hotel = &config.hotel_search;

        if url::Url::parse(&hotel.base_url).is_err() {
            errors.push(ValidationError::new(
                "hotel_search.base_url",
                format!("Invalid URL: {}", hotel.base_url),
            ));
        }

        if hotel.engine.is_empty() {
            errors.push(ValidationError::new(
                "hotel_search.engine",
                "Engine name cannot be empty",
            ));
        }

        if hotel.adults == 0 {
            errors.push(ValidationError::new(
                "hotel_search.adults",
                "Adults must be greater than 0",
            ));
        }

        if hotel.default_nights == 0 {
            errors.push(ValidationError::new(
                "hotel_search.default_nights",
                "Default nights must be greater than 0",
            ));
        }
    }

    fn validate_locale(config: &Config, errors: &mut Vec<ValidationError>) {
        let language = &config.locale.language;
        if Language::from_code(language).is_none() {
            errors.push(ValidationError::new(
                "locale.language",
                format!("Language must be 'ar' or 'en', got '{}'", language),
            ));
        }
    }
}
