//! Pattern registry for configuration-driven query interpretation
//!
//! This module provides:
//! - The vocabulary file structure (intent triggers, relative dates, star and
//!   nights phrases, location patterns, car-type patterns, gazetteer)
//! - Pre-compiled, priority-ordered regex tables built from it
//! - Gazetteer and number-word lookups over normalized text
//!
//! The built-in vocabulary is embedded from config-templates/vocabulary.toml.

use crate::error::{RahalahError, Result};
use crate::interpreter::{normalize, TripType};
use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const BUILTIN_VOCABULARY: &str = include_str!("../../config-templates/vocabulary.toml");

/// Trip type trigger rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRuleConfig {
    pub trip_type: TripType,
    #[serde(default)]
    pub priority: u8,
    pub patterns: Vec<String>,
}

/// Relative date keyword rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelativeDateConfig {
    pub name: String,
    pub offset_days: i64,
    #[serde(default)]
    pub priority: u8,
    pub patterns: Vec<String>,
}

/// Star rating phrase rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarsRuleConfig {
    pub value: u8,
    #[serde(default)]
    pub priority: u8,
    pub patterns: Vec<String>,
}

/// Nights phrase rule, either capturing `count` or fixing `value`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightsRuleConfig {
    pub pattern: String,
    #[serde(default)]
    pub value: Option<u32>,
    #[serde(default)]
    pub priority: u8,
}

/// Origin or destination pattern capturing `place`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationPatternConfig {
    pub pattern: String,
    #[serde(default)]
    pub keep_unresolved: bool,
}

/// Car type patterns capturing `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarTypeConfig {
    pub patterns: Vec<String>,
    pub max_words: usize,
    #[serde(default)]
    pub stop_words: Vec<String>,
}

/// Gazetteer entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceConfig {
    pub code: String,
    pub city: String,
    pub aliases: Vec<String>,
}

/// Vocabulary file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyConfig {
    pub intent: Vec<IntentRuleConfig>,
    pub relative_date: Vec<RelativeDateConfig>,
    pub stars: Vec<StarsRuleConfig>,
    pub nights: Vec<NightsRuleConfig>,
    #[serde(default)]
    pub number_words: BTreeMap<String, u32>,
    pub origin: Vec<LocationPatternConfig>,
    pub destination: Vec<LocationPatternConfig>,
    pub car_type: CarTypeConfig,
    pub place: Vec<PlaceConfig>,
}

impl VocabularyConfig {
    /// Parse the vocabulary embedded in the binary
    pub fn builtin() -> Result<Self> {
        Ok(toml::from_str(BUILTIN_VOCABULARY)?)
    }
}

/// Compiled trip type trigger
#[derive(Debug, Clone)]
pub struct CompiledIntentRule {
    pub trip_type: TripType,
    pub priority: u8,
    pub patterns: Vec<Regex>,
}

impl CompiledIntentRule {
    pub fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

/// Compiled relative date rule
#[derive(Debug, Clone)]
pub struct CompiledRelativeDate {
    pub name: String,
    pub offset_days: i64,
    pub priority: u8,
    pub patterns: Vec<Regex>,
}

impl CompiledRelativeDate {
    pub fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

/// Compiled star rating rule
#[derive(Debug, Clone)]
pub struct CompiledStarsRule {
    pub value: u8,
    pub priority: u8,
    pub patterns: Vec<Regex>,
}

impl CompiledStarsRule {
    pub fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

/// Compiled nights rule
#[derive(Debug, Clone)]
pub struct CompiledNightsRule {
    pub regex: Regex,
    pub value: Option<u32>,
    pub priority: u8,
}

/// Compiled location pattern
#[derive(Debug, Clone)]
pub struct CompiledLocationPattern {
    pub regex: Regex,
    pub keep_unresolved: bool,
}

/// Compiled car type patterns with normalized stop words
#[derive(Debug, Clone)]
pub struct CompiledCarTypePatterns {
    pub patterns: Vec<Regex>,
    pub max_words: usize,
    pub stop_words: HashSet<String>,
}

/// Gazetteer place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub code: String,
    pub city: String,
}

/// Pattern registry with all pre-compiled vocabulary tables
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    /// Trip type triggers, in priority order
    pub intents: Vec<CompiledIntentRule>,
    /// Relative date rules, in priority order
    pub relative_dates: Vec<CompiledRelativeDate>,
    /// Star rating rules, in priority order
    pub stars: Vec<CompiledStarsRule>,
    /// Nights rules, in priority order
    pub nights: Vec<CompiledNightsRule>,
    /// Origin patterns, in file order
    pub origin: Vec<CompiledLocationPattern>,
    /// Destination patterns, in file order
    pub destination: Vec<CompiledLocationPattern>,
    pub car_type: CompiledCarTypePatterns,
    number_words: HashMap<String, u32>,
    places: Vec<Place>,
    places_by_alias: HashMap<String, usize>,
}

impl PatternRegistry {
    /// Compile the vocabulary embedded in the binary
    pub fn builtin() -> Result<Self> {
        Self::from_config(VocabularyConfig::builtin()?)
    }

    /// Load and compile a vocabulary file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RahalahError::Io {
            source: e,
            context: format!("Failed to read vocabulary file: {:?}", path),
        })?;
        let config: VocabularyConfig = toml::from_str(&content)?;

        Self::from_config(config)
    }

    /// Build the registry from a parsed vocabulary
    pub fn from_config(config: VocabularyConfig) -> Result<Self> {
        // Compile trip type triggers
        let mut intents = config
            .intent
            .iter()
            .map(|rule| {
                if rule.trip_type == TripType::Unknown {
                    return Err(RahalahError::Vocabulary(
                        "Intent rules cannot target the 'unknown' trip type".to_string(),
                    ));
                }
                Ok(CompiledIntentRule {
                    trip_type: rule.trip_type,
                    priority: rule.priority,
                    patterns: compile_all(&rule.patterns, &format!("intent '{}'", rule.trip_type))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Stable sort keeps file order for equal priorities
        intents.sort_by_key(|r| r.priority);

        // Compile relative dates
        let mut relative_dates = config
            .relative_date
            .iter()
            .map(|rule| {
                if !(0..=366).contains(&rule.offset_days) {
                    return Err(RahalahError::Vocabulary(format!(
                        "Relative date '{}' has offset {} outside 0..=366 days",
                        rule.name, rule.offset_days
                    )));
                }
                Ok(CompiledRelativeDate {
                    name: rule.name.clone(),
                    offset_days: rule.offset_days,
                    priority: rule.priority,
                    patterns: compile_all(&rule.patterns, &format!("relative date '{}'", rule.name))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        relative_dates.sort_by_key(|r| r.priority);

        // Compile star rating rules
        let mut stars = config
            .stars
            .iter()
            .map(|rule| {
                if !(1..=5).contains(&rule.value) {
                    return Err(RahalahError::Vocabulary(format!(
                        "Star rule value must be between 1 and 5, got {}",
                        rule.value
                    )));
                }
                Ok(CompiledStarsRule {
                    value: rule.value,
                    priority: rule.priority,
                    patterns: compile_all(&rule.patterns, &format!("stars '{}'", rule.value))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        stars.sort_by_key(|r| r.priority);

        // Compile nights rules
        let mut nights = config
            .nights
            .iter()
            .map(|rule| {
                let regex = compile(&rule.pattern, "nights")?;
                let has_count = regex.capture_names().any(|n| n == Some("count"));
                if !has_count && rule.value.is_none() {
                    return Err(RahalahError::Vocabulary(format!(
                        "Nights pattern '{}' needs a 'count' group or a fixed value",
                        rule.pattern
                    )));
                }
                Ok(CompiledNightsRule {
                    regex,
                    value: rule.value,
                    priority: rule.priority,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        nights.sort_by_key(|r| r.priority);

        let origin = compile_locations(&config.origin, "origin")?;
        let destination = compile_locations(&config.destination, "destination")?;

        // Compile car type patterns
        let car_patterns = config
            .car_type
            .patterns
            .iter()
            .map(|p| {
                let regex = compile(p, "car type")?;
                require_group(&regex, "kind", "car type")?;
                Ok(regex)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut stop_words = HashSet::new();
        for word in &config.car_type.stop_words {
            stop_words.insert(normalize(word));
        }

        let car_type = CompiledCarTypePatterns {
            patterns: car_patterns,
            max_words: config.car_type.max_words.max(1),
            stop_words,
        };

        // Number words are matched against normalized, lowercased tokens
        let mut number_words = HashMap::new();
        for (word, value) in &config.number_words {
            number_words.insert(normalize(word).to_lowercase(), *value);
        }

        // Build the gazetteer
        let mut places = Vec::new();
        let mut places_by_alias = HashMap::new();

        for (idx, place_cfg) in config.place.iter().enumerate() {
            if !is_valid_code(&place_cfg.code) {
                return Err(RahalahError::Vocabulary(format!(
                    "Invalid place code '{}' for {}: expected three uppercase letters",
                    place_cfg.code, place_cfg.city
                )));
            }

            places.push(Place {
                code: place_cfg.code.clone(),
                city: place_cfg.city.clone(),
            });

            for alias in &place_cfg.aliases {
                let key = normalize(alias).to_lowercase();
                if let Some(previous) = places_by_alias.insert(key, idx) {
                    if previous != idx {
                        tracing::debug!(
                            "Alias '{}' moved from {} to {}",
                            alias,
                            config.place[previous].city,
                            place_cfg.city
                        );
                    }
                }
            }
        }

        Ok(Self {
            intents,
            relative_dates,
            stars,
            nights,
            origin,
            destination,
            car_type,
            number_words,
            places,
            places_by_alias,
        })
    }

    /// Resolve a captured place phrase through the gazetteer
    ///
    /// Tries the longest leading run of words first, so "الرياض غدا" resolves
    /// to Riyadh. Returns the place and the words that matched.
    pub fn resolve_place(&self, phrase: &str) -> Option<(&Place, String)> {
        let lowered = phrase.to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();

        (1..=words.len()).rev().find_map(|n| {
            let candidate = words[..n].join(" ");
            self.places_by_alias
                .get(&candidate)
                .map(|&idx| (&self.places[idx], candidate))
        })
    }

    /// Parse a count token: Western, Arabic-Indic or extended digits, or a number word
    pub fn parse_count(&self, token: &str) -> Option<u32> {
        parse_numeral(token).or_else(|| self.number_words.get(&token.to_lowercase()).copied())
    }

    /// All gazetteer places
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// First gazetteer place with the given code
    pub fn place_by_code(&self, code: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.code == code)
    }
}

fn compile(pattern: &str, what: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| RahalahError::Vocabulary(format!("Invalid regex for {}: {}", what, e)))
}

fn compile_all(patterns: &[String], what: &str) -> Result<Vec<Regex>> {
    if patterns.is_empty() {
        return Err(RahalahError::Vocabulary(format!(
            "Rule {} has no patterns",
            what
        )));
    }
    patterns.iter().map(|p| compile(p, what)).collect()
}

fn compile_locations(
    patterns: &[LocationPatternConfig],
    what: &str,
) -> Result<Vec<CompiledLocationPattern>> {
    patterns
        .iter()
        .map(|lp| {
            let regex = compile(&lp.pattern, what)?;
            require_group(&regex, "place", what)?;
            Ok(CompiledLocationPattern {
                regex,
                keep_unresolved: lp.keep_unresolved,
            })
        })
        .collect()
}

fn require_group(regex: &Regex, group: &str, what: &str) -> Result<()> {
    if regex.capture_names().any(|n| n == Some(group)) {
        Ok(())
    } else {
        Err(RahalahError::Vocabulary(format!(
            "Pattern '{}' for {} must capture a '{}' group",
            regex.as_str(),
            what,
            group
        )))
    }
}

/// Airport/city codes are three uppercase ASCII letters
pub fn is_valid_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

/// Parse a run of Western (0-9), Arabic-Indic (٠-٩) or extended Arabic-Indic (۰-۹) digits
pub fn parse_numeral(token: &str) -> Option<u32> {
    if token.is_empty() {
        return None;
    }

    token.chars().try_fold(0u32, |acc, c| {
        let digit = match c {
            '0'..='9' => c as u32 - '0' as u32,
            '\u{0660}'..='\u{0669}' => c as u32 - 0x0660,
            '\u{06F0}'..='\u{06F9}' => c as u32 - 0x06F0,
            _ => return None,
        };
        acc.checked_mul(10)?.checked_add(digit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> VocabularyConfig {
        VocabularyConfig {
            intent: vec![IntentRuleConfig {
                trip_type: TripType::Hotel,
                priority: 1,
                patterns: vec!["فندق".to_string()],
            }],
            relative_date: vec![],
            stars: vec![StarsRuleConfig {
                value: 5,
                priority: 0,
                patterns: vec![r"\b5\s*نجوم".to_string()],
            }],
            nights: vec![],
            number_words: BTreeMap::new(),
            origin: vec![],
            destination: vec![LocationPatternConfig {
                pattern: r"\bفي\s+(?P<place>\p{Arabic}+)".to_string(),
                keep_unresolved: true,
            }],
            car_type: CarTypeConfig {
                patterns: vec![],
                max_words: 2,
                stop_words: vec![],
            },
            place: vec![PlaceConfig {
                code: "JED".to_string(),
                city: "Jeddah".to_string(),
                aliases: vec!["جدة".to_string()],
            }],
        }
    }

    #[test]
    fn test_builtin_vocabulary_compiles() {
        let registry = PatternRegistry::builtin().unwrap();

        assert_eq!(registry.intents.len(), 3);
        assert_eq!(registry.intents[0].trip_type, TripType::Flight);
        assert_eq!(registry.intents[1].trip_type, TripType::Hotel);
        assert_eq!(registry.intents[2].trip_type, TripType::Car);
        assert_eq!(registry.relative_dates[0].name, "tomorrow");
        assert_eq!(registry.stars[0].value, 5);
        assert!(!registry.places().is_empty());
    }

    #[test]
    fn test_intents_sorted_by_priority() {
        let mut config = minimal_config();
        config.intent.push(IntentRuleConfig {
            trip_type: TripType::Flight,
            priority: 0,
            patterns: vec!["رحله".to_string()],
        });

        let registry = PatternRegistry::from_config(config).unwrap();
        assert_eq!(registry.intents[0].trip_type, TripType::Flight);
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let mut config = minimal_config();
        config.intent[0].patterns = vec!["(unclosed".to_string()];

        let err = PatternRegistry::from_config(config).unwrap_err();
        assert!(matches!(err, RahalahError::Vocabulary(_)));
    }

    #[test]
    fn test_star_value_out_of_range_rejected() {
        let mut config = minimal_config();
        config.stars[0].value = 6;
        assert!(PatternRegistry::from_config(config).is_err());
    }

    #[test]
    fn test_unknown_intent_rejected() {
        let mut config = minimal_config();
        config.intent[0].trip_type = TripType::Unknown;
        assert!(PatternRegistry::from_config(config).is_err());
    }

    #[test]
    fn test_location_pattern_requires_place_group() {
        let mut config = minimal_config();
        config.destination[0].pattern = r"\bفي\s+\p{Arabic}+".to_string();
        assert!(PatternRegistry::from_config(config).is_err());
    }

    #[test]
    fn test_nights_rule_requires_count_or_value() {
        let mut config = minimal_config();
        config.nights.push(NightsRuleConfig {
            pattern: r"\bليالي\b".to_string(),
            value: None,
            priority: 0,
        });
        assert!(PatternRegistry::from_config(config).is_err());
    }

    #[test]
    fn test_invalid_place_code_rejected() {
        let mut config = minimal_config();
        config.place[0].code = "jed".to_string();
        assert!(PatternRegistry::from_config(config).is_err());
    }

    #[test]
    fn test_aliases_are_normalized() {
        let registry = PatternRegistry::from_config(minimal_config()).unwrap();

        // "جدة" is stored folded as "جده"
        let (place, matched) = registry.resolve_place("جده").unwrap();
        assert_eq!(place.code, "JED");
        assert_eq!(matched, "جده");
    }

    #[test]
    fn test_resolve_place_longest_prefix() {
        let registry = PatternRegistry::builtin().unwrap();

        let (place, matched) = registry.resolve_place("المدينه المنوره غدا").unwrap();
        assert_eq!(place.city, "Madinah");
        assert_eq!(matched, "المدينه المنوره");

        let (place, _) = registry.resolve_place("Riyadh tomorrow").unwrap();
        assert_eq!(place.code, "RUH");

        assert!(registry.resolve_place("وسط المدينه").is_none());
        assert!(registry.resolve_place("").is_none());
    }

    #[test]
    fn test_parse_numeral() {
        assert_eq!(parse_numeral("3"), Some(3));
        assert_eq!(parse_numeral("12"), Some(12));
        assert_eq!(parse_numeral("٣"), Some(3));
        assert_eq!(parse_numeral("۱۰"), Some(10));
        assert_eq!(parse_numeral(""), None);
        assert_eq!(parse_numeral("3a"), None);
        assert_eq!(parse_numeral("99999999999"), None);
    }

    #[test]
    fn test_parse_count_number_words() {
        let registry = PatternRegistry::builtin().unwrap();
        assert_eq!(registry.parse_count("ثلاث"), Some(3));
        assert_eq!(registry.parse_count("خمسه"), Some(5));
        assert_eq!(registry.parse_count("Three"), Some(3));
        assert_eq!(registry.parse_count("لمده"), None);
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("DMM"));
        assert!(!is_valid_code("DM"));
        assert!(!is_valid_code("dmm"));
        assert!(!is_valid_code("DMMX"));
    }
}
