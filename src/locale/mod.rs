//! Display language and message translation
//!
//! A [`Translator`] is an ordinary value built for one language and passed to
//! whatever renders output. There is no process-wide language state.

use ahash::{HashMap, HashMapExt};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported display languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    En,
}

/// Script direction of a language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Rtl,
    Ltr,
}

impl TextDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Rtl => "rtl",
            TextDirection::Ltr => "ltr",
        }
    }
}

impl Language {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "ar" => Some(Language::Ar),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Ar => "ar",
            Language::En => "en",
        }
    }

    /// Name of the language in its own script
    pub fn name(&self) -> &'static str {
        match self {
            Language::Ar => "العربية",
            Language::En => "English",
        }
    }

    pub fn direction(&self) -> TextDirection {
        match self {
            Language::Ar => TextDirection::Rtl,
            Language::En => TextDirection::Ltr,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// (key, Arabic, English)
const MESSAGES: &[(&str, &str, &str)] = &[
    ("search_flights", "البحث عن رحلات", "Search Flights"),
    ("search_hotels", "البحث عن فنادق", "Search Hotels"),
    ("search_cars", "البحث عن سيارات", "Search Cars"),
    ("from", "من", "From"),
    ("to", "إلى", "To"),
    ("departure", "تاريخ المغادرة", "Departure Date"),
    ("check_in", "تاريخ الوصول", "Check-in Date"),
    ("check_out", "تاريخ المغادرة", "Check-out Date"),
    ("adults", "البالغين", "Adults"),
    ("hotel_stars", "تصنيف الفندق", "Hotel Stars"),
    ("nights", "عدد الليالي", "Nights"),
    ("car_type", "نوع السيارة", "Car Type"),
    ("today", "اليوم", "Today"),
    ("tomorrow", "غدا", "Tomorrow"),
    ("day_after_tomorrow", "بعد غد", "Day After Tomorrow"),
    ("next_week", "الأسبوع القادم", "Next Week"),
    ("next_month", "الشهر القادم", "Next Month"),
    ("trip_flight", "رحلة طيران", "Flight"),
    ("trip_hotel", "حجز فندق", "Hotel"),
    ("trip_car", "تأجير سيارة", "Car Rental"),
    ("trip_unknown", "طلب غير مفهوم", "Unrecognized request"),
    ("hotel_needed", "مع فندق", "Hotel included"),
    ("car_needed", "مع سيارة", "Car included"),
    ("flights_found", "تم العثور على [count] رحلات", "Found [count] flights"),
    ("hotels_found", "تم العثور على [count] فنادق", "Found [count] hotels"),
    ("cars_found", "تم العثور على [count] سيارات", "Found [count] cars"),
    ("no_results", "لا توجد نتائج", "No results"),
    (
        "nl_flight_search",
        "البحث عن رحلة من [city] إلى [destination] في [date]",
        "Search for a flight from [city] to [destination] on [date]",
    ),
    (
        "nl_hotel_search",
        "البحث عن فندق في [city] من [start] إلى [end]",
        "Search for a hotel in [city] from [start] to [end]",
    ),
    ("filters_applied", "تم تطبيق [count] فلاتر", "Filters applied: [count]"),
    ("showing_all", "عرض جميع النتائج", "Showing all results"),
    ("cheapest", "الأرخص", "Cheapest"),
    ("questionnaire_done", "تم جمع جميع التفاصيل", "All details collected"),
    ("q_flight_origin", "من أين تود المغادرة؟", "Where would you like to depart from?"),
    ("q_flight_destination", "إلى أين تود السفر؟", "Where would you like to go?"),
    ("q_flight_depart_date", "متى تود السفر؟", "When would you like to travel?"),
    (
        "q_flight_trip_type",
        "هل الرحلة ذهاب فقط أم ذهاب وعودة؟",
        "Will this be a one-way or round trip?",
    ),
    ("q_flight_return_date", "متى تود العودة؟", "When would you like to return?"),
    ("q_flight_travelers", "كم عدد المسافرين؟", "How many travelers will be joining?"),
    (
        "q_hotel_city",
        "في أي مدينة تبحث عن إقامة؟",
        "Which city are you looking for accommodation in?",
    ),
    ("q_hotel_check_in", "ما هو تاريخ الوصول؟", "What is your check-in date?"),
    ("q_hotel_check_out", "ما هو تاريخ المغادرة؟", "What is your check-out date?"),
    ("q_hotel_guests", "كم عدد النزلاء؟", "How many guests will be staying?"),
    (
        "q_hotel_amenities",
        "هل لديك تفضيلات لمرافق الفندق؟",
        "Do you have any preferences for hotel amenities?",
    ),
    ("q_hotel_budget", "ما هي ميزانيتك لليلة الواحدة؟", "What's your budget range per night?"),
    ("q_car_city", "في أي مدينة تحتاج سيارة؟", "In which city do you need a rental car?"),
    ("q_car_pickup_date", "ما هو تاريخ الاستلام؟", "What is your pick-up date?"),
    ("q_car_return_date", "ما هو تاريخ الإرجاع؟", "What is your return date?"),
    ("q_car_type", "ما نوع السيارة التي تبحث عنها؟", "What type of vehicle are you looking for?"),
    (
        "q_car_company",
        "هل لديك شركة تأجير مفضلة؟",
        "Do you have a preferred car rental company?",
    ),
    ("riyadh", "الرياض", "Riyadh"),
    ("jeddah", "جدة", "Jeddah"),
    ("makkah", "مكة المكرمة", "Makkah"),
    ("madinah", "المدينة المنورة", "Madinah"),
    ("dammam", "الدمام", "Dammam"),
    ("bangkok", "بانكوك", "Bangkok"),
    ("dubai", "دبي", "Dubai"),
    ("cairo", "القاهرة", "Cairo"),
    ("istanbul", "إسطنبول", "Istanbul"),
    ("london", "لندن", "London"),
    ("paris", "باريس", "Paris"),
    ("new_york", "نيويورك", "New York"),
];

#[derive(Debug, Clone)]
struct Message {
    ar: String,
    en: String,
}

/// Message table bound to a current language
#[derive(Debug, Clone)]
pub struct Translator {
    language: Language,
    messages: HashMap<String, Message>,
}

impl Translator {
    pub fn new(language: Language) -> Self {
        let mut messages = HashMap::with_capacity(MESSAGES.len());
        for (key, ar, en) in MESSAGES {
            messages.insert(
                key.to_string(),
                Message {
                    ar: ar.to_string(),
                    en: en.to_string(),
                },
            );
        }

        Self { language, messages }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn direction(&self) -> TextDirection {
        self.language.direction()
    }

    /// Switch to the language with `code`; unknown codes leave it unchanged
    pub fn switch_language(&mut self, code: &str) -> bool {
        match Language::from_code(code) {
            Some(language) => {
                self.language = language;
                true
            }
            None => false,
        }
    }

    /// Look up `key` and substitute every `[name]` placeholder from `params`
    ///
    /// Returns the key itself when there is no message for it.
    pub fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        let Some(message) = self.messages.get(key) else {
            return key.to_string();
        };

        let mut text = match self.language {
            Language::Ar => message.ar.clone(),
            Language::En => message.en.clone(),
        };
        for (name, value) in params {
            text = text.replace(&format!("[{}]", name), value);
        }
        text
    }

    /// Localized name of a gazetteer city, or the city as given
    pub fn city_name(&self, city: &str) -> String {
        let key = city.to_lowercase().replace(' ', "_");
        if self.messages.contains_key(&key) {
            self.translate(&key, &[])
        } else {
            city.to_string()
        }
    }
}
