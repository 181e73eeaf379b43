//! Rahalah - Arabic travel query interpreter
//!
//! Turns free-text travel requests written in Arabic (with English fallbacks)
//! into structured search intents using ordered, configuration-driven pattern
//! tables, and maps those intents onto a fixture catalog and a hotel search
//! API request.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod hotel_search;
pub mod interpreter;
pub mod locale;
pub mod patterns;
pub mod questionnaire;

pub use error::{RahalahError, Result};
pub use interpreter::{Interpreter, SearchIntent, TripType};
