//! CLI command definitions and parsing
use crate::catalog::{ResultFilter, SortOrder};
use crate::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rahalah",
    version,
    about = "Rule-based Arabic travel query interpreter",
    long_about = "Rahalah turns free-text travel requests written in Arabic (with English fallbacks) \
                  into structured search intents, and can run them against a fixture catalog or \
                  map them onto a hotel search API request."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/rahalah/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Configuration profile to apply
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Output language, overriding the configured one
    #[arg(short, long, global = true, value_parser = ["ar", "en"])]
    pub lang: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interpret a query and print the search intent
    Parse {
        /// Free-text travel query
        query: String,

        /// Reference date for relative keywords (YYYY-MM-DD, defaults to today)
        #[arg(long, value_name = "DATE")]
        today: Option<String>,

        /// Show the intent in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Interpret a query and look it up in the fixture catalog
    Plan {
        /// Free-text travel query
        query: String,

        /// Reference date for relative keywords (YYYY-MM-DD, defaults to today)
        #[arg(long, value_name = "DATE")]
        today: Option<String>,

        /// Show the plan in JSON format
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Print the hotel search API request for a query
    HotelRequest {
        /// Free-text travel query
        query: String,

        /// Reference date for relative keywords (YYYY-MM-DD, defaults to today)
        #[arg(long, value_name = "DATE")]
        today: Option<String>,

        /// Lowest nightly price
        #[arg(long)]
        min_price: Option<u32>,

        /// Highest nightly price
        #[arg(long)]
        max_price: Option<u32>,

        /// Required amenity (repeatable)
        #[arg(long = "amenity", value_name = "AMENITY")]
        amenities: Vec<String>,
    },

    /// Answer the trip questionnaire for a service, one answer per stdin line
    Ask {
        /// Service to plan
        #[arg(value_parser = ["flights", "hotels", "cars"])]
        service: String,

        /// Show the summary in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Normalize a saved hotel search API response
    HotelResults {
        /// Path to the JSON response body
        file: PathBuf,

        /// Show the normalized results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the normalized form of some text
    Normalize {
        /// Text to normalize
        text: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Result filters for `plan`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Lowest price to keep
    #[arg(long)]
    pub min_price: Option<u32>,

    /// Highest price to keep
    #[arg(long)]
    pub max_price: Option<u32>,

    /// Hotel star rating to keep (repeatable)
    #[arg(long = "stars", value_name = "STARS", value_parser = clap::value_parser!(u8).range(1..=5))]
    pub stars: Vec<u8>,

    /// Hotel amenity, any of which must be offered (repeatable)
    #[arg(long = "amenity", value_name = "AMENITY")]
    pub amenities: Vec<String>,

    /// Text the hotel address or car pickup location must contain
    #[arg(long)]
    pub location: Option<String>,

    /// Result order
    #[arg(long, value_parser = ["price-asc", "price-desc", "rating-desc", "duration-asc"])]
    pub sort: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<ResultFilter> {
        let sort = self
            .sort
            .as_deref()
            .map(str::parse::<SortOrder>)
            .transpose()?;

        Ok(ResultFilter {
            min_price: self.min_price,
            max_price: self.max_price,
            stars: self.stars.clone(),
            amenities: self.amenities.clone(),
            location: self.location.clone(),
            sort,
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Show only a specific section
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
