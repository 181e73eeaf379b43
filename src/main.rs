use chrono::NaiveDate;
use rahalah::catalog::{Catalog, ResultFilter, TravelPlan};
use rahalah::cli::{Cli, Commands, ConfigAction, FilterArgs};
use rahalah::config::Config;
use rahalah::error::{RahalahError, Result};
use rahalah::hotel_search::{HotelResults, HotelSearchRequest};
use rahalah::interpreter::{normalize, Interpreter, PlaceMention, SearchIntent, TripType};
use rahalah::locale::{Language, Translator};
use rahalah::questionnaire::{Progress, Prompt, Questionnaire, Service};
use std::io::BufRead;
use std::path::{Path, PathBuf};

const VOCABULARY_TEMPLATE: &str = include_str!("../config-templates/vocabulary.toml");
const CATALOG_TEMPLATE: &str = include_str!("../config-templates/catalog.toml");

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Handle commands
    match cli.command {
        Commands::Parse { query, today, json } => {
            let config = load_config(cli.config, cli.profile)?;
            let translator = translator_for(&config, cli.lang.as_deref());
            cmd_parse(&config, &translator, &query, today.as_deref(), json)?;
        }
        Commands::Plan {
            query,
            today,
            json,
            filter,
        } => {
            let config = load_config(cli.config, cli.profile)?;
            let translator = translator_for(&config, cli.lang.as_deref());
            cmd_plan(&config, &translator, &query, today.as_deref(), json, &filter)?;
        }
        Commands::HotelRequest {
            query,
            today,
            min_price,
            max_price,
            amenities,
        } => {
            let config = load_config(cli.config, cli.profile)?;
            let translator = translator_for(&config, cli.lang.as_deref());
            cmd_hotel_request(
                &config,
                &translator,
                &query,
                today.as_deref(),
                (min_price, max_price),
                amenities,
            )?;
        }
        Commands::Ask { service, json } => {
            let config = load_config(cli.config, cli.profile)?;
            let translator = translator_for(&config, cli.lang.as_deref());
            let service: Service = service.parse()?;
            cmd_ask(&translator, service, json)?;
        }
        Commands::HotelResults { file, json } => {
            let config = load_config(cli.config, cli.profile)?;
            let translator = translator_for(&config, cli.lang.as_deref());
            cmd_hotel_results(&translator, &file, json)?;
        }
        Commands::Normalize { text } => {
            println!("{}", normalize(&text));
        }
        Commands::Config { action } => {
            cmd_config(cli.config, cli.profile, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_filter = if verbose { "rahalah=debug" } else { "rahalah=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_parse(
    config: &Config,
    translator: &Translator,
    query: &str,
    today: Option<&str>,
    json: bool,
) -> Result<()> {
    let interpreter = Interpreter::from_config(config)?;
    let intent = interpret(&interpreter, query, today)?;

    if json {
        println!("{}", to_json(&intent, "Failed to serialize intent")?);
    } else {
        print_intent(&interpreter, translator, &intent);
    }

    Ok(())
}

fn cmd_plan(
    config: &Config,
    translator: &Translator,
    query: &str,
    today: Option<&str>,
    json: bool,
    filter_args: &FilterArgs,
) -> Result<()> {
    let interpreter = Interpreter::from_config(config)?;
    let catalog = Catalog::load(&config.catalog)?;
    let intent = interpret(&interpreter, query, today)?;
    let filter = filter_args.to_filter()?;
    let mut plan = catalog.plan(&intent);
    filter.apply(&mut plan);

    if json {
        println!("{}", to_json(&plan, "Failed to serialize plan")?);
    } else {
        print_intent(&interpreter, translator, &intent);
        println!();
        print_filter(translator, &filter);
        print_plan(translator, &plan);
    }

    Ok(())
}

fn cmd_hotel_request(
    config: &Config,
    translator: &Translator,
    query: &str,
    today: Option<&str>,
    (min_price, max_price): (Option<u32>, Option<u32>),
    amenities: Vec<String>,
) -> Result<()> {
    let interpreter = Interpreter::from_config(config)?;
    let intent = interpret(&interpreter, query, today)?;
    let request =
        HotelSearchRequest::from_intent(&intent, &config.hotel_search, translator.language())
            .with_price_range(min_price, max_price)
            .with_amenities(amenities);

    // Never print the key itself
    let has_key = std::env::var(&config.hotel_search.api_key_env)
        .map(|key| !key.is_empty())
        .unwrap_or(false);
    if !has_key {
        tracing::warn!(
            "{} is not set; the request URL has no api_key",
            config.hotel_search.api_key_env
        );
    }
    let url = request.url(has_key.then_some("REDACTED"))?;

    let city = intent
        .destination_place
        .as_ref()
        .and_then(|p| p.city.as_deref())
        .map(|c| translator.city_name(c))
        .unwrap_or_else(|| request.query.clone());
    let check_in = request.check_in.to_string();
    let check_out = request.check_out.to_string();
    println!(
        "{}",
        translator.translate(
            "nl_hotel_search",
            &[("city", city.as_str()), ("start", check_in.as_str()), ("end", check_out.as_str())],
        )
    );
    println!("{}", url);

    Ok(())
}

fn cmd_hotel_results(translator: &Translator, file: &Path, json: bool) -> Result<()> {
    let body = std::fs::read_to_string(file).map_err(|e| RahalahError::Io {
        source: e,
        context: format!("Failed to read response file: {:?}", file),
    })?;
    let results = HotelResults::from_json_str(&body)?;

    if json {
        println!("{}", to_json(&results, "Failed to serialize hotel results")?);
        return Ok(());
    }

    println!(
        "{} hotels ({} total, prices in {})",
        results.hotels.len(),
        results.total_results,
        results.currency
    );
    for hotel in &results.hotels {
        let stars = hotel
            .stars
            .map(|s| format!("{}★", s))
            .unwrap_or_else(|| "-".to_string());
        let price = hotel
            .price
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} [{}] {} {} ({} reviews, rating {:.1})",
            hotel.name, stars, price, results.currency, hotel.review_count, hotel.rating
        );
    }

    // Only priced hotels are candidates
    if let Some(hotel) = results.cheapest() {
        println!(
            "{}: {} {} {}",
            translator.translate("cheapest", &[]),
            hotel.name,
            hotel.price.unwrap_or_default(),
            results.currency
        );
    }

    Ok(())
}

fn cmd_ask(translator: &Translator, service: Service, json: bool) -> Result<()> {
    let mut questionnaire = Questionnaire::new(service);
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    let mut prompt = questionnaire.current();
    while let Some(current) = prompt {
        print_prompt(translator, &current);

        let Some(line) = lines.next() else {
            tracing::warn!("Input ended before the {} questionnaire was completed", service);
            return Ok(());
        };
        let line = line.map_err(|e| RahalahError::Io {
            source: e,
            context: "Failed to read answer from stdin".to_string(),
        })?;

        prompt = match questionnaire.answer(&line) {
            Ok(Progress::Next(next)) => Some(next),
            Ok(Progress::Completed(_)) => None,
            Err(e) => {
                // Ask the same question again
                eprintln!("{}", e);
                Some(current)
            }
        };
    }

    let Some(summary) = questionnaire.summary() else {
        return Ok(());
    };

    if json {
        println!("{}", to_json(&summary, "Failed to serialize questionnaire summary")?);
    } else {
        println!("{}", translator.translate("questionnaire_done", &[]));
        for (key, value) in &summary.details {
            println!("  {}: {}", key, value);
        }
    }

    Ok(())
}

fn print_prompt(translator: &Translator, prompt: &Prompt) {
    println!(
        "[{}/{}] {}",
        prompt.step,
        prompt.total_steps,
        translator.translate(prompt.message, &[])
    );
    for (idx, option) in prompt.options.iter().enumerate() {
        println!("  {}. {}", idx + 1, option);
    }
}

fn cmd_config(
    config_path: Option<PathBuf>,
    profile: Option<String>,
    action: ConfigAction,
) -> Result<()> {
    match action {
        ConfigAction::Show { section } => {
            let config = load_config(config_path, profile)?;
            let value = serde_json::to_value(&config).map_err(|e| RahalahError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;

            let shown = match section {
                Some(section) => value.get(&section).cloned().ok_or_else(|| {
                    RahalahError::Config(format!("Unknown config section '{}'", section))
                })?,
                None => value,
            };

            println!("{}", to_json(&shown, "Failed to serialize config")?);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;

            // Referenced vocabulary and catalog files must load too
            Interpreter::from_config(&config)?;
            Catalog::load(&config.catalog)?;

            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            let config_dir = path
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| RahalahError::Config(format!("Invalid config path: {:?}", path)))?;

            // Create parent directory
            std::fs::create_dir_all(&config_dir).map_err(|e| RahalahError::Io {
                source: e,
                context: format!("Failed to create config directory: {:?}", config_dir),
            })?;

            let vocabulary_path = config_dir.join("vocabulary.toml");
            let catalog_path = config_dir.join("catalog.toml");
            write_template(&vocabulary_path, VOCABULARY_TEMPLATE, force)?;
            write_template(&catalog_path, CATALOG_TEMPLATE, force)?;

            // Point the new config at the installed templates
            let mut config = Config::default();
            config.interpreter.vocabulary_path = Some(vocabulary_path);
            config.catalog.catalog_path = Some(catalog_path);
            config.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
            println!("✓ Template files installed");
            println!("  - vocabulary.toml: Query patterns and gazetteer");
            println!("  - catalog.toml: Flight, hotel and car fixtures");
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>, profile: Option<String>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::debug!(
            "Config file not found, using defaults. Run 'rahalah config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        if let Some(profile) = profile {
            tracing::warn!("Ignoring profile '{}' without a config file", profile);
        }
        return Ok(config);
    }

    if let Some(profile) = profile {
        Config::load_with_profile(&path, &profile)
    } else {
        Config::load(&path)
    }
}

fn write_template(path: &Path, content: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    std::fs::write(path, content).map_err(|e| RahalahError::Io {
        source: e,
        context: format!("Failed to write template: {:?}", path),
    })
}

fn translator_for(config: &Config, lang: Option<&str>) -> Translator {
    let mut translator =
        Translator::new(Language::from_code(&config.locale.language).unwrap_or(Language::Ar));
    if let Some(code) = lang {
        if !translator.switch_language(code) {
            tracing::warn!("Unknown language '{}', keeping {}", code, translator.language());
        }
    }
    translator
}

fn interpret(interpreter: &Interpreter, query: &str, today: Option<&str>) -> Result<SearchIntent> {
    match today {
        Some(value) => Ok(interpreter.interpret_on(query, parse_date(value)?)),
        None => Ok(interpreter.interpret(query)),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| RahalahError::InvalidDate {
        value: value.to_string(),
    })
}

fn to_json<T: serde::Serialize>(value: &T, context: &str) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| RahalahError::Json {
        source: e,
        context: context.to_string(),
    })
}

fn print_intent(interpreter: &Interpreter, translator: &Translator, intent: &SearchIntent) {
    let trip_key = match intent.trip_type {
        TripType::Flight => "trip_flight",
        TripType::Hotel => "trip_hotel",
        TripType::Car => "trip_car",
        TripType::Unknown => "trip_unknown",
    };
    println!("{}", translator.translate(trip_key, &[]));

    let origin = place_label(interpreter, translator, &intent.origin, intent.origin_place.as_ref());
    let destination = place_label(
        interpreter,
        translator,
        &intent.destination,
        intent.destination_place.as_ref(),
    );
    println!("  {}: {}", translator.translate("from", &[]), origin);
    println!("  {}: {}", translator.translate("to", &[]), destination);

    let date_label = match intent.trip_type {
        TripType::Hotel => "check_in",
        _ => "departure",
    };
    match &intent.date_keyword {
        Some(keyword) => println!(
            "  {}: {} ({})",
            translator.translate(date_label, &[]),
            intent.date,
            translator.translate(keyword, &[])
        ),
        None => println!("  {}: {}", translator.translate(date_label, &[]), intent.date),
    }

    if let Some(stars) = intent.stars {
        println!("  {}: {}★", translator.translate("hotel_stars", &[]), stars);
    }
    if let Some(nights) = intent.nights {
        println!("  {}: {}", translator.translate("nights", &[]), nights);
    }
    if let Some(car_type) = &intent.car_type {
        println!("  {}: {}", translator.translate("car_type", &[]), car_type);
    }
    if intent.hotel_needed && intent.trip_type != TripType::Hotel {
        println!("  {}", translator.translate("hotel_needed", &[]));
    }
    if intent.car_needed && intent.trip_type != TripType::Car {
        println!("  {}", translator.translate("car_needed", &[]));
    }
}

/// "City (CODE)" for a resolved code, with the raw text when it did not resolve
fn place_label(
    interpreter: &Interpreter,
    translator: &Translator,
    code: &str,
    mention: Option<&PlaceMention>,
) -> String {
    let city = mention
        .filter(|m| m.code.as_deref() == Some(code))
        .and_then(|m| m.city.clone())
        .or_else(|| {
            interpreter
                .registry()
                .place_by_code(code)
                .map(|p| p.city.clone())
        });

    let label = match city {
        Some(city) => format!("{} ({})", translator.city_name(&city), code),
        None => code.to_string(),
    };

    match mention {
        Some(m) if !m.is_resolved() => format!("{} [{}]", label, m.text),
        _ => label,
    }
}

fn print_filter(translator: &Translator, filter: &ResultFilter) {
    match filter.active_count() {
        0 => println!("{}", translator.translate("showing_all", &[])),
        count => {
            let count = count.to_string();
            println!(
                "{}",
                translator.translate("filters_applied", &[("count", count.as_str())])
            );
        }
    }
}

fn print_plan(translator: &Translator, plan: &TravelPlan) {
    if plan.is_empty() {
        println!("{}", translator.translate("no_results", &[]));
        return;
    }

    if !plan.flights.is_empty() {
        let count = plan.flights.len().to_string();
        println!("{}", translator.translate("flights_found", &[("count", count.as_str())]));
        for offer in &plan.flights {
            let f = &offer.flight;
            let stops = if f.stops == 0 {
                "nonstop".to_string()
            } else {
                format!("via {}", f.stop_airports.join(", "))
            };
            println!(
                "  {} {} {} {}-{} ({}, {}) {} {}",
                offer.depart_date,
                f.airline,
                f.flight_number,
                f.departure_time,
                f.arrival_time,
                f.duration,
                stops,
                f.price,
                f.currency
            );
        }
    }

    if !plan.hotels.is_empty() {
        let count = plan.hotels.len().to_string();
        println!("{}", translator.translate("hotels_found", &[("count", count.as_str())]));
        for hotel in &plan.hotels {
            println!(
                "  {} [{}★] {} {} / night, rating {:.1}",
                hotel.name, hotel.stars, hotel.price, hotel.currency, hotel.rating
            );
        }
    }

    if !plan.cars.is_empty() {
        let count = plan.cars.len().to_string();
        println!("{}", translator.translate("cars_found", &[("count", count.as_str())]));
        for car in &plan.cars {
            println!(
                "  {} {} {} {} / day",
                car.company, car.car_type, car.price, car.currency
            );
        }
    }
}
