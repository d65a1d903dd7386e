use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Confirm, CustomType, Select, Text};
use tracing::{debug, warn};

use weathernow_core::geocoding::MAX_CANDIDATES;
use weathernow_core::session::{FetchKey, ForecastGate, MIN_QUERY_LEN, SearchSession};
use weathernow_core::{Config, ForecastClient, LocationResolver, OpenMeteoGeocoder, Place, Units};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathernow", version, about = "Weather lookup CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List candidate places for a search string.
    Search {
        /// Place name, optionally "name, region" or "name, region, country".
        query: String,
    },

    /// Show the forecast for the best-matching place.
    Show {
        /// Place name, optionally "name, region" or "name, region, country".
        query: String,

        /// Pick among all matching places instead of taking the best match.
        #[arg(long)]
        pick: bool,

        /// Override the configured unit system.
        #[arg(long, value_enum)]
        units: Option<UnitSystemArg>,

        /// Weekday whose hourly forecast to print (defaults to today).
        #[arg(long, value_enum)]
        day: Option<DayArg>,
    },

    /// Look up places and forecasts repeatedly in one session.
    Interactive {
        /// Starting unit system (switch later with `!units`).
        #[arg(long, value_enum)]
        units: Option<UnitSystemArg>,
    },

    /// Choose and persist default units and search settings.
    Configure,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnitSystemArg {
    Metric,
    Imperial,
}

impl From<UnitSystemArg> for Units {
    fn from(arg: UnitSystemArg) -> Self {
        match arg {
            UnitSystemArg::Metric => Units::metric(),
            UnitSystemArg::Imperial => Units::imperial(),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DayArg {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayArg {
    /// Monday-first slot index into the week grid.
    fn slot(self) -> usize {
        self as usize
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Search { query } => search(&config, &query).await,
            Command::Show { query, pick, units, day } => {
                show(&config, &query, pick, units, day).await
            }
            Command::Interactive { units } => interactive(&config, units).await,
            Command::Configure => configure(config),
        }
    }
}

fn resolver(config: &Config) -> LocationResolver {
    let backend = OpenMeteoGeocoder::with_base_url(config.endpoints.geocoding_url.clone());
    LocationResolver::new(Box::new(backend), config.search.suggestion_count)
}

fn forecast_client(config: &Config) -> ForecastClient {
    ForecastClient::with_base_url(config.endpoints.forecast_url.clone(), config.hour_policy)
}

async fn search(config: &Config, query: &str) -> Result<()> {
    // A failed search is never fatal; it reads as "nothing matched".
    let places = match resolver(config).suggest(query).await {
        Ok(places) => places,
        Err(err) => {
            warn!("place search failed: {err}");
            Vec::new()
        }
    };

    if places.is_empty() {
        println!("No search result found!");
        return Ok(());
    }

    for place in &places {
        println!("{place}");
    }

    Ok(())
}

async fn show(
    config: &Config,
    query: &str,
    pick: bool,
    units: Option<UnitSystemArg>,
    day: Option<DayArg>,
) -> Result<()> {
    let resolver = resolver(config);

    let place = if pick {
        match pick_place(&resolver, query).await? {
            Some(place) => place,
            None => {
                println!("No search result found!");
                return Ok(());
            }
        }
    } else {
        let resolved = match resolver.resolve(query).await {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!("place search failed: {err}");
                None
            }
        };
        match resolved {
            Some(place) => place,
            None => {
                println!("No search result found!");
                return Ok(());
            }
        }
    };

    // Unlike the search, a forecast failure after a successful resolve is
    // fatal for this attempt; retry is up to the user.
    let forecast = forecast_client(config)
        .fetch(&place)
        .await
        .context("Failed to fetch the forecast. Please try again in a few moments")?;

    let units = units.map_or(config.units, Units::from);
    let slot = day.map_or_else(|| forecast.week.today_slot(), DayArg::slot);
    render::print_forecast(&forecast, units, slot);

    Ok(())
}

async fn pick_place(resolver: &LocationResolver, query: &str) -> Result<Option<Place>> {
    let places = match resolver.suggest(query).await {
        Ok(places) => places,
        Err(err) => {
            warn!("place search failed: {err}");
            return Ok(None);
        }
    };

    if places.is_empty() {
        return Ok(None);
    }
    choose(places)
}

async fn interactive(config: &Config, units: Option<UnitSystemArg>) -> Result<()> {
    let resolver = resolver(config);
    let client = forecast_client(config);
    let mut units = units.map_or(config.units, Units::from);

    let mut session = SearchSession::new();
    let mut gate = ForecastGate::new();

    println!("How's the sky looking today?");
    println!("Type a place name, `!units` to switch units, or an empty line to quit.");

    loop {
        let input = Text::new("Search for a place:").prompt().context("Input aborted")?;
        let input = input.trim().to_string();

        if input.is_empty() {
            break;
        }

        if input == "!units" {
            units = units.switched();
            println!(
                "Switched to {} units.",
                if units == Units::metric() { "metric" } else { "imperial" }
            );
            continue;
        }

        if input.chars().count() < MIN_QUERY_LEN {
            println!("Keep typing, a search needs at least {MIN_QUERY_LEN} characters.");
            continue;
        }

        let generation = session.begin();
        let suggestions = match resolver.suggest(&input).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                warn!("place search failed: {err}");
                println!("No search result found!");
                continue;
            }
        };
        if !session.is_current(generation) {
            // A newer search superseded this one while it was in flight.
            continue;
        }

        if suggestions.is_empty() {
            if gate.should_fetch(FetchKey::Query(input.clone())) {
                println!("No search result found!");
            }
            continue;
        }

        let place = match choose(suggestions)? {
            Some(place) => place,
            None => continue,
        };

        if !gate.should_fetch(FetchKey::Place(place.id)) {
            debug!(%place, "same place re-submitted, skipping fetch");
            continue;
        }

        match client.fetch(&place).await {
            Ok(forecast) => {
                let slot = forecast.week.today_slot();
                render::print_forecast(&forecast, units, slot);
            }
            Err(err) => {
                warn!("forecast fetch failed: {err}");
                gate.reset();
                println!("Something went wrong.");
                println!("We couldn't connect to the server. Please try again in a few moments.");
                let retry = Confirm::new("Keep searching?")
                    .with_default(true)
                    .prompt()
                    .context("Input aborted")?;
                if !retry {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn choose(mut places: Vec<Place>) -> Result<Option<Place>> {
    if places.len() == 1 {
        return Ok(Some(places.remove(0)));
    }

    let choice = Select::new("Several places match:", places)
        .prompt_skippable()
        .context("Place selection aborted")?;
    Ok(choice)
}

fn configure(mut config: Config) -> Result<()> {
    let system = Select::new("Default units:", vec!["metric", "imperial"])
        .prompt()
        .context("Configuration aborted")?;
    config.units = match system {
        "imperial" => Units::imperial(),
        _ => Units::metric(),
    };

    let count = CustomType::<u8>::new(&format!("Suggestions per search (1-{MAX_CANDIDATES}):"))
        .with_default(config.search.suggestion_count)
        .prompt()
        .context("Configuration aborted")?;
    config.set_suggestion_count(count);

    config.save()?;
    println!("Saved to {}", Config::config_file_path()?.display());

    Ok(())
}
