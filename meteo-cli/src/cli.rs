use anyhow::{Context, anyhow};
use chrono::{Datelike, Local};
use clap::{Args, Parser, Subcommand, ValueEnum};
use inquire::{Confirm, CustomType, Text};
use meteo_core::{
    CityQuery, Config, GeoPoint, MeteoService, ToolCall,
    classify::{describe_european_aqi, describe_us_aqi, describe_weather_code},
    time::{parse_user_date, parse_user_datetime},
    tools::TimestampArgs,
};
use serde::Serialize;
use tracing::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "meteo",
    version,
    about = "Weather, air quality, marine, flood and climate data from Open-Meteo"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where to look: a city name, or explicit coordinates.
#[derive(Debug, Clone, Args)]
pub struct LocationArgs {
    /// City name, resolved through the geocoding API.
    #[arg(long, required_unless_present = "lat", conflicts_with = "lat")]
    pub city: Option<String>,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct CityArgs {
    /// City name to look up.
    pub city: String,

    /// Number of candidate matches to request.
    #[arg(long, default_value_t = 1)]
    pub count: u32,

    /// Result language; defaults to the configured one.
    #[arg(long)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AqiStandard {
    European,
    Us,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively edit language, retry and cache settings.
    Configure,

    /// Coordinates of a city.
    Geocode(CityArgs),

    /// Name, coordinates, population, country and timezone of a city.
    CityInfo(CityArgs),

    /// Daily river discharge.
    River {
        #[command(flatten)]
        location: LocationArgs,

        /// Date as YYYY/MM/DD, DD-MM-YYYY, YYYY-MM-DD or DD/MM/YYYY.
        #[arg(long)]
        date: String,
    },

    /// Hourly particulate matter, aerosol optical depth and dust.
    AirQuality {
        #[command(flatten)]
        location: LocationArgs,
        #[arg(long)]
        date: String,
        /// Hour of day, 0-23.
        #[arg(long)]
        hour: String,
    },

    /// Current European and US air-quality index, classified.
    Aqi {
        #[command(flatten)]
        location: LocationArgs,
        #[arg(long)]
        date: String,
        #[arg(long)]
        hour: String,
    },

    /// Daily maximum wave height.
    MarineDaily {
        #[command(flatten)]
        location: LocationArgs,
        #[arg(long)]
        date: String,
    },

    /// Hourly wave height, direction and period.
    MarineHourly {
        #[command(flatten)]
        location: LocationArgs,
        #[arg(long)]
        date: String,
        #[arg(long)]
        hour: String,
    },

    /// Projected yearly temperature and precipitation (1950-2050).
    Climate {
        #[command(flatten)]
        location: LocationArgs,
        /// Defaults to the current year.
        #[arg(long)]
        year: Option<i32>,
    },

    /// Current weather conditions.
    Current {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Extended daily weather summary.
    Daily {
        #[command(flatten)]
        location: LocationArgs,
        #[arg(long)]
        date: String,
    },

    /// Describe a WMO weather code.
    DescribeCode {
        code: i64,

        /// City used to decide whether hail codes apply.
        #[arg(long, default_value = "")]
        city: String,
    },

    /// Classify an air-quality index value.
    DescribeAqi {
        value: f64,

        #[arg(long, value_enum, default_value_t = AqiStandard::European)]
        standard: AqiStandard,
    },

    /// Render a unix timestamp as date and time.
    Timestamp {
        #[arg(allow_hyphen_values = true)]
        timestamp: f64,

        /// IANA time zone, e.g. Europe/Berlin; UTC when omitted.
        #[arg(long)]
        tz: Option<String>,
    },

    /// Execute a JSON tool call, read from stdin when no argument is given.
    Tool { call: Option<String> },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let command = match self.command {
            Command::Configure => return configure(),
            command => command,
        };

        let config = Config::load()?;
        let service = MeteoService::from_config(&config)?;
        let session = Session { config, service };

        match command {
            Command::Configure => configure(),
            Command::Geocode(args) => {
                let query = session.city_query(args);
                emit(session.service.lat_long_from_city(&query).await)
            }
            Command::CityInfo(args) => {
                let query = session.city_query(args);
                emit(session.service.city_info(&query).await)
            }
            Command::River { location, date } => {
                let date = parse_user_date(&date)?;
                let Some((point, _)) = session.locate(location).await? else {
                    return emit(None::<()>);
                };
                emit(session.service.daily_river_discharge(point, date).await)
            }
            Command::AirQuality { location, date, hour } => {
                let at = parse_user_datetime(&date, &hour)?;
                let Some((point, _)) = session.locate(location).await? else {
                    return emit(None::<()>);
                };
                emit(session.service.air_quality(point, at).await)
            }
            Command::Aqi { location, date, hour } => {
                let at = parse_user_datetime(&date, &hour)?;
                let Some((point, _)) = session.locate(location).await? else {
                    return emit(None::<()>);
                };
                emit(session.service.current_air_quality_index(point, at).await)
            }
            Command::MarineDaily { location, date } => {
                let date = parse_user_date(&date)?;
                let Some((point, _)) = session.locate(location).await? else {
                    return emit(None::<()>);
                };
                emit(session.service.daily_marine(point, date).await)
            }
            Command::MarineHourly { location, date, hour } => {
                let at = parse_user_datetime(&date, &hour)?;
                let Some((point, _)) = session.locate(location).await? else {
                    return emit(None::<()>);
                };
                emit(session.service.hourly_marine(point, at).await)
            }
            Command::Climate { location, year } => {
                let year = year.unwrap_or_else(|| Local::now().year());
                let Some((point, _)) = session.locate(location).await? else {
                    return emit(None::<()>);
                };
                emit(session.service.climate_change(point, year).await)
            }
            Command::Current { location } => {
                let Some((point, city)) = session.locate(location).await? else {
                    return emit(None::<()>);
                };
                emit(session.service.current_weather(point, &city).await)
            }
            Command::Daily { location, date } => {
                let date = parse_user_date(&date)?;
                let Some((point, city)) = session.locate(location).await? else {
                    return emit(None::<()>);
                };
                emit(session.service.daily_weather(point, date, &city).await)
            }
            Command::DescribeCode { code, city } => emit(Some(describe_weather_code(code, &city))),
            Command::DescribeAqi { value, standard } => emit(Some(match standard {
                AqiStandard::European => describe_european_aqi(value),
                AqiStandard::Us => describe_us_aqi(value),
            })),
            Command::Timestamp { timestamp, tz } => {
                let call = ToolCall::ConvertTimestampToDateAndTime(TimestampArgs {
                    timestamp,
                    time_zone: tz.unwrap_or_default(),
                });
                emit(session.service.call_tool(call).await)
            }
            Command::Tool { call } => {
                let raw = match call {
                    Some(raw) => raw,
                    None => std::io::read_to_string(std::io::stdin())
                        .context("Failed to read tool call from stdin")?,
                };
                let call = ToolCall::parse(&raw).context("Invalid tool call JSON")?;
                emit(session.service.call_tool(call).await)
            }
        }
    }
}

struct Session {
    config: Config,
    service: MeteoService,
}

impl Session {
    fn city_query(&self, args: CityArgs) -> CityQuery {
        CityQuery::new(args.city)
            .with_count(args.count)
            .with_language(args.language.unwrap_or_else(|| self.config.language.clone()))
    }

    /// Resolve the location to a point, plus the city name used for weather-code
    /// classification (empty for raw coordinates).
    async fn locate(&self, location: LocationArgs) -> anyhow::Result<Option<(GeoPoint, String)>> {
        match (location.city, location.lat, location.lon) {
            (Some(city), _, _) => {
                let query = CityQuery::new(city.clone()).with_language(self.config.language.clone());
                let point = self.service.lat_long_from_city(&query).await;
                debug!(%city, ?point, "Resolved city");
                Ok(point.map(|point| (point, city)))
            }
            (None, Some(lat), Some(lon)) => Ok(Some((GeoPoint::new(lat, lon), String::new()))),
            _ => Err(anyhow!("Pass either --city or both --lat and --lon")),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    config.language = Text::new("Geocoding result language:")
        .with_default(&config.language)
        .prompt()?;

    config.http.retries = CustomType::<u32>::new("Retries after a failed request:")
        .with_default(config.http.retries)
        .prompt()?;

    config.http.backoff_factor = CustomType::<f64>::new("Backoff factor in seconds:")
        .with_default(config.http.backoff_factor)
        .with_help_message("Retry n waits backoff_factor * 2^n seconds")
        .prompt()?;

    config.http.cache_enabled = Confirm::new("Cache responses on disk?")
        .with_default(config.http.cache_enabled)
        .prompt()?;

    if config.http.cache_enabled {
        config.http.cache_expire_secs = CustomType::<u64>::new("Cache lifetime in seconds:")
            .with_default(config.http.cache_expire_secs)
            .prompt()?;
    }

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

/// Pretty JSON on stdout, or a short notice when there is nothing to show.
fn emit<T: Serialize>(result: Option<T>) -> anyhow::Result<()> {
    match result {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => println!("No data available."),
    }
    Ok(())
}
