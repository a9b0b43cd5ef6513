use chrono::NaiveDate;
use serde::Serialize;

use super::{day_label, no_data, round4};
use crate::{
    classify::{UNKNOWN_WEATHER_CODE, code_from_value, describe_weather_code},
    error::MeteoError,
    series::{ApiResponse, LocalZone, Row},
};

pub const CURRENT_CHANNELS: [&str; 13] = [
    "temperature_2m",
    "relative_humidity_2m",
    "is_day",
    "precipitation",
    "rain",
    "showers",
    "snowfall",
    "weather_code",
    "cloud_cover",
    "surface_pressure",
    "wind_speed_10m",
    "wind_direction_10m",
    "wind_gusts_10m",
];

pub const DAILY_CHANNELS: [&str; 20] = [
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "sunrise",
    "sunset",
    "daylight_duration",
    "sunshine_duration",
    "uv_index_max",
    "uv_index_clear_sky_max",
    "precipitation_sum",
    "rain_sum",
    "showers_sum",
    "snowfall_sum",
    "precipitation_hours",
    "precipitation_probability_max",
    "wind_speed_10m_max",
    "wind_gusts_10m_max",
    "wind_direction_10m_dominant",
    "shortwave_radiation_sum",
    "et0_fao_evapotranspiration",
];

/// A rounded reading with its unit, e.g. `{"value": 12.5, "unit": "°C"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub value: f64,
    pub unit: &'static str,
}

impl Measurement {
    pub fn new(value: f64, unit: &'static str) -> Self {
        Self {
            value: round4(value),
            unit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeatherReport {
    pub date: String,
    pub time: String,
    pub day_or_night: &'static str,
    pub coordinates: Coordinates,
    pub elevation: Option<Measurement>,
    pub temperature_2m: Measurement,
    pub relative_humidity_2m: Measurement,
    pub precipitation: Measurement,
    pub rain: Measurement,
    pub showers: Measurement,
    pub snowfall: Measurement,
    pub weather_code: Option<i64>,
    pub weather_description: &'static str,
    pub cloud_cover: Measurement,
    pub surface_pressure: Measurement,
    pub wind_speed_10m: Measurement,
    pub wind_direction_10m: Measurement,
    pub wind_gusts_10m: Measurement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyWeatherReport {
    #[serde(rename = "Weather data for the target date")]
    pub date: String,
    #[serde(rename = "Weather Code")]
    pub weather_code: &'static str,
    #[serde(rename = "Max Temperature")]
    pub temperature_max: String,
    #[serde(rename = "Min Temperature")]
    pub temperature_min: String,
    #[serde(rename = "Sunrise")]
    pub sunrise: String,
    #[serde(rename = "Sunset")]
    pub sunset: String,
    #[serde(rename = "Daylight Duration")]
    pub daylight_duration: String,
    #[serde(rename = "Sunshine Duration")]
    pub sunshine_duration: String,
    #[serde(rename = "UV Index Max")]
    pub uv_index_max: String,
    #[serde(rename = "UV Index Clear Sky Max")]
    pub uv_index_clear_sky_max: String,
    #[serde(rename = "Precipitation Sum")]
    pub precipitation_sum: String,
    #[serde(rename = "Rain Sum")]
    pub rain_sum: String,
    #[serde(rename = "Showers Sum")]
    pub showers_sum: String,
    #[serde(rename = "Snowfall Sum")]
    pub snowfall_sum: String,
    #[serde(rename = "Precipitation Hours")]
    pub precipitation_hours: String,
    #[serde(rename = "Precipitation Probability Max")]
    pub precipitation_probability_max: String,
    #[serde(rename = "Wind Speed 10m Max")]
    pub wind_speed_max: String,
    #[serde(rename = "Wind Gusts 10m Max")]
    pub wind_gusts_max: String,
    #[serde(rename = "Wind Direction 10m Dominant")]
    pub wind_direction_dominant: String,
    #[serde(rename = "Shortwave Radiation Sum")]
    pub shortwave_radiation_sum: String,
    #[serde(rename = "ET0 FAO Evapotranspiration")]
    pub et0_fao_evapotranspiration: String,
}

/// Current conditions from a forecast response with a `current` block.
///
/// Date and time are the observation's local wall clock at the location. The
/// weather code is described for `city`, which gates the hail codes.
pub fn current_weather(
    response: &ApiResponse,
    city: &str,
) -> Result<Option<CurrentWeatherReport>, MeteoError> {
    if response.current.is_none() {
        return no_data("current conditions");
    }

    let series = response.current_series()?;
    let Some(row) = series.rows().next() else {
        return no_data("current conditions");
    };

    let measure = |channel: &str, unit: &'static str| -> Result<Measurement, MeteoError> {
        Ok(Measurement::new(row.value(channel)?, unit))
    };

    let weather_code = code_from_value(row.value("weather_code")?);
    let weather_description =
        weather_code.map_or(UNKNOWN_WEATHER_CODE, |code| describe_weather_code(code, city));

    Ok(Some(CurrentWeatherReport {
        date: row.time().format("%d-%m-%Y").to_string(),
        time: row.time().format("%H:%M:%S").to_string(),
        day_or_night: if row.value("is_day")? != 0.0 { "Day" } else { "Night" },
        coordinates: Coordinates {
            latitude: round4(response.latitude),
            longitude: round4(response.longitude),
        },
        elevation: response
            .elevation
            .filter(|e| e.is_finite())
            .map(|e| Measurement::new(e, "meters")),
        temperature_2m: measure("temperature_2m", "°C")?,
        relative_humidity_2m: measure("relative_humidity_2m", "%")?,
        precipitation: measure("precipitation", "mm")?,
        rain: measure("rain", "mm")?,
        showers: measure("showers", "mm")?,
        snowfall: measure("snowfall", "cm")?,
        weather_code,
        weather_description,
        cloud_cover: measure("cloud_cover", "%")?,
        surface_pressure: measure("surface_pressure", "hPa")?,
        wind_speed_10m: measure("wind_speed_10m", "m/s")?,
        wind_direction_10m: measure("wind_direction_10m", "degrees")?,
        wind_gusts_10m: measure("wind_gusts_10m", "m/s")?,
    }))
}

/// The extended daily record for `date`, rendered with two decimals.
pub fn daily_weather(
    response: &ApiResponse,
    date: NaiveDate,
    city: &str,
) -> Result<Option<DailyWeatherReport>, MeteoError> {
    let series = response.daily_series()?;
    let Some(row) = series.first_row_on(date) else {
        return no_data(day_label(date));
    };
    let zone = response.zone()?;

    let two = |channel: &str, unit: &str| -> Result<String, MeteoError> {
        Ok(format!("{:.2} {unit}", row.value(channel)?))
    };
    let hours = |channel: &str| -> Result<String, MeteoError> {
        Ok(format!("{:.2} hours", row.value(channel)? / 3600.0))
    };

    let weather_code = code_from_value(row.value("weather_code")?)
        .map_or(UNKNOWN_WEATHER_CODE, |code| describe_weather_code(code, city));

    Ok(Some(DailyWeatherReport {
        date: date.format("%Y-%m-%d").to_string(),
        weather_code,
        temperature_max: two("temperature_2m_max", "°C")?,
        temperature_min: two("temperature_2m_min", "°C")?,
        sunrise: clock_time(&row, "sunrise", &zone)?,
        sunset: clock_time(&row, "sunset", &zone)?,
        daylight_duration: hours("daylight_duration")?,
        sunshine_duration: hours("sunshine_duration")?,
        uv_index_max: two("uv_index_max", "(UV Index)")?,
        uv_index_clear_sky_max: two("uv_index_clear_sky_max", "(UV Index)")?,
        precipitation_sum: two("precipitation_sum", "mm")?,
        rain_sum: two("rain_sum", "mm")?,
        showers_sum: two("showers_sum", "mm")?,
        snowfall_sum: two("snowfall_sum", "cm")?,
        precipitation_hours: two("precipitation_hours", "hours")?,
        precipitation_probability_max: two("precipitation_probability_max", "%")?,
        wind_speed_max: two("wind_speed_10m_max", "m/s")?,
        wind_gusts_max: two("wind_gusts_10m_max", "m/s")?,
        wind_direction_dominant: two("wind_direction_10m_dominant", "degrees")?,
        shortwave_radiation_sum: two("shortwave_radiation_sum", "MJ/m²")?,
        et0_fao_evapotranspiration: two("et0_fao_evapotranspiration", "mm")?,
    }))
}

/// `HH:MM` at the location for a unix-timestamp channel.
fn clock_time(row: &Row<'_>, channel: &str, zone: &LocalZone) -> Result<String, MeteoError> {
    let timestamp = row.value(channel)?;
    zone.format_timestamp(timestamp)
        .map(|(_, time)| time)
        .ok_or(MeteoError::TimestampOutOfRange(timestamp as i64))
}
