//! Formatters that turn a fetched series into a human-readable record.
//!
//! Every formatter returns `Ok(None)` when the series has no row for the
//! requested target; that outcome is expected, since provider windows are
//! finite. Malformed or missing cells in a matched row are errors.

pub mod air_quality;
pub mod climate;
pub mod marine;
pub mod river;
pub mod weather;

pub use air_quality::{AirQualityReport, AqiSummary};
pub use climate::ClimateReport;
pub use marine::{DailyMarineReport, HourlyMarineReport};
pub use river::RiverDischargeReport;
pub use weather::{CurrentWeatherReport, DailyWeatherReport, Measurement};

use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::error::MeteoError;

/// `12.3400 µg/m³`
pub(crate) fn with_unit(value: f64, unit: &str) -> String {
    format!("{value:.4} {unit}")
}

pub(crate) fn plain(value: f64) -> String {
    format!("{value:.4}")
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

pub(crate) fn day_label(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

pub(crate) fn hour_label(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d at %H:%M").to_string()
}

pub(crate) fn instant_label(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub(crate) fn no_data<T>(requested: impl Display) -> Result<Option<T>, MeteoError> {
    info!(%requested, "No data available for {requested}");
    Ok(None)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_render_with_four_decimals() {
        assert_eq!(with_unit(12.34, "µg/m³"), "12.3400 µg/m³");
        assert_eq!(with_unit(0.123456, "m"), "0.1235 m");
        assert_eq!(plain(3.0), "3.0000");
    }

    #[test]
    fn rounding_keeps_four_decimals() {
        assert_eq!(round4(1.23456), 1.2346);
        assert_eq!(round4(-0.00004), -0.0);
        assert_eq!(round4(52.52), 52.52);
    }

    #[test]
    fn labels_follow_display_conventions() {
        let at = fixtures::at(2024, 3, 5, 14);
        assert_eq!(day_label(at.date()), "05-03-2024");
        assert_eq!(hour_label(at), "2024-03-05 at 14:00");
        assert_eq!(instant_label(at), "2024-03-05 14:00:00");
    }
}
