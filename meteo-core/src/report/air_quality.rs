use chrono::NaiveDateTime;
use serde::Serialize;

use super::{hour_label, instant_label, no_data, plain, with_unit};
use crate::{
    classify::{describe_european_aqi, describe_us_aqi},
    error::MeteoError,
    series::TimeSeries,
};

pub const HOURLY_CHANNELS: [&str; 4] = ["pm10", "pm2_5", "aerosol_optical_depth", "dust"];
pub const CURRENT_CHANNELS: [&str; 2] = ["european_aqi", "us_aqi"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQualityReport {
    #[serde(rename = "Date and Time")]
    pub date_time: String,
    #[serde(rename = "PM 10")]
    pub pm10: String,
    #[serde(rename = "PM 2.5")]
    pub pm2_5: String,
    #[serde(rename = "Aerosol Optical Depth")]
    pub aerosol_optical_depth: String,
    #[serde(rename = "Dust")]
    pub dust: String,
}

/// Both AQI readings with their band under the matching standard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AqiSummary {
    #[serde(rename = "Date and Time")]
    pub date_time: String,
    #[serde(rename = "European AQI")]
    pub european: String,
    #[serde(rename = "US AQI")]
    pub us: String,
}

/// Particulate readings for the hour `at`.
pub fn air_quality(
    series: &TimeSeries,
    at: NaiveDateTime,
) -> Result<Option<AirQualityReport>, MeteoError> {
    let Some(row) = series.row_at(at) else {
        return no_data(instant_label(at));
    };

    Ok(Some(AirQualityReport {
        date_time: hour_label(at),
        pm10: with_unit(row.value("pm10")?, "µg/m³"),
        pm2_5: with_unit(row.value("pm2_5")?, "µg/m³"),
        aerosol_optical_depth: plain(row.value("aerosol_optical_depth")?),
        dust: with_unit(row.value("dust")?, "µg/m³"),
    }))
}

/// Classified European and US AQI for the hour `at`.
pub fn aqi_summary(series: &TimeSeries, at: NaiveDateTime) -> Result<Option<AqiSummary>, MeteoError> {
    let Some(row) = series.row_at(at) else {
        return no_data(instant_label(at));
    };

    let european = row.value("european_aqi")?;
    let us = row.value("us_aqi")?;

    Ok(Some(AqiSummary {
        date_time: hour_label(at),
        european: rated(european, describe_european_aqi(european)),
        us: rated(us, describe_us_aqi(us)),
    }))
}

fn rated(value: f64, band: &str) -> String {
    format!("{} and it is rated as {band}", plain(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classify::INVALID_AQI,
        report::fixtures::{at, series},
    };

    fn particulates() -> TimeSeries {
        series(
            vec![at(2024, 3, 5, 13), at(2024, 3, 5, 14)],
            &[
                ("pm10", vec![20.0, 12.34]),
                ("pm2_5", vec![9.0, 8.76543]),
                ("aerosol_optical_depth", vec![0.1, 0.23]),
                ("dust", vec![1.0, 2.0]),
            ],
        )
    }

    #[test]
    fn renders_matching_hour_with_units() {
        let report = air_quality(&particulates(), at(2024, 3, 5, 14))
            .expect("well-formed")
            .expect("row exists");

        assert_eq!(report.date_time, "2024-03-05 at 14:00");
        assert_eq!(report.pm10, "12.3400 µg/m³");
        assert_eq!(report.pm2_5, "8.7654 µg/m³");
        assert_eq!(report.aerosol_optical_depth, "0.2300");
        assert_eq!(report.dust, "2.0000 µg/m³");
    }

    #[test]
    fn hour_outside_window_is_absent() {
        let outcome = air_quality(&particulates(), at(2024, 3, 5, 15)).expect("well-formed");
        assert!(outcome.is_none());
    }

    #[test]
    fn null_reading_is_an_error() {
        let gappy = TimeSeries::new(vec![at(2024, 3, 5, 14)])
            .with_channel("pm10", vec![None])
            .expect("matching length");

        assert!(matches!(
            air_quality(&gappy, at(2024, 3, 5, 14)),
            Err(MeteoError::MissingValue { .. })
        ));
    }

    #[test]
    fn summary_classifies_both_standards() {
        let current = series(
            vec![at(2024, 3, 5, 16)],
            &[("european_aqi", vec![22.0]), ("us_aqi", vec![51.0])],
        );

        let summary = aqi_summary(&current, at(2024, 3, 5, 16))
            .expect("well-formed")
            .expect("row exists");

        assert_eq!(summary.date_time, "2024-03-05 at 16:00");
        assert_eq!(summary.european, "22.0000 and it is rated as Fair");
        assert_eq!(summary.us, "51.0000 and it is rated as Moderate");
    }

    #[test]
    fn summary_keeps_invalid_band_label() {
        let current = series(
            vec![at(2024, 3, 5, 16)],
            &[("european_aqi", vec![-3.0]), ("us_aqi", vec![600.0])],
        );

        let summary = aqi_summary(&current, at(2024, 3, 5, 16))
            .expect("well-formed")
            .expect("row exists");

        assert!(summary.european.ends_with(INVALID_AQI));
        assert!(summary.us.ends_with(INVALID_AQI));
    }

    #[test]
    fn summary_for_other_hour_is_absent() {
        let current = series(
            vec![at(2024, 3, 5, 16)],
            &[("european_aqi", vec![22.0]), ("us_aqi", vec![40.0])],
        );
        assert!(aqi_summary(&current, at(2024, 3, 5, 9)).expect("well-formed").is_none());
    }
}
