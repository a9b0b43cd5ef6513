use serde::Serialize;

use super::{no_data, with_unit};
use crate::{
    error::MeteoError,
    series::{Row, TimeSeries},
};

pub const DAILY_CHANNELS: [&str; 3] =
    ["temperature_2m_max", "temperature_2m_min", "precipitation_sum"];
pub const MODEL: &str = "MRI_AGCM3_2_S";
pub const START_DATE: &str = "1950-01-01";
pub const END_DATE: &str = "2050-12-31";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateReport {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Temperature Max")]
    pub temperature_max: String,
    #[serde(rename = "Temperature Min")]
    pub temperature_min: String,
    #[serde(rename = "Precipitation Sum")]
    pub precipitation_sum: String,
}

/// Yearly aggregate: mean daily max/min temperature and total precipitation.
///
/// Null days are skipped; a channel with no values at all in the year is an
/// error.
pub fn climate_summary(series: &TimeSeries, year: i32) -> Result<Option<ClimateReport>, MeteoError> {
    let rows: Vec<Row<'_>> = series.rows_in_year(year).collect();
    if rows.is_empty() {
        return no_data(format!("the year {year}"));
    }

    let max = present_values(&rows, "temperature_2m_max", year)?;
    let min = present_values(&rows, "temperature_2m_min", year)?;
    let precipitation = present_values(&rows, "precipitation_sum", year)?;

    Ok(Some(ClimateReport {
        year,
        temperature_max: with_unit(mean(&max), "°C"),
        temperature_min: with_unit(mean(&min), "°C"),
        precipitation_sum: with_unit(precipitation.iter().sum(), "mm"),
    }))
}

fn present_values(rows: &[Row<'_>], channel: &str, year: i32) -> Result<Vec<f64>, MeteoError> {
    let values = rows
        .iter()
        .filter_map(|row| row.optional(channel).transpose())
        .collect::<Result<Vec<_>, _>>()?;

    if values.is_empty() {
        return Err(MeteoError::EmptyAggregate {
            channel: channel.to_string(),
            year,
        });
    }
    Ok(values)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::at;

    fn climate_series() -> TimeSeries {
        TimeSeries::new(vec![
            at(2049, 12, 31, 0),
            at(2050, 1, 1, 0),
            at(2050, 1, 2, 0),
            at(2050, 1, 3, 0),
        ])
        .with_channel("temperature_2m_max", vec![Some(-5.0), Some(10.0), Some(12.0), None])
        .and_then(|s| {
            s.with_channel("temperature_2m_min", vec![Some(-9.0), Some(1.0), Some(2.5), Some(3.0)])
        })
        .and_then(|s| {
            s.with_channel("precipitation_sum", vec![Some(40.0), Some(0.5), Some(1.25), Some(0.0)])
        })
        .expect("consistent channels")
    }

    #[test]
    fn aggregates_only_the_requested_year() {
        let report = climate_summary(&climate_series(), 2050)
            .expect("well-formed")
            .expect("year present");

        assert_eq!(report.year, 2050);
        assert_eq!(report.temperature_max, "11.0000 °C");
        assert_eq!(report.temperature_min, "2.1667 °C");
        assert_eq!(report.precipitation_sum, "1.7500 mm");
    }

    #[test]
    fn year_without_rows_is_absent() {
        assert!(climate_summary(&climate_series(), 2051).expect("well-formed").is_none());
    }

    #[test]
    fn all_null_channel_is_an_error() {
        let series = TimeSeries::new(vec![at(2030, 1, 1, 0)])
            .with_channel("temperature_2m_max", vec![None])
            .and_then(|s| s.with_channel("temperature_2m_min", vec![Some(1.0)]))
            .and_then(|s| s.with_channel("precipitation_sum", vec![Some(1.0)]))
            .expect("consistent channels");

        assert!(matches!(
            climate_summary(&series, 2030),
            Err(MeteoError::EmptyAggregate { year: 2030, .. })
        ));
    }

    #[test]
    fn serializes_year_as_number() {
        let report = climate_summary(&climate_series(), 2049)
            .expect("well-formed")
            .expect("year present");

        let json = serde_json::to_value(report).expect("serializable");
        assert_eq!(json["Year"], 2049);
        assert_eq!(json["Precipitation Sum"], "40.0000 mm");
    }
}
