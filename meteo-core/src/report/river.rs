use chrono::NaiveDate;
use serde::Serialize;

use super::{day_label, no_data, with_unit};
use crate::{error::MeteoError, series::TimeSeries};

pub const DAILY_CHANNELS: [&str; 1] = ["river_discharge"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiverDischargeReport {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "River discharge")]
    pub discharge: String,
}

/// Daily river discharge on `date`.
pub fn river_discharge(
    series: &TimeSeries,
    date: NaiveDate,
) -> Result<Option<RiverDischargeReport>, MeteoError> {
    let Some(row) = series.first_row_on(date) else {
        return no_data(day_label(date));
    };

    Ok(Some(RiverDischargeReport {
        date: day_label(date),
        discharge: with_unit(row.value("river_discharge")?, "m³/s"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::{at, day, series};

    fn discharge_series() -> TimeSeries {
        series(
            vec![at(2024, 3, 4, 0), at(2024, 3, 5, 0), at(2024, 3, 6, 0)],
            &[("river_discharge", vec![101.25, 98.123456, 97.0])],
        )
    }

    #[test]
    fn renders_discharge_for_matching_day() {
        let report = river_discharge(&discharge_series(), day(2024, 3, 5))
            .expect("well-formed")
            .expect("row exists");

        assert_eq!(report.date, "05-03-2024");
        assert_eq!(report.discharge, "98.1235 m³/s");
    }

    #[test]
    fn day_outside_window_is_absent() {
        let outcome = river_discharge(&discharge_series(), day(2025, 1, 1)).expect("well-formed");
        assert!(outcome.is_none());
    }

    #[test]
    fn missing_channel_is_an_error() {
        let bare = series(vec![at(2024, 3, 5, 0)], &[]);
        assert!(matches!(
            river_discharge(&bare, day(2024, 3, 5)),
            Err(MeteoError::MissingChannel(_))
        ));
    }

    #[test]
    fn serializes_with_readable_keys() {
        let report = river_discharge(&discharge_series(), day(2024, 3, 4))
            .expect("well-formed")
            .expect("row exists");

        let json = serde_json::to_value(report).expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({ "Date": "04-03-2024", "River discharge": "101.2500 m³/s" })
        );
    }
}
