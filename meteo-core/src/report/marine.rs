use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::{day_label, hour_label, instant_label, no_data, with_unit};
use crate::{error::MeteoError, series::TimeSeries};

pub const DAILY_CHANNELS: [&str; 1] = ["wave_height_max"];
pub const HOURLY_CHANNELS: [&str; 3] = ["wave_height", "wave_direction", "wave_period"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMarineReport {
    #[serde(rename = "Date and Time")]
    pub date_time: String,
    #[serde(rename = "Max Wave Height")]
    pub max_wave_height: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyMarineReport {
    #[serde(rename = "Date and Time")]
    pub date_time: String,
    #[serde(rename = "Wave Height")]
    pub wave_height: String,
    #[serde(rename = "Wave Direction")]
    pub wave_direction: String,
    #[serde(rename = "Wave Period")]
    pub wave_period: String,
}

pub fn daily_marine(
    series: &TimeSeries,
    date: NaiveDate,
) -> Result<Option<DailyMarineReport>, MeteoError> {
    let Some(row) = series.first_row_on(date) else {
        return no_data(day_label(date));
    };

    Ok(Some(DailyMarineReport {
        date_time: hour_label(date.and_time(NaiveTime::MIN)),
        max_wave_height: with_unit(row.value("wave_height_max")?, "meters"),
    }))
}

pub fn hourly_marine(
    series: &TimeSeries,
    at: NaiveDateTime,
) -> Result<Option<HourlyMarineReport>, MeteoError> {
    let Some(row) = series.row_at(at) else {
        return no_data(instant_label(at));
    };

    Ok(Some(HourlyMarineReport {
        date_time: hour_label(at),
        wave_height: with_unit(row.value("wave_height")?, "meters"),
        wave_direction: with_unit(row.value("wave_direction")?, "degrees"),
        wave_period: with_unit(row.value("wave_period")?, "seconds"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::{at, day, series};

    #[test]
    fn daily_report_for_matching_day() {
        let daily = series(
            vec![at(2024, 7, 1, 0), at(2024, 7, 2, 0)],
            &[("wave_height_max", vec![1.5, 2.25])],
        );

        let report = daily_marine(&daily, day(2024, 7, 2))
            .expect("well-formed")
            .expect("row exists");
        assert_eq!(report.date_time, "2024-07-02 at 00:00");
        assert_eq!(report.max_wave_height, "2.2500 meters");
        assert_eq!(
            serde_json::to_value(&report).expect("serializable"),
            serde_json::json!({ "Date and Time": "2024-07-02 at 00:00", "Max Wave Height": "2.2500 meters" })
        );

        assert!(daily_marine(&daily, day(2024, 7, 3)).expect("well-formed").is_none());
    }

    #[test]
    fn hourly_report_uses_the_exact_hour() {
        let hourly = series(
            vec![at(2024, 7, 1, 0), at(2024, 7, 1, 1), at(2024, 7, 1, 2)],
            &[
                ("wave_height", vec![0.5, 0.6, 0.7]),
                ("wave_direction", vec![270.0, 265.0, 260.0]),
                ("wave_period", vec![4.1, 4.2, 4.3]),
            ],
        );

        let report = hourly_marine(&hourly, at(2024, 7, 1, 1))
            .expect("well-formed")
            .expect("row exists");

        assert_eq!(report.date_time, "2024-07-01 at 01:00");
        assert_eq!(report.wave_height, "0.6000 meters");
        assert_eq!(report.wave_direction, "265.0000 degrees");
        assert_eq!(report.wave_period, "4.2000 seconds");
    }

    #[test]
    fn hourly_report_absent_outside_window() {
        let hourly = series(vec![at(2024, 7, 1, 0)], &[("wave_height", vec![0.5])]);
        assert!(hourly_marine(&hourly, at(2024, 7, 2, 0)).expect("well-formed").is_none());
    }
}
