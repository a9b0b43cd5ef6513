//! Decoded provider payloads and the time-indexed view the formatters work on.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::{error::MeteoError, time::format_timestamp};

/// Body of a forecast/flood/air-quality/marine/climate response requested
/// with `timeformat=unixtime`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default)]
    pub utc_offset_seconds: i64,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub current: Option<CurrentBlock>,
    #[serde(default)]
    pub hourly: Option<SeriesBlock>,
    #[serde(default)]
    pub daily: Option<SeriesBlock>,
}

/// A `hourly` or `daily` block: one unix time axis plus named channels.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesBlock {
    pub time: Vec<i64>,
    #[serde(flatten)]
    pub channels: HashMap<String, Vec<Option<f64>>>,
}

/// The `current` block: a single observation covering `interval` seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentBlock {
    pub time: i64,
    #[serde(default)]
    pub interval: i64,
    #[serde(flatten)]
    pub channels: HashMap<String, Option<f64>>,
}

impl ApiResponse {
    pub fn offset(&self) -> Result<FixedOffset, MeteoError> {
        i32::try_from(self.utc_offset_seconds)
            .ok()
            .and_then(FixedOffset::east_opt)
            .ok_or(MeteoError::InvalidOffset(self.utc_offset_seconds))
    }

    /// The location's time zone. `utc_offset_seconds` only describes the
    /// offset at fetch time, so it is used only when the zone name is absent
    /// or unknown.
    pub fn zone(&self) -> Result<LocalZone, MeteoError> {
        match self.timezone.as_deref().map(str::parse::<Tz>) {
            Some(Ok(tz)) => Ok(LocalZone::Named(tz)),
            _ => self.offset().map(LocalZone::Fixed),
        }
    }

    pub fn hourly_series(&self) -> Result<TimeSeries, MeteoError> {
        let block = self.hourly.as_ref().ok_or(MeteoError::MissingBlock("hourly"))?;
        TimeSeries::from_block(block, &self.zone()?)
    }

    pub fn daily_series(&self) -> Result<TimeSeries, MeteoError> {
        let block = self.daily.as_ref().ok_or(MeteoError::MissingBlock("daily"))?;
        TimeSeries::from_block(block, &self.zone()?)
    }

    /// The `current` block as a one-row series.
    pub fn current_series(&self) -> Result<TimeSeries, MeteoError> {
        let block = self.current.as_ref().ok_or(MeteoError::MissingBlock("current"))?;
        let at = self.zone()?.local_time(block.time)?;

        block
            .channels
            .iter()
            .try_fold(TimeSeries::new(vec![at]), |series, (name, value)| {
                series.with_channel(name.clone(), vec![*value])
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl LocalZone {
    /// Wall-clock time at the response location, with the offset in force at
    /// that instant.
    pub fn local_time(&self, unix: i64) -> Result<NaiveDateTime, MeteoError> {
        let utc = DateTime::from_timestamp(unix, 0)
            .map(|dt| dt.naive_utc())
            .ok_or(MeteoError::TimestampOutOfRange(unix))?;
        let offset = match self {
            LocalZone::Named(tz) => tz.offset_from_utc_datetime(&utc).fix(),
            LocalZone::Fixed(offset) => *offset,
        };

        utc.checked_add_signed(TimeDelta::seconds(offset.local_minus_utc().into()))
            .ok_or(MeteoError::TimestampOutOfRange(unix))
    }

    pub fn format_timestamp(&self, timestamp: f64) -> Option<(String, String)> {
        match self {
            LocalZone::Named(tz) => format_timestamp(timestamp, tz),
            LocalZone::Fixed(offset) => format_timestamp(timestamp, offset),
        }
    }
}

/// A table indexed by local timestamp with one column per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    times: Vec<NaiveDateTime>,
    channels: HashMap<String, Vec<Option<f64>>>,
}

impl TimeSeries {
    pub fn new(times: Vec<NaiveDateTime>) -> Self {
        Self {
            times,
            channels: HashMap::new(),
        }
    }

    /// Add a channel; its length must match the time axis.
    pub fn with_channel(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<Self, MeteoError> {
        let name = name.into();
        if values.len() != self.times.len() {
            return Err(MeteoError::RaggedChannel {
                channel: name,
                expected: self.times.len(),
                found: values.len(),
            });
        }
        self.channels.insert(name, values);
        Ok(self)
    }

    pub fn from_block(block: &SeriesBlock, zone: &LocalZone) -> Result<Self, MeteoError> {
        let times = block
            .time
            .iter()
            .map(|&unix| zone.local_time(unix))
            .collect::<Result<Vec<_>, _>>()?;

        block
            .channels
            .iter()
            .try_fold(Self::new(times), |series, (name, values)| {
                series.with_channel(name.clone(), values.clone())
            })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn channel(&self, name: &str) -> Result<&[Option<f64>], MeteoError> {
        self.channels
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| MeteoError::MissingChannel(name.to_string()))
    }

    /// The row stamped exactly `at`.
    pub fn row_at(&self, at: NaiveDateTime) -> Option<Row<'_>> {
        self.times
            .iter()
            .position(|&t| t == at)
            .map(|index| Row { series: self, index })
    }

    /// The earliest row falling on `date`.
    pub fn first_row_on(&self, date: NaiveDate) -> Option<Row<'_>> {
        self.times
            .iter()
            .position(|t| t.date() == date)
            .map(|index| Row { series: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.times.len()).map(|index| Row { series: self, index })
    }

    pub fn rows_in_year(&self, year: i32) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows().filter(move |row| row.time().year() == year)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    series: &'a TimeSeries,
    index: usize,
}

impl Row<'_> {
    pub fn time(&self) -> NaiveDateTime {
        self.series.times[self.index]
    }

    /// A finite value for `channel` in this row.
    pub fn value(&self, channel: &str) -> Result<f64, MeteoError> {
        self.optional(channel)?
            .ok_or_else(|| MeteoError::MissingValue {
                channel: channel.to_string(),
                at: self.time(),
            })
    }

    /// Like [`Row::value`], but a null cell is `Ok(None)`.
    pub fn optional(&self, channel: &str) -> Result<Option<f64>, MeteoError> {
        let values = self.series.channel(channel)?;
        Ok(values[self.index].filter(|v| v.is_finite()))
    }
}
