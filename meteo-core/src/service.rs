//! One async operation per data product: build the query, fetch, decode and
//! format. Failures never leave this layer; they are logged and the caller
//! sees `None`, exactly like a target with no data.

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::{
    config::Config,
    error::MeteoError,
    model::{CityInfo, CityQuery, GeoPoint, GeocodeResponse, Place},
    provider::{Endpoint, MeteoSource, Query, source_from_config},
    report::{
        self, AirQualityReport, AqiSummary, ClimateReport, CurrentWeatherReport,
        DailyMarineReport, DailyWeatherReport, HourlyMarineReport, RiverDischargeReport,
        air_quality, climate, marine, river, weather,
    },
    series::ApiResponse,
};

/// How far back (and, for floods, forward) the rolling windows reach.
pub const WINDOW_DAYS: u32 = 92;

#[derive(Debug)]
pub struct MeteoService<S = Box<dyn MeteoSource>> {
    source: S,
}

impl MeteoService {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(source_from_config(config)?))
    }
}

impl<S: MeteoSource> MeteoService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn lat_long_from_city(&self, city: &CityQuery) -> Option<GeoPoint> {
        let outcome = self
            .first_place(city)
            .await
            .map(|place| place.map(|p| p.point()));
        settle("lat_long_from_city", outcome)
    }

    pub async fn city_info(&self, city: &CityQuery) -> Option<CityInfo> {
        let outcome = self.first_place(city).await.map(|place| place.map(CityInfo::from));
        settle("city_info", outcome)
    }

    pub async fn daily_river_discharge(
        &self,
        point: GeoPoint,
        date: NaiveDate,
    ) -> Option<RiverDischargeReport> {
        let query = Query::at(Endpoint::Flood, point)
            .list("daily", &river::DAILY_CHANNELS)
            .param("past_days", WINDOW_DAYS)
            .param("forecast_days", WINDOW_DAYS);

        let outcome = self
            .fetch(&query)
            .await
            .and_then(|response| river::river_discharge(&response.daily_series()?, date));
        settle("daily_river_discharge", outcome)
    }

    pub async fn air_quality(&self, point: GeoPoint, at: NaiveDateTime) -> Option<AirQualityReport> {
        let query = Query::at(Endpoint::AirQuality, point)
            .list("hourly", &air_quality::HOURLY_CHANNELS)
            .param("past_days", WINDOW_DAYS);

        let outcome = self
            .fetch(&query)
            .await
            .and_then(|response| air_quality::air_quality(&response.hourly_series()?, at));
        settle("air_quality", outcome)
    }

    /// Classified European and US AQI, if the current reading is stamped `at`.
    pub async fn current_air_quality_index(
        &self,
        point: GeoPoint,
        at: NaiveDateTime,
    ) -> Option<AqiSummary> {
        let query = Query::at(Endpoint::AirQuality, point)
            .list("current", &air_quality::CURRENT_CHANNELS)
            .param("past_days", WINDOW_DAYS);

        let outcome = self
            .fetch(&query)
            .await
            .and_then(|response| air_quality::aqi_summary(&response.current_series()?, at));
        settle("current_air_quality_index", outcome)
    }

    pub async fn daily_marine(&self, point: GeoPoint, date: NaiveDate) -> Option<DailyMarineReport> {
        let query = Query::at(Endpoint::Marine, point)
            .list("daily", &marine::DAILY_CHANNELS)
            .param("timezone", "auto")
            .param("past_days", WINDOW_DAYS);

        let outcome = self
            .fetch(&query)
            .await
            .and_then(|response| marine::daily_marine(&response.daily_series()?, date));
        settle("daily_marine", outcome)
    }

    pub async fn hourly_marine(
        &self,
        point: GeoPoint,
        at: NaiveDateTime,
    ) -> Option<HourlyMarineReport> {
        let query = Query::at(Endpoint::Marine, point)
            .list("hourly", &marine::HOURLY_CHANNELS)
            .param("timezone", "auto")
            .param("past_days", WINDOW_DAYS);

        let outcome = self
            .fetch(&query)
            .await
            .and_then(|response| marine::hourly_marine(&response.hourly_series()?, at));
        settle("hourly_marine", outcome)
    }

    /// Projected yearly climate summary from the fixed downscaled model run.
    pub async fn climate_change(&self, point: GeoPoint, year: i32) -> Option<ClimateReport> {
        let query = Query::at(Endpoint::Climate, point)
            .param("start_date", climate::START_DATE)
            .param("end_date", climate::END_DATE)
            .param("models", climate::MODEL)
            .list("daily", &climate::DAILY_CHANNELS);

        let outcome = self
            .fetch(&query)
            .await
            .and_then(|response| climate::climate_summary(&response.daily_series()?, year));
        settle("climate_change", outcome)
    }

    pub async fn current_weather(&self, point: GeoPoint, city: &str) -> Option<CurrentWeatherReport> {
        let query = Query::at(Endpoint::Forecast, point)
            .list("current", &weather::CURRENT_CHANNELS)
            .param("timezone", "auto")
            .param("wind_speed_unit", "ms");

        let outcome = self
            .fetch(&query)
            .await
            .and_then(|response| weather::current_weather(&response, city));
        settle("current_weather", outcome)
    }

    pub async fn daily_weather(
        &self,
        point: GeoPoint,
        date: NaiveDate,
        city: &str,
    ) -> Option<DailyWeatherReport> {
        let query = Query::at(Endpoint::Forecast, point)
            .list("daily", &weather::DAILY_CHANNELS)
            .param("timezone", "auto")
            .param("past_days", WINDOW_DAYS)
            .param("wind_speed_unit", "ms");

        let outcome = self
            .fetch(&query)
            .await
            .and_then(|response| weather::daily_weather(&response, date, city));
        settle("daily_weather", outcome)
    }

    async fn first_place(&self, city: &CityQuery) -> Result<Option<Place>, MeteoError> {
        let query = Query::new(Endpoint::Geocoding)
            .param("name", &city.name)
            .param("count", city.count)
            .param("language", &city.language)
            .param("format", &city.format);

        let response: GeocodeResponse = self.fetch_as(&query).await?;
        match response.results.into_iter().next() {
            Some(place) => Ok(Some(place)),
            None => report::no_data(format!("city '{}'", city.name)),
        }
    }

    async fn fetch(&self, query: &Query) -> Result<ApiResponse, MeteoError> {
        self.fetch_as(query).await
    }

    async fn fetch_as<T: DeserializeOwned>(&self, query: &Query) -> Result<T, MeteoError> {
        let body = self.source.get_json(query).await?;
        serde_json::from_value(body).map_err(|source| MeteoError::Decode {
            endpoint: query.endpoint(),
            source,
        })
    }
}

/// Collapse a failure into an absent result, keeping the cause in the log.
fn settle<T>(operation: &'static str, outcome: Result<Option<T>, MeteoError>) -> Option<T> {
    match outcome {
        Ok(report) => report,
        Err(err) => {
            let err = anyhow::Error::from(err);
            warn!(operation, error = %format!("{err:#}"), "Operation failed");
            None
        }
    }
}
