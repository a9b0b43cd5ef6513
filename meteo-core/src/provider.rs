use crate::{Config, error::MeteoError, model::GeoPoint, provider::openmeteo::OpenMeteoClient};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod cache;
pub mod openmeteo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Forecast,
    Flood,
    AirQuality,
    Marine,
    Climate,
    Geocoding,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Forecast => "forecast",
            Endpoint::Flood => "flood",
            Endpoint::AirQuality => "air-quality",
            Endpoint::Marine => "marine",
            Endpoint::Climate => "climate",
            Endpoint::Geocoding => "geocoding",
        }
    }

    pub const fn all() -> &'static [Endpoint] {
        &[
            Endpoint::Forecast,
            Endpoint::Flood,
            Endpoint::AirQuality,
            Endpoint::Marine,
            Endpoint::Climate,
            Endpoint::Geocoding,
        ]
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Endpoint {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        Endpoint::all()
            .iter()
            .copied()
            .find(|endpoint| endpoint.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown endpoint '{value}'. Supported endpoints: forecast, flood, \
                     air-quality, marine, climate, geocoding."
                )
            })
    }
}

/// One GET request: target endpoint plus ordered query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    endpoint: Endpoint,
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
        }
    }

    /// A data request for `point`; time columns come back as unix seconds.
    pub fn at(endpoint: Endpoint, point: GeoPoint) -> Self {
        Self::new(endpoint)
            .param("latitude", point.latitude)
            .param("longitude", point.longitude)
            .param("timeformat", "unixtime")
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Multi-valued parameter, sent comma-separated.
    pub fn list(self, key: &str, values: &[&str]) -> Self {
        self.param(key, values.join(","))
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Anything that can answer a [`Query`] with a JSON body.
#[async_trait]
pub trait MeteoSource: Send + Sync + Debug {
    async fn get_json(&self, query: &Query) -> Result<serde_json::Value, MeteoError>;
}

#[async_trait]
impl<T: MeteoSource + ?Sized> MeteoSource for Box<T> {
    async fn get_json(&self, query: &Query) -> Result<serde_json::Value, MeteoError> {
        (**self).get_json(query).await
    }
}

/// Construct the Open-Meteo source described by `config`.
pub fn source_from_config(config: &Config) -> anyhow::Result<Box<dyn MeteoSource>> {
    let client = OpenMeteoClient::new(config)?;
    Ok(Box::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_as_str_roundtrip() {
        for endpoint in Endpoint::all() {
            let s = endpoint.as_str();
            let parsed = Endpoint::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*endpoint, parsed);
        }
    }

    #[test]
    fn endpoint_parse_is_case_insensitive() {
        assert_eq!(Endpoint::try_from("Air-Quality").expect("known"), Endpoint::AirQuality);
    }

    #[test]
    fn unknown_endpoint_error() {
        let err = Endpoint::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown endpoint"));
    }

    #[test]
    fn query_at_seeds_location_and_unix_time() {
        let query = Query::at(Endpoint::Marine, GeoPoint::new(54.32, 10.13));

        assert_eq!(query.endpoint(), Endpoint::Marine);
        assert_eq!(query.get("latitude"), Some("54.32"));
        assert_eq!(query.get("longitude"), Some("10.13"));
        assert_eq!(query.get("timeformat"), Some("unixtime"));
    }

    #[test]
    fn list_params_are_comma_joined_in_order() {
        let query = Query::new(Endpoint::AirQuality).list("hourly", &["pm10", "pm2_5", "dust"]);
        assert_eq!(query.get("hourly"), Some("pm10,pm2_5,dust"));
        assert_eq!(query.params().len(), 1);
    }

    #[test]
    fn source_from_default_config_builds() {
        let mut cfg = Config::default();
        cfg.http.cache_enabled = false;
        assert!(source_from_config(&cfg).is_ok());
    }
}
