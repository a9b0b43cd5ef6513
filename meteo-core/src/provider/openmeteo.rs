use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    config::{Config, Endpoints, HttpConfig},
    error::MeteoError,
    provider::{Endpoint, MeteoSource, Query, cache::ResponseCache},
};

/// Longest single sleep between attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(120);

/// HTTP client for the Open-Meteo family of APIs, with an optional response
/// cache in front and transient-failure retries in the middleware stack.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: ClientWithMiddleware,
    endpoints: Endpoints,
    cache: Option<ResponseCache>,
}

impl OpenMeteoClient {
    pub fn new(config: &Config) -> Result<Self, MeteoError> {
        let inner = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()
            .map_err(MeteoError::Client)?;

        let http = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy(&config.http)))
            .build();

        let cache = if config.http.cache_enabled {
            match config.cache_dir() {
                Ok(dir) => Some(ResponseCache::new(
                    dir,
                    Duration::from_secs(config.http.cache_expire_secs),
                )),
                Err(err) => {
                    warn!(error = %err, "No cache directory available; caching disabled");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            http,
            endpoints: config.endpoints.clone(),
            cache,
        })
    }

    /// Full request URL, also used as the cache key.
    pub fn url_for(&self, query: &Query) -> Result<Url, MeteoError> {
        let endpoint = query.endpoint();
        Url::parse_with_params(self.endpoints.url(endpoint), query.params()).map_err(|e| {
            MeteoError::InvalidUrl {
                endpoint,
                message: e.to_string(),
            }
        })
    }

    async fn fetch_body(&self, endpoint: Endpoint, url: &Url) -> Result<String, MeteoError> {
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| MeteoError::Request { endpoint, source })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| MeteoError::Request {
            endpoint,
            source: source.into(),
        })?;

        if !status.is_success() {
            return Err(MeteoError::Status {
                endpoint,
                status: status.as_u16(),
                reason: error_reason(&body),
            });
        }

        Ok(body)
    }
}

/// Retry `n` (0-based) waits up to `backoff_factor * 2^n` seconds, capped.
fn retry_policy(http: &HttpConfig) -> ExponentialBackoff {
    let min = Duration::try_from_secs_f64(http.backoff_factor.max(0.0))
        .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF));

    ExponentialBackoff::builder()
        .retry_bounds(min, MAX_BACKOFF)
        .base(2)
        .build_with_max_retries(http.retries)
}

#[async_trait]
impl MeteoSource for OpenMeteoClient {
    #[instrument(skip(self, query), fields(endpoint = %query.endpoint()))]
    async fn get_json(&self, query: &Query) -> Result<Value, MeteoError> {
        let endpoint = query.endpoint();
        let url = self.url_for(query)?;

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(url.as_str()).await {
                debug!(url = %url, "Serving Open-Meteo response from cache");
                return Ok(hit);
            }
        }

        debug!(url = %url, "Fetching from Open-Meteo");
        let body = self.fetch_body(endpoint, &url).await?;

        let value: Value = serde_json::from_str(&body)
            .map_err(|source| MeteoError::Decode { endpoint, source })?;

        if let Some(cache) = &self.cache {
            cache.put(url.as_str(), &body).await;
        }

        Ok(value)
    }
}

/// Open-Meteo reports failures as `{"error": true, "reason": "..."}`.
fn error_reason(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("reason").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| truncate_body(body))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeoPoint;

    fn client() -> OpenMeteoClient {
        let mut cfg = Config::default();
        cfg.http.cache_enabled = false;
        OpenMeteoClient::new(&cfg).expect("client creation should succeed")
    }

    #[test]
    fn url_encodes_params_in_order() {
        let query = Query::at(Endpoint::Flood, GeoPoint::new(59.91, 10.75))
            .param("daily", "river_discharge")
            .param("past_days", 92);

        let url = client().url_for(&query).expect("valid url");
        assert_eq!(
            url.as_str(),
            "https://flood-api.open-meteo.com/v1/flood?latitude=59.91&longitude=10.75\
             &timeformat=unixtime&daily=river_discharge&past_days=92"
        );
    }

    #[test]
    fn non_ascii_params_survive_encoding() {
        let query = Query::new(Endpoint::Geocoding).param("name", "São Paulo");
        let url = client().url_for(&query).expect("valid url");

        let (_, name) = url.query_pairs().next().expect("one pair");
        assert_eq!(name, "São Paulo");
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let mut cfg = Config::default();
        cfg.http.cache_enabled = false;
        cfg.endpoints.marine = "not a url".into();
        let client = OpenMeteoClient::new(&cfg).expect("client");

        let err = client.url_for(&Query::new(Endpoint::Marine)).unwrap_err();
        assert!(matches!(err, MeteoError::InvalidUrl { endpoint: Endpoint::Marine, .. }));
    }

    #[test]
    fn out_of_range_backoff_factors_still_build_a_policy() {
        for backoff_factor in [-1.0, 0.0, f64::NAN, 1e30] {
            let http = HttpConfig {
                backoff_factor,
                ..HttpConfig::default()
            };
            let _ = retry_policy(&http);
        }
    }

    #[test]
    fn reason_is_extracted_from_error_body() {
        let body = r#"{"error":true,"reason":"Latitude must be in range of -90 to 90°. Given: 100.0."}"#;
        assert!(error_reason(body).starts_with("Latitude must be in range"));
    }

    #[test]
    fn non_json_error_body_is_truncated() {
        let body = "é".repeat(500);
        let reason = error_reason(&body);
        assert!(reason.ends_with("..."));
        assert_eq!(reason.chars().count(), 203);
    }
}
