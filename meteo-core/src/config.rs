use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::provider::Endpoint;

/// Request, retry and cache behaviour shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,

    /// Extra attempts after the first failed one.
    pub retries: u32,

    /// Delay before retry `n` is `backoff_factor * 2^n` seconds.
    pub backoff_factor: f64,

    pub cache_enabled: bool,
    pub cache_expire_secs: u64,

    /// Overrides the platform cache directory.
    pub cache_dir: Option<PathBuf>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retries: 5,
            backoff_factor: 0.2,
            cache_enabled: true,
            cache_expire_secs: 3600,
            cache_dir: None,
        }
    }
}

/// Base URL per provider API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub forecast: String,
    pub flood: String,
    pub air_quality: String,
    pub marine: String,
    pub climate: String,
    pub geocoding: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            forecast: "https://api.open-meteo.com/v1/forecast".to_string(),
            flood: "https://flood-api.open-meteo.com/v1/flood".to_string(),
            air_quality: "https://air-quality-api.open-meteo.com/v1/air-quality".to_string(),
            marine: "https://marine-api.open-meteo.com/v1/marine".to_string(),
            climate: "https://climate-api.open-meteo.com/v1/climate".to_string(),
            geocoding: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
        }
    }
}

impl Endpoints {
    /// All endpoints under a single host, e.g. a local mock server.
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            forecast: format!("{base}/v1/forecast"),
            flood: format!("{base}/v1/flood"),
            air_quality: format!("{base}/v1/air-quality"),
            marine: format!("{base}/v1/marine"),
            climate: format!("{base}/v1/climate"),
            geocoding: format!("{base}/v1/search"),
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Forecast => &self.forecast,
            Endpoint::Flood => &self.flood,
            Endpoint::AirQuality => &self.air_quality,
            Endpoint::Marine => &self.marine,
            Endpoint::Climate => &self.climate,
            Endpoint::Geocoding => &self.geocoding,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// language = "en"
///
/// [http]
/// retries = 5
/// backoff_factor = 0.2
/// cache_expire_secs = 3600
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language for geocoding results.
    pub language: String,
    pub http: HttpConfig,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            http: HttpConfig::default(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "meteo-tools", "meteo")
            .ok_or_else(|| anyhow!("Could not determine platform directories"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Where cached responses live.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.http.cache_dir {
            return Ok(dir.clone());
        }
        Ok(Self::project_dirs()?.cache_dir().join("http"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_public_hosts_and_retry_policy() {
        let cfg = Config::default();

        assert_eq!(cfg.language, "en");
        assert_eq!(cfg.http.retries, 5);
        assert_eq!(cfg.http.backoff_factor, 0.2);
        assert_eq!(cfg.http.cache_expire_secs, 3600);
        assert!(cfg.http.cache_enabled);
        assert_eq!(cfg.endpoints.url(Endpoint::Flood), "https://flood-api.open-meteo.com/v1/flood");
        assert_eq!(
            cfg.endpoints.url(Endpoint::Geocoding),
            "https://geocoding-api.open-meteo.com/v1/search"
        );
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let cfg = Config::from_toml_str(
            r#"
            language = "de"

            [http]
            retries = 2
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.language, "de");
        assert_eq!(cfg.http.retries, 2);
        assert_eq!(cfg.http.backoff_factor, 0.2);
        assert_eq!(cfg.endpoints, Endpoints::default());
    }

    #[test]
    fn empty_file_is_default_config() {
        let cfg = Config::from_toml_str("").expect("empty toml is valid");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let err = Config::from_toml_str("[http]\nretries = \"many\"").unwrap_err();
        assert!(err.to_string().contains("Invalid configuration TOML"));
    }

    #[test]
    fn toml_roundtrip_preserves_settings() {
        let mut cfg = Config::default();
        cfg.http.cache_dir = Some(PathBuf::from("/tmp/meteo-cache"));
        cfg.endpoints = Endpoints::rooted_at("http://127.0.0.1:9000");

        let text = toml::to_string_pretty(&cfg).expect("serializable");
        let parsed = Config::from_toml_str(&text).expect("parsable");
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn rooted_endpoints_share_one_host() {
        let endpoints = Endpoints::rooted_at("http://127.0.0.1:9000/");

        for endpoint in Endpoint::all() {
            assert!(endpoints.url(*endpoint).starts_with("http://127.0.0.1:9000/v1/"));
        }
        assert_eq!(endpoints.url(Endpoint::AirQuality), "http://127.0.0.1:9000/v1/air-quality");
    }

    #[test]
    fn explicit_cache_dir_wins() {
        let mut cfg = Config::default();
        cfg.http.cache_dir = Some(PathBuf::from("/var/cache/meteo"));
        assert_eq!(cfg.cache_dir().expect("dir"), PathBuf::from("/var/cache/meteo"));
    }
}
