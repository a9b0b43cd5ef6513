use serde::{Deserialize, Serialize};

/// Coordinates passed through to the provider unchecked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A city-name lookup against the geocoding API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityQuery {
    pub name: String,
    pub count: u32,
    pub language: String,
    pub format: String,
}

impl CityQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 1,
            language: "en".to_string(),
            format: "json".to_string(),
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    /// Absent when nothing matched.
    #[serde(default)]
    pub results: Vec<Place>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Place {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityInfo {
    #[serde(rename = "City Name")]
    pub name: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Population")]
    pub population: Option<u64>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "Country Code")]
    pub country_code: Option<String>,
    #[serde(rename = "Elevation")]
    pub elevation: Option<f64>,
    #[serde(rename = "Timezone")]
    pub timezone: Option<String>,
}

impl From<Place> for CityInfo {
    fn from(place: Place) -> Self {
        Self {
            name: place.name,
            latitude: place.latitude,
            longitude: place.longitude,
            population: place.population,
            country: place.country,
            country_code: place.country_code,
            elevation: place.elevation,
            timezone: place.timezone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_query_defaults() {
        let query = CityQuery::new("Berlin");
        assert_eq!(query.count, 1);
        assert_eq!(query.language, "en");
        assert_eq!(query.format, "json");

        let query = query.with_count(3).with_language("de");
        assert_eq!(query.count, 3);
        assert_eq!(query.language, "de");
    }

    #[test]
    fn empty_geocode_response_has_no_results() {
        let parsed: GeocodeResponse =
            serde_json::from_str(r#"{"generationtime_ms": 0.5}"#).expect("valid json");
        assert!(parsed.results.is_empty());
    }

    #[test]
    fn city_info_uses_readable_keys() {
        let place: Place = serde_json::from_value(serde_json::json!({
            "id": 2950159,
            "name": "Berlin",
            "latitude": 52.52437,
            "longitude": 13.41053,
            "elevation": 74.0,
            "country_code": "DE",
            "timezone": "Europe/Berlin",
            "population": 3426354,
            "country": "Germany"
        }))
        .expect("valid place");

        let json = serde_json::to_value(CityInfo::from(place)).expect("serializable");
        assert_eq!(json["City Name"], "Berlin");
        assert_eq!(json["Country Code"], "DE");
        assert_eq!(json["Population"], 3426354);
        assert_eq!(json["Timezone"], "Europe/Berlin");
    }
}
