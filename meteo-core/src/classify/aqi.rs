use std::fmt;

use serde::Serialize;

pub const INVALID_AQI: &str = "Invalid AQI value";

/// European AQI bands. Each band is half-open at its upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EuropeanAqi {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
    ExtremelyPoor,
}

impl EuropeanAqi {
    /// `None` for negative or NaN values.
    pub fn from_value(aqi: f64) -> Option<Self> {
        let band = match aqi {
            v if (0.0..20.0).contains(&v) => Self::Good,
            v if (20.0..40.0).contains(&v) => Self::Fair,
            v if (40.0..60.0).contains(&v) => Self::Moderate,
            v if (60.0..80.0).contains(&v) => Self::Poor,
            v if (80.0..100.0).contains(&v) => Self::VeryPoor,
            v if v >= 100.0 => Self::ExtremelyPoor,
            _ => return None,
        };
        Some(band)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
            Self::ExtremelyPoor => "Extremely Poor",
        }
    }
}

impl fmt::Display for EuropeanAqi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// US AQI bands. Bands are closed and follow the EPA integer breakpoints, so
/// fractional values between two bands (e.g. 50.5) fall outside all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UsAqi {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl UsAqi {
    /// `None` outside `[0, 500]`, for NaN, and in the gaps between bands.
    pub fn from_value(aqi: f64) -> Option<Self> {
        let band = match aqi {
            v if (0.0..=50.0).contains(&v) => Self::Good,
            v if (51.0..=100.0).contains(&v) => Self::Moderate,
            v if (101.0..=150.0).contains(&v) => Self::UnhealthyForSensitiveGroups,
            v if (151.0..=200.0).contains(&v) => Self::Unhealthy,
            v if (201.0..=300.0).contains(&v) => Self::VeryUnhealthy,
            v if (301.0..=500.0).contains(&v) => Self::Hazardous,
            _ => return None,
        };
        Some(band)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}

impl fmt::Display for UsAqi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn describe_european_aqi(aqi: f64) -> &'static str {
    EuropeanAqi::from_value(aqi).map_or(INVALID_AQI, EuropeanAqi::label)
}

pub fn describe_us_aqi(aqi: f64) -> &'static str {
    UsAqi::from_value(aqi).map_or(INVALID_AQI, UsAqi::label)
}
