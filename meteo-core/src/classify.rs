//! Fixed lookup tables that turn raw provider values into readable labels.

pub mod aqi;
pub mod weather_code;

pub use aqi::{EuropeanAqi, INVALID_AQI, UsAqi, describe_european_aqi, describe_us_aqi};
pub use weather_code::{
    CENTRAL_EUROPE_CITIES, HAIL_UNAVAILABLE, KNOWN_CODES, UNKNOWN_WEATHER_CODE, code_from_value,
    describe_weather_code,
};
