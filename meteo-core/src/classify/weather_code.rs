/// Cities for which hail thunderstorm codes are reported as-is.
///
/// Matching is exact and case-sensitive.
pub const CENTRAL_EUROPE_CITIES: [&str; 18] = [
    "Berlin",
    "Vienna",
    "Prague",
    "Budapest",
    "Warsaw",
    "Bratislava",
    "Ljubljana",
    "Zagreb",
    "Munich",
    "Frankfurt",
    "Zurich",
    "Geneva",
    "Milan",
    "Rome",
    "Madrid",
    "Paris",
    "Brussels",
    "Amsterdam",
];

pub const HAIL_UNAVAILABLE: &str =
    "Thunderstorm with hail warning is not available outside Central Europe";

pub const UNKNOWN_WEATHER_CODE: &str = "Unknown weather code";

/// Every WMO code the table knows about, in ascending order.
pub const KNOWN_CODES: [i64; 28] = [
    0, 1, 2, 3, 45, 48, 51, 53, 55, 56, 57, 61, 63, 65, 66, 67, 71, 73, 75, 77, 80, 81, 82, 85,
    86, 95, 96, 99,
];

const HAIL_CODES: [i64; 3] = [95, 96, 99];

const fn table_entry(code: i64) -> Option<&'static str> {
    let description = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Drizzle with Light intensity",
        53 => "Drizzle with Moderate intensity",
        55 => "Drizzle with Dense intensity",
        56 => "Freezing Drizzle: Light intensity",
        57 => "Freezing Drizzle: Dense intensity",
        61 => "Rain with Slight intensity",
        63 => "Rain with Moderate intensity",
        65 => "Rain with Heavy intensity",
        66 => "Freezing Rain with Light intensity",
        67 => "Freezing Rain with Heavy intensity",
        71 => "Snowfall with Slight intensity",
        73 => "Snowfall with Moderate intensity",
        75 => "Snowfall with Heavy intensity",
        77 => "Snow grains",
        80 => "Rain showers with Slight intensity",
        81 => "Rain showers with Moderate intensity",
        82 => "Rain showers with Violent intensity",
        85 => "Snow showers with Slight",
        86 => "Snow showers with Heavy",
        95 => "Thunderstorm with Slight or moderate",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => return None,
    };
    Some(description)
}

pub fn is_central_european(city: &str) -> bool {
    CENTRAL_EUROPE_CITIES.contains(&city)
}

/// Describe a WMO weather code.
///
/// Thunderstorm codes (95, 96, 99) are only described for cities on the
/// Central Europe list; everywhere else they yield [`HAIL_UNAVAILABLE`].
/// Codes outside the table yield [`UNKNOWN_WEATHER_CODE`].
pub fn describe_weather_code(code: i64, city: &str) -> &'static str {
    match table_entry(code) {
        None => UNKNOWN_WEATHER_CODE,
        Some(_) if HAIL_CODES.contains(&code) && !is_central_european(city) => HAIL_UNAVAILABLE,
        Some(description) => description,
    }
}

/// Provider channels carry codes as floats; only whole numbers are codes.
pub fn code_from_value(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}
