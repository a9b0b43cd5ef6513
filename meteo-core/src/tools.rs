//! Function-calling front end: a tagged `ToolCall` per callable function and
//! a dispatcher that runs it against a [`MeteoService`].

use chrono::Utc;
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
    classify::{
        UNKNOWN_WEATHER_CODE, code_from_value, describe_european_aqi, describe_us_aqi,
        describe_weather_code,
    },
    model::{CityQuery, GeoPoint},
    provider::MeteoSource,
    service::MeteoService,
    time::{format_timestamp, parse_target_date, parse_target_datetime, parse_user_input},
};

/// A tool invocation as emitted by a model:
/// `{"name": "daily_river_discharge", "arguments": {...}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum ToolCall {
    GetWeatherCodeDescription(CodeArgs),
    ConvertTimestampToDateAndTime(TimestampArgs),
    GetUserInput(UserInputArgs),
    GetLatLongFromCity(CityArgs),
    ExtractCityInfo(CityArgs),
    DailyRiverDischarge(DateArgs),
    AirQualityData(DateTimeArgs),
    DescribeEuropeanAqi(AqiArgs),
    DescribeUsAqi(AqiArgs),
    DescribeCurrentAirQualityIndex(DateTimeArgs),
    DailyMarineData(DateTimeArgs),
    HourlyMarineData(DateTimeArgs),
    ClimateChangeData(YearArgs),
    DescribeCurrentWeather(CurrentWeatherArgs),
    GetTodayWeatherData(DailyWeatherArgs),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CodeArgs {
    #[serde(deserialize_with = "flexible_f64")]
    pub code: f64,
    #[serde(default)]
    pub city_location: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimestampArgs {
    #[serde(deserialize_with = "flexible_f64")]
    pub timestamp: f64,
    /// IANA zone name; empty means UTC.
    #[serde(default)]
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInputArgs {
    #[serde(deserialize_with = "flexible_text")]
    pub user_date_input: String,
    #[serde(deserialize_with = "flexible_text")]
    pub user_hour_input: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityArgs {
    pub city_name: String,
    #[serde(default = "default_count", deserialize_with = "flexible_u32")]
    pub count: u32,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_format")]
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DateArgs {
    #[serde(deserialize_with = "flexible_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "flexible_f64")]
    pub longitude: f64,
    pub target_date: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DateTimeArgs {
    #[serde(deserialize_with = "flexible_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "flexible_f64")]
    pub longitude: f64,
    pub target_datetime: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AqiArgs {
    #[serde(deserialize_with = "flexible_f64")]
    pub aqi_value: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct YearArgs {
    #[serde(deserialize_with = "flexible_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "flexible_f64")]
    pub longitude: f64,
    #[serde(deserialize_with = "flexible_i32")]
    pub target_year: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentWeatherArgs {
    #[serde(deserialize_with = "flexible_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "flexible_f64")]
    pub longitude: f64,
    #[serde(default)]
    pub city_location: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyWeatherArgs {
    #[serde(deserialize_with = "flexible_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "flexible_f64")]
    pub longitude: f64,
    pub target_date: String,
    #[serde(default)]
    pub city_location: String,
}

fn default_count() -> u32 {
    1
}

fn default_language() -> String {
    "en".to_string()
}

fn default_format() -> String {
    "json".to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Models often quote numbers (`"52.52"`); accept both forms.
fn flexible_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected a number, found '{s}'"))),
    }
}

fn flexible_whole<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let n = flexible_f64(deserializer)?;
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Ok(n as i64)
    } else {
        Err(de::Error::custom(format!("expected a whole number, found {n}")))
    }
}

fn flexible_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let n = flexible_whole(deserializer)?;
    i32::try_from(n).map_err(|_| de::Error::custom(format!("{n} is out of range")))
}

fn flexible_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let n = flexible_whole(deserializer)?;
    u32::try_from(n).map_err(|_| de::Error::custom(format!("{n} is out of range")))
}

/// Free-form inputs such as an hour may arrive as a bare number.
fn flexible_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) if n.fract() == 0.0 => format!("{n:.0}"),
        NumberOrText::Number(n) => n.to_string(),
        NumberOrText::Text(s) => s,
    })
}

impl ToolCall {
    /// Parse a tool call whose `arguments` may be an object or a JSON-encoded string.
    pub fn parse(input: &str) -> Result<Self, serde_json::Error> {
        let mut value: Value = serde_json::from_str(input)?;
        if let Some(Value::String(encoded)) = value.get("arguments") {
            let arguments: Value = serde_json::from_str(encoded)?;
            value["arguments"] = arguments;
        }
        serde_json::from_value(value)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::GetWeatherCodeDescription(_) => "get_weather_code_description",
            ToolCall::ConvertTimestampToDateAndTime(_) => "convert_timestamp_to_date_and_time",
            ToolCall::GetUserInput(_) => "get_user_input",
            ToolCall::GetLatLongFromCity(_) => "get_lat_long_from_city",
            ToolCall::ExtractCityInfo(_) => "extract_city_info",
            ToolCall::DailyRiverDischarge(_) => "daily_river_discharge",
            ToolCall::AirQualityData(_) => "air_quality_data",
            ToolCall::DescribeEuropeanAqi(_) => "describe_european_aqi",
            ToolCall::DescribeUsAqi(_) => "describe_us_aqi",
            ToolCall::DescribeCurrentAirQualityIndex(_) => "describe_current_air_quality_index",
            ToolCall::DailyMarineData(_) => "daily_marine_data",
            ToolCall::HourlyMarineData(_) => "hourly_marine_data",
            ToolCall::ClimateChangeData(_) => "climate_change_data",
            ToolCall::DescribeCurrentWeather(_) => "describe_current_weather",
            ToolCall::GetTodayWeatherData(_) => "get_today_weather_data",
        }
    }
}

impl CityArgs {
    fn query(self) -> CityQuery {
        CityQuery::new(self.city_name)
            .with_count(self.count)
            .with_language(self.language)
            .with_format(self.format)
    }
}

impl<S: MeteoSource> MeteoService<S> {
    /// Run one tool call. `None` means no result, for whatever reason; the
    /// reason is in the log.
    pub async fn call_tool(&self, call: ToolCall) -> Option<Value> {
        let tool = call.name();
        debug!(tool, "Dispatching tool call");

        match call {
            ToolCall::GetWeatherCodeDescription(args) => {
                let description = code_from_value(args.code)
                    .map_or(UNKNOWN_WEATHER_CODE, |code| {
                        describe_weather_code(code, &args.city_location)
                    });
                Some(json!(description))
            }
            ToolCall::ConvertTimestampToDateAndTime(args) => {
                convert_timestamp(args.timestamp, &args.time_zone)
            }
            ToolCall::GetUserInput(args) => {
                match parse_user_input(&args.user_date_input, &args.user_hour_input) {
                    Ok(canonical) => Some(json!(canonical)),
                    Err(err) => {
                        warn!(tool, error = %err, "Invalid user input");
                        None
                    }
                }
            }
            ToolCall::GetLatLongFromCity(args) => {
                to_json(tool, self.lat_long_from_city(&args.query()).await)
            }
            ToolCall::ExtractCityInfo(args) => to_json(tool, self.city_info(&args.query()).await),
            ToolCall::DailyRiverDischarge(args) => {
                let date = target(tool, &args.target_date, parse_target_date)?;
                let point = GeoPoint::new(args.latitude, args.longitude);
                to_json(tool, self.daily_river_discharge(point, date).await)
            }
            ToolCall::AirQualityData(args) => {
                let at = target(tool, &args.target_datetime, parse_target_datetime)?;
                to_json(tool, self.air_quality(args.point(), at).await)
            }
            ToolCall::DescribeEuropeanAqi(args) => Some(json!(describe_european_aqi(args.aqi_value))),
            ToolCall::DescribeUsAqi(args) => Some(json!(describe_us_aqi(args.aqi_value))),
            ToolCall::DescribeCurrentAirQualityIndex(args) => {
                let at = target(tool, &args.target_datetime, parse_target_datetime)?;
                to_json(tool, self.current_air_quality_index(args.point(), at).await)
            }
            ToolCall::DailyMarineData(args) => {
                let date = target(tool, &args.target_datetime, parse_target_date)?;
                to_json(tool, self.daily_marine(args.point(), date).await)
            }
            ToolCall::HourlyMarineData(args) => {
                let at = target(tool, &args.target_datetime, parse_target_datetime)?;
                to_json(tool, self.hourly_marine(args.point(), at).await)
            }
            ToolCall::ClimateChangeData(args) => {
                let point = GeoPoint::new(args.latitude, args.longitude);
                to_json(tool, self.climate_change(point, args.target_year).await)
            }
            ToolCall::DescribeCurrentWeather(args) => {
                let point = GeoPoint::new(args.latitude, args.longitude);
                to_json(tool, self.current_weather(point, &args.city_location).await)
            }
            ToolCall::GetTodayWeatherData(args) => {
                let date = target(tool, &args.target_date, parse_target_date)?;
                let point = GeoPoint::new(args.latitude, args.longitude);
                to_json(tool, self.daily_weather(point, date, &args.city_location).await)
            }
        }
    }
}

impl DateTimeArgs {
    fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// `[date, time]` for a unix timestamp in `time_zone` (UTC when empty).
fn convert_timestamp(timestamp: f64, time_zone: &str) -> Option<Value> {
    let rendered = if time_zone.trim().is_empty() {
        format_timestamp(timestamp, &Utc)
    } else {
        match time_zone.trim().parse::<Tz>() {
            Ok(zone) => format_timestamp(timestamp, &zone),
            Err(err) => {
                warn!(time_zone, error = %err, "Unknown time zone");
                return None;
            }
        }
    };

    let (date, time) = rendered?;
    Some(json!([date, time]))
}

fn target<T>(tool: &str, input: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    let parsed = parse(input);
    if parsed.is_none() {
        warn!(tool, input, "Could not parse target");
    }
    parsed
}

fn to_json<T: Serialize>(tool: &str, report: Option<T>) -> Option<Value> {
    serde_json::to_value(report?)
        .inspect_err(|err| warn!(tool, error = %err, "Failed to serialize tool result"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{classify::HAIL_UNAVAILABLE, provider::Endpoint, service::fake::FakeSource};

    fn parse(value: Value) -> ToolCall {
        ToolCall::parse(&value.to_string()).expect("valid tool call")
    }

    #[test]
    fn parses_object_arguments_with_defaults() {
        let call = parse(json!({
            "name": "get_lat_long_from_city",
            "arguments": { "city_name": "Oslo" }
        }));

        assert_eq!(
            call,
            ToolCall::GetLatLongFromCity(CityArgs {
                city_name: "Oslo".into(),
                count: 1,
                language: "en".into(),
                format: "json".into(),
            })
        );
        assert_eq!(call.name(), "get_lat_long_from_city");
    }

    #[test]
    fn parses_string_encoded_arguments_and_quoted_numbers() {
        let call = parse(json!({
            "name": "climate_change_data",
            "arguments": "{\"latitude\": \"52.52\", \"longitude\": 13.41, \"target_year\": \"2050\"}"
        }));

        assert_eq!(
            call,
            ToolCall::ClimateChangeData(YearArgs {
                latitude: 52.52,
                longitude: 13.41,
                target_year: 2050,
            })
        );
    }

    #[test]
    fn numeric_hour_becomes_text() {
        let call = parse(json!({
            "name": "get_user_input",
            "arguments": { "user_date_input": "05-03-2024", "user_hour_input": 7 }
        }));

        let ToolCall::GetUserInput(args) = call else {
            panic!("wrong variant: {call:?}");
        };
        assert_eq!(args.user_hour_input, "7");
    }

    #[test]
    fn rejects_unknown_tools_and_bad_numbers() {
        assert!(ToolCall::parse(r#"{"name": "launch_rocket", "arguments": {}}"#).is_err());
        assert!(
            ToolCall::parse(r#"{"name": "describe_us_aqi", "arguments": {"aqi_value": "lots"}}"#)
                .is_err()
        );
        assert!(
            ToolCall::parse(
                r#"{"name": "climate_change_data", "arguments": {"latitude": 1, "longitude": 2, "target_year": 2050.5}}"#
            )
            .is_err()
        );
    }

    #[test]
    fn timestamp_conversion_honours_zone() {
        assert_eq!(
            convert_timestamp(1_709_649_000.0, ""),
            Some(json!(["05-03-2024", "14:30"]))
        );
        assert_eq!(
            convert_timestamp(1_709_649_000.0, "Asia/Tokyo"),
            Some(json!(["05-03-2024", "23:30"]))
        );
        assert_eq!(convert_timestamp(1_709_649_000.0, "Mars/Olympus"), None);
        assert_eq!(convert_timestamp(f64::NAN, ""), None);
    }

    #[tokio::test]
    async fn local_tools_need_no_provider() {
        let service = MeteoService::new(FakeSource::default());

        let describe = |code: f64, city: &str| {
            ToolCall::GetWeatherCodeDescription(CodeArgs {
                code,
                city_location: city.into(),
            })
        };
        assert_eq!(
            service.call_tool(describe(99.0, "Prague")).await,
            Some(json!("Thunderstorm with heavy hail"))
        );
        assert_eq!(service.call_tool(describe(99.0, "")).await, Some(json!(HAIL_UNAVAILABLE)));
        assert_eq!(
            service.call_tool(describe(2.5, "")).await,
            Some(json!(UNKNOWN_WEATHER_CODE))
        );

        let aqi = ToolCall::DescribeEuropeanAqi(AqiArgs { aqi_value: 85.0 });
        assert_eq!(service.call_tool(aqi).await, Some(json!("Very Poor")));

        let input = ToolCall::GetUserInput(UserInputArgs {
            user_date_input: "2024/03/05".into(),
            user_hour_input: "9".into(),
        });
        assert_eq!(service.call_tool(input).await, Some(json!("2024-03-05 09:00:00")));

        let bad_input = ToolCall::GetUserInput(UserInputArgs {
            user_date_input: "2024/03/05".into(),
            user_hour_input: "24".into(),
        });
        assert_eq!(service.call_tool(bad_input).await, None);
        assert!(service.source().last_query().is_none());
    }

    #[tokio::test]
    async fn data_tools_dispatch_to_the_service() {
        let body = json!({
            "latitude": 59.9,
            "longitude": 10.75,
            // 2024-03-05 00:00 UTC
            "daily": { "time": [1_709_596_800], "river_discharge": [42.0] }
        });
        let service = MeteoService::new(FakeSource::default().with(Endpoint::Flood, body));

        let call = parse(json!({
            "name": "daily_river_discharge",
            "arguments": { "latitude": 59.9, "longitude": 10.75, "target_date": "2024-03-05" }
        }));
        assert_eq!(
            service.call_tool(call).await,
            Some(json!({ "Date": "05-03-2024", "River discharge": "42.0000 m³/s" }))
        );
    }

    #[tokio::test]
    async fn unparsable_target_skips_the_request() {
        let service = MeteoService::new(FakeSource::default());
        let call = ToolCall::AirQualityData(DateTimeArgs {
            latitude: 1.0,
            longitude: 2.0,
            target_datetime: "next tuesday".into(),
        });

        assert_eq!(service.call_tool(call).await, None);
        assert!(service.source().last_query().is_none());
    }
}
