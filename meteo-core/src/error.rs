use chrono::NaiveDateTime;
use thiserror::Error;

use crate::provider::Endpoint;

/// Everything that can go wrong between issuing a request and rendering a report.
///
/// None of these escape the service layer: they are logged and turned into an
/// absent result there.
#[derive(Debug, Error)]
pub enum MeteoError {
    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Invalid request URL for {endpoint}: {message}")]
    InvalidUrl { endpoint: Endpoint, message: String },

    #[error("Failed to send request to Open-Meteo ({endpoint})")]
    Request {
        endpoint: Endpoint,
        #[source]
        source: reqwest_middleware::Error,
    },

    #[error("Open-Meteo {endpoint} request failed with status {status}: {reason}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        reason: String,
    },

    #[error("Failed to parse Open-Meteo {endpoint} JSON")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response contains no '{0}' data")]
    MissingBlock(&'static str),

    #[error("Channel '{0}' is not present in the response")]
    MissingChannel(String),

    #[error("Channel '{channel}' has no value at {at}")]
    MissingValue { channel: String, at: NaiveDateTime },

    #[error("Channel '{channel}' has no values in {year}")]
    EmptyAggregate { channel: String, year: i32 },

    #[error("Channel '{channel}' has {found} values but the time axis has {expected}")]
    RaggedChannel {
        channel: String,
        expected: usize,
        found: usize,
    },

    #[error("Timestamp {0} is out of range")]
    TimestampOutOfRange(i64),

    #[error("UTC offset of {0} seconds is out of range")]
    InvalidOffset(i64),
}
