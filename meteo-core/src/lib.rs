//! Core library for the `meteo` CLI.
//!
//! This crate defines:
//! - Configuration handling and the Open-Meteo HTTP source (cache, retries)
//! - Weather-code and AQI classification, timestamp and user-input helpers
//! - Per-product formatters and the async service that ties them together
//! - A tool-call dispatcher for function-calling front ends
//!
//! It is used by `meteo-cli`, but can also be reused by other binaries or services.

pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod report;
pub mod series;
pub mod service;
pub mod time;
pub mod tools;

pub use config::Config;
pub use error::MeteoError;
pub use model::{CityInfo, CityQuery, GeoPoint};
pub use provider::{Endpoint, MeteoSource, Query};
pub use service::MeteoService;
pub use tools::ToolCall;
