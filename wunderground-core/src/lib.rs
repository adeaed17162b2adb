//! Core library for the `wunderground` CLI.
//!
//! This crate defines:
//! - The Weather Underground API client and its remembered location
//! - Credential resolution and the on-disk credential config
//! - Typed views over the JSON the API returns
//!
//! It is used by `wunderground-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod response;
pub mod transport;

pub use client::{DEFAULT_BASE_URL, WundergroundClient};
pub use config::{API_KEY_ENV, Config, resolve_api_key};
pub use error::WeatherError;
pub use model::{ApiKey, DEFAULT_LOCATION_PATH, Location, QueryKind};
pub use response::{Alert, Alerts, Conditions, ConditionsAndAlerts, Forecast, ForecastDay};
pub use transport::{HttpTransport, Transport};
