//! Views over the decoded JSON returned by the API.
//!
//! The API has no schema we enforce, so every view wraps a raw
//! [`serde_json::Value`] and exposes accessors returning `Option`. Numbers are
//! frequently sent as strings (`"19"`, `"1458518400"`); the accessors accept both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::WeatherError;

/// Follow a path of object keys, failing with the dotted path of the first missing one.
pub(crate) fn field<'a>(value: &'a Value, path: &[&str]) -> Result<&'a Value, WeatherError> {
    let mut current = value;
    for (depth, key) in path.iter().enumerate() {
        current = current
            .get(key)
            .ok_or_else(|| WeatherError::MissingField(path[..=depth].join(".")))?;
    }
    Ok(current)
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(key))
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn epoch(value: &Value) -> Option<DateTime<Utc>> {
    let secs = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    DateTime::from_timestamp(secs, 0)
}

/// The `current_observation` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions(Value);

impl Conditions {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Short description such as `"Partly Cloudy"`.
    pub fn weather(&self) -> Option<&str> {
        self.0.get("weather")?.as_str()
    }

    pub fn temperature_c(&self) -> Option<f64> {
        number(self.0.get("temp_c")?)
    }

    pub fn temperature_f(&self) -> Option<f64> {
        number(self.0.get("temp_f")?)
    }

    /// Relative humidity as sent, e.g. `"65%"`.
    pub fn relative_humidity(&self) -> Option<&str> {
        self.0.get("relative_humidity")?.as_str()
    }

    pub fn wind_kph(&self) -> Option<f64> {
        number(self.0.get("wind_kph")?)
    }

    pub fn location_name(&self) -> Option<&str> {
        lookup(&self.0, &["display_location", "full"])?.as_str()
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        epoch(self.0.get("observation_epoch")?)
    }
}

/// The `alerts` value, normally an array of alert records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alerts(Value);

impl Alerts {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Number of alert records; zero when the value is not an array.
    pub fn len(&self) -> usize {
        self.0.as_array().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Alert<'_>> {
        self.0.as_array().into_iter().flatten().map(Alert)
    }
}

/// A single alert record borrowed from [`Alerts`].
#[derive(Debug, Clone, Copy)]
pub struct Alert<'a>(&'a Value);

impl<'a> Alert<'a> {
    pub fn raw(&self) -> &'a Value {
        self.0
    }

    pub fn description(&self) -> Option<&'a str> {
        self.0.get("description")?.as_str()
    }

    pub fn message(&self) -> Option<&'a str> {
        self.0.get("message")?.as_str()
    }

    pub fn significance(&self) -> Option<&'a str> {
        self.0.get("significance")?.as_str()
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        epoch(self.0.get("date_epoch")?)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        epoch(self.0.get("expires_epoch")?)
    }
}

/// Result of a combined `conditions/alerts` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionsAndAlerts {
    pub conditions: Conditions,
    pub alerts: Alerts,
}

/// Result of a `forecast` query: the `forecast.simpleforecast.forecastday` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub forecast: Vec<ForecastDay>,
}

/// One `forecastday` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastDay(Value);

impl ForecastDay {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        epoch(lookup(&self.0, &["date", "epoch"])?)
    }

    pub fn weekday(&self) -> Option<&str> {
        lookup(&self.0, &["date", "weekday"])?.as_str()
    }

    pub fn conditions(&self) -> Option<&str> {
        self.0.get("conditions")?.as_str()
    }

    pub fn high_c(&self) -> Option<f64> {
        number(lookup(&self.0, &["high", "celsius"])?)
    }

    pub fn low_c(&self) -> Option<f64> {
        number(lookup(&self.0, &["low", "celsius"])?)
    }

    pub fn high_f(&self) -> Option<f64> {
        number(lookup(&self.0, &["high", "fahrenheit"])?)
    }

    pub fn low_f(&self) -> Option<f64> {
        number(lookup(&self.0, &["low", "fahrenheit"])?)
    }

    /// Probability of precipitation, in percent.
    pub fn pop(&self) -> Option<f64> {
        number(self.0.get("pop")?)
    }
}
