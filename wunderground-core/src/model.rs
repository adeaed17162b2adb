use std::fmt;

use crate::{WeatherError, config::API_KEY_ENV};

/// Location used when no region has been set.
pub const DEFAULT_LOCATION_PATH: &str = "CA/San_Francisco";

/// Weather Underground API key, percent-encoded for use as a path segment.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    encoded: String,
}

impl ApiKey {
    /// Use `explicit` if non-empty, otherwise ask `lookup` for the
    /// `WUNDERGROUND_API_KEY` variable.
    pub(crate) fn resolve_with<F>(explicit: Option<&str>, lookup: F) -> Result<Self, WeatherError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match explicit.filter(|key| !key.is_empty()) {
            Some(key) => Ok(Self::encode(key)),
            None => lookup(API_KEY_ENV)
                .filter(|key| !key.is_empty())
                .map(|key| Self::encode(&key))
                .ok_or(WeatherError::InvalidCredential),
        }
    }

    fn encode(raw: &str) -> Self {
        Self { encoded: urlencoding::encode(raw).into_owned() }
    }

    pub(crate) fn as_path_segment(&self) -> &str {
        &self.encoded
    }
}

impl TryFrom<&str> for ApiKey {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(WeatherError::InvalidCredential);
        }
        Ok(Self::encode(value))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// A state code or zip code, optionally narrowed by a city.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    region: Option<String>,
    locality: Option<String>,
}

impl Location {
    pub fn new(region: Option<&str>, locality: Option<&str>) -> Self {
        let mut location = Self::default();
        location.update(region, locality);
        location
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn locality(&self) -> Option<&str> {
        self.locality.as_deref()
    }

    /// Overwrite each part that is given and non-empty; leave the others as they are.
    pub fn update(&mut self, region: Option<&str>, locality: Option<&str>) {
        if let Some(region) = region.filter(|r| !r.is_empty()) {
            self.region = Some(region.to_string());
        }
        if let Some(locality) = locality.filter(|l| !l.is_empty()) {
            self.locality = Some(locality.to_string());
        }
    }

    /// Path segment for the `q/` part of a request URL.
    ///
    /// Without a region this is [`DEFAULT_LOCATION_PATH`], whatever the locality.
    pub fn path(&self) -> String {
        let Some(region) = self.region() else {
            return DEFAULT_LOCATION_PATH.to_string();
        };

        match self.locality() {
            Some(locality) => format!(
                "{}/{}",
                urlencoding::encode(region),
                urlencoding::encode(locality)
            ),
            None => urlencoding::encode(region).into_owned(),
        }
    }
}

/// Data product requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Conditions,
    Alerts,
    ConditionsAndAlerts,
    Forecast,
}

impl QueryKind {
    /// Path segment selecting the data product.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Conditions => "conditions",
            QueryKind::Alerts => "alerts",
            QueryKind::ConditionsAndAlerts => "conditions/alerts",
            QueryKind::Forecast => "forecast",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
