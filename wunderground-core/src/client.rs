use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    WeatherError,
    model::{ApiKey, Location, QueryKind},
    response::{Alerts, Conditions, ConditionsAndAlerts, Forecast, ForecastDay, field},
    transport::{HttpTransport, Transport},
};

/// Root of the Weather Underground REST API.
pub const DEFAULT_BASE_URL: &str = "http://api.wunderground.com/api";

const FORECAST_DAYS_PATH: &[&str] = &["forecast", "simpleforecast", "forecastday"];

/// Client for the Weather Underground API.
///
/// The client remembers the last location it was given: every query accepts an
/// optional region/locality override which is merged into the stored location
/// before the request is built.
///
/// Each query awaits exactly one HTTP request. Queries take `&mut self`, so a
/// client cannot run two of them at once; share it behind a lock if needed.
#[derive(Debug)]
pub struct WundergroundClient {
    key: ApiKey,
    location: Location,
    base_url: String,
    transport: Box<dyn Transport>,
}

impl WundergroundClient {
    /// Create a client from an explicit key, falling back to the
    /// `WUNDERGROUND_API_KEY` environment variable when `key` is empty.
    pub fn new(key: &str, location: Location) -> Result<Self, WeatherError> {
        Self::new_with(key, location, |name| std::env::var(name).ok())
    }

    pub(crate) fn new_with<F>(
        key: &str,
        location: Location,
        lookup: F,
    ) -> Result<Self, WeatherError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self::with_credential(ApiKey::resolve_with(Some(key), lookup)?, location))
    }

    pub fn with_credential(key: ApiKey, location: Location) -> Self {
        Self {
            key,
            location,
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: Box::new(HttpTransport::new()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Box::new(transport);
        self
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Merge the given parts into the stored location; absent or empty parts are ignored.
    pub fn update_location(&mut self, region: Option<&str>, locality: Option<&str>) {
        self.location.update(region, locality);
    }

    /// Current observation (`current_observation`) for the location.
    pub async fn current_conditions(
        &mut self,
        region: Option<&str>,
        locality: Option<&str>,
    ) -> Result<Conditions, WeatherError> {
        let results = self.query(QueryKind::Conditions, region, locality).await?;
        Ok(Conditions::new(take(results, &["current_observation"])?))
    }

    /// Active severe weather alerts (`alerts`) for the location.
    pub async fn alerts(
        &mut self,
        region: Option<&str>,
        locality: Option<&str>,
    ) -> Result<Alerts, WeatherError> {
        let results = self.query(QueryKind::Alerts, region, locality).await?;
        Ok(Alerts::new(take(results, &["alerts"])?))
    }

    /// Current observation and alerts, fetched with a single request.
    pub async fn current_conditions_and_alerts(
        &mut self,
        region: Option<&str>,
        locality: Option<&str>,
    ) -> Result<ConditionsAndAlerts, WeatherError> {
        let results = self
            .query(QueryKind::ConditionsAndAlerts, region, locality)
            .await?;

        let conditions = field(&results, &["current_observation"])?.clone();
        let alerts = field(&results, &["alerts"])?.clone();

        Ok(ConditionsAndAlerts {
            conditions: Conditions::new(conditions),
            alerts: Alerts::new(alerts),
        })
    }

    /// Daily forecast entries found at `forecast.simpleforecast.forecastday`.
    pub async fn forecast(
        &mut self,
        region: Option<&str>,
        locality: Option<&str>,
    ) -> Result<Forecast, WeatherError> {
        let results = self.query(QueryKind::Forecast, region, locality).await?;

        let days = match take(results, FORECAST_DAYS_PATH)? {
            Value::Array(days) => days,
            _ => {
                return Err(WeatherError::UnexpectedType {
                    path: FORECAST_DAYS_PATH.join("."),
                    expected: "an array",
                });
            }
        };

        Ok(Forecast {
            forecast: days.into_iter().map(ForecastDay::new).collect(),
        })
    }

    async fn query(
        &mut self,
        kind: QueryKind,
        region: Option<&str>,
        locality: Option<&str>,
    ) -> Result<Value, WeatherError> {
        self.update_location(region, locality);
        let location = self.location.path();
        self.api_call(kind.as_str(), &location).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn api_call(&self, kind: &str, location: &str) -> Result<Value, WeatherError> {
        let url = self.request_url(kind, location);
        debug!("requesting weather data");
        self.transport.get_json(&url).await
    }

    fn request_url(&self, kind: &str, location: &str) -> String {
        let kind = if kind.is_empty() {
            String::new()
        } else {
            format!("/{kind}")
        };
        format!(
            "{}/{}{}/q/{}.json",
            self.base_url,
            self.key.as_path_segment(),
            kind,
            location
        )
    }
}

/// Move the value at `path` out of `value`.
fn take(mut value: Value, path: &[&str]) -> Result<Value, WeatherError> {
    let pointer = format!("/{}", path.join("/"));
    if let Some(found) = value.pointer_mut(&pointer) {
        return Ok(found.take());
    }

    Err(field(&value, path)
        .err()
        .unwrap_or_else(|| WeatherError::MissingField(path.join("."))))
}
