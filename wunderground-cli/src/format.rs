use chrono::{DateTime, Utc};
use wunderground_core::{Alerts, Conditions, Forecast};

const MISSING: &str = "n/a";

/// Formats current conditions into a human-readable string
pub fn format_conditions(conditions: &Conditions) -> String {
    let mut output = format!(
        "Current Conditions: {}\n",
        conditions.location_name().unwrap_or("unknown location")
    );

    output.push_str(&format!(
        "  Weather: {}\n",
        conditions.weather().unwrap_or(MISSING)
    ));
    output.push_str(&format!(
        "  Temperature: {}\n",
        temperature(conditions.temperature_c(), conditions.temperature_f())
    ));
    output.push_str(&format!(
        "  Humidity: {}\n",
        conditions.relative_humidity().unwrap_or(MISSING)
    ));
    if let Some(wind) = conditions.wind_kph() {
        output.push_str(&format!("  Wind: {wind:.1} km/h\n"));
    }
    if let Some(observed) = conditions.observed_at() {
        output.push_str(&format!("  Observed: {}\n", timestamp(observed)));
    }
    output
}

/// Formats weather alerts into a human-readable string
pub fn format_alerts(alerts: &Alerts) -> String {
    if alerts.is_empty() {
        return "No active weather alerts.\n".to_string();
    }

    let mut output = String::from("Active Weather Alerts:\n\n");
    for (i, alert) in alerts.iter().enumerate() {
        output.push_str(&format!(
            "Alert {}: {}\n",
            i + 1,
            alert.description().unwrap_or(MISSING)
        ));
        if let Some(expires) = alert.expires_at() {
            output.push_str(&format!("  Expires: {}\n", timestamp(expires)));
        }
        if let Some(message) = alert.message() {
            output.push_str(&format!("  {}\n", message.trim()));
        }
        output.push('\n');
    }
    output
}

/// Formats the daily forecast into a human-readable string
pub fn format_forecast(forecast: &Forecast) -> String {
    let mut output = String::from("Weather Forecast:\n\n");
    for day in &forecast.forecast {
        let label = match (day.weekday(), day.date()) {
            (Some(weekday), Some(date)) => format!("{weekday} {}", date.format("%Y-%m-%d")),
            (Some(weekday), None) => weekday.to_string(),
            (None, Some(date)) => date.format("%Y-%m-%d").to_string(),
            (None, None) => "Unknown day".to_string(),
        };
        output.push_str(&format!(
            "{}:\n  High: {}\n  Low: {}\n  Conditions: {}\n",
            label,
            temperature(day.high_c(), day.high_f()),
            temperature(day.low_c(), day.low_f()),
            day.conditions().unwrap_or(MISSING)
        ));
        if let Some(pop) = day.pop() {
            output.push_str(&format!("  Chance of precipitation: {pop:.0}%\n"));
        }
        output.push('\n');
    }
    output
}

fn temperature(celsius: Option<f64>, fahrenheit: Option<f64>) -> String {
    match (celsius, fahrenheit) {
        (Some(c), Some(f)) => format!("{c:.1}\u{00b0}C ({f:.1}\u{00b0}F)"),
        (Some(c), None) => format!("{c:.1}\u{00b0}C"),
        (None, Some(f)) => format!("{f:.1}\u{00b0}F"),
        (None, None) => MISSING.to_string(),
    }
}

fn timestamp(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wunderground_core::ForecastDay;

    #[test]
    fn conditions_summary() {
        let conditions = Conditions::new(json!({
            "display_location": { "full": "Oakland, CA" },
            "weather": "Clear",
            "temp_c": 20,
            "temp_f": 68,
            "relative_humidity": "40%",
            "observation_epoch": "0"
        }));

        let out = format_conditions(&conditions);
        assert!(out.starts_with("Current Conditions: Oakland, CA\n"));
        assert!(out.contains("Weather: Clear"));
        assert!(out.contains("Temperature: 20.0\u{00b0}C (68.0\u{00b0}F)"));
        assert!(out.contains("Humidity: 40%"));
        assert!(out.contains("Observed: 1970-01-01 00:00 UTC"));
        assert!(!out.contains("Wind"));
    }

    #[test]
    fn conditions_summary_with_missing_fields() {
        let out = format_conditions(&Conditions::new(json!({})));
        assert!(out.contains("unknown location"));
        assert!(out.contains("Temperature: n/a"));
    }

    #[test]
    fn no_alerts() {
        let out = format_alerts(&Alerts::new(json!([])));
        assert_eq!(out, "No active weather alerts.\n");
    }

    #[test]
    fn alerts_are_numbered() {
        let alerts = Alerts::new(json!([
            { "description": "Heat Advisory" },
            { "description": "Red Flag Warning", "message": " Critical fire weather. " }
        ]));

        let out = format_alerts(&alerts);
        assert!(out.contains("Alert 1: Heat Advisory"));
        assert!(out.contains("Alert 2: Red Flag Warning"));
        assert!(out.contains("  Critical fire weather.\n"));
    }

    #[test]
    fn forecast_days() {
        let forecast = Forecast {
            forecast: vec![ForecastDay::new(json!({
                "date": { "epoch": "86400", "weekday": "Friday" },
                "high": { "celsius": "19", "fahrenheit": "67" },
                "low": { "celsius": "10" },
                "conditions": "Fog",
                "pop": 20
            }))],
        };

        let out = format_forecast(&forecast);
        assert!(out.contains("Friday 1970-01-02:"));
        assert!(out.contains("High: 19.0\u{00b0}C (67.0\u{00b0}F)"));
        assert!(out.contains("Low: 10.0\u{00b0}C"));
        assert!(out.contains("Conditions: Fog"));
        assert!(out.contains("Chance of precipitation: 20%"));
    }
}
