use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use serde_json::to_string_pretty;
use tracing::debug;
use wunderground_core::{Config, Location, WeatherError, WundergroundClient, resolve_api_key};

use crate::format;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wunderground", version, about = "Weather Underground CLI")]
pub struct Cli {
    /// API key; falls back to WUNDERGROUND_API_KEY, then the saved configuration.
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Print the JSON returned by the API instead of a summary.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save the API key used by the other commands.
    Configure,

    /// Show current conditions.
    Conditions(LocationArgs),

    /// Show active severe weather alerts.
    Alerts(LocationArgs),

    /// Show current conditions and alerts with a single request.
    ConditionsAndAlerts(LocationArgs),

    /// Show the daily forecast.
    Forecast(LocationArgs),
}

#[derive(Debug, Clone, Args)]
pub struct LocationArgs {
    /// State code (e.g. "CA") or zip code.
    pub region: Option<String>,

    /// City, when the region is a state.
    pub locality: Option<String>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let Cli { key, json, command } = self;

        let output = match command {
            Command::Configure => return configure(),
            Command::Conditions(loc) => {
                debug!(?loc, "fetching current conditions");
                let conditions = build_client(key.as_deref(), Config::load)?
                    .current_conditions(loc.region(), loc.locality())
                    .await?;
                if json {
                    to_string_pretty(&conditions)?
                } else {
                    format::format_conditions(&conditions)
                }
            }
            Command::Alerts(loc) => {
                debug!(?loc, "fetching alerts");
                let alerts = build_client(key.as_deref(), Config::load)?
                    .alerts(loc.region(), loc.locality())
                    .await?;
                if json {
                    to_string_pretty(&alerts)?
                } else {
                    format::format_alerts(&alerts)
                }
            }
            Command::ConditionsAndAlerts(loc) => {
                debug!(?loc, "fetching current conditions and alerts");
                let result = build_client(key.as_deref(), Config::load)?
                    .current_conditions_and_alerts(loc.region(), loc.locality())
                    .await?;
                if json {
                    to_string_pretty(&result)?
                } else {
                    format!(
                        "{}\n{}",
                        format::format_conditions(&result.conditions),
                        format::format_alerts(&result.alerts)
                    )
                }
            }
            Command::Forecast(loc) => {
                debug!(?loc, "fetching forecast");
                let forecast = build_client(key.as_deref(), Config::load)?
                    .forecast(loc.region(), loc.locality())
                    .await?;
                if json {
                    to_string_pretty(&forecast)?
                } else {
                    format::format_forecast(&forecast)
                }
            }
        };

        println!("{}", output.trim_end());
        Ok(())
    }
}

impl LocationArgs {
    fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    fn locality(&self) -> Option<&str> {
        self.locality.as_deref()
    }
}

fn build_client<F>(explicit: Option<&str>, load_config: F) -> anyhow::Result<WundergroundClient>
where
    F: FnOnce() -> anyhow::Result<Config>,
{
    let key = resolve_api_key(explicit, load_config).map_err(|err| {
        if matches!(
            err.downcast_ref::<WeatherError>(),
            Some(WeatherError::InvalidCredential)
        ) {
            err.context("No API key available.\nHint: run `wunderground configure` or pass --key.")
        } else {
            err
        }
    })?;

    Ok(WundergroundClient::with_credential(key, Location::default()))
}

fn configure() -> anyhow::Result<()> {
    let api_key = Password::new("Weather Underground API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let mut config = Config::load()?;
    config.set_api_key(&api_key);

    if config.api_key().is_none() {
        bail!("API key must not be empty");
    }

    let path = config.save()?;
    println!("Saved API key to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_with_state_and_city() {
        let cli = Cli::try_parse_from(["wunderground", "conditions", "CA", "Oakland"])
            .expect("should parse");

        match cli.command {
            Command::Conditions(loc) => {
                assert_eq!(loc.region(), Some("CA"));
                assert_eq!(loc.locality(), Some("Oakland"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(!cli.json);
    }

    #[test]
    fn location_is_optional() {
        let cli = Cli::try_parse_from(["wunderground", "forecast"]).expect("should parse");

        match cli.command {
            Command::Forecast(loc) => {
                assert_eq!(loc.region(), None);
                assert_eq!(loc.locality(), None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "wunderground",
            "conditions-and-alerts",
            "94610",
            "--json",
            "--key",
            "ABC",
        ])
        .expect("should parse");

        assert!(cli.json);
        assert_eq!(cli.key.as_deref(), Some("ABC"));
        assert!(matches!(cli.command, Command::ConditionsAndAlerts(_)));
    }

    #[test]
    fn configure_takes_no_location() {
        let cli = Cli::try_parse_from(["wunderground", "configure"]).expect("should parse");
        assert!(matches!(cli.command, Command::Configure));
    }

    #[test]
    fn explicit_key_skips_broken_config() {
        let client = build_client(Some("EXPLICIT"), || {
            bail!("Failed to parse config file: config.toml: invalid array")
        });

        assert!(client.is_ok());
    }

    #[test]
    fn broken_config_is_reported_without_a_key() {
        // Only meaningful when the environment does not supply a key.
        if std::env::var_os(wunderground_core::API_KEY_ENV).is_some() {
            return;
        }

        let err = build_client(None, || bail!("Failed to parse config file: config.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
