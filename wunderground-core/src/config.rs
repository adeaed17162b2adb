use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{ApiKey, WeatherError};

/// Environment variable consulted when no API key is passed explicitly.
pub const API_KEY_ENV: &str = "WUNDERGROUND_API_KEY";

/// Credential configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "wunderground", "wunderground-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Store the API key, ignoring surrounding whitespace.
    pub fn set_api_key(&mut self, api_key: &str) {
        let trimmed = api_key.trim();
        self.api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    /// Returns the stored API key, if present and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }
}

/// Pick an API key: the explicit value, then the environment, then the config file.
///
/// `load_config` only runs when neither of the first two yields a key, so a
/// broken config file does not get in the way of an explicit key.
pub fn resolve_api_key<F>(explicit: Option<&str>, load_config: F) -> Result<ApiKey>
where
    F: FnOnce() -> Result<Config>,
{
    resolve_api_key_with(explicit, |name| std::env::var(name).ok(), load_config)
}

pub(crate) fn resolve_api_key_with<L, F>(
    explicit: Option<&str>,
    lookup: L,
    load_config: F,
) -> Result<ApiKey>
where
    L: Fn(&str) -> Option<String>,
    F: FnOnce() -> Result<Config>,
{
    if let Ok(key) = ApiKey::resolve_with(explicit, lookup) {
        return Ok(key);
    }

    let config = load_config()?;
    let key = config.api_key().ok_or(WeatherError::InvalidCredential)?;
    Ok(ApiKey::try_from(key)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn file_with(key: &str) -> impl FnOnce() -> Result<Config> {
        let key = key.to_string();
        move || {
            let mut cfg = Config::default();
            cfg.set_api_key(&key);
            Ok(cfg)
        }
    }

    fn broken_file() -> Result<Config> {
        Err(anyhow!("Failed to parse config file: config.toml"))
    }

    #[test]
    fn api_key_is_none_by_default() {
        let cfg = Config::default();
        assert_eq!(cfg.api_key(), None);
    }

    #[test]
    fn set_api_key_trims_and_ignores_blank() {
        let mut cfg = Config::default();

        cfg.set_api_key("  KEY  ");
        assert_eq!(cfg.api_key(), Some("KEY"));

        cfg.set_api_key("   ");
        assert_eq!(cfg.api_key(), None);
    }

    #[test]
    fn explicit_key_wins_over_env_and_config() {
        let key = resolve_api_key_with(
            Some("FLAG"),
            |_| Some("FROM_ENV".into()),
            file_with("FROM_FILE"),
        )
        .expect("explicit key");
        assert_eq!(key.as_path_segment(), "FLAG");
    }

    #[test]
    fn env_is_consulted_before_config() {
        let key = resolve_api_key_with(
            Some(""),
            |name| {
                assert_eq!(name, API_KEY_ENV);
                Some("FROM_ENV".into())
            },
            file_with("FROM_FILE"),
        )
        .expect("env key");
        assert_eq!(key.as_path_segment(), "FROM_ENV");
    }

    #[test]
    fn config_is_last_resort() {
        let key = resolve_api_key_with(None, no_env, file_with("FROM_FILE")).expect("file key");
        assert_eq!(key.as_path_segment(), "FROM_FILE");
    }

    #[test]
    fn no_key_anywhere_is_invalid_credential() {
        let err = resolve_api_key_with(None, no_env, || Ok(Config::default())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WeatherError>(),
            Some(WeatherError::InvalidCredential)
        ));
    }

    #[test]
    fn broken_config_is_not_read_when_a_key_is_given() {
        let key = resolve_api_key_with(Some("FLAG"), no_env, broken_file).expect("explicit key");
        assert_eq!(key.as_path_segment(), "FLAG");

        let key = resolve_api_key_with(None, |_| Some("FROM_ENV".into()), broken_file)
            .expect("env key");
        assert_eq!(key.as_path_segment(), "FROM_ENV");
    }

    #[test]
    fn broken_config_is_reported_when_it_is_needed() {
        let err = resolve_api_key_with(None, no_env, broken_file).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn save_and_load_roundtrip_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("SECRET");
        cfg.save_to(&path).expect("save should succeed");

        let loaded = Config::load_from(&path).expect("load should succeed");
        assert_eq!(loaded.api_key(), Some("SECRET"));
    }

    #[test]
    fn load_missing_file_returns_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = Config::load_from(&dir.path().join("absent.toml")).expect("load");
        assert!(loaded.api_key.is_none());
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = [").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
