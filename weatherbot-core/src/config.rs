use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Environment variables that override values from the config file.
pub const ENV_API_KEY: &str = "OPENWEATHER_API_KEY";
pub const ENV_UNITS: &str = "WEATHER_UNITS";
pub const ENV_LANG: &str = "WEATHER_LANG";
pub const ENV_DATABASE: &str = "DATABASE_URL";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// lang = "ru"
/// database_path = "weather.db"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather API key. The pipeline refuses to start without one.
    pub api_key: Option<String>,

    /// Measurement units code passed through to the provider.
    pub units: String,

    /// Response language code passed through to the provider.
    pub lang: String,

    /// SQLite file backing the favorites table.
    pub database_path: PathBuf,

    pub base_url: String,

    /// Total request timeout for a single provider call.
    pub timeout_secs: u64,

    /// Upper bound on parallel lookups when querying all favorites.
    pub max_concurrent_fetches: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            units: "metric".to_string(),
            lang: "ru".to_string(),
            database_path: PathBuf::from("weather.db"),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            max_concurrent_fetches: 4,
        }
    }
}

impl Config {
    /// Load config from disk (or defaults on first run), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherbot", "weatherbot")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from a variable lookup (normally the process environment).
    ///
    /// Empty values are ignored so an unset-but-exported variable does not wipe the file value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(units) = get(ENV_UNITS) {
            self.units = units;
        }
        if let Some(lang) = get(ENV_LANG) {
            self.lang = lang;
        }
        if let Some(path) = get(ENV_DATABASE) {
            self.database_path = PathBuf::from(path);
        }
    }

    /// Returns the API key, or an error with a hint on how to set it.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weatherbot configure` or set {ENV_API_KEY}."
            )
        })
    }

    /// Provider request timeout, never below one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
