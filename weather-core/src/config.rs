use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    error::WeatherError,
    model::{DisplayUnits, PressureUnit, TemperatureUnit, TimeFormat},
};

pub const FONTS: &[&str] = &["Roboto", "Calibri", "Arial", "Times New Roman", "Consolas", "Courier"];
pub const MIN_FONT_SIZE: u8 = 5;
pub const MAX_FONT_SIZE: u8 = 50;

pub const DEFAULT_BACKGROUND: &str = "grey20";
pub const DEFAULT_FONT: &str = "Roboto";
pub const DEFAULT_FONT_SIZE: u8 = 17;

const SETTINGS_FILE: &str = "settings.toml";
const CREDENTIALS_FILE: &str = "api.txt";

/// User preferences remembered between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Last city entered.
    pub city: String,
    pub background_color: String,
    pub font: String,
    pub font_size: u8,
    pub time_format: TimeFormat,
    pub temperature_unit: TemperatureUnit,
    pub pressure_unit: PressureUnit,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            city: String::new(),
            background_color: DEFAULT_BACKGROUND.to_string(),
            font: DEFAULT_FONT.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            time_format: TimeFormat::default(),
            temperature_unit: TemperatureUnit::default(),
            pressure_unit: PressureUnit::default(),
        }
    }
}

impl Settings {
    /// Load settings from the platform config directory, or defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file yet, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .map_err(|e| WeatherError::Config(e.to_string()))
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        settings
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_file_path()?)
    }

    /// Save settings, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize settings to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    pub fn settings_file_path() -> Result<PathBuf> {
        Ok(config_dir()?.join(SETTINGS_FILE))
    }

    pub fn validate(&self) -> Result<(), WeatherError> {
        validate_font(&self.font)?;
        validate_font_size(self.font_size)?;
        if self.background_color.trim().is_empty() {
            return Err(WeatherError::Config("background color must not be empty".into()));
        }
        Ok(())
    }

    /// Restore every preference, including the city, to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn display_units(&self) -> DisplayUnits {
        DisplayUnits {
            temperature: self.temperature_unit,
            pressure: self.pressure_unit,
            time_format: self.time_format,
        }
    }

    pub fn set_display_units(&mut self, units: DisplayUnits) {
        self.temperature_unit = units.temperature;
        self.pressure_unit = units.pressure;
        self.time_format = units.time_format;
    }
}

pub fn validate_font(font: &str) -> Result<(), WeatherError> {
    if FONTS.contains(&font) {
        Ok(())
    } else {
        Err(WeatherError::Config(format!(
            "unknown font '{font}', expected one of: {}",
            FONTS.join(", ")
        )))
    }
}

pub fn validate_font_size(size: u8) -> Result<(), WeatherError> {
    if size < MIN_FONT_SIZE {
        Err(WeatherError::Config(format!("font size can't be less than {MIN_FONT_SIZE}")))
    } else if size > MAX_FONT_SIZE {
        Err(WeatherError::Config(format!("font size can't be greater than {MAX_FONT_SIZE}")))
    } else {
        Ok(())
    }
}

/// API keys for the weather and forward-geocoding providers.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub weather_api_key: String,
    pub geocoding_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("weather_api_key", &"<redacted>")
            .field("geocoding_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Parse the two-line credentials format: weather key, then geocoding key.
    pub fn parse(contents: &str) -> Result<Self, WeatherError> {
        let mut lines = contents.lines().map(str::trim);
        let weather = lines.next().unwrap_or_default();
        let geocoding = lines.next().unwrap_or_default();

        if weather.is_empty() || geocoding.is_empty() {
            return Err(WeatherError::Config(
                "the credentials file does not contain the required API keys \
                 (line 1: weather key, line 2: geocoding key)"
                    .into(),
            ));
        }

        Ok(Self { weather_api_key: weather.to_string(), geocoding_api_key: geocoding.to_string() })
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::credentials_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!(
                "Failed to read credentials file: {}\n\
                 Hint: run `cityweather configure` and enter your API keys.",
                path.display()
            )
        })?;

        Self::parse(&contents)
            .with_context(|| format!("Invalid credentials file: {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = format!("{}\n{}\n", self.weather_api_key, self.geocoding_api_key);
        fs::write(path, contents)
            .with_context(|| format!("Failed to write credentials file: {}", path.display()))
    }

    pub fn credentials_file_path() -> Result<PathBuf> {
        Ok(config_dir()?.join(CREDENTIALS_FILE))
    }
}

fn config_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("dev", "cityweather", "cityweather")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

    Ok(dirs.config_dir().to_path_buf())
}
