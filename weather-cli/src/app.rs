use anyhow::Result;
use cityweather_core::{
    Credentials, DisplayUnits, LookupSession, Settings, WeatherError, WeatherLookup,
};
use std::path::PathBuf;

/// Where settings and credentials live on disk.
#[derive(Debug, Clone)]
pub struct Paths {
    pub settings: PathBuf,
    pub credentials: PathBuf,
}

impl Paths {
    pub fn resolve(settings: Option<PathBuf>, credentials: Option<PathBuf>) -> Result<Self> {
        let settings = match settings {
            Some(path) => path,
            None => Settings::settings_file_path()?,
        };
        let credentials = match credentials {
            Some(path) => path,
            None => Credentials::credentials_file_path()?,
        };
        Ok(Self { settings, credentials })
    }
}

/// Everything the front end needs between user actions.
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    settings_path: PathBuf,
    session: LookupSession,
    /// Text currently shown in place of the report panel.
    pub display: String,
}

impl AppState {
    pub fn new(settings: Settings, settings_path: PathBuf, lookup: WeatherLookup) -> Self {
        Self { settings, settings_path, session: LookupSession::new(lookup), display: String::new() }
    }

    /// Load settings and credentials. Either failing is fatal.
    pub fn start(paths: &Paths) -> Result<Self> {
        let settings = Settings::load_from(&paths.settings)?;
        let credentials = Credentials::load_from(&paths.credentials)?;
        let lookup = WeatherLookup::from_credentials(&credentials)?;

        tracing::debug!(settings = ?paths.settings, "application started");
        Ok(Self::new(settings, paths.settings.clone(), lookup))
    }

    pub fn units(&self) -> DisplayUnits {
        self.settings.display_units()
    }

    /// Run a lookup in the background; Ctrl-C cancels it.
    ///
    /// The outcome, report or message, becomes the new display text.
    pub async fn on_fetch(&mut self, city: &str, units: DisplayUnits) -> &str {
        self.settings.city = city.to_string();
        self.settings.set_display_units(units);

        let ticket = self.session.submit(city, units);
        let outcome = tokio::select! {
            outcome = ticket.outcome() => outcome,
            _ = tokio::signal::ctrl_c() => {
                self.session.cancel();
                Err(WeatherError::Cancelled)
            }
        };

        self.display = match outcome {
            Ok(report) => report.text,
            Err(err) => {
                if let WeatherError::Network { .. } = err {
                    tracing::warn!(error = %err, "lookup failed");
                }
                err.user_message()
            }
        };
        &self.display
    }

    pub fn on_change_units(&mut self, units: DisplayUnits) {
        self.settings.set_display_units(units);
    }

    /// Empty the city and the report panel.
    pub fn on_clear(&mut self) {
        self.settings.city.clear();
        self.display.clear();
    }

    pub fn on_reset(&mut self) {
        self.settings.reset();
    }

    /// Persist settings. Called on the way out.
    pub fn on_quit(mut self) -> Result<()> {
        self.session.cancel();
        self.settings.save_to(&self.settings_path)
    }
}
