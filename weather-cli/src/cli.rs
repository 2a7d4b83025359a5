use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use cityweather_core::{
    Credentials, DisplayUnits, PressureUnit, Settings, TemperatureUnit, TimeFormat,
    config::{self, FONTS},
};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use std::path::PathBuf;

use crate::app::{AppState, Paths};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather for a city")]
pub struct Cli {
    /// Two-line API key file (weather key, then geocoding key).
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Settings file to load and save preferences from.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London" or "New York".
        city: String,

        /// Celsius, Fahrenheit or Kelvin. Defaults to the saved choice.
        #[arg(long)]
        unit: Option<TemperatureUnit>,

        /// hPa, PSI, BAR or ATM. Defaults to the saved choice.
        #[arg(long)]
        pressure: Option<PressureUnit>,

        /// 12h or 24h. Defaults to the saved choice.
        #[arg(long)]
        time_format: Option<TimeFormat>,
    },

    /// Prompt-driven session: fetch, change units, clear, reset, quit.
    Interactive,

    /// Enter the API keys and write the credentials file.
    Configure,

    /// View or edit saved preferences.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Print the saved preferences.
    Show,
    /// Restore every preference to its default.
    Reset,
    /// Change one or more preferences.
    Set {
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        font: Option<String>,
        #[arg(long)]
        font_size: Option<u8>,
        #[arg(long)]
        background_color: Option<String>,
        #[arg(long)]
        unit: Option<TemperatureUnit>,
        #[arg(long)]
        pressure: Option<PressureUnit>,
        #[arg(long)]
        time_format: Option<TimeFormat>,
    },
}

const ACTION_FETCH: &str = "Fetch weather";
const ACTION_UNITS: &str = "Change units";
const ACTION_CLEAR: &str = "Clear";
const ACTION_RESET: &str = "Reset settings";
const ACTION_QUIT: &str = "Quit";

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let paths = Paths::resolve(self.settings, self.credentials)?;

        match self.command {
            Command::Show { city, unit, pressure, time_format } => {
                let mut app = AppState::start(&paths)?;
                let saved = app.units();
                let units = DisplayUnits {
                    temperature: unit.unwrap_or(saved.temperature),
                    pressure: pressure.unwrap_or(saved.pressure),
                    time_format: time_format.unwrap_or(saved.time_format),
                };

                println!("{}", app.on_fetch(&city, units).await);
                app.on_quit()?;
            }
            Command::Interactive => {
                let app = AppState::start(&paths)?;
                interactive(app).await?;
            }
            Command::Configure => configure(&paths)?,
            Command::Settings { action } => settings(&paths, action)?,
        }

        Ok(())
    }
}

/// How a prompt ended: an answer, Esc (back out), or Ctrl-C (leave the session).
#[derive(Debug, Clone, PartialEq, Eq)]
enum Prompted<T> {
    Answer(T),
    Back,
    Quit,
}

fn classify<T>(result: Result<T, InquireError>, what: &str) -> anyhow::Result<Prompted<T>> {
    match result {
        Ok(value) => Ok(Prompted::Answer(value)),
        Err(InquireError::OperationCanceled) => Ok(Prompted::Back),
        Err(InquireError::OperationInterrupted) => Ok(Prompted::Quit),
        Err(e) => Err(e).with_context(|| format!("Failed to read {what}")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Settings are saved on every way out of the session, errors included.
async fn interactive(mut app: AppState) -> anyhow::Result<()> {
    let outcome = run_session(&mut app).await;
    finish(app, outcome)
}

fn finish(app: AppState, outcome: anyhow::Result<()>) -> anyhow::Result<()> {
    let saved = app.on_quit();
    outcome.and(saved)
}

async fn run_session(app: &mut AppState) -> anyhow::Result<()> {
    let actions = vec![ACTION_FETCH, ACTION_UNITS, ACTION_CLEAR, ACTION_RESET, ACTION_QUIT];

    loop {
        let choice = match classify(Select::new("What next?", actions.clone()).prompt(), "action")? {
            Prompted::Answer(choice) => choice,
            Prompted::Back | Prompted::Quit => return Ok(()),
        };

        let flow = match choice {
            ACTION_FETCH => {
                let answer = classify(
                    Text::new("City:").with_initial_value(&app.settings.city).prompt(),
                    "city",
                )?;
                fetch_step(app, answer).await
            }
            ACTION_UNITS => {
                let answer = prompt_units(app.units())?;
                units_step(app, answer)
            }
            ACTION_CLEAR => {
                app.on_clear();
                println!("Cleared.");
                Flow::Continue
            }
            ACTION_RESET => {
                app.on_reset();
                println!("Settings reset to defaults.");
                Flow::Continue
            }
            _ => Flow::Quit,
        };

        if flow == Flow::Quit {
            return Ok(());
        }
    }
}

async fn fetch_step(app: &mut AppState, answer: Prompted<String>) -> Flow {
    match answer {
        Prompted::Answer(city) => {
            let units = app.units();
            println!("\n{}\n", app.on_fetch(&city, units).await);
            Flow::Continue
        }
        Prompted::Back => Flow::Continue,
        Prompted::Quit => Flow::Quit,
    }
}

fn units_step(app: &mut AppState, answer: Prompted<DisplayUnits>) -> Flow {
    match answer {
        Prompted::Answer(units) => {
            app.on_change_units(units);
            Flow::Continue
        }
        Prompted::Back => Flow::Continue,
        Prompted::Quit => Flow::Quit,
    }
}

/// Walks the three unit pickers; stops at the first one that is not answered.
fn prompt_units(current: DisplayUnits) -> anyhow::Result<Prompted<DisplayUnits>> {
    fn pick<T: Copy + std::fmt::Display + PartialEq>(
        label: &str,
        options: &[T],
        current: T,
    ) -> anyhow::Result<Prompted<T>> {
        let start = options.iter().position(|o| *o == current).unwrap_or(0);
        classify(Select::new(label, options.to_vec()).with_starting_cursor(start).prompt(), label)
    }

    let temperature = match pick("Temperature unit:", TemperatureUnit::all(), current.temperature)? {
        Prompted::Answer(value) => value,
        Prompted::Back => return Ok(Prompted::Back),
        Prompted::Quit => return Ok(Prompted::Quit),
    };
    let pressure = match pick("Pressure unit:", PressureUnit::all(), current.pressure)? {
        Prompted::Answer(value) => value,
        Prompted::Back => return Ok(Prompted::Back),
        Prompted::Quit => return Ok(Prompted::Quit),
    };
    let time_format = match pick("Time format:", TimeFormat::all(), current.time_format)? {
        Prompted::Answer(value) => value,
        Prompted::Back => return Ok(Prompted::Back),
        Prompted::Quit => return Ok(Prompted::Quit),
    };

    Ok(Prompted::Answer(DisplayUnits { temperature, pressure, time_format }))
}

fn configure(paths: &Paths) -> anyhow::Result<()> {
    let weather = prompt_key("OpenWeather API key:")?;
    let geocoding = prompt_key("OpenCage API key:")?;

    let contents = format!("{weather}\n{geocoding}\n");
    let credentials = Credentials::parse(&contents)?;
    credentials.save_to(&paths.credentials)?;

    println!("Credentials saved to {}", paths.credentials.display());
    Ok(())
}

fn prompt_key(label: &str) -> anyhow::Result<String> {
    let key = Password::new(label)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .with_context(|| format!("Failed to read {label}"))?;

    let key = key.trim().to_string();
    if key.is_empty() {
        bail!("API key must not be empty");
    }
    Ok(key)
}

fn settings(paths: &Paths, action: SettingsAction) -> anyhow::Result<()> {
    let mut current = Settings::load_from(&paths.settings)?;

    match action {
        SettingsAction::Show => print_settings(&current),
        SettingsAction::Reset => {
            current.reset();
            current.save_to(&paths.settings)?;
            println!("Settings reset to defaults.");
        }
        SettingsAction::Set {
            city,
            font,
            font_size,
            background_color,
            unit,
            pressure,
            time_format,
        } => {
            if let Some(city) = city {
                current.city = city;
            }
            if let Some(font) = font {
                config::validate_font(&font)?;
                current.font = font;
            }
            if let Some(size) = font_size {
                config::validate_font_size(size)?;
                current.font_size = size;
            }
            if let Some(color) = background_color {
                current.background_color = color;
            }
            if let Some(unit) = unit {
                current.temperature_unit = unit;
            }
            if let Some(pressure) = pressure {
                current.pressure_unit = pressure;
            }
            if let Some(time_format) = time_format {
                current.time_format = time_format;
            }

            current.validate()?;
            current.save_to(&paths.settings)?;
            print_settings(&current);
        }
    }

    Ok(())
}

fn print_settings(s: &Settings) {
    println!("city:             {}", s.city);
    println!("background color: {}", s.background_color);
    println!("font:             {} (one of: {})", s.font, FONTS.join(", "));
    println!("font size:        {}", s.font_size);
    println!("time format:      {}", s.time_format);
    println!("temperature unit: {}", s.temperature_unit);
    println!("pressure unit:    {}", s.pressure_unit);
}
