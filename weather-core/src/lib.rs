//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - The lookup pipeline (weather, geocoding, reverse geocoding)
//! - Provider abstractions and their HTTP implementations
//! - Unit conversion, clock rendering and report formatting
//! - Settings and credentials handling
//! - A last-request-wins session for running lookups in the background
//!
//! It is used by `cityweather-cli`, but can also be reused by other front ends.

pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod retry;
pub mod session;
pub mod units;

pub use config::{Credentials, Settings};
pub use error::WeatherError;
pub use model::{
    AddressInfo, DisplayUnits, FormattedReport, GeoPoint, PressureUnit, TemperatureUnit,
    TimeFormat, WeatherQuery, WeatherReading,
};
pub use pipeline::WeatherLookup;
pub use provider::{Geocoder, Providers, ReverseGeocoder, WeatherProvider};
pub use retry::RetryPolicy;
pub use session::{LookupSession, Ticket};
