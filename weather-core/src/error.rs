//! Error kinds surfaced by a weather lookup.

use thiserror::Error;

pub const MSG_EMPTY_INPUT: &str = "Please insert a city.";
pub const MSG_NOT_FOUND: &str = "City not found.";
pub const MSG_NETWORK: &str = "Could not fetch weather data. Check your connection and try again.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherError {
    /// The city text was empty or whitespace only. No request was made.
    #[error("city name is empty")]
    EmptyInput,

    /// A provider had no match for the city.
    #[error("city not found")]
    NotFound,

    /// Transport, HTTP status or payload failure talking to a provider.
    #[error("{provider} request failed: {message}")]
    Network {
        provider: &'static str,
        message: String,
        transient: bool,
    },

    /// Missing credentials or malformed settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// The lookup was superseded by a newer one or cancelled.
    #[error("lookup cancelled")]
    Cancelled,
}

impl WeatherError {
    pub fn network(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Network { provider, message: message.into(), transient: false }
    }

    pub fn transient(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Network { provider, message: message.into(), transient: true }
    }

    /// Map a `reqwest` failure, marking timeouts and connection errors as transient.
    pub fn from_reqwest(provider: &'static str, context: &str, err: &reqwest::Error) -> Self {
        let transient = err.is_timeout() || err.is_connect();
        Self::Network { provider, message: format!("{context}: {err}"), transient }
    }

    /// Text shown to the user in place of a report.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyInput => MSG_EMPTY_INPUT.to_string(),
            Self::NotFound => MSG_NOT_FOUND.to_string(),
            Self::Network { .. } => MSG_NETWORK.to_string(),
            Self::Config(msg) => format!("Configuration error: {msg}"),
            Self::Cancelled => "Lookup cancelled.".to_string(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { transient: true, .. })
    }
}
