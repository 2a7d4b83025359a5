use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub city: String,
}

impl WeatherQuery {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into() }
    }

    /// Trimmed city text, or `None` when nothing but whitespace was entered.
    pub fn city(&self) -> Option<&str> {
        let trimmed = self.city.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Current conditions as reported by the weather provider, in provider units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature_kelvin: f64,
    pub pressure_hpa: f64,
    pub humidity_pct: u8,
    pub description: String,
    pub condition_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub country: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayUnits {
    pub temperature: TemperatureUnit,
    pub pressure: PressureUnit,
    pub time_format: TimeFormat,
}

/// A rendered lookup result together with the values it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedReport {
    pub city: String,
    pub location: GeoPoint,
    pub address: AddressInfo,
    pub reading: WeatherReading,
    pub units: DisplayUnits,
    pub text: String,
}

impl fmt::Display for FormattedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Declares a unit-like enum that round-trips through its display label,
/// both in `Display`/`TryFrom<&str>` and in serde.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $variant:ident => $label:literal ),+ $(,)?
        }
        default = $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $( $variant, )+
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            pub const fn all() -> &'static [$name] {
                &[$( $name::$variant ),+]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<&str> for $name {
            type Error = anyhow::Error;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                let wanted = value.trim();
                $name::all()
                    .iter()
                    .copied()
                    .find(|unit| unit.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        let known: Vec<&str> = $name::all().iter().map(|u| u.as_str()).collect();
                        anyhow::anyhow!(
                            "Unknown {} '{value}'. Supported values: {}.",
                            $kind,
                            known.join(", ")
                        )
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = anyhow::Error;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                $name::try_from(value.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::try_from(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

labelled_enum! {
    TemperatureUnit, "temperature unit" {
        Celsius => "Celsius",
        Fahrenheit => "Fahrenheit",
        Kelvin => "Kelvin",
    }
    default = Celsius
}

labelled_enum! {
    PressureUnit, "pressure unit" {
        Hpa => "hPa",
        Psi => "PSI",
        Bar => "BAR",
        Atm => "ATM",
    }
    default = Hpa
}

labelled_enum! {
    TimeFormat, "time format" {
        H12 => "12h",
        H24 => "24h",
    }
    default = H24
}
