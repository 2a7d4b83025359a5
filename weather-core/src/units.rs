//! Temperature and pressure conversions from provider units.
//!
//! The precision is deliberately uneven: Fahrenheit and the non-hPa pressure
//! units are rounded to 5 decimals, the other branches are passed through.

use crate::model::{PressureUnit, TemperatureUnit};

const KELVIN_OFFSET: f64 = 273.15;

const HPA_TO_PSI: f64 = 0.0145;
const HPA_TO_BAR: f64 = 0.001;
const HPA_TO_ATM: f64 = 0.0009869233;

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}

pub fn kelvin_to(unit: TemperatureUnit, kelvin: f64) -> f64 {
    match unit {
        TemperatureUnit::Kelvin => kelvin,
        TemperatureUnit::Celsius => kelvin_to_celsius(kelvin),
        TemperatureUnit::Fahrenheit => round_to(kelvin_to_celsius(kelvin) * 9.0 / 5.0 + 32.0, 5),
    }
}

pub fn hpa_to(unit: PressureUnit, hpa: f64) -> f64 {
    match unit {
        PressureUnit::Hpa => hpa,
        PressureUnit::Psi => round_to(hpa * HPA_TO_PSI, 5),
        PressureUnit::Bar => round_to(hpa * HPA_TO_BAR, 5),
        PressureUnit::Atm => round_to(hpa * HPA_TO_ATM, 5),
    }
}

pub fn temperature_symbol(unit: TemperatureUnit) -> &'static str {
    match unit {
        TemperatureUnit::Celsius => "°C",
        TemperatureUnit::Fahrenheit => "°F",
        TemperatureUnit::Kelvin => "°K",
    }
}
