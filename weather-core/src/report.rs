use crate::{
    model::{AddressInfo, DisplayUnits, GeoPoint, WeatherReading},
    units,
};

/// Upper-case the first character and lower-case the rest ("new YORK" -> "New york").
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Compose the seven-line report shown to the user.
pub fn render_report(
    city: &str,
    address: &AddressInfo,
    location: GeoPoint,
    timestamp: &str,
    reading: &WeatherReading,
    units: DisplayUnits,
) -> String {
    let temperature = units::kelvin_to(units.temperature, reading.temperature_kelvin);
    let pressure = units::hpa_to(units.pressure, reading.pressure_hpa);

    format!(
        "{}, {}, {}\n\
         X: {}, Y: {}\n\
         {}\n\
         Temperature: {:.2}{}\n\
         Pressure: {} {}\n\
         Humidity: {}%\n\
         Observations: {}",
        capitalize(city),
        address.postal_code,
        address.country,
        location.longitude,
        location.latitude,
        timestamp,
        temperature,
        units::temperature_symbol(units.temperature),
        pressure,
        units.pressure,
        reading.humidity_pct,
        reading.description,
    )
}
