use crate::{
    config::Credentials,
    error::WeatherError,
    model::{AddressInfo, GeoPoint, WeatherReading},
    provider::{
        nominatim::NominatimReverseGeocoder, opencage::OpenCageGeocoder,
        openweather::OpenWeatherProvider,
    },
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::{fmt::Debug, time::Duration};

pub mod nominatim;
pub mod opencage;
pub mod openweather;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("cityweather/", env!("CARGO_PKG_VERSION"));

/// Current conditions by city name. `Ok(None)` means the provider has no such city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> Result<Option<WeatherReading>, WeatherError>;
}

/// Forward geocoding: city name to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn locate(&self, city: &str) -> Result<Option<GeoPoint>, WeatherError>;
}

/// Reverse geocoding: coordinates to country and postal code.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync + Debug {
    async fn address(&self, point: GeoPoint) -> Result<Option<AddressInfo>, WeatherError>;
}

/// The three remote roles a lookup needs.
#[derive(Debug)]
pub struct Providers {
    pub weather: Box<dyn WeatherProvider>,
    pub geocoder: Box<dyn Geocoder>,
    pub reverse: Box<dyn ReverseGeocoder>,
}

/// Construct the default HTTP-backed providers from credentials.
pub fn providers_from_credentials(credentials: &Credentials) -> Result<Providers, WeatherError> {
    let http = http_client()?;

    Ok(Providers {
        weather: Box::new(OpenWeatherProvider::new(
            credentials.weather_api_key.clone(),
            http.clone(),
        )),
        geocoder: Box::new(OpenCageGeocoder::new(
            credentials.geocoding_api_key.clone(),
            http.clone(),
        )),
        reverse: Box::new(NominatimReverseGeocoder::new(http)),
    })
}

/// Shared client: request timeout plus an identifying User-Agent (Nominatim requires one).
pub fn http_client() -> Result<Client, WeatherError> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| WeatherError::network("http", format!("failed to build HTTP client: {e}")))
}

/// Read status and body together; body read failures become network errors.
pub(crate) async fn read_body(
    provider: &'static str,
    res: Response,
) -> Result<(StatusCode, String), WeatherError> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| WeatherError::from_reqwest(provider, "failed to read response body", &e))?;
    Ok((status, body))
}

/// 5xx, 408 and 429 are flagged transient so the retry policy may try again.
pub(crate) fn status_error(provider: &'static str, status: StatusCode, body: &str) -> WeatherError {
    let message = format!("status {}: {}", status, truncate_body(body));
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        WeatherError::transient(provider, message)
    } else {
        WeatherError::network(provider, message)
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
