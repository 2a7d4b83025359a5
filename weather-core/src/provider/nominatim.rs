//! Reverse geocoding through Nominatim (OpenStreetMap). No API key required.
//!
//! Country and postal code come from the structured `address` object. A field
//! missing there stays empty. Only a response with no `address` object at all
//! falls back to a positional split of `display_name`, which assumes the
//! country is the last component and the postal code the one before it. That
//! holds for much of Europe but not everywhere.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::WeatherError,
    model::{AddressInfo, GeoPoint},
};

use super::{ReverseGeocoder, read_body, status_error};

const PROVIDER: &str = "nominatim";
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Clone)]
pub struct NominatimReverseGeocoder {
    base_url: String,
    http: Client,
}

impl NominatimReverseGeocoder {
    pub fn new(http: Client) -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), http }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    display_name: Option<String>,
    address: Option<NominatimAddress>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    country: Option<String>,
    postcode: Option<String>,
}

/// Split a formatted address on `", "`: country is the last token, postal code
/// the second-to-last. Single-token addresses leave the postal code empty.
pub fn parse_display_name(display_name: &str) -> AddressInfo {
    let parts: Vec<&str> = display_name.split(", ").collect();
    let country = parts.last().copied().unwrap_or_default();
    let postal_code = if parts.len() >= 2 { parts[parts.len() - 2] } else { "" };

    AddressInfo { country: country.to_string(), postal_code: postal_code.to_string() }
}

fn parse_address(body: &str) -> Result<Option<AddressInfo>, WeatherError> {
    let parsed: NominatimResponse = serde_json::from_str(body)
        .map_err(|e| WeatherError::network(PROVIDER, format!("failed to parse JSON: {e}")))?;

    if let Some(reason) = parsed.error {
        tracing::debug!(%reason, "reverse geocoder found no address");
        return Ok(None);
    }

    if let Some(address) = parsed.address {
        if address.country.is_none() && address.postcode.is_none() {
            return Ok(None);
        }
        return Ok(Some(AddressInfo {
            country: address.country.unwrap_or_default(),
            postal_code: address.postcode.unwrap_or_default(),
        }));
    }

    Ok(parsed.display_name.as_deref().map(parse_display_name))
}

#[async_trait]
impl ReverseGeocoder for NominatimReverseGeocoder {
    async fn address(&self, point: GeoPoint) -> Result<Option<AddressInfo>, WeatherError> {
        let url = format!("{}/reverse", self.base_url);
        let lat = point.latitude.to_string();
        let lon = point.longitude.to_string();
        tracing::debug!(%lat, %lon, "reverse geocoding");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "jsonv2"),
                ("addressdetails", "1"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::from_reqwest(PROVIDER, "failed to send request", &e))?;

        let (status, body) = read_body(PROVIDER, res).await?;
        if !status.is_success() {
            return Err(status_error(PROVIDER, status, &body));
        }

        parse_address(&body)
    }
}
