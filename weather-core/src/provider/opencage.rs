use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{error::WeatherError, model::GeoPoint};

use super::{Geocoder, read_body, status_error};

const PROVIDER: &str = "opencage";
const DEFAULT_BASE_URL: &str = "https://api.opencagedata.com";

#[derive(Debug, Clone)]
pub struct OpenCageGeocoder {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenCageGeocoder {
    pub fn new(api_key: String, http: Client) -> Self {
        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct OcGeometry {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct OcResult {
    geometry: OcGeometry,
}

#[derive(Debug, Deserialize)]
struct OcResponse {
    #[serde(default)]
    results: Vec<OcResult>,
}

fn parse_first_point(body: &str) -> Result<Option<GeoPoint>, WeatherError> {
    let parsed: OcResponse = serde_json::from_str(body)
        .map_err(|e| WeatherError::network(PROVIDER, format!("failed to parse JSON: {e}")))?;

    Ok(parsed
        .results
        .into_iter()
        .next()
        .map(|r| GeoPoint { latitude: r.geometry.lat, longitude: r.geometry.lng }))
}

#[async_trait]
impl Geocoder for OpenCageGeocoder {
    async fn locate(&self, city: &str) -> Result<Option<GeoPoint>, WeatherError> {
        let url = format!("{}/geocode/v1/json", self.base_url);
        tracing::debug!(%city, "forward geocoding");

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| WeatherError::from_reqwest(PROVIDER, "failed to send request", &e))?;

        let (status, body) = read_body(PROVIDER, res).await?;
        if !status.is_success() {
            return Err(status_error(PROVIDER, status, &body));
        }

        parse_first_point(&body)
    }
}
