use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::{error::WeatherError, model::WeatherReading};

use super::{WeatherProvider, read_body, status_error};

const PROVIDER: &str = "openweather";
const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Current weather from OpenWeather. Temperatures come back in Kelvin
/// because no `units` parameter is sent.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, http: Client) -> Self {
        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    pressure: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
}

/// `cod` is a number on success and a string on errors.
fn is_not_found_code(cod: Option<&Value>) -> bool {
    match cod {
        Some(Value::String(s)) => s == "404",
        Some(Value::Number(n)) => n.as_u64() == Some(404),
        _ => false,
    }
}

fn parse_current(body: &str) -> Result<Option<WeatherReading>, WeatherError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| WeatherError::network(PROVIDER, format!("failed to parse JSON: {e}")))?;

    if is_not_found_code(value.get("cod")) {
        return Ok(None);
    }

    let parsed: OwCurrentResponse = serde_json::from_value(value)
        .map_err(|e| WeatherError::network(PROVIDER, format!("unexpected JSON shape: {e}")))?;

    let (description, condition_code) = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| (w.description, w.main))
        .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

    Ok(Some(WeatherReading {
        temperature_kelvin: parsed.main.temp,
        pressure_hpa: parsed.main.pressure,
        humidity_pct: parsed.main.humidity,
        description,
        condition_code,
    }))
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str) -> Result<Option<WeatherReading>, WeatherError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        tracing::debug!(%city, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[("appid", self.api_key.as_str()), ("q", city)])
            .send()
            .await
            .map_err(|e| WeatherError::from_reqwest(PROVIDER, "failed to send request", &e))?;

        let (status, body) = read_body(PROVIDER, res).await?;

        // A wrong path or proxy page also answers 404; only the API's own
        // `cod` body means the city is unknown.
        if status == StatusCode::NOT_FOUND {
            if let Ok(None) = parse_current(&body) {
                tracing::debug!(%city, "weather provider has no such city");
                return Ok(None);
            }
            return Err(status_error(PROVIDER, status, &body));
        }
        if !status.is_success() {
            return Err(status_error(PROVIDER, status, &body));
        }

        parse_current(&body)
    }
}
