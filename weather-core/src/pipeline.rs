//! The lookup sequence: weather, forward geocoding, reverse geocoding, then
//! conversion and rendering.

use chrono::{Local, NaiveDateTime};

use crate::{
    clock,
    config::Credentials,
    error::WeatherError,
    model::{DisplayUnits, FormattedReport, WeatherQuery},
    provider::{Providers, providers_from_credentials},
    report,
    retry::RetryPolicy,
};

#[derive(Debug)]
pub struct WeatherLookup {
    providers: Providers,
    retry: RetryPolicy,
}

impl WeatherLookup {
    pub fn new(providers: Providers) -> Self {
        Self { providers, retry: RetryPolicy::default() }
    }

    pub fn from_credentials(credentials: &Credentials) -> Result<Self, WeatherError> {
        Ok(Self::new(providers_from_credentials(credentials)?))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Look up `city` and render the report against the local clock.
    pub async fn lookup(
        &self,
        city: &str,
        units: DisplayUnits,
    ) -> Result<FormattedReport, WeatherError> {
        self.lookup_at(city, units, Local::now().naive_local()).await
    }

    pub async fn lookup_at(
        &self,
        city: &str,
        units: DisplayUnits,
        now: NaiveDateTime,
    ) -> Result<FormattedReport, WeatherError> {
        let query = WeatherQuery::new(city);
        let Some(city) = query.city() else {
            tracing::debug!("empty city, skipping lookup");
            return Err(WeatherError::EmptyInput);
        };

        tracing::info!(%city, "looking up weather");

        // Both lookups always run; a miss on either side means not found.
        let reading = self
            .retry
            .run("weather", || self.providers.weather.current(city))
            .await?;
        let location = self
            .retry
            .run("geocode", || self.providers.geocoder.locate(city))
            .await?;

        let (Some(reading), Some(location)) = (reading, location) else {
            tracing::info!(%city, "city not found");
            return Err(WeatherError::NotFound);
        };

        let address = self
            .retry
            .run("reverse geocode", || self.providers.reverse.address(location))
            .await?
            .ok_or_else(|| {
                tracing::info!(%city, ?location, "no address for coordinates");
                WeatherError::NotFound
            })?;

        let timestamp = clock::render(now, units.time_format);
        let text = report::render_report(city, &address, location, &timestamp, &reading, units);

        tracing::debug!(%city, "report ready");

        Ok(FormattedReport {
            city: report::capitalize(city),
            location,
            address,
            reading,
            units,
            text,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        model::{AddressInfo, GeoPoint, PressureUnit, TemperatureUnit, TimeFormat, WeatherReading},
        provider::{
            Geocoder, ReverseGeocoder, WeatherProvider, nominatim::NominatimReverseGeocoder,
            opencage::OpenCageGeocoder, openweather::OpenWeatherProvider,
        },
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// In-memory provider double that counts calls.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct Fake {
        pub reading: Option<WeatherReading>,
        pub point: Option<GeoPoint>,
        pub address: Option<AddressInfo>,
        pub fail_weather: bool,
        pub delay: Option<Duration>,
        pub calls: Arc<AtomicUsize>,
    }

    impl Fake {
        pub fn london() -> Self {
            Self {
                reading: Some(WeatherReading {
                    temperature_kelvin: 288.15,
                    pressure_hpa: 1013.0,
                    humidity_pct: 72,
                    description: "clear sky".into(),
                    condition_code: "Clear".into(),
                }),
                point: Some(GeoPoint { latitude: 51.5073219, longitude: -0.1276474 }),
                address: Some(AddressInfo {
                    country: "United Kingdom".into(),
                    postal_code: "WC2N 5DU".into(),
                }),
                ..Self::default()
            }
        }

        pub fn lookup(&self) -> WeatherLookup {
            WeatherLookup::new(Providers {
                weather: Box::new(self.clone()),
                geocoder: Box::new(self.clone()),
                reverse: Box::new(self.clone()),
            })
            .with_retry(RetryPolicy::none())
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for Fake {
        async fn current(&self, _city: &str) -> Result<Option<WeatherReading>, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_weather {
                return Err(WeatherError::network("fake", "connection reset"));
            }
            Ok(self.reading.clone())
        }
    }

    #[async_trait]
    impl Geocoder for Fake {
        async fn locate(&self, _city: &str) -> Result<Option<GeoPoint>, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.point)
        }
    }

    #[async_trait]
    impl ReverseGeocoder for Fake {
        async fn address(&self, _point: GeoPoint) -> Result<Option<AddressInfo>, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.address.clone())
        }
    }

    fn afternoon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(14, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn london_report_in_celsius() {
        let fake = Fake::london();
        let report = fake
            .lookup()
            .lookup_at("london", DisplayUnits::default(), afternoon())
            .await
            .unwrap();

        assert_eq!(report.city, "London");
        assert!(report.text.contains("Temperature: 15.00°C"));
        assert!(report.text.contains("Pressure: 1013 hPa"));
        assert!(report.text.contains("Humidity: 72%"));
        assert!(report.text.contains("Observations: clear sky"));
        assert!(report.text.starts_with("London, WC2N 5DU, United Kingdom\n"));
        assert!(report.text.contains("\n14:30 05/03/2024\n"));
        assert_eq!(fake.calls(), 3);
    }

    #[tokio::test]
    async fn twelve_hour_report() {
        let units = DisplayUnits {
            temperature: TemperatureUnit::Fahrenheit,
            pressure: PressureUnit::Psi,
            time_format: TimeFormat::H12,
        };
        let report = Fake::london().lookup().lookup_at("London", units, afternoon()).await.unwrap();
        assert!(report.text.contains("02:30 PM 05/03/2024"));
        assert!(report.text.contains("Temperature: 59.00°F"));
        assert!(report.text.contains("Pressure: 14.6885 PSI"));
    }

    #[tokio::test]
    async fn blank_city_makes_no_calls() {
        let fake = Fake::london();
        let lookup = fake.lookup();
        for city in ["", "   ", "\t\n"] {
            let err = lookup.lookup_at(city, DisplayUnits::default(), afternoon()).await;
            assert_eq!(err.unwrap_err(), WeatherError::EmptyInput);
        }
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn weather_miss_is_not_found_even_when_geocoded() {
        let fake = Fake { reading: None, ..Fake::london() };
        let err = fake.lookup().lookup("Atlantis", DisplayUnits::default()).await.unwrap_err();
        assert_eq!(err, WeatherError::NotFound);
        // Geocoding still ran; reverse geocoding did not.
        assert_eq!(fake.calls(), 2);
    }

    #[tokio::test]
    async fn geocoder_miss_is_not_found_even_with_weather() {
        let fake = Fake { point: None, ..Fake::london() };
        let err = fake.lookup().lookup("Springfield", DisplayUnits::default()).await.unwrap_err();
        assert_eq!(err, WeatherError::NotFound);
        assert_eq!(fake.calls(), 2);
    }

    #[tokio::test]
    async fn missing_address_is_not_found() {
        let fake = Fake { address: None, ..Fake::london() };
        let err = fake.lookup().lookup("London", DisplayUnits::default()).await.unwrap_err();
        assert_eq!(err, WeatherError::NotFound);
    }

    #[tokio::test]
    async fn provider_failure_surfaces_as_network_error() {
        let fake = Fake { fail_weather: true, ..Fake::london() };
        let err = fake.lookup().lookup("London", DisplayUnits::default()).await.unwrap_err();
        assert!(matches!(err, WeatherError::Network { provider: "fake", .. }));
    }

    fn http_lookup(server: &MockServer) -> WeatherLookup {
        let http = reqwest::Client::new();
        WeatherLookup::new(Providers {
            weather: Box::new(
                OpenWeatherProvider::new("W".into(), http.clone()).with_base_url(server.uri()),
            ),
            geocoder: Box::new(
                OpenCageGeocoder::new("G".into(), http.clone()).with_base_url(server.uri()),
            ),
            reverse: Box::new(NominatimReverseGeocoder::new(http).with_base_url(server.uri())),
        })
        .with_retry(RetryPolicy {
            max_retries: 1,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
        })
    }

    #[tokio::test]
    async fn nonsense_city_over_http_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"cod": "404", "message": "city not found"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/geocode/v1/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"results": [], "total_results": 0})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = http_lookup(&server)
            .lookup("asdkjfhalksjdhf", DisplayUnits::default())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "City not found.");
    }

    #[tokio::test]
    async fn full_http_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "weather": [{"main": "Clouds", "description": "broken clouds"}],
                "main": {"temp": 283.15, "pressure": 1000, "humidity": 81},
                "cod": 200
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/geocode/v1/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"geometry": {"lat": 48.8534951, "lng": 2.3483915}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "display_name": "Paris, Île-de-France, France métropolitaine, 75004, France",
                "address": {"postcode": "75004", "country": "France"}
            })))
            .mount(&server)
            .await;

        let units = DisplayUnits { pressure: PressureUnit::Bar, ..DisplayUnits::default() };
        let report = http_lookup(&server).lookup_at("paris", units, afternoon()).await.unwrap();

        assert_eq!(
            report.text,
            "Paris, 75004, France\n\
             X: 2.3483915, Y: 48.8534951\n\
             14:30 05/03/2024\n\
             Temperature: 10.00°C\n\
             Pressure: 1 BAR\n\
             Humidity: 81%\n\
             Observations: broken clouds"
        );
        assert_eq!(report.reading.condition_code, "Clouds");
    }

    #[tokio::test]
    async fn transient_server_error_is_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let err = http_lookup(&server).lookup("Paris", DisplayUnits::default()).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(err.user_message(), crate::error::MSG_NETWORK);
    }
}
