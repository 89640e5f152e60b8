use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};
use std::time::Duration;

use crate::{error::FetchError, model::WeatherReport};

use super::WeatherProvider;

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

/// Client for the OpenWeather "current weather" endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    units: String,
    lang: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn builder(api_key: &str) -> OpenWeatherClientBuilder {
        OpenWeatherClientBuilder {
            api_key: api_key.to_string(),
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            units: "metric".to_string(),
            lang: "ru".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Single attempt against the provider, keeping the reason for a miss.
    pub async fn try_fetch(&self, city: &str) -> Result<WeatherReport, FetchError> {
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status { status });
        }

        let body = res.text().await?;
        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;

        Ok(parsed.into_report())
    }
}

pub struct OpenWeatherClientBuilder {
    api_key: String,
    base_url: String,
    units: String,
    lang: String,
    timeout: Duration,
}

impl OpenWeatherClientBuilder {
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn units(mut self, units: &str) -> Self {
        self.units = units.to_string();
        self
    }

    pub fn lang(mut self, lang: &str) -> Self {
        self.lang = lang.to_string();
        self
    }

    /// Bounds the whole request, connect through body read.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> reqwest::Result<OpenWeatherClient> {
        let http = Client::builder().timeout(self.timeout).build()?;

        Ok(OpenWeatherClient {
            api_key: self.api_key,
            base_url: self.base_url,
            units: self.units,
            lang: self.lang,
            http,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    #[serde(default, deserialize_with = "lenient_f64")]
    temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    feels_like: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    humidity: Option<Number>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    #[serde(default, deserialize_with = "lenient_number")]
    speed: Option<Number>,
}

// A mistyped optional field (e.g. `"humidity": "60"`) drops that line, not the whole report.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(lenient_number(deserializer)?.and_then(|n| n.as_f64()))
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Number>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(Some(n)),
        _ => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    weather: Option<Vec<OwWeather>>,
    main: Option<OwMain>,
    wind: Option<OwWind>,
}

impl OwCurrentResponse {
    fn into_report(self) -> WeatherReport {
        let description = self
            .weather
            .and_then(|w| w.into_iter().next())
            .and_then(|w| w.description);

        let (temperature, feels_like, humidity) = match self.main {
            Some(main) => (main.temp, main.feels_like, main.humidity),
            None => (None, None, None),
        };

        WeatherReport {
            location_name: self.name.unwrap_or_default(),
            description,
            temperature,
            feels_like,
            humidity,
            wind_speed: self.wind.and_then(|w| w.speed),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch(&self, city: &str) -> Option<WeatherReport> {
        match self.try_fetch(city).await {
            Ok(report) => {
                tracing::debug!(city, location = %report.location_name, "weather lookup succeeded");
                Some(report)
            }
            Err(FetchError::Status { status }) => {
                tracing::debug!(city, %status, "weather lookup rejected by provider");
                None
            }
            Err(err) => {
                tracing::warn!(city, error = %err, "weather lookup failed");
                None
            }
        }
    }
}
