use crate::{Config, WeatherReport, provider::openweather::OpenWeatherClient};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// A source of current weather for a city.
///
/// Implementations make at most one upstream attempt per call and never fail:
/// an unknown city and an unreachable provider both come back as `None`.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, city: &str) -> Option<WeatherReport>;
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?;

    let client = OpenWeatherClient::builder(api_key)
        .base_url(&config.base_url)
        .units(&config.units)
        .lang(&config.lang)
        .timeout(config.timeout())
        .build()?;

    Ok(Arc::new(client))
}
