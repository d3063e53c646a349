use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

use crate::{
    config::{Config, Units},
    error::NetworkError,
    fetch::DataFetcher,
    model::{Coordinate, CurrentWeather, Forecast},
};

use super::{WeatherService, decode};

const CURRENT_PATH: &str = "data/2.5/weather";
const FORECAST_PATH: &str = "data/2.5/forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherService {
    fetcher: Arc<dyn DataFetcher>,
    base_url: Url,
    api_key: String,
    units: Units,
}

impl OpenWeatherService {
    pub fn new(fetcher: Arc<dyn DataFetcher>, base_url: Url, api_key: String, units: Units) -> Self {
        Self {
            fetcher,
            base_url,
            api_key,
            units,
        }
    }

    pub fn from_config(fetcher: Arc<dyn DataFetcher>, config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            fetcher,
            config.base_url()?,
            config.api_key()?.to_owned(),
            config.units,
        ))
    }

    pub fn current_weather_url(&self, coordinate: Coordinate) -> Result<Url, NetworkError> {
        self.coordinate_url(CURRENT_PATH, coordinate)
    }

    pub fn forecast_url(&self, coordinate: Coordinate) -> Result<Url, NetworkError> {
        self.coordinate_url(FORECAST_PATH, coordinate)
    }

    fn coordinate_url(&self, path: &str, coordinate: Coordinate) -> Result<Url, NetworkError> {
        if !coordinate.is_valid() {
            return Err(NetworkError::InvalidUrl);
        }

        let mut url = endpoint(&self.base_url, path)?;
        url.query_pairs_mut()
            .append_pair("lat", &coordinate.latitude.to_string())
            .append_pair("lon", &coordinate.longitude.to_string())
            .append_pair("appid", &self.api_key)
            .append_pair("units", self.units.as_str());

        Ok(url)
    }
}

/// Join `path` onto `base`, treating `base` as a directory.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, NetworkError> {
    if base.cannot_be_a_base() {
        return Err(NetworkError::InvalidUrl);
    }

    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.set_query(None);

    base.join(path).map_err(|_| NetworkError::InvalidUrl)
}

#[async_trait]
impl WeatherService for OpenWeatherService {
    async fn current_weather(
        &self,
        coordinate: Coordinate,
    ) -> Result<CurrentWeather, NetworkError> {
        let url = self.current_weather_url(coordinate)?;
        let data = self.fetcher.fetch_data(url.as_str()).await?;
        decode(&data, "current weather")
    }

    async fn forecast(&self, coordinate: Coordinate) -> Result<Forecast, NetworkError> {
        let url = self.forecast_url(coordinate)?;
        let data = self.fetcher.fetch_data(url.as_str()).await?;
        decode(&data, "forecast")
    }
}
