//! Address to coordinate resolution via OpenWeather's direct geocoding API.

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use url::Url;

use crate::{
    config::Config,
    error::NetworkError,
    fetch::DataFetcher,
    model::{Coordinate, GeocodedPlace},
    service::{decode, openweather::endpoint},
};

const DIRECT_PATH: &str = "geo/1.0/direct";

#[async_trait]
pub trait AddressResolver: Send + Sync + Debug {
    async fn resolve(&self, address: &str) -> Result<Coordinate, NetworkError>;
}

#[derive(Debug, Clone)]
pub struct OpenWeatherGeocoder {
    fetcher: Arc<dyn DataFetcher>,
    base_url: Url,
    api_key: String,
}

impl OpenWeatherGeocoder {
    pub fn new(fetcher: Arc<dyn DataFetcher>, base_url: Url, api_key: String) -> Self {
        Self {
            fetcher,
            base_url,
            api_key,
        }
    }

    pub fn from_config(fetcher: Arc<dyn DataFetcher>, config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(fetcher, config.base_url()?, config.api_key()?.to_owned()))
    }

    fn lookup_url(&self, address: &str) -> Result<Url, NetworkError> {
        let mut url = endpoint(&self.base_url, DIRECT_PATH)?;
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("limit", "1")
            .append_pair("appid", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl AddressResolver for OpenWeatherGeocoder {
    async fn resolve(&self, address: &str) -> Result<Coordinate, NetworkError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(NetworkError::InvalidUrl);
        }

        let url = self.lookup_url(address)?;
        let data = self.fetcher.fetch_data(url.as_str()).await?;
        let places: Vec<GeocodedPlace> = decode(&data, "geocoding")?;

        let place = places.into_iter().next().ok_or(NetworkError::NotFound)?;
        tracing::debug!(address, place = %place.name, lat = place.lat, lon = place.lon, "resolved address");

        let coordinate = Coordinate::new(place.lat, place.lon);
        if !coordinate.is_valid() {
            return Err(NetworkError::InvalidData);
        }
        Ok(coordinate)
    }
}
