use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use crate::{
    error::{ErrorCause, NetworkError},
    model::{Coordinate, CurrentWeather, Forecast},
};

pub mod openweather;

pub use openweather::OpenWeatherService;

/// Weather lookups for a coordinate.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    async fn current_weather(&self, coordinate: Coordinate)
    -> Result<CurrentWeather, NetworkError>;

    async fn forecast(&self, coordinate: Coordinate) -> Result<Forecast, NetworkError>;
}

/// Decode a JSON payload, mapping failures to a `decode` cause.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T, NetworkError> {
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::warn!(error = %e, "Failed to decode {what} payload");
        NetworkError::custom(ErrorCause::decode(&e))
    })
}
