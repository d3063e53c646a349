//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - A closed taxonomy of classified network errors
//! - A substitutable transport seam and the fetch service built on it
//! - The OpenWeather facade (geocoding, current weather, forecast)
//! - Report state with supersession of in-flight loads
//! - Configuration & credentials handling
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod display;
pub mod error;
pub mod fetch;
pub mod geocode;
pub mod model;
pub mod report;
pub mod service;
pub mod transport;

pub use config::{Config, Units};
pub use display::{CurrentWeatherDisplay, ForecastDisplay, ForecastItemDisplay};
pub use error::{ErrorCause, NetworkError};
pub use fetch::{DataFetcher, NetworkService};
pub use geocode::{AddressResolver, OpenWeatherGeocoder};
pub use model::{Coordinate, CurrentWeather, Forecast};
pub use report::{LoadOutcome, ReportState, WeatherReporter};
pub use service::{OpenWeatherService, WeatherService};
pub use transport::{HttpTransport, Transport, TransportError, TransportRequest, TransportResponse};
