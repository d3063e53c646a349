//! Report state for a selected address.
//!
//! [`WeatherReporter`] owns what a front end shows: the address list, the
//! latest current conditions and forecast, and an error message that stays
//! until the user acknowledges it. Selecting a new address supersedes any
//! load still in flight, so a slow earlier request can never overwrite a
//! newer report.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{Config, Units},
    display::{CurrentWeatherDisplay, ForecastDisplay},
    error::NetworkError,
    fetch::{DataFetcher, NetworkService},
    geocode::{AddressResolver, OpenWeatherGeocoder},
    service::{OpenWeatherService, WeatherService},
};

pub const COORDINATE_ERROR_MESSAGE: &str =
    "Error fetching co-ordinates for this location. Please try again.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportState {
    pub address: Option<String>,
    pub current: Option<CurrentWeatherDisplay>,
    pub forecast: Option<ForecastDisplay>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded,
    Failed(NetworkError),
    /// A newer load started before this one finished; its result was dropped.
    Superseded,
}

#[derive(Debug)]
pub struct WeatherReporter {
    resolver: Arc<dyn AddressResolver>,
    service: Arc<dyn WeatherService>,
    units: Units,
    addresses: Vec<String>,
    state: Mutex<ReportState>,
    inflight: Mutex<Option<CancellationToken>>,
}

impl WeatherReporter {
    pub fn new(
        resolver: Arc<dyn AddressResolver>,
        service: Arc<dyn WeatherService>,
        units: Units,
        addresses: Vec<String>,
    ) -> Self {
        Self {
            resolver,
            service,
            units,
            addresses,
            state: Mutex::new(ReportState::default()),
            inflight: Mutex::new(None),
        }
    }

    /// Reporter wired to the live OpenWeather endpoints.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let fetcher: Arc<dyn DataFetcher> = Arc::new(NetworkService::from_config(config)?);
        let resolver = OpenWeatherGeocoder::from_config(fetcher.clone(), config)?;
        let service = OpenWeatherService::from_config(fetcher, config)?;

        Ok(Self::new(
            Arc::new(resolver),
            Arc::new(service),
            config.units,
            config.addresses.clone(),
        ))
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn snapshot(&self) -> ReportState {
        self.state.lock().clone()
    }

    /// Clear the pending error message, returning it.
    pub fn acknowledge_error(&self) -> Option<String> {
        self.state.lock().error_message.take()
    }

    /// Load the report for the configured address at `index`.
    pub async fn load_index(&self, index: usize) -> LoadOutcome {
        match self.addresses.get(index).cloned() {
            Some(address) => self.load(&address).await,
            None => {
                let err = NetworkError::NotFound;
                self.state.lock().error_message = Some(err.message().to_string());
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Resolve `address`, then fetch current conditions and forecast
    /// concurrently. Any load still running is cancelled first.
    pub async fn load(&self, address: &str) -> LoadOutcome {
        let token = self.begin();

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(address, "load superseded");
                LoadOutcome::Superseded
            }
            outcome = self.run(address, &token) => outcome,
        }
    }

    fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = self.inflight.lock().replace(token.clone()) {
            previous.cancel();
        }
        token
    }

    async fn run(&self, address: &str, token: &CancellationToken) -> LoadOutcome {
        let coordinate = match self.resolver.resolve(address).await {
            Ok(coordinate) => coordinate,
            Err(err) => {
                tracing::warn!(address, error = ?err, "could not resolve address");
                let applied = self.apply(token, |state| {
                    state.address = Some(address.to_string());
                    state.current = None;
                    state.forecast = None;
                    state.error_message = Some(COORDINATE_ERROR_MESSAGE.to_string());
                });
                return if applied {
                    LoadOutcome::Failed(err)
                } else {
                    LoadOutcome::Superseded
                };
            }
        };

        let (current, forecast) = tokio::join!(
            self.service.current_weather(coordinate),
            self.service.forecast(coordinate),
        );

        let failure = current.as_ref().err().or(forecast.as_ref().err()).cloned();
        if let Some(err) = &failure {
            tracing::warn!(address, error = ?err, "weather lookup failed");
        }

        let units = self.units;
        let applied = self.apply(token, |state| {
            state.address = Some(address.to_string());
            state.current = current.ok().map(|c| CurrentWeatherDisplay::new(&c, units));
            state.forecast = forecast.ok().map(|f| ForecastDisplay::new(&f, units));
            if let Some(err) = &failure {
                state.error_message = Some(err.message().to_string());
            }
        });

        match (applied, failure) {
            (false, _) => LoadOutcome::Superseded,
            (true, Some(err)) => LoadOutcome::Failed(err),
            (true, None) => LoadOutcome::Loaded,
        }
    }

    /// Write into the state unless `token` was superseded.
    fn apply(&self, token: &CancellationToken, update: impl FnOnce(&mut ReportState)) -> bool {
        let mut state = self.state.lock();
        if token.is_cancelled() {
            return false;
        }
        update(&mut state);
        true
    }
}
