//! Byte fetching on top of a [`Transport`], with status checking and error
//! classification.

use async_trait::async_trait;
use bytes::Bytes;
use std::{fmt::Debug, sync::Arc};
use url::Url;

use crate::{
    Config,
    error::NetworkError,
    transport::{HttpTransport, Transport, TransportError},
};

#[async_trait]
pub trait DataFetcher: Send + Sync + Debug {
    /// Fetch the complete payload at `url`.
    async fn fetch_data(&self, url: &str) -> Result<Bytes, NetworkError>;
}

/// Stateless fetch service; safe to share and call concurrently.
#[derive(Debug, Clone)]
pub struct NetworkService {
    transport: Arc<dyn Transport>,
}

impl NetworkService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Service over a reqwest transport using the configured timeout.
    pub fn from_config(config: &Config) -> Result<Self, NetworkError> {
        let transport = HttpTransport::new(config.timeout()).map_err(NetworkError::from)?;
        Ok(Self::new(Arc::new(transport)))
    }
}

#[async_trait]
impl DataFetcher for NetworkService {
    async fn fetch_data(&self, url: &str) -> Result<Bytes, NetworkError> {
        let url = parse_url(url)?;

        let response = self.transport.data_from(&url).await?;
        if !response.is_success() {
            return Err(NetworkError::InvalidResponse);
        }

        Ok(response.body)
    }
}

/// Validate a location before any network call is made.
pub fn parse_url(raw: &str) -> Result<Url, NetworkError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(NetworkError::InvalidUrl);
    }

    let url = Url::parse(raw).map_err(|_| NetworkError::InvalidUrl)?;
    if url.cannot_be_a_base() || url.host_str().is_none_or(str::is_empty) {
        return Err(NetworkError::InvalidUrl);
    }

    Ok(url)
}

impl From<TransportError> for NetworkError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NotConnected | TransportError::ConnectionLost => Self::NoConnection,
            TransportError::BadUrl(_) | TransportError::UnsupportedUrl(_) => Self::InvalidUrl,
            TransportError::CannotFindHost(_) | TransportError::BadServerResponse => {
                Self::InvalidResponse
            }
            TransportError::TimedOut => Self::Timeout,
            TransportError::AuthenticationRequired => Self::Unauthorized,
            TransportError::AuthenticationCancelled => Self::Forbidden,
            TransportError::HostUnreachable(_) => Self::InvalidResponse,
            TransportError::Other(cause) if (500..=599).contains(&cause.code()) => {
                Self::ServerError
            }
            TransportError::ResourceUnavailable => Self::ServiceUnavailable,
            TransportError::Classified(Self::InvalidResponse) => Self::InvalidResponse,
            TransportError::Classified(kind) => Self::custom(kind.as_cause()),
            TransportError::Other(cause) => Self::custom(cause),
        }
    }
}
