use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    Method,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use std::fmt::Debug;
use thiserror::Error;
use url::Url;

use crate::error::{ErrorCause, NetworkError};

pub mod http;

pub use http::HttpTransport;

/// A single request to hand to a [`Transport`].
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl TransportRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Raw outcome of a completed exchange. Whether it counts as success is
/// decided by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Failure signals a transport can report when an exchange does not complete.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("not connected to the internet")]
    NotConnected,

    #[error("network connection was lost")]
    ConnectionLost,

    #[error("bad URL: {0}")]
    BadUrl(String),

    #[error("unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("cannot find host: {0}")]
    CannotFindHost(String),

    #[error("bad server response")]
    BadServerResponse,

    #[error("request timed out")]
    TimedOut,

    #[error("user authentication required")]
    AuthenticationRequired,

    #[error("user cancelled authentication")]
    AuthenticationCancelled,

    #[error("host unreachable: {0}")]
    HostUnreachable(String),

    #[error("resource unavailable")]
    ResourceUnavailable,

    #[error(transparent)]
    Classified(NetworkError),

    #[error("{0}")]
    Other(ErrorCause),
}

/// One request/response exchange with a remote server.
///
/// Dropping the returned future must abort any in-flight request; no
/// completion may be observed afterwards.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn data_from(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        self.data_for(&TransportRequest::get(url.clone())).await
    }

    async fn data_for(&self, request: &TransportRequest)
    -> Result<TransportResponse, TransportError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_inclusive() {
        assert!(TransportResponse::new(200, Bytes::new()).is_success());
        assert!(TransportResponse::new(299, Bytes::new()).is_success());
        assert!(!TransportResponse::new(199, Bytes::new()).is_success());
        assert!(!TransportResponse::new(300, Bytes::new()).is_success());
    }

    #[test]
    fn get_request_carries_headers() {
        let url = Url::parse("https://example.com/a").unwrap();
        let req = TransportRequest::get(url.clone())
            .with_header(reqwest::header::ACCEPT, HeaderValue::from_static("application/json"));

        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url, url);
        assert_eq!(req.headers.get(reqwest::header::ACCEPT).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn data_from_goes_through_data_for() {
        let transport = stub::StubTransport::responding(204, b"");
        let url = Url::parse("https://example.com/x").unwrap();

        let res = transport.data_from(&url).await.unwrap();

        assert_eq!(res.status, 204);
        assert_eq!(transport.calls(), 1);
        assert_eq!(transport.last_url(), Some(url));
    }
}
