use async_trait::async_trait;
use reqwest::Client;
use std::{error::Error as StdError, io, time::Duration};

use crate::error::{ErrorCause, HTTP_DOMAIN};

use super::{Transport, TransportError, TransportRequest, TransportResponse};

const USER_AGENT: &str = concat!("weather-core/", env!("CARGO_PKG_VERSION"));

/// [`Transport`] backed by a reqwest [`Client`].
///
/// reqwest aborts the underlying request when the send future is dropped, so
/// callers cancel simply by abandoning the future.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Other(ErrorCause::new(HTTP_DOMAIN, -1, e.to_string())))?;

        Ok(Self::with_client(http))
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn data_for(
        &self,
        request: &TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        if !matches!(request.url.scheme(), "http" | "https") {
            return Err(TransportError::UnsupportedUrl(request.url.to_string()));
        }

        let res = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = res.status().as_u16();
        let body = res.bytes().await.map_err(map_reqwest_error)?;

        tracing::debug!(
            method = %request.method,
            url = %redacted(&request.url),
            status,
            bytes = body.len(),
            "exchange completed"
        );

        Ok(TransportResponse::new(status, body))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    let url = err.url().map(redacted).unwrap_or_default();
    tracing::debug!(%url, error = %err, "exchange failed");

    if err.is_builder() {
        return TransportError::BadUrl(url);
    }
    if err.is_timeout() {
        return TransportError::TimedOut;
    }
    if err.is_connect() {
        return classify_connect(&err, url);
    }
    if err.is_body() || err.is_decode() {
        return TransportError::BadServerResponse;
    }
    if connection_dropped(&err) {
        return TransportError::ConnectionLost;
    }

    let code = err.status().map_or(-1, |s| i64::from(s.as_u16()));
    TransportError::Other(ErrorCause::new(HTTP_DOMAIN, code, err.to_string()))
}

/// Narrow a connect failure down by walking its source chain.
fn classify_connect(err: &(dyn StdError + 'static), host: String) -> TransportError {
    let mut source = err.source();
    while let Some(inner) = source {
        // hyper-util's resolver failure is only exposed through its Display
        // text ("dns error"); the error type itself is private.
        if inner.to_string().contains("dns error") {
            return TransportError::CannotFindHost(host);
        }
        if let Some(io_err) = inner.downcast_ref::<io::Error>() {
            return match io_err.kind() {
                io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe => TransportError::ConnectionLost,
                io::ErrorKind::NetworkUnreachable | io::ErrorKind::NetworkDown => {
                    TransportError::NotConnected
                }
                io::ErrorKind::HostUnreachable | io::ErrorKind::ConnectionRefused => {
                    TransportError::HostUnreachable(host)
                }
                io::ErrorKind::TimedOut => TransportError::TimedOut,
                _ => TransportError::NotConnected,
            };
        }
        source = inner.source();
    }

    TransportError::NotConnected
}

/// Peer accepted the connection, then closed or reset it before a complete
/// response arrived.
fn connection_dropped(err: &(dyn StdError + 'static)) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(hyper_err) = inner.downcast_ref::<hyper::Error>() {
            if hyper_err.is_incomplete_message() || hyper_err.is_closed() {
                return true;
            }
        }
        if let Some(io_err) = inner.downcast_ref::<io::Error>() {
            return matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            );
        }
        source = inner.source();
    }
    false
}

/// URL without its query string, which carries the API key.
fn redacted(url: &url::Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
