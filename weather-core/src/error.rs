//! Classified network errors.
//!
//! Every failure that can happen between the weather service and the remote
//! API ends up as exactly one [`NetworkError`] kind, each with one fixed
//! user-facing message.

use std::{fmt, mem};

use thiserror::Error;

/// User-facing messages, one per error kind.
pub mod messages {
    pub const INVALID_URL: &str = "The URL provided is invalid. Please verify the server endpoints.";
    pub const INVALID_DATA: &str =
        "The data format is unsupported. Please ensure the data format is correct.";
    pub const INVALID_RESPONSE: &str =
        "Received an invalid response from the server. Please try again.";
    pub const UNKNOWN: &str = "An unexpected error occurred. Please try again.";
    pub const NO_CONNECTION: &str =
        "No internet connection detected. Please check your connection and try again.";
    pub const TIMEOUT: &str = "The request timed out. Please check your connection and try again.";
    pub const UNAUTHORIZED: &str =
        "Unauthorized access. Please check your credentials and try again.";
    pub const FORBIDDEN: &str =
        "You do not have permission to access this resource. Please contact support.";
    pub const NOT_FOUND: &str =
        "The requested resource could not be found. Please verify the URL and try again.";
    pub const SERVER_ERROR: &str = "The server encountered an error. Please try again later.";
    pub const SERVICE_UNAVAILABLE: &str =
        "The service is currently unavailable. Please try again later.";
}

/// Domain used when an already-classified kind is wrapped as a cause.
pub const NETWORK_DOMAIN: &str = "network";
/// Domain used for JSON decoding failures.
pub const DECODE_DOMAIN: &str = "decode";
/// Domain used for opaque HTTP client failures.
pub const HTTP_DOMAIN: &str = "http";

/// Opaque underlying cause carried by [`NetworkError::Custom`].
///
/// Two causes are equal when their `(domain, code)` pair matches; the
/// description is diagnostic text only.
#[derive(Debug, Clone)]
pub struct ErrorCause {
    domain: String,
    code: i64,
    description: String,
}

impl ErrorCause {
    pub fn new(domain: impl Into<String>, code: i64, description: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            code,
            description: description.into(),
        }
    }

    /// Cause for a payload that could not be decoded into the expected record.
    pub fn decode(err: &serde_json::Error) -> Self {
        use serde_json::error::Category;

        let code = match err.classify() {
            Category::Io => 1,
            Category::Syntax => 2,
            Category::Data => 3,
            Category::Eof => 4,
        };
        Self::new(DECODE_DOMAIN, code, err.to_string())
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl PartialEq for ErrorCause {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain && self.code == other.code
    }
}

impl Eq for ErrorCause {}

impl fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.domain, self.code, self.description)
    }
}

#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("{}", messages::INVALID_URL)]
    InvalidUrl,

    #[error("{}", messages::INVALID_DATA)]
    InvalidData,

    #[error("{}", messages::INVALID_RESPONSE)]
    InvalidResponse,

    #[error("{}", messages::NO_CONNECTION)]
    NoConnection,

    #[error("{}", messages::TIMEOUT)]
    Timeout,

    #[error("{}", messages::UNAUTHORIZED)]
    Unauthorized,

    #[error("{}", messages::FORBIDDEN)]
    Forbidden,

    #[error("{}", messages::NOT_FOUND)]
    NotFound,

    #[error("{}", messages::SERVER_ERROR)]
    ServerError,

    #[error("{}", messages::SERVICE_UNAVAILABLE)]
    ServiceUnavailable,

    #[error("{}", messages::UNKNOWN)]
    Custom(Option<ErrorCause>),
}

impl NetworkError {
    /// Message shown to the user for this kind.
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidUrl => messages::INVALID_URL,
            Self::InvalidData => messages::INVALID_DATA,
            Self::InvalidResponse => messages::INVALID_RESPONSE,
            Self::NoConnection => messages::NO_CONNECTION,
            Self::Timeout => messages::TIMEOUT,
            Self::Unauthorized => messages::UNAUTHORIZED,
            Self::Forbidden => messages::FORBIDDEN,
            Self::NotFound => messages::NOT_FOUND,
            Self::ServerError => messages::SERVER_ERROR,
            Self::ServiceUnavailable => messages::SERVICE_UNAVAILABLE,
            Self::Custom(_) => messages::UNKNOWN,
        }
    }

    /// Stable numeric code of the kind, `None` for `Custom`.
    pub fn code(&self) -> Option<i64> {
        let code = match self {
            Self::InvalidUrl => 1,
            Self::InvalidData => 2,
            Self::InvalidResponse => 3,
            Self::NoConnection => 4,
            Self::Timeout => 5,
            Self::Unauthorized => 6,
            Self::Forbidden => 7,
            Self::NotFound => 8,
            Self::ServerError => 9,
            Self::ServiceUnavailable => 10,
            Self::Custom(_) => return None,
        };
        Some(code)
    }

    pub fn cause(&self) -> Option<&ErrorCause> {
        match self {
            Self::Custom(cause) => cause.as_ref(),
            _ => None,
        }
    }

    /// Wrap an unclassified cause.
    pub fn custom(cause: ErrorCause) -> Self {
        Self::Custom(Some(cause))
    }

    /// Cause describing this kind, used when a classified error has to be
    /// carried as an opaque one.
    pub fn as_cause(&self) -> ErrorCause {
        match self {
            Self::Custom(Some(cause)) => cause.clone(),
            Self::Custom(None) => ErrorCause::new(NETWORK_DOMAIN, 0, self.message()),
            other => ErrorCause::new(NETWORK_DOMAIN, other.code().unwrap_or(0), other.message()),
        }
    }
}

impl PartialEq for NetworkError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Custom(lhs), Self::Custom(rhs)) => lhs == rhs,
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl Eq for NetworkError {}
