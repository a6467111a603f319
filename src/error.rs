//! Error types for the `whereabouts` library

use thiserror::Error;

/// Main error type for provider lookups and normalization
#[derive(Error, Debug)]
pub enum Error {
    /// A provider needs an API key that is not configured
    #[error("Missing credentials for provider '{provider}'")]
    MissingCredentials { provider: String },

    /// The vendor answered but had no data for the request
    #[error("No results: {0}")]
    NoResults(String),

    /// Non-2xx status or vendor error envelope
    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// A 2xx response that is missing the keys we expect
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Station search found no candidate within the radius,
    /// or a registry lookup matched nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// The HTTP call exceeded its timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Network-level failure before a status was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a missing-credentials error for a provider slug
    pub fn missing_credentials<S: Into<String>>(provider: S) -> Self {
        Self::MissingCredentials {
            provider: provider.into(),
        }
    }

    /// Create a no-results error
    pub fn no_results<S: Into<String>>(message: S) -> Self {
        Self::NoResults(message.into())
    }

    /// Create an upstream error from a status code and vendor message
    pub fn upstream<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Create a malformed-response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Create a not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// True when the failure came from the network rather than the vendor
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::Transport(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else {
            Error::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
