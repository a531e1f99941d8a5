//! Error types for dnsset
//!
//! This module defines all error types used throughout the crate.
//!
//! The variants follow the failure scopes of a reconciliation pass:
//!
//! - **Input**: [`Error::Validation`] rejects a single malformed domain or address
//! - **Pass**: [`Error::SourceExhausted`] and [`Error::Config`] abort the whole pass
//! - **Unit**: everything else aborts one (domain, record type) unit only

use thiserror::Error;

/// Result type alias for dnsset operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dnsset
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed domain or IP syntax
    #[error("Validation error: {0}")]
    Validation(String),

    /// A source yielded zero usable items
    #[error("Source exhausted: {0}")]
    SourceExhausted(String),

    /// No address of the requested family could be found
    #[error("No address found: {0}")]
    NoAddressFound(String),

    /// An IP probe returned something that is not an address of the requested family
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Interactive input ended before a usable value was supplied
    #[error("No input: {0}")]
    NoInput(String),

    /// The provider manages no zone for the domain's registrable root
    #[error("No zone found for domain {domain}")]
    ZoneNotFound {
        /// The domain whose zone was looked up
        domain: String,
    },

    /// Network or HTTP failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid or expired credential
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The remote API refused the request
    #[error("Provider error ({provider}): {message}")]
    ProviderRejected {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File and terminal IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a "source exhausted" error
    pub fn source_exhausted(msg: impl Into<String>) -> Self {
        Self::SourceExhausted(msg.into())
    }

    /// Create a "no address found" error
    pub fn no_address(msg: impl Into<String>) -> Self {
        Self::NoAddressFound(msg.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a "no input" error
    pub fn no_input(msg: impl Into<String>) -> Self {
        Self::NoInput(msg.into())
    }

    /// Create a "zone not found" error
    pub fn zone_not_found(domain: impl Into<String>) -> Self {
        Self::ZoneNotFound {
            domain: domain.into(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a provider rejection error
    pub fn rejected(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderRejected {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error aborts the whole pass rather than a single unit
    pub fn is_fatal_to_pass(&self) -> bool {
        matches!(self, Self::SourceExhausted(_) | Self::Config(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
