//! Error types
//!
//! `GatewayError` separates errors reported by the exchange itself from
//! transport and decoding failures. `LadderError` covers everything that
//! ends a run with a non-zero exit code.

use thiserror::Error;

/// Error returned by an exchange gateway call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// The exchange rejected the request with a structured error.
    #[error("gate api error: {label}: {message}")]
    Api { label: String, message: String },

    /// Network, HTTP or decoding failure.
    #[error("generic error: {0}")]
    Generic(String),
}

impl GatewayError {
    pub fn api(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            label: label.into(),
            message: message.into(),
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic(message.into())
    }

    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Generic(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Generic(format!("failed to decode response: {}", err))
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// A numeric field from the exchange could not be parsed.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("formatting not possible for {field}: {value:?}")]
pub struct FieldParseError {
    pub field: &'static str,
    pub value: String,
}

/// Parse a decimal string received from the exchange.
pub fn parse_field(field: &'static str, value: &str) -> Result<f64, FieldParseError> {
    value.trim().parse::<f64>().map_err(|_| FieldParseError {
        field,
        value: value.to_string(),
    })
}

/// Fatal errors for a run
#[derive(Debug, Error)]
pub enum LadderError {
    #[error("invalid arguments:\n  {}", .0.join("\n  "))]
    InvalidArguments(Vec<String>),

    #[error("missing credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error(
        "amount per order must be higher than {minimum} {currency}; \
         increase the amount. Actual amount per order is {per_level:.3}"
    )]
    NotionalTooSmall {
        per_level: f64,
        minimum: f64,
        currency: String,
    },

    #[error("not enough {currency}, actual balance: {available:.2} needed: {needed:.2}")]
    InsufficientBalance {
        currency: String,
        available: f64,
        needed: f64,
    },

    #[error("{operation} failed: {source}")]
    Gateway {
        operation: &'static str,
        #[source]
        source: GatewayError,
    },

    #[error(transparent)]
    Parse(#[from] FieldParseError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl LadderError {
    pub fn gateway(operation: &'static str, source: GatewayError) -> Self {
        Self::Gateway { operation, source }
    }
}
