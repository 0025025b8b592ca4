//! Error types for store calls.

use thiserror::Error;

/// Failure turning a message into wire text or back.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Message could not be serialized.
    #[error("Failed to encode message: {0}")]
    Encode(String),

    /// Response text is not valid base64.
    #[error("Invalid base64 body: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes do not describe the expected message.
    #[error("Failed to decode message: {0}")]
    Decode(String),
}

/// Failure of the HTTP exchange itself.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The store answered with a non-success status.
    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// Connection could not be established.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Any other HTTP-level failure.
    #[error("HTTP request failed: {0}")]
    Http(String),
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout
        } else if err.is_connect() {
            ExchangeError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            ExchangeError::Status {
                status: status.as_u16(),
            }
        } else {
            ExchangeError::Http(err.to_string())
        }
    }
}

/// The single failure channel of a store call.
///
/// Transport failures and store-reported failures arrive through the same
/// type; [`StoreError::errormessage`] gives the text a failed response would
/// have carried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network error, timeout or non-success HTTP status.
    #[error("Error in {path} request: {source}")]
    Transport {
        path: &'static str,
        #[source]
        source: ExchangeError,
    },

    /// Request could not be encoded or the response could not be decoded.
    #[error("Error in {path} request: {source}")]
    Codec {
        path: &'static str,
        #[source]
        source: CodecError,
    },

    /// The store answered with `success = false`.
    #[error("{path} failed: {message}")]
    Rejected { path: &'static str, message: String },
}

impl StoreError {
    /// Endpoint path the failed call was made to.
    pub fn path(&self) -> &'static str {
        match self {
            StoreError::Transport { path, .. }
            | StoreError::Codec { path, .. }
            | StoreError::Rejected { path, .. } => path,
        }
    }

    /// Human readable reason, as a failed response's `errormessage`.
    pub fn errormessage(&self) -> String {
        match self {
            StoreError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// True if the call never produced a store response.
    pub fn is_transport(&self) -> bool {
        matches!(self, StoreError::Transport { .. })
    }
}
