//! Error handling for the Zyvia client

use std::fmt;
use thiserror::Error;

/// Unified error type for the Zyvia client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or transport errors (the request never produced a response)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// `detail` or `error` field of the body, or a generic description
        message: String,
        /// Raw response body as returned by the server
        body: String,
    },

    /// The server answered successfully but with an unexpected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local validation of user input failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation needing a bearer credential ran without a session
    #[error("Not logged in")]
    NotLoggedIn,

    /// Session storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new invalid response error
    pub fn invalid_response<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidResponse(msg.to_string())
    }

    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Whether the request failed before any response arrived
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Http(_))
    }

    /// HTTP status of an API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message suitable for showing next to a form or list.
    ///
    /// Server-supplied messages win; everything else falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Api { message, .. } if !message.is_empty() => message.clone(),
            Error::InvalidResponse(msg) | Error::Validation(msg) => msg.clone(),
            Error::NotLoggedIn => "You must be logged in.".to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `detail` first, then `error`, the two shapes the backend uses.
pub(crate) fn extract_api_message(body: &serde_json::Value) -> Option<String> {
    ["detail", "error"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|value| match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}
