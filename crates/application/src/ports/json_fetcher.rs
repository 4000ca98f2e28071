//! JSON fetch port

use std::future::Future;

use serde_json::Value;
use stackbase_domain::{AuthErrorReport, JsonResponse, RequestOptions};
use thiserror::Error;

/// Errors from the JSON fetch utility.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// The server answered with a status outside 200-299.
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// The body's `message` field, or the status reason.
        message: String,
        /// Parsed response body, when it was JSON.
        body: Option<Value>,
    },

    /// The URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name or value was rejected.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Any other transport failure.
    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    /// Returns the HTTP status for [`Http`](Self::Http) errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Describes this failure for the auth provider's error check.
    #[must_use]
    pub fn auth_report(&self) -> AuthErrorReport {
        match self {
            Self::Http { status, message, .. } => AuthErrorReport::with_status(*status)
                .named("HttpError")
                .with_message(message.clone()),
            other => AuthErrorReport::default().with_message(other.to_string()),
        }
    }
}

/// Port for sending a request and reading a JSON response.
///
/// Implementations send an authenticated [`RequestOptions::user`] context as
/// the `Authorization` header and fail with [`FetchError::Http`] on
/// non-success statuses.
pub trait JsonFetcher: Send + Sync {
    /// Sends the request described by `options` to `url`.
    fn fetch_json(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> impl Future<Output = Result<JsonResponse, FetchError>> + Send;
}
