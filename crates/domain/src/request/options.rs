//! Per-call request configuration

use serde::{Deserialize, Serialize};

use super::{Headers, HttpMethod};

/// Authenticated-user context attached to a request.
///
/// The JSON fetcher turns an authenticated context into the
/// `Authorization` header; the REST backend derives its row-level
/// security principal from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    /// Whether the request runs on behalf of a signed-in user.
    pub authenticated: bool,
    /// Full credential, e.g. `Bearer eyJ...`.
    pub token: String,
}

impl UserContext {
    /// Creates an authenticated context carrying `Bearer <access_token>`.
    #[must_use]
    pub fn bearer(access_token: &str) -> Self {
        Self {
            authenticated: true,
            token: format!("Bearer {access_token}"),
        }
    }
}

/// Options for a single outgoing REST request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// Request headers.
    #[serde(default)]
    pub headers: Headers,
    /// Raw request body.
    #[serde(default)]
    pub body: Option<String>,
    /// Signed-in user context.
    #[serde(default)]
    pub user: Option<UserContext>,
}

impl RequestOptions {
    /// Creates options for the given method.
    #[must_use]
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Adds or replaces a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the credential to send, if the user context is authenticated.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.user
            .as_ref()
            .filter(|user| user.authenticated && !user.token.is_empty())
            .map(|user| user.token.as_str())
    }
}
