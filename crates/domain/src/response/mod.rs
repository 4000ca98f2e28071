//! JSON response type

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A successful response from the REST backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers with lowercase names.
    pub headers: HashMap<String, String>,
    /// Raw response body.
    pub body: String,
    /// Parsed body, when the body is valid JSON.
    pub json: Option<Value>,
}

impl JsonResponse {
    /// Creates a response, parsing `body` as JSON when possible.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: String) -> Self {
        let json = serde_json::from_str(&body).ok();
        Self {
            status,
            headers,
            body,
            json,
        }
    }

    /// Returns a response header by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the total row count from a `Content-Range` header such as
    /// `0-24/3573`, as returned by the REST backend with `Prefer: count=exact`.
    #[must_use]
    pub fn total_count(&self) -> Option<u64> {
        self.header("content-range")?
            .rsplit_once('/')
            .and_then(|(_, total)| total.parse().ok())
    }
}
