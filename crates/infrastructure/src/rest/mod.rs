//! REST backend endpoint.
//!
//! Describes where the data-layer client sends its requests and which
//! headers it declares on every call.

use stackbase_domain::Headers;
use url::Url;

use crate::config::RestSettings;

/// Header identifying the client library.
pub const CLIENT_INFO_HEADER: &str = "X-Client-Info";

const CLIENT_INFO: &str = concat!("stackbase-rs/", env!("CARGO_PKG_VERSION"));

/// Base URL and schema of the REST backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestEndpoint {
    base_url: Url,
    schema: Option<String>,
}

impl RestEndpoint {
    /// Creates the configured endpoint. The URL is the backend root itself;
    /// no API prefix is appended.
    #[must_use]
    pub fn from_settings(settings: &RestSettings) -> Self {
        Self {
            base_url: settings.url.clone(),
            schema: settings.schema.clone(),
        }
    }

    /// Backend root URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Headers sent with every request.
    #[must_use]
    pub fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.set(CLIENT_INFO_HEADER, CLIENT_INFO);
        if let Some(schema) = &self.schema {
            headers.set("Accept-Profile", schema.clone());
            headers.set("Content-Profile", schema.clone());
        }
        headers
    }

    /// URL of `resource`, which may carry a query string
    /// (`posts?select=id,title`).
    #[must_use]
    pub fn resource_url(&self, resource: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            resource.trim_start_matches('/')
        )
    }
}
