//! JSON fetcher implementation using reqwest.
//!
//! This adapter implements the `JsonFetcher` port: it sends JSON requests to
//! the REST backend and turns non-success answers into `FetchError::Http`.

use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use stackbase_application::ports::{FetchError, JsonFetcher};
use stackbase_domain::{HttpMethod, JsonResponse, RequestOptions};

const JSON_CONTENT_TYPE: &str = "application/json";

/// JSON fetcher backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestJsonFetcher {
    client: Client,
}

impl ReqwestJsonFetcher {
    /// Creates a fetcher with default settings.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - User-Agent: "stackbase/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("stackbase/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { client })
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Collects the headers to send: the caller's, JSON defaults where the
    /// caller set none, and the user context as `Authorization`.
    fn build_headers(options: &RequestOptions) -> Result<HeaderMap, FetchError> {
        let mut headers = options.headers.clone();
        headers.set_if_absent("Accept", JSON_CONTENT_TYPE);
        if options.body.is_some() {
            headers.set_if_absent("Content-Type", JSON_CONTENT_TYPE);
        }
        if let Some(credential) = options.authorization() {
            headers.set("Authorization", credential);
        }

        let mut map = HeaderMap::with_capacity(headers.len());
        for header in headers.iter() {
            let name = HeaderName::from_bytes(header.name.as_bytes())
                .map_err(|_| FetchError::InvalidHeader(header.name.clone()))?;
            let value = HeaderValue::from_str(&header.value)
                .map_err(|_| FetchError::InvalidHeader(header.name.clone()))?;
            map.insert(name, value);
        }
        Ok(map)
    }

    /// Picks the message of a failed response: the body's `message` field,
    /// else the status reason.
    fn error_message(status: StatusCode, json: Option<&Value>) -> String {
        json.and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .map_or_else(
                || {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown status")
                        .to_string()
                },
                str::to_string,
            )
    }

    fn map_error(error: &reqwest::Error) -> FetchError {
        if error.is_connect() {
            let host = error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string();
            let message = error.to_string();
            let lowered = message.to_lowercase();
            if lowered.contains("dns") || lowered.contains("resolve") {
                return FetchError::ConnectionFailed(format!("cannot resolve {host}: {message}"));
            }
            if lowered.contains("refused") {
                return FetchError::ConnectionFailed(format!("{host} refused the connection"));
            }
            return FetchError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return FetchError::Network("too many redirects (max 10)".to_string());
        }

        FetchError::Network(error.to_string())
    }
}

impl JsonFetcher for ReqwestJsonFetcher {
    async fn fetch_json(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<JsonResponse, FetchError> {
        let parsed_url =
            Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{e}: {url}")))?;
        let headers = Self::build_headers(&options)?;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(options.method), parsed_url)
            .headers(headers);
        if let Some(body) = options.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| Self::map_error(&e))?;

        let status = response.status();
        let response_headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("failed to read body: {e}")))?;

        let response = JsonResponse::new(status.as_u16(), response_headers, body);
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), url, "request rejected");
            return Err(FetchError::Http {
                status: status.as_u16(),
                message: Self::error_message(status, response.json.as_ref()),
                body: response.json,
            });
        }

        Ok(response)
    }
}
