//! Authorized fetch wrapper.
//!
//! Every call to the REST backend goes through [`AuthorizedFetch`], which
//! identifies the calling application with its API key and, when a user is
//! signed in, attaches the user's bearer token as request context.

use std::sync::Arc;

use stackbase_domain::{Headers, JsonResponse, RequestOptions, UserContext};

use crate::auth::TokenResolver;
use crate::error::AuthorizedFetchError;
use crate::ports::{IdentityClient, IdentityError, JsonFetcher};

/// Header carrying the application's API key.
pub const API_KEY_HEADER: &str = "apiKey";

/// Fetch wrapper that authorizes requests to the REST backend.
pub struct AuthorizedFetch<C: IdentityClient, F> {
    api_key: String,
    client_headers: Headers,
    resolver: TokenResolver<C>,
    fetcher: Arc<F>,
}

impl<C: IdentityClient, F: JsonFetcher> AuthorizedFetch<C, F> {
    /// Creates a wrapper sending `api_key` with every request.
    pub fn new(api_key: impl Into<String>, resolver: TokenResolver<C>, fetcher: Arc<F>) -> Self {
        Self {
            api_key: api_key.into(),
            client_headers: Headers::new(),
            resolver,
            fetcher,
        }
    }

    /// Sets the headers declared by the REST client (schema profile,
    /// client info). They replace same-named request headers.
    #[must_use]
    pub fn with_client_headers(mut self, headers: Headers) -> Self {
        self.client_headers = headers;
        self
    }

    /// Returns the token resolver.
    pub const fn resolver(&self) -> &TokenResolver<C> {
        &self.resolver
    }

    /// Builds the options that [`fetch`](Self::fetch) hands to the fetcher.
    ///
    /// # Errors
    ///
    /// Returns the identity service error if the access token cannot be resolved.
    pub async fn authorize(
        &self,
        options: Option<RequestOptions>,
    ) -> Result<RequestOptions, IdentityError> {
        let mut options = options.unwrap_or_default();
        options.headers.extend_from(&self.client_headers);

        if let Some(token) = self.resolver.resolve_access_token().await? {
            // Consumed by the fetcher as the Authorization header, which the
            // backend uses for row-level security.
            options.user = Some(UserContext::bearer(&token));
        }
        // Anonymous requests still identify the application.
        options.headers.set(API_KEY_HEADER, self.api_key.clone());

        Ok(options)
    }

    /// Sends an authorized request to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizedFetchError::Identity`] if the token cannot be
    /// resolved, or the fetcher's error unchanged.
    pub async fn fetch(
        &self,
        url: &str,
        options: Option<RequestOptions>,
    ) -> Result<JsonResponse, AuthorizedFetchError> {
        let options = self.authorize(options).await?;
        tracing::debug!(
            method = %options.method,
            url,
            authenticated = options.user.is_some(),
            "sending authorized request"
        );
        Ok(self.fetcher.fetch_json(url, options).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::SessionCache;
    use crate::ports::FetchError;
    use crate::test_support::{FakeIdentity, FakeSession, FakeUser, RecordingFetcher};
    use pretty_assertions::assert_eq;
    use stackbase_domain::HttpMethod;

    fn wrapper(
        identity: FakeIdentity,
        fetcher: RecordingFetcher,
    ) -> (Arc<RecordingFetcher>, AuthorizedFetch<FakeIdentity, RecordingFetcher>) {
        let fetcher = Arc::new(fetcher);
        let resolver = TokenResolver::new(Arc::new(identity), SessionCache::new());
        let fetch = AuthorizedFetch::new("anon-key", resolver, Arc::clone(&fetcher));
        (fetcher, fetch)
    }

    fn signed_in() -> FakeIdentity {
        FakeIdentity::signed_in(FakeUser::new(
            "user-1",
            Some(FakeSession::with_access_token("jwt")),
        ))
    }

    #[tokio::test]
    async fn test_anonymous_request_still_sends_api_key() {
        let (fetcher, fetch) = wrapper(FakeIdentity::signed_out(), RecordingFetcher::ok("[]"));

        fetch.fetch("https://db.example.com/posts", None).await.unwrap();

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 1);
        let (url, options) = &requests[0];
        assert_eq!(url, "https://db.example.com/posts");
        assert_eq!(options.headers.get(API_KEY_HEADER), Some("anon-key"));
        assert_eq!(options.user, None);
    }

    #[tokio::test]
    async fn test_signed_in_request_carries_bearer_context() {
        let (fetcher, fetch) = wrapper(signed_in(), RecordingFetcher::ok("[]"));

        fetch.fetch("https://db.example.com/posts", None).await.unwrap();

        let (_, options) = &fetcher.requests()[0];
        assert_eq!(options.user, Some(UserContext::bearer("jwt")));
        assert_eq!(options.headers.get(API_KEY_HEADER), Some("anon-key"));
        // The token travels as context, not as a raw header.
        assert_eq!(options.headers.get("Authorization"), None);
    }

    #[tokio::test]
    async fn test_client_headers_override_request_headers() {
        let (fetcher, fetch) = wrapper(FakeIdentity::signed_out(), RecordingFetcher::ok("[]"));
        let fetch = fetch.with_client_headers(
            [("Accept-Profile", "crm"), ("X-Client-Info", "stackbase")]
                .into_iter()
                .collect(),
        );
        let options = RequestOptions::new(HttpMethod::Patch)
            .with_header("accept-profile", "public")
            .with_header("Prefer", "return=representation")
            .with_header("apikey", "spoofed")
            .with_body(r#"{"title":"x"}"#);

        fetch
            .fetch("https://db.example.com/posts?id=eq.1", Some(options))
            .await
            .unwrap();

        let (_, sent) = &fetcher.requests()[0];
        assert_eq!(sent.method, HttpMethod::Patch);
        assert_eq!(sent.headers.get("Accept-Profile"), Some("crm"));
        assert_eq!(sent.headers.get("X-Client-Info"), Some("stackbase"));
        assert_eq!(sent.headers.get("Prefer"), Some("return=representation"));
        assert_eq!(sent.headers.get("apiKey"), Some("anon-key"));
        assert_eq!(sent.body.as_deref(), Some(r#"{"title":"x"}"#));
    }

    #[tokio::test]
    async fn test_fetch_errors_pass_through() {
        let denied = FetchError::Http {
            status: 403,
            message: "permission denied for table posts".to_string(),
            body: None,
        };
        let (_, fetch) = wrapper(signed_in(), RecordingFetcher::failing(denied.clone()));

        let error = fetch
            .fetch("https://db.example.com/posts", None)
            .await
            .unwrap_err();

        assert!(matches!(error, AuthorizedFetchError::Fetch(e) if e == denied));
    }

    #[tokio::test]
    async fn test_resolution_uses_cache_between_requests() {
        let identity = Arc::new(signed_in());
        let fetcher = Arc::new(RecordingFetcher::ok("[]"));
        let resolver = TokenResolver::new(Arc::clone(&identity), SessionCache::new());
        let fetch = AuthorizedFetch::new("anon-key", resolver, Arc::clone(&fetcher));

        fetch.fetch("https://db.example.com/a", None).await.unwrap();
        fetch.fetch("https://db.example.com/b", None).await.unwrap();

        assert_eq!(identity.get_user_calls(), 1);
        assert_eq!(fetcher.requests().len(), 2);
    }
}
