//! Stack Auth client over the client-side REST API.
//!
//! Implements the identity service ports with cookie-mode token storage.
//! Requests authenticate as the project's client application; once signed
//! in, the stored tokens travel in the `x-stack-*-token` headers.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use stackbase_application::ports::{IdentityClient, IdentityError, IdentitySession, IdentityUser};
use stackbase_domain::{SetPasswordParams, Tokens, UserIdentity};
use url::Url;

use super::pkce;
use super::token_store::CookieTokenStore;
use crate::config::StackSettings;

const API_PREFIX: &str = "api/v1/";
const CLIENT_VERSION: &str = concat!("rust stackbase@", env!("CARGO_PKG_VERSION"));
const KNOWN_ERROR_HEADER: &str = "x-stack-known-error";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Error body of documented failures.
#[derive(Debug, Deserialize)]
struct KnownErrorBody {
    code: String,
    error: String,
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    access_token: String,
    refresh_token: String,
}

/// Profile of the signed-in user as returned by `GET /users/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackUserProfile {
    /// User identifier.
    pub id: String,
    /// Display name chosen by the user.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Primary email address.
    #[serde(default)]
    pub primary_email: Option<String>,
    /// Whether the primary email was verified.
    #[serde(default)]
    pub primary_email_verified: bool,
    /// Avatar URL.
    #[serde(default)]
    pub profile_image_url: Option<String>,
    /// Metadata readable and writable by the client.
    #[serde(default)]
    pub client_metadata: Option<Value>,
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    api_base: Url,
    project_id: String,
    publishable_client_key: String,
    oauth_redirect_uri: Option<Url>,
    tokens: CookieTokenStore,
}

/// Identity client for one Stack Auth project.
///
/// Cheap to clone; clones share the HTTP client and the token store.
#[derive(Debug, Clone)]
pub struct StackClient {
    inner: Arc<ClientInner>,
}

impl StackClient {
    /// Creates a client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Configuration`] if the HTTP client cannot be
    /// built or the API URL cannot carry the API path.
    pub fn new(settings: &StackSettings) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stackbase/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| IdentityError::Configuration(e.to_string()))?;
        Self::with_http_client(settings, http)
    }

    /// Creates a client over a custom reqwest client.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Configuration`] if the API URL cannot carry
    /// the API path.
    pub fn with_http_client(
        settings: &StackSettings,
        http: reqwest::Client,
    ) -> Result<Self, IdentityError> {
        let api_base = Url::parse(&format!(
            "{}/",
            settings.api_url.as_str().trim_end_matches('/')
        ))
        .and_then(|root| root.join(API_PREFIX))
        .map_err(|e| IdentityError::Configuration(format!("invalid api_url: {e}")))?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                api_base,
                project_id: settings.project_id.clone(),
                publishable_client_key: settings.publishable_client_key.clone(),
                oauth_redirect_uri: settings.oauth_redirect_uri.clone(),
                tokens: CookieTokenStore::new(&settings.project_id),
            }),
        })
    }

    /// Token store backing this client's session.
    #[must_use]
    pub fn token_store(&self) -> &CookieTokenStore {
        &self.inner.tokens
    }

    /// Project identifier.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.inner.project_id
    }

    /// Finishes an `OAuth` sign-in from the URL the provider redirected to,
    /// exchanging the authorization code for session tokens.
    ///
    /// # Errors
    ///
    /// Returns a known error when the provider reported a failure or the
    /// callback does not match a pending sign-in, and the service's error
    /// when the exchange is rejected.
    pub async fn complete_oauth_callback(&self, callback: &Url) -> Result<(), IdentityError> {
        let param = |name: &str| {
            callback
                .query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };

        if let Some(error) = param("error") {
            let message = param("error_description").unwrap_or_else(|| error.clone());
            return Err(IdentityError::known(error, message));
        }
        let (Some(code), Some(state)) = (param("code"), param("state")) else {
            return Err(IdentityError::known(
                "INVALID_OAUTH_CALLBACK",
                "callback URL lacks the code or state parameter",
            ));
        };
        let verifier = self.inner.tokens.take_oauth_verifier(&state).ok_or_else(|| {
            IdentityError::known(
                "INVALID_OAUTH_STATE",
                "no pending OAuth sign-in matches this callback",
            )
        })?;
        let redirect_uri = self.oauth_redirect_uri()?;

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("code_verifier", verifier.as_str()),
            ("client_id", self.inner.project_id.as_str()),
            ("client_secret", self.inner.publishable_client_key.as_str()),
        ];
        let body = serde_urlencoded::to_string(form)
            .map_err(|e| IdentityError::Transport(format!("failed to encode form: {e}")))?;

        let request = self
            .request(Method::POST, "auth/oauth/token")?
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        let response = Self::ensure_success(Self::dispatch(request).await?).await?;
        let tokens: SignInResponse = Self::read_json(response).await?;
        self.store_tokens(tokens);

        tracing::debug!(project_id = %self.inner.project_id, "OAuth sign-in completed");
        Ok(())
    }

    fn oauth_redirect_uri(&self) -> Result<&Url, IdentityError> {
        self.inner.oauth_redirect_uri.as_ref().ok_or_else(|| {
            IdentityError::Configuration("stack.oauth_redirect_uri is not set".to_string())
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityError> {
        self.inner
            .api_base
            .join(path)
            .map_err(|e| IdentityError::Configuration(format!("invalid endpoint {path}: {e}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, IdentityError> {
        let mut builder = self
            .inner
            .http
            .request(method, self.endpoint(path)?)
            .header("x-stack-project-id", &self.inner.project_id)
            .header(
                "x-stack-publishable-client-key",
                &self.inner.publishable_client_key,
            )
            .header("x-stack-access-type", "client")
            .header("x-stack-client-version", CLIENT_VERSION);

        let tokens = self.inner.tokens.tokens();
        if let Some(access_token) = tokens.access_token {
            builder = builder.header("x-stack-access-token", access_token);
        }
        if let Some(refresh_token) = tokens.refresh_token {
            builder = builder.header("x-stack-refresh-token", refresh_token);
        }
        Ok(builder)
    }

    /// Sends a JSON request and fails on non-success statuses.
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Response, IdentityError> {
        let mut request = self.request(method, path)?;
        if let Some(body) = body {
            request = request.json(&body);
        }
        Self::ensure_success(Self::dispatch(request).await?).await
    }

    async fn dispatch(request: RequestBuilder) -> Result<Response, IdentityError> {
        request
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))
    }

    async fn ensure_success(response: Response) -> Result<Response, IdentityError> {
        if response.status().is_success() {
            return Ok(response);
        }
        Err(Self::error_from(response).await)
    }

    async fn error_from(response: Response) -> IdentityError {
        let status = response.status();
        let known_code = response
            .headers()
            .get(KNOWN_ERROR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();

        if let Ok(known) = serde_json::from_str::<KnownErrorBody>(&body) {
            return IdentityError::known(known.code, known.error);
        }
        match known_code {
            Some(code) => IdentityError::known(code, body),
            None => IdentityError::Http {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.canonical_reason().unwrap_or("Unknown status").to_string()
                } else {
                    body
                },
            },
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, IdentityError> {
        response
            .json()
            .await
            .map_err(|e| IdentityError::Transport(format!("unreadable response: {e}")))
    }

    fn store_tokens(&self, response: SignInResponse) {
        self.inner.tokens.store(&Tokens::new(
            Some(response.access_token),
            Some(response.refresh_token),
        ));
    }
}

impl IdentityClient for StackClient {
    type User = StackUser;

    async fn get_user(&self) -> Result<Option<StackUser>, IdentityError> {
        if !self.inner.tokens.has_session() {
            tracing::debug!("no stored session, skipping user lookup");
            return Ok(None);
        }

        let response = Self::dispatch(self.request(Method::GET, "users/me")?).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!("stored session rejected by the identity service, clearing it");
            self.inner.tokens.clear();
            return Ok(None);
        }
        let profile: StackUserProfile =
            Self::read_json(Self::ensure_success(response).await?).await?;

        Ok(Some(StackUser {
            profile,
            client: self.clone(),
        }))
    }

    async fn sign_in_with_credential(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        let response = self
            .call(
                Method::POST,
                "auth/password/sign-in",
                Some(json!({ "email": email, "password": password })),
            )
            .await?;
        let tokens: SignInResponse = Self::read_json(response).await?;
        self.store_tokens(tokens);
        Ok(())
    }

    async fn sign_in_with_oauth(&self, provider: &str) -> Result<Url, IdentityError> {
        let redirect_uri = self.oauth_redirect_uri()?.clone();
        let state = pkce::generate_state();
        let verifier = pkce::generate_code_verifier();

        let mut url = self.endpoint(&format!(
            "auth/oauth/authorize/{}",
            provider.to_lowercase()
        ))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.inner.project_id)
            .append_pair("client_secret", &self.inner.publishable_client_key)
            .append_pair("redirect_uri", redirect_uri.as_str())
            .append_pair("scope", "legacy")
            .append_pair("state", &state)
            .append_pair("grant_type", "authorization_code")
            .append_pair("code_challenge", &pkce::code_challenge(&verifier))
            .append_pair("code_challenge_method", "S256")
            .append_pair("response_type", "code")
            .append_pair("type", "authenticate")
            .append_pair("error_redirect_url", redirect_uri.as_str());

        self.inner.tokens.remember_oauth_verifier(&state, &verifier);
        tracing::debug!(provider, "OAuth authorization URL issued");
        Ok(url)
    }

    async fn send_forgot_password_email(
        &self,
        email: &str,
        callback_url: Option<&str>,
    ) -> Result<(), IdentityError> {
        let mut body = json!({ "email": email });
        if let Some(callback_url) = callback_url {
            body["callback_url"] = Value::from(callback_url);
        }
        self.call(Method::POST, "auth/password/send-reset-code", Some(body))
            .await?;
        Ok(())
    }
}

/// Signed-in Stack Auth user.
#[derive(Debug, Clone)]
pub struct StackUser {
    profile: StackUserProfile,
    client: StackClient,
}

impl StackUser {
    /// Profile as returned by the identity service.
    #[must_use]
    pub const fn profile(&self) -> &StackUserProfile {
        &self.profile
    }

    /// Maps the profile onto the admin front-end's identity shape. The
    /// display name falls back to the email; the email is also exposed as
    /// an extra `email` field.
    #[must_use]
    pub fn to_identity(&self) -> UserIdentity {
        let mut identity = UserIdentity::new(self.profile.id.clone());
        if let Some(name) = self
            .profile
            .display_name
            .as_deref()
            .or(self.profile.primary_email.as_deref())
        {
            identity = identity.with_full_name(name);
        }
        if let Some(avatar) = &self.profile.profile_image_url {
            identity = identity.with_avatar(avatar.as_str());
        }
        if let Some(email) = &self.profile.primary_email {
            identity
                .extra
                .insert("email".to_string(), Value::from(email.as_str()));
        }
        identity
    }
}

impl IdentityUser for StackUser {
    type Session = StackSession;

    fn id(&self) -> &str {
        &self.profile.id
    }

    fn current_session(&self) -> Option<StackSession> {
        let tokens = &self.client.inner.tokens;
        tokens.has_session().then(|| StackSession {
            tokens: tokens.clone(),
        })
    }

    async fn update_password(&self, params: &SetPasswordParams) -> Result<(), IdentityError> {
        self.client
            .call(
                Method::POST,
                "auth/password/update",
                Some(json!({
                    "old_password": params.old_password,
                    "new_password": params.new_password,
                })),
            )
            .await?;
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let result = self
            .client
            .call(Method::DELETE, "auth/sessions/current", None)
            .await
            .map(drop);
        // The local session ends even when the service could not be told.
        self.client.inner.tokens.clear();
        if let Err(error) = &result {
            tracing::warn!(%error, "server-side sign-out failed, local session cleared");
        }
        result
    }
}

/// Session handle reading the client's token store.
#[derive(Debug, Clone)]
pub struct StackSession {
    tokens: CookieTokenStore,
}

impl IdentitySession for StackSession {
    async fn get_tokens(&self) -> Result<Tokens, IdentityError> {
        Ok(self.tokens.tokens())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::TokenStoreMode;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;

    fn settings(server: &Server, redirect: Option<&str>) -> StackSettings {
        StackSettings {
            project_id: "proj-1".to_string(),
            publishable_client_key: "pck_123".to_string(),
            api_url: Url::parse(&server.url()).unwrap(),
            token_store: TokenStoreMode::Cookie,
            oauth_redirect_uri: redirect.map(|uri| Url::parse(uri).unwrap()),
        }
    }

    fn client(server: &Server) -> StackClient {
        StackClient::new(&settings(server, None)).unwrap()
    }

    fn signed_in(server: &Server) -> StackClient {
        let client = client(server);
        client.token_store().store(&Tokens::new(
            Some("access-1".to_string()),
            Some("refresh-1".to_string()),
        ));
        client
    }

    #[tokio::test]
    async fn test_sign_in_stores_tokens_and_sends_project_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/auth/password/sign-in")
            .match_header("x-stack-project-id", "proj-1")
            .match_header("x-stack-publishable-client-key", "pck_123")
            .match_header("x-stack-access-type", "client")
            .match_body(Matcher::Json(json!({
                "email": "ada@example.com",
                "password": "hunter2",
            })))
            .with_status(200)
            .with_body(r#"{"access_token":"at","refresh_token":"rt","user_id":"u1"}"#)
            .create_async()
            .await;
        let client = client(&server);

        client
            .sign_in_with_credential("ada@example.com", "hunter2")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            client.token_store().tokens(),
            Tokens::new(Some("at".to_string()), Some("rt".to_string()))
        );
    }

    #[tokio::test]
    async fn test_known_error_is_reported_with_its_code() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/auth/password/sign-in")
            .with_status(400)
            .with_header(KNOWN_ERROR_HEADER, "EMAIL_PASSWORD_MISMATCH")
            .with_body(r#"{"code":"EMAIL_PASSWORD_MISMATCH","error":"Wrong e-mail or password."}"#)
            .create_async()
            .await;
        let client = client(&server);

        let error = client
            .sign_in_with_credential("ada@example.com", "wrong")
            .await
            .unwrap_err();

        assert_eq!(
            error,
            IdentityError::known("EMAIL_PASSWORD_MISMATCH", "Wrong e-mail or password.")
        );
        assert!(!client.token_store().has_session());
    }

    #[tokio::test]
    async fn test_unexpected_status_is_http_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/auth/password/send-reset-code")
            .with_status(502)
            .create_async()
            .await;

        let error = client(&server)
            .send_forgot_password_email("ada@example.com", None)
            .await
            .unwrap_err();

        assert_eq!(
            error,
            IdentityError::Http {
                status: 502,
                message: "Bad Gateway".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_get_user_without_session_skips_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/users/me")
            .expect(0)
            .create_async()
            .await;

        let user = client(&server).get_user().await.unwrap();

        assert!(user.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_user_returns_profile_and_session() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/users/me")
            .match_header("x-stack-access-token", "access-1")
            .match_header("x-stack-refresh-token", "refresh-1")
            .with_status(200)
            .with_body(
                r#"{"id":"u1","display_name":null,"primary_email":"ada@example.com",
                    "primary_email_verified":true,"profile_image_url":"https://cdn.example.com/ada.png"}"#,
            )
            .create_async()
            .await;
        let client = signed_in(&server);

        let user = client.get_user().await.unwrap().unwrap();

        mock.assert_async().await;
        assert_eq!(user.id(), "u1");
        assert!(user.profile().primary_email_verified);

        let identity = user.to_identity();
        assert_eq!(identity.full_name.as_deref(), Some("ada@example.com"));
        assert_eq!(
            identity.avatar.as_deref(),
            Some("https://cdn.example.com/ada.png")
        );
        assert_eq!(identity.extra["email"], json!("ada@example.com"));

        let session = user.current_session().unwrap();
        let tokens = session.get_tokens().await.unwrap();
        assert_eq!(tokens.access_token.as_deref(), Some("access-1"));
    }

    #[tokio::test]
    async fn test_get_user_treats_unauthorized_as_signed_out() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/users/me")
            .match_header("x-stack-access-token", "access-1")
            .with_status(401)
            .with_header(KNOWN_ERROR_HEADER, "INVALID_ACCESS_TOKEN")
            .with_body(r#"{"code":"INVALID_ACCESS_TOKEN","error":"Invalid access token"}"#)
            .expect(1)
            .create_async()
            .await;
        let client = signed_in(&server);

        assert!(client.get_user().await.unwrap().is_none());

        // The rejected tokens are dropped, so the next lookup stays local.
        assert!(!client.token_store().has_session());
        assert_eq!(client.token_store().tokens(), Tokens::default());
        assert!(client.get_user().await.unwrap().is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_sign_out_clears_store_even_when_request_fails() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/users/me")
            .with_status(200)
            .with_body(r#"{"id":"u1"}"#)
            .create_async()
            .await;
        let _mock = server
            .mock("DELETE", "/api/v1/auth/sessions/current")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;
        let client = signed_in(&server);
        let user = client.get_user().await.unwrap().unwrap();
        let session = user.current_session().unwrap();

        let result = user.sign_out().await;

        assert!(matches!(result, Err(IdentityError::Http { status: 500, .. })));
        assert!(!client.token_store().has_session());
        // Sessions handed out earlier observe the sign-out.
        assert_eq!(session.get_tokens().await.unwrap(), Tokens::default());
        assert!(user.current_session().is_none());
    }

    #[tokio::test]
    async fn test_update_password_sends_both_passwords() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/users/me")
            .with_status(200)
            .with_body(r#"{"id":"u1"}"#)
            .create_async()
            .await;
        let mock = server
            .mock("POST", "/api/v1/auth/password/update")
            .match_body(Matcher::Json(json!({
                "old_password": "old",
                "new_password": "new",
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let user = signed_in(&server).get_user().await.unwrap().unwrap();

        user.update_password(&SetPasswordParams::new("old", "new"))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_forgot_password_includes_callback_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/auth/password/send-reset-code")
            .match_body(Matcher::Json(json!({
                "email": "ada@example.com",
                "callback_url": "https://admin.example.com/set-password",
            })))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        client(&server)
            .send_forgot_password_email(
                "ada@example.com",
                Some("https://admin.example.com/set-password"),
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_oauth_requires_redirect_uri() {
        let server = Server::new_async().await;

        let error = client(&server).sign_in_with_oauth("github").await.unwrap_err();

        assert!(matches!(error, IdentityError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_oauth_round_trip_through_callback() {
        let mut server = Server::new_async().await;
        let redirect = "https://admin.example.com/auth/callback";
        let client =
            StackClient::new(&settings(&server, Some(redirect))).unwrap();

        let url = client.sign_in_with_oauth("GitHub").await.unwrap();

        assert_eq!(url.path(), "/api/v1/auth/oauth/authorize/github");
        let query: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(query["client_id"], "proj-1");
        assert_eq!(query["redirect_uri"], redirect);
        assert_eq!(query["code_challenge_method"], "S256");
        let state = query["state"].clone();

        let mock = server
            .mock("POST", "/api/v1/auth/oauth/token")
            .match_header("content-type", FORM_CONTENT_TYPE)
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".to_string(), "auth-code".to_string()),
                Matcher::UrlEncoded("grant_type".to_string(), "authorization_code".to_string()),
                Matcher::Regex("code_verifier=".to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"oat","refresh_token":"ort"}"#)
            .create_async()
            .await;
        let callback = Url::parse(&format!("{redirect}?code=auth-code&state={state}")).unwrap();

        client.complete_oauth_callback(&callback).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            client.token_store().tokens().access_token.as_deref(),
            Some("oat")
        );
        // The verifier is single-use.
        let replay = client.complete_oauth_callback(&callback).await.unwrap_err();
        assert_eq!(replay.code(), Some("INVALID_OAUTH_STATE"));
    }

    #[tokio::test]
    async fn test_oauth_callback_reports_provider_error() {
        let server = Server::new_async().await;
        let client = StackClient::new(&settings(
            &server,
            Some("https://admin.example.com/auth/callback"),
        ))
        .unwrap();
        let callback = Url::parse(
            "https://admin.example.com/auth/callback?error=access_denied&error_description=User%20cancelled",
        )
        .unwrap();

        let error = client.complete_oauth_callback(&callback).await.unwrap_err();

        assert_eq!(error, IdentityError::known("access_denied", "User cancelled"));
    }
}
