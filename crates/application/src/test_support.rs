//! In-memory fakes of the ports, shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use stackbase_domain::{JsonResponse, RequestOptions, SetPasswordParams, Tokens};
use url::Url;

use crate::ports::{FetchError, IdentityClient, IdentityError, IdentitySession, IdentityUser, JsonFetcher};

/// Session whose tokens can be changed while it is cached.
#[derive(Debug, Clone, Default)]
pub struct FakeSession {
    tokens: Arc<Mutex<Tokens>>,
    token_calls: Arc<AtomicUsize>,
}

impl FakeSession {
    pub fn with_access_token(token: &str) -> Self {
        let session = Self::default();
        session.set_access_token(Some(token));
        session
    }

    pub fn set_access_token(&self, token: Option<&str>) {
        self.tokens.lock().unwrap().access_token = token.map(str::to_string);
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }
}

impl IdentitySession for FakeSession {
    async fn get_tokens(&self) -> Result<Tokens, IdentityError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        let tokens = self.tokens.lock().unwrap().clone();
        Ok(tokens)
    }
}

#[derive(Debug, Clone)]
pub struct FakeUser {
    id: String,
    session: Option<FakeSession>,
    signed_in: Arc<AtomicBool>,
    password_error: Option<IdentityError>,
    password_updates: Arc<Mutex<Vec<SetPasswordParams>>>,
}

impl FakeUser {
    pub fn new(id: &str, session: Option<FakeSession>) -> Self {
        Self {
            id: id.to_string(),
            session,
            signed_in: Arc::new(AtomicBool::new(true)),
            password_error: None,
            password_updates: Arc::default(),
        }
    }

    pub fn failing_password_update(mut self, error: IdentityError) -> Self {
        self.password_error = Some(error);
        self
    }

    pub fn password_updates(&self) -> Vec<SetPasswordParams> {
        self.password_updates.lock().unwrap().clone()
    }
}

impl IdentityUser for FakeUser {
    type Session = FakeSession;

    fn id(&self) -> &str {
        &self.id
    }

    fn current_session(&self) -> Option<FakeSession> {
        self.session.clone()
    }

    async fn update_password(&self, params: &SetPasswordParams) -> Result<(), IdentityError> {
        if let Some(error) = &self.password_error {
            return Err(error.clone());
        }
        self.password_updates.lock().unwrap().push(params.clone());
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.signed_in.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Identity client that counts how often it is asked for the current user.
#[derive(Debug, Default)]
pub struct FakeIdentity {
    user: Mutex<Option<FakeUser>>,
    get_user_calls: AtomicUsize,
    sign_in_error: Mutex<Option<IdentityError>>,
    sign_ins: Mutex<Vec<(String, String)>>,
    oauth_providers: Mutex<Vec<String>>,
    forgot_password: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeIdentity {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(user: FakeUser) -> Self {
        let identity = Self::default();
        *identity.user.lock().unwrap() = Some(user);
        identity
    }

    pub fn failing_sign_in(self, error: IdentityError) -> Self {
        *self.sign_in_error.lock().unwrap() = Some(error);
        self
    }

    pub fn get_user_calls(&self) -> usize {
        self.get_user_calls.load(Ordering::SeqCst)
    }

    pub fn is_signed_in(&self) -> bool {
        self.user
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|u| u.signed_in.load(Ordering::SeqCst))
    }

    pub fn sign_ins(&self) -> Vec<(String, String)> {
        self.sign_ins.lock().unwrap().clone()
    }

    pub fn oauth_providers(&self) -> Vec<String> {
        self.oauth_providers.lock().unwrap().clone()
    }

    pub fn forgot_password_requests(&self) -> Vec<(String, Option<String>)> {
        self.forgot_password.lock().unwrap().clone()
    }
}

impl IdentityClient for FakeIdentity {
    type User = FakeUser;

    async fn get_user(&self) -> Result<Option<FakeUser>, IdentityError> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        // Suspend like a network call so overlapping resolutions interleave.
        tokio::task::yield_now().await;
        let user = self
            .user
            .lock()
            .unwrap()
            .clone()
            .filter(|u| u.signed_in.load(Ordering::SeqCst));
        Ok(user)
    }

    async fn sign_in_with_credential(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        if let Some(error) = self.sign_in_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.sign_ins
            .lock()
            .unwrap()
            .push((email.to_string(), password.to_string()));
        Ok(())
    }

    async fn sign_in_with_oauth(&self, provider: &str) -> Result<Url, IdentityError> {
        self.oauth_providers.lock().unwrap().push(provider.to_string());
        Url::parse(&format!("https://auth.example.com/oauth/{provider}"))
            .map_err(|e| IdentityError::Transport(e.to_string()))
    }

    async fn send_forgot_password_email(
        &self,
        email: &str,
        callback_url: Option<&str>,
    ) -> Result<(), IdentityError> {
        self.forgot_password
            .lock()
            .unwrap()
            .push((email.to_string(), callback_url.map(str::to_string)));
        Ok(())
    }
}

/// Fetcher that records every request and answers with a canned result.
#[derive(Debug)]
pub struct RecordingFetcher {
    requests: Mutex<Vec<(String, RequestOptions)>>,
    result: Result<JsonResponse, FetchError>,
}

impl RecordingFetcher {
    pub fn ok(body: &str) -> Self {
        Self {
            requests: Mutex::default(),
            result: Ok(JsonResponse::new(200, Default::default(), body.to_string())),
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            requests: Mutex::default(),
            result: Err(error),
        }
    }

    pub fn requests(&self) -> Vec<(String, RequestOptions)> {
        self.requests.lock().unwrap().clone()
    }
}

impl JsonFetcher for RecordingFetcher {
    async fn fetch_json(&self, url: &str, options: RequestOptions) -> Result<JsonResponse, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), options));
        self.result.clone()
    }
}
