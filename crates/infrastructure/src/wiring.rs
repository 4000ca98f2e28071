//! Composition root.
//!
//! Builds the identity client, token resolver, authorized fetch and auth
//! provider from [`Settings`]. Everything is owned by the returned
//! [`Stackbase`] value; several configurations can live side by side.

use std::sync::Arc;

use async_trait::async_trait;
use stackbase_application::ports::{FetchError, IdentityError};
use stackbase_application::{
    AuthorizedFetch, AuthorizedFetchError, BoxError, IdentityResolver, SessionCache,
    StackAuthOptions, StackAuthProvider, TokenResolver,
};
use stackbase_domain::{JsonResponse, RequestOptions, UserIdentity};
use thiserror::Error;

use crate::adapters::{ReqwestJsonFetcher, SharedLocation};
use crate::auth::{StackClient, StackUser};
use crate::config::Settings;
use crate::rest::RestEndpoint;

/// Token resolver over the Stack Auth client.
pub type StackTokenResolver = TokenResolver<StackClient>;

/// Authorized fetch over reqwest.
pub type StackAuthorizedFetch = AuthorizedFetch<StackClient, ReqwestJsonFetcher>;

/// Admin auth provider over the Stack Auth client.
pub type StackAdminAuthProvider = StackAuthProvider<StackClient, SharedLocation>;

/// Errors raised while assembling the components.
#[derive(Debug, Error)]
pub enum WiringError {
    /// The identity client could not be created.
    #[error("failed to create identity client: {0}")]
    Identity(#[from] IdentityError),

    /// The REST HTTP client could not be created.
    #[error("failed to create REST client: {0}")]
    Fetch(#[from] FetchError),
}

/// Identity resolver mapping the user's profile with
/// [`StackUser::to_identity`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileIdentityResolver;

#[async_trait]
impl IdentityResolver<StackUser> for ProfileIdentityResolver {
    async fn resolve_identity(&self, user: &StackUser) -> Result<UserIdentity, BoxError> {
        Ok(user.to_identity())
    }
}

/// A fully wired client for one project.
pub struct Stackbase {
    identity: Arc<StackClient>,
    location: SharedLocation,
    rest: RestEndpoint,
    fetch: StackAuthorizedFetch,
    auth: StackAdminAuthProvider,
}

impl Stackbase {
    /// Wires the components with the profile identity resolver and the
    /// configured redirect base path.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be created.
    pub fn from_settings(settings: &Settings) -> Result<Self, WiringError> {
        let mut options = StackAuthOptions::new().with_identity_resolver(ProfileIdentityResolver);
        if let Some(base) = &settings.auth.redirect_to {
            options = options.with_redirect_to(base.clone());
        }
        Self::with_options(settings, options)
    }

    /// Wires the components with caller-supplied auth provider options.
    /// `settings.auth.redirect_to` is not applied; set it on `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be created.
    pub fn with_options(
        settings: &Settings,
        options: StackAuthOptions<StackUser>,
    ) -> Result<Self, WiringError> {
        let identity = Arc::new(StackClient::new(&settings.stack)?);
        let cache = SessionCache::with_policy(settings.auth.cache);

        let rest = RestEndpoint::from_settings(&settings.rest);
        let fetch = AuthorizedFetch::new(
            settings.rest.anon_key.clone(),
            TokenResolver::new(Arc::clone(&identity), cache.clone()),
            Arc::new(ReqwestJsonFetcher::new()?),
        )
        .with_client_headers(rest.headers());

        let location = SharedLocation::default();
        let auth = StackAuthProvider::new(
            Arc::clone(&identity),
            Arc::new(location.clone()),
            options,
        )
        .with_session_cache(cache);

        tracing::info!(
            project_id = %identity.project_id(),
            rest_url = %rest.base_url(),
            cache = ?settings.auth.cache,
            "stackbase client ready"
        );

        Ok(Self {
            identity,
            location,
            rest,
            fetch,
            auth,
        })
    }

    /// Identity service client.
    #[must_use]
    pub const fn identity(&self) -> &Arc<StackClient> {
        &self.identity
    }

    /// Page location read by the auth provider.
    #[must_use]
    pub const fn location(&self) -> &SharedLocation {
        &self.location
    }

    /// REST backend endpoint.
    #[must_use]
    pub const fn rest(&self) -> &RestEndpoint {
        &self.rest
    }

    /// Authorized fetch wrapper.
    #[must_use]
    pub const fn fetch(&self) -> &StackAuthorizedFetch {
        &self.fetch
    }

    /// Admin auth provider.
    #[must_use]
    pub const fn auth(&self) -> &StackAdminAuthProvider {
        &self.auth
    }

    /// Fetches `resource` (e.g. `posts?select=id,title`) from the REST
    /// backend with the current user's authorization.
    ///
    /// # Errors
    ///
    /// Returns the identity error if the token cannot be resolved, or the
    /// fetch error.
    pub async fn fetch_resource(
        &self,
        resource: &str,
        options: Option<RequestOptions>,
    ) -> Result<JsonResponse, AuthorizedFetchError> {
        self.fetch
            .fetch(&self.rest.resource_url(resource), options)
            .await
    }
}
