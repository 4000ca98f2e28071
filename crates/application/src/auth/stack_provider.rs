//! Auth provider backed by the identity service ports.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use stackbase_domain::{
    AuthErrorReport, CallbackParams, LoginParams, Redirect, ResetPasswordParams,
    SetPasswordParams, UserIdentity,
};

use crate::auth::{AuthProvider, IdentityResolver, PermissionsResolver, SessionCache};
use crate::error::{AuthProviderError, AuthResult};
use crate::ports::{IdentityClient, IdentityUser, LocationSource, SessionOf};

/// Optional behaviour of a [`StackAuthProvider`].
pub struct StackAuthOptions<U> {
    /// Builds identities; without it `get_identity` is unsupported.
    pub get_identity: Option<Arc<dyn IdentityResolver<U>>>,
    /// Builds permissions; without it `get_permissions` yields `None`.
    pub get_permissions: Option<Arc<dyn PermissionsResolver<U>>>,
    /// Base path the admin is mounted under, e.g. `/admin`.
    pub redirect_to: Option<String>,
}

impl<U> StackAuthOptions<U> {
    /// Options with no resolvers and no base path.
    #[must_use]
    pub fn new() -> Self {
        Self {
            get_identity: None,
            get_permissions: None,
            redirect_to: None,
        }
    }

    /// Sets the identity resolver.
    #[must_use]
    pub fn with_identity_resolver(mut self, resolver: impl IdentityResolver<U> + 'static) -> Self {
        self.get_identity = Some(Arc::new(resolver));
        self
    }

    /// Sets the permissions resolver.
    #[must_use]
    pub fn with_permissions_resolver(
        mut self,
        resolver: impl PermissionsResolver<U> + 'static,
    ) -> Self {
        self.get_permissions = Some(Arc::new(resolver));
        self
    }

    /// Sets the base path used for the set-password redirect.
    #[must_use]
    pub fn with_redirect_to(mut self, redirect_to: impl Into<String>) -> Self {
        self.redirect_to = Some(redirect_to.into());
        self
    }
}

impl<U> Default for StackAuthOptions<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> fmt::Debug for StackAuthOptions<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackAuthOptions")
            .field("get_identity", &self.get_identity.is_some())
            .field("get_permissions", &self.get_permissions.is_some())
            .field("redirect_to", &self.redirect_to)
            .finish()
    }
}

/// [`AuthProvider`] that translates the admin lifecycle to an
/// [`IdentityClient`].
///
/// The provider keeps no state of its own. When given the session cache
/// used by the token resolver, it clears that cache on logout so that no
/// signed-out session keeps serving tokens.
pub struct StackAuthProvider<C: IdentityClient, L> {
    client: Arc<C>,
    location: Arc<L>,
    options: StackAuthOptions<C::User>,
    session_cache: Option<SessionCache<SessionOf<C>>>,
}

impl<C: IdentityClient, L: LocationSource> StackAuthProvider<C, L> {
    /// Creates a provider over `client`, reading the page location from `location`.
    pub const fn new(client: Arc<C>, location: Arc<L>, options: StackAuthOptions<C::User>) -> Self {
        Self {
            client,
            location,
            options,
            session_cache: None,
        }
    }

    /// Clears `cache` whenever the user logs out.
    #[must_use]
    pub fn with_session_cache(mut self, cache: SessionCache<SessionOf<C>>) -> Self {
        self.session_cache = Some(cache);
        self
    }

    /// Returns the set-password redirect for a recovery or invite link.
    fn recovery_redirect(&self, params: &CallbackParams) -> Option<Redirect> {
        let kind = params.callback_kind()?;
        let redirect = params.set_password_redirect(self.options.redirect_to.as_deref());
        if redirect.is_none() && cfg!(debug_assertions) {
            tracing::error!(
                flow = kind.as_str(),
                "Missing access_token or refresh_token for an invite or recovery"
            );
        }
        redirect
    }
}

#[async_trait]
impl<C, L> AuthProvider for StackAuthProvider<C, L>
where
    C: IdentityClient,
    L: LocationSource + 'static,
{
    async fn login(&self, params: LoginParams) -> AuthResult<()> {
        match params {
            LoginParams::EmailPassword { email, password }
                if !email.is_empty() && !password.is_empty() =>
            {
                self.client.sign_in_with_credential(&email, &password).await?;
                tracing::info!("signed in with email and password");
                Ok(())
            }
            LoginParams::OAuth { provider } if !provider.is_empty() => {
                let url = self.client.sign_in_with_oauth(&provider).await?;
                tracing::debug!(%provider, "OAuth sign-in redirect started");
                // Not a success until the provider sends the user back.
                Err(AuthProviderError::OAuthRedirectPending { provider, url })
            }
            _ => Err(AuthProviderError::InvalidLoginParameters),
        }
    }

    async fn logout(&self) -> AuthResult<()> {
        let signed_out = match self.client.get_user().await? {
            Some(user) => user.sign_out().await,
            None => Ok(()),
        };
        if let Some(cache) = &self.session_cache
            && cache.invalidate().await
        {
            tracing::debug!("cached session dropped on logout");
        }
        signed_out.map_err(Into::into)
    }

    async fn check_auth(&self) -> AuthResult<()> {
        let location = self.location.current();
        if location.is_on_password_page() {
            return Ok(());
        }

        if let Some(redirect) = self.recovery_redirect(&location.callback_params()) {
            return Err(AuthProviderError::RedirectRequired(redirect));
        }

        let user = self
            .client
            .get_user()
            .await?
            .ok_or(AuthProviderError::NotAuthenticated)?;
        if user.current_session().is_none() {
            return Err(AuthProviderError::NotAuthenticated);
        }
        Ok(())
    }

    async fn check_error(&self, error: &AuthErrorReport) -> AuthResult<()> {
        if error.requires_reauthentication() {
            tracing::debug!(status = ?error.status, "error requires signing in again");
            return Err(AuthProviderError::NotAuthenticated);
        }
        Ok(())
    }

    async fn get_permissions(&self) -> AuthResult<Option<Value>> {
        let Some(resolver) = &self.options.get_permissions else {
            return Ok(None);
        };
        if self.location.current().is_on_password_page() {
            return Ok(None);
        }
        let Some(user) = self.client.get_user().await? else {
            return Ok(None);
        };

        resolver
            .resolve_permissions(&user)
            .await
            .map(Some)
            .map_err(AuthProviderError::Resolver)
    }

    fn has_identity(&self) -> bool {
        self.options.get_identity.is_some()
    }

    async fn get_identity(&self) -> AuthResult<UserIdentity> {
        let resolver = self
            .options
            .get_identity
            .as_ref()
            .ok_or(AuthProviderError::IdentityNotConfigured)?;
        let user = self
            .client
            .get_user()
            .await?
            .ok_or(AuthProviderError::UserNotFound)?;

        resolver
            .resolve_identity(&user)
            .await
            .map_err(AuthProviderError::Resolver)
    }

    async fn handle_callback(&self) -> AuthResult<Option<Redirect>> {
        let params = self.location.current().callback_params();
        Ok(self.recovery_redirect(&params))
    }

    async fn set_password(&self, params: SetPasswordParams) -> AuthResult<()> {
        let user = self
            .client
            .get_user()
            .await?
            .ok_or(AuthProviderError::UserNotFound)?;
        user.update_password(&params).await?;
        Ok(())
    }

    async fn reset_password(&self, params: ResetPasswordParams) -> AuthResult<()> {
        self.client
            .send_forgot_password_email(&params.email, params.redirect_to.as_deref())
            .await?;
        Ok(())
    }
}
