//! Access-token resolution.

use std::sync::Arc;

use crate::auth::SessionCache;
use crate::ports::{IdentityClient, IdentityError, IdentitySession, IdentityUser, SessionOf};

/// Resolves the access token to send with REST calls.
///
/// A cached session is asked first. Only when there is none, or it has no
/// access token, is the identity service asked for the current user; that
/// user's session then replaces the cached one.
///
/// Overlapping resolutions are not coordinated: two calls that both miss the
/// cache both query the identity service, and the last one to finish owns
/// the slot.
pub struct TokenResolver<C: IdentityClient> {
    client: Arc<C>,
    cache: SessionCache<SessionOf<C>>,
}

impl<C: IdentityClient> TokenResolver<C> {
    /// Creates a resolver over `client`, remembering sessions in `cache`.
    pub const fn new(client: Arc<C>, cache: SessionCache<SessionOf<C>>) -> Self {
        Self { client, cache }
    }

    /// Returns the session cache.
    pub const fn cache(&self) -> &SessionCache<SessionOf<C>> {
        &self.cache
    }

    /// Returns the identity client.
    pub const fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Returns the current access token, or `None` when signed out.
    ///
    /// The session of a signed-in user is cached even when it yields no
    /// access token, so later calls retry the session instead of the
    /// identity service.
    ///
    /// # Errors
    ///
    /// Propagates identity service failures.
    pub async fn resolve_access_token(&self) -> Result<Option<String>, IdentityError> {
        if let Some(session) = self.cache.get().await {
            if let Some(token) = session.get_tokens().await?.access_token {
                tracing::debug!("access token served from cached session");
                return Ok(Some(token));
            }
            tracing::debug!("cached session has no access token");
        }

        let Some(user) = self.client.get_user().await? else {
            tracing::debug!("no signed-in user, request stays anonymous");
            return Ok(None);
        };
        let Some(session) = user.current_session() else {
            tracing::debug!(user_id = user.id(), "signed-in user has no current session");
            return Ok(None);
        };

        self.cache.store(session.clone()).await;
        let token = session.get_tokens().await?.access_token;
        tracing::debug!(
            user_id = user.id(),
            has_token = token.is_some(),
            "session resolved from identity service"
        );
        Ok(token)
    }
}

// Manual Clone: derive would require `C: Clone`.
impl<C: IdentityClient> Clone for TokenResolver<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            cache: self.cache.clone(),
        }
    }
}
