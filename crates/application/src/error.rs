//! Application error types

use stackbase_domain::Redirect;
use thiserror::Error;
use url::Url;

use crate::ports::{FetchError, IdentityError};

/// Boxed error returned by application-supplied resolvers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures of the auth lifecycle operations.
///
/// Two variants are routing signals rather than errors to display:
/// [`RedirectRequired`](Self::RedirectRequired) and
/// [`OAuthRedirectPending`](Self::OAuthRedirectPending).
#[derive(Debug, Error)]
pub enum AuthProviderError {
    /// The identity service reported an error.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The operation needs a signed-in user and there is none.
    #[error("User not found")]
    UserNotFound,

    /// Login was called with neither credentials nor a provider.
    #[error("Invalid login parameters")]
    InvalidLoginParameters,

    /// The user must sign in (again).
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The user must be sent elsewhere before the admin can proceed.
    #[error("Redirect required to {}", .0.to_href())]
    RedirectRequired(Redirect),

    /// An `OAuth` sign-in was started; the browser must follow `url`.
    #[error("Redirecting to {provider} for sign-in")]
    OAuthRedirectPending {
        /// Provider identifier.
        provider: String,
        /// Authorization URL to open.
        url: Url,
    },

    /// `get_identity` was called on a provider built without an identity resolver.
    #[error("Identity resolution is not configured")]
    IdentityNotConfigured,

    /// An identity or permissions resolver failed.
    #[error("Resolver failed: {0}")]
    Resolver(#[source] BoxError),
}

impl AuthProviderError {
    /// Returns true for navigation instructions that are not real failures.
    #[must_use]
    pub const fn is_routing_signal(&self) -> bool {
        matches!(
            self,
            Self::RedirectRequired(_) | Self::OAuthRedirectPending { .. }
        )
    }

    /// Returns the redirect carried by [`RedirectRequired`](Self::RedirectRequired).
    #[must_use]
    pub const fn redirect(&self) -> Option<&Redirect> {
        match self {
            Self::RedirectRequired(redirect) => Some(redirect),
            _ => None,
        }
    }

    /// Returns whether the admin should show this error to the user.
    #[must_use]
    pub const fn show_message(&self) -> bool {
        !self.is_routing_signal()
    }
}

/// Result type alias for auth lifecycle operations.
pub type AuthResult<T> = Result<T, AuthProviderError>;

/// Failures of an authorized REST call.
#[derive(Debug, Error)]
pub enum AuthorizedFetchError {
    /// The access token could not be resolved.
    #[error("failed to resolve access token: {0}")]
    Identity(#[from] IdentityError),

    /// The fetch utility failed; passed through unchanged.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
