//! Authentication provider contract.
//!
//! This module defines the lifecycle the admin front-end drives: login,
//! logout, session and error checks, permissions, identity and the
//! password flows. Implementations translate these calls to a concrete
//! identity service.

use async_trait::async_trait;
use serde_json::Value;
use stackbase_domain::{
    AuthErrorReport, LoginParams, Redirect, ResetPasswordParams, SetPasswordParams, UserIdentity,
};

use crate::error::{AuthResult, BoxError};

/// Trait for admin authentication providers.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Signs the user in.
    ///
    /// An `OAuth` login never succeeds here: it fails with
    /// [`OAuthRedirectPending`](crate::AuthProviderError::OAuthRedirectPending)
    /// once the redirect has been started.
    async fn login(&self, params: LoginParams) -> AuthResult<()>;

    /// Signs the user out. Does nothing when already signed out.
    async fn logout(&self) -> AuthResult<()>;

    /// Succeeds when the current page may be shown.
    async fn check_auth(&self) -> AuthResult<()>;

    /// Fails when `error` means the user has to sign in again.
    async fn check_error(&self, error: &AuthErrorReport) -> AuthResult<()>;

    /// Returns the signed-in user's permissions, if permissions are in use.
    async fn get_permissions(&self) -> AuthResult<Option<Value>>;

    /// Returns true if [`get_identity`](Self::get_identity) is supported.
    fn has_identity(&self) -> bool;

    /// Returns the signed-in user's identity.
    async fn get_identity(&self) -> AuthResult<UserIdentity>;

    /// Handles the page the identity service sent the user back to.
    async fn handle_callback(&self) -> AuthResult<Option<Redirect>>;

    /// Changes the signed-in user's password.
    async fn set_password(&self, params: SetPasswordParams) -> AuthResult<()>;

    /// Sends a password reset email.
    async fn reset_password(&self, params: ResetPasswordParams) -> AuthResult<()>;
}

/// Application-supplied mapping from an identity-service user to the
/// identity shown by the admin.
#[async_trait]
pub trait IdentityResolver<U>: Send + Sync {
    /// Builds the identity of `user`.
    async fn resolve_identity(&self, user: &U) -> Result<UserIdentity, BoxError>;
}

/// Application-supplied mapping from an identity-service user to its
/// permissions.
#[async_trait]
pub trait PermissionsResolver<U>: Send + Sync {
    /// Returns the permissions of `user`.
    async fn resolve_permissions(&self, user: &U) -> Result<Value, BoxError>;
}
