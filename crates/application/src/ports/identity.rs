//! Identity service port
//!
//! Models the client-side surface of the identity service: a client that
//! knows the current user, users that own a session, and sessions that
//! hand out tokens.

use std::future::Future;

use stackbase_domain::{SetPasswordParams, Tokens};
use thiserror::Error;
use url::Url;

/// Errors reported by the identity service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// A documented error such as wrong credentials; `code` is the
    /// service's stable identifier.
    #[error("{message}")]
    Known {
        /// Stable error code, e.g. `EMAIL_PASSWORD_MISMATCH`.
        code: String,
        /// Human-readable description.
        message: String,
    },

    /// The service answered with an unexpected status.
    #[error("identity service returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The service could not be reached or its answer could not be read.
    #[error("identity service unreachable: {0}")]
    Transport(String),

    /// The client lacks a setting the operation needs.
    #[error("identity client misconfigured: {0}")]
    Configuration(String),
}

impl IdentityError {
    /// Creates a known error.
    #[must_use]
    pub fn known(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Known {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns the service error code for known errors.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Known { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// A session handle from which tokens are read.
pub trait IdentitySession: Clone + Send + Sync + 'static {
    /// Returns the tokens currently held by this session.
    fn get_tokens(&self) -> impl Future<Output = Result<Tokens, IdentityError>> + Send;
}

/// The signed-in principal.
pub trait IdentityUser: Send + Sync + 'static {
    /// Session type owned by this user.
    type Session: IdentitySession;

    /// Stable user identifier.
    fn id(&self) -> &str;

    /// Returns the session the user is signed in with, if any.
    fn current_session(&self) -> Option<Self::Session>;

    /// Changes the user's password.
    fn update_password(
        &self,
        params: &SetPasswordParams,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send;

    /// Ends the user's session.
    fn sign_out(&self) -> impl Future<Output = Result<(), IdentityError>> + Send;
}

/// Entry point of the identity service.
pub trait IdentityClient: Send + Sync + 'static {
    /// User type returned by [`get_user`](Self::get_user).
    type User: IdentityUser;

    /// Returns the signed-in user, or `None` when signed out.
    fn get_user(&self) -> impl Future<Output = Result<Option<Self::User>, IdentityError>> + Send;

    /// Signs in with email and password.
    fn sign_in_with_credential(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send;

    /// Starts an `OAuth` sign-in and returns the URL the browser must open.
    fn sign_in_with_oauth(
        &self,
        provider: &str,
    ) -> impl Future<Output = Result<Url, IdentityError>> + Send;

    /// Sends a password reset email. `callback_url` is where the link leads.
    fn send_forgot_password_email(
        &self,
        email: &str,
        callback_url: Option<&str>,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send;
}

/// Session type of an identity client.
pub type SessionOf<C> = <<C as IdentityClient>::User as IdentityUser>::Session;
