//! Authentication value types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Error name reported by the identity backend when a request carried no session.
pub const SESSION_MISSING_ERROR: &str = "AuthSessionMissingError";

/// Tokens currently held by an identity session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    /// Short-lived bearer credential, if one is available.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Credential used to obtain new access tokens.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Tokens {
    /// Creates a token pair.
    #[must_use]
    pub const fn new(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }
}

/// Parameters accepted by the login operation.
///
/// Deserializes from the shapes the admin front-end sends: `{email, password}`,
/// `{provider}` or `{email}`. A payload carrying both shapes is read as
/// credentials only when email and password are non-empty, otherwise as the
/// `OAuth` provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LoginParams {
    /// Credential sign-in.
    EmailPassword {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },
    /// Sign-in through a third-party `OAuth` provider (e.g. `github`).
    OAuth {
        /// Provider identifier understood by the identity service.
        provider: String,
    },
    /// Passwordless sign-in request.
    MagicLink {
        /// Account email.
        email: String,
    },
}

impl LoginParams {
    /// Creates credential login parameters.
    #[must_use]
    pub fn email_password(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self::EmailPassword {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Creates `OAuth` login parameters.
    #[must_use]
    pub fn oauth(provider: impl Into<String>) -> Self {
        Self::OAuth {
            provider: provider.into(),
        }
    }
}

#[derive(Deserialize)]
struct LoginFields {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    provider: Option<String>,
}

impl<'de> Deserialize<'de> for LoginParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let LoginFields {
            email,
            password,
            provider,
        } = LoginFields::deserialize(deserializer)?;
        let filled = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());

        if (filled(&email) && filled(&password)) || (password.is_some() && !filled(&provider)) {
            return Ok(Self::EmailPassword {
                email: email.unwrap_or_default(),
                password: password.unwrap_or_default(),
            });
        }
        if let Some(provider) = provider {
            return Ok(Self::OAuth { provider });
        }
        email.map(|email| Self::MagicLink { email }).ok_or_else(|| {
            serde::de::Error::custom("expected `email` and `password`, `provider` or `email`")
        })
    }
}

/// Parameters for changing the signed-in user's password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPasswordParams {
    /// Current password.
    pub old_password: String,
    /// Replacement password.
    pub new_password: String,
}

impl SetPasswordParams {
    /// Creates password change parameters.
    #[must_use]
    pub fn new(old_password: impl Into<String>, new_password: impl Into<String>) -> Self {
        Self {
            old_password: old_password.into(),
            new_password: new_password.into(),
        }
    }
}

/// Parameters for requesting a password reset email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordParams {
    /// Account email.
    pub email: String,
    /// Page the reset link should lead back to.
    #[serde(default)]
    pub redirect_to: Option<String>,
    /// Captcha answer, for backends that require one.
    #[serde(default)]
    pub captcha_token: Option<String>,
}

impl ResetPasswordParams {
    /// Creates reset parameters for the given email.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            redirect_to: None,
            captcha_token: None,
        }
    }

    /// Sets the page the reset link should lead back to.
    #[must_use]
    pub fn with_redirect_to(mut self, redirect_to: impl Into<String>) -> Self {
        self.redirect_to = Some(redirect_to.into());
        self
    }
}

/// Identity record displayed by the admin front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Stable user identifier.
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Application-specific fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserIdentity {
    /// Creates an identity with only an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: None,
            avatar: None,
            extra: Map::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Sets the avatar URL.
    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// An error observed by the admin front-end, handed back for classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthErrorReport {
    /// HTTP status, when the error came from a response.
    #[serde(default)]
    pub status: Option<u16>,
    /// Error class name, e.g. [`SESSION_MISSING_ERROR`].
    #[serde(default)]
    pub name: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthErrorReport {
    /// Creates a report for an HTTP status.
    #[must_use]
    pub const fn with_status(status: u16) -> Self {
        Self {
            status: Some(status),
            name: None,
            message: None,
        }
    }

    /// Sets the error class name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns true if this error means the user has to sign in again.
    ///
    /// 401 and 403 always qualify. The identity backend answers 400 when the
    /// session is missing, so that case qualifies only with the matching name.
    #[must_use]
    pub fn requires_reauthentication(&self) -> bool {
        match self.status {
            Some(401 | 403) => true,
            Some(400) => self.name.as_deref() == Some(SESSION_MISSING_ERROR),
            _ => false,
        }
    }
}
