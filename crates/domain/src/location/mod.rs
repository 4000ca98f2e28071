//! Page location and redirect types
//!
//! The admin front-end is driven by the hosting page's URL: password
//! recovery and invitation links arrive with `access_token`,
//! `refresh_token` and `type` parameters, either in the query string or
//! inside a hash-router fragment such as `#/login?type=invite&...`.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Route where users choose a new password.
pub const SET_PASSWORD_ROUTE: &str = "/set-password";

/// Route where users request a password reset email.
pub const FORGOT_PASSWORD_ROUTE: &str = "/forgot-password";

/// The current location of the hosting page.
///
/// `search` keeps its leading `?` and `hash` its leading `#`, as a browser
/// reports them; both are empty strings when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLocation {
    /// Path component, e.g. `/set-password`.
    pub pathname: String,
    /// Query string including the leading `?`.
    #[serde(default)]
    pub search: String,
    /// Fragment including the leading `#`.
    #[serde(default)]
    pub hash: String,
}

impl Default for PageLocation {
    fn default() -> Self {
        Self::new("/")
    }
}

impl PageLocation {
    /// Creates a location with only a path.
    #[must_use]
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            search: String::new(),
            hash: String::new(),
        }
    }

    /// Sets the query string. A missing leading `?` is added.
    #[must_use]
    pub fn with_search(mut self, search: &str) -> Self {
        self.search = prefixed('?', search);
        self
    }

    /// Sets the fragment. A missing leading `#` is added.
    #[must_use]
    pub fn with_hash(mut self, hash: &str) -> Self {
        self.hash = prefixed('#', hash);
        self
    }

    /// Parses an absolute URL into its location parts.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] if the input is not an absolute URL.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let url = Url::parse(input).map_err(|e| DomainError::InvalidUrl(format!("{e}: {input}")))?;
        Ok(Self::from(&url))
    }

    /// Returns the parameter string recovery links are read from.
    ///
    /// The query string wins when present. Otherwise the part of the
    /// fragment after its first `?` is used, or the whole fragment when it
    /// has no `?`.
    #[must_use]
    pub fn search_string(&self) -> &str {
        let search = self.search.strip_prefix('?').unwrap_or(&self.search);
        if !search.is_empty() {
            return search;
        }

        let hash = self.hash.strip_prefix('#').unwrap_or(&self.hash);
        match hash.split_once('?') {
            Some((_, rest)) => rest.split('?').next().unwrap_or_default(),
            None => hash,
        }
    }

    /// Reads the recovery/invite parameters from [`search_string`](Self::search_string).
    #[must_use]
    pub fn callback_params(&self) -> CallbackParams {
        let mut params = CallbackParams::default();
        for (key, value) in url::form_urlencoded::parse(self.search_string().as_bytes()) {
            // First occurrence wins.
            let slot = match key.as_ref() {
                "access_token" => &mut params.access_token,
                "refresh_token" => &mut params.refresh_token,
                "type" => &mut params.kind,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// Returns true if the page shows `route`, either as its path or as a
    /// hash-router route.
    #[must_use]
    pub fn is_on_route(&self, route: &str) -> bool {
        self.pathname == route || self.hash.contains(&format!("#{route}"))
    }

    /// Returns true if the page is one of the password pages that must stay
    /// reachable without a session.
    #[must_use]
    pub fn is_on_password_page(&self) -> bool {
        self.is_on_route(SET_PASSWORD_ROUTE) || self.is_on_route(FORGOT_PASSWORD_ROUTE)
    }
}

impl From<&Url> for PageLocation {
    fn from(url: &Url) -> Self {
        Self::new(url.path())
            .with_search(url.query().unwrap_or_default())
            .with_hash(url.fragment().unwrap_or_default())
    }
}

fn prefixed(prefix: char, value: &str) -> String {
    if value.is_empty() || value.starts_with(prefix) {
        value.to_string()
    } else {
        format!("{prefix}{value}")
    }
}

/// Flows whose links send the user to the set-password page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    /// The user asked for a password reset.
    Recovery,
    /// The user was invited and has no password yet.
    Invite,
}

impl CallbackKind {
    /// Returns the `type` parameter value for this flow.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recovery => "recovery",
            Self::Invite => "invite",
        }
    }

    /// Parses a `type` parameter value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "recovery" => Some(Self::Recovery),
            "invite" => Some(Self::Invite),
            _ => None,
        }
    }
}

/// Parameters carried by recovery and invite links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    /// `access_token` parameter.
    pub access_token: Option<String>,
    /// `refresh_token` parameter.
    pub refresh_token: Option<String>,
    /// Raw `type` parameter.
    pub kind: Option<String>,
}

impl CallbackParams {
    /// Returns the flow named by the `type` parameter, if it is one that
    /// leads to the set-password page.
    #[must_use]
    pub fn callback_kind(&self) -> Option<CallbackKind> {
        self.kind.as_deref().and_then(CallbackKind::parse)
    }

    /// Builds the set-password redirect when both tokens are present and
    /// non-empty. `base_path` prefixes the route when the admin is not
    /// mounted at the root.
    #[must_use]
    pub fn set_password_redirect(&self, base_path: Option<&str>) -> Option<Redirect> {
        let kind = self.callback_kind()?;
        let access_token = self.access_token.as_deref().filter(|t| !t.is_empty())?;
        let refresh_token = self.refresh_token.as_deref().filter(|t| !t.is_empty())?;

        let pathname = base_path.map_or_else(
            || SET_PASSWORD_ROUTE.to_string(),
            |base| format!("{base}{SET_PASSWORD_ROUTE}"),
        );
        Some(Redirect {
            pathname,
            search: format!(
                "access_token={access_token}&refresh_token={refresh_token}&type={}",
                kind.as_str()
            ),
        })
    }
}

/// Navigation instruction for the hosting router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    /// Target path.
    pub pathname: String,
    /// Query string without the leading `?`.
    pub search: String,
}

impl Redirect {
    /// Returns the target as `pathname?search`.
    #[must_use]
    pub fn to_href(&self) -> String {
        if self.search.is_empty() {
            self.pathname.clone()
        } else {
            format!("{}?{}", self.pathname, self.search)
        }
    }
}
