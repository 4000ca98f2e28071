//! Cookie-mode token storage for the identity client.
//!
//! Tokens live in an in-process cookie jar under the names the browser SDK
//! uses, so the jar can be exported to and imported from a real cookie
//! header, or kept in a file between process runs.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::{fmt, fs, io};

use parking_lot::RwLock;
use stackbase_domain::Tokens;

/// Name of the cookie holding the access token.
pub const ACCESS_COOKIE: &str = "stack-access";

const OAUTH_VERIFIER_PREFIX: &str = "stack-oauth-outer-";

/// Returns the name of the refresh-token cookie for a project.
#[must_use]
pub fn refresh_cookie_name(project_id: &str) -> String {
    format!("stack-refresh-{project_id}")
}

/// In-process cookie jar holding one session's tokens.
///
/// Clones share the jar, so a session handle observes sign-in and sign-out
/// performed through the client.
#[derive(Clone)]
pub struct CookieTokenStore {
    refresh_cookie: String,
    cookies: Arc<RwLock<BTreeMap<String, String>>>,
}

impl CookieTokenStore {
    /// Creates an empty jar for `project_id`.
    #[must_use]
    pub fn new(project_id: &str) -> Self {
        Self {
            refresh_cookie: refresh_cookie_name(project_id),
            cookies: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Returns the stored token pair.
    #[must_use]
    pub fn tokens(&self) -> Tokens {
        let cookies = self.cookies.read();
        Tokens {
            access_token: cookies.get(ACCESS_COOKIE).cloned(),
            refresh_token: cookies.get(&self.refresh_cookie).cloned(),
        }
    }

    /// Whether a refresh token is stored, i.e. a session exists.
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.cookies.read().contains_key(&self.refresh_cookie)
    }

    /// Stores `tokens`, removing the cookie of any token that is absent.
    pub fn store(&self, tokens: &Tokens) {
        let mut cookies = self.cookies.write();
        Self::put(&mut cookies, ACCESS_COOKIE, tokens.access_token.as_deref());
        Self::put(
            &mut cookies,
            &self.refresh_cookie,
            tokens.refresh_token.as_deref(),
        );
    }

    /// Removes both session cookies.
    pub fn clear(&self) {
        let mut cookies = self.cookies.write();
        cookies.remove(ACCESS_COOKIE);
        cookies.remove(&self.refresh_cookie);
    }

    /// Remembers the PKCE verifier of a pending `OAuth` sign-in.
    pub fn remember_oauth_verifier(&self, state: &str, verifier: &str) {
        self.cookies
            .write()
            .insert(format!("{OAUTH_VERIFIER_PREFIX}{state}"), verifier.to_string());
    }

    /// Takes the PKCE verifier stored for `state`, if any.
    pub fn take_oauth_verifier(&self, state: &str) -> Option<String> {
        self.cookies
            .write()
            .remove(&format!("{OAUTH_VERIFIER_PREFIX}{state}"))
    }

    /// Renders the jar as a `Cookie` header value.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        self.cookies
            .read()
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Loads cookies from a `Cookie` header value. Malformed pairs are skipped.
    pub fn load_cookie_header(&self, header: &str) {
        let mut cookies = self.cookies.write();
        for pair in header.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=')
                && !name.is_empty()
            {
                cookies.insert(name.to_string(), value.to_string());
            }
        }
    }

    /// Loads the jar from a file holding one `Cookie` header line. A missing
    /// file loads nothing.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file exists but cannot be read.
    pub fn load_file(&self, path: &Path) -> io::Result<()> {
        match fs::read_to_string(path) {
            Ok(header) => {
                self.load_cookie_header(header.trim());
                tracing::debug!(path = %path.display(), "cookie jar loaded");
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error),
        }
    }

    /// Writes the jar to `path` as one `Cookie` header line, replacing the
    /// file.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be written.
    pub fn save_file(&self, path: &Path) -> io::Result<()> {
        fs::write(path, format!("{}\n", self.cookie_header()))
    }

    fn put(cookies: &mut BTreeMap<String, String>, name: &str, value: Option<&str>) {
        match value {
            Some(value) if !value.is_empty() => {
                cookies.insert(name.to_string(), value.to_string());
            }
            _ => {
                cookies.remove(name);
            }
        }
    }
}

impl fmt::Debug for CookieTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Names only; values are credentials.
        f.debug_struct("CookieTokenStore")
            .field("cookies", &self.cookies.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_store_and_clear() {
        let store = CookieTokenStore::new("proj");
        assert!(!store.has_session());

        store.store(&Tokens::new(Some("access".to_string()), Some("refresh".to_string())));

        assert!(store.has_session());
        assert_eq!(store.tokens().access_token.as_deref(), Some("access"));
        assert_eq!(
            store.cookie_header(),
            "stack-access=access; stack-refresh-proj=refresh"
        );

        store.clear();
        assert_eq!(store.tokens(), Tokens::default());
    }

    #[test]
    fn test_clones_share_the_jar() {
        let store = CookieTokenStore::new("proj");
        let session_view = store.clone();

        store.store(&Tokens::new(Some("a1".to_string()), Some("r1".to_string())));
        assert_eq!(session_view.tokens().access_token.as_deref(), Some("a1"));

        store.clear();
        assert!(!session_view.has_session());
    }

    #[test]
    fn test_missing_token_removes_cookie() {
        let store = CookieTokenStore::new("proj");
        store.store(&Tokens::new(Some("a1".to_string()), Some("r1".to_string())));

        store.store(&Tokens {
            access_token: None,
            refresh_token: Some("r2".to_string()),
        });

        assert_eq!(store.cookie_header(), "stack-refresh-proj=r2");
    }

    #[test]
    fn test_oauth_verifier_is_taken_once() {
        let store = CookieTokenStore::new("proj");
        store.remember_oauth_verifier("state-1", "verifier");

        assert_eq!(
            store.take_oauth_verifier("state-1").as_deref(),
            Some("verifier")
        );
        assert_eq!(store.take_oauth_verifier("state-1"), None);
    }

    #[test]
    fn test_debug_hides_values() {
        let store = CookieTokenStore::new("proj");
        store.store(&Tokens::new(Some("secret".to_string()), None));

        let rendered = format!("{store:?}");
        assert!(rendered.contains("stack-access"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_load_cookie_header() {
        let store = CookieTokenStore::new("proj");

        store.load_cookie_header("stack-refresh-proj=r; theme=dark; broken; stack-access=a");

        assert!(store.has_session());
        assert_eq!(store.tokens().access_token.as_deref(), Some("a"));
    }

    #[test]
    fn test_jar_survives_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies");
        let store = CookieTokenStore::new("proj");
        store.store(&Tokens::new(Some("a1".to_string()), Some("r1".to_string())));
        store.remember_oauth_verifier("state-1", "verifier");

        store.save_file(&path).unwrap();
        let restored = CookieTokenStore::new("proj");
        restored.load_file(&path).unwrap();

        assert_eq!(restored.tokens(), store.tokens());
        assert_eq!(
            restored.take_oauth_verifier("state-1").as_deref(),
            Some("verifier")
        );
    }

    #[test]
    fn test_missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CookieTokenStore::new("proj");

        store.load_file(&dir.path().join("absent")).unwrap();

        assert!(!store.has_session());
        assert_eq!(store.cookie_header(), "");
    }

    #[test]
    fn test_cleared_jar_is_saved_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies");
        let store = CookieTokenStore::new("proj");
        store.store(&Tokens::new(Some("a1".to_string()), Some("r1".to_string())));
        store.save_file(&path).unwrap();

        store.clear();
        store.save_file(&path).unwrap();
        let restored = CookieTokenStore::new("proj");
        restored.load_file(&path).unwrap();

        assert!(!restored.has_session());
    }
}
