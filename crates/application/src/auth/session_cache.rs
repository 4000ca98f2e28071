//! In-memory session cache.
//!
//! Holds at most one identity session so that access tokens can be read
//! without asking the identity service for the current user on every
//! request. Clones share the same slot.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Whether resolved sessions are remembered between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Keep the last resolved session.
    #[default]
    Memoized,
    /// Never keep a session; every resolution asks the identity service.
    Disabled,
}

/// Shared single-slot session cache.
pub struct SessionCache<S> {
    slot: Arc<RwLock<Option<S>>>,
    policy: CachePolicy,
}

impl<S> SessionCache<S> {
    /// Creates an empty memoizing cache.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(CachePolicy::Memoized)
    }

    /// Creates an empty cache with the given policy.
    #[must_use]
    pub fn with_policy(policy: CachePolicy) -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
            policy,
        }
    }

    /// Returns the cache policy.
    #[must_use]
    pub const fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Stores a session, replacing the previous one.
    pub async fn store(&self, session: S) {
        if self.policy == CachePolicy::Disabled {
            return;
        }
        *self.slot.write().await = Some(session);
    }

    /// Drops the cached session. Returns true if one was present.
    pub async fn invalidate(&self) -> bool {
        self.slot.write().await.take().is_some()
    }

    /// Returns true if no session is cached.
    pub async fn is_empty(&self) -> bool {
        self.slot.read().await.is_none()
    }
}

impl<S: Clone> SessionCache<S> {
    /// Returns a handle to the cached session.
    pub async fn get(&self) -> Option<S> {
        self.slot.read().await.clone()
    }
}

impl<S> Default for SessionCache<S> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual Clone: derive would require `S: Clone`.
impl<S> Clone for SessionCache<S> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            policy: self.policy,
        }
    }
}

impl<S> fmt::Debug for SessionCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCache")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
