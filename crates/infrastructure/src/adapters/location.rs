//! Shared, updatable page location.

use std::sync::Arc;

use parking_lot::RwLock;
use stackbase_application::ports::LocationSource;
use stackbase_domain::{DomainResult, PageLocation};

/// Page location shared between the host that navigates and the auth
/// provider that reads it. Clones observe the same location.
#[derive(Debug, Clone, Default)]
pub struct SharedLocation {
    inner: Arc<RwLock<PageLocation>>,
}

impl SharedLocation {
    /// Creates a shared location starting at `location`.
    #[must_use]
    pub fn new(location: PageLocation) -> Self {
        Self {
            inner: Arc::new(RwLock::new(location)),
        }
    }

    /// Replaces the current location.
    pub fn navigate(&self, location: PageLocation) {
        *self.inner.write() = location;
    }

    /// Parses `url` and makes it the current location.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an absolute URL. The current location
    /// is left unchanged.
    pub fn navigate_to_url(&self, url: &str) -> DomainResult<()> {
        let location = PageLocation::parse(url)?;
        self.navigate(location);
        Ok(())
    }
}

impl LocationSource for SharedLocation {
    fn current(&self) -> PageLocation {
        self.inner.read().clone()
    }
}
