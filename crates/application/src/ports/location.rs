//! Page location port

use stackbase_domain::PageLocation;

/// Port for reading where the hosting page currently is.
pub trait LocationSource: Send + Sync {
    /// Returns the current page location.
    fn current(&self) -> PageLocation;
}

/// A fixed location, for one-shot checks and tests.
impl LocationSource for PageLocation {
    fn current(&self) -> PageLocation {
        self.clone()
    }
}
