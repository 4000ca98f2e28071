//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod identity;
mod json_fetcher;
mod location;

pub use identity::{IdentityClient, IdentityError, IdentitySession, IdentityUser, SessionOf};
pub use json_fetcher::{FetchError, JsonFetcher};
pub use location::LocationSource;
