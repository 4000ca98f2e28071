//! Authentication module for Stackbase.
//!
//! This module provides:
//! - The single-slot session cache and the access-token resolver
//! - The admin authentication provider contract
//! - The provider implementation over the identity service ports

mod provider;
mod session_cache;
mod stack_provider;
mod token_resolver;

pub use provider::{AuthProvider, IdentityResolver, PermissionsResolver};
pub use session_cache::{CachePolicy, SessionCache};
pub use stack_provider::{StackAuthOptions, StackAuthProvider};
pub use token_resolver::TokenResolver;
