//! Stackbase Application - Ports and auth flows
//!
//! This crate defines the application layer with:
//! - Port traits for the identity service, the JSON fetch utility and the page location
//! - The session cache and access-token resolver
//! - The authorized fetch wrapper used for every REST call
//! - The admin auth-provider contract and its identity-service adapter

pub mod auth;
pub mod error;
pub mod http;
pub mod ports;

#[cfg(test)]
mod test_support;

pub use auth::{
    AuthProvider, CachePolicy, IdentityResolver, PermissionsResolver, SessionCache,
    StackAuthOptions, StackAuthProvider, TokenResolver,
};
pub use error::{AuthProviderError, AuthResult, AuthorizedFetchError, BoxError};
pub use http::{API_KEY_HEADER, AuthorizedFetch};
pub use ports::{
    FetchError, IdentityClient, IdentityError, IdentitySession, IdentityUser, JsonFetcher,
    LocationSource, SessionOf,
};
