//! Stackbase Domain - Core types
//!
//! This crate defines the values exchanged between the admin front-end,
//! the identity service and the REST backend.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod location;
pub mod request;
pub mod response;

pub use auth::{
    AuthErrorReport, LoginParams, ResetPasswordParams, SESSION_MISSING_ERROR, SetPasswordParams,
    Tokens, UserIdentity,
};
pub use error::{DomainError, DomainResult};
pub use location::{CallbackKind, CallbackParams, PageLocation, Redirect};
pub use request::{Header, Headers, HttpMethod, RequestOptions, UserContext};
pub use response::JsonResponse;
