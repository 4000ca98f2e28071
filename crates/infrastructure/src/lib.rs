//! Stackbase Infrastructure - Adapters and wiring
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, the configuration loader and the
//! composition root that assembles them.

pub mod adapters;
pub mod auth;
pub mod config;
pub mod rest;
pub mod wiring;

pub use adapters::{ReqwestJsonFetcher, SharedLocation};
pub use auth::{CookieTokenStore, StackClient, StackSession, StackUser, StackUserProfile};
pub use config::{
    AuthSettings, ConfigError, RestSettings, Settings, SettingsLoader, StackSettings,
    TokenStoreMode,
};
pub use rest::RestEndpoint;
pub use wiring::{
    ProfileIdentityResolver, StackAdminAuthProvider, StackAuthorizedFetch, StackTokenResolver,
    Stackbase, WiringError,
};
