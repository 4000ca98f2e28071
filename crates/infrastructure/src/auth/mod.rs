//! Identity service adapter: the Stack Auth client, its cookie token store
//! and the PKCE helpers used by `OAuth` sign-in.

pub mod pkce;
mod stack_client;
mod token_store;

pub use stack_client::{StackClient, StackSession, StackUser, StackUserProfile};
pub use token_store::{ACCESS_COOKIE, CookieTokenStore, refresh_cookie_name};
