//! Authorized access to the REST backend

mod authorized_fetch;

pub use authorized_fetch::{API_KEY_HEADER, AuthorizedFetch};
