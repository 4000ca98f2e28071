//! Outgoing request types

mod header;
mod method;
mod options;

pub use header::{Header, Headers};
pub use method::HttpMethod;
pub use options::{RequestOptions, UserContext};
