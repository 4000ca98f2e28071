//! Port adapters

mod location;
mod reqwest_client;

pub use location::SharedLocation;
pub use reqwest_client::ReqwestJsonFetcher;
