pub mod client;
pub mod credentials;
pub mod reqwest_client;
pub mod sheets;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export some types to use with the http client.
pub use reqwest::header::HeaderMap;
pub use reqwest::{Method, Request, StatusCode};
