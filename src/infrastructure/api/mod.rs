//! Content API adapters: transport, wire types and repositories.

mod client;
mod dto;
mod repositories;
mod transport;
mod url_resolver;

use reqwest::Url;

pub use client::{ApiConfig, BooruClient};
pub use repositories::{ApiAccountRepository, ApiPostRepository, ApiTagRepository};
pub use transport::{
    ACCEPT_IMAGE, ACCEPT_JSON, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
    ReqwestTransport, TransportConfig,
};
pub use url_resolver::{DEFAULT_CONTENT_HOST, UrlResolver};

#[cfg(test)]
pub use transport::MockHttpTransport;

/// Parsed [`DEFAULT_CONTENT_HOST`].
///
/// # Panics
/// Never in practice: the constant is a valid URL.
#[must_use]
#[allow(clippy::expect_used)]
pub fn default_content_host() -> Url {
    Url::parse(DEFAULT_CONTENT_HOST).expect("default content host is a valid URL")
}
