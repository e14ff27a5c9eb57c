//! Media URL normalization against the content host.

use reqwest::Url;

/// Default content host.
pub const DEFAULT_CONTENT_HOST: &str = "https://danbooru.donmai.us";

/// Resolves possibly-relative media paths to absolute URLs.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    host: Url,
}

impl UrlResolver {
    /// Creates a resolver for the given host.
    #[must_use]
    pub const fn new(host: Url) -> Self {
        Self { host }
    }

    /// Returns the content host.
    #[must_use]
    pub const fn host(&self) -> &Url {
        &self.host
    }

    /// Resolves a media path.
    ///
    /// Absolute `http(s)` URLs are returned unchanged, protocol-relative
    /// URLs get `https:`, other paths are joined to the host. Blank input
    /// and non-web schemes resolve to `None`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }

        if path.starts_with("//") {
            return Url::parse(&format!("https:{path}")).ok().map(String::from);
        }

        match Url::parse(path) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url.into()),
            Ok(_) => None,
            Err(_) => self.host.join(path).ok().map(String::from),
        }
    }
}

impl Default for UrlResolver {
    fn default() -> Self {
        Self::new(super::default_content_host())
    }
}
