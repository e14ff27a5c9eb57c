//! HTTP transport shared by the API client and the image fetcher.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method, Url, header};
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::domain::errors::{ApiError, TransportErrorKind};

const USER_AGENT: &str = concat!("booru-view/", env!("CARGO_PKG_VERSION"));

/// Accept header for JSON API calls.
pub const ACCEPT_JSON: &str = "application/json";
/// Accept header for image downloads.
pub const ACCEPT_IMAGE: &str = "image/avif,image/webp,image/png,image/jpeg,image/*;q=0.8,*/*;q=0.5";

/// HTTP verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

/// A request handed to the transport.
#[derive(Clone)]
pub struct HttpRequest {
    /// Verb.
    pub method: HttpMethod,
    /// Absolute URL including the query string.
    pub url: Url,
    /// Value of the Accept header.
    pub accept: &'static str,
    /// Value of the Authorization header, if any.
    pub authorization: Option<String>,
    /// URL-encoded form fields sent as the body.
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    /// Creates a GET request.
    #[must_use]
    pub const fn get(url: Url, accept: &'static str) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            accept,
            authorization: None,
            form: Vec::new(),
        }
    }

    /// Sets the method.
    #[must_use]
    pub const fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the Authorization header value.
    #[must_use]
    pub fn with_authorization(mut self, value: Option<String>) -> Self {
        self.authorization = value;
        self
    }

    /// Appends a form field.
    #[must_use]
    pub fn with_form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((key.into(), value.into()));
        self
    }
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("accept", &self.accept)
            .field("authenticated", &self.authorization.is_some())
            .field("form_fields", &self.form.len())
            .finish()
    }
}

/// A completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Raw body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for statuses in `[200, 300)`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sends requests to one host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and returns the raw response, whatever its status.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Configuration for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Value of the Referer header.
    pub referer: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Upper bound for a request including connectivity waits.
    pub resource_timeout: Duration,
    /// Maximum concurrent in-flight requests. Excess requests queue.
    pub max_connections: usize,
    /// Keep retrying connection failures until the resource timeout.
    pub wait_for_connectivity: bool,
    /// Pause between connectivity retries.
    pub connectivity_retry_interval: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            referer: "https://danbooru.donmai.us/".to_string(),
            request_timeout: Duration::from_secs(20),
            resource_timeout: Duration::from_secs(60),
            max_connections: 4,
            wait_for_connectivity: true,
            connectivity_retry_interval: Duration::from_secs(1),
        }
    }
}

/// `reqwest`-backed transport with a hard concurrency cap.
pub struct ReqwestTransport {
    client: Client,
    permits: Arc<Semaphore>,
    config: TransportConfig,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Creates a transport.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(config: TransportConfig) -> Result<Self, ApiError> {
        let max_connections = config.max_connections.max(1);
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout.min(Duration::from_secs(10)))
            .pool_max_idle_per_host(max_connections)
            .gzip(true)
            .build()
            .map_err(|e| {
                ApiError::transport(
                    TransportErrorKind::Other,
                    format!("failed to create HTTP client: {e}"),
                )
            })?;

        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(max_connections)),
            config,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    async fn execute_once(&self, request: &HttpRequest) -> Result<HttpResponse, reqwest::Error> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.clone())
            .header(header::ACCEPT, request.accept)
            .header(header::REFERER, &self.config.referer);

        if let Some(authorization) = &request.authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(HttpResponse { status, body })
    }

    async fn send_waiting_for_connectivity(
        &self,
        request: &HttpRequest,
        deadline: Instant,
    ) -> Result<HttpResponse, ApiError> {
        loop {
            match self.execute_once(request).await {
                Ok(response) => return Ok(response),
                Err(e)
                    if e.is_connect()
                        && self.config.wait_for_connectivity
                        && Instant::now() + self.config.connectivity_retry_interval
                            < deadline =>
                {
                    debug!(url = %request.url, error = %e, "Host unreachable, waiting for connectivity");
                    tokio::time::sleep(self.config.connectivity_retry_interval).await;
                }
                Err(e) => {
                    warn!(url = %request.url, error = %e, "Request failed");
                    return Err(map_reqwest_error(&e));
                }
            }
        }
    }
}

fn map_reqwest_error(e: &reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::transport(TransportErrorKind::Timeout, "request timed out")
    } else if e.is_connect() {
        ApiError::transport(TransportErrorKind::Offline, format!("failed to connect: {e}"))
    } else if e.is_body() || e.is_decode() || e.is_redirect() {
        ApiError::InvalidResponse
    } else {
        ApiError::transport(TransportErrorKind::Other, e.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let _permit = self.permits.acquire().await.map_err(|_| {
            ApiError::transport(TransportErrorKind::Other, "transport is shutting down")
        })?;

        trace!(method = ?request.method, url = %request.url, "Sending request");

        let deadline = Instant::now() + self.config.resource_timeout;
        match tokio::time::timeout(
            self.config.resource_timeout,
            self.send_waiting_for_connectivity(&request, deadline),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(url = %request.url, "Resource timeout elapsed");
                Err(ApiError::transport(
                    TransportErrorKind::Timeout,
                    "resource timeout elapsed",
                ))
            }
        }
    }
}
