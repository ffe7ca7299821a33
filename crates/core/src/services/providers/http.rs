use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::redirect::Policy;
use reqwest::RequestBuilder;

use crate::services::resolver::ProviderError;

/// Largest response body a provider may return.
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

const MAX_REDIRECTS: usize = 5;

const ACCEPT_IMAGES: &str = "image/svg+xml,image/webp,image/png,image/*,*/*;q=0.8";

pub const DEFAULT_USER_AGENT: &str =
    concat!("logofetch/", env!("CARGO_PKG_VERSION"), " (+brand logo resolver)");

/// Shared HTTP client used by all network providers.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_IMAGES));

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(request_timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { client, max_body_bytes: MAX_BODY_BYTES })
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// GET `url` and return the body of a 2xx response.
    pub async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.send(self.client.get(url), url).await
    }

    /// GET `url` with a bearer token.
    pub async fn get_with_bearer(&self, url: &str, token: &str) -> Result<Vec<u8>, ProviderError> {
        let request = self.client.get(url).header(AUTHORIZATION, format!("Bearer {token}"));
        self.send(request, url).await
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Vec<u8>, ProviderError> {
        let mut response = request.send().await.map_err(|e| transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status { url: url.to_string(), status: status.as_u16() });
        }
        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes as u64 {
                return Err(self.too_large(url));
            }
        }

        // Content-Length is absent on chunked responses; enforce the cap while reading.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| transport(url, e))? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    fn too_large(&self, url: &str) -> ProviderError {
        ProviderError::TooLarge { url: url.to_string(), limit: self.max_body_bytes }
    }
}

fn transport(url: &str, err: reqwest::Error) -> ProviderError {
    ProviderError::Transport { url: url.to_string(), reason: err.to_string() }
}
