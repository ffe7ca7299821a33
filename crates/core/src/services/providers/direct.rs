use std::collections::HashMap;

use async_trait::async_trait;

use crate::model::{BrandIdentity, Candidate, LogoFormat};
use crate::services::providers::http::HttpFetcher;
use crate::services::resolver::{Provider, ProviderError};

pub const DIRECT_PROVIDER: &str = "direct";

/// Curated per-brand logo URLs, keyed by exact brand name.
pub struct DirectUrlProvider {
    urls: HashMap<String, String>,
    http: HttpFetcher,
}

impl DirectUrlProvider {
    pub fn new(urls: HashMap<String, String>, http: HttpFetcher) -> Self {
        Self { urls, http }
    }

    pub fn url_for(&self, brand: &str) -> Option<&str> {
        self.urls.get(brand).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[async_trait]
impl Provider for DirectUrlProvider {
    fn name(&self) -> &str {
        DIRECT_PROVIDER
    }

    fn description(&self) -> String {
        format!("Curated logo URLs from the brand catalog ({} brands)", self.urls.len())
    }

    async fn fetch(
        &self,
        brand: &BrandIdentity,
        _slug: &str,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let Some(url) = self.url_for(&brand.name) else {
            return Ok(Vec::new());
        };
        let bytes = self.http.get(url).await?;
        Ok(vec![Candidate::new(bytes, LogoFormat::from_url(url)).with_origin(url)])
    }
}
