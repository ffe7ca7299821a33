use async_trait::async_trait;
use serde::Deserialize;

use crate::model::{BrandIdentity, Candidate, LogoFormat};
use crate::services::providers::http::HttpFetcher;
use crate::services::resolver::{Provider, ProviderError};

pub const BRANDFETCH_PROVIDER: &str = "brandfetch";

const API_BASE: &str = "https://api.brandfetch.io/v2/brands";

/// At most this many asset downloads per brand.
const MAX_ASSETS: usize = 4;

#[derive(Debug, Default, Deserialize)]
struct BrandResponse {
    #[serde(default)]
    logos: Vec<LogoEntry>,
}

#[derive(Debug, Deserialize)]
struct LogoEntry {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    formats: Vec<LogoFile>,
}

#[derive(Debug, Deserialize)]
struct LogoFile {
    #[serde(default)]
    src: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    width: Option<u32>,
}

fn kind_rank(kind: Option<&str>) -> u8 {
    match kind {
        Some("logo") => 0,
        Some("symbol") => 1,
        Some("icon") => 2,
        _ => 3,
    }
}

/// Asset URLs from a brand API response: SVGs first, then PNG/WebP, largest width first.
///
/// Within a format group wordmark logos come before symbols and icons.
pub fn asset_urls(body: &[u8]) -> Result<Vec<(String, LogoFormat)>, serde_json::Error> {
    let response: BrandResponse = serde_json::from_slice(body)?;

    let mut vectors = Vec::new();
    let mut rasters = Vec::new();
    for logo in &response.logos {
        let rank = kind_rank(logo.kind.as_deref());
        for file in &logo.formats {
            let (Some(src), Some(format)) = (file.src.as_ref(), file.format.as_deref()) else {
                continue;
            };
            match LogoFormat::from_extension(format) {
                Some(LogoFormat::Svg) => vectors.push((rank, src.clone())),
                Some(f @ (LogoFormat::Png | LogoFormat::Webp)) => {
                    rasters.push((rank, file.width.unwrap_or(0), src.clone(), f))
                }
                _ => {}
            }
        }
    }

    vectors.sort_by_key(|(rank, _)| *rank);
    rasters.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut urls: Vec<(String, LogoFormat)> =
        vectors.into_iter().map(|(_, src)| (src, LogoFormat::Svg)).collect();
    urls.extend(rasters.into_iter().map(|(_, _, src, f)| (src, f)));
    urls.dedup_by(|a, b| a.0 == b.0);
    Ok(urls)
}

/// Brandfetch brand API. Needs an API key and a domain.
pub struct BrandfetchProvider {
    http: HttpFetcher,
    api_key: Option<String>,
}

impl BrandfetchProvider {
    pub fn new(http: HttpFetcher, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl Provider for BrandfetchProvider {
    fn name(&self) -> &str {
        BRANDFETCH_PROVIDER
    }

    fn requires_domain(&self) -> bool {
        true
    }

    fn description(&self) -> String {
        "Brandfetch brand API, SVG first (needs BRANDFETCH_API_KEY)".to_string()
    }

    async fn fetch(
        &self,
        brand: &BrandIdentity,
        _slug: &str,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(ProviderError::NotConfigured("brandfetch has no API key".to_string()));
        };
        let Some(domain) = brand.domain.as_deref() else {
            return Ok(Vec::new());
        };

        let api_url = format!("{API_BASE}/{domain}");
        let body = self.http.get_with_bearer(&api_url, key).await?;
        let urls = asset_urls(&body)
            .map_err(|e| ProviderError::Decode { url: api_url.clone(), reason: e.to_string() })?;

        let mut candidates = Vec::new();
        for (url, format) in urls.into_iter().take(MAX_ASSETS) {
            match self.http.get(&url).await {
                Ok(bytes) => candidates.push(Candidate::new(bytes, Some(format)).with_origin(url)),
                Err(e) => tracing::trace!(error = %e, "brandfetch asset download failed"),
            }
        }
        Ok(candidates)
    }
}
