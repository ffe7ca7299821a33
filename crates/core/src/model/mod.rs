//! Core data model shared by the resolver, the worker pool, and the CLI.
//!
//! - `BrandIdentity`: who we are resolving a logo for.
//! - `LogoFormat`: every format a provider can declare or the sniffer can detect.
//! - `Candidate`: raw bytes from a provider, not yet validated.
//! - `ResolutionRecord`: the found / not-found outcome for one brand in one run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A brand to resolve a logo for.
///
/// The name is the join key for every downstream lookup. The domain is the
/// registrable domain of the brand's official site, when known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrandIdentity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl BrandIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), domain: None }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

/// Image formats known to the resolver.
///
/// `Ico` is accepted from providers but never persisted; it is re-encoded to PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoFormat {
    Svg,
    Png,
    Webp,
    Jpg,
    Gif,
    Ico,
}

/// Formats that may exist on disk as a logo asset, in cache-lookup order.
pub const ASSET_FORMATS: [LogoFormat; 5] =
    [LogoFormat::Svg, LogoFormat::Png, LogoFormat::Webp, LogoFormat::Jpg, LogoFormat::Gif];

impl LogoFormat {
    pub fn extension(self) -> &'static str {
        match self {
            LogoFormat::Svg => "svg",
            LogoFormat::Png => "png",
            LogoFormat::Webp => "webp",
            LogoFormat::Jpg => "jpg",
            LogoFormat::Gif => "gif",
            LogoFormat::Ico => "ico",
        }
    }

    /// Parse a file extension or format name (case-insensitive). `jpeg` maps to `Jpg`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "svg" => Some(LogoFormat::Svg),
            "png" => Some(LogoFormat::Png),
            "webp" => Some(LogoFormat::Webp),
            "jpg" | "jpeg" => Some(LogoFormat::Jpg),
            "gif" => Some(LogoFormat::Gif),
            "ico" => Some(LogoFormat::Ico),
            _ => None,
        }
    }

    /// Guess a declared format from the path component of a URL.
    pub fn from_url(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let last = path.rsplit('/').next()?;
        let (_, ext) = last.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Whether this format can be persisted as-is.
    pub fn is_asset_format(self) -> bool {
        ASSET_FORMATS.contains(&self)
    }
}

impl fmt::Display for LogoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Raw bytes produced by a provider, tagged with what the provider claims they are.
///
/// The claim is informational only; the validator sniffs the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub bytes: Vec<u8>,
    pub declared: Option<LogoFormat>,
    /// Where the bytes came from (usually a URL), for logs and reports.
    pub origin: String,
    /// Provider-specific raster byte floor, raising the configured default.
    pub min_bytes: Option<usize>,
}

impl Candidate {
    pub fn new(bytes: impl Into<Vec<u8>>, declared: Option<LogoFormat>) -> Self {
        Self { bytes: bytes.into(), declared, origin: String::new(), min_bytes: None }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_min_bytes(mut self, min_bytes: usize) -> Self {
        self.min_bytes = Some(min_bytes);
        self
    }
}

/// Where a found asset came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "provider")]
pub enum AssetSource {
    /// Already present in the output directory; no network calls were made.
    Cache,
    /// Fetched and validated from the named provider.
    Provider(String),
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSource::Cache => f.write_str("cache"),
            AssetSource::Provider(name) => f.write_str(name),
        }
    }
}

/// A logo asset persisted under the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundAsset {
    /// File name relative to the output directory (`<slug>.<ext>`).
    pub filename: String,
    pub format: LogoFormat,
    pub source: AssetSource,
    pub size: u64,
    /// Hex SHA-256 of the persisted bytes.
    pub sha256: String,
}

/// Final outcome for one brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Outcome {
    Found(FoundAsset),
    NotFound,
}

/// What happened when a single provider was consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result", content = "detail")]
pub enum AttemptResult {
    /// The provider needs a domain and the brand has none.
    Skipped,
    TimedOut,
    Failed(String),
    /// The provider answered but produced no candidates.
    Empty,
    /// Every candidate failed validation (or could not be written).
    Rejected(Vec<String>),
    Accepted(LogoFormat),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAttempt {
    pub provider: String,
    pub result: AttemptResult,
}

/// Found / not-found outcome for one brand from one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub brand: String,
    pub slug: String,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<ProviderAttempt>,
}

impl ResolutionRecord {
    pub fn found(brand: impl Into<String>, slug: impl Into<String>, asset: FoundAsset) -> Self {
        Self {
            brand: brand.into(),
            slug: slug.into(),
            outcome: Outcome::Found(asset),
            attempts: Vec::new(),
        }
    }

    pub fn not_found(brand: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            slug: slug.into(),
            outcome: Outcome::NotFound,
            attempts: Vec::new(),
        }
    }

    pub fn with_attempts(mut self, attempts: Vec<ProviderAttempt>) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn asset(&self) -> Option<&FoundAsset> {
        match &self.outcome {
            Outcome::Found(asset) => Some(asset),
            Outcome::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.asset().is_some()
    }
}
