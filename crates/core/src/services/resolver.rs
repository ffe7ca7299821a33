use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::{sleep, timeout};

use crate::model::{
    AssetSource, AttemptResult, BrandIdentity, Candidate, FoundAsset, ProviderAttempt,
    ResolutionRecord,
};
use crate::slug::SlugRules;
use crate::store::{AssetStore, DEFAULT_MIN_BYTES};
use crate::validate::{validate_candidate, ValidationRules};

/// Errors a provider may report. All of them are absorbed by the resolver.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("{url} body exceeds {limit} bytes")]
    TooLarge { url: String, limit: usize },
    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("not configured: {0}")]
    NotConfigured(String),
}

/// A named acquisition strategy producing candidate logo bytes for a brand.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Providers that need a domain are skipped for brands without one.
    fn requires_domain(&self) -> bool {
        false
    }

    fn description(&self) -> String {
        format!("Provider '{}'", self.name())
    }

    /// Candidates in the provider's preference order.
    async fn fetch(
        &self,
        brand: &BrandIdentity,
        slug: &str,
    ) -> Result<Vec<Candidate>, ProviderError>;
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Unknown provider '{name}'. Available: {available}")]
    UnknownProvider { name: String, available: String },
}

/// Registry of providers; callers select and order them by name.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self { providers: HashMap::new() }
    }

    /// Register a provider; a later registration under the same name replaces the earlier one.
    pub fn register<P: Provider + 'static>(&mut self, provider: P) -> &mut Self {
        self.register_arc(Arc::new(provider))
    }

    pub fn register_arc(&mut self, provider: Arc<dyn Provider>) -> &mut Self {
        self.providers.insert(provider.name().to_string(), provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Sorted list of registered provider names for error messages/help.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.providers.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Providers in the given order. Unknown names are an error.
    pub fn ordered(&self, order: &[String]) -> Result<Vec<Arc<dyn Provider>>, ResolveError> {
        order
            .iter()
            .map(|name| {
                self.get(name).ok_or_else(|| ResolveError::UnknownProvider {
                    name: name.clone(),
                    available: self.names().join(", "),
                })
            })
            .collect()
    }
}

/// Knobs for a single brand resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Skip the cache check and always consult providers.
    pub force_refetch: bool,
    /// Minimum size of an existing file to count as cached.
    pub min_bytes: u64,
    pub provider_timeout: Duration,
    pub brand_timeout: Duration,
    /// Pause between consecutive provider invocations for one brand.
    pub provider_delay: Duration,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            force_refetch: false,
            min_bytes: DEFAULT_MIN_BYTES,
            provider_timeout: Duration::from_secs(10),
            brand_timeout: Duration::from_secs(45),
            provider_delay: Duration::from_millis(300),
        }
    }
}

impl ResolveOptions {
    /// The brand timeout, kept strictly above the provider timeout.
    pub fn effective_brand_timeout(&self) -> Duration {
        let floor = self.provider_timeout + Duration::from_secs(1);
        self.brand_timeout.max(floor)
    }
}

/// Ordered-fallback logo resolver for one output directory.
pub struct Resolver {
    providers: Vec<Arc<dyn Provider>>,
    store: AssetStore,
    rules: ValidationRules,
    slugs: SlugRules,
    options: ResolveOptions,
}

impl Resolver {
    pub fn new(
        providers: Vec<Arc<dyn Provider>>,
        output_dir: impl Into<PathBuf>,
        options: ResolveOptions,
    ) -> Self {
        let store = AssetStore::new(output_dir, options.min_bytes);
        Self {
            providers,
            store,
            rules: ValidationRules::default(),
            slugs: SlugRules::default(),
            options,
        }
    }

    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_slug_rules(mut self, slugs: SlugRules) -> Self {
        self.slugs = slugs;
        self
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    pub fn slug_rules(&self) -> &SlugRules {
        &self.slugs
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Resolve a brand under the slug derived from its name.
    pub async fn resolve(&self, brand: &BrandIdentity) -> ResolutionRecord {
        let slug = self.slugs.slug(&brand.name);
        self.resolve_as(brand, &slug).await
    }

    /// Resolve a brand under an already-assigned slug.
    ///
    /// Never fails: provider errors, rejections and timeouts all end in `NotFound`.
    pub async fn resolve_as(&self, brand: &BrandIdentity, slug: &str) -> ResolutionRecord {
        if brand.name.trim().is_empty() || slug.is_empty() {
            tracing::warn!(brand = %brand.name, "cannot resolve a brand without a name or slug");
            return ResolutionRecord::not_found(&brand.name, slug);
        }

        if !self.options.force_refetch {
            match self.store.find_existing(slug) {
                Ok(Some(asset)) => {
                    tracing::debug!(brand = %brand.name, file = %asset.filename, "cached");
                    return ResolutionRecord::found(&brand.name, slug, asset);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(brand = %brand.name, error = %e, "cache check failed");
                }
            }
        }

        let mut attempts = Vec::new();
        let outcome = timeout(
            self.options.effective_brand_timeout(),
            self.try_providers(brand, slug, &mut attempts),
        )
        .await;

        match outcome {
            Ok(Some(asset)) => ResolutionRecord::found(&brand.name, slug, asset),
            Ok(None) => ResolutionRecord::not_found(&brand.name, slug),
            Err(_) => {
                tracing::warn!(brand = %brand.name, "brand resolution timed out");
                ResolutionRecord::not_found(&brand.name, slug)
            }
        }
        .with_attempts(attempts)
    }

    async fn try_providers(
        &self,
        brand: &BrandIdentity,
        slug: &str,
        attempts: &mut Vec<ProviderAttempt>,
    ) -> Option<FoundAsset> {
        let mut invoked = false;

        for provider in &self.providers {
            let name = provider.name().to_string();
            if provider.requires_domain() && brand.domain.is_none() {
                attempts.push(ProviderAttempt { provider: name, result: AttemptResult::Skipped });
                continue;
            }

            if invoked && !self.options.provider_delay.is_zero() {
                sleep(self.options.provider_delay).await;
            }
            invoked = true;

            let fetched = timeout(self.options.provider_timeout, provider.fetch(brand, slug)).await;
            let candidates = match fetched {
                Err(_) => {
                    tracing::debug!(brand = %brand.name, provider = %name, "timed out");
                    let result = AttemptResult::TimedOut;
                    attempts.push(ProviderAttempt { provider: name, result });
                    continue;
                }
                Ok(Err(e)) => {
                    tracing::debug!(brand = %brand.name, provider = %name, error = %e, "failed");
                    let result = AttemptResult::Failed(e.to_string());
                    attempts.push(ProviderAttempt { provider: name, result });
                    continue;
                }
                Ok(Ok(candidates)) => candidates,
            };

            if candidates.is_empty() {
                attempts.push(ProviderAttempt { provider: name, result: AttemptResult::Empty });
                continue;
            }

            let mut reasons = Vec::new();
            for candidate in &candidates {
                let validated = match validate_candidate(candidate, &self.rules) {
                    Ok(validated) => validated,
                    Err(rejection) => {
                        tracing::debug!(
                            brand = %brand.name,
                            provider = %name,
                            origin = %candidate.origin,
                            %rejection,
                            "candidate rejected"
                        );
                        reasons.push(rejection.to_string());
                        continue;
                    }
                };

                let source = AssetSource::Provider(name.clone());
                match self.store.write(slug, validated.format, &validated.bytes, source) {
                    Ok(asset) => {
                        tracing::info!(
                            brand = %brand.name,
                            provider = %name,
                            file = %asset.filename,
                            "logo saved"
                        );
                        attempts.push(ProviderAttempt {
                            provider: name,
                            result: AttemptResult::Accepted(asset.format),
                        });
                        return Some(asset);
                    }
                    Err(e) => {
                        tracing::error!(brand = %brand.name, error = %e, "failed to write logo");
                        reasons.push(format!("write failed: {e}"));
                    }
                }
            }
            let result = AttemptResult::Rejected(reasons);
            attempts.push(ProviderAttempt { provider: name, result });
        }

        None
    }
}
