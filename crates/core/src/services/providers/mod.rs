//! Built-in providers and the default registry.
//!
//! Network providers share one `HttpFetcher`. Secrets are read from the
//! environment only; a provider missing its secret reports "not configured".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::services::resolver::ProviderRegistry;

pub mod brandfetch;
pub mod direct;
pub mod http;
pub mod template;
pub mod wikidata;

pub use brandfetch::{BrandfetchProvider, BRANDFETCH_PROVIDER};
pub use direct::{DirectUrlProvider, DIRECT_PROVIDER};
pub use http::{HttpFetcher, DEFAULT_USER_AGENT, MAX_BODY_BYTES};
pub use template::{builtin_templates, TemplateProvider, TemplateSpec, LOGO_DEV_PROVIDER};
pub use wikidata::{WikidataProvider, WIKIDATA_PROVIDER};

pub const BRANDFETCH_KEY_ENV: &str = "BRANDFETCH_API_KEY";
pub const LOGO_DEV_TOKEN_ENV: &str = "LOGO_DEV_TOKEN";

/// Default provider order: curated and high-quality sources first, favicons last.
pub const DEFAULT_PROVIDER_ORDER: &[&str] = &[
    DIRECT_PROVIDER,
    BRANDFETCH_PROVIDER,
    WIKIDATA_PROVIDER,
    "simple-icons",
    LOGO_DEV_PROVIDER,
    "clearbit",
    "unavatar",
    "google-favicon",
    "duckduckgo",
    "site-favicon",
];

pub fn default_provider_order() -> Vec<String> {
    DEFAULT_PROVIDER_ORDER.iter().map(|s| s.to_string()).collect()
}

/// Provider section of the project config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Extra URL-template providers. A template named like a built-in replaces it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateSpec>,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderSecrets {
    pub brandfetch_api_key: Option<String>,
    pub logo_dev_token: Option<String>,
}

impl ProviderSecrets {
    pub fn from_env() -> Self {
        Self {
            brandfetch_api_key: non_empty_env(BRANDFETCH_KEY_ENV),
            logo_dev_token: non_empty_env(LOGO_DEV_TOKEN_ENV),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Registry with every built-in provider plus the configured templates.
pub fn default_provider_registry(
    http: &HttpFetcher,
    direct_urls: HashMap<String, String>,
    settings: &ProviderSettings,
    secrets: &ProviderSecrets,
) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register(DirectUrlProvider::new(direct_urls, http.clone()));
    registry.register(BrandfetchProvider::new(http.clone(), secrets.brandfetch_api_key.clone()));
    registry.register(WikidataProvider::new(http.clone()));

    for spec in builtin_templates().into_iter().chain(settings.templates.iter().cloned()) {
        let token = (spec.name == LOGO_DEV_PROVIDER).then(|| secrets.logo_dev_token.clone());
        registry.register(TemplateProvider::new(spec, http.clone()).with_token(token.flatten()));
    }
    registry
}
