use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::services::batch::BatchOptions;
use crate::services::providers::{default_provider_order, ProviderSettings, DEFAULT_USER_AGENT};
use crate::services::resolver::ResolveOptions;
use crate::slug::SlugSettings;
use crate::store::DEFAULT_MIN_BYTES;
use crate::validate::ValidationRules;

/// Resolver and worker-pool tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Provider ids in the order they are consulted.
    pub provider_order: Vec<String>,
    pub provider_timeout_secs: u64,
    pub brand_timeout_secs: u64,
    pub provider_delay_ms: u64,
    /// Minimum size of an existing asset to count as cached.
    pub min_bytes: u64,
    pub concurrency: usize,
    pub dispatch_delay_ms: u64,
    pub jitter_ms: u64,
    pub user_agent: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            provider_order: default_provider_order(),
            provider_timeout_secs: 10,
            brand_timeout_secs: 45,
            provider_delay_ms: 300,
            min_bytes: DEFAULT_MIN_BYTES,
            concurrency: 10,
            dispatch_delay_ms: 200,
            jitter_ms: 250,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ResolverSettings {
    pub fn resolve_options(&self, force_refetch: bool) -> ResolveOptions {
        ResolveOptions {
            force_refetch,
            min_bytes: self.min_bytes,
            provider_timeout: Duration::from_secs(self.provider_timeout_secs.max(1)),
            brand_timeout: Duration::from_secs(self.brand_timeout_secs),
            provider_delay: Duration::from_millis(self.provider_delay_ms),
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            concurrency: self.concurrency.max(1),
            dispatch_delay: Duration::from_millis(self.dispatch_delay_ms),
            jitter: Duration::from_millis(self.jitter_ms),
        }
    }
}

/// Serializable configuration describing a logo project.
///
/// This lives at `.logofetch/config.json` in the project root. Every field has a
/// default, so a partial config still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Human-friendly project name.
    pub name: String,
    /// Schema/config version. This is about the config format, not the tool version.
    pub config_version: String,
    /// Brand catalog (JSON or YAML).
    pub catalog: String,
    /// Directory logo assets are written to.
    pub output_dir: String,
    /// Public URL prefix under which `output_dir` is served.
    pub public_prefix: String,
    /// Brand name -> public logo path mapping (JSON).
    pub map_path: String,
    /// Optional generated TypeScript module mirroring the map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typescript_map: Option<String>,
    /// Brands without a logo after the last run, one per line.
    pub failed_list: String,
    /// Full JSON report of the last run.
    pub report_path: String,
    pub resolver: ResolverSettings,
    pub validation: ValidationRules,
    pub slugs: SlugSettings,
    pub providers: ProviderSettings,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            config_version: "0.1.0".to_string(),
            catalog: "brands.json".to_string(),
            output_dir: "public/logos".to_string(),
            public_prefix: "/logos".to_string(),
            map_path: ".logofetch/logo-map.json".to_string(),
            typescript_map: None,
            failed_list: ".logofetch/failed-brands.txt".to_string(),
            report_path: ".logofetch/last-run.json".to_string(),
            resolver: ResolverSettings::default(),
            validation: ValidationRules::default(),
            slugs: SlugSettings::default(),
            providers: ProviderSettings::default(),
        }
    }
}

impl ProjectConfig {
    /// Create a new project configuration with default paths.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
}
