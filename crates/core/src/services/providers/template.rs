//! Providers driven purely by URL templates.
//!
//! Placeholders: `{domain}`, `{slug}`, `{compact}` (slug without dashes) and
//! `{token}` (a secret supplied from the environment).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{BrandIdentity, Candidate, LogoFormat};
use crate::services::providers::http::HttpFetcher;
use crate::services::resolver::{Provider, ProviderError};

/// Declarative description of a template provider, as stored in config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub name: String,
    /// URLs tried in order; each successful download becomes one candidate.
    pub urls: Vec<String>,
    /// Format the service claims to serve. Falls back to the URL extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<LogoFormat>,
    /// Raster byte floor stricter than the global one, for services with placeholder images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_bytes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TemplateSpec {
    pub fn new(name: impl Into<String>, urls: &[&str]) -> Self {
        Self {
            name: name.into(),
            urls: urls.iter().map(|u| u.to_string()).collect(),
            format: None,
            min_bytes: None,
            description: None,
        }
    }

    pub fn with_format(mut self, format: LogoFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_min_bytes(mut self, min_bytes: usize) -> Self {
        self.min_bytes = Some(min_bytes);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn requires_domain(&self) -> bool {
        self.urls.iter().any(|u| u.contains("{domain}"))
    }

    pub fn requires_token(&self) -> bool {
        self.urls.iter().any(|u| u.contains("{token}"))
    }
}

pub const LOGO_DEV_PROVIDER: &str = "logo-dev";

/// Built-in public logo and favicon services.
pub fn builtin_templates() -> Vec<TemplateSpec> {
    vec![
        TemplateSpec::new("simple-icons", &["https://cdn.simpleicons.org/{compact}"])
            .with_format(LogoFormat::Svg)
            .with_description("Simple Icons SVG CDN, looked up by compact slug"),
        TemplateSpec::new(
            LOGO_DEV_PROVIDER,
            &["https://img.logo.dev/{domain}?token={token}&format=png&size=400"],
        )
        .with_format(LogoFormat::Png)
        .with_description("logo.dev image API (needs LOGO_DEV_TOKEN)"),
        TemplateSpec::new(
            "clearbit",
            &["https://logo.clearbit.com/{domain}?size=512", "https://logo.clearbit.com/{domain}"],
        )
        .with_format(LogoFormat::Png)
        .with_min_bytes(1000)
        .with_description("Clearbit logo API"),
        TemplateSpec::new("unavatar", &["https://unavatar.io/{domain}?fallback=false"])
            .with_min_bytes(1000)
            .with_description("unavatar.io aggregated avatars"),
        TemplateSpec::new(
            "google-favicon",
            &["https://www.google.com/s2/favicons?domain={domain}&sz=256"],
        )
        .with_format(LogoFormat::Png)
        .with_description("Google favicon service at 256px"),
        TemplateSpec::new("duckduckgo", &["https://icons.duckduckgo.com/ip3/{domain}.ico"])
            .with_format(LogoFormat::Ico)
            .with_description("DuckDuckGo icon service"),
        TemplateSpec::new("site-favicon", &["https://{domain}/favicon.ico"])
            .with_format(LogoFormat::Ico)
            .with_description("The brand site's own /favicon.ico"),
    ]
}

pub struct TemplateProvider {
    spec: TemplateSpec,
    token: Option<String>,
    http: HttpFetcher,
}

impl TemplateProvider {
    pub fn new(spec: TemplateSpec, http: HttpFetcher) -> Self {
        Self { spec, token: None, http }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn spec(&self) -> &TemplateSpec {
        &self.spec
    }

    /// Fill in a template for one brand. `None` when a needed value is unavailable.
    pub fn expand(&self, template: &str, brand: &BrandIdentity, slug: &str) -> Option<String> {
        let mut url = template.replace("{slug}", slug).replace("{compact}", &slug.replace('-', ""));
        if url.contains("{domain}") {
            url = url.replace("{domain}", brand.domain.as_deref()?);
        }
        if url.contains("{token}") {
            url = url.replace("{token}", self.token.as_deref()?);
        }
        Some(url)
    }
}

#[async_trait]
impl Provider for TemplateProvider {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn requires_domain(&self) -> bool {
        self.spec.requires_domain()
    }

    fn description(&self) -> String {
        self.spec.description.clone().unwrap_or_else(|| self.spec.urls.join(" | "))
    }

    async fn fetch(
        &self,
        brand: &BrandIdentity,
        slug: &str,
    ) -> Result<Vec<Candidate>, ProviderError> {
        if self.spec.requires_token() && self.token.is_none() {
            return Err(ProviderError::NotConfigured(format!("{} has no token", self.spec.name)));
        }

        let mut candidates = Vec::new();
        let mut last_error = None;
        for template in &self.spec.urls {
            let Some(url) = self.expand(template, brand, slug) else {
                continue;
            };
            match self.http.get(&url).await {
                Ok(bytes) => {
                    let declared = self.spec.format.or_else(|| LogoFormat::from_url(&url));
                    let mut candidate = Candidate::new(bytes, declared).with_origin(url);
                    if let Some(min) = self.spec.min_bytes {
                        candidate = candidate.with_min_bytes(min);
                    }
                    candidates.push(candidate);
                }
                Err(e) => {
                    tracing::trace!(provider = %self.spec.name, error = %e, "template url failed");
                    last_error = Some(e);
                }
            }
        }

        match (candidates.is_empty(), last_error) {
            (true, Some(e)) => Err(e),
            _ => Ok(candidates),
        }
    }
}
