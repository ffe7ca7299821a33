use anyhow::Result;
use serde::Serialize;

use logo_core::project::Catalog;

use crate::commands::{load_context_or_default, provider_registry};

#[derive(Debug, Serialize)]
pub struct ProviderInfo {
    pub name: String,
    /// 1-based position in the configured order; `None` when not in use.
    pub position: Option<usize>,
    pub requires_domain: bool,
    pub description: String,
}

/// Every registered provider; those in the configured order come first.
pub fn provider_infos(root: &str) -> Result<Vec<ProviderInfo>> {
    let ctx = load_context_or_default(root)?;
    let catalog = match ctx.load_catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::debug!(error = %e, "catalog unavailable; direct provider has no URLs");
            Catalog::default()
        }
    };
    let registry = provider_registry(&ctx, &catalog)?;
    let order = &ctx.config.resolver.provider_order;

    let mut entries: Vec<ProviderInfo> = registry
        .names()
        .into_iter()
        .filter_map(|name| registry.get(&name))
        .map(|provider| ProviderInfo {
            name: provider.name().to_string(),
            position: order.iter().position(|n| n == provider.name()).map(|i| i + 1),
            requires_domain: provider.requires_domain(),
            description: provider.description(),
        })
        .collect();
    entries.sort_by(|a, b| match (a.position, b.position) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    });
    Ok(entries)
}

/// List available providers.
pub fn list_providers_command(root: &str, json: bool) -> Result<()> {
    let entries = provider_infos(root)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Providers:");
    for entry in entries {
        let position = entry.position.map_or_else(|| "-".to_string(), |p| p.to_string());
        let domain = if entry.requires_domain { " [needs domain]" } else { "" };
        println!("{:>3}. {}{}: {}", position, entry.name, domain, entry.description);
    }
    Ok(())
}
