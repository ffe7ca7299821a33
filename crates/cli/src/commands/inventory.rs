use anyhow::Result;
use serde::Serialize;

use logo_core::model::ResolutionRecord;
use logo_core::slug::SlugTable;

use crate::commands::{load_context, save_map};

#[derive(Debug, Serialize)]
pub struct MissingBrand {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Catalog brands without a qualifying asset on disk, in catalog order.
pub fn missing_brands(root: &str) -> Result<Vec<MissingBrand>> {
    let ctx = load_context(root)?;
    let catalog = ctx.load_catalog()?;
    let store = ctx.asset_store();
    let rules = ctx.slug_rules();
    let brands = catalog.brands();
    let table = SlugTable::build(&brands, &rules);
    let owned = table.slugs_by_name();

    // A brand that lost its slug to another one has no asset of its own.
    Ok(brands
        .iter()
        .filter_map(|brand| {
            let slug = match owned.get(brand.name.as_str()) {
                Some(slug) if store.has_asset(slug) => return None,
                Some(slug) => slug.to_string(),
                None => rules.slug(&brand.name),
            };
            Some(MissingBrand { name: brand.name.clone(), slug, domain: brand.domain.clone() })
        })
        .collect())
}

/// List catalog brands without a logo.
pub fn missing_command(root: &str, json: bool) -> Result<()> {
    let missing = missing_brands(root)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&missing)?);
        return Ok(());
    }

    if missing.is_empty() {
        println!("Missing logos: (none)");
        return Ok(());
    }

    println!("Missing logos ({}):", missing.len());
    for brand in &missing {
        match &brand.domain {
            Some(domain) => println!("- {} [{}] ({})", brand.name, brand.slug, domain),
            None => println!("- {} [{}]", brand.name, brand.slug),
        }
    }
    Ok(())
}

/// Upsert every brand with a logo on disk into the map. No network access.
///
/// Returns the number of map entries that changed.
pub fn sync_map_command(root: &str) -> Result<usize> {
    let ctx = load_context(root)?;
    let catalog = ctx.load_catalog()?;
    let store = ctx.asset_store();
    let table = SlugTable::build(&catalog.brands(), &ctx.slug_rules());
    for conflict in &table.conflicts {
        tracing::warn!(%conflict, "brand skipped");
    }

    let mut records = Vec::new();
    for (brand, slug) in table.assigned {
        if let Some(asset) = store.find_existing(&slug)? {
            records.push(ResolutionRecord::found(brand.name, slug, asset));
        }
    }

    let mut map = ctx.load_map()?;
    let changed = map.upsert_records(&records, &ctx.config.public_prefix);
    save_map(&ctx, &map)?;

    println!("Synced logo map:");
    println!("  Logos on disk: {}", records.len());
    println!("  Entries changed: {}", changed);
    println!("  Map: {}", ctx.map_path.display());
    Ok(changed)
}
