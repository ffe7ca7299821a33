use std::sync::Arc;

use anyhow::{Context, Result};

use logo_core::model::{BrandIdentity, ResolutionRecord};
use logo_core::services::batch::{run_batch_within, RunSummary};
use logo_core::slug::SlugTable;
use logo_core::store::AssetStore;

use crate::commands::{build_resolver, load_context, persist_run};

/// Options for `fetch`, mirroring the CLI flags.
#[derive(Debug, Clone, Default)]
pub struct FetchArgs {
    /// Case-insensitive substring filter on brand names.
    pub brand: Option<String>,
    /// Process every selected brand, not only those without a logo.
    pub all: bool,
    /// Bypass the cache for every selected brand.
    pub force: bool,
    pub concurrency: Option<usize>,
    pub providers: Option<Vec<String>>,
}

/// Brands to process: all of them, or only those without a qualifying asset.
///
/// `slugs` is the catalog-wide assignment. A brand absent from it lost its slug
/// to another brand and is always selected so the conflict gets reported.
pub fn select_brands(
    brands: Vec<BrandIdentity>,
    store: &AssetStore,
    slugs: &SlugTable,
    include_cached: bool,
) -> Vec<BrandIdentity> {
    if include_cached {
        return brands;
    }
    let owned = slugs.slugs_by_name();
    brands
        .into_iter()
        .filter(|b| match owned.get(b.name.as_str()) {
            Some(slug) => !store.has_asset(slug),
            None => true,
        })
        .collect()
}

/// Resolve logos for the selected catalog brands and write every run artifact.
pub fn fetch_command(root: &str, args: &FetchArgs) -> Result<()> {
    let ctx = load_context(root)?;
    let catalog = ctx.load_catalog()?;
    let store = ctx.asset_store();
    let everything = catalog.brands();
    let slugs = SlugTable::build(&everything, &ctx.slug_rules());

    let filtered = match args.brand.as_deref() {
        Some(needle) => catalog.filter(needle),
        None => everything.clone(),
    };
    let matched = filtered.len();
    let selected = select_brands(filtered, &store, &slugs, args.all || args.force);

    if selected.is_empty() {
        println!("Nothing to fetch: {} matching brands already have a logo.", matched);
        return Ok(());
    }

    let resolver = build_resolver(&ctx, &catalog, args.force, args.providers.as_deref())?;
    let mut batch = ctx.config.resolver.batch_options();
    if let Some(n) = args.concurrency {
        batch.concurrency = n.max(1);
    }

    let total = selected.len();
    println!(
        "Fetching logos for {} brands (concurrency {}, providers: {})",
        total,
        batch.concurrency,
        resolver.provider_names().join(", ")
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let mut done = 0usize;
    let report = runtime.block_on(run_batch_within(
        Arc::new(resolver),
        selected,
        &everything,
        &batch,
        |record| {
            done += 1;
            print_progress(done, total, record);
        },
    ));

    persist_run(&ctx, &report)?;
    print_summary(&report.summary());
    println!();
    println!("Logo map: {}", ctx.map_path.display());
    println!("Failed list: {}", ctx.failed_list_path.display());
    println!("Run report: {}", ctx.report_path.display());

    Ok(())
}

fn print_progress(done: usize, total: usize, record: &ResolutionRecord) {
    match record.asset() {
        Some(asset) => {
            println!("[{done}/{total}] {}: {} ({})", record.brand, asset.filename, asset.source)
        }
        None => println!("[{done}/{total}] {}: not found", record.brand),
    }
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("Run summary");
    println!("===========");
    println!("Attempted: {}", summary.attempted);
    println!("Found: {} (fetched {}, cached {})", summary.found, summary.fetched, summary.cached);
    println!("Failed: {}", summary.failed);
    if !summary.by_format.is_empty() {
        let formats: Vec<String> =
            summary.by_format.iter().map(|(f, n)| format!("{f} {n}")).collect();
        println!("By format: {}", formats.join(", "));
    }
    if !summary.by_source.is_empty() {
        let sources: Vec<String> =
            summary.by_source.iter().map(|(s, n)| format!("{s} {n}")).collect();
        println!("By source: {}", sources.join(", "));
    }
    for group in &summary.duplicate_content {
        println!("Identical logo content: {}", group.join(", "));
    }
    if !summary.failed_brands.is_empty() {
        println!("Failed brands:");
        for brand in &summary.failed_brands {
            println!("- {}", brand);
        }
    }
}
