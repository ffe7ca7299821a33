use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use logo_core::project::{
    load_project_config, Catalog, LogoMap, ProjectConfig, ProjectContext, ProjectLayout,
};
use logo_core::services::batch::{RunReport, RunSummary};
use logo_core::services::providers::{default_provider_registry, HttpFetcher, ProviderSecrets};
use logo_core::services::{ProviderRegistry, Resolver};

use crate::canonicalize_or_current;

/// Load the project context for a CLI `--root` argument.
pub fn load_context(root: &str) -> Result<ProjectContext> {
    let root_path = canonicalize_or_current(root)?;
    ProjectContext::from_root(&root_path)
}

/// Like `load_context`, but falls back to default settings when no project exists.
///
/// Used by read-only commands that are still meaningful outside a project.
pub fn load_context_or_default(root: &str) -> Result<ProjectContext> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);
    let config = match load_project_config(&layout) {
        Ok(config) => config,
        Err(e) => {
            tracing::debug!(error = %e, "no project config, using defaults");
            ProjectConfig::default()
        }
    };
    Ok(ProjectContext::from_parts(layout, config))
}

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}

/// Provider registry for a project, with catalog URLs and environment secrets.
pub fn provider_registry(ctx: &ProjectContext, catalog: &Catalog) -> Result<ProviderRegistry> {
    let settings = &ctx.config.resolver;
    let http = HttpFetcher::new(
        &settings.user_agent,
        Duration::from_secs(settings.provider_timeout_secs.max(1)),
    )
    .context("Failed to build HTTP client")?;
    Ok(default_provider_registry(
        &http,
        catalog.direct_urls(),
        &ctx.config.providers,
        &ProviderSecrets::from_env(),
    ))
}

/// Provider order from the CLI override, else the config.
pub fn provider_order(ctx: &ProjectContext, order_override: Option<&[String]>) -> Vec<String> {
    match order_override {
        Some(names) => names
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect(),
        None => ctx.config.resolver.provider_order.clone(),
    }
}

/// Build a resolver for the project output directory.
pub fn build_resolver(
    ctx: &ProjectContext,
    catalog: &Catalog,
    force: bool,
    order_override: Option<&[String]>,
) -> Result<Resolver> {
    let registry = provider_registry(ctx, catalog)?;
    let providers = registry.ordered(&provider_order(ctx, order_override))?;
    Ok(Resolver::new(providers, &ctx.output_dir, ctx.config.resolver.resolve_options(force))
        .with_rules(ctx.config.validation.clone())
        .with_slug_rules(ctx.slug_rules()))
}

/// Save the map, and the TypeScript module when one is configured.
pub fn save_map(ctx: &ProjectContext, map: &LogoMap) -> Result<()> {
    map.save(&ctx.map_path)
        .with_context(|| format!("Failed to write logo map at {}", ctx.map_path.display()))?;
    if let Some(ts_path) = &ctx.typescript_map_path {
        map.save_typescript(ts_path, &ctx.config.public_prefix).with_context(|| {
            format!("Failed to write TypeScript logo map at {}", ts_path.display())
        })?;
    }
    Ok(())
}

#[derive(Serialize)]
struct StoredReport<'a> {
    #[serde(flatten)]
    report: &'a RunReport,
    summary: RunSummary,
}

/// Persist every artifact of a fetch run: map, failed list, and JSON report.
pub fn persist_run(ctx: &ProjectContext, report: &RunReport) -> Result<()> {
    let mut map = ctx.load_map()?;
    let changed = map.upsert_records(&report.records, &ctx.config.public_prefix);
    tracing::debug!(changed, "logo map updated");
    save_map(ctx, &map)?;

    let mut failed = report.failed_brands().join("\n");
    if !failed.is_empty() {
        failed.push('\n');
    }
    write_file(&ctx.failed_list_path, failed.as_bytes())?;

    let stored = StoredReport { report, summary: report.summary() };
    let json = serde_json::to_string_pretty(&stored).context("Failed to serialize run report")?;
    write_file(&ctx.report_path, json.as_bytes())?;
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}
