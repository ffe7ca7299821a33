use std::fs;

use anyhow::{Context, Result};
use serde::Serialize;

use logo_core::model::ASSET_FORMATS;
use logo_core::project::{save_project_config, ProjectConfig, ProjectContext, ProjectLayout};

use crate::commands::{load_context, print_dir_status};
use crate::{canonicalize_or_current, infer_project_name};

#[derive(Serialize)]
pub struct ProjectInfoSnapshot {
    pub name: String,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub catalog: String,
    /// `None` when the catalog is missing or invalid.
    pub catalog_brands: Option<usize>,
    pub output_dir: String,
    pub assets_on_disk: usize,
    pub map_path: String,
    pub map_entries: usize,
    pub typescript_map: Option<String>,
    pub provider_order: Vec<String>,
}

/// Initialize a new project at `root`.
pub fn init_project_command(root: &str, name: Option<String>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    // Derive project name if not provided.
    let project_name = match name {
        Some(n) => n,
        None => infer_project_name(&root_path),
    };

    let config = ProjectConfig::new(&project_name);
    let ctx = ProjectContext::from_parts(layout, config);

    fs::create_dir_all(&ctx.output_dir).with_context(|| {
        format!("Failed to create output dir: {}", ctx.output_dir.display())
    })?;
    save_project_config(&ctx.layout, &ctx.config)?;

    println!("Initialized logo project:");
    println!("  Name: {}", project_name);
    println!("  Root: {}", ctx.layout.root.display());
    println!("  Config: {}", ctx.layout.project_config_path.display());
    println!("  Catalog: {}", ctx.catalog_path.display());
    println!("  Output dir: {}", ctx.output_dir.display());
    println!("  Logo map: {}", ctx.map_path.display());

    Ok(())
}

/// Show basic information about an existing project.
pub fn project_info_command(root: &str, json: bool) -> Result<()> {
    let ctx = load_context(root)?;
    let catalog_brands = match ctx.load_catalog() {
        Ok(catalog) => Some(catalog.len()),
        Err(e) => {
            tracing::debug!(error = %e, "catalog unavailable");
            None
        }
    };
    let map_entries = ctx.load_map()?.len();
    let assets_on_disk = count_assets(&ctx)?;
    let layout = &ctx.layout;

    if json {
        let snapshot = ProjectInfoSnapshot {
            name: ctx.config.name.clone(),
            root: layout.root.display().to_string(),
            config_file: layout.project_config_path.display().to_string(),
            config_version: ctx.config.config_version.clone(),
            catalog: layout.relative_string(&ctx.catalog_path),
            catalog_brands,
            output_dir: layout.relative_string(&ctx.output_dir),
            assets_on_disk,
            map_path: layout.relative_string(&ctx.map_path),
            map_entries,
            typescript_map: ctx.typescript_map_path.as_deref().map(|p| layout.relative_string(p)),
            provider_order: ctx.config.resolver.provider_order.clone(),
        };
        let serialized = serde_json::to_string_pretty(&snapshot)?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Logo Project Info");
    println!("=================");
    println!("Name: {}", ctx.config.name);
    println!("Root: {}", layout.root.display());
    println!("Config file: {}", layout.project_config_path.display());
    println!("Config version: {}", ctx.config.config_version);
    match catalog_brands {
        Some(n) => println!("Catalog: {} ({} brands)", ctx.catalog_path.display(), n),
        None => println!("Catalog: {} (missing or invalid)", ctx.catalog_path.display()),
    }
    println!("Assets on disk: {}", assets_on_disk);
    println!("Map entries: {}", map_entries);
    println!("Provider order: {}", ctx.config.resolver.provider_order.join(", "));
    println!();

    println!("Directories:");
    print_dir_status("Meta dir (.logofetch)", &layout.meta_dir);
    print_dir_status("Output dir", &ctx.output_dir);

    Ok(())
}

fn count_assets(ctx: &ProjectContext) -> Result<usize> {
    if !ctx.output_dir.is_dir() {
        return Ok(0);
    }
    let mut count = 0;
    for entry in fs::read_dir(&ctx.output_dir)
        .with_context(|| format!("Failed to read {}", ctx.output_dir.display()))?
    {
        let path = entry?.path();
        let is_asset = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ASSET_FORMATS.iter().any(|f| f.extension() == ext));
        if is_asset {
            count += 1;
        }
    }
    Ok(count)
}
