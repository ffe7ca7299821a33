use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::project::{load_project_config, Catalog, LogoMap, ProjectConfig, ProjectLayout};
use crate::slug::SlugRules;
use crate::store::AssetStore;

/// Convenience wrapper bundling layout, config, and the resolved artifact paths.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub layout: ProjectLayout,
    pub config: ProjectConfig,
    pub catalog_path: PathBuf,
    pub output_dir: PathBuf,
    pub map_path: PathBuf,
    pub typescript_map_path: Option<PathBuf>,
    pub failed_list_path: PathBuf,
    pub report_path: PathBuf,
}

impl ProjectContext {
    /// Load project config for a given root and resolve its paths.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let layout = ProjectLayout::new(root);
        let config = load_project_config(&layout)?;
        Ok(Self::from_parts(layout, config))
    }

    pub fn from_parts(layout: ProjectLayout, config: ProjectConfig) -> Self {
        Self {
            catalog_path: layout.resolve(&config.catalog),
            output_dir: layout.resolve(&config.output_dir),
            map_path: layout.resolve(&config.map_path),
            typescript_map_path: config.typescript_map.as_deref().map(|p| layout.resolve(p)),
            failed_list_path: layout.resolve(&config.failed_list),
            report_path: layout.resolve(&config.report_path),
            layout,
            config,
        }
    }

    pub fn asset_store(&self) -> AssetStore {
        AssetStore::new(&self.output_dir, self.config.resolver.min_bytes)
    }

    pub fn slug_rules(&self) -> SlugRules {
        SlugRules::from_settings(&self.config.slugs)
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        Catalog::load(&self.catalog_path).with_context(|| {
            format!("Failed to load brand catalog at {}", self.catalog_path.display())
        })
    }

    pub fn load_map(&self) -> Result<LogoMap> {
        LogoMap::load(&self.map_path)
            .with_context(|| format!("Failed to load logo map at {}", self.map_path.display()))
    }
}
