use anyhow::{Context, Result};

use crate::project::{ProjectConfig, ProjectLayout};

/// Load the project config JSON from disk for a given layout.
pub fn load_project_config(layout: &ProjectLayout) -> Result<ProjectConfig> {
    let config_json = std::fs::read_to_string(&layout.project_config_path).with_context(|| {
        format!("Failed to read project config at {}", layout.project_config_path.display())
    })?;
    let config: ProjectConfig =
        serde_json::from_str(&config_json).context("Failed to parse project config JSON")?;
    Ok(config)
}

/// Write the project config as pretty JSON, creating the metadata dir if needed.
pub fn save_project_config(layout: &ProjectLayout, config: &ProjectConfig) -> Result<()> {
    std::fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create {}", layout.meta_dir.display()))?;
    let json = serde_json::to_string_pretty(config).context("Failed to serialize project config")?;
    std::fs::write(&layout.project_config_path, json).with_context(|| {
        format!("Failed to write project config at {}", layout.project_config_path.display())
    })?;
    Ok(())
}
