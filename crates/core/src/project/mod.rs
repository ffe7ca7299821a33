//! Project layout, configuration, and the file artifacts around a run.
//!
//! - `ProjectLayout`: computed paths under a project root.
//! - `ProjectConfig`: serializable settings at `.logofetch/config.json`.
//! - `ProjectContext`: layout + config with every artifact path resolved.
//! - `Catalog`: the brand list to resolve.
//! - `LogoMap`: brand name -> public logo path, plus its TypeScript rendering.

pub mod catalog;
pub mod config;
pub mod context;
pub mod layout;
pub mod mapping;
pub mod util;

pub use catalog::{normalize_domain, Catalog, CatalogEntry, CatalogError};
pub use config::{ProjectConfig, ResolverSettings};
pub use context::ProjectContext;
pub use layout::ProjectLayout;
pub use mapping::{public_path, LogoMap, MapError};
pub use util::{load_project_config, save_project_config};
