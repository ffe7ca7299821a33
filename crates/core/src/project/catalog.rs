//! Brand catalog loading.
//!
//! Two shapes are accepted, in JSON or YAML:
//!
//! ```json
//! { "brands": [ { "name": "Öhlins", "domain": "ohlins.com" } ] }
//! { "categories": { "suspension": [ "Öhlins", { "name": "Fox", "domain": "ridefox.com" } ] } }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::BrandIdentity;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("catalog entry #{index} has an empty name")]
    EmptyName { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Curated logo URL, consulted by the `direct` provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), domain: None, logo_url: None, category: None }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Flat { brands: Vec<CatalogEntry> },
    Grouped { categories: BTreeMap<String, Vec<GroupedItem>> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GroupedItem {
    Name(String),
    Entry(CatalogEntry),
}

impl CatalogFile {
    fn into_entries(self) -> Vec<CatalogEntry> {
        match self {
            CatalogFile::Flat { brands } => brands,
            CatalogFile::Grouped { categories } => categories
                .into_iter()
                .flat_map(|(category, items)| {
                    items.into_iter().map(move |item| {
                        let mut entry = match item {
                            GroupedItem::Name(name) => CatalogEntry::new(name),
                            GroupedItem::Entry(entry) => entry,
                        };
                        entry.category.get_or_insert_with(|| category.clone());
                        entry
                    })
                })
                .collect(),
        }
    }
}

/// Normalised list of brands to resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load a catalog file; `.yaml`/`.yml` are parsed as YAML, everything else as JSON.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
            Some("yaml" | "yml")
        );
        if is_yaml {
            Self::from_yaml_str(&text)
        } else {
            Self::from_json_str(&text)
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(text)?;
        Self::from_entries(file.into_entries())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(text)?;
        Self::from_entries(file.into_entries())
    }

    /// Trim names, normalise domains and drop repeated names (first wins).
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(entries.len());

        for (index, mut entry) in entries.into_iter().enumerate() {
            entry.name = entry.name.trim().to_string();
            if entry.name.is_empty() {
                return Err(CatalogError::EmptyName { index });
            }
            if !seen.insert(entry.name.clone()) {
                tracing::warn!(brand = %entry.name, "duplicate catalog entry ignored");
                continue;
            }
            entry.domain = entry.domain.as_deref().and_then(normalize_domain);
            entry.logo_url =
                entry.logo_url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
            out.push(entry);
        }

        Ok(Self { entries: out })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn brands(&self) -> Vec<BrandIdentity> {
        self.entries.iter().map(to_identity).collect()
    }

    /// Brands whose name contains `needle`, ignoring case.
    pub fn filter(&self, needle: &str) -> Vec<BrandIdentity> {
        let needle = needle.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .map(to_identity)
            .collect()
    }

    /// Brand name -> curated logo URL.
    pub fn direct_urls(&self) -> HashMap<String, String> {
        self.entries
            .iter()
            .filter_map(|e| e.logo_url.as_ref().map(|u| (e.name.clone(), u.clone())))
            .collect()
    }
}

fn to_identity(entry: &CatalogEntry) -> BrandIdentity {
    BrandIdentity { name: entry.name.clone(), domain: entry.domain.clone() }
}

/// Reduce a domain or URL to a bare lowercase host without `www.`.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let host = without_scheme.split(['/', '?', '#']).next().unwrap_or_default();
    let host = host.rsplit_once('@').map_or(host, |(_, h)| h);
    let host = host.split(':').next().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host).trim_matches('.');

    if host.is_empty() || !host.contains('.') {
        return None;
    }
    Some(host.to_string())
}
