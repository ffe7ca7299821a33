use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::model::ResolutionRecord;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("invalid logo map at {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("failed to serialize logo map: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Brand name -> public logo path, persisted as a sorted JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogoMap {
    entries: BTreeMap<String, String>,
}

impl LogoMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a map; a missing file is an empty map.
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(MapError::Read { path: path.to_path_buf(), source }),
        };
        serde_json::from_str(&text)
            .map_err(|source| MapError::Parse { path: path.to_path_buf(), source })
    }

    pub fn save(&self, path: &Path) -> Result<(), MapError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        write_atomic(path, json.as_bytes())
    }

    /// Insert or replace the entry for `name`.
    ///
    /// An existing key equal to `name` ignoring case is replaced (and renamed to
    /// `name`) rather than duplicated. Returns the previous value.
    pub fn upsert(&mut self, name: &str, public_path: impl Into<String>) -> Option<String> {
        let existing = if self.entries.contains_key(name) {
            Some(name.to_string())
        } else {
            let lowered = name.to_lowercase();
            self.entries.keys().find(|k| k.to_lowercase() == lowered).cloned()
        };
        let previous = existing.and_then(|key| self.entries.remove(&key));
        self.entries.insert(name.to_string(), public_path.into());
        previous
    }

    /// Upsert every found record. Returns how many entries changed.
    pub fn upsert_records(&mut self, records: &[ResolutionRecord], public_prefix: &str) -> usize {
        let mut changed = 0;
        for record in records {
            let Some(asset) = record.asset() else {
                continue;
            };
            let value = public_path(public_prefix, &asset.filename);
            if self.upsert(&record.brand, value.clone()).as_deref() != Some(value.as_str()) {
                changed += 1;
            }
        }
        changed
    }

    /// Exact name first, then trimmed and lowercased.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.entries.get(name) {
            return Some(value);
        }
        let normalized = name.trim().to_lowercase();
        self.entries.iter().find(|(k, _)| k.to_lowercase() == normalized).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render the map as a TypeScript module with a case-insensitive lookup helper.
    pub fn render_typescript(&self, public_prefix: &str) -> Result<String, MapError> {
        let literal = serde_json::to_string_pretty(&self.entries)?;
        let placeholder = serde_json::to_string(&public_path(public_prefix, "placeholder.svg"))?;

        let mut out = String::new();
        out.push_str("// Generated by logofetch. Do not edit by hand.\n\n");
        out.push_str(&format!(
            "export const BRAND_LOGO_MAP: Record<string, string> = {literal};\n\n"
        ));
        out.push_str(
            "const NORMALIZED_BRAND_LOGO_MAP: Record<string, string> = Object.fromEntries(\n",
        );
        out.push_str(
            "  Object.entries(BRAND_LOGO_MAP).map(([key, value]) => [key.toLowerCase(), value])\n",
        );
        out.push_str(");\n\n");
        out.push_str(&format!("export const PLACEHOLDER_LOGO = {placeholder};\n\n"));
        out.push_str("export const getBrandLogo = (brandName: string): string => {\n");
        out.push_str("  if (!brandName) {\n    return PLACEHOLDER_LOGO;\n  }\n");
        out.push_str("  const normalizedName = brandName.trim().toLowerCase();\n");
        out.push_str("  return (\n");
        out.push_str("    BRAND_LOGO_MAP[brandName] ||\n");
        out.push_str("    NORMALIZED_BRAND_LOGO_MAP[normalizedName] ||\n");
        out.push_str("    PLACEHOLDER_LOGO\n");
        out.push_str("  );\n};\n");
        Ok(out)
    }

    pub fn save_typescript(&self, path: &Path, public_prefix: &str) -> Result<(), MapError> {
        let module = self.render_typescript(public_prefix)?;
        write_atomic(path, module.as_bytes())
    }
}

/// Public path of an asset: `/<prefix>/<filename>`.
pub fn public_path(prefix: &str, filename: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("/{filename}")
    } else {
        format!("/{prefix}/{filename}")
    }
}

/// Write through a temp file in the target directory, then rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), MapError> {
    let write_err = |source| MapError::Write { path: path.to_path_buf(), source };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
