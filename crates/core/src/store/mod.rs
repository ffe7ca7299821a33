//! On-disk logo assets: `<dir>/<slug>.<ext>`.
//!
//! The presence of a large-enough file is the only cache signal. Writes go through
//! a temp file in the same directory and a rename, so readers never observe a
//! partially written asset.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::model::{AssetSource, FoundAsset, LogoFormat, ASSET_FORMATS};

/// Default minimum size for an existing file to count as a logo.
pub const DEFAULT_MIN_BYTES: u64 = 500;

#[derive(Debug, Clone)]
pub struct AssetStore {
    dir: PathBuf,
    min_bytes: u64,
}

impl AssetStore {
    pub fn new(dir: impl Into<PathBuf>, min_bytes: u64) -> Self {
        Self { dir: dir.into(), min_bytes }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn min_bytes(&self) -> u64 {
        self.min_bytes
    }

    /// Create the output directory if it does not exist.
    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    pub fn path_for(&self, slug: &str, format: LogoFormat) -> PathBuf {
        self.dir.join(asset_filename(slug, format))
    }

    /// Find an existing asset for `slug` of at least `min_bytes`, in `ASSET_FORMATS` order.
    ///
    /// Undersized files are ignored, as if they were absent.
    pub fn find_existing(&self, slug: &str) -> io::Result<Option<FoundAsset>> {
        for format in ASSET_FORMATS {
            let path = self.path_for(slug, format);
            let metadata = match fs::metadata(&path) {
                Ok(m) => m,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };
            if !metadata.is_file() || metadata.len() < self.min_bytes {
                continue;
            }
            return Ok(Some(FoundAsset {
                filename: asset_filename(slug, format),
                format,
                source: AssetSource::Cache,
                size: metadata.len(),
                sha256: sha256_file(&path)?,
            }));
        }
        Ok(None)
    }

    /// Whether a qualifying asset exists for `slug`.
    pub fn has_asset(&self, slug: &str) -> bool {
        matches!(self.find_existing(slug), Ok(Some(_)))
    }

    /// Atomically write `bytes` as `<slug>.<format>`, replacing any previous file.
    ///
    /// Files for the same slug under other extensions are removed afterwards so the
    /// cache lookup cannot resurrect a superseded asset.
    pub fn write(
        &self,
        slug: &str,
        format: LogoFormat,
        bytes: &[u8],
        source: AssetSource,
    ) -> io::Result<FoundAsset> {
        if !format.is_asset_format() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{format} is not a persistable asset format"),
            ));
        }
        self.ensure_dir()?;

        let target = self.path_for(slug, format);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| e.error)?;

        for other in ASSET_FORMATS.into_iter().filter(|f| *f != format) {
            let stale = self.path_for(slug, other);
            match fs::remove_file(&stale) {
                Ok(()) => tracing::debug!(path = %stale.display(), "removed superseded asset"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                // The new asset is already persisted; a failed cleanup does not fail the write.
                Err(e) => tracing::warn!(
                    path = %stale.display(),
                    error = %e,
                    "failed to remove superseded asset"
                ),
            }
        }

        Ok(FoundAsset {
            filename: asset_filename(slug, format),
            format,
            source,
            size: bytes.len() as u64,
            sha256: sha256_bytes(bytes),
        })
    }
}

pub fn asset_filename(slug: &str, format: LogoFormat) -> String {
    format!("{slug}.{}", format.extension())
}

/// Hex SHA-256 of a byte slice.
pub fn sha256_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Hex SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
