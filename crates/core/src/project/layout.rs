use std::path::{Path, PathBuf};

/// Logical layout of a logo project on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself.
/// Paths stored in the project config are resolved against `root`.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Root directory of the project.
    pub root: PathBuf,
    /// Directory for internal metadata (.logofetch).
    pub meta_dir: PathBuf,
    /// Path to the project config file (JSON).
    pub project_config_path: PathBuf,
}

impl ProjectLayout {
    /// Compute the layout for a project rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".logofetch");
        let project_config_path = meta_dir.join("config.json");
        Self { root, meta_dir, project_config_path }
    }

    /// Resolve a config path: absolute paths are kept, relative ones join `root`.
    pub fn resolve(&self, configured: &str) -> PathBuf {
        let path = Path::new(configured);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Render `path` relative to `root` when possible, for display and config values.
    pub fn relative_string(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => path.to_string_lossy().to_string(),
        }
    }
}
