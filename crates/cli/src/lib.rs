use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub mod commands;

/// Canonicalize the root path if possible, falling back to the given string
/// relative to the current working directory.
pub fn canonicalize_or_current(root: &str) -> Result<PathBuf> {
    let path = Path::new(root);
    if path == Path::new(".") {
        Ok(env::current_dir().context("Failed to get current directory")?)
    } else {
        // Paths that do not exist yet (e.g. for init) are joined onto the cwd.
        match path.canonicalize() {
            Ok(p) => Ok(p),
            Err(_) => {
                let cwd = env::current_dir().context("Failed to get current directory")?;
                Ok(cwd.join(path))
            }
        }
    }
}

/// Infer a project name from the root path.
///
/// If the root has no final component (e.g., `/`), fallback to `unnamed-project`.
pub fn infer_project_name(root: &Path) -> String {
    root.file_name().and_then(|os_str| os_str.to_str()).unwrap_or("unnamed-project").to_string()
}

/// Default log filter for a `-v` count.
pub fn default_log_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
