use std::path::{Path, PathBuf};

/// Expands a leading `~/` to the home directory
pub(crate) fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Paths from a config file are relative to the directory of that file
pub(crate) fn resolve_from(base_dir: &Path, path: &str) -> PathBuf {
    let path = expand_home(path);
    if path.is_relative() {
        base_dir.join(path)
    } else {
        path
    }
}
