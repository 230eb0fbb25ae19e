//! Data directory layout.

use std::path::{Path, PathBuf};

/// Resolve the data directory.
///
/// `ORDERLINE_DATA_DIR` wins; otherwise `~/.orderline`; otherwise
/// `./.orderline`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ORDERLINE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".orderline");
    }

    PathBuf::from(".orderline")
}

/// `{data_dir}/config.toml`
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

/// `{data_dir}/session/` -- one record per client identifier.
pub fn session_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("session")
}
