//! Utility functions for command implementation

use crate::config::TaprConfig;
use crate::error::Result;
use std::path::Path;

/// Directory holding `.tapr.conf` (or current directory if None)
pub fn base_dir(base_path: Option<&str>) -> &Path {
    base_path.map(Path::new).unwrap_or_else(|| Path::new("."))
}

/// Load the configuration for the given directory, defaults if it has none
pub fn load_config(base_path: Option<&str>) -> Result<TaprConfig> {
    TaprConfig::load_from_dir(base_dir(base_path))
}
