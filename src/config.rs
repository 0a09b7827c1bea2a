//! Configuration file (.tapr.conf) parsing and handling
//!
//! The .tapr.conf file uses INI format with a [DEFAULT] section holding
//! reporter options.

use crate::banner::VersionBanner;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = ".tapr.conf";

/// Contents written by `tapr init`
pub const DEFAULT_CONFIG: &str = "[DEFAULT]
; Line printed by the test runner that should become a TAP comment
; banner=PHPUnit 9.6.0 by Sebastian Bergmann and contributors.
capture_output=true
";

/// Configuration loaded from .tapr.conf
#[derive(Debug, Clone, PartialEq)]
pub struct TaprConfig {
    /// Version banner of the host framework, demoted to a comment if printed
    pub banner: Option<String>,

    /// Attach output printed during a test as TAP comments
    pub capture_output: bool,
}

impl Default for TaprConfig {
    fn default() -> Self {
        TaprConfig {
            banner: None,
            capture_output: true,
        }
    }
}

impl TaprConfig {
    /// Load configuration from a .tapr.conf file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", CONFIG_FILE, e)))?;

        Self::parse(&contents)
    }

    /// Load `.tapr.conf` from `dir`, falling back to defaults if it is absent
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a string
    pub fn parse(contents: &str) -> Result<Self> {
        let ini: HashMap<String, HashMap<String, String>> = serde_ini::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", CONFIG_FILE, e)))?;

        let default = ini
            .get("DEFAULT")
            .ok_or_else(|| Error::Config(format!("No [DEFAULT] section in {}", CONFIG_FILE)))?;

        let capture_output = match default.get("capture_output") {
            Some(value) => parse_bool("capture_output", value)?,
            None => true,
        };

        Ok(TaprConfig {
            banner: default
                .get("banner")
                .filter(|banner| !banner.trim().is_empty())
                .cloned(),
            capture_output,
        })
    }

    /// Banner to hand to the reporter; the tool's own when none is configured
    pub fn version_banner(&self) -> VersionBanner {
        match self.banner {
            Some(ref banner) => VersionBanner::new(banner.as_str()),
            None => VersionBanner::default_for_tool(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(Error::Config(format!(
            "Invalid boolean for {}: {}",
            key, other
        ))),
    }
}
