//! Version banner of the host test framework
//!
//! Runners typically print their version banner on the same output the TAP
//! stream goes to. A bare banner line would break TAP consumers, so the
//! reporter demotes it to a comment. The banner is computed once by the
//! process entry point and handed to every reporter it creates.

use std::fmt;

/// The banner line to demote, without its line terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionBanner(String);

impl VersionBanner {
    pub fn new(banner: impl Into<String>) -> Self {
        let banner = banner.into();
        VersionBanner(banner.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string())
    }

    /// Banner printed by this tool itself
    pub fn default_for_tool() -> Self {
        VersionBanner::new(concat!("tapr ", env!("CARGO_PKG_VERSION")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `line` is exactly the banner.
    ///
    /// A trailing line terminator on `line` is ignored. An empty banner
    /// never matches.
    pub fn matches(&self, line: &str) -> bool {
        !self.0.is_empty() && line.trim_end_matches(|c: char| c == '\r' || c == '\n') == self.0
    }
}

impl fmt::Display for VersionBanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_exact_line() {
        let banner = VersionBanner::new("PHPUnit 6.5.0 by Sebastian Bergmann and contributors.\n");
        assert_eq!(
            banner.as_str(),
            "PHPUnit 6.5.0 by Sebastian Bergmann and contributors."
        );
        assert!(banner.matches("PHPUnit 6.5.0 by Sebastian Bergmann and contributors."));
        assert!(banner.matches("PHPUnit 6.5.0 by Sebastian Bergmann and contributors.\n"));
        assert!(!banner.matches("PHPUnit 6.5.0"));
        assert!(!banner.matches(" PHPUnit 6.5.0 by Sebastian Bergmann and contributors."));
    }

    #[test]
    fn test_empty_banner_never_matches() {
        let banner = VersionBanner::new("");
        assert!(!banner.matches(""));
        assert!(!banner.matches("\n"));
    }

    #[test]
    fn test_default_banner_names_tool() {
        let banner = VersionBanner::default_for_tool();
        assert!(banner.as_str().starts_with("tapr "));
        assert!(banner.as_str().ends_with(env!("CARGO_PKG_VERSION")));
    }
}
