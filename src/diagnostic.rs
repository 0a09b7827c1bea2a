//! YAML diagnostic blocks attached to `not ok` lines

use crate::error::Result;
use crate::event::{Comparison, Failure};
use serde::Serialize;
use serde_yaml::Value;

/// Opening marker of a diagnostic block
pub const BLOCK_START: &str = "  ---";
/// Closing marker of a diagnostic block
pub const BLOCK_END: &str = "  ...";

const INDENT: &str = "  ";

#[derive(Debug, Serialize)]
struct Diagnostic<'a> {
    message: &'a str,
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<ComparisonData<'a>>,
}

#[derive(Debug, Serialize)]
struct ComparisonData<'a> {
    got: &'a Value,
    expected: &'a Value,
}

impl<'a> From<&'a Comparison> for ComparisonData<'a> {
    fn from(cmp: &'a Comparison) -> Self {
        ComparisonData {
            got: &cmp.actual,
            expected: &cmp.expected,
        }
    }
}

/// First line of a possibly multi-line message
pub fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

/// Render the diagnostic block for a failure, one entry per output line.
///
/// The first and last entries are the block markers; everything between is
/// the YAML document indented by two spaces.
pub fn render_block(failure: &Failure) -> Result<Vec<String>> {
    let diagnostic = Diagnostic {
        message: first_line(&failure.message),
        severity: "fail",
        data: failure.comparison.as_ref().map(ComparisonData::from),
    };

    let yaml = serde_yaml::to_string(&diagnostic)?;

    let mut lines = Vec::new();
    lines.push(BLOCK_START.to_string());
    lines.extend(yaml.lines().map(|line| format!("{}{}", INDENT, line)));
    lines.push(BLOCK_END.to_string());
    Ok(lines)
}
