//! Test lifecycle events
//!
//! The runner reports progress as a well-nested sequence of [`Event`]s:
//! suites open and close around tests, and every outcome event for a test
//! arrives between its `TestStart` and `TestEnd`.

use crate::error::Result;
use serde::Serialize;
use serde_yaml::Value;
use std::fmt;

/// Unique identifier for a test
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestId(String);

impl TestId {
    /// Creates a new test identifier from a string.
    ///
    /// # Arguments
    /// * `id` - The test identifier string
    pub fn new(id: impl Into<String>) -> Self {
        TestId(id.into())
    }

    /// Returns the test identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TestId {
    fn from(s: String) -> Self {
        TestId(s)
    }
}

impl From<&str> for TestId {
    fn from(s: &str) -> Self {
        TestId(s.to_string())
    }
}

/// A test as seen by the reporter.
///
/// `output` is the captured incidental output of the test body. It is
/// `None` for kinds of test that cannot capture output at all, which is
/// different from `Some("")` (capture supported, nothing printed).
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    /// Identity of the test.
    pub id: TestId,
    /// Human-readable description, if the runner has a better one than the id.
    pub description: Option<String>,
    /// Captured output, if this kind of test supports capture.
    pub output: Option<String>,
}

impl TestCase {
    /// Create a test with no description and no output capture
    pub fn new(id: impl Into<TestId>) -> Self {
        TestCase {
            id: id.into(),
            description: None,
            output: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach captured output
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Text used for the test on result lines
    pub fn describe(&self) -> &str {
        self.description.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Actual-versus-expected values of a failed comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub actual: Value,
    pub expected: Value,
}

impl Comparison {
    /// Build a comparison from any serializable values.
    pub fn new<A, E>(actual: &A, expected: &E) -> Result<Self>
    where
        A: Serialize + ?Sized,
        E: Serialize + ?Sized,
    {
        Ok(Comparison {
            actual: serde_yaml::to_value(actual)?,
            expected: serde_yaml::to_value(expected)?,
        })
    }
}

/// An assertion failure
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Rendered failure description, possibly spanning several lines.
    pub message: String,
    /// Present only when the assertion compared two values.
    pub comparison: Option<Comparison>,
}

impl Failure {
    /// Create a failure without a comparison
    pub fn new(message: impl Into<String>) -> Self {
        Failure {
            message: message.into(),
            comparison: None,
        }
    }

    /// Attach the compared values
    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = Some(comparison);
        self
    }
}

/// A lifecycle event emitted by the test runner.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A (possibly nested) suite started.
    SuiteStart(String),
    /// A suite ended.
    SuiteEnd(String),
    /// A test started.
    TestStart(TestCase),
    /// A test ended; carries the test's captured output.
    TestEnd(TestCase),
    /// An unexpected error occurred in the test.
    Error { test: TestCase, message: String },
    /// A non-fatal anomaly occurred in the test.
    Warning { test: TestCase, message: String },
    /// An assertion failed.
    Failure { test: TestCase, failure: Failure },
    /// The test is marked as not finished.
    Incomplete { test: TestCase, message: String },
    /// The test passed but is considered risky.
    Risky { test: TestCase, message: String },
    /// The test was skipped.
    Skipped { test: TestCase, message: String },
}
