//! TAP version 13 reporter
//!
//! [`TapReporter`] turns a well-nested stream of suite and test lifecycle
//! events into a numbered TAP transcript. Result lines for failing, skipped
//! and risky tests are written as soon as the outcome is known; the plain
//! `ok` line for a passing test is written when the test ends. The plan
//! line is written once, when the outermost suite closes.

use crate::banner::VersionBanner;
use crate::diagnostic;
use crate::error::Result;
use crate::event::{Event, Failure, TestCase};
use crate::sink::Sink;
use std::borrow::Cow;
use tracing::{debug, warn};

/// TAP protocol version header
pub const TAP_HEADER: &str = "TAP version 13";

/// Whether the current test has, so far, only succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing has been reported against the test yet.
    Successful,
    /// A result line has already been written for the test.
    Failed,
}

/// Stateful translator from lifecycle events to TAP lines
pub struct TapReporter<'s> {
    sink: &'s mut dyn Sink,
    banner: VersionBanner,
    test_number: usize,
    suite_depth: usize,
    outcome: Outcome,
    in_test: bool,
}

impl<'s> TapReporter<'s> {
    /// Create a reporter and write the TAP header to `sink`.
    pub fn new(sink: &'s mut dyn Sink, banner: VersionBanner) -> Result<Self> {
        let mut reporter = TapReporter {
            sink,
            banner,
            test_number: 0,
            suite_depth: 0,
            outcome: Outcome::Successful,
            in_test: false,
        };
        reporter.write_line(TAP_HEADER)?;
        Ok(reporter)
    }

    /// Number of the current (or most recent) test; 0 before any test started
    pub fn test_number(&self) -> usize {
        self.test_number
    }

    /// Number of currently open suites
    pub fn suite_depth(&self) -> usize {
        self.suite_depth
    }

    /// Outcome of the current test so far
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Apply a single lifecycle event.
    pub fn handle(&mut self, event: Event) -> Result<()> {
        match event {
            Event::SuiteStart(name) => self.start_suite(&name),
            Event::SuiteEnd(name) => self.end_suite(&name),
            Event::TestStart(test) => self.start_test(&test),
            Event::TestEnd(test) => self.end_test(&test),
            Event::Error { test, message } => self.add_error(&test, &message),
            Event::Warning { test, message } => self.add_warning(&test, &message),
            Event::Failure { test, failure } => self.add_failure(&test, &failure),
            Event::Incomplete { test, message } => self.add_incomplete(&test, &message),
            Event::Risky { test, message } => self.add_risky(&test, &message),
            Event::Skipped { test, message } => self.add_skipped(&test, &message),
        }
    }

    pub fn start_suite(&mut self, name: &str) -> Result<()> {
        self.suite_depth += 1;
        debug!(suite = name, depth = self.suite_depth, "suite started");
        Ok(())
    }

    /// Close a suite; closing the outermost one writes the plan line.
    pub fn end_suite(&mut self, name: &str) -> Result<()> {
        debug_assert!(self.suite_depth > 0, "suite end without matching start");
        if self.suite_depth == 0 {
            warn!(suite = name, "ignoring suite end without matching start");
            return Ok(());
        }

        self.suite_depth -= 1;
        debug!(suite = name, depth = self.suite_depth, "suite ended");

        if self.suite_depth == 0 {
            let plan = format!("1..{}", self.test_number);
            self.write_line(&plan)?;
            self.sink.flush()?;
        }
        Ok(())
    }

    pub fn start_test(&mut self, test: &TestCase) -> Result<()> {
        self.test_number += 1;
        self.outcome = Outcome::Successful;
        self.in_test = true;
        debug!(test = %test.id, number = self.test_number, "test started");
        Ok(())
    }

    /// Finish a test: write its `ok` line unless a result line was already
    /// written, then its captured output as comments.
    pub fn end_test(&mut self, test: &TestCase) -> Result<()> {
        debug_assert!(self.in_test, "test end without matching start");
        if !self.in_test {
            warn!(test = %test.id, "test end without matching start");
        }
        self.in_test = false;

        if self.outcome == Outcome::Successful {
            let line = format!("ok {} - {}", self.test_number, single_line(test.describe()));
            self.write_line(&line)?;
        }

        self.write_captured_output(test)
    }

    pub fn add_error(&mut self, test: &TestCase, message: &str) -> Result<()> {
        debug!(test = %test.id, reason = message, "error");
        self.write_not_ok(test, "Error", "")
    }

    pub fn add_warning(&mut self, test: &TestCase, message: &str) -> Result<()> {
        debug!(test = %test.id, reason = message, "warning");
        self.write_not_ok(test, "Warning", "")
    }

    /// Write a `not ok` line followed by a YAML diagnostic block.
    pub fn add_failure(&mut self, test: &TestCase, failure: &Failure) -> Result<()> {
        self.write_not_ok(test, "", "")?;
        for line in diagnostic::render_block(failure)? {
            self.write_line(&line)?;
        }
        Ok(())
    }

    pub fn add_incomplete(&mut self, test: &TestCase, message: &str) -> Result<()> {
        debug!(test = %test.id, reason = message, "incomplete");
        self.write_not_ok(test, "", "TODO Incomplete Test")
    }

    pub fn add_risky(&mut self, test: &TestCase, message: &str) -> Result<()> {
        self.write_ok_with_directive(test, "RISKY", message)
    }

    pub fn add_skipped(&mut self, test: &TestCase, message: &str) -> Result<()> {
        self.write_ok_with_directive(test, "SKIP", message)
    }

    /// The single path every line takes to the sink.
    ///
    /// A line identical to the host framework's version banner is written
    /// as a comment.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
        if self.banner.matches(line) {
            self.sink.write(&format!("# {}\n", line))
        } else {
            self.sink.write(&format!("{}\n", line))
        }
    }

    fn write_not_ok(&mut self, test: &TestCase, prefix: &str, directive: &str) -> Result<()> {
        self.check_in_test(test);

        let mut line = format!("not ok {} - ", self.test_number);
        if !prefix.is_empty() {
            line.push_str(prefix);
            line.push_str(": ");
        }
        line.push_str(&single_line(test.describe()));
        if !directive.is_empty() {
            line.push_str(" # ");
            line.push_str(directive);
        }

        self.outcome = Outcome::Failed;
        self.write_line(&line)
    }

    fn write_ok_with_directive(
        &mut self,
        test: &TestCase,
        directive: &str,
        message: &str,
    ) -> Result<()> {
        self.check_in_test(test);

        let mut line = format!(
            "ok {} - {} # {}",
            self.test_number,
            single_line(test.describe()),
            directive
        );
        let message = single_line(message.trim());
        if !message.is_empty() {
            line.push(' ');
            line.push_str(&message);
        }

        self.outcome = Outcome::Failed;
        self.write_line(&line)
    }

    fn write_captured_output(&mut self, test: &TestCase) -> Result<()> {
        let output = match test.output.as_deref().map(str::trim) {
            Some(output) if !output.is_empty() => output,
            _ => return Ok(()),
        };

        for line in output.lines() {
            self.write_line(&format!("# {}", line))?;
        }
        Ok(())
    }

    fn check_in_test(&self, test: &TestCase) {
        debug_assert!(self.in_test, "outcome reported outside of a test");
        if !self.in_test {
            warn!(test = %test.id, "outcome reported outside of a test");
        }
    }
}

/// Fold line breaks into spaces so one result stays on one TAP line
fn single_line(text: &str) -> Cow<'_, str> {
    if text.contains(|c: char| c == '\r' || c == '\n') {
        Cow::Owned(
            text.replace("\r\n", " ")
                .replace(|c: char| c == '\r' || c == '\n', " "),
        )
    } else {
        Cow::Borrowed(text)
    }
}
