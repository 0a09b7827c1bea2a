//! Subunit stream replay
//!
//! This module drives a [`TapReporter`] from a subunit v2 stream, the wire
//! format testrepository-style runners emit. Subunit runners may interleave
//! tests from several workers, while the reporter needs strictly sequential
//! lifecycle events. Events are therefore buffered per test and each test is
//! replayed as one start/outcome/end sequence when its final status arrives.

use crate::error::Result;
use crate::event::{Failure, TestCase};
use crate::reporter::TapReporter;
use std::collections::HashMap;
use std::io::Read;
use subunit::io::sync::iter_stream;
use subunit::types::stream::ScannedItem;
use subunit::types::teststatus::TestStatus as SubunitTestStatus;
use tracing::{debug, warn};

/// Maximum number of consecutive parse errors before giving up on the stream
const MAX_CONSECUTIVE_ERRORS: usize = 100;

/// Name of the suite wrapped around a replayed stream
pub const SUITE_NAME: &str = "subunit";

/// Message for a failure that carried no traceback
pub const DEFAULT_FAILURE_MESSAGE: &str = "Test failed";

/// Options controlling how a stream is replayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Attach output printed during a test to that test as TAP comments.
    /// When disabled, such output goes straight to the TAP stream.
    pub capture_output: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        ReplayOptions {
            capture_output: true,
        }
    }
}

/// Counts gathered while replaying a stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Tests reported.
    pub tests: usize,
    /// Tests reported as failures or errors.
    pub failures: usize,
    /// Unparseable items skipped.
    pub skipped_items: usize,
}

impl ReplaySummary {
    /// Process exit code for this run
    pub fn exit_code(&self) -> i32 {
        if self.failures > 0 {
            1
        } else {
            0
        }
    }
}

/// Final status of a test in subunit terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FinalStatus {
    Success,
    Failed,
    Skipped,
    ExpectedFailure,
    UnexpectedSuccess,
}

/// Convert a SubunitTestStatus to a final status (None for non-terminal states)
fn convert_subunit_status(status: SubunitTestStatus) -> Option<FinalStatus> {
    match status {
        SubunitTestStatus::Success => Some(FinalStatus::Success),
        SubunitTestStatus::Failed => Some(FinalStatus::Failed),
        SubunitTestStatus::Skipped => Some(FinalStatus::Skipped),
        SubunitTestStatus::ExpectedFailure => Some(FinalStatus::ExpectedFailure),
        SubunitTestStatus::UnexpectedSuccess => Some(FinalStatus::UnexpectedSuccess),
        SubunitTestStatus::Undefined
        | SubunitTestStatus::Enumeration
        | SubunitTestStatus::InProgress => None,
    }
}

/// Line of a traceback that names the failure.
///
/// Tracebacks open with boilerplate and end with the exception, so the last
/// non-blank line is the informative one.
fn failure_summary(traceback: &str) -> Option<&str> {
    traceback
        .lines()
        .map(str::trim)
        .rev()
        .find(|line| !line.is_empty())
}

/// Everything seen for a test that has not finished yet
#[derive(Debug, Default)]
struct PendingTest {
    output: String,
    traceback: Option<String>,
    reason: Option<String>,
}

impl PendingTest {
    fn attach(&mut self, name: &str, content: &[u8]) {
        let content = String::from_utf8_lossy(content);
        match name {
            "traceback" => self.traceback = Some(content.into_owned()),
            "reason" => self.reason = Some(content.into_owned()),
            _ => self.output.push_str(&content),
        }
    }
}

/// Per-stream replay state
struct Replay<'r, 's> {
    reporter: &'r mut TapReporter<'s>,
    options: ReplayOptions,
    pending: HashMap<String, PendingTest>,
    // Test ids in the order they were first seen, most recent last
    order: Vec<String>,
    // Partial line of non-subunit output awaiting its terminator
    passthrough: String,
    summary: ReplaySummary,
}

impl<'r, 's> Replay<'r, 's> {
    fn new(reporter: &'r mut TapReporter<'s>, options: ReplayOptions) -> Self {
        Replay {
            reporter,
            options,
            pending: HashMap::new(),
            order: Vec::new(),
            passthrough: String::new(),
            summary: ReplaySummary::default(),
        }
    }

    fn pending_mut(&mut self, test_id: &str) -> &mut PendingTest {
        if !self.pending.contains_key(test_id) {
            self.order.push(test_id.to_string());
        }
        self.pending.entry(test_id.to_string()).or_default()
    }

    fn take_pending(&mut self, test_id: &str) -> PendingTest {
        self.order.retain(|id| id != test_id);
        self.pending.remove(test_id).unwrap_or_default()
    }

    /// Non-subunit bytes interleaved with the stream
    fn bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let text = String::from_utf8_lossy(bytes);

        if self.options.capture_output {
            if let Some(current) = self.order.last().cloned() {
                self.pending_mut(&current).output.push_str(&text);
                return Ok(());
            }
        }

        self.passthrough.push_str(&text);
        while let Some(pos) = self.passthrough.find('\n') {
            let line: String = self.passthrough.drain(..=pos).collect();
            self.reporter.write_line(&line)?;
        }
        Ok(())
    }

    fn flush_passthrough(&mut self) -> Result<()> {
        if !self.passthrough.is_empty() {
            let line = std::mem::take(&mut self.passthrough);
            self.reporter.write_line(&line)?;
        }
        Ok(())
    }

    /// Replay one finished test as a complete lifecycle sequence
    fn finish(&mut self, test_id: &str, status: FinalStatus) -> Result<()> {
        let mut pending = self.take_pending(test_id);
        let mut test = TestCase::new(test_id);

        self.pass_through_output(&mut pending)?;
        self.reporter.start_test(&test)?;
        match status {
            FinalStatus::Success => {}
            FinalStatus::Failed => {
                let message = pending
                    .traceback
                    .as_deref()
                    .and_then(failure_summary)
                    .unwrap_or(DEFAULT_FAILURE_MESSAGE);
                self.reporter.add_failure(&test, &Failure::new(message))?;
                self.summary.failures += 1;
            }
            FinalStatus::Skipped => {
                let reason = pending.reason.as_deref().unwrap_or("");
                self.reporter.add_skipped(&test, reason.trim())?;
            }
            FinalStatus::ExpectedFailure => {
                let reason = pending.traceback.as_deref().unwrap_or("");
                self.reporter.add_incomplete(&test, reason)?;
            }
            FinalStatus::UnexpectedSuccess => {
                self.reporter.add_error(&test, "Unexpected success")?;
                self.summary.failures += 1;
            }
        }

        if self.options.capture_output {
            test.output = Some(pending.output);
        }
        self.reporter.end_test(&test)?;
        self.summary.tests += 1;
        Ok(())
    }

    /// Without capture, a test's attached output goes straight to the stream
    fn pass_through_output(&mut self, pending: &mut PendingTest) -> Result<()> {
        if self.options.capture_output || pending.output.is_empty() {
            return Ok(());
        }
        for line in std::mem::take(&mut pending.output).lines() {
            self.reporter.write_line(line)?;
        }
        Ok(())
    }

    /// Report tests the stream never finished
    fn abandon_unfinished(&mut self) -> Result<()> {
        for test_id in std::mem::take(&mut self.order) {
            let mut pending = self.pending.remove(&test_id).unwrap_or_default();
            warn!(test = %test_id, "test did not complete before end of stream");

            let mut test = TestCase::new(test_id.as_str());
            self.pass_through_output(&mut pending)?;
            self.reporter.start_test(&test)?;
            self.reporter.add_error(&test, "Test did not complete")?;
            if self.options.capture_output {
                test.output = Some(pending.output);
            }
            self.reporter.end_test(&test)?;
            self.summary.tests += 1;
            self.summary.failures += 1;
        }
        Ok(())
    }

    /// Count a bad item; returns false once the stream should be abandoned
    fn skip_bad_item(&mut self, consecutive_errors: &mut usize) -> bool {
        self.summary.skipped_items += 1;
        *consecutive_errors += 1;
        if *consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
            warn!(
                reported = self.summary.tests,
                "too many consecutive parsing errors, stopping early"
            );
            return false;
        }
        true
    }
}

/// Replay a subunit v2 stream through `reporter`.
///
/// The whole stream is reported as one suite, so the plan line is written
/// when the stream ends. Corrupted data is skipped; if the stream is
/// interrupted, the tests seen so far are still reported and any test left
/// running is reported as an error.
pub fn replay_stream<R: Read>(
    reader: R,
    reporter: &mut TapReporter<'_>,
    options: ReplayOptions,
) -> Result<ReplaySummary> {
    reporter.start_suite(SUITE_NAME)?;

    let mut replay = Replay::new(reporter, options);
    let mut consecutive_errors = 0;

    for item in iter_stream(reader) {
        let item = match item {
            Ok(item) => item,
            Err(_e) => {
                debug!("failed to read subunit item");
                if replay.skip_bad_item(&mut consecutive_errors) {
                    continue;
                }
                break;
            }
        };

        match item {
            ScannedItem::Unknown(_data, _err) => {
                if replay.skip_bad_item(&mut consecutive_errors) {
                    continue;
                }
                break;
            }
            ScannedItem::Bytes(bytes) => {
                consecutive_errors = 0;
                replay.bytes(&bytes)?;
            }
            ScannedItem::Event(event) => {
                consecutive_errors = 0;

                let test_id = match event.test_id {
                    Some(ref test_id) => test_id.clone(),
                    None => {
                        debug!("ignoring subunit event without a test id");
                        continue;
                    }
                };

                // Listing a test is not running it
                if event.status == SubunitTestStatus::Enumeration {
                    continue;
                }

                if let Some((name, content)) = &event.file.file {
                    replay.pending_mut(&test_id).attach(name, content);
                }

                if event.status == SubunitTestStatus::InProgress {
                    replay.pending_mut(&test_id);
                    continue;
                }

                if let Some(status) = convert_subunit_status(event.status) {
                    replay.finish(&test_id, status)?;
                }
            }
        }
    }

    replay.abandon_unfinished()?;
    replay.flush_passthrough()?;
    let summary = replay.summary;

    reporter.end_suite(SUITE_NAME)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::VersionBanner;
    use crate::sink::test_sink::TestSink;
    use subunit::serialize::Serializable;
    use subunit::types::event::Event;

    fn write_event(buffer: &mut Vec<u8>, status: SubunitTestStatus, test_id: &str) {
        Event::new(status)
            .test_id(test_id)
            .build()
            .serialize(buffer)
            .unwrap();
    }

    fn replay(stream: &[u8], options: ReplayOptions) -> (Vec<String>, ReplaySummary) {
        let mut sink = TestSink::new();
        let mut reporter = TapReporter::new(&mut sink, VersionBanner::new("Runner 1.0")).unwrap();
        let summary = replay_stream(stream, &mut reporter, options).unwrap();
        let lines = sink.lines().iter().map(|l| l.to_string()).collect();
        (lines, summary)
    }

    #[test]
    fn test_replay_empty_stream() {
        let (lines, summary) = replay(&[], ReplayOptions::default());
        assert_eq!(lines, vec!["TAP version 13", "1..0"]);
        assert_eq!(summary, ReplaySummary::default());
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn test_replay_success_and_failure() {
        let mut stream = Vec::new();
        write_event(&mut stream, SubunitTestStatus::InProgress, "test1");
        write_event(&mut stream, SubunitTestStatus::Success, "test1");
        write_event(&mut stream, SubunitTestStatus::InProgress, "test2");
        write_event(&mut stream, SubunitTestStatus::Failed, "test2");

        let (lines, summary) = replay(&stream, ReplayOptions::default());
        assert_eq!(
            lines,
            vec![
                "TAP version 13",
                "ok 1 - test1",
                "not ok 2 - test2",
                "  ---",
                "  message: Test failed",
                "  severity: fail",
                "  ...",
                "1..2",
            ]
        );
        assert_eq!(summary.tests, 2);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_status_mapping() {
        let mut stream = Vec::new();
        write_event(&mut stream, SubunitTestStatus::Skipped, "skipped");
        write_event(&mut stream, SubunitTestStatus::ExpectedFailure, "xfail");
        write_event(&mut stream, SubunitTestStatus::UnexpectedSuccess, "uxsuccess");

        let (lines, summary) = replay(&stream, ReplayOptions::default());
        assert_eq!(
            lines[1..],
            [
                "ok 1 - skipped # SKIP",
                "not ok 2 - xfail # TODO Incomplete Test",
                "not ok 3 - Error: uxsuccess",
                "1..3",
            ]
        );
        assert_eq!(summary.failures, 1);
    }

    #[test]
    fn test_unfinished_test_reported_as_error() {
        let mut stream = Vec::new();
        write_event(&mut stream, SubunitTestStatus::InProgress, "hangs");

        let (lines, summary) = replay(&stream, ReplayOptions::default());
        assert_eq!(lines[1..], ["not ok 1 - Error: hangs", "1..1"]);
        assert_eq!(summary.failures, 1);
    }

    #[test]
    fn test_corrupted_stream_no_panic() {
        let invalid_data: &[u8] = &[0xB2, 0x9A, 0x00, 0xFF, 0xFF, 0xFF];
        let (lines, summary) = replay(invalid_data, ReplayOptions::default());

        assert_eq!(lines.first().map(String::as_str), Some("TAP version 13"));
        assert_eq!(lines.last().map(String::as_str), Some("1..0"));
        assert_eq!(summary.tests, 0);
    }

    #[test]
    fn test_failure_summary_uses_last_line() {
        let traceback = "Traceback (most recent call last):\n  \
                         File \"pkg/test_x.py\", line 9, in test_bad\n    \
                         self.assertEqual(1, 2)\n\
                         AssertionError 1 != 2\n\n";
        assert_eq!(failure_summary(traceback), Some("AssertionError 1 != 2"));
        assert_eq!(failure_summary("single"), Some("single"));
        assert_eq!(failure_summary(" \n\n"), None);
    }
}
