//! tapreporter - Report test lifecycle events as TAP
//!
//! This crate turns the lifecycle events of a running test suite into a
//! [Test Anything Protocol](https://testanything.org) version 13 stream,
//! numbered and ordered as the events arrive.
//!
//! # Architecture
//!
//! - [`reporter`]: the state machine translating events into TAP lines
//! - [`event`]: lifecycle events and the tests and failures they describe
//! - [`diagnostic`]: YAML diagnostic blocks for failures
//! - [`banner`]: the host framework's version banner, demoted to a comment
//! - [`sink`]: where the TAP text goes
//! - [`subunit_stream`]: replay a subunit v2 stream through a reporter
//! - [`config`]: .tapr.conf configuration file parsing
//! - [`commands`]: the `tapr` subcommands
//! - [`error`]: Error types and Result alias
//!
//! # Example
//!
//! ```
//! use tapreporter::banner::VersionBanner;
//! use tapreporter::event::{Event, Failure, TestCase};
//! use tapreporter::reporter::TapReporter;
//! use tapreporter::sink::WriterSink;
//!
//! # fn main() -> tapreporter::error::Result<()> {
//! let mut sink = WriterSink::new(Vec::new());
//! let mut reporter = TapReporter::new(&mut sink, VersionBanner::default_for_tool())?;
//!
//! let test = TestCase::new("math::addition");
//! reporter.handle(Event::SuiteStart("math".to_string()))?;
//! reporter.handle(Event::TestStart(test.clone()))?;
//! reporter.handle(Event::Failure {
//!     test: test.clone(),
//!     failure: Failure::new("1 + 1 is not 3"),
//! })?;
//! reporter.handle(Event::TestEnd(test))?;
//! reporter.handle(Event::SuiteEnd("math".to_string()))?;
//!
//! let tap = String::from_utf8(sink.into_inner()).unwrap();
//! assert!(tap.starts_with("TAP version 13\nnot ok 1 - math::addition\n"));
//! assert!(tap.ends_with("1..1\n"));
//! # Ok(())
//! # }
//! ```

pub mod banner;
pub mod commands;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod event;
pub mod reporter;
pub mod sink;
pub mod subunit_stream;

pub use error::{Error, Result};
pub use reporter::TapReporter;
