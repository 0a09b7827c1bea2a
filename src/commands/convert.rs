//! Convert a subunit stream into a TAP stream

use crate::commands::utils::load_config;
use crate::commands::Command;
use crate::error::{Error, Result};
use crate::reporter::TapReporter;
use crate::sink::Sink;
use crate::subunit_stream::{self, ReplayOptions};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use tracing::info;

pub struct ConvertCommand {
    base_path: Option<String>,
    input: Option<PathBuf>,
    banner: Option<String>,
    capture_output: Option<bool>,
}

impl ConvertCommand {
    /// Read from stdin using the settings in `.tapr.conf`
    pub fn new(base_path: Option<String>) -> Self {
        ConvertCommand {
            base_path,
            input: None,
            banner: None,
            capture_output: None,
        }
    }

    /// Read the subunit stream from a file instead of stdin
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Override the configured version banner
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    /// Override the configured output capture setting
    pub fn with_capture_output(mut self, capture_output: bool) -> Self {
        self.capture_output = Some(capture_output);
        self
    }

    fn open_input(&self) -> Result<Box<dyn Read>> {
        match self.input {
            Some(ref path) => {
                let file = File::open(path).map_err(|e| {
                    Error::Other(format!("Failed to open {}: {}", path.display(), e))
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
            None => Ok(Box::new(io::stdin().lock())),
        }
    }
}

impl Command for ConvertCommand {
    fn execute(&self, sink: &mut dyn Sink) -> Result<i32> {
        let mut config = load_config(self.base_path.as_deref())?;
        if let Some(ref banner) = self.banner {
            config.banner = Some(banner.clone());
        }
        if let Some(capture_output) = self.capture_output {
            config.capture_output = capture_output;
        }

        let input = self.open_input()?;
        let options = ReplayOptions {
            capture_output: config.capture_output,
        };

        let mut reporter = TapReporter::new(sink, config.version_banner())?;
        let summary = subunit_stream::replay_stream(input, &mut reporter, options)?;

        info!(
            tests = summary.tests,
            failures = summary.failures,
            skipped_items = summary.skipped_items,
            "converted subunit stream"
        );
        Ok(summary.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE;
    use crate::sink::test_sink::TestSink;
    use std::fs;
    use subunit::serialize::Serializable;
    use subunit::types::event::Event;
    use subunit::types::teststatus::TestStatus as SubunitTestStatus;
    use tempfile::TempDir;

    fn write_stream(temp: &TempDir, events: &[(SubunitTestStatus, &str)]) -> PathBuf {
        let mut buffer = Vec::new();
        for (status, test_id) in events {
            Event::new(*status)
                .test_id(*test_id)
                .build()
                .serialize(&mut buffer)
                .unwrap();
        }
        let path = temp.path().join("stream.subunit");
        fs::write(&path, buffer).unwrap();
        path
    }

    #[test]
    fn test_convert_passing_run() {
        let temp = TempDir::new().unwrap();
        let input = write_stream(
            &temp,
            &[
                (SubunitTestStatus::InProgress, "test1"),
                (SubunitTestStatus::Success, "test1"),
            ],
        );

        let mut sink = TestSink::new();
        let cmd = ConvertCommand::new(Some(temp.path().to_string_lossy().to_string()))
            .with_input(input);

        assert_eq!(cmd.execute(&mut sink).unwrap(), 0);
        assert_eq!(sink.lines(), vec!["TAP version 13", "ok 1 - test1", "1..1"]);
    }

    #[test]
    fn test_convert_failing_run_exit_code() {
        let temp = TempDir::new().unwrap();
        let input = write_stream(&temp, &[(SubunitTestStatus::Failed, "test1")]);

        let mut sink = TestSink::new();
        let cmd = ConvertCommand::new(Some(temp.path().to_string_lossy().to_string()))
            .with_input(input);

        assert_eq!(cmd.execute(&mut sink).unwrap(), 1);
        assert_eq!(sink.lines()[1], "not ok 1 - test1");
    }

    #[test]
    fn test_convert_missing_input() {
        let temp = TempDir::new().unwrap();
        let mut sink = TestSink::new();
        let cmd = ConvertCommand::new(Some(temp.path().to_string_lossy().to_string()))
            .with_input(temp.path().join("missing.subunit"));

        let result = cmd.execute(&mut sink);
        assert!(result.is_err());
        assert!(sink.text.is_empty());
    }

    #[test]
    fn test_convert_uses_configured_banner() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            "[DEFAULT]\nbanner=Runner 3.1 by Example\n",
        )
        .unwrap();

        let path = temp.path().join("stream.subunit");
        fs::write(&path, "Runner 3.1 by Example\n").unwrap();

        let mut sink = TestSink::new();
        let cmd = ConvertCommand::new(Some(temp.path().to_string_lossy().to_string()))
            .with_input(path);

        assert_eq!(cmd.execute(&mut sink).unwrap(), 0);
        assert_eq!(
            sink.lines(),
            vec!["TAP version 13", "# Runner 3.1 by Example", "1..0"]
        );
    }

    #[test]
    fn test_convert_banner_override() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("stream.subunit");
        fs::write(&path, "Other Runner 9\n").unwrap();

        let mut sink = TestSink::new();
        let cmd = ConvertCommand::new(Some(temp.path().to_string_lossy().to_string()))
            .with_input(path)
            .with_banner("Other Runner 9");

        cmd.execute(&mut sink).unwrap();
        assert_eq!(sink.lines()[1], "# Other Runner 9");
    }
}
