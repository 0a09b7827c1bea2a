//! Test utilities for sink testing

use crate::error::Result;
use crate::sink::Sink;

/// A sink for testing that captures everything written to it
pub struct TestSink {
    pub text: String,
    pub flushes: usize,
}

impl TestSink {
    pub fn new() -> Self {
        TestSink {
            text: String::new(),
            flushes: 0,
        }
    }

    /// Captured text split into lines, terminators removed
    pub fn lines(&self) -> Vec<&str> {
        self.text.lines().collect()
    }
}

impl Default for TestSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for TestSink {
    fn write(&mut self, text: &str) -> Result<()> {
        self.text.push_str(text);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_sink_captures_text() {
        let mut sink = TestSink::new();
        sink.write("ok 1 - a\n").unwrap();
        sink.write("ok 2 - b\n").unwrap();
        assert_eq!(sink.lines(), vec!["ok 1 - a", "ok 2 - b"]);
    }

    #[test]
    fn test_test_sink_counts_flushes() {
        let mut sink = TestSink::new();
        sink.flush().unwrap();
        assert_eq!(sink.flushes, 1);
    }
}
