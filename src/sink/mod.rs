//! Output sink abstraction
//!
//! This module provides the Sink trait the TAP stream is written to.

use crate::error::Result;
use std::io::{self, Write};

#[cfg(test)]
pub mod test_sink;

/// Destination for protocol text
pub trait Sink {
    /// Write text verbatim; callers supply their own line terminators
    fn write(&mut self, text: &str) -> Result<()>;

    /// Flush any buffered output
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Sink backed by any `io::Write`
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Creates a sink writing to the given writer.
    pub fn new(writer: W) -> Self {
        WriterSink { writer }
    }

    /// Consumes the sink, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<Box<dyn Write>> {
    /// Creates a sink writing to stdout.
    pub fn stdout() -> Self {
        WriterSink::new(Box::new(io::stdout()))
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn write(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
