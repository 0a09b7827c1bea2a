//! Command system for tapr
//!
//! Commands are executed through the Command trait.

use crate::error::Result;
use crate::sink::Sink;

pub mod convert;
pub mod init;
mod utils;

pub use convert::ConvertCommand;
pub use init::InitCommand;

/// Trait that all commands must implement
pub trait Command {
    /// Execute the command, returning the process exit code
    fn execute(&self, sink: &mut dyn Sink) -> Result<i32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::sink::test_sink::TestSink;

    struct MockCommand;

    impl Command for MockCommand {
        fn execute(&self, sink: &mut dyn Sink) -> Result<i32> {
            sink.write("mock\n")?;
            Ok(3)
        }
    }

    #[test]
    fn test_command_trait_object() {
        let cmd: Box<dyn Command> = Box::new(MockCommand);
        let mut sink = TestSink::new();
        assert_eq!(cmd.execute(&mut sink).unwrap(), 3);
        assert_eq!(sink.lines(), vec!["mock"]);
    }
}
