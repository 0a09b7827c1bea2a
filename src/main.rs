//! tapr - Convert test runner output into TAP

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tapreporter::commands::*;
use tapreporter::sink::{Sink, WriterSink};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tapr")]
#[command(about = "Test Anything Protocol reporter", long_about = None)]
struct Cli {
    /// Directory holding .tapr.conf (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    directory: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .tapr.conf
    Init,

    /// Convert a subunit v2 stream into TAP version 13
    Convert {
        /// Read the subunit stream from a file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Version banner of the test runner, written as a comment if seen
        #[arg(long, env = "TAPR_BANNER")]
        banner: Option<String>,

        /// Pass test output through instead of attaching it as comments
        #[arg(long)]
        no_capture: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut sink = WriterSink::stdout();

    let result = match cli.command {
        Commands::Init => {
            let cmd = InitCommand::new(cli.directory);
            cmd.execute(&mut sink)
        }
        Commands::Convert {
            input,
            banner,
            no_capture,
        } => {
            let mut cmd = ConvertCommand::new(cli.directory);
            if let Some(input) = input {
                cmd = cmd.with_input(input);
            }
            if let Some(banner) = banner {
                cmd = cmd.with_banner(banner);
            }
            if no_capture {
                cmd = cmd.with_capture_output(false);
            }
            cmd.execute(&mut sink)
        }
    };

    let result = result.and_then(|code| sink.flush().map(|_| code));

    match result {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            let _ = writeln!(std::io::stderr(), "Error: {}", e);
            std::process::exit(1);
        }
    }
}
