//! Command-line interface definitions for sibin-dump.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use sibin_core::LogLevel;

/// Print the shaders embedded in a Southern Islands OpenGL program binary.
#[derive(Debug, Parser)]
#[command(name = "sibin-dump", version, about)]
pub struct Cli {
    /// Program binary to decode.
    pub file: PathBuf,

    /// Name to report the program under (default: the file name).
    #[arg(long)]
    pub name: Option<String>,

    /// Emit a JSON report instead of text.
    #[arg(long)]
    pub json: bool,

    /// Reject a `.usageinfo` section of the wrong size.
    #[arg(long)]
    pub strict_usage_info: bool,

    /// Reject a fragment `.text` section shorter than its header.
    #[arg(long)]
    pub strict_fragment_header: bool,

    /// Configuration file (default: `sibin.toml` if present).
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// More log output; repeat for trace.
    #[arg(long, short = 'v', action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors.
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Number of leading ISA words to print per shader.
    #[arg(long)]
    pub isa_words: Option<usize>,
}

impl Cli {
    /// Log filter selected by `-q` / `-v`.
    pub fn log_level(&self) -> LogLevel {
        match (self.quiet, self.verbose) {
            (true, _) => LogLevel::Error,
            (false, 0) => LogLevel::Info,
            (false, 1) => LogLevel::Debug,
            (false, _) => LogLevel::Trace,
        }
    }

    /// Program name for the report.
    pub fn program_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.file
                .file_name()
                .map_or_else(|| self.file.display().to_string(), |n| n.to_string_lossy().into_owned())
        })
    }
}
