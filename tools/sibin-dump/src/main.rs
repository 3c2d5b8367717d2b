//! Print the shaders embedded in a Southern Islands OpenGL program binary.
//!
//! Usage:
//!   sibin-dump shader.bin             - text summary
//!   sibin-dump --json shader.bin      - JSON report
//!   sibin-dump -v shader.bin          - with per-shader debug log
//!   sibin-dump --strict-usage-info shader.bin

mod cli;
mod config;
mod report;

use std::fmt;

use anyhow::{Context, Result};
use clap::Parser;
use sibin_core::LogLevel;
use sibin_opengl::ProgramBinary;

use crate::cli::Cli;
use crate::config::Config;
use crate::report::ProgramReport;

fn stderr_log(level: LogLevel, args: fmt::Arguments<'_>) {
    eprintln!("[{}] {args}", level.name());
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    sibin_core::log::set_log_fn(stderr_log);
    sibin_core::log::set_max_level(cli.log_level());

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);

    let bytes = std::fs::read(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    let name = cli.program_name();
    let program = ProgramBinary::create_with_options(&bytes, &name, &config.options)
        .with_context(|| format!("Failed to decode {}", cli.file.display()))?;

    let report = ProgramReport::new(&program, config.isa_words);
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print!("{report}");
    }
    Ok(())
}
