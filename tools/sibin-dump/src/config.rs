//! Configuration loading from `sibin.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use sibin_opengl::DecodeOptions;

use crate::cli::Cli;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "sibin.toml";

const DEFAULT_ISA_WORDS: usize = 8;

/// On-disk layout of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    decode: DecodeSection,
    output: OutputSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct DecodeSection {
    strict_usage_info: bool,
    strict_fragment_header: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct OutputSection {
    isa_words: usize,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            isa_words: DEFAULT_ISA_WORDS,
        }
    }
}

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Decoder policy.
    pub options: DecodeOptions,
    /// Leading ISA words printed per shader.
    pub isa_words: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(ConfigFile::default())
    }
}

impl Config {
    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] if it
    /// exists, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: ConfigFile) -> Self {
        Self {
            options: DecodeOptions {
                strict_usage_info: file.decode.strict_usage_info,
                strict_fragment_header: file.decode.strict_fragment_header,
            },
            isa_words: file.output.isa_words,
        }
    }

    /// Apply command-line overrides. Flags can only tighten the decode
    /// policy.
    pub fn apply_cli(&mut self, cli: &Cli) {
        self.options.strict_usage_info |= cli.strict_usage_info;
        self.options.strict_fragment_header |= cli.strict_fragment_header;
        if let Some(words) = cli.isa_words {
            self.isa_words = words;
        }
    }
}
