//! Command-line configuration for `maec-xml`.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MAEC_OUTPUT_FORMAT` | xml | Output format (`xml` or `json`) |
//! | `MAEC_COMPACT` | false | Single-line namespace block and JSON |
//! | `MAEC_LOG_LEVEL` | warn | Log level |

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Xml,
    Json,
}

/// Options of the `maec-xml` command.
#[derive(Debug, Clone, Parser)]
#[command(name = "maec-xml")]
#[command(about = "Parse a MAEC document and write it back out as XML or JSON")]
pub struct CliConfig {
    /// MAEC document to read.
    pub input: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, env = "MAEC_OUTPUT_FORMAT", default_value = "xml")]
    pub format: OutputFormat,

    /// Put the namespace declarations on the root element's line, and write
    /// JSON without indentation.
    #[arg(long, env = "MAEC_COMPACT")]
    pub compact: bool,

    /// Write to this file instead of standard output.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "MAEC_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,
}

impl CliConfig {
    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "Unknown log level '{}', expected one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        if self.output.as_ref() == Some(&self.input) {
            errors.push("Output file cannot be the input file".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
