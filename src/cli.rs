//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`OutputFormat`] - Output format options
//!
//! # Example
//!
//! ```rust
//! use clap::Parser;
//! use qqmerge::cli::{Args, OutputFormat};
//!
//! let args = Args::parse_from(["qqmerge", "a.mht", "b.mht", "-f", "pages"]);
//! assert_eq!(args.inputs.len(), 2);
//! assert_eq!(args.format, OutputFormat::Pages);
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::ReaderConfig;
use crate::core::models::{DEFAULT_TITLE, OutputConfig};

/// Merge QQ group chat exports from several members into one
/// de-duplicated, chronological transcript.
#[derive(Parser, Debug, Clone)]
#[command(name = "qqmerge")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    qqmerge alice.mht bob.mht
    qqmerge *.mht -o merged -f pages
    qqmerge alice.mht bob.mht -f mht --title \"Dev Group\"
    qqmerge exports/*.mht --skip-invalid --parallel -v")]
pub struct Args {
    /// Archives to merge, in priority order
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "merged")]
    pub output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "html")]
    pub format: OutputFormat,

    /// Title of the rendered documents
    #[arg(long, default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Directory for temporary files (default: system temp directory)
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Skip inputs that cannot be parsed instead of aborting
    #[arg(long)]
    pub skip_invalid: bool,

    /// Parse inputs concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Builds the reader configuration from the flags.
    pub fn reader_config(&self) -> ReaderConfig {
        let mut config = ReaderConfig::new().with_parallel(self.parallel);
        if let Some(dir) = &self.scratch_dir {
            config = config.with_scratch_root(dir);
        }
        config
    }

    /// Builds the output configuration from the flags.
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig::new().with_title(self.title.as_str())
    }

    /// Default log filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "qqmerge=warn",
            1 => "qqmerge=info",
            _ => "qqmerge=debug",
        }
    }
}

/// Output format options.
///
/// - [`Html`](OutputFormat::Html) - One combined document (default)
/// - [`Pages`](OutputFormat::Pages) - One page per date
/// - [`Mht`](OutputFormat::Mht) - Single archive with embedded images
/// - [`Json`](OutputFormat::Json) - Structured document
/// - [`Csv`](OutputFormat::Csv) - Semicolon-delimited table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Single HTML document
    #[default]
    Html,

    /// One HTML page per date with an index
    Pages,

    /// MHT archive
    #[value(alias = "mhtml")]
    Mht,

    /// JSON document
    Json,

    /// CSV with semicolon delimiter
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::format::OutputFormat::from(*self))
    }
}

// Conversion to library format type
impl From<OutputFormat> for crate::format::OutputFormat {
    fn from(format: OutputFormat) -> crate::format::OutputFormat {
        match format {
            OutputFormat::Html => crate::format::OutputFormat::Html,
            OutputFormat::Pages => crate::format::OutputFormat::Pages,
            OutputFormat::Mht => crate::format::OutputFormat::Mht,
            OutputFormat::Json => crate::format::OutputFormat::Json,
            OutputFormat::Csv => crate::format::OutputFormat::Csv,
        }
    }
}
