//! Output format types for the qqmerge library.
//!
//! [`OutputFormat`] names a writer; [`write_to_format`] dispatches to it. The
//! CLI has its own clap-facing enum that converts into this one.
//!
//! # Example
//!
//! ```rust,no_run
//! # fn example() -> qqmerge::Result<()> {
//! use qqmerge::format::{OutputFormat, write_to_format};
//! use qqmerge::prelude::*;
//!
//! let sources = vec![SourceReader::new().parse("alice.mht".as_ref())?];
//! let transcript = merge(&sources)?;
//!
//! let format: OutputFormat = "pages".parse()?;
//! write_to_format(&transcript, "merged".as_ref(), format, &OutputConfig::new())?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::models::{MergedTranscript, OutputConfig};
use crate::core::output;
use crate::error::QqMergeError;

/// Output format for merged transcripts.
///
/// Every format writes into an output directory:
/// - [`Html`](OutputFormat::Html) - one combined `index.html` (default)
/// - [`Pages`](OutputFormat::Pages) - one page per date plus an index
/// - [`Mht`](OutputFormat::Mht) - one self-contained `merged.mht`
/// - [`Json`](OutputFormat::Json) - `transcript.json`
/// - [`Csv`](OutputFormat::Csv) - `transcript.csv`
///
/// # Example
///
/// ```rust
/// use qqmerge::format::OutputFormat;
/// use std::str::FromStr;
///
/// let format = OutputFormat::from_str("mht").unwrap();
/// assert_eq!(format, OutputFormat::Mht);
/// assert_eq!(format.file_name(), "merged.mht");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// Single HTML document with all days
    #[default]
    Html,

    /// One HTML page per date with a navigation index
    Pages,

    /// MHT archive embedding the images
    Mht,

    /// JSON document with messages, images and statistics
    Json,

    /// CSV with semicolon delimiter
    Csv,
}

impl OutputFormat {
    /// Returns the name of the main document inside the output directory.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qqmerge::format::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::Html.file_name(), "index.html");
    /// assert_eq!(OutputFormat::Csv.file_name(), "transcript.csv");
    /// ```
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputFormat::Html | OutputFormat::Pages => crate::container::HTML_FILE_NAME,
            OutputFormat::Mht => "merged.mht",
            OutputFormat::Json => "transcript.json",
            OutputFormat::Csv => "transcript.csv",
        }
    }

    /// Returns `true` if images are copied into `images/` for this format.
    pub fn copies_images(&self) -> bool {
        !matches!(self, OutputFormat::Mht)
    }

    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["html", "pages", "mht", "json", "csv"]
    }

    /// Returns all available formats.
    pub fn all() -> &'static [OutputFormat] {
        &[
            OutputFormat::Html,
            OutputFormat::Pages,
            OutputFormat::Mht,
            OutputFormat::Json,
            OutputFormat::Csv,
        ]
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Html => write!(f, "HTML"),
            OutputFormat::Pages => write!(f, "HTML pages"),
            OutputFormat::Mht => write!(f, "MHT"),
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = QqMergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "pages" => Ok(OutputFormat::Pages),
            "mht" | "mhtml" => Ok(OutputFormat::Mht),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(QqMergeError::invalid_format(
                "output",
                format!(
                    "Unknown format: '{}'. Expected one of: {}",
                    s,
                    OutputFormat::all_names().join(", ")
                ),
            )),
        }
    }
}

/// Writes the transcript into `out_dir` in the specified format.
///
/// Returns the path of the main document.
///
/// # Errors
///
/// Returns [`QqMergeError::InvalidFormat`] if the format's feature is not
/// enabled, or the writer's error.
pub fn write_to_format(
    transcript: &MergedTranscript<'_>,
    out_dir: &Path,
    format: OutputFormat,
    config: &OutputConfig,
) -> crate::Result<PathBuf> {
    match format {
        OutputFormat::Html => output::write_html(transcript, out_dir, config),
        OutputFormat::Pages => {
            let written = output::write_pages(transcript, out_dir, config)?;
            Ok(written
                .into_iter()
                .next()
                .unwrap_or_else(|| out_dir.join(format.file_name())))
        }
        OutputFormat::Mht => output::write_mht(transcript, out_dir, config),
        OutputFormat::Json => {
            #[cfg(feature = "json-output")]
            {
                output::write_json(transcript, out_dir, config)
            }
            #[cfg(not(feature = "json-output"))]
            {
                Err(QqMergeError::invalid_format(
                    "output",
                    "JSON output requires the 'json-output' feature",
                ))
            }
        }
        OutputFormat::Csv => {
            #[cfg(feature = "csv-output")]
            {
                output::write_csv(transcript, out_dir, config)
            }
            #[cfg(not(feature = "csv-output"))]
            {
                Err(QqMergeError::invalid_format(
                    "output",
                    "CSV output requires the 'csv-output' feature",
                ))
            }
        }
    }
}
