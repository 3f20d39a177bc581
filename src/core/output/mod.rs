//! Output format writers.
//!
//! Every writer renders a [`MergedTranscript`] into a directory:
//! - [`write_html`] / [`to_html`] - one combined `index.html`
//! - [`write_pages`] - one page per date plus a navigation `index.html`
//! - [`write_mht`] / [`to_mht`] - a single self-contained `merged.mht`
//! - [`write_json`] / [`to_json`] - `transcript.json` - requires `json-output` feature
//! - [`write_csv`] / [`to_csv`] - `transcript.csv` with semicolon delimiter - requires `csv-output` feature
//!
//! All but the MHT writer copy the referenced images into `images/` with
//! [`copy_images`] unless [`OutputConfig::copy_images`] is off.
//!
//! # Choosing a Format
//!
//! | Format | Use Case |
//! |--------|----------|
//! | HTML | Reading the whole history in a browser |
//! | Pages | Long histories, one day at a time |
//! | MHT | Re-importing or archiving as one file |
//! | JSON | Structured data, further processing |
//! | CSV | Spreadsheets, LLM context |
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> qqmerge::Result<()> {
//! use qqmerge::core::output::write_html;
//! use qqmerge::prelude::*;
//!
//! let reader = SourceReader::new();
//! let sources = vec![
//!     reader.parse("alice.mht".as_ref())?,
//!     reader.parse("bob.mht".as_ref())?,
//! ];
//! let transcript = merge(&sources)?;
//!
//! write_html(&transcript, "merged".as_ref(), &OutputConfig::new())?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
mod html_writer;
#[cfg(feature = "json-output")]
mod json_writer;
mod mht_writer;
mod pages_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{CSV_FILE_NAME, to_csv, write_csv};
pub use html_writer::{STYLESHEET, to_html, write_html};
#[cfg(feature = "json-output")]
pub use json_writer::{JSON_FILE_NAME, to_json, write_json};
pub use mht_writer::{MHT_FILE_NAME, to_mht, write_mht};
pub use pages_writer::{page_file_name, write_pages};

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::container::ImageAsset;
use crate::error::Result;

pub use super::models::OutputConfig;
use super::models::MergedTranscript;

/// Directory, relative to the output directory, that receives images.
pub const IMAGES_DIR: &str = "images";

/// Copies `images` into `<out_dir>/images/`, keeping their filenames.
///
/// Returns the number of files copied.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created or a file cannot
/// be copied.
pub fn copy_images(images: &[&ImageAsset], out_dir: &Path) -> Result<usize> {
    let dir = out_dir.join(IMAGES_DIR);
    fs::create_dir_all(&dir)?;

    for asset in images {
        fs::copy(&asset.path, dir.join(asset.filename()))?;
    }

    debug!(count = images.len(), dir = %dir.display(), "copied images");
    Ok(images.len())
}

/// Copies the transcript's images if `config` asks for it.
fn copy_transcript_images(
    transcript: &MergedTranscript<'_>,
    out_dir: &Path,
    config: &OutputConfig,
) -> Result<()> {
    if config.copy_images {
        copy_images(&transcript.images, out_dir)?;
    }
    Ok(())
}

/// Escapes text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
