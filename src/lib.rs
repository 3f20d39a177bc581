//! # qqmerge
//!
//! A Rust library for merging QQ group chat exports into one transcript.
//!
//! ## Overview
//!
//! The QQ message manager exports a group chat as an MHT archive: a
//! multipart text file holding one HTML transcript and every image as a
//! base64 part. Each member can only export what their own client saw, so
//! several exports of one group overlap with gaps. qqmerge:
//!
//! - splits each archive into its transcript and content-addressed images,
//! - extracts the messages and normalizes their markup,
//! - merges all sources into one chronological timeline without duplicates,
//! - renders the result as HTML, per-day pages, MHT, JSON or CSV.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qqmerge::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let reader = SourceReader::new();
//!     let sources = vec![
//!         reader.parse("alice.mht".as_ref())?,
//!         reader.parse("bob.mht".as_ref())?,
//!     ];
//!
//!     let transcript = merge(&sources)?;
//!     println!("{} messages", transcript.len());
//!
//!     write_to_format(&transcript, "merged".as_ref(), OutputFormat::Html, &OutputConfig::new())?;
//!
//!     drop(transcript);
//!     for source in sources {
//!         source.cleanup()?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`hash`] — content addressing of image bytes
//! - [`container`] — MHT archive splitting
//!   - [`ContainerParser`](container::ContainerParser), [`ImageMap`](container::ImageMap)
//! - [`transcript`] — message extraction and markup normalization
//! - [`reader`] — one archive to one [`ParsedSource`](reader::ParsedSource)
//! - [`core`] — merging and output
//!   - [`core::merge`] — [`merge`](core::merge()), [`MergeStats`](core::MergeStats)
//!   - [`core::models`] — [`MergedTranscript`](core::MergedTranscript), [`OutputConfig`](core::OutputConfig)
//!   - [`core::output`] — HTML, pages, MHT, JSON and CSV writers
//! - [`format`] — [`OutputFormat`](format::OutputFormat) and [`write_to_format`](format::write_to_format)
//! - [`config`] — [`ReaderConfig`](config::ReaderConfig)
//! - [`error`] — Unified error types ([`QqMergeError`], [`Result`])
//! - [`prelude`] — Convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod container;
pub mod core;
pub mod error;
pub mod format;
pub mod hash;
pub mod message;
pub mod reader;
pub mod transcript;

// Re-export the main types at the crate root for convenience
pub use error::{QqMergeError, Result};
pub use message::{Identity, Message};

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use qqmerge::prelude::*;
/// ```
pub mod prelude {
    // Message types
    pub use crate::{Identity, Message};

    // Error types
    pub use crate::error::{QqMergeError, Result};

    // Reading
    pub use crate::config::ReaderConfig;
    pub use crate::reader::{ParsedSource, SourceReader, read_sources};

    // Merging
    pub use crate::core::merge::{MergeStats, merge};
    pub use crate::core::models::{MergedTranscript, OutputConfig};

    // Output
    pub use crate::core::output::{to_html, write_html, write_mht, write_pages};
    pub use crate::format::{OutputFormat, write_to_format};
}
