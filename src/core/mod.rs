//! Core processing logic for qqmerge.
//!
//! This module contains:
//! - [`models`] - The merged transcript and output configuration
//! - [`merge`] - Multi-source merge and statistics
//! - [`output`] - Format writers (HTML, pages, MHT, JSON, CSV)
//!
//! # Quick Start
//!
//! ```rust
//! use qqmerge::core::{MergedTranscript, OutputConfig, merge, merge_messages, to_html};
//! ```

pub mod merge;
pub mod models;
pub mod output;

// Re-export main types for convenience
pub use merge::{MergeStats, merge, merge_images, merge_messages};
pub use models::{DayGroup, MergedTranscript, OutputConfig};

// Conditionally re-export output writers
#[cfg(feature = "csv-output")]
pub use output::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use output::{to_json, write_json};

pub use output::{copy_images, to_html, to_mht, write_html, write_mht, write_pages};
