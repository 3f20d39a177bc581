//! Configuration types for reading chat archives.
//!
//! This module provides clean configuration structs for library usage,
//! without any CLI framework dependencies.
//!
//! # Example
//!
//! ```rust
//! use qqmerge::config::ReaderConfig;
//! use qqmerge::reader::SourceReader;
//!
//! let config = ReaderConfig::new()
//!     .with_scratch_root("/tmp/qqmerge")
//!     .with_buffer_size(128 * 1024);
//!
//! let reader = SourceReader::with_config(config);
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Text that starts a date marker cell, e.g. `日期: 2012/4/11`.
pub const DEFAULT_DATE_LABEL: &str = "日期";

/// Style fragment that identifies the header line of a message cell.
pub const DEFAULT_MESSAGE_INDENT: &str = "padding-left:10px;";

/// Last line of the HTML part; exporters omit the blank line after it.
pub const DEFAULT_END_MARKER: &str = "</table></body></html>";

/// Configuration for [`SourceReader`](crate::reader::SourceReader).
///
/// The defaults match the archives written by the QQ message manager.
///
/// # Example
///
/// ```rust
/// use qqmerge::config::ReaderConfig;
///
/// let config = ReaderConfig::new()
///     .with_date_label("Date")
///     .with_parallel(true);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Directory in which per-source scratch directories are created
    /// (default: the system temp directory)
    pub scratch_root: Option<PathBuf>,

    /// Label that starts a date marker cell (default: `日期`)
    pub date_label: String,

    /// Indent style that marks a message header (default: `padding-left:10px;`)
    pub message_indent: String,

    /// Line that terminates the HTML part (default: `</table></body></html>`)
    pub end_marker: String,

    /// Buffer size for reading archives (default: 64KB)
    pub buffer_size: usize,

    /// Parse several sources concurrently (default: false)
    pub parallel: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            scratch_root: None,
            date_label: DEFAULT_DATE_LABEL.to_string(),
            message_indent: DEFAULT_MESSAGE_INDENT.to_string(),
            end_marker: DEFAULT_END_MARKER.to_string(),
            buffer_size: 64 * 1024, // 64KB
            parallel: false,
        }
    }
}

impl ReaderConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory that holds scratch directories.
    #[must_use]
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Sets the date marker label.
    #[must_use]
    pub fn with_date_label(mut self, label: impl Into<String>) -> Self {
        self.date_label = label.into();
        self
    }

    /// Sets the style fragment that marks message headers.
    #[must_use]
    pub fn with_message_indent(mut self, indent: impl Into<String>) -> Self {
        self.message_indent = indent.into();
        self
    }

    /// Sets the line that terminates the HTML part.
    #[must_use]
    pub fn with_end_marker(mut self, marker: impl Into<String>) -> Self {
        self.end_marker = marker.into();
        self
    }

    /// Sets the read buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Enables or disables concurrent parsing of sources.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}
