//! Unified error types for qqmerge.
//!
//! This module provides a single [`QqMergeError`] enum that covers all error
//! cases in the library.
//!
//! # Fatal vs. recoverable
//!
//! - **Fatal for one source**: [`MalformedContainer`](QqMergeError::MalformedContainer)
//!   and [`SourceIo`](QqMergeError::SourceIo). The source cannot be read at all;
//!   the caller decides whether the whole run stops.
//! - **Recoverable**: [`ImageDecode`](QqMergeError::ImageDecode),
//!   [`InvalidDate`](QqMergeError::InvalidDate), [`InvalidTime`](QqMergeError::InvalidTime)
//!   and [`MissingDate`](QqMergeError::MissingDate). The parser logs them and
//!   drops the offending image part or table cell.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for qqmerge operations.
///
/// # Example
///
/// ```rust
/// use qqmerge::error::Result;
/// use qqmerge::Message;
///
/// fn my_function() -> Result<Vec<Message>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, QqMergeError>;

/// The error type for all qqmerge operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QqMergeError {
    /// An I/O error occurred.
    ///
    /// Usually raised while writing output or managing scratch directories.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// An input file could not be opened or read.
    #[error("Failed to read {}: {source}", path.display())]
    SourceIo {
        /// The input file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The input has no `boundary="..."` declaration.
    ///
    /// Without a boundary no part can be located, so the whole source is
    /// unusable.
    #[error("Malformed container{}: no boundary declaration found", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    MalformedContainer {
        /// The input file, if known
        path: Option<PathBuf>,
    },

    /// An image part could not be base64-decoded.
    #[error("Failed to decode image '{location}': {source}")]
    ImageDecode {
        /// The part's `Content-Location`
        location: String,
        /// The underlying decode error
        #[source]
        source: base64::DecodeError,
    },

    /// A date marker carried a date that matches none of the accepted formats.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The date literal found in the transcript
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// A message carried a time label that is not `H:m:s`.
    #[error("Invalid time '{input}'. Expected format: {expected}")]
    InvalidTime {
        /// The time literal found in the transcript
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// A message cell appeared before any date marker.
    #[error("Message found before any date marker")]
    MissingDate,

    /// The merge engine was called without any source.
    #[error("No sources to merge")]
    EmptySourceList,

    /// The requested output cannot be produced.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format that was requested
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[cfg(feature = "json-output")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl QqMergeError {
    /// Creates a malformed container error.
    pub fn malformed_container(path: Option<PathBuf>) -> Self {
        QqMergeError::MalformedContainer { path }
    }

    /// Creates an I/O error tied to an input file.
    pub fn source_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        QqMergeError::SourceIo {
            path: path.into(),
            source,
        }
    }

    /// Creates an image decode error.
    pub fn image_decode(location: impl Into<String>, source: base64::DecodeError) -> Self {
        QqMergeError::ImageDecode {
            location: location.into(),
            source,
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        QqMergeError::InvalidDate {
            input: input.into(),
            expected: "yyyy/M/d, yyyy-M-d or M/d/yyyy",
        }
    }

    /// Creates an invalid time error.
    pub fn invalid_time(input: impl Into<String>) -> Self {
        QqMergeError::InvalidTime {
            input: input.into(),
            expected: "H:m:s",
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        QqMergeError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Attaches an input path to errors that can carry one.
    ///
    /// Errors that already name a path, or that are not tied to a source,
    /// are returned unchanged.
    #[must_use]
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            QqMergeError::MalformedContainer { path: None } => QqMergeError::MalformedContainer {
                path: Some(path.into()),
            },
            QqMergeError::Io(source) => QqMergeError::SourceIo {
                path: path.into(),
                source,
            },
            other => other,
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, QqMergeError::Io(_) | QqMergeError::SourceIo { .. })
    }

    /// Returns `true` if this is a malformed container error.
    pub fn is_malformed_container(&self) -> bool {
        matches!(self, QqMergeError::MalformedContainer { .. })
    }

    /// Returns `true` if this error only costs one image or one table cell.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            QqMergeError::ImageDecode { .. }
                | QqMergeError::InvalidDate { .. }
                | QqMergeError::InvalidTime { .. }
                | QqMergeError::MissingDate
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
