//! Core data models for the merged transcript.

use serde::{Deserialize, Serialize};

use super::merge::MergeStats;
use crate::container::ImageAsset;
use crate::message::{Message, format_date};

/// Default document title for rendered transcripts.
pub const DEFAULT_TITLE: &str = "QQ Group Chat";

/// The result of merging several sources.
///
/// Image assets are borrowed from the [`ParsedSource`](crate::reader::ParsedSource)s
/// that produced them, whose scratch directories must outlive every writer
/// that copies the images out.
#[derive(Debug, Clone)]
pub struct MergedTranscript<'a> {
    /// Messages in `(date, time)` order without cross-source duplicates
    pub messages: Vec<Message>,
    /// Distinct images in first-seen order
    pub images: Vec<&'a ImageAsset>,
    /// Boundary token of the first source
    pub boundary: String,
    /// Counts collected while merging
    pub stats: MergeStats,
}

impl<'a> MergedTranscript<'a> {
    /// Creates a transcript from already merged parts.
    pub fn new(
        messages: Vec<Message>,
        images: Vec<&'a ImageAsset>,
        boundary: impl Into<String>,
    ) -> Self {
        let stats = MergeStats {
            sources: 1,
            input_messages: messages.len(),
            merged_messages: messages.len(),
            duplicates_removed: 0,
            images: images.len(),
        };
        Self {
            messages,
            images,
            boundary: boundary.into(),
            stats,
        }
    }

    /// Replaces the merge statistics.
    #[must_use]
    pub fn with_stats(mut self, stats: MergeStats) -> Self {
        self.stats = stats;
        self
    }

    /// Groups messages by calendar date, in order.
    pub fn days(&self) -> Vec<DayGroup<'_>> {
        self.messages
            .chunk_by(|a, b| a.date == b.date)
            .map(|messages| DayGroup {
                date: messages[0].date,
                messages,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Contiguous messages sharing one date.
#[derive(Debug, Clone, Copy)]
pub struct DayGroup<'t> {
    /// Date as `YYYYMMDD`
    pub date: u32,
    /// Non-empty run of messages on that date
    pub messages: &'t [Message],
}

impl DayGroup<'_> {
    /// Date formatted as `YYYY-MM-DD`.
    pub fn date_display(&self) -> String {
        format_date(self.date)
    }
}

/// Configuration for output writers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Title of rendered documents (default: `QQ Group Chat`)
    pub title: String,
    /// Copy images next to the written documents (default: true)
    pub copy_images: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            copy_images: true,
        }
    }
}

impl OutputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Enables or disables copying images into `images/`.
    #[must_use]
    pub fn with_copy_images(mut self, enabled: bool) -> Self {
        self.copy_images = enabled;
        self
    }
}
