//! Chronological union of several parsed sources.
//!
//! Group members export overlapping slices of the same conversation. The
//! merge keeps every message once, in `(date, time)` order, and unions the
//! image sets.
//!
//! # Algorithm
//!
//! The first source seeds the timeline. Every later source is walked in
//! order with a cursor that only moves forward. For each message the cursor
//! advances to the first entry with an equal or later key; the run of
//! entries sharing the key is then scanned for an entry with the same
//! identity and content. Any match drops the incoming message; otherwise it
//! is inserted after the run.
//!
//! # Example
//!
//! ```rust
//! use chrono::{NaiveDate, NaiveTime};
//! use qqmerge::core::merge::merge_messages;
//! use qqmerge::{Identity, Message};
//!
//! let date = NaiveDate::from_ymd_opt(2012, 4, 11).unwrap();
//! let msg = |h, text: &str| {
//!     Message::new("a", Identity::Number("1".into()), date, NaiveTime::from_hms_opt(h, 0, 0).unwrap(), text)
//! };
//!
//! let alice = vec![msg(10, "hello"), msg(12, "bye")];
//! let bob = vec![msg(10, "hello"), msg(11, "lunch?")];
//!
//! let merged = merge_messages(&[&alice, &bob]);
//! let contents: Vec<_> = merged.iter().map(|m| m.content.as_str()).collect();
//! assert_eq!(contents, ["hello", "lunch?", "bye"]);
//! ```

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::models::MergedTranscript;
use crate::container::ImageAsset;
use crate::error::{QqMergeError, Result};
use crate::message::Message;
use crate::reader::ParsedSource;

/// Statistics about a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Number of merged sources
    pub sources: usize,
    /// Messages across all sources before merging
    pub input_messages: usize,
    /// Messages in the merged timeline
    pub merged_messages: usize,
    /// Incoming messages dropped as duplicates
    pub duplicates_removed: usize,
    /// Distinct images in the merged result
    pub images: usize,
}

impl MergeStats {
    /// Share of input messages that were duplicates, in percent.
    pub fn duplicate_ratio(&self) -> f64 {
        if self.input_messages == 0 {
            return 0.0;
        }
        self.duplicates_removed as f64 / self.input_messages as f64 * 100.0
    }
}

/// Merges parsed sources into one transcript.
///
/// The result borrows the image assets of `sources`, so their scratch
/// directories stay alive until it is dropped. The boundary of the first
/// source is kept for re-encoding.
///
/// # Errors
///
/// Returns [`QqMergeError::EmptySourceList`] if `sources` is empty.
pub fn merge(sources: &[ParsedSource]) -> Result<MergedTranscript<'_>> {
    let first = sources.first().ok_or(QqMergeError::EmptySourceList)?;

    let sequences: Vec<&[Message]> = sources.iter().map(ParsedSource::messages).collect();
    let input_messages = sequences.iter().map(|s| s.len()).sum();
    let messages = merge_messages(&sequences);
    let images = merge_images(sources.iter().map(|source| source.images().iter()));

    let stats = MergeStats {
        sources: sources.len(),
        input_messages,
        merged_messages: messages.len(),
        duplicates_removed: input_messages - messages.len(),
        images: images.len(),
    };
    debug!(?stats, "merged sources");

    Ok(MergedTranscript::new(messages, images, first.boundary()).with_stats(stats))
}

/// Merges message sequences, each already sorted by `(date, time)`.
///
/// Returns the chronological union with cross-sequence duplicates removed.
pub fn merge_messages(sequences: &[&[Message]]) -> Vec<Message> {
    let Some((seed, rest)) = sequences.split_first() else {
        return Vec::new();
    };

    let mut timeline: Vec<&Message> = seed.iter().collect();

    for sequence in rest {
        let mut cursor = 0;

        for message in *sequence {
            let key = message.key();
            while cursor < timeline.len() && timeline[cursor].key() < key {
                cursor += 1;
            }

            let mut end = cursor;
            let mut duplicate = false;
            while end < timeline.len() && timeline[end].key() == key {
                duplicate |= timeline[end].is_duplicate_of(message);
                end += 1;
            }

            if !duplicate {
                timeline.insert(end, message);
            }
        }
    }

    timeline.into_iter().cloned().collect()
}

/// Unions image sets, keeping the first asset seen for each filename.
pub fn merge_images<'a, I, S>(sets: I) -> Vec<&'a ImageAsset>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = &'a ImageAsset>,
{
    let mut seen = HashSet::new();
    sets.into_iter()
        .flatten()
        .filter(|asset| seen.insert(asset.filename()))
        .collect()
}
