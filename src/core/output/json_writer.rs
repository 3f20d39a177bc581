//! JSON output writer.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{OutputConfig, copy_transcript_images};
use crate::core::merge::MergeStats;
use crate::core::models::MergedTranscript;
use crate::error::Result;
use crate::message::{Identity, Message};

/// Name of the document written by [`write_json`].
pub const JSON_FILE_NAME: &str = "transcript.json";

#[derive(Serialize)]
struct JsonTranscript<'t> {
    title: &'t str,
    stats: MergeStats,
    messages: Vec<JsonMessage<'t>>,
    images: Vec<JsonImage>,
}

/// Message with its display labels precomputed.
#[derive(Serialize)]
struct JsonMessage<'t> {
    account: String,
    nickname: &'t str,
    identity: &'t Identity,
    timestamp: String,
    date: u32,
    time: u32,
    content: &'t str,
}

impl<'t> JsonMessage<'t> {
    fn from_message(msg: &'t Message) -> Self {
        Self {
            account: msg.account_display(),
            nickname: &msg.nickname,
            identity: &msg.identity,
            timestamp: msg.timestamp_display(),
            date: msg.date,
            time: msg.time,
            content: &msg.content,
        }
    }
}

#[derive(Serialize)]
struct JsonImage {
    filename: String,
    path: String,
}

/// Converts the transcript to a pretty-printed JSON document.
///
/// # Format
/// ```json
/// {
///   "title": "QQ Group Chat",
///   "stats": {"sources": 2, "input_messages": 3, ...},
///   "messages": [
///     {"account": "张三(111)", "nickname": "张三",
///      "identity": {"kind": "number", "value": "111"},
///      "timestamp": "2012-04-11 12:00:00", "date": 20120411, "time": 120000,
///      "content": "hi"}
///   ],
///   "images": [{"filename": "<hash>.jpg", "path": "images/<hash>.jpg"}]
/// }
/// ```
///
/// # Errors
///
/// Returns [`QqMergeError::Json`](crate::QqMergeError::Json) if serialization fails.
pub fn to_json(transcript: &MergedTranscript<'_>, config: &OutputConfig) -> Result<String> {
    let document = JsonTranscript {
        title: &config.title,
        stats: transcript.stats,
        messages: transcript
            .messages
            .iter()
            .map(JsonMessage::from_message)
            .collect(),
        images: transcript
            .images
            .iter()
            .map(|asset| JsonImage {
                filename: asset.filename(),
                path: asset.relative_path(),
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&document)?)
}

/// Writes `transcript.json` into `out_dir` and copies the images next to it.
///
/// # Errors
///
/// Returns an error if serialization or any file operation fails.
pub fn write_json(
    transcript: &MergedTranscript<'_>,
    out_dir: &Path,
    config: &OutputConfig,
) -> Result<PathBuf> {
    let json = to_json(transcript, config)?;
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(JSON_FILE_NAME);
    let mut file = File::create(&path)?;
    file.write_all(json.as_bytes())?;
    copy_transcript_images(transcript, out_dir, config)?;
    Ok(path)
}
