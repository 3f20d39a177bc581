//! CSV output writer.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use super::{OutputConfig, copy_transcript_images};
use crate::core::models::MergedTranscript;
use crate::error::Result;

/// Name of the document written by [`write_csv`].
pub const CSV_FILE_NAME: &str = "transcript.csv";

const HEADER: [&str; 3] = ["Timestamp", "Account", "Content"];

/// Writes `transcript.csv` into `out_dir` and copies the images next to it.
///
/// # Format
/// - Delimiter: `;`
/// - Columns: `Timestamp`, `Account`, `Content`
/// - Encoding: UTF-8
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn write_csv(
    transcript: &MergedTranscript<'_>,
    out_dir: &Path,
    config: &OutputConfig,
) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(CSV_FILE_NAME);
    let file = File::create(&path)?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(file);

    writer.write_record(HEADER)?;
    for msg in &transcript.messages {
        writer.write_record([
            msg.timestamp_display(),
            msg.account_display(),
            msg.content.clone(),
        ])?;
    }
    writer.flush()?;

    copy_transcript_images(transcript, out_dir, config)?;
    Ok(path)
}

/// Converts the transcript to a CSV string.
///
/// Same format as [`write_csv`], without touching the file system.
///
/// # Errors
///
/// Returns an error if CSV encoding fails.
pub fn to_csv(transcript: &MergedTranscript<'_>) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for msg in &transcript.messages {
        writer.write_record([
            msg.timestamp_display(),
            msg.account_display(),
            msg.content.clone(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
