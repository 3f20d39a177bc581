//! MHT output writer.
//!
//! Packs the combined HTML document and every image into one archive in the
//! same container layout the exporter uses, so the result can be opened by
//! the same viewers and read back by [`ContainerParser`](crate::container::ContainerParser).

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{OutputConfig, to_html};
use crate::core::models::MergedTranscript;
use crate::error::Result;

/// Name of the archive written by [`write_mht`].
pub const MHT_FILE_NAME: &str = "merged.mht";

/// Base64 line length inside image parts.
const LINE_WIDTH: usize = 76;

/// Renders the transcript as an MHT archive.
///
/// # Format
/// ```text
/// From: <Save by Tencent MsgMgr>
/// Subject: Tencent IM Message
/// MIME-Version: 1.0
/// Content-Type:multipart/related;
///     charset="utf-8"
///     type="text/html";
///     boundary="<token>"
///
/// --<token>
/// Content-Type:text/html
/// ...
/// --<token>
/// Content-Type:image/jpg
/// Content-Transfer-Encoding:base64
/// Content-Location:images/<hash>.jpg
///
/// <base64>
///
/// --<token>--
/// ```
///
/// Blank lines are removed from the HTML part since a blank line ends a part.
///
/// # Errors
///
/// Returns an I/O error if an image cannot be read from its scratch path.
pub fn to_mht(transcript: &MergedTranscript<'_>, config: &OutputConfig) -> Result<String> {
    let boundary = &transcript.boundary;
    let mut out = String::new();

    let _ = write!(
        out,
        "From: <Save by Tencent MsgMgr>\n\
         Subject: Tencent IM Message\n\
         MIME-Version: 1.0\n\
         Content-Type:multipart/related;\n\
         \tcharset=\"utf-8\"\n\
         \ttype=\"text/html\";\n\
         \tboundary=\"{boundary}\"\n\
         \n\
         --{boundary}\n\
         Content-Type:text/html\n\
         Content-Transfer-Encoding:7bit\n\
         \n"
    );

    for line in to_html(transcript, config)
        .lines()
        .filter(|line| !line.trim().is_empty())
    {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');

    for asset in &transcript.images {
        let bytes = fs::read(&asset.path)?;
        let _ = write!(
            out,
            "--{boundary}\n\
             Content-Type:image/{}\n\
             Content-Transfer-Encoding:base64\n\
             Content-Location:{}\n\
             \n",
            asset.extension,
            asset.relative_path()
        );
        let encoded = STANDARD.encode(bytes);
        for chunk in encoded.as_bytes().chunks(LINE_WIDTH) {
            // base64 output is ASCII
            out.push_str(&String::from_utf8_lossy(chunk));
            out.push('\n');
        }
        out.push('\n');
    }

    let _ = writeln!(out, "--{boundary}--");
    Ok(out)
}

/// Writes `merged.mht` into `out_dir`.
///
/// Returns the path of the written archive.
///
/// # Errors
///
/// Returns an I/O error if an image cannot be read or the archive cannot be
/// written.
pub fn write_mht(
    transcript: &MergedTranscript<'_>,
    out_dir: &Path,
    config: &OutputConfig,
) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(MHT_FILE_NAME);
    fs::write(&path, to_mht(transcript, config)?)?;
    Ok(path)
}
