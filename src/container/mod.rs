//! Parser for the multipart-in-text archive format.
//!
//! A QQ message manager export (`.mht`) bundles one HTML transcript with the
//! images it references:
//!
//! ```text
//! Content-Type:multipart/related;
//!     boundary="----=_NextPart_ABC"
//!
//! ------=_NextPart_ABC
//! Content-Type:text/html
//! Content-Transfer-Encoding:7bit
//!
//! <html>...<table>...
//! </table></body></html>
//! ------=_NextPart_ABC
//! Content-Type:image/jpeg
//! Content-Transfer-Encoding:base64
//! Content-Location:{3D48C238-CD47-4d17-9C8F-3593C6D4738B}.dat
//!
//! /9j/4AAQSkZJRgABAQEAYABgAAD...
//!
//! ------=_NextPart_ABC--
//! ```
//!
//! [`ContainerParser`] walks the file line by line. After locating the
//! boundary declaration it runs a three-state machine per part
//! ([`PartState`]): wait for a delimiter, collect header lines, collect body
//! lines. The HTML body is written to the scratch directory as `index.html`;
//! image bodies are decoded and stored under their content hash.

mod images;

pub use images::{ImageAsset, ImageMap};

use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::DEFAULT_END_MARKER;
use crate::error::{QqMergeError, Result};
use crate::hash::{content_hash, image_extension};

/// File name of the extracted transcript inside a scratch directory.
pub const HTML_FILE_NAME: &str = "index.html";

static BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"boundary="([^"]*)""#).expect("valid boundary pattern"));

/// Result of splitting one archive.
#[derive(Debug)]
pub struct Container {
    /// Token separating the parts
    pub boundary: String,
    /// Extracted transcript, if the archive had an HTML part
    pub html: Option<PathBuf>,
    /// Decoded images by location key
    pub images: ImageMap,
}

/// Position of the parser within the current part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartState {
    /// Waiting for a `--<boundary>` line
    Scanning,
    /// Reading `Name: value` lines until a blank line
    Header,
    /// Reading body lines until a blank line or the end marker
    Body,
}

#[derive(Debug, Default)]
struct PendingPart {
    content_type: Option<String>,
    transfer_encoding: Option<String>,
    location: Option<String>,
    body: Vec<String>,
}

impl PendingPart {
    fn set_header(&mut self, line: &str) {
        let Some((name, value)) = line.split_once(':') else {
            return;
        };
        let value = value.trim().to_string();
        let name = name.trim();

        if name.eq_ignore_ascii_case("Content-Type") {
            self.content_type = Some(value);
        } else if name.eq_ignore_ascii_case("Content-Transfer-Encoding") {
            self.transfer_encoding = Some(value);
        } else if name.eq_ignore_ascii_case("Content-Location") {
            self.location = Some(value);
        }
    }
}

/// Splits an archive into its HTML transcript and decoded images.
///
/// # Example
///
/// ```rust
/// use qqmerge::container::ContainerParser;
///
/// let archive = "boundary=\"X\"\n--X\nContent-Type:text/html\n\n<html><table>\n</table></body></html>\n";
/// let scratch = tempfile::tempdir()?;
///
/// let container = ContainerParser::new(scratch.path()).parse(archive.as_bytes())?;
/// assert_eq!(container.boundary, "X");
/// assert!(container.html.is_some());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ContainerParser {
    scratch: PathBuf,
    end_marker: String,
}

impl ContainerParser {
    /// Creates a parser writing its output into `scratch`.
    pub fn new(scratch: impl Into<PathBuf>) -> Self {
        Self {
            scratch: scratch.into(),
            end_marker: DEFAULT_END_MARKER.to_string(),
        }
    }

    /// Sets the line that terminates the HTML part.
    #[must_use]
    pub fn with_end_marker(mut self, marker: impl Into<String>) -> Self {
        self.end_marker = marker.into();
        self
    }

    /// Parses the archive read from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`QqMergeError::MalformedContainer`] if no boundary is declared,
    /// or [`QqMergeError::Io`] if reading or writing scratch files fails.
    /// Undecodable images are logged and skipped.
    pub fn parse<R: BufRead>(&self, mut reader: R) -> Result<Container> {
        let mut lines = LineReader::new(&mut reader);

        let boundary = find_boundary(&mut lines)?
            .ok_or_else(|| QqMergeError::malformed_container(None))?;
        debug!(boundary = %boundary, "found container boundary");

        let mut machine = PartMachine::new(&self.scratch, &boundary, &self.end_marker);
        while let Some(line) = lines.next_line()? {
            machine.feed(&line)?;
        }
        machine.finish()?;

        Ok(Container {
            boundary,
            html: machine.html,
            images: machine.images,
        })
    }
}

/// Scans forward for the first `boundary="..."` declaration.
fn find_boundary<R: BufRead>(lines: &mut LineReader<'_, R>) -> Result<Option<String>> {
    while let Some(line) = lines.next_line()? {
        if let Some(caps) = BOUNDARY_RE.captures(&line) {
            return Ok(Some(caps[1].to_string()));
        }
    }
    Ok(None)
}

/// Reads trimmed lines, replacing invalid UTF-8.
struct LineReader<'r, R: BufRead> {
    reader: &'r mut R,
    buffer: Vec<u8>,
}

impl<'r, R: BufRead> LineReader<'r, R> {
    fn new(reader: &'r mut R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(4096),
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        self.buffer.clear();
        if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&self.buffer).trim().to_string()))
    }
}

struct PartMachine<'a> {
    scratch: &'a Path,
    delimiter: String,
    end_marker: &'a str,
    state: PartState,
    part: PendingPart,
    html: Option<PathBuf>,
    images: ImageMap,
}

impl<'a> PartMachine<'a> {
    fn new(scratch: &'a Path, boundary: &str, end_marker: &'a str) -> Self {
        Self {
            scratch,
            delimiter: format!("--{boundary}"),
            end_marker,
            state: PartState::Scanning,
            part: PendingPart::default(),
            html: None,
            images: ImageMap::new(),
        }
    }

    fn feed(&mut self, line: &str) -> Result<()> {
        self.state = match self.state {
            PartState::Scanning => self.on_scanning(line),
            PartState::Header => self.on_header(line),
            PartState::Body => self.on_body(line)?,
        };
        Ok(())
    }

    fn on_scanning(&mut self, line: &str) -> PartState {
        if line == self.delimiter {
            self.part = PendingPart::default();
            PartState::Header
        } else {
            PartState::Scanning
        }
    }

    fn on_header(&mut self, line: &str) -> PartState {
        if line.is_empty() {
            PartState::Body
        } else {
            self.part.set_header(line);
            PartState::Header
        }
    }

    fn on_body(&mut self, line: &str) -> Result<PartState> {
        // The HTML part is not followed by a blank line, only by its closing tags.
        if line.is_empty() || line == self.end_marker {
            self.complete_part()?;
            Ok(PartState::Scanning)
        } else {
            self.part.body.push(line.to_string());
            Ok(PartState::Body)
        }
    }

    /// Flushes a part that was still open at end of stream.
    fn finish(&mut self) -> Result<()> {
        if self.state == PartState::Body {
            debug!("container ended inside a part body");
            self.complete_part()?;
            self.state = PartState::Scanning;
        }
        Ok(())
    }

    fn complete_part(&mut self) -> Result<()> {
        let part = std::mem::take(&mut self.part);
        let content_type = part.content_type.as_deref().unwrap_or_default();
        let media_type = content_type.split(';').next().unwrap_or_default().trim();

        if media_type.eq_ignore_ascii_case("text/html") {
            let path = self.scratch.join(HTML_FILE_NAME);
            fs::write(&path, part.body.join("\n"))?;
            if self.html.is_some() {
                debug!("second text/html part replaces the first");
            }
            self.html = Some(path);
        } else if let Some(subtype) = strip_prefix_ignore_case(content_type, "image/") {
            let extension = image_extension(subtype);
            match self.store_image(&part, extension) {
                Ok(Some(asset)) => self.images.insert(asset),
                Ok(None) => {}
                Err(e) if e.is_recoverable() => warn!(error = %e, "dropping image part"),
                Err(e) => return Err(e),
            }
        } else {
            debug!(content_type, "ignoring part");
        }
        Ok(())
    }

    fn store_image(&self, part: &PendingPart, extension: String) -> Result<Option<ImageAsset>> {
        let Some(location) = part.location.clone() else {
            warn!("dropping image part without Content-Location");
            return Ok(None);
        };
        if let Some(encoding) = part.transfer_encoding.as_deref() {
            if !encoding.eq_ignore_ascii_case("base64") {
                debug!(location = %location, encoding, "image part is not declared base64");
            }
        }

        let encoded: String = part
            .body
            .concat()
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| QqMergeError::image_decode(location.clone(), e))?;

        let asset = ImageAsset::new(location, content_hash(&bytes), extension, self.scratch);
        if !asset.path.exists() {
            fs::write(&asset.path, &bytes)?;
        }
        debug!(location = %asset.location, file = %asset.filename(), "stored image");
        Ok(Some(asset))
    }
}

fn strip_prefix_ignore_case<'s>(s: &'s str, prefix: &str) -> Option<&'s str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PIXEL: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-bytes";

    fn encoded(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    fn archive(parts: &str) -> String {
        format!(
            "From: <Save by Tencent MsgMgr>\nContent-Type:multipart/related;\n\tcharset=\"utf-8\"\n\ttype=\"text/html\";\n\tboundary=\"----=_NextPart_X\"\n\n{parts}\n------=_NextPart_X--\n"
        )
    }

    fn html_part(body: &str) -> String {
        format!(
            "------=_NextPart_X\nContent-Type:text/html\nContent-Transfer-Encoding:7bit\n\n{body}\n</table></body></html>\n"
        )
    }

    fn image_part(content_type: &str, location: &str, body: &str) -> String {
        format!(
            "------=_NextPart_X\nContent-Type:{content_type}\nContent-Transfer-Encoding:base64\nContent-Location:{location}\n\n{body}\n\n"
        )
    }

    #[test]
    fn test_missing_boundary_is_malformed() {
        let dir = tempdir().unwrap();
        let err = ContainerParser::new(dir.path())
            .parse("Subject: nothing here\n\n<html></html>\n".as_bytes())
            .unwrap_err();
        assert!(err.is_malformed_container());
    }

    #[test]
    fn test_first_boundary_wins() {
        let dir = tempdir().unwrap();
        let input = "boundary=\"A\"\nboundary=\"B\"\n--A\nContent-Type:text/html\n\n<p>x</p>\n\n";
        let container = ContainerParser::new(dir.path()).parse(input.as_bytes()).unwrap();
        assert_eq!(container.boundary, "A");
        assert!(container.html.is_some());
    }

    #[test]
    fn test_html_part_ends_at_end_marker() {
        let dir = tempdir().unwrap();
        let input = archive(&html_part("<html><body><table>\n<tr><td>a</td></tr>"));
        let container = ContainerParser::new(dir.path()).parse(input.as_bytes()).unwrap();

        let html = fs::read_to_string(container.html.unwrap()).unwrap();
        assert_eq!(html, "<html><body><table>\n<tr><td>a</td></tr>");
    }

    #[test]
    fn test_second_html_part_wins() {
        let dir = tempdir().unwrap();
        let parts = format!("{}{}", html_part("<p>first</p>"), html_part("<p>second</p>"));
        let container = ContainerParser::new(dir.path())
            .parse(archive(&parts).as_bytes())
            .unwrap();

        let html = fs::read_to_string(container.html.unwrap()).unwrap();
        assert!(html.contains("second"));
        assert!(!html.contains("first"));
    }

    #[test]
    fn test_jpeg_image_is_content_addressed() {
        let dir = tempdir().unwrap();
        let parts = image_part("image/jpeg", "img1.dat", &encoded(PIXEL));
        let container = ContainerParser::new(dir.path())
            .parse(archive(&parts).as_bytes())
            .unwrap();

        let expected = format!("{}.jpg", content_hash(PIXEL));
        assert_eq!(container.images.filename("img1.dat"), Some(expected.clone()));
        assert_eq!(fs::read(dir.path().join(expected)).unwrap(), PIXEL);
    }

    #[test]
    fn test_multiline_base64_body() {
        let dir = tempdir().unwrap();
        let text = encoded(PIXEL);
        let (a, b) = text.split_at(8);
        let parts = image_part("image/gif", "{G}.dat", &format!("{a}\n{b}"));
        let container = ContainerParser::new(dir.path())
            .parse(archive(&parts).as_bytes())
            .unwrap();

        let asset = container.images.get("{G}.dat").unwrap();
        assert_eq!(asset.extension, "gif");
        assert_eq!(fs::read(&asset.path).unwrap(), PIXEL);
    }

    #[test]
    fn test_bad_base64_drops_only_that_image() {
        let dir = tempdir().unwrap();
        let parts = format!(
            "{}{}",
            image_part("image/png", "bad.dat", "%%%not base64%%%"),
            image_part("image/png", "good.dat", &encoded(PIXEL))
        );
        let container = ContainerParser::new(dir.path())
            .parse(archive(&parts).as_bytes())
            .unwrap();

        assert_eq!(container.images.len(), 1);
        assert!(container.images.get("bad.dat").is_none());
        assert!(container.images.get("good.dat").is_some());
    }

    #[test]
    fn test_image_without_location_is_dropped() {
        let dir = tempdir().unwrap();
        let parts = format!(
            "------=_NextPart_X\nContent-Type:image/png\n\n{}\n\n",
            encoded(PIXEL)
        );
        let container = ContainerParser::new(dir.path())
            .parse(archive(&parts).as_bytes())
            .unwrap();
        assert!(container.images.is_empty());
    }

    #[test]
    fn test_identical_images_share_a_file() {
        let dir = tempdir().unwrap();
        let parts = format!(
            "{}{}",
            image_part("image/jpeg", "a.dat", &encoded(PIXEL)),
            image_part("image/jpeg", "b.dat", &encoded(PIXEL))
        );
        let container = ContainerParser::new(dir.path())
            .parse(archive(&parts).as_bytes())
            .unwrap();

        assert_eq!(container.images.len(), 2);
        assert_eq!(
            container.images.filename("a.dat"),
            container.images.filename("b.dat")
        );
    }

    #[test]
    fn test_other_content_types_are_ignored() {
        let dir = tempdir().unwrap();
        let parts = "------=_NextPart_X\nContent-Type:text/plain\n\nhello\n\n";
        let container = ContainerParser::new(dir.path())
            .parse(archive(parts).as_bytes())
            .unwrap();
        assert!(container.html.is_none());
        assert!(container.images.is_empty());
    }

    #[test]
    fn test_truncated_final_part_is_flushed() {
        let dir = tempdir().unwrap();
        let input = "boundary=\"X\"\n--X\nContent-Type:text/html\n\n<table><tr><td>x</td></tr>";
        let container = ContainerParser::new(dir.path()).parse(input.as_bytes()).unwrap();
        let html = fs::read_to_string(container.html.unwrap()).unwrap();
        assert!(html.contains("<td>x</td>"));
    }

    #[test]
    fn test_crlf_lines_and_case_insensitive_headers() {
        let dir = tempdir().unwrap();
        let input = format!(
            "boundary=\"X\"\r\n--X\r\ncontent-type: image/JPEG\r\ncontent-location: c.dat\r\n\r\n{}\r\n\r\n",
            encoded(PIXEL)
        );
        let container = ContainerParser::new(dir.path()).parse(input.as_bytes()).unwrap();
        let asset = container.images.get("c.dat").unwrap();
        assert_eq!(asset.extension, "jpg");
    }

    #[test]
    fn test_custom_end_marker() {
        let dir = tempdir().unwrap();
        let input = "boundary=\"X\"\n--X\nContent-Type:text/html\n\n<p>a</p>\n</html>\n<p>after</p>\n";
        let container = ContainerParser::new(dir.path())
            .with_end_marker("</html>")
            .parse(input.as_bytes())
            .unwrap();
        let html = fs::read_to_string(container.html.unwrap()).unwrap();
        assert_eq!(html, "<p>a</p>");
    }

    #[test]
    fn test_strip_prefix_ignore_case() {
        assert_eq!(strip_prefix_ignore_case("Image/png", "image/"), Some("png"));
        assert_eq!(strip_prefix_ignore_case("text/html", "image/"), None);
        assert_eq!(strip_prefix_ignore_case("img", "image/"), None);
    }
}
