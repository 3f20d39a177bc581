//! Reading one archive into a self-contained [`ParsedSource`].
//!
//! [`SourceReader::parse`] runs the full per-file pipeline:
//!
//! 1. create a private scratch directory,
//! 2. split the archive into its HTML and image parts ([`ContainerParser`]),
//! 3. extract, sort and normalize the messages ([`extract_messages`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use qqmerge::reader::SourceReader;
//!
//! let reader = SourceReader::new();
//! let source = reader.parse("group-alice.mht".as_ref())?;
//! println!("{} messages, {} images", source.messages().len(), source.images().len());
//! source.cleanup()?;
//! # Ok::<(), qqmerge::QqMergeError>(())
//! ```

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};

use crate::config::ReaderConfig;
use crate::container::{ContainerParser, ImageMap};
use crate::error::{QqMergeError, Result};
use crate::message::Message;
use crate::transcript::extract_messages;

/// Parses archive files one at a time.
#[derive(Debug, Clone, Default)]
pub struct SourceReader {
    config: ReaderConfig,
}

impl SourceReader {
    /// Creates a reader with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader with custom configuration.
    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Parses the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`QqMergeError::SourceIo`] if the file cannot be read and
    /// [`QqMergeError::MalformedContainer`] if it has no boundary. Both carry
    /// `path`. Bad images and bad cells are logged and skipped.
    pub fn parse(&self, path: &Path) -> Result<ParsedSource> {
        self.parse_inner(path).map_err(|e| e.with_path(path))
    }

    fn parse_inner(&self, path: &Path) -> Result<ParsedSource> {
        let scratch = self.create_scratch()?;
        debug!(source = %path.display(), scratch = %scratch.path().display(), "parsing source");

        let file = File::open(path)?;
        let reader = BufReader::with_capacity(self.config.buffer_size, file);
        let container = ContainerParser::new(scratch.path())
            .with_end_marker(self.config.end_marker.as_str())
            .parse(reader)?;

        let messages = match &container.html {
            Some(html_path) => {
                let html = fs::read_to_string(html_path)?;
                extract_messages(&html, &container.images, &self.config)
            }
            None => Vec::new(),
        };

        info!(
            source = %path.display(),
            messages = messages.len(),
            images = container.images.len(),
            "parsed source"
        );

        Ok(ParsedSource {
            path: path.to_path_buf(),
            boundary: container.boundary,
            messages,
            images: container.images,
            scratch,
        })
    }

    fn create_scratch(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("qqmerge-");
        let dir = match &self.config.scratch_root {
            Some(root) => {
                fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }
}

/// The parse result of one archive.
///
/// Image paths point into a scratch directory owned by this value. The
/// directory is removed by [`cleanup`](Self::cleanup) or, failing that, on
/// drop.
#[derive(Debug)]
pub struct ParsedSource {
    path: PathBuf,
    boundary: String,
    messages: Vec<Message>,
    images: ImageMap,
    scratch: TempDir,
}

impl ParsedSource {
    /// Path of the archive this source was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Boundary token declared by the archive.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Messages sorted by `(date, time)` with normalized content.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn images(&self) -> &ImageMap {
        &self.images
    }

    /// Directory holding the decoded images.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Deletes the scratch directory.
    ///
    /// # Errors
    ///
    /// Returns [`QqMergeError::SourceIo`] if the directory cannot be removed.
    pub fn cleanup(self) -> Result<()> {
        let path = self.path;
        self.scratch
            .close()
            .map_err(|e| QqMergeError::source_io(path, e))
    }
}

/// Parses every path in `paths`, in order.
///
/// With `config.parallel` set (and the `parallel` feature enabled) sources
/// are parsed concurrently; results still come back in input order.
pub fn read_sources<P: AsRef<Path> + Sync>(
    paths: &[P],
    config: &ReaderConfig,
) -> Vec<Result<ParsedSource>> {
    let reader = SourceReader::with_config(config.clone());

    #[cfg(feature = "parallel")]
    if config.parallel {
        use rayon::prelude::*;
        return paths
            .par_iter()
            .map(|path| reader.parse(path.as_ref()))
            .collect();
    }

    paths.iter().map(|path| reader.parse(path.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use tempfile::tempdir;

    use super::*;
    use crate::hash::content_hash;

    fn archive(boundary: &str, cells: &str, image: Option<(&str, &[u8])>) -> String {
        let mut text = format!(
            "From: <Save by Tencent MsgMgr>\n\
             Content-Type:multipart/related;\n\
             \tcharset=\"utf-8\"\n\
             \ttype=\"text/html\";\n\
             \tboundary=\"{boundary}\"\n\
             \n\
             --{boundary}\n\
             Content-Type:text/html\n\
             Content-Transfer-Encoding:7bit\n\
             \n\
             <html><body><table>\n\
             {cells}\n\
             </table></body></html>\n"
        );
        if let Some((location, bytes)) = image {
            text.push_str(&format!(
                "--{boundary}\n\
                 Content-Type:image/jpeg\n\
                 Content-Transfer-Encoding:base64\n\
                 Content-Location:{location}\n\
                 \n\
                 {}\n\
                 \n",
                STANDARD.encode(bytes)
            ));
        }
        text.push_str(&format!("--{boundary}--\n"));
        text
    }

    fn write_archive(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const CELLS: &str = "<tr><td style=color:#3568BB;>日期: 2012/4/11</td></tr>\
        <tr><td><div style=color:#006EFE;padding-left:10px;><div>张三(111)</div>12:00:00</div>\
        <div style=padding-left:20px;><font color='red'>hi <IMG src=\"img1.dat\"></font></div></td></tr>";

    #[test]
    fn test_parse_source() {
        let dir = tempdir().unwrap();
        let path = write_archive(
            dir.path(),
            "a.mht",
            &archive("X", CELLS, Some(("img1.dat", b"picture"))),
        );

        let config = ReaderConfig::new().with_scratch_root(dir.path().join("scratch"));
        let source = SourceReader::with_config(config).parse(&path).unwrap();

        assert_eq!(source.path(), path);
        assert_eq!(source.boundary(), "X");
        assert_eq!(source.messages().len(), 1);
        assert_eq!(source.images().len(), 1);

        let filename = format!("{}.jpg", content_hash(b"picture"));
        assert_eq!(
            source.messages()[0].content,
            format!("hi <img src=\"images/{filename}\">")
        );
        assert!(source.scratch_dir().join(&filename).exists());
        assert!(source.scratch_dir().starts_with(dir.path().join("scratch")));
    }

    #[test]
    fn test_cleanup_removes_scratch() {
        let dir = tempdir().unwrap();
        let path = write_archive(dir.path(), "a.mht", &archive("X", CELLS, None));

        let source = SourceReader::new().parse(&path).unwrap();
        let scratch = source.scratch_dir().to_path_buf();
        assert!(scratch.exists());

        source.cleanup().unwrap();
        assert!(!scratch.exists());
    }

    #[test]
    fn test_drop_removes_scratch() {
        let dir = tempdir().unwrap();
        let path = write_archive(dir.path(), "a.mht", &archive("X", CELLS, None));

        let scratch = {
            let source = SourceReader::new().parse(&path).unwrap();
            source.scratch_dir().to_path_buf()
        };
        assert!(!scratch.exists());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = SourceReader::new()
            .parse(Path::new("/nonexistent/a.mht"))
            .unwrap_err();
        assert!(matches!(err, QqMergeError::SourceIo { .. }));
        assert!(err.to_string().contains("/nonexistent/a.mht"));
    }

    #[test]
    fn test_malformed_container_reports_path() {
        let dir = tempdir().unwrap();
        let path = write_archive(dir.path(), "bad.mht", "no boundary here\n");

        let err = SourceReader::new().parse(&path).unwrap_err();
        assert!(err.is_malformed_container());
        assert!(err.to_string().contains("bad.mht"));
    }

    #[test]
    fn test_archive_without_html_has_no_messages() {
        let dir = tempdir().unwrap();
        let path = write_archive(dir.path(), "a.mht", "boundary=\"X\"\n--X--\n");

        let source = SourceReader::new().parse(&path).unwrap();
        assert!(source.messages().is_empty());
    }

    #[test]
    fn test_read_sources_keeps_order() {
        let dir = tempdir().unwrap();
        let a = write_archive(dir.path(), "a.mht", &archive("A", CELLS, None));
        let b = write_archive(dir.path(), "b.mht", "garbage\n");
        let c = write_archive(dir.path(), "c.mht", &archive("C", CELLS, None));

        for parallel in [false, true] {
            let config = ReaderConfig::new().with_parallel(parallel);
            let results = read_sources(&[&a, &b, &c], &config);

            assert_eq!(results.len(), 3);
            assert_eq!(results[0].as_ref().unwrap().boundary(), "A");
            assert!(results[1].is_err());
            assert_eq!(results[2].as_ref().unwrap().boundary(), "C");
        }
    }
}
