//! Combined HTML output writer.

use std::fs;
use std::path::{Path, PathBuf};

use super::{OutputConfig, copy_transcript_images, escape_html};
use crate::container::HTML_FILE_NAME;
use crate::core::models::{DayGroup, MergedTranscript};
use crate::error::Result;
use crate::message::Message;

/// Stylesheet shared by all rendered pages.
///
/// - `.d` date heading
/// - `.u` account and timestamp line
/// - `.c` message content
pub const STYLESHEET: &str = "body { font-size: 12px;}
div { padding: 2px; }
.u { color: #006EFE; }
.c { padding-left: 15px; font-size: 14px;}
.d { font-size: 38px; font-weight: bold; line-height: 55px; border-bottom: 2px solid #CCC; margin-bottom: 10px; }
.nav { margin: 10px 0; }
.nav a { margin-right: 15px; }";

/// Renders the whole transcript as one HTML document.
///
/// # Format
/// ```html
/// <div class=d>2012-04-11</div>
/// <div>
/// <div class=u>张三(111) 2012-04-11 12:00:00</div>
/// <div class=c>hi</div>
/// </div>
/// ```
pub fn to_html(transcript: &MergedTranscript<'_>, config: &OutputConfig) -> String {
    let mut body = String::new();
    for day in transcript.days() {
        render_day(&mut body, &day);
    }
    render_document(&config.title, &body)
}

/// Writes `index.html` into `out_dir` and copies the images next to it.
///
/// Returns the path of the written document.
///
/// # Errors
///
/// Returns an I/O error if the directory or any file cannot be written.
pub fn write_html(
    transcript: &MergedTranscript<'_>,
    out_dir: &Path,
    config: &OutputConfig,
) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(HTML_FILE_NAME);
    fs::write(&path, to_html(transcript, config))?;
    copy_transcript_images(transcript, out_dir, config)?;
    Ok(path)
}

/// Wraps `body` in the document skeleton.
pub(super) fn render_document(title: &str, body: &str) -> String {
    format!(
        "<html>\n<head>\n\
         <meta http-equiv='Content-Type' content='text/html; charset=UTF-8' />\n\
         <title>{}</title>\n\
         <style>\n{STYLESHEET}\n</style></head>\n\
         <body>\n{body}</body></html>\n",
        escape_html(title)
    )
}

/// Appends a date heading followed by the day's messages.
pub(super) fn render_day(out: &mut String, day: &DayGroup<'_>) {
    out.push_str("<div class=d>");
    out.push_str(&day.date_display());
    out.push_str("</div>\n");
    for message in day.messages {
        render_message(out, message);
    }
}

fn render_message(out: &mut String, message: &Message) {
    out.push_str("<div>\n<div class=u>");
    out.push_str(&escape_html(&message.account_display()));
    out.push(' ');
    out.push_str(&message.timestamp_display());
    out.push_str("</div>\n<div class=c>");
    out.push_str(&message.content);
    out.push_str("</div>\n</div>\n");
}
