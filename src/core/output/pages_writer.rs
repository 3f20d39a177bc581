//! Per-date HTML pages with a navigation index.

use std::fs;
use std::path::{Path, PathBuf};

use super::html_writer::{render_day, render_document};
use super::{OutputConfig, copy_transcript_images, escape_html};
use crate::container::HTML_FILE_NAME;
use crate::core::models::{DayGroup, MergedTranscript};
use crate::error::Result;

/// File name of the page holding one day, `YYYY-MM-DD.html`.
pub fn page_file_name(day: &DayGroup<'_>) -> String {
    format!("{}.html", day.date_display())
}

/// Writes one page per date plus an `index.html` linking them.
///
/// Each page links to the previous day, the index and the next day. Returns
/// the written paths, index first.
///
/// # Errors
///
/// Returns an I/O error if the directory or any file cannot be written.
pub fn write_pages(
    transcript: &MergedTranscript<'_>,
    out_dir: &Path,
    config: &OutputConfig,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let days = transcript.days();
    let mut written = Vec::with_capacity(days.len() + 1);

    let index = out_dir.join(HTML_FILE_NAME);
    fs::write(&index, render_index(&days, config))?;
    written.push(index);

    for (i, day) in days.iter().enumerate() {
        let prev = i.checked_sub(1).map(|j| &days[j]);
        let next = days.get(i + 1);

        let mut body = render_nav(prev, next);
        render_day(&mut body, day);
        body.push_str(&render_nav(prev, next));

        let title = format!("{} - {}", config.title, day.date_display());
        let path = out_dir.join(page_file_name(day));
        fs::write(&path, render_document(&title, &body))?;
        written.push(path);
    }

    copy_transcript_images(transcript, out_dir, config)?;
    Ok(written)
}

fn render_index(days: &[DayGroup<'_>], config: &OutputConfig) -> String {
    let mut body = format!("<div class=d>{}</div>\n<ul>\n", escape_html(&config.title));
    for day in days {
        body.push_str(&format!(
            "<li><a href='{}'>{}</a> ({} messages)</li>\n",
            page_file_name(day),
            day.date_display(),
            day.messages.len()
        ));
    }
    body.push_str("</ul>\n");
    render_document(&config.title, &body)
}

fn render_nav(prev: Option<&DayGroup<'_>>, next: Option<&DayGroup<'_>>) -> String {
    let mut nav = String::from("<div class=nav>");
    if let Some(day) = prev {
        nav.push_str(&format!(
            "<a href='{}'>&laquo; {}</a>",
            page_file_name(day),
            day.date_display()
        ));
    }
    nav.push_str(&format!("<a href='{HTML_FILE_NAME}'>Index</a>"));
    if let Some(day) = next {
        nav.push_str(&format!(
            "<a href='{}'>{} &raquo;</a>",
            page_file_name(day),
            day.date_display()
        ));
    }
    nav.push_str("</div>\n");
    nav
}
