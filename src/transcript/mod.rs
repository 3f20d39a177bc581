//! Extraction of chat messages from the HTML transcript.
//!
//! The transcript is a table with one row per cell. Two kinds of cells carry
//! information:
//!
//! ```text
//! <td style=...>日期: 2012/4/11</td>
//!
//! <td><div style=color:#006EFE;padding-left:10px;>
//!       <div style=float:left;margin-right:6px;>风自由(23246779)</div>12:28:18
//!     </div>
//!     <div style=padding-left:20px;><font ...>message body</font></div></td>
//! ```
//!
//! A date cell sets the date for every message cell that follows it. Cells
//! that fit neither shape are ignored.
//!
//! # Example
//!
//! ```rust
//! use qqmerge::config::ReaderConfig;
//! use qqmerge::transcript::TranscriptExtractor;
//!
//! let html = "<table>\
//!     <tr><td style=x>日期: 2012/4/11</td></tr>\
//!     <tr><td><div style=color:#006EFE;padding-left:10px;>\
//!     <div>张三(111)</div>12:00:00</div><div>hi</div></td></tr></table>";
//!
//! let messages = TranscriptExtractor::new(&ReaderConfig::default()).extract(html);
//! assert_eq!(messages.len(), 1);
//! assert_eq!(messages[0].date, 20120411);
//! ```

mod labels;
mod normalize;

pub use labels::{
    parse_date_label, parse_identity_label, parse_time_label, split_identity_label, unescape_label,
};
pub use normalize::normalize_content;

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};

use crate::config::ReaderConfig;
use crate::container::ImageMap;
use crate::error::{QqMergeError, Result};
use crate::message::{Identity, Message};

static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("static selector is valid"));

/// What a single `td` cell turned out to be.
enum Cell {
    Date(NaiveDate),
    Message {
        nickname: String,
        identity: Identity,
        time: NaiveTime,
        body: String,
    },
    Other,
}

/// Turns transcript HTML into messages.
#[derive(Debug, Clone)]
pub struct TranscriptExtractor {
    date_label: String,
    message_indent: String,
}

impl TranscriptExtractor {
    /// Creates an extractor using the labels from `config`.
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            date_label: config.date_label.clone(),
            message_indent: config.message_indent.clone(),
        }
    }

    /// Extracts messages in document order.
    ///
    /// Cells with an unparseable date or time, and message cells that appear
    /// before any date, are logged and skipped. Message bodies are returned
    /// unmodified.
    pub fn extract(&self, html: &str) -> Vec<Message> {
        let document = Html::parse_document(html);
        let mut current_date: Option<NaiveDate> = None;
        let mut messages = Vec::new();
        let mut skipped = 0usize;

        for td in document.select(&CELL_SELECTOR) {
            match self.read_cell(td) {
                Ok(Cell::Date(date)) => current_date = Some(date),
                Ok(Cell::Message {
                    nickname,
                    identity,
                    time,
                    body,
                }) => match current_date {
                    Some(date) => {
                        messages.push(Message::new(nickname, identity, date, time, body));
                    }
                    None => {
                        skipped += 1;
                        warn!(error = %QqMergeError::MissingDate, "skipping message cell");
                    }
                },
                Ok(Cell::Other) => {}
                Err(e) => {
                    skipped += 1;
                    warn!(error = %e, "skipping transcript cell");
                }
            }
        }

        debug!(messages = messages.len(), skipped, "extracted transcript");
        messages
    }

    fn read_cell(&self, td: ElementRef<'_>) -> Result<Cell> {
        if td.value().attr("style").is_some() {
            let text: String = td.text().collect();
            if let Some(rest) = text.trim_start().strip_prefix(self.date_label.as_str()) {
                let literal =
                    rest.trim_start_matches(|c: char| c == ':' || c == '：' || c.is_whitespace());
                return parse_date_label(literal).map(Cell::Date);
            }
        }

        let Some(header) = td.children().find_map(ElementRef::wrap) else {
            return Ok(Cell::Other);
        };
        if !self.is_message_header(header) {
            return Ok(Cell::Other);
        }

        let identity_label = header
            .first_child()
            .map(|node| collect_text(node.descendants().map(|n| n.value())))
            .unwrap_or_default();
        let time_label = header
            .last_child()
            .map(|node| collect_text(node.descendants().map(|n| n.value())))
            .unwrap_or_default();
        let (nickname, identity) = split_identity_label(&identity_label);
        let time = parse_time_label(&time_label)?;

        let body = td
            .children()
            .filter_map(ElementRef::wrap)
            .last()
            .map(|element| element.inner_html())
            .unwrap_or_default();

        Ok(Cell::Message {
            nickname,
            identity,
            time,
            body,
        })
    }

    fn is_message_header(&self, element: ElementRef<'_>) -> bool {
        element
            .value()
            .attr("style")
            .is_some_and(|style| {
                style.contains("color") && style.contains(self.message_indent.as_str())
            })
    }
}

impl Default for TranscriptExtractor {
    fn default() -> Self {
        Self::new(&ReaderConfig::default())
    }
}

/// Extracts messages from `html`, sorts them chronologically and normalizes
/// their content against `images`.
///
/// The sort is stable, so messages sharing a timestamp keep document order.
pub fn extract_messages(html: &str, images: &ImageMap, config: &ReaderConfig) -> Vec<Message> {
    let mut messages = TranscriptExtractor::new(config).extract(html);
    messages.sort_by_key(Message::key);
    messages
        .iter()
        .map(|message| message.with_content(normalize_content(&message.content, images)))
        .collect()
}

fn collect_text<'a>(nodes: impl Iterator<Item = &'a Node>) -> String {
    nodes.filter_map(Node::as_text).map(|text| &**text).collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::container::ImageAsset;

    const DATE_CELL: &str = "<td style=border-bottom-width:1px;color:#3568BB;>日期: 2012/4/11</td>";

    fn message_cell(label: &str, time: &str, body: &str) -> String {
        format!(
            "<td><div style=color:#006EFE;padding-left:10px;>\
             <div style=float:left;margin-right:6px;>{label}</div>{time}</div>\
             <div style=padding-left:20px;>{body}</div></td>"
        )
    }

    fn table(cells: &[String]) -> String {
        let rows: String = cells.iter().map(|c| format!("<tr>{c}</tr>")).collect();
        format!("<html><body><table>{rows}</table></body></html>")
    }

    fn extract(html: &str) -> Vec<Message> {
        TranscriptExtractor::default().extract(html)
    }

    // =========================================================================
    // Cell recognition
    // =========================================================================

    #[test]
    fn test_single_message() {
        let html = table(&[
            DATE_CELL.to_string(),
            message_cell("张三(111)", "12:00:00", "<font color='red'>hi</font>"),
        ]);
        let messages = extract(&html);

        assert_eq!(messages.len(), 1);
        let msg = &messages[0];
        assert_eq!(msg.nickname, "张三");
        assert_eq!(msg.identity, Identity::Number("111".into()));
        assert_eq!(msg.date, 20120411);
        assert_eq!(msg.time, 120000);
        assert_eq!(msg.content, "<font color=\"red\">hi</font>");
    }

    #[test]
    fn test_email_identity_from_escaped_label() {
        let html = table(&[
            DATE_CELL.to_string(),
            message_cell("大魔头&lt;notyycn@gmail.com&gt;", "12:28:18", "看字节码干嘛"),
        ]);
        let messages = extract(&html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].nickname, "大魔头");
        assert_eq!(
            messages[0].identity,
            Identity::Email("notyycn@gmail.com".into())
        );
    }

    #[test]
    fn test_label_entities_are_decoded_once() {
        let html = table(&[
            DATE_CELL.to_string(),
            message_cell("a&amp;lt;b&nbsp;c(111)", "12:00:00", "hi"),
        ]);
        let messages = extract(&html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].nickname, "a&lt;b c");
        assert_eq!(messages[0].identity, Identity::Number("111".into()));
    }

    #[test]
    fn test_date_changes_between_messages() {
        let html = table(&[
            DATE_CELL.to_string(),
            message_cell("a(1)", "23:59:59", "x"),
            "<td style=color:#3568BB;>日期: 2012/4/12</td>".to_string(),
            message_cell("a(1)", "00:00:01", "y"),
        ]);
        let messages = extract(&html);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].key(), (20120411, 235959));
        assert_eq!(messages[1].key(), (20120412, 1));
    }

    #[test]
    fn test_date_label_with_full_width_colon() {
        let html = table(&[
            "<td style=x>日期：2012-04-11</td>".to_string(),
            message_cell("a(1)", "1:02:03", "x"),
        ]);
        let messages = extract(&html);
        assert_eq!(messages[0].key(), (20120411, 10203));
    }

    #[test]
    fn test_cells_without_markers_are_ignored() {
        let html = table(&[
            "<td>日期: 2012/4/11</td>".to_string(),
            "<td><div style=padding-left:10px;>no color</div></td>".to_string(),
            "<td>plain</td>".to_string(),
        ]);
        assert!(extract(&html).is_empty());
    }

    // =========================================================================
    // Recoverable cell errors
    // =========================================================================

    #[test]
    fn test_message_before_date_is_skipped() {
        let html = table(&[
            message_cell("a(1)", "12:00:00", "early"),
            DATE_CELL.to_string(),
            message_cell("a(1)", "12:00:01", "late"),
        ]);
        let messages = extract(&html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "late");
    }

    #[test]
    fn test_invalid_date_keeps_previous_date() {
        let html = table(&[
            DATE_CELL.to_string(),
            "<td style=x>日期: someday</td>".to_string(),
            message_cell("a(1)", "12:00:00", "x"),
        ]);
        let messages = extract(&html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].date, 20120411);
    }

    #[test]
    fn test_invalid_time_skips_cell() {
        let html = table(&[
            DATE_CELL.to_string(),
            message_cell("a(1)", "later", "x"),
            message_cell("a(1)", "12:00:00", "y"),
        ]);
        let messages = extract(&html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "y");
    }

    #[test]
    fn test_custom_labels() {
        let config = ReaderConfig::new()
            .with_date_label("Date")
            .with_message_indent("padding-left:8px;");
        let html = table(&[
            "<td style=x>Date: 2012/4/11</td>".to_string(),
            "<td><div style=color:red;padding-left:8px;><div>a(1)</div>12:00:00</div><div>x</div></td>"
                .to_string(),
        ]);
        let messages = TranscriptExtractor::new(&config).extract(&html);
        assert_eq!(messages.len(), 1);
    }

    // =========================================================================
    // Sorting and normalization
    // =========================================================================

    #[test]
    fn test_extract_messages_sorts_stably() {
        let html = table(&[
            DATE_CELL.to_string(),
            message_cell("a(1)", "12:00:05", "third"),
            message_cell("a(1)", "12:00:00", "first"),
            message_cell("b(2)", "12:00:00", "second"),
        ]);
        let messages = extract_messages(&html, &ImageMap::new(), &ReaderConfig::default());

        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn test_extract_messages_normalizes_content() {
        let mut images = ImageMap::new();
        images.insert(ImageAsset::new("img1.dat", "beef", "jpg", Path::new("/s")));

        let html = table(&[
            DATE_CELL.to_string(),
            message_cell(
                "张三(111)",
                "12:00:00",
                "<font color='red'>hi <IMG src=\"img1.dat\"></font>",
            ),
        ]);
        let messages = extract_messages(&html, &images, &ReaderConfig::default());

        assert_eq!(messages[0].content, "hi <img src=\"images/beef.jpg\">");
    }

    #[test]
    fn test_empty_html() {
        assert!(extract("").is_empty());
        assert!(extract("<html><body></body></html>").is_empty());
    }
}
