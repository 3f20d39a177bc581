//! Parsing of the small text labels inside transcript cells.
//!
//! - identity labels: `风自由(23246779)` or `大魔头<notyycn@gmail.com>`
//! - date labels: `2012/4/11`, `2012-4-11` or `4/11/2012`
//! - time labels: `12:28:18`

use chrono::{NaiveDate, NaiveTime};

use crate::error::{QqMergeError, Result};
use crate::message::Identity;

/// Date formats accepted in date marker cells, tried in order.
const DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y-%m-%d", "%m/%d/%Y"];

/// Undoes the entity escaping some exporters leave in labels.
pub fn unescape_label(label: &str) -> String {
    label
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace('\u{a0}', " ")
        .replace("&amp;", "&")
}

/// Splits a raw identity label into nickname and identity.
///
/// The label is unescaped once with [`unescape_label`] and then split with
/// [`split_identity_label`].
///
/// # Example
///
/// ```rust
/// use qqmerge::Identity;
/// use qqmerge::transcript::parse_identity_label;
///
/// let (nickname, identity) = parse_identity_label("张三(12345)");
/// assert_eq!(nickname, "张三");
/// assert_eq!(identity, Identity::Number("12345".into()));
///
/// let (nickname, identity) = parse_identity_label("李四&lt;li@x.com&gt;");
/// assert_eq!(nickname, "李四");
/// assert_eq!(identity, Identity::Email("li@x.com".into()));
/// ```
pub fn parse_identity_label(label: &str) -> (String, Identity) {
    split_identity_label(&unescape_label(label))
}

/// Splits an already decoded identity label into nickname and identity.
///
/// Only U+00A0 is mapped to a space; entities are left alone, so decoded
/// text such as `a&lt;b(1)` keeps its literal `&lt;`.
///
/// A label ending in `>` carries an email between the first `<` and the last
/// `>`; any other label carries a number between the first `(` and the last
/// `)`. The nickname is whatever precedes the opening delimiter. Missing
/// delimiters produce empty strings.
pub fn split_identity_label(label: &str) -> (String, Identity) {
    let label = label.trim().replace('\u{a0}', " ");

    if label.ends_with('>') {
        let nickname = substring_before(&label, '<');
        let email = substring_between(&label, '<', '>');
        (nickname.to_string(), Identity::Email(email.to_string()))
    } else {
        let nickname = substring_before(&label, '(');
        let number = substring_between(&label, '(', ')');
        (nickname.to_string(), Identity::Number(number.to_string()))
    }
}

/// Parses a date literal into a [`NaiveDate`].
///
/// # Errors
///
/// Returns [`QqMergeError::InvalidDate`] if no accepted format matches.
pub fn parse_date_label(label: &str) -> Result<NaiveDate> {
    let label = label.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(label, format).ok())
        .ok_or_else(|| QqMergeError::invalid_date(label))
}

/// Parses an `H:m:s` time literal into a [`NaiveTime`].
///
/// # Errors
///
/// Returns [`QqMergeError::InvalidTime`] if the label is not a valid time.
pub fn parse_time_label(label: &str) -> Result<NaiveTime> {
    let label = label.trim();
    NaiveTime::parse_from_str(label, "%H:%M:%S").map_err(|_| QqMergeError::invalid_time(label))
}

fn substring_before(s: &str, delimiter: char) -> &str {
    s.find(delimiter).map_or("", |i| &s[..i])
}

fn substring_between(s: &str, start: char, end: char) -> &str {
    match (s.find(start), s.rfind(end)) {
        (Some(i), Some(j)) if i < j => &s[i + start.len_utf8()..j],
        _ => "",
    }
}
