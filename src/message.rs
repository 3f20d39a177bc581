//! Chat message record extracted from a transcript.
//!
//! This module provides [`Message`], one utterance of a group chat, and
//! [`Identity`], the account that sent it.
//!
//! # Overview
//!
//! A message consists of:
//! - a **nickname** (may be empty),
//! - an **identity**: either a QQ number or an email address, never both,
//! - a canonical **date** (`YYYYMMDD`) and **time** (`HHMMSS`),
//! - the **content**, an HTML fragment.
//!
//! # Examples
//!
//! ```
//! use chrono::{NaiveDate, NaiveTime};
//! use qqmerge::{Identity, Message};
//!
//! let msg = Message::new(
//!     "张三",
//!     Identity::Number("12345".into()),
//!     NaiveDate::from_ymd_opt(2012, 4, 11).unwrap(),
//!     NaiveTime::from_hms_opt(12, 28, 18).unwrap(),
//!     "hello",
//! );
//!
//! assert_eq!(msg.date, 20120411);
//! assert_eq!(msg.time, 122818);
//! assert_eq!(msg.account_display(), "张三(12345)");
//! assert_eq!(msg.timestamp_display(), "2012-04-11 12:28:18");
//! ```

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// The account behind a message.
///
/// Transcript exporters label senders either as `nickname(number)` or as
/// `nickname<email>`. Exactly one of the two is known for any message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Identity {
    /// Numeric account id
    Number(String),
    /// Email account id
    Email(String),
}

impl Identity {
    /// Returns the raw identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Identity::Number(s) | Identity::Email(s) => s,
        }
    }

    /// Returns the number, if this is a numeric identity.
    pub fn number(&self) -> Option<&str> {
        match self {
            Identity::Number(n) => Some(n),
            Identity::Email(_) => None,
        }
    }

    /// Returns the email, if this is an email identity.
    pub fn email(&self) -> Option<&str> {
        match self {
            Identity::Email(e) => Some(e),
            Identity::Number(_) => None,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Number(n) => write!(f, "({n})"),
            Identity::Email(e) => write!(f, "<{e}>"),
        }
    }
}

/// One chat utterance.
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `nickname` | `String` | Display name at the time of sending, may be empty |
/// | `identity` | [`Identity`] | Number or email of the sender |
/// | `date` | `u32` | Calendar date as `YYYYMMDD` |
/// | `time` | `u32` | Time of day as `HHMMSS` |
/// | `content` | `String` | HTML fragment of the message body |
///
/// `date` and `time` are always built from a real [`NaiveDate`] and
/// [`NaiveTime`], so `(date, time)` orders messages chronologically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Display name of the sender.
    pub nickname: String,

    /// Account of the sender.
    pub identity: Identity,

    /// Calendar date as `YYYYMMDD`.
    pub date: u32,

    /// Time of day as `HHMMSS`.
    pub time: u32,

    /// HTML fragment of the message body.
    pub content: String,
}

impl Message {
    /// Creates a message from its parts.
    pub fn new(
        nickname: impl Into<String>,
        identity: Identity,
        date: NaiveDate,
        time: NaiveTime,
        content: impl Into<String>,
    ) -> Self {
        Self {
            nickname: nickname.into(),
            identity,
            date: encode_date(date),
            time: encode_time(time),
            content: content.into(),
        }
    }

    /// Returns a copy of this message with `content` replaced.
    #[must_use]
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }

    /// Chronological sort key.
    pub fn key(&self) -> (u32, u32) {
        (self.date, self.time)
    }

    /// Returns `true` if `other` is the same utterance seen in another export.
    ///
    /// Two messages are duplicates when they share timestamp, identity and
    /// (normalized) content. The nickname is not compared: it may differ
    /// between exporters' contact lists.
    pub fn is_duplicate_of(&self, other: &Message) -> bool {
        self.key() == other.key() && self.identity == other.identity && self.content == other.content
    }

    /// Returns the account label, `nickname(number)` or `nickname<email>`.
    pub fn account_display(&self) -> String {
        format!("{}{}", self.nickname, self.identity)
    }

    /// Returns the date as `YYYY-MM-DD`.
    pub fn date_display(&self) -> String {
        format_date(self.date)
    }

    /// Returns the timestamp as `YYYY-MM-DD HH:MM:SS`.
    pub fn timestamp_display(&self) -> String {
        format!(
            "{} {:02}:{:02}:{:02}",
            format_date(self.date),
            self.time / 10000,
            self.time / 100 % 100,
            self.time % 100
        )
    }
}

/// Encodes a date as `YYYYMMDD`.
pub fn encode_date(date: NaiveDate) -> u32 {
    date.year() as u32 * 10000 + date.month() * 100 + date.day()
}

/// Encodes a time of day as `HHMMSS`.
pub fn encode_time(time: NaiveTime) -> u32 {
    time.hour() * 10000 + time.minute() * 100 + time.second()
}

/// Formats a `YYYYMMDD` date as `YYYY-MM-DD`.
pub fn format_date(date: u32) -> String {
    format!("{:04}-{:02}-{:02}", date / 10000, date / 100 % 100, date % 100)
}
