//! Header extraction from raw message text.
//!
//! Only three headers matter for the communication network: `From`, `To` and
//! `Date`. They are pulled out of the raw text with regular expressions instead
//! of a full MIME parse, because corpus records are frequently truncated or
//! carry headers that a strict RFC 5322 parser rejects.
//!
//! # Extraction rules
//!
//! - **From**: the first address-shaped token (`local@domain.tld`) following a
//!   `From:` label, optionally wrapped as `Name <local@domain.tld>`.
//! - **To**: the rest of the line after the first `To:` label. When the line
//!   holds a comma it is split on `", "`; empty entries are discarded. Wrapped
//!   continuation lines are not followed.
//! - **Date**: the rest of the line after the first `Date:` label, parsed with
//!   `dateparser` and, failing that, as strict RFC 2822. A value neither
//!   accepts rejects the record.
//!
//! Addresses are kept exactly as written: no case folding, no trimming of the
//! individual entries.
//!
//! A record lacking any of the three yields no headers at all, so the edge
//! builder never emits partial fan-outs.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

static FROM_REGEX: OnceLock<Regex> = OnceLock::new();
static TO_REGEX: OnceLock<Regex> = OnceLock::new();
static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
static TRAILING_COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();

fn from_regex() -> &'static Regex {
    FROM_REGEX.get_or_init(|| {
        Regex::new(r"From:[^\S\r\n]*(?:[^\r\n<@]*<)?([\w.+\-]+@[\w.\-]+\.\w+)")
            .expect("Invalid From header regex")
    })
}

fn to_regex() -> &'static Regex {
    TO_REGEX.get_or_init(|| {
        Regex::new(r"To:[^\S\r\n]*([^\r\n]+)").expect("Invalid To header regex")
    })
}

fn date_regex() -> &'static Regex {
    DATE_REGEX.get_or_init(|| {
        Regex::new(r"Date:[^\S\r\n]*([^\r\n]+)").expect("Invalid Date header regex")
    })
}

/// Matches a trailing zone comment such as ` (PDT)`.
fn trailing_comment_regex() -> &'static Regex {
    TRAILING_COMMENT_REGEX.get_or_init(|| {
        Regex::new(r"\s*\([^()]*\)\s*$").expect("Invalid date comment regex")
    })
}

/// Sender, recipients and timestamp of one message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageHeaders {
    pub from: String,
    pub to: Vec<String>,
    pub date: DateTime<Utc>,
}

/// Reasons a raw record yields no headers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("missing or malformed From header")]
    MissingFrom,
    #[error("missing or empty To header")]
    MissingTo,
    #[error("missing Date header")]
    MissingDate,
    #[error("unparseable Date header `{raw}`")]
    InvalidDate { raw: String },
}

/// Extract the sender, recipients and date of a raw message.
///
/// Returns `None` when any of the three is missing or unparseable. Use
/// [`extract_headers`] to learn why a record was rejected.
pub fn extract(raw: &str) -> Option<MessageHeaders> {
    extract_headers(raw).ok()
}

/// Like [`extract`], but reports which header failed.
pub fn extract_headers(raw: &str) -> Result<MessageHeaders, HeaderError> {
    let from = extract_sender(raw).ok_or(HeaderError::MissingFrom)?;
    let to = extract_recipients(raw);
    if to.is_empty() {
        return Err(HeaderError::MissingTo);
    }
    let raw_date = date_regex()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|value| !value.is_empty())
        .ok_or(HeaderError::MissingDate)?;
    let date = parse_date(raw_date).ok_or_else(|| HeaderError::InvalidDate {
        raw: raw_date.to_string(),
    })?;

    Ok(MessageHeaders { from, to, date })
}

fn extract_sender(raw: &str) -> Option<String> {
    from_regex()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn extract_recipients(raw: &str) -> Vec<String> {
    let Some(line) = to_regex()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
    else {
        return Vec::new();
    };

    if line.contains(',') {
        line.split(", ")
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    } else if line.is_empty() {
        Vec::new()
    } else {
        vec![line.to_string()]
    }
}

/// Parse a `Date:` header value leniently.
///
/// Corpus dates mostly look like `Mon, 14 May 2001 16:39:00 -0700 (PDT)`; the
/// zone comment is dropped before parsing. Naive timestamps are read as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned = trailing_comment_regex().replace(raw.trim(), "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    match dateparser::parse_with_timezone(cleaned, &Utc) {
        Ok(date) => Some(date),
        Err(err) => {
            log::trace!("dateparser rejected `{}`: {}", cleaned, err);
            DateTime::parse_from_rfc2822(cleaned)
                .ok()
                .map(|date| date.with_timezone(&Utc))
        }
    }
}
