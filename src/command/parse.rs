//! Command and URL recognition.
//!
//! The matching behavior here is part of the chat wire format: commands are
//! a leading `#word` token, case-insensitive, with optional leading
//! whitespace; a message that starts with a recognized URL scheme becomes an
//! implicit `link` operation. Plain chat matches neither.

use regex::Regex;
use std::sync::LazyLock;

/// `#startmeeting` as a whole leading token. `#startmeetingfoo` is not a
/// start-of-meeting indicator.
static STARTMEETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*#startmeeting(\s.*)?$").expect("startmeeting regex compiles")
});

/// A leading `#word` with everything after it as the operand.
static OPERATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*#(\w+)\s*(.*)$").expect("operation regex compiles"));

/// A message that leads with a URL. Schemes are matched case-sensitively.
static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*((http|https|irc|ftp|mailto|ssh)://\S*)").expect("url regex compiles")
});

/// A recognized `#operation` and its operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Lowercased operation name, without the leading `#`.
    pub name: String,
    /// Remainder of the line, stripped of surrounding whitespace.
    pub operand: String,
}

/// Whether a payload is a start-of-meeting indicator.
pub fn is_startmeeting(payload: &str) -> bool {
    STARTMEETING.is_match(payload)
}

/// Extract a leading `#operation` from a payload, if present.
pub(super) fn parse_operation(payload: &str) -> Option<Operation> {
    let captures = OPERATION.captures(payload)?;
    Some(Operation {
        name: captures[1].to_lowercase(),
        operand: captures[2].trim().to_string(),
    })
}

/// Extract a leading URL from a payload, if present.
///
/// Returns the scheme plus everything up to the first whitespace, which
/// becomes the operand of an implicit `link` operation.
pub(super) fn parse_url(payload: &str) -> Option<String> {
    let captures = URL.captures(payload)?;
    Some(captures[1].to_string())
}
