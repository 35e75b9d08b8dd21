//! Artifact locations: where meeting files land on disk and on the web.
//!
//! The configured pattern renders into a file prefix (meeting placeholders
//! plus strftime codes in the configured zone), and each artifact is the
//! prefix plus a fixed extension under `log_dir`. Slashes in the pattern
//! create subdirectories, so the derived path is normalized lexically and
//! refused if it escapes the log directory.

use crate::config::{Config, OutputFormat};
use crate::dates;
use crate::error::WriteError;
use crate::meeting::Meeting;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Extension of the raw JSON log, the recovery format.
pub const RAW_LOG_EXTENSION: &str = ".log.json";

const FORMATTED_LOG_EXTENSION: &str = ".log.html";
const FORMATTED_MINUTES_EXTENSION: &str = ".html";

/// Path on disk and public URL for one persisted artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Where the artifact is written, under the configured log directory.
    pub path: PathBuf,
    /// Where the hosting web server exposes it.
    pub url: String,
}

/// Locations of everything a meeting writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    /// The raw JSON log.
    pub raw_log: Location,
    /// The formatted transcript.
    pub formatted_log: Location,
    /// The formatted minutes.
    pub formatted_minutes: Location,
}

/// Derive the locations a meeting's artifacts will be written to.
pub fn derive_locations(config: &Config, meeting: &Meeting) -> Result<Locations, WriteError> {
    locations_for_prefix(config, &file_prefix(config, meeting))
}

/// Derive locations for an already-known file prefix, as when regenerating
/// output from an existing raw log.
pub fn locations_for_prefix(config: &Config, prefix: &str) -> Result<Locations, WriteError> {
    match config.output_format {
        OutputFormat::Html => Ok(Locations {
            raw_log: location(config, prefix, RAW_LOG_EXTENSION)?,
            formatted_log: location(config, prefix, FORMATTED_LOG_EXTENSION)?,
            formatted_minutes: location(config, prefix, FORMATTED_MINUTES_EXTENSION)?,
        }),
    }
}

/// Recover the file prefix from a raw-log path: the filename with
/// [`RAW_LOG_EXTENSION`] stripped.
pub fn derive_prefix(raw_log: &Path) -> Option<String> {
    let name = raw_log.file_name()?.to_string_lossy();
    Some(name.strip_suffix(RAW_LOG_EXTENSION).unwrap_or(&name).to_string())
}

fn location(config: &Config, prefix: &str, extension: &str) -> Result<Location, WriteError> {
    let candidate = PathBuf::from(format!("{prefix}{extension}"));
    let relative = safe_relative(&candidate)?;
    Ok(Location {
        path: config.log_dir.join(relative),
        // the web server decides what it serves; URLs are not path-checked
        url: format!(
            "{}/{}{}",
            config.url_prefix.trim_end_matches('/'),
            prefix,
            extension
        ),
    })
}

/// Render the configured pattern into a file prefix for a meeting.
fn file_prefix(config: &Config, meeting: &Meeting) -> String {
    let pattern = config
        .pattern
        .strip_prefix('/')
        .unwrap_or(&config.pattern);
    let substituted = pattern
        .replace("{channel}", &pattern_value(&meeting.channel))
        .replace("{network}", &pattern_value(&meeting.network))
        .replace("{name}", &pattern_value(&meeting.name))
        .replace("{id}", &pattern_value(&meeting.id));
    let rendered = render_pattern(&substituted, &meeting.start_time, &config.timezone);
    normalize(&rendered)
}

/// Substituted meeting values are data, not format: escape `%` so strftime
/// leaves them alone.
fn pattern_value(value: &str) -> String {
    value.replace('%', "%%")
}

/// Render strftime codes in the named zone. An unrenderable pattern is
/// used verbatim; normalization scrubs whatever is left.
fn render_pattern(fmt: &str, start: &DateTime<Utc>, zone: &str) -> String {
    let zoned = start.with_timezone(&dates::zone_or_utc(zone));
    let mut rendered = String::with_capacity(fmt.len());
    if write!(rendered, "{}", zoned.format(fmt)).is_err() {
        warn!(pattern = %fmt, "Invalid strftime pattern, using it verbatim");
        return fmt.to_string();
    }
    rendered
}

/// Scrub a rendered prefix into a sane path fragment: channel `#` markers
/// vanish, and every run of characters outside `[./a-zA-Z0-9_-]` collapses
/// to a single `_`.
fn normalize(prefix: &str) -> String {
    let stripped = prefix.replace('#', "");
    let mut normalized = String::with_capacity(stripped.len());
    let mut in_run = false;
    for c in stripped.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '/' | '_' | '-') {
            normalized.push(c);
            in_run = false;
        } else if !in_run {
            normalized.push('_');
            in_run = true;
        }
    }
    normalized
}

/// Lexically normalize a derived relative path, refusing anything that
/// would land outside the log directory. `.` and `/` survive
/// normalization, so `..` segments are possible here.
fn safe_relative(candidate: &Path) -> Result<PathBuf, WriteError> {
    let mut normalized = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(WriteError::PathTraversal(candidate.to_path_buf()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(WriteError::PathTraversal(candidate.to_path_buf()));
            }
        }
    }
    Ok(normalized)
}
