//! Meeting writers: the raw JSON log plus the formatted HTML artifacts.
//!
//! The raw log is the recovery format: a pretty-printed serialization of
//! the whole [`Meeting`] that [`load_meeting`] reads back verbatim, so
//! formatted output can always be regenerated after the fact. The HTML
//! renderings are deliberately plain, structure over styling, with every
//! piece of chat text escaped.

use crate::config::Config;
use crate::dates;
use crate::error::{RawLogError, WriteError};
use crate::location::{self, Locations};
use crate::meeting::{EventType, Meeting, TrackedEvent};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Writes a meeting's artifacts somewhere.
///
/// The engine shares one writer across every meeting and adapter thread,
/// behind `Arc<dyn MeetingWriter>`.
pub trait MeetingWriter: Send + Sync {
    /// Persist everything the meeting produced and report where it went.
    fn write_meeting(&self, meeting: &Meeting) -> Result<Locations, WriteError>;
}

/// The production writer: artifacts under `log_dir` per the configured
/// pattern.
pub struct FileWriter {
    config: Arc<Config>,
}

impl FileWriter {
    /// Create a writer over a configuration.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

impl MeetingWriter for FileWriter {
    fn write_meeting(&self, meeting: &Meeting) -> Result<Locations, WriteError> {
        let locations = location::derive_locations(&self.config, meeting)?;
        let mut raw = serde_json::to_string_pretty(meeting)?;
        raw.push('\n');
        write_file(&locations.raw_log.path, &raw)?;
        write_formatted(&self.config, meeting, &locations)?;
        info!(
            meeting = %meeting.key(),
            path = %locations.raw_log.path.display(),
            "meeting written"
        );
        Ok(locations)
    }
}

/// Write the formatted log and minutes for a meeting whose locations are
/// already known. The raw log is left alone, which is what regenerating
/// from an existing raw log wants.
pub fn write_formatted(
    config: &Config,
    meeting: &Meeting,
    locations: &Locations,
) -> Result<(), WriteError> {
    write_file(&locations.formatted_log.path, &render_log(config, meeting))?;
    write_file(
        &locations.formatted_minutes.path,
        &render_minutes(config, meeting),
    )?;
    Ok(())
}

/// Load a meeting back from its raw JSON log.
pub fn load_meeting<P: AsRef<Path>>(path: P) -> Result<Meeting, RawLogError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| RawLogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| RawLogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), WriteError> {
    let io = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io)?;
    }
    fs::write(path, content).map_err(io)
}

/// Render the transcript: one line per message inside a `<pre>` block,
/// actions in the conventional `* nick` form.
fn render_log(config: &Config, meeting: &Meeting) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str(&format!("<title>{} log</title>\n", escape(&meeting.name)));
    html.push_str("<meta charset=\"utf-8\">\n</head>\n<body>\n<pre>\n");
    for message in &meeting.messages {
        let time = dates::format_timestamp(&message.timestamp, &config.timezone, "%H:%M:%S");
        let line = if message.is_action {
            format!("{} * {} {}", time, message.sender, message.payload)
        } else {
            format!("{} <{}> {}", time, message.sender, message.payload)
        };
        html.push_str(&escape(&line));
        html.push('\n');
    }
    html.push_str("</pre>\n</body>\n</html>\n");
    html
}

/// Render the minutes: meeting header, the event history in order, and the
/// attendance tallies.
fn render_minutes(config: &Config, meeting: &Meeting) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str(&format!("<title>{}</title>\n", escape(&meeting.name)));
    html.push_str("<meta charset=\"utf-8\">\n</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape(&meeting.name)));

    let started =
        dates::format_timestamp(&meeting.start_time, &config.timezone, dates::DEFAULT_FORMAT);
    html.push_str(&format!(
        "<p>Meeting started at {} by {}.",
        started,
        escape(&meeting.founder)
    ));
    if let Some(end_time) = &meeting.end_time {
        let ended = dates::format_timestamp(end_time, &config.timezone, dates::DEFAULT_FORMAT);
        html.push_str(&format!(" Ended at {ended}."));
    }
    html.push_str("</p>\n");

    html.push_str("<h2>Minutes</h2>\n<ol>\n");
    for event in &meeting.events {
        let time = dates::format_timestamp(&event.timestamp, &config.timezone, "%H:%M:%S");
        html.push_str(&format!(
            "<li>{} {} ({})</li>\n",
            time,
            escape(&event_summary(event)),
            escape(&event.message.sender)
        ));
    }
    html.push_str("</ol>\n");

    html.push_str("<h2>People present</h2>\n<ul>\n");
    for (nick, count) in &meeting.nicks {
        html.push_str(&format!("<li>{} ({count})</li>\n", escape(nick)));
    }
    html.push_str("</ul>\n</body>\n</html>\n");
    html
}

/// One-line rendering of an event for the minutes list.
fn event_summary(event: &TrackedEvent) -> String {
    let name = event.event_type.name();
    let detail = match &event.event_type {
        EventType::MeetingTopic { topic } | EventType::CurrentTopic { topic } => topic.clone(),
        EventType::AddChair { chairs } | EventType::RemoveChair { chairs } => chairs.join(", "),
        EventType::TrackNick { nicks } => nicks.join(", "),
        EventType::Undo { id } => id.clone(),
        EventType::MeetingName { name } => name.clone(),
        EventType::Accepted { text }
        | EventType::Failed { text }
        | EventType::Action { text }
        | EventType::Info { text }
        | EventType::Idea { text }
        | EventType::Help { text }
        | EventType::Motion { text } => text.clone(),
        EventType::Link { url } => url.clone(),
        EventType::Vote { action } => action.token().to_string(),
        EventType::Attendee { alias } => alias.clone(),
        _ => String::new(),
    };
    if detail.is_empty() {
        name.to_string()
    } else {
        format!("{name}: {detail}")
    }
}

/// Minimal HTML escaping for untrusted chat text.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
