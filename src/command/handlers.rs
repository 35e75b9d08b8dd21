//! Handler functions for the meeting commands.
//!
//! Every handler has the same shape: gate on authorization, mutate the
//! meeting, record the event, reply. Unauthorized and malformed commands are
//! dropped silently so that casual `#hashtag` chat never draws an error into
//! the channel. Replies are suppressed while the meeting lurks; channel-topic
//! updates and failure reports are not.

use super::CommandDispatcher;
use crate::dates;
use crate::interface::Context;
use crate::location::Locations;
use crate::meeting::{EventType, Meeting, TrackedMessage, VoteAction};
use tracing::{debug, error};

// ============================================================================
// Shared helpers
// ============================================================================

/// True when the sender chairs the meeting; logs and returns false otherwise.
fn chair_gate(meeting: &Meeting, message: &TrackedMessage) -> bool {
    if meeting.is_chair(&message.sender) {
        true
    } else {
        debug!(
            meeting = %meeting.key(),
            sender = %message.sender,
            "ignoring chair-only command"
        );
        false
    }
}

/// Send a reply unless the meeting is lurking.
fn reply(meeting: &Meeting, context: &mut dyn Context, text: &str) {
    if !meeting.lurk {
        context.send_reply(text);
    }
}

/// Recompute and push the channel topic.
///
/// While active: `"{current} (Meeting topic: {overall})"` when both topics
/// are nonempty, else whichever is nonempty, else the meeting display name.
/// Inactive: restore the captured original topic, or blank.
fn set_channel_topic(dispatcher: &CommandDispatcher, meeting: &Meeting, context: &mut dyn Context) {
    let topic = if meeting.active {
        let current = meeting.current_topic.as_deref().filter(|t| !t.is_empty());
        let overall = meeting.meeting_topic.as_deref().filter(|t| !t.is_empty());
        match (current, overall) {
            (Some(current), Some(overall)) => format!("{current} (Meeting topic: {overall})"),
            (Some(current), None) => current.to_string(),
            (None, Some(overall)) => overall.to_string(),
            (None, None) => meeting.display_name(&dispatcher.config.timezone, dates::DEFAULT_FORMAT),
        }
    } else {
        meeting.original_topic.clone().unwrap_or_default()
    };
    context.set_topic(&topic);
}

/// Split an operand into nicks on runs of whitespace and commas.
fn tokenize(operand: &str) -> Vec<String> {
    operand
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn joined<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Hand the meeting to the writer, reporting failure as a reply.
///
/// Failure reports bypass lurk suppression: a chair who asked for a save
/// needs to hear that it did not happen.
fn write_meeting(
    dispatcher: &CommandDispatcher,
    meeting: &Meeting,
    context: &mut dyn Context,
) -> Option<Locations> {
    match dispatcher.writer.write_meeting(meeting) {
        Ok(locations) => Some(locations),
        Err(err) => {
            error!(meeting = %meeting.key(), error = %err, "failed to write meeting");
            context.send_reply(&format!("Could not save meeting: {err}"));
            None
        }
    }
}

// ============================================================================
// Meeting lifecycle
// ============================================================================

pub(super) fn startmeeting(
    dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    if !chair_gate(meeting, message) {
        return;
    }
    if meeting.active {
        debug!(meeting = %meeting.key(), "ignoring duplicate startmeeting");
        return;
    }
    meeting.active = true;
    meeting.meeting_topic = Some(operand.to_string());
    meeting.track_event(EventType::StartMeeting, message);
    let started = dates::format_timestamp(
        &meeting.start_time,
        &dispatcher.config.timezone,
        dates::DEFAULT_FORMAT,
    );
    let chairs = joined(meeting.chairs.iter());
    reply(meeting, context, &format!("Meeting started at {started}"));
    reply(meeting, context, &format!("Current chairs: {chairs}"));
    reply(
        meeting,
        context,
        "Useful commands: #action #agreed #help #info #idea #link #topic",
    );
    set_channel_topic(dispatcher, meeting, context);
}

pub(super) fn endmeeting(
    dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    context: &mut dyn Context,
    _operation: &str,
    _operand: &str,
    message: &TrackedMessage,
) {
    if !chair_gate(meeting, message) || !meeting.active {
        return;
    }
    meeting.track_event(EventType::EndMeeting, message);
    meeting.mark_completed();
    set_channel_topic(dispatcher, meeting, context);
    let ended = meeting.end_time.unwrap_or(message.timestamp);
    let ended = dates::format_timestamp(&ended, &dispatcher.config.timezone, dates::DEFAULT_FORMAT);
    reply(meeting, context, &format!("Meeting ended at {ended}"));
    if let Some(locations) = write_meeting(dispatcher, meeting, context) {
        reply(
            meeting,
            context,
            &format!("Raw log: {}", locations.raw_log.url),
        );
        reply(
            meeting,
            context,
            &format!("Minutes: {}", locations.formatted_minutes.url),
        );
    }
}

pub(super) fn save(
    dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    context: &mut dyn Context,
    _operation: &str,
    _operand: &str,
    message: &TrackedMessage,
) {
    if !chair_gate(meeting, message) {
        return;
    }
    meeting.track_event(EventType::SaveMeeting, message);
    if let Some(locations) = write_meeting(dispatcher, meeting, context) {
        reply(meeting, context, "Meeting saved");
        reply(
            meeting,
            context,
            &format!("Raw log: {}", locations.raw_log.url),
        );
        reply(
            meeting,
            context,
            &format!("Minutes: {}", locations.formatted_minutes.url),
        );
    }
}

pub(super) fn lurk(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    _context: &mut dyn Context,
    _operation: &str,
    _operand: &str,
    message: &TrackedMessage,
) {
    if !chair_gate(meeting, message) {
        return;
    }
    meeting.track_event(EventType::Lurk, message);
    meeting.lurk = true;
}

pub(super) fn unlurk(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    _context: &mut dyn Context,
    _operation: &str,
    _operand: &str,
    message: &TrackedMessage,
) {
    if !chair_gate(meeting, message) {
        return;
    }
    meeting.track_event(EventType::Unlurk, message);
    meeting.lurk = false;
}

// ============================================================================
// Topics
// ============================================================================

pub(super) fn meetingtopic(
    dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    if !chair_gate(meeting, message) {
        return;
    }
    meeting.meeting_topic = Some(operand.to_string());
    meeting.track_event(
        EventType::MeetingTopic {
            topic: operand.to_string(),
        },
        message,
    );
    set_channel_topic(dispatcher, meeting, context);
}

pub(super) fn topic(
    dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    if !chair_gate(meeting, message) {
        return;
    }
    meeting.current_topic = Some(operand.to_string());
    meeting.track_event(
        EventType::CurrentTopic {
            topic: operand.to_string(),
        },
        message,
    );
    set_channel_topic(dispatcher, meeting, context);
}

// ============================================================================
// Roster
// ============================================================================

pub(super) fn chair(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    if !chair_gate(meeting, message) {
        return;
    }
    let tokens = tokenize(operand);
    if tokens.is_empty() {
        return;
    }
    for name in &tokens {
        meeting.add_chair(name, false);
    }
    meeting.track_event(EventType::AddChair { chairs: tokens }, message);
    let chairs = joined(meeting.chairs.iter());
    reply(meeting, context, &format!("Current chairs: {chairs}"));
}

pub(super) fn unchair(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    if !chair_gate(meeting, message) {
        return;
    }
    let tokens = tokenize(operand);
    if tokens.is_empty() {
        return;
    }
    for name in &tokens {
        meeting.remove_chair(name);
    }
    meeting.track_event(EventType::RemoveChair { chairs: tokens }, message);
    let chairs = joined(meeting.chairs.iter());
    reply(meeting, context, &format!("Current chairs: {chairs}"));
}

pub(super) fn nick(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    let tokens = tokenize(operand);
    if tokens.is_empty() {
        return;
    }
    for name in &tokens {
        meeting.track_nick(name, 0);
    }
    meeting.track_event(EventType::TrackNick { nicks: tokens }, message);
    let nicks = joined(meeting.nicks.keys());
    reply(meeting, context, &format!("Current nicks: {nicks}"));
}

pub(super) fn here(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    _context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    let alias = if operand.is_empty() {
        message.sender.clone()
    } else {
        operand.to_string()
    };
    meeting.track_attendee(&message.sender);
    meeting.track_event(EventType::Attendee { alias }, message);
}

// ============================================================================
// Minutes bookkeeping
// ============================================================================

pub(super) fn undo(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    context: &mut dyn Context,
    _operation: &str,
    _operand: &str,
    message: &TrackedMessage,
) {
    if !chair_gate(meeting, message) {
        return;
    }
    if let Some(removed) = meeting.pop_event() {
        meeting.track_event(
            EventType::Undo {
                id: removed.id.clone(),
            },
            message,
        );
        reply(
            meeting,
            context,
            &format!("Removed event: {}", removed.display_name()),
        );
    }
}

pub(super) fn meetingname(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    if !chair_gate(meeting, message) || operand.is_empty() {
        return;
    }
    meeting.name = operand.to_string();
    meeting.track_event(
        EventType::MeetingName {
            name: operand.to_string(),
        },
        message,
    );
    reply(meeting, context, &format!("Meeting name set to: {operand}"));
}

// ============================================================================
// Minutes items
// ============================================================================

pub(super) fn accepted(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    _context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    if !chair_gate(meeting, message) {
        return;
    }
    meeting.track_event(
        EventType::Accepted {
            text: operand.to_string(),
        },
        message,
    );
}

pub(super) fn failed(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    _context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    if !chair_gate(meeting, message) {
        return;
    }
    meeting.track_event(
        EventType::Failed {
            text: operand.to_string(),
        },
        message,
    );
}

pub(super) fn action(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    _context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    meeting.track_event(
        EventType::Action {
            text: operand.to_string(),
        },
        message,
    );
}

pub(super) fn info(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    _context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    meeting.track_event(
        EventType::Info {
            text: operand.to_string(),
        },
        message,
    );
}

pub(super) fn idea(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    _context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    meeting.track_event(
        EventType::Idea {
            text: operand.to_string(),
        },
        message,
    );
}

pub(super) fn help(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    _context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    meeting.track_event(
        EventType::Help {
            text: operand.to_string(),
        },
        message,
    );
}

pub(super) fn link(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    _context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    meeting.track_event(
        EventType::Link {
            url: operand.to_string(),
        },
        message,
    );
}

// ============================================================================
// Voting
// ============================================================================

pub(super) fn motion(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    _context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    if !chair_gate(meeting, message) {
        return;
    }
    meeting.track_event(
        EventType::Motion {
            text: operand.to_string(),
        },
        message,
    );
}

pub(super) fn vote(
    _dispatcher: &CommandDispatcher,
    meeting: &mut Meeting,
    _context: &mut dyn Context,
    _operation: &str,
    operand: &str,
    message: &TrackedMessage,
) {
    let ballot = match operand.split_whitespace().next() {
        Some("+1") => VoteAction::InFavor,
        Some("-1") => VoteAction::Opposed,
        _ => {
            debug!(sender = %message.sender, operand, "ignoring malformed vote");
            return;
        }
    };
    meeting.track_event(EventType::Vote { action: ballot }, message);
}
