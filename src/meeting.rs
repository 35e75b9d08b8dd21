//! The meeting aggregate and its tracked history.
//!
//! A [`Meeting`] owns everything the writer needs to produce minutes: the
//! verbatim message transcript and the typed event history layered on top
//! of it. The aggregate is plain data plus invariants; all I/O lives
//! elsewhere, and a serde round trip through the raw JSON log reproduces
//! it exactly.

use crate::dates;
use crate::interface::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// CTCP delimiter byte wrapping ACTION payloads (`/me`).
const CTCP_DELIM: char = '\x01';

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Ballot cast by `#vote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteAction {
    /// A vote in favor, `+1`.
    #[serde(rename = "+1")]
    InFavor,
    /// A vote against, `-1`.
    #[serde(rename = "-1")]
    Opposed,
}

impl VoteAction {
    /// The ballot token as typed in chat.
    pub fn token(&self) -> &'static str {
        match self {
            Self::InFavor => "+1",
            Self::Opposed => "-1",
        }
    }
}

/// A typed meeting event together with its payload.
///
/// Serialized with a discriminated encoding: an `event_type` tag plus an
/// `attributes` object carrying the variant payload, omitted for variants
/// without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event_type",
    content = "attributes",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum EventType {
    /// The meeting was opened.
    StartMeeting,
    /// The meeting was closed.
    EndMeeting,
    /// Artifacts were written mid-meeting.
    SaveMeeting,
    /// Replies were muted with `#lurk`.
    Lurk,
    /// Replies were unmuted with `#unlurk`.
    Unlurk,
    /// The overall meeting topic changed.
    MeetingTopic {
        /// New meeting topic.
        topic: String,
    },
    /// The current discussion topic changed.
    CurrentTopic {
        /// New discussion topic.
        topic: String,
    },
    /// Chairs were added with `#chair`.
    AddChair {
        /// Nicks named in the command, in command order.
        chairs: Vec<String>,
    },
    /// Chairs were removed with `#unchair`.
    RemoveChair {
        /// Nicks named in the command, in command order.
        chairs: Vec<String>,
    },
    /// Nicks were registered with `#nick`.
    TrackNick {
        /// Nicks named in the command.
        nicks: Vec<String>,
    },
    /// The most recent event was removed with `#undo`.
    Undo {
        /// Id of the removed event.
        id: String,
    },
    /// The meeting was renamed.
    MeetingName {
        /// New meeting name.
        name: String,
    },
    /// A proposal was accepted.
    Accepted {
        /// Proposal text.
        text: String,
    },
    /// A proposal failed.
    Failed {
        /// Proposal text.
        text: String,
    },
    /// An action item was recorded.
    Action {
        /// Action item text.
        text: String,
    },
    /// An informational note was recorded.
    Info {
        /// Note text.
        text: String,
    },
    /// An idea was recorded.
    Idea {
        /// Idea text.
        text: String,
    },
    /// A request for help was recorded.
    Help {
        /// Request text.
        text: String,
    },
    /// A link was recorded, by `#link` or a bare URL.
    Link {
        /// The URL.
        url: String,
    },
    /// A motion was put to the group.
    Motion {
        /// Motion text.
        text: String,
    },
    /// A ballot was cast on the open motion.
    Vote {
        /// The ballot.
        action: VoteAction,
    },
    /// Attendance was declared with `#here`.
    Attendee {
        /// Alias to match action items against; defaults to the nick.
        alias: String,
    },
}

impl EventType {
    /// Stable wire token for this event, as written to the raw log.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartMeeting => "START_MEETING",
            Self::EndMeeting => "END_MEETING",
            Self::SaveMeeting => "SAVE_MEETING",
            Self::Lurk => "LURK",
            Self::Unlurk => "UNLURK",
            Self::MeetingTopic { .. } => "MEETING_TOPIC",
            Self::CurrentTopic { .. } => "CURRENT_TOPIC",
            Self::AddChair { .. } => "ADD_CHAIR",
            Self::RemoveChair { .. } => "REMOVE_CHAIR",
            Self::TrackNick { .. } => "TRACK_NICK",
            Self::Undo { .. } => "UNDO",
            Self::MeetingName { .. } => "MEETING_NAME",
            Self::Accepted { .. } => "ACCEPTED",
            Self::Failed { .. } => "FAILED",
            Self::Action { .. } => "ACTION",
            Self::Info { .. } => "INFO",
            Self::Idea { .. } => "IDEA",
            Self::Help { .. } => "HELP",
            Self::Link { .. } => "LINK",
            Self::Motion { .. } => "MOTION",
            Self::Vote { .. } => "VOTE",
            Self::Attendee { .. } => "ATTENDEE",
        }
    }
}

/// One channel line recorded into a meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedMessage {
    /// Unique id (uuid hex), carried over from the inbound message.
    pub id: String,
    /// Sender nick.
    pub sender: String,
    /// Message body, CTCP ACTION envelope stripped, whitespace trimmed.
    pub payload: String,
    /// True when the line was a `/me` action.
    pub is_action: bool,
    /// Arrival time, UTC.
    pub timestamp: DateTime<Utc>,
}

impl TrackedMessage {
    fn from_message(message: &Message) -> Self {
        let (is_action, payload) = strip_ctcp_action(&message.payload);
        Self {
            id: message.id.clone(),
            sender: message.nick.clone(),
            payload,
            is_action,
            timestamp: message.timestamp,
        }
    }

    /// `"{id}@{timestamp}"`, the form used in replies and logs.
    pub fn display_name(&self) -> String {
        format!("{}@{}", self.id, dates::format_default(&self.timestamp))
    }
}

/// Split the CTCP ACTION envelope off a payload.
///
/// Actions arrive as `\x01ACTION <text>\x01`. The `\x01` envelope is
/// required: a payload that merely begins with the word `ACTION` is
/// ordinary chat.
fn strip_ctcp_action(payload: &str) -> (bool, String) {
    let enveloped = payload.trim_start().starts_with(CTCP_DELIM);
    let body = payload.trim_matches(|c: char| c == ' ' || c == CTCP_DELIM);
    if enveloped {
        if let Some(rest) = body.strip_prefix("ACTION ") {
            return (true, rest.trim().to_string());
        }
        if body == "ACTION" {
            return (true, String::new());
        }
    }
    (false, body.trim().to_string())
}

/// One typed event recorded into a meeting, bound to the message that
/// produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedEvent {
    /// Unique id (uuid hex).
    pub id: String,
    /// What happened, with its payload.
    #[serde(flatten)]
    pub event_type: EventType,
    /// Copy of the triggering message.
    pub message: TrackedMessage,
    /// Event time, UTC.
    pub timestamp: DateTime<Utc>,
}

impl TrackedEvent {
    fn new(event_type: EventType, message: TrackedMessage) -> Self {
        let timestamp = message.timestamp;
        Self {
            id: new_id(),
            event_type,
            message,
            timestamp,
        }
    }

    /// `"{id}@{timestamp}"`, the form used in replies and logs.
    pub fn display_name(&self) -> String {
        format!("{}@{}", self.id, dates::format_default(&self.timestamp))
    }
}

/// Data for a single meeting, running or completed.
///
/// This is the unit the raw-log writer serializes. Chairs are kept as a
/// sorted set and nick tallies as a sorted map so every rendering of the
/// aggregate is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    /// Unique id (uuid hex).
    pub id: String,
    /// Meeting name; defaults to the channel, settable with `#meetingname`.
    pub name: String,
    /// Nick that opened the meeting.
    pub founder: String,
    /// Channel the meeting runs in.
    pub channel: String,
    /// Network the channel lives on.
    pub network: String,
    /// Primary chair.
    pub chair: String,
    /// All chairs, founder included, sorted ascending.
    pub chairs: BTreeSet<String>,
    /// Message counts per nick seen or named during the meeting.
    pub nicks: BTreeMap<String, usize>,
    /// While true, command replies are suppressed.
    pub lurk: bool,
    /// True from `#startmeeting` until `#endmeeting`.
    pub active: bool,
    /// Meeting start, UTC.
    pub start_time: DateTime<Utc>,
    /// Meeting end, UTC; `None` while running.
    pub end_time: Option<DateTime<Utc>>,
    /// Channel topic when the meeting opened, restored at the end.
    pub original_topic: Option<String>,
    /// Overall topic set with `#meetingtopic`.
    pub meeting_topic: Option<String>,
    /// Discussion topic set with `#topic`.
    pub current_topic: Option<String>,
    /// Verbatim transcript.
    pub messages: Vec<TrackedMessage>,
    /// Typed event history.
    pub events: Vec<TrackedEvent>,
}

impl Meeting {
    /// Create a meeting for a channel. The founder is the first chair and
    /// the first registered nick; the meeting is not active until
    /// `#startmeeting` is dispatched.
    pub fn new(founder: &str, channel: &str, network: &str) -> Self {
        let mut chairs = BTreeSet::new();
        chairs.insert(founder.to_string());
        let mut nicks = BTreeMap::new();
        nicks.insert(founder.to_string(), 0);
        Self {
            id: new_id(),
            name: channel.to_string(),
            founder: founder.to_string(),
            channel: channel.to_string(),
            network: network.to_string(),
            chair: founder.to_string(),
            chairs,
            nicks,
            lurk: false,
            active: false,
            start_time: Utc::now(),
            end_time: None,
            original_topic: None,
            meeting_topic: None,
            current_topic: None,
            messages: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Registry key for this meeting, `"{channel}/{network}"`.
    pub fn key(&self) -> String {
        meeting_key(&self.channel, &self.network)
    }

    /// `"{channel}/{network}@{start}"` with the start time rendered in
    /// `zone`.
    pub fn display_name(&self, zone: &str, fmt: &str) -> String {
        format!(
            "{}/{}@{}",
            self.channel,
            self.network,
            dates::format_timestamp(&self.start_time, zone, fmt)
        )
    }

    /// Whether `nick` currently chairs the meeting.
    pub fn is_chair(&self, nick: &str) -> bool {
        self.chairs.contains(nick)
    }

    /// Add a chair, optionally making it the primary. Chairs are
    /// attendees, so unseen nicks get registered with a zero count.
    pub fn add_chair(&mut self, nick: &str, primary: bool) {
        self.chairs.insert(nick.to_string());
        if primary {
            self.chair = nick.to_string();
        }
        self.track_attendee(nick);
    }

    /// Remove a chair. The founder is never removed, and removing the
    /// primary chair falls the role back to the founder.
    pub fn remove_chair(&mut self, nick: &str) {
        if nick == self.founder {
            return;
        }
        self.chairs.remove(nick);
        if self.chair == nick {
            self.chair = self.founder.clone();
        }
    }

    /// Register a nick without counting a message.
    pub fn track_attendee(&mut self, nick: &str) {
        self.nicks.entry(nick.to_string()).or_insert(0);
    }

    /// Add `count` to a nick's message tally, registering it if unseen.
    pub fn track_nick(&mut self, nick: &str, count: usize) {
        *self.nicks.entry(nick.to_string()).or_insert(0) += count;
    }

    /// Record a channel line into the transcript and bump the sender's
    /// tally. Returns the stored record for dispatching.
    pub fn track_message(&mut self, message: &Message) -> TrackedMessage {
        let tracked = TrackedMessage::from_message(message);
        self.track_nick(&tracked.sender, 1);
        self.messages.push(tracked.clone());
        tracked
    }

    /// Record a typed event against the message that produced it.
    pub fn track_event(&mut self, event_type: EventType, message: &TrackedMessage) -> TrackedEvent {
        let event = TrackedEvent::new(event_type, message.clone());
        self.events.push(event.clone());
        event
    }

    /// Remove and return the most recent event, if any.
    pub fn pop_event(&mut self) -> Option<TrackedEvent> {
        self.events.pop()
    }

    /// Close the meeting: clears `active` and stamps `end_time`.
    pub fn mark_completed(&mut self) {
        self.active = false;
        self.end_time = Some(Utc::now());
    }
}

/// Registry key for a channel/network pair.
pub fn meeting_key(channel: &str, network: &str) -> String {
    format!("{channel}/{network}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn chat(nick: &str, payload: &str) -> Message {
        Message::new(nick, "#dev", "libera", payload)
    }

    fn meeting() -> Meeting {
        Meeting::new("alice", "#dev", "libera")
    }

    #[test]
    fn test_new_meeting_defaults() {
        let meeting = meeting();
        assert_eq!(meeting.name, "#dev");
        assert_eq!(meeting.founder, "alice");
        assert_eq!(meeting.chair, "alice");
        assert!(meeting.is_chair("alice"));
        assert_eq!(meeting.nicks.get("alice"), Some(&0));
        assert!(!meeting.lurk);
        assert!(!meeting.active);
        assert!(meeting.end_time.is_none());
        assert!(meeting.messages.is_empty());
        assert!(meeting.events.is_empty());
    }

    #[test]
    fn test_meeting_key() {
        assert_eq!(meeting().key(), "#dev/libera");
        assert_eq!(meeting_key("#ops", "oftc"), "#ops/oftc");
    }

    #[test]
    fn test_display_name_renders_start_time() {
        let mut meeting = meeting();
        meeting.start_time = Utc.with_ymd_and_hms(2024, 3, 11, 18, 30, 0).unwrap();
        assert_eq!(
            meeting.display_name("UTC", dates::DEFAULT_FORMAT),
            "#dev/libera@2024-03-11T18:30+0000"
        );
    }

    #[test]
    fn test_add_chair_non_primary() {
        let mut meeting = meeting();
        meeting.add_chair("bob", false);
        assert_eq!(meeting.chair, "alice");
        assert!(meeting.is_chair("bob"));
        // chairs iterate sorted
        let chairs: Vec<_> = meeting.chairs.iter().cloned().collect();
        assert_eq!(chairs, vec!["alice", "bob"]);
        // the new chair is registered as an attendee
        assert_eq!(meeting.nicks.get("bob"), Some(&0));
    }

    #[test]
    fn test_add_chair_primary() {
        let mut meeting = meeting();
        meeting.add_chair("bob", true);
        assert_eq!(meeting.chair, "bob");
        assert!(meeting.is_chair("alice"));
        assert!(meeting.is_chair("bob"));
    }

    #[test]
    fn test_add_chair_is_idempotent() {
        let mut meeting = meeting();
        meeting.add_chair("bob", false);
        meeting.add_chair("bob", false);
        assert_eq!(meeting.chairs.len(), 2);
    }

    #[test]
    fn test_remove_chair_founder_is_protected() {
        let mut meeting = meeting();
        meeting.remove_chair("alice");
        assert!(meeting.is_chair("alice"));
        assert_eq!(meeting.chair, "alice");
    }

    #[test]
    fn test_remove_primary_chair_falls_back_to_founder() {
        let mut meeting = meeting();
        meeting.add_chair("bob", true);
        meeting.remove_chair("bob");
        assert!(!meeting.is_chair("bob"));
        assert_eq!(meeting.chair, "alice");
    }

    #[test]
    fn test_track_message_counts_sender() {
        let mut meeting = meeting();
        meeting.track_message(&chat("bob", "hello"));
        meeting.track_message(&chat("bob", "again"));
        assert_eq!(meeting.nicks.get("bob"), Some(&2));
        assert_eq!(meeting.messages.len(), 2);
    }

    #[test]
    fn test_track_message_strips_ctcp_action() {
        let mut meeting = meeting();
        let tracked = meeting.track_message(&chat("bob", "\x01ACTION waves goodbye\x01"));
        assert!(tracked.is_action);
        assert_eq!(tracked.payload, "waves goodbye");
    }

    #[test]
    fn test_track_message_trims_plain_payload() {
        let mut meeting = meeting();
        let tracked = meeting.track_message(&chat("bob", "  Hello, world  "));
        assert!(!tracked.is_action);
        assert_eq!(tracked.payload, "Hello, world");
    }

    #[test]
    fn test_bare_action_word_is_not_an_action() {
        let mut meeting = meeting();
        let tracked = meeting.track_message(&chat("bob", "ACTION stations everyone"));
        assert!(!tracked.is_action);
        assert_eq!(tracked.payload, "ACTION stations everyone");
    }

    #[test]
    fn test_empty_ctcp_action() {
        let (is_action, payload) = strip_ctcp_action("\x01ACTION\x01");
        assert!(is_action);
        assert_eq!(payload, "");
    }

    #[test]
    fn test_track_nick_registers_and_accumulates() {
        let mut meeting = meeting();
        meeting.track_nick("carol", 0);
        assert_eq!(meeting.nicks.get("carol"), Some(&0));
        meeting.track_nick("carol", 3);
        assert_eq!(meeting.nicks.get("carol"), Some(&3));
    }

    #[test]
    fn test_pop_event() {
        let mut meeting = meeting();
        let tracked = meeting.track_message(&chat("alice", "#idea ship it"));
        meeting.track_event(
            EventType::Idea {
                text: "ship it".to_string(),
            },
            &tracked,
        );
        let popped = meeting.pop_event().unwrap();
        assert_eq!(popped.event_type.name(), "IDEA");
        assert!(meeting.pop_event().is_none());
    }

    #[test]
    fn test_event_timestamp_copies_message() {
        let mut meeting = meeting();
        let mut tracked = meeting.track_message(&chat("alice", "#info x"));
        tracked.timestamp = Utc.with_ymd_and_hms(2024, 3, 11, 18, 30, 0).unwrap();
        let event = meeting.track_event(
            EventType::Info {
                text: "x".to_string(),
            },
            &tracked,
        );
        assert_eq!(event.timestamp, tracked.timestamp);
    }

    #[test]
    fn test_event_display_name() {
        let mut meeting = meeting();
        let tracked = meeting.track_message(&chat("alice", "#info x"));
        let mut event = meeting.track_event(
            EventType::Info {
                text: "x".to_string(),
            },
            &tracked,
        );
        event.timestamp = Utc.with_ymd_and_hms(2024, 3, 11, 18, 30, 0).unwrap();
        assert_eq!(
            event.display_name(),
            format!("{}@2024-03-11T18:30+0000", event.id)
        );
    }

    #[test]
    fn test_event_wire_tokens() {
        let mut meeting = meeting();
        let tracked = meeting.track_message(&chat("alice", "#chair bob"));
        let event = meeting.track_event(
            EventType::AddChair {
                chairs: vec!["alice".to_string(), "bob".to_string()],
            },
            &tracked,
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "ADD_CHAIR");
        assert_eq!(json["attributes"]["chairs"][1], "bob");
        assert_eq!(json["message"]["sender"], "alice");
    }

    #[test]
    fn test_unit_event_has_no_attributes() {
        let mut meeting = meeting();
        let tracked = meeting.track_message(&chat("alice", "#startmeeting"));
        let event = meeting.track_event(EventType::StartMeeting, &tracked);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "START_MEETING");
        assert!(json.get("attributes").is_none());
    }

    #[test]
    fn test_vote_action_tokens() {
        let json = serde_json::to_value(EventType::Vote {
            action: VoteAction::InFavor,
        })
        .unwrap();
        assert_eq!(json["attributes"]["action"], "+1");
        assert_eq!(VoteAction::Opposed.token(), "-1");
    }

    #[test]
    fn test_meeting_round_trips_through_json() {
        let mut meeting = meeting();
        meeting.original_topic = Some("general chat".to_string());
        let start = meeting.track_message(&chat("alice", "#startmeeting kickoff"));
        meeting.track_event(EventType::StartMeeting, &start);
        meeting.meeting_topic = Some("kickoff".to_string());
        meeting.active = true;

        let link = meeting.track_message(&chat("bob", "http://example.com/agenda"));
        meeting.track_event(
            EventType::Link {
                url: "http://example.com/agenda".to_string(),
            },
            &link,
        );
        let vote = meeting.track_message(&chat("carol", "#vote +1"));
        meeting.track_event(
            EventType::Vote {
                action: VoteAction::InFavor,
            },
            &vote,
        );
        meeting.mark_completed();

        let json = serde_json::to_string_pretty(&meeting).unwrap();
        let parsed: Meeting = serde_json::from_str(&json).unwrap();
        assert_eq!(meeting, parsed);
    }
}
