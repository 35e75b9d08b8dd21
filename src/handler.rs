//! The engine entry point: one inbound seam, plus administrative
//! operations.
//!
//! Adapters construct a [`Meetbot`] once and feed it every channel line
//! through [`Meetbot::handle_message`]. The engine decides whether the line
//! belongs to a meeting, opens one when a start command arrives in an
//! untracked channel, and routes everything else through the dispatcher
//! under the meeting's lock.

use crate::command::{self, CommandDispatcher};
use crate::config::Config;
use crate::dates;
use crate::interface::{Context, Message};
use crate::meeting::{Meeting, meeting_key};
use crate::state::MeetingRegistry;
use crate::writer::{FileWriter, MeetingWriter};
use std::sync::Arc;
use tracing::{error, info};

/// The meeting engine.
pub struct Meetbot {
    config: Arc<Config>,
    registry: MeetingRegistry,
    dispatcher: CommandDispatcher,
    writer: Arc<dyn MeetingWriter>,
}

impl Meetbot {
    /// Create an engine that writes artifacts to disk per `config`.
    pub fn new(config: Arc<Config>) -> Self {
        let writer: Arc<dyn MeetingWriter> = Arc::new(FileWriter::new(Arc::clone(&config)));
        Self::with_writer(config, writer)
    }

    /// Create an engine with a custom writer.
    pub fn with_writer(config: Arc<Config>, writer: Arc<dyn MeetingWriter>) -> Self {
        let dispatcher = CommandDispatcher::new(Arc::clone(&config), Arc::clone(&writer));
        Self {
            config,
            registry: MeetingRegistry::new(),
            dispatcher,
            writer,
        }
    }

    /// The registry of active and recently completed meetings.
    pub fn registry(&self) -> &MeetingRegistry {
        &self.registry
    }

    /// Feed one channel line into the engine.
    ///
    /// Lines for channels without an active meeting are dropped unless they
    /// open one, in which case the channel topic riding on the message is
    /// captured for restoration at the end. The meeting stays locked across
    /// track + dispatch, so each meeting sees at most one line in flight.
    pub fn handle_message(&self, context: &mut dyn Context, message: &Message) {
        let shared = match self.registry.get_meeting(&message.channel, &message.network) {
            Some(shared) => shared,
            None => {
                if !command::is_startmeeting(&message.payload) {
                    return;
                }
                let mut meeting = Meeting::new(&message.nick, &message.channel, &message.network);
                meeting.original_topic = message.topic.clone();
                self.registry.open_meeting(meeting)
            }
        };

        let mut meeting = shared.lock();
        let tracked = meeting.track_message(message);
        self.dispatcher.dispatch(&mut meeting, context, &tracked);

        if !meeting.active && meeting.end_time.is_some() {
            let key = meeting.key();
            drop(meeting);
            self.registry.move_to_complete(&key);
        }
    }

    /// Reply with the active meetings, one display name each.
    pub fn list_meetings(&self, context: &mut dyn Context) {
        let mut names: Vec<String> = self
            .registry
            .active_meetings()
            .iter()
            .map(|shared| {
                shared
                    .lock()
                    .display_name(&self.config.timezone, dates::DEFAULT_FORMAT)
            })
            .collect();
        if names.is_empty() {
            context.send_reply("No active meetings");
            return;
        }
        names.sort();
        context.send_reply(&names.join(", "));
    }

    /// Write every active meeting, reporting each failure and continuing.
    pub fn save_meetings(&self, context: &mut dyn Context) {
        let mut saved = 0;
        for shared in self.registry.active_meetings() {
            let meeting = shared.lock();
            match self.writer.write_meeting(&meeting) {
                Ok(_) => saved += 1,
                Err(err) => {
                    error!(meeting = %meeting.key(), error = %err, "failed to write meeting");
                    context.send_reply(&format!("Could not save meeting: {err}"));
                }
            }
        }
        context.send_reply(&format!("Saved {saved} meetings"));
    }

    /// Make `nick` the primary chair of the named meeting.
    pub fn add_chair(&self, context: &mut dyn Context, channel: &str, network: &str, nick: &str) {
        match self.registry.get_meeting(channel, network) {
            Some(shared) => {
                let mut meeting = shared.lock();
                meeting.add_chair(nick, true);
                info!(meeting = %meeting.key(), nick = %nick, "chair added by admin");
                let chairs: Vec<&str> = meeting.chairs.iter().map(String::as_str).collect();
                context.send_reply(&format!("Current chairs: {}", chairs.join(", ")));
            }
            None => {
                context.send_reply(&format!(
                    "Meeting not found: {}",
                    meeting_key(channel, network)
                ));
            }
        }
    }

    /// Drop the named meeting from the active set into the completed
    /// history, optionally writing it out first.
    pub fn delete_meeting(
        &self,
        context: &mut dyn Context,
        channel: &str,
        network: &str,
        save: bool,
    ) {
        let key = meeting_key(channel, network);
        match self.registry.move_to_complete(&key) {
            Some(shared) => {
                if save {
                    let meeting = shared.lock();
                    if let Err(err) = self.writer.write_meeting(&meeting) {
                        error!(meeting = %key, error = %err, "failed to write meeting");
                        context.send_reply(&format!("Could not save meeting: {err}"));
                    }
                }
                info!(meeting = %key, save, "meeting deleted by admin");
                context.send_reply(&format!("Meeting deleted: {key}"));
            }
            None => context.send_reply(&format!("Meeting not found: {key}")),
        }
    }

    /// Reply with recently completed meetings, most recent first.
    pub fn recent_meetings(&self, context: &mut dyn Context) {
        let names: Vec<String> = self
            .registry
            .completed_meetings()
            .iter()
            .map(|shared| {
                shared
                    .lock()
                    .display_name(&self.config.timezone, dates::DEFAULT_FORMAT)
            })
            .collect();
        if names.is_empty() {
            context.send_reply("No recent meetings");
            return;
        }
        context.send_reply(&names.join(", "));
    }

    /// Reply with every command the dispatcher understands.
    pub fn commands(&self, context: &mut dyn Context) {
        context.send_reply(&format!(
            "Available commands: {}",
            command::list_commands().join(" ")
        ));
    }

    /// Reply with the engine name and version.
    pub fn version(&self, context: &mut dyn Context) {
        context.send_reply(concat!("slirc-meetbot v", env!("CARGO_PKG_VERSION")));
    }
}
