//! Command recognition and dispatch.
//!
//! [`CommandDispatcher`] routes tracked messages to handler functions
//! through a table built at construction: operation names (without the `#`)
//! map to plain function pointers, and alias spellings map to the same
//! pointer as their canonical command. Messages that carry no operation are
//! scanned for a bare URL, which dispatches as `#link`. Everything else
//! falls through silently.

mod handlers;
mod parse;

pub use parse::is_startmeeting;

use crate::config::Config;
use crate::interface::Context;
use crate::meeting::{Meeting, TrackedMessage};
use crate::writer::MeetingWriter;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Handler signature shared by every command.
///
/// Handlers receive the dispatcher (for config and writer access), the
/// meeting under its registry lock, the reply context, the operation name
/// and operand, and the tracked message that carried the command.
type CommandHandler =
    fn(&CommandDispatcher, &mut Meeting, &mut dyn Context, &str, &str, &TrackedMessage);

/// Build the operation table.
fn handler_table() -> HashMap<&'static str, CommandHandler> {
    let mut table: HashMap<&'static str, CommandHandler> = HashMap::new();

    // Meeting lifecycle
    table.insert("startmeeting", handlers::startmeeting);
    table.insert("endmeeting", handlers::endmeeting);
    table.insert("save", handlers::save);
    table.insert("lurk", handlers::lurk);
    table.insert("unlurk", handlers::unlurk);

    // Topics
    table.insert("meetingtopic", handlers::meetingtopic);
    table.insert("topic", handlers::topic);

    // Roster and attendance
    table.insert("chair", handlers::chair);
    table.insert("unchair", handlers::unchair);
    table.insert("nick", handlers::nick);
    table.insert("here", handlers::here);

    // History
    table.insert("undo", handlers::undo);
    table.insert("meetingname", handlers::meetingname);

    // Minutes items; #accepted and #failed each with their alias spellings
    table.insert("accepted", handlers::accepted);
    table.insert("accept", handlers::accepted);
    table.insert("agree", handlers::accepted);
    table.insert("agreed", handlers::accepted);
    table.insert("failed", handlers::failed);
    table.insert("fail", handlers::failed);
    table.insert("reject", handlers::failed);
    table.insert("rejected", handlers::failed);
    table.insert("action", handlers::action);
    table.insert("info", handlers::info);
    table.insert("idea", handlers::idea);
    table.insert("help", handlers::help);
    table.insert("link", handlers::link);

    // Voting
    table.insert("motion", handlers::motion);
    table.insert("vote", handlers::vote);

    table
}

/// All commands the dispatcher understands, `#`-prefixed and sorted.
pub fn list_commands() -> Vec<String> {
    let mut commands: Vec<String> = handler_table()
        .keys()
        .map(|name| format!("#{name}"))
        .collect();
    commands.sort();
    commands
}

/// Routes tracked messages to command handlers.
///
/// The dispatcher is shared across meetings; per-meeting state lives in the
/// [`Meeting`] it is handed, so dispatch needs only `&self`.
pub struct CommandDispatcher {
    config: Arc<Config>,
    writer: Arc<dyn MeetingWriter>,
    handlers: HashMap<&'static str, CommandHandler>,
}

impl CommandDispatcher {
    /// Create a dispatcher over a configuration and a writer.
    pub fn new(config: Arc<Config>, writer: Arc<dyn MeetingWriter>) -> Self {
        Self {
            config,
            writer,
            handlers: handler_table(),
        }
    }

    /// Interpret one tracked message against a meeting.
    ///
    /// An operation outranks a URL: `#info http://x` is an info item, not a
    /// link. Unknown operations and plain chat dispatch nothing.
    pub fn dispatch(
        &self,
        meeting: &mut Meeting,
        context: &mut dyn Context,
        message: &TrackedMessage,
    ) {
        if let Some(operation) = parse::parse_operation(&message.payload) {
            match self.handlers.get(operation.name.as_str()) {
                Some(handler) => {
                    debug!(
                        meeting = %meeting.key(),
                        operation = %operation.name,
                        sender = %message.sender,
                        "dispatching command"
                    );
                    handler(
                        self,
                        meeting,
                        context,
                        &operation.name,
                        &operation.operand,
                        message,
                    );
                }
                None => {
                    debug!(operation = %operation.name, "ignoring unknown command");
                }
            }
        } else if let Some(url) = parse::parse_url(&message.payload) {
            handlers::link(self, meeting, context, "link", &url, message);
        }
    }
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("config", &self.config)
            .field("commands", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_commands_is_sorted_and_complete() {
        let expected = vec![
            "#accept",
            "#accepted",
            "#action",
            "#agree",
            "#agreed",
            "#chair",
            "#endmeeting",
            "#fail",
            "#failed",
            "#help",
            "#here",
            "#idea",
            "#info",
            "#link",
            "#lurk",
            "#meetingname",
            "#meetingtopic",
            "#motion",
            "#nick",
            "#reject",
            "#rejected",
            "#save",
            "#startmeeting",
            "#topic",
            "#unchair",
            "#undo",
            "#unlurk",
            "#vote",
        ];
        assert_eq!(list_commands(), expected);
    }

    #[test]
    fn test_table_keys_are_lowercase_and_bare() {
        for key in handler_table().keys() {
            assert_eq!(*key, key.to_lowercase());
            assert!(!key.starts_with('#'));
        }
    }
}
