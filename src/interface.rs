//! The adapter seam: inbound messages and outbound callbacks.
//!
//! The IRC connection lives outside this crate. For every channel line the
//! adapter builds a [`Message`] and hands it to the engine together with a
//! [`Context`] implementation that knows how to talk back to its network.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One inbound channel line, as delivered by the adapter.
#[derive(Debug, Clone)]
pub struct Message {
    /// Unique message id (uuid hex).
    pub id: String,
    /// Arrival time, UTC.
    pub timestamp: DateTime<Utc>,
    /// Sender nick.
    pub nick: String,
    /// Channel the line was sent to, with its leading `#`.
    pub channel: String,
    /// Network identifier the adapter is connected to.
    pub network: String,
    /// Message body as received (CTCP envelope included for actions).
    pub payload: String,
    /// Channel topic at delivery time, when the adapter knows it.
    pub topic: Option<String>,
    /// Channel roster at delivery time, when the adapter knows it.
    pub roster: Option<Vec<String>>,
}

impl Message {
    /// Build a message with a fresh id and the current time.
    pub fn new(nick: &str, channel: &str, network: &str, payload: &str) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            timestamp: Utc::now(),
            nick: nick.to_string(),
            channel: channel.to_string(),
            network: network.to_string(),
            payload: payload.to_string(),
            topic: None,
            roster: None,
        }
    }

    /// Attach the channel-topic snapshot.
    pub fn with_topic(mut self, topic: &str) -> Self {
        self.topic = Some(topic.to_string());
        self
    }

    /// Attach the channel-roster snapshot.
    pub fn with_roster(mut self, roster: Vec<String>) -> Self {
        self.roster = Some(roster);
        self
    }
}

/// Outbound callbacks the adapter provides for one delivery.
///
/// Implementations decide what a reply means on their transport - a PRIVMSG
/// back to the channel, a buffered test assertion, and so on. The engine
/// never holds a context across deliveries.
pub trait Context {
    /// Send a reply to the channel the triggering message came from.
    fn send_reply(&mut self, text: &str);

    /// Send a message to the channel. Same transport as a reply; kept
    /// separate so adapters can route unsolicited output differently.
    fn send_message(&mut self, text: &str);

    /// Replace the channel topic.
    fn set_topic(&mut self, text: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_has_id_and_timestamp() {
        let message = Message::new("alice", "#dev", "libera", "hello");
        assert_eq!(message.id.len(), 32);
        assert_eq!(message.nick, "alice");
        assert_eq!(message.channel, "#dev");
        assert_eq!(message.network, "libera");
        assert!(message.topic.is_none());
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::new("a", "#c", "n", "x");
        let b = Message::new("a", "#c", "n", "x");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_with_topic_and_roster() {
        let message = Message::new("alice", "#dev", "libera", "hello")
            .with_topic("general chat")
            .with_roster(vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(message.topic.as_deref(), Some("general chat"));
        assert_eq!(message.roster.as_ref().map(Vec::len), Some(2));
    }
}
