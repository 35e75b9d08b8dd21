//! # slirc-meetbot
//!
//! Meeting-minutes engine for IRC channels, in the Straylight family.
//!
//! The engine watches channel traffic for an active meeting, interprets
//! `#commands` embedded in chat (`#startmeeting`, `#topic`, `#action`, ...)
//! and keeps an auditable event history that formatters turn into minutes.
//! IRC connectivity is the adapter's business: the adapter feeds each
//! channel line to [`Meetbot::handle_message`] together with a [`Context`]
//! that knows how to reply and change topics on its network.
//!
//! ## Quick start
//!
//! ```rust
//! use slirc_meetbot::{Config, Context, Meetbot, Message};
//! use std::sync::Arc;
//!
//! struct Replies(Vec<String>);
//!
//! impl Context for Replies {
//!     fn send_reply(&mut self, text: &str) {
//!         self.0.push(text.to_string());
//!     }
//!     fn send_message(&mut self, text: &str) {
//!         self.0.push(text.to_string());
//!     }
//!     fn set_topic(&mut self, _text: &str) {}
//! }
//!
//! let bot = Meetbot::new(Arc::new(Config::default()));
//! let mut ctx = Replies(Vec::new());
//!
//! bot.handle_message(&mut ctx, &Message::new("alice", "#dev", "libera", "#startmeeting"));
//! assert!(ctx.0[0].starts_with("Meeting started at "));
//! ```
//!
//! Everything a meeting records ends up in a raw JSON log that round-trips
//! through [`writer::load_meeting`]; the `meetbot` binary can rebuild the
//! formatted log and minutes from it at any time.

#![warn(missing_docs)]

pub mod command;
pub mod config;
pub mod dates;
pub mod error;
pub mod handler;
pub mod interface;
pub mod location;
pub mod meeting;
pub mod state;
pub mod writer;

pub use command::{CommandDispatcher, is_startmeeting, list_commands};
pub use config::{Config, ConfigError};
pub use error::{RawLogError, WriteError};
pub use handler::Meetbot;
pub use interface::{Context, Message};
pub use location::{Location, Locations};
pub use meeting::{EventType, Meeting, TrackedEvent, TrackedMessage, VoteAction, meeting_key};
pub use state::MeetingRegistry;
pub use writer::{FileWriter, MeetingWriter, load_meeting};
