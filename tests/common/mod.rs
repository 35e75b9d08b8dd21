//! Integration test common infrastructure.
//!
//! Provides a recording [`Context`], message builders, and filesystem
//! helpers for driving the engine end to end against a temp directory.

use slirc_meetbot::{Config, Context, Message};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A context that records everything the engine says.
#[derive(Default)]
pub struct RecordingContext {
    pub replies: Vec<String>,
    pub messages: Vec<String>,
    pub topics: Vec<String>,
}

impl Context for RecordingContext {
    fn send_reply(&mut self, text: &str) {
        self.replies.push(text.to_string());
    }

    fn send_message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn set_topic(&mut self, text: &str) {
        self.topics.push(text.to_string());
    }
}

/// A chat line in `#dev` on `libera`.
#[allow(dead_code)]
pub fn chat(nick: &str, payload: &str) -> Message {
    Message::new(nick, "#dev", "libera", payload)
}

/// A configuration writing under `{temp}/meetings`.
#[allow(dead_code)]
pub fn test_config(temp: &TempDir) -> Arc<Config> {
    Arc::new(Config {
        log_dir: temp.path().join("meetings"),
        ..Config::default()
    })
}

/// Find the first file under `dir` (recursively) whose name ends with
/// `suffix`.
#[allow(dead_code)]
pub fn find_by_suffix(dir: &Path, suffix: &str) -> Option<PathBuf> {
    for entry in std::fs::read_dir(dir).ok()?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if let Some(found) = find_by_suffix(&path, suffix) {
                return Some(found);
            }
        } else if path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(suffix))
        {
            return Some(path);
        }
    }
    None
}
