//! Shared registry of active and recently completed meetings.
//!
//! The registry is the engine's concurrency seam. DashMap shards guard the
//! active set, and every meeting carries its own mutex, held across
//! track + dispatch, so a meeting sees at most one line in flight while
//! distinct channels proceed in parallel.

use crate::meeting::{Meeting, meeting_key};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Maximum number of completed meetings kept for recall.
const COMPLETED_CAPACITY: usize = 16;

/// Shared handle to one meeting.
pub type SharedMeeting = Arc<Mutex<Meeting>>;

/// Concurrent meeting registry: at most one active meeting per
/// channel/network pair, plus a bounded history of completed meetings,
/// most recent first.
#[derive(Default)]
pub struct MeetingRegistry {
    active: DashMap<String, SharedMeeting>,
    completed: Mutex<VecDeque<SharedMeeting>>,
}

impl MeetingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the active meeting for a channel/network pair.
    pub fn get_meeting(&self, channel: &str, network: &str) -> Option<SharedMeeting> {
        self.active
            .get(&meeting_key(channel, network))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Insert a meeting into the active set and return its shared handle.
    pub fn open_meeting(&self, meeting: Meeting) -> SharedMeeting {
        let key = meeting.key();
        debug!(meeting = %key, founder = %meeting.founder, "opening meeting");
        let shared: SharedMeeting = Arc::new(Mutex::new(meeting));
        self.active.insert(key, Arc::clone(&shared));
        shared
    }

    /// Snapshot the active meetings, in no particular order.
    pub fn active_meetings(&self) -> Vec<SharedMeeting> {
        self.active
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Snapshot the completed history, most recent first.
    pub fn completed_meetings(&self) -> Vec<SharedMeeting> {
        self.completed.lock().iter().cloned().collect()
    }

    /// Move a meeting out of the active set into the completed history.
    ///
    /// Returns the handle when the key was active. History is bounded at
    /// [`COMPLETED_CAPACITY`]; the oldest completed meeting falls off.
    pub fn move_to_complete(&self, key: &str) -> Option<SharedMeeting> {
        let (_, shared) = self.active.remove(key)?;
        let mut completed = self.completed.lock();
        completed.push_front(Arc::clone(&shared));
        while completed.len() > COMPLETED_CAPACITY {
            completed.pop_back();
        }
        debug!(meeting = %key, "meeting moved to completed history");
        Some(shared)
    }
}
