//! Rolling status feed - the simulation's narrated event stream.
//!
//! Systems push human-readable status lines here; the newest entries double
//! as the HUD status text. Every entry is also emitted through `log`.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use sitecrew_logic::clock::format_time;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimEvent {
    /// Simulated time the event was recorded at.
    pub time: f64,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct EventLog {
    now: f64,
    entries: VecDeque<SimEvent>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            now: 0.0,
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Set the timestamp stamped onto subsequent events.
    pub fn set_now(&mut self, now: f64) {
        self.now = now;
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("[{}] {}", format_time(self.now), message);
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(SimEvent {
            time: self.now,
            message,
        });
    }

    /// The most recent status line.
    pub fn latest(&self) -> Option<&SimEvent> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.now = 0.0;
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(64)
    }
}
