//! Presentation sink
//!
//! The simulation never talks to a UI directly. It reports user-facing
//! notifications, event-log lines and "state changed, redraw" hints to an
//! `Observer`; the front end decides what to do with them.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

pub trait Observer {
    /// Toast-style message shown for `duration_ms`
    fn notify(&mut self, message: &str, severity: Severity, duration_ms: u64);
    /// Line for the event log
    fn log_event(&mut self, message: &str);
    /// Visible state changed
    fn render(&mut self);
}

/// Most recent event-log lines, newest first, oldest dropped past the cap
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecentEvents {
    cap: usize,
    lines: VecDeque<String>,
}

impl RecentEvents {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            lines: VecDeque::with_capacity(cap),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_front(line.into());
        self.lines.truncate(self.cap);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn latest(&self) -> Option<&str> {
        self.lines.front().map(String::as_str)
    }
}

impl Default for RecentEvents {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Keeps everything it is told; used by headless runs and tests
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    pub recent: RecentEvents,
    pub notifications: Vec<(String, Severity)>,
    pub renders: usize,
}

impl RecordingObserver {
    pub fn new(cap: usize) -> Self {
        Self {
            recent: RecentEvents::new(cap),
            ..Self::default()
        }
    }

    pub fn last_notification(&self) -> Option<&(String, Severity)> {
        self.notifications.last()
    }
}

impl Observer for RecordingObserver {
    fn notify(&mut self, message: &str, severity: Severity, _duration_ms: u64) {
        self.notifications.push((message.to_string(), severity));
    }

    fn log_event(&mut self, message: &str) {
        self.recent.push(message);
    }

    fn render(&mut self) {
        self.renders += 1;
    }
}

/// Forwards everything to `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn notify(&mut self, message: &str, severity: Severity, _duration_ms: u64) {
        match severity {
            Severity::Error => tracing::error!(target: "dominion::notify", "{}", message),
            Severity::Warning => tracing::warn!(target: "dominion::notify", "{}", message),
            Severity::Info | Severity::Success => tracing::info!(target: "dominion::notify", "{}", message),
        }
    }

    fn log_event(&mut self, message: &str) {
        tracing::info!(target: "dominion::events", "{}", message);
    }

    fn render(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_events_cap() {
        let mut recent = RecentEvents::new(10);
        for i in 0..15 {
            recent.push(format!("event {}", i));
        }
        assert_eq!(recent.len(), 10);
        assert_eq!(recent.latest(), Some("event 14"));
        assert_eq!(recent.iter().last(), Some("event 5"));
    }

    #[test]
    fn test_recording_observer() {
        let mut obs = RecordingObserver::new(3);
        obs.notify("hello", Severity::Success, 3000);
        obs.log_event("a");
        obs.render();
        assert_eq!(obs.renders, 1);
        assert_eq!(obs.last_notification().unwrap().1, Severity::Success);
        assert_eq!(obs.recent.latest(), Some("a"));
    }
}
