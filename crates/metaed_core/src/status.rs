//! Single-line status area.
//!
//! # Invariants
//! - Holds at most one message.
//! - Messages starting with [`ERROR_PREFIX`] never auto-clear.

use std::fmt::Display;
use std::time::{Duration, Instant};

pub const ERROR_PREFIX: &str = "Error: ";
pub const DEFAULT_CLEAR_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    text: String,
    set_at: Instant,
}

impl StatusMessage {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_error(&self) -> bool {
        self.text.starts_with(ERROR_PREFIX)
    }

    pub fn set_at(&self) -> Instant {
        self.set_at
    }
}

#[derive(Debug, Clone)]
pub struct StatusLine {
    current: Option<StatusMessage>,
    clear_delay: Duration,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new(DEFAULT_CLEAR_DELAY)
    }
}

impl StatusLine {
    pub fn new(clear_delay: Duration) -> Self {
        Self {
            current: None,
            clear_delay,
        }
    }

    pub fn clear_delay(&self) -> Duration {
        self.clear_delay
    }

    /// Replaces the current message, stamped with `now`.
    pub fn set_at(&mut self, text: impl Into<String>, now: Instant) {
        self.current = Some(StatusMessage {
            text: text.into(),
            set_at: now,
        });
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.set_at(text, Instant::now());
    }

    /// Records `detail` as a persistent error message.
    pub fn set_error(&mut self, detail: impl Display) {
        self.set(format!("{ERROR_PREFIX}{detail}"));
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Drops an expired non-error message. Returns `true` when cleared.
    pub fn tick(&mut self, now: Instant) -> bool {
        let expired = self.current.as_ref().is_some_and(|message| {
            !message.is_error() && now.saturating_duration_since(message.set_at) >= self.clear_delay
        });
        if expired {
            self.current = None;
        }
        expired
    }

    pub fn current(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }

    pub fn text(&self) -> Option<&str> {
        self.current.as_ref().map(StatusMessage::text)
    }
}

#[cfg(test)]
mod tests {
    use super::{StatusLine, ERROR_PREFIX};
    use std::time::{Duration, Instant};

    #[test]
    fn plain_message_clears_after_delay() {
        let start = Instant::now();
        let mut status = StatusLine::new(Duration::from_millis(100));
        status.set_at("Created Class 'Class1' in 'p'", start);

        assert!(!status.tick(start + Duration::from_millis(50)));
        assert!(status.text().is_some());
        assert!(status.tick(start + Duration::from_millis(100)));
        assert!(status.text().is_none());
    }

    #[test]
    fn error_message_persists_until_replaced() {
        let start = Instant::now();
        let mut status = StatusLine::new(Duration::from_millis(10));
        status.set_error("parse failed");

        assert!(!status.tick(start + Duration::from_secs(60)));
        let text = status.text().unwrap();
        assert!(text.starts_with(ERROR_PREFIX));

        status.set_at("ok", start);
        assert!(status.tick(start + Duration::from_secs(1)));
    }
}
