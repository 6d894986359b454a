//! Paced reveal of an already complete reply.
//!
//! Purely cosmetic: the full text is known up front, this only decides how
//! much of it to draw.

use std::time::{Duration, Instant};

/// Drawn after the revealed text while the animation runs.
pub const CURSOR: &str = "▌";

#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    delay: Duration,
    started: Instant,
    total_chars: usize,
    revealed_chars: usize,
}

impl Typewriter {
    pub fn new(text: impl Into<String>, delay: Duration) -> Self {
        let text = text.into();
        let total_chars = text.chars().count();
        Self {
            text,
            delay,
            started: Instant::now(),
            total_chars,
            revealed_chars: 0,
        }
    }

    /// Reveal one character per `delay` since the animation started.
    pub fn advance_to(&mut self, elapsed: Duration) {
        let target = if self.delay.is_zero() {
            self.total_chars
        } else {
            (elapsed.as_nanos() / self.delay.as_nanos()).min(self.total_chars as u128) as usize
        };
        self.revealed_chars = self.revealed_chars.max(target);
    }

    pub fn tick(&mut self, now: Instant) {
        self.advance_to(now.saturating_duration_since(self.started));
    }

    pub fn finish(&mut self) {
        self.revealed_chars = self.total_chars;
    }

    pub fn is_done(&self) -> bool {
        self.revealed_chars >= self.total_chars
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn visible(&self) -> &str {
        let end = self
            .text
            .char_indices()
            .nth(self.revealed_chars)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len());
        &self.text[..end]
    }

    /// What to draw this frame: the revealed prefix plus the cursor while running.
    pub fn frame(&self) -> String {
        if self.is_done() {
            self.text.clone()
        } else {
            format!("{}{}", self.visible(), CURSOR)
        }
    }
}
