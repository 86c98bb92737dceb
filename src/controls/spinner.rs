//! Frame-based spinner for loading indicators.

use std::time::{Duration, Instant};

/// Braille animation frames.
pub const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const INTERVAL: Duration = Duration::from_millis(80);

/// Spinner whose frame is derived from elapsed time, so it needs no task.
#[derive(Debug, Clone, Copy)]
pub struct Spinner {
    started: Instant,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spinner {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn frame(&self) -> &'static str {
        Self::frame_at(self.started.elapsed())
    }

    pub fn frame_at(elapsed: Duration) -> &'static str {
        let idx = (elapsed.as_millis() / INTERVAL.as_millis()) as usize % FRAMES.len();
        FRAMES[idx]
    }
}
