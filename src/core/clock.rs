//! Frame Rate Instrumentation
//!
//! Optional FPS counter fed by the host's monotonic clock.
//! Nothing in the simulation depends on it.

use std::time::{Duration, Instant};

/// Counts frames and reports frames-per-second once per elapsed second.
#[derive(Clone, Debug)]
pub struct FrameCounter {
    frame_count: u32,
    last_report: Instant,
    last_fps: Option<u32>,
}

impl FrameCounter {
    /// Reporting window.
    pub const WINDOW: Duration = Duration::from_secs(1);

    /// Create a counter starting at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            frame_count: 0,
            last_report: now,
            last_fps: None,
        }
    }

    /// Record one frame. Returns the FPS when a window has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        self.frame_count += 1;
        if now.duration_since(self.last_report) >= Self::WINDOW {
            let fps = self.frame_count;
            self.frame_count = 0;
            self.last_report = now;
            self.last_fps = Some(fps);
            return Some(fps);
        }
        None
    }

    /// Most recently reported FPS.
    pub fn last_fps(&self) -> Option<u32> {
        self.last_fps
    }
}
