use std::time::Duration;

use instant::Instant;

/// Double-tap detector for a level-style touch line (or mouse button).
///
/// A tap is a press edge. Two taps closer than `window` make one gesture;
/// after a gesture the next tap starts a fresh pair, so a triple tap still
/// reports once.
pub struct DoubleTap {
    window: Duration,
    was_down: bool,
    last_tap: Option<Instant>,
}

impl DoubleTap {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            was_down: false,
            last_tap: None,
        }
    }

    /// Feed the current line level. Returns true when a gesture completes.
    pub fn update(&mut self, down: bool, now: Instant) -> bool {
        let pressed = down && !self.was_down;
        self.was_down = down;
        pressed && self.tap(now)
    }

    /// Register one tap. Returns true when it completes a gesture.
    pub fn tap(&mut self, now: Instant) -> bool {
        match self.last_tap {
            Some(prev) if now.saturating_duration_since(prev) < self.window => {
                self.last_tap = None;
                true
            }
            _ => {
                self.last_tap = Some(now);
                false
            }
        }
    }
}
