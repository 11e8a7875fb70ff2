use std::path::PathBuf;
use std::time::Duration;

use glam::UVec2;

use crate::frames::Threshold;
use crate::pet::WakePolicy;

/// Canvas width in pixels (panel is mounted landscape).
pub const SCREEN_WIDTH: u32 = 250;
/// Canvas height in pixels.
pub const SCREEN_HEIGHT: u32 = 122;
/// Wait between successive frame presentations.
pub const FRAME_DELAY: Duration = Duration::from_millis(500);
/// Frame assets live under `<ASSET_ROOT>/<clip>/frame_<index>.png`.
pub const ASSET_ROOT: &str = "animations";
/// Luma above this is background (white), at or below is the cat (black).
pub const LUMA_CUTOFF: u8 = 128;
/// Two taps closer than this form one wake gesture.
pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(500);
/// How often the touch watcher samples the interrupt line.
pub const TOUCH_POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Preview window upscale factor.
pub const PREVIEW_SCALE: u32 = 2;

/// Runtime settings. Everything is a compile-time default except the
/// display mode, which comes from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub canvas: UVec2,
    pub frame_delay: Duration,
    pub asset_root: PathBuf,
    pub threshold: Threshold,
    pub double_tap_window: Duration,
    pub touch_poll_interval: Duration,
    pub wake_policy: WakePolicy,
    pub preview_scale: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas: UVec2::new(SCREEN_WIDTH, SCREEN_HEIGHT),
            frame_delay: FRAME_DELAY,
            asset_root: PathBuf::from(ASSET_ROOT),
            threshold: Threshold::Cutoff(LUMA_CUTOFF),
            double_tap_window: DOUBLE_TAP_WINDOW,
            touch_poll_interval: TOUCH_POLL_INTERVAL,
            wake_policy: WakePolicy::BetweenPasses,
            preview_scale: PREVIEW_SCALE,
        }
    }
}

impl Settings {
    /// Preview window size in physical pixels.
    pub fn preview_size(&self) -> UVec2 {
        self.canvas * self.preview_scale
    }
}
