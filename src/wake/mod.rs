pub mod tap;
pub mod touch;

pub use tap::DoubleTap;
pub use touch::{spawn_touch_watcher, watch_touch, TouchSensor};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Create a single-slot wake signal. The trigger half goes to whoever
/// detects gestures; the signal half goes to the engine.
pub fn wake_channel() -> (WakeTrigger, WakeSignal) {
    let slot = Arc::new(AtomicBool::new(false));
    (
        WakeTrigger { slot: slot.clone() },
        WakeSignal { slot },
    )
}

/// Producer half. Firing twice before the engine looks still wakes once.
#[derive(Debug, Clone)]
pub struct WakeTrigger {
    slot: Arc<AtomicBool>,
}

impl WakeTrigger {
    pub fn fire(&self) {
        self.slot.store(true, Ordering::Release);
    }
}

/// Consumer half, read only by the engine.
#[derive(Debug)]
pub struct WakeSignal {
    slot: Arc<AtomicBool>,
}

impl WakeSignal {
    /// Look without consuming.
    pub fn is_pending(&self) -> bool {
        self.slot.load(Ordering::Acquire)
    }

    /// Consume a pending gesture. True at most once per gesture.
    pub fn take(&self) -> bool {
        self.slot.swap(false, Ordering::AcqRel)
    }

    /// Drop whatever is pending.
    pub fn clear(&self) {
        self.slot.store(false, Ordering::Release);
    }

    /// False once every trigger is gone (sensor failed or watcher exited).
    pub fn is_connected(&self) -> bool {
        Arc::strong_count(&self.slot) > 1
    }
}

/// How the engine learns the pet should wake.
#[derive(Debug)]
pub enum Wake {
    /// No gesture source at all (touch disabled): the pet wakes by itself
    /// after each sleep clip.
    Unattached,
    /// Gesture-driven: the pet sleeps until the signal fires.
    Signal(WakeSignal),
}
