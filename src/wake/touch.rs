use std::thread::JoinHandle;
use std::time::Duration;

use glam::UVec2;
use instant::Instant;

use super::{wake_channel, DoubleTap, Wake, WakeTrigger};
use crate::error::{Error, SensorError};
use crate::util::CancelToken;

/// Touch controller contract.
pub trait TouchSensor: Send {
    fn initialize(&mut self) -> Result<(), SensorError>;
    /// Interrupt-line level: true while the controller reports a touch.
    fn is_asserted(&mut self) -> Result<bool, SensorError>;
    /// Current touch point. Also acknowledges the report on controllers that
    /// latch their interrupt.
    fn read_point(&mut self) -> Result<UVec2, SensorError>;
}

/// Start a background poller that turns double taps into wake events.
///
/// Sensor failures are not fatal: if the sensor fails to initialise, no
/// thread is started and the trigger is dropped, so the pet never wakes by
/// touch. A read error later on stops the poller the same way.
pub fn spawn_touch_watcher<T: TouchSensor + 'static>(
    mut sensor: T,
    trigger: WakeTrigger,
    cancel: CancelToken,
    double_tap_window: Duration,
    poll_interval: Duration,
) -> Option<JoinHandle<()>> {
    if let Err(e) = sensor.initialize() {
        log::warn!("Touch sensor unavailable ({e}); the pet will not wake on tap");
        return None;
    }

    let spawned = std::thread::Builder::new()
        .name("touch-watcher".into())
        .spawn(move || {
            let mut detector = DoubleTap::new(double_tap_window);
            while !cancel.is_cancelled() {
                if let Err(e) = poll_once(&mut sensor, &mut detector, &trigger) {
                    log::warn!("Touch sensor read failed ({e}); wake on tap disabled");
                    return;
                }
                std::thread::sleep(poll_interval);
            }
            log::debug!("Touch watcher stopped");
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("Could not start touch watcher: {e}");
            None
        }
    }
}

/// Wake source for a touch controller that may have failed to open.
///
/// An open failure degrades the same way as a failed initialise: the engine
/// gets a signal with no trigger behind it, so the pet never wakes by touch.
pub fn watch_touch<T: TouchSensor + 'static>(
    sensor: Result<T, SensorError>,
    cancel: CancelToken,
    double_tap_window: Duration,
    poll_interval: Duration,
) -> (Wake, Option<JoinHandle<()>>) {
    let (trigger, signal) = wake_channel();
    let watcher = match sensor {
        Ok(sensor) => spawn_touch_watcher(sensor, trigger, cancel, double_tap_window, poll_interval),
        Err(e) => {
            log::warn!("{}; the pet will not wake on tap", Error::from(e));
            None
        }
    };
    (Wake::Signal(signal), watcher)
}

fn poll_once<T: TouchSensor>(
    sensor: &mut T,
    detector: &mut DoubleTap,
    trigger: &WakeTrigger,
) -> Result<(), SensorError> {
    let down = sensor.is_asserted()?;
    if down {
        let point = sensor.read_point()?;
        log::trace!("Touch at ({}, {})", point.x, point.y);
    }
    if detector.update(down, Instant::now()) {
        log::info!("Double tap detected");
        trigger.fire();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wake::wake_channel;
    use std::collections::VecDeque;

    /// Replays a list of line levels, then reports "not touched" forever.
    struct ScriptedSensor {
        levels: VecDeque<bool>,
        fail_init: bool,
        fail_read_after: Option<usize>,
        reads: usize,
    }

    impl ScriptedSensor {
        fn new(levels: &[bool]) -> Self {
            Self {
                levels: levels.iter().copied().collect(),
                fail_init: false,
                fail_read_after: None,
                reads: 0,
            }
        }
    }

    impl TouchSensor for ScriptedSensor {
        fn initialize(&mut self) -> Result<(), SensorError> {
            if self.fail_init {
                return Err(SensorError::Bus("i2c nack".into()));
            }
            Ok(())
        }
        fn is_asserted(&mut self) -> Result<bool, SensorError> {
            self.reads += 1;
            if self.fail_read_after.is_some_and(|n| self.reads > n) {
                return Err(SensorError::Bus("i2c timeout".into()));
            }
            Ok(self.levels.pop_front().unwrap_or(false))
        }
        fn read_point(&mut self) -> Result<UVec2, SensorError> {
            Ok(UVec2::new(10, 20))
        }
    }

    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn poll_once_fires_on_second_tap() {
        let (trigger, signal) = wake_channel();
        let mut sensor = ScriptedSensor::new(&[true, false, true]);
        let mut detector = DoubleTap::new(Duration::from_secs(5));
        for _ in 0..3 {
            poll_once(&mut sensor, &mut detector, &trigger).unwrap();
        }
        assert!(signal.take());
        assert!(!signal.take());
    }

    #[test]
    fn watcher_turns_double_tap_into_wake() {
        let (trigger, signal) = wake_channel();
        let cancel = CancelToken::new();
        let handle = spawn_touch_watcher(
            ScriptedSensor::new(&[true, false, true, false]),
            trigger,
            cancel.clone(),
            Duration::from_secs(5),
            Duration::from_millis(1),
        )
        .unwrap();

        assert!(wait_for(|| signal.is_pending()));
        cancel.cancel();
        handle.join().unwrap();
        assert!(signal.take());
    }

    #[test]
    fn failed_init_degrades_to_never_wake() {
        let (trigger, signal) = wake_channel();
        let mut sensor = ScriptedSensor::new(&[true, false, true]);
        sensor.fail_init = true;

        let handle = spawn_touch_watcher(
            sensor,
            trigger,
            CancelToken::new(),
            Duration::from_secs(5),
            Duration::from_millis(1),
        );
        assert!(handle.is_none());
        assert!(!signal.is_connected());
        assert!(!signal.is_pending());
    }

    #[test]
    fn unopenable_controller_never_wakes() {
        let (wake, watcher) = watch_touch::<ScriptedSensor>(
            Err(SensorError::Bus("/dev/i2c-1: no such device".into())),
            CancelToken::new(),
            Duration::from_secs(5),
            Duration::from_millis(1),
        );
        assert!(watcher.is_none());
        let Wake::Signal(signal) = wake else { panic!("expected a signal") };
        assert!(!signal.is_connected());
    }

    #[test]
    fn opened_controller_is_watched() {
        let cancel = CancelToken::new();
        let (wake, watcher) = watch_touch(
            Ok(ScriptedSensor::new(&[true, false, true])),
            cancel.clone(),
            Duration::from_secs(5),
            Duration::from_millis(1),
        );
        let Wake::Signal(signal) = wake else { panic!("expected a signal") };
        assert!(wait_for(|| signal.is_pending()));
        cancel.cancel();
        watcher.unwrap().join().unwrap();
    }

    #[test]
    fn read_failure_stops_watcher() {
        let (trigger, signal) = wake_channel();
        let mut sensor = ScriptedSensor::new(&[]);
        sensor.fail_read_after = Some(3);

        let handle = spawn_touch_watcher(
            sensor,
            trigger,
            CancelToken::new(),
            Duration::from_secs(5),
            Duration::from_millis(1),
        )
        .unwrap();
        handle.join().unwrap();
        assert!(!signal.is_connected());
    }
}
