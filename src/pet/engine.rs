use std::time::Duration;

use super::behavior::{decide, BehaviorState, IdleChooser, Transition};
use super::catalog::{clips, ClipCatalog};
use super::player::{play_clip, PlayOutcome, Stage};
use crate::error::Result;
use crate::wake::Wake;

/// Where the wake signal is looked at while the pet sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WakePolicy {
    /// Between whole passes of the `sleep` clip and at decision points.
    #[default]
    BetweenPasses,
    /// Only at decision points, after the whole `sleep` clip has played.
    DecisionPoint,
}

/// Result of one decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub transition: Transition,
    pub outcome: PlayOutcome,
    pub woke: bool,
    /// Frames shown by the clips of this step that played to the end.
    pub presented: u64,
}

/// Drives the pet: decide, play, repeat.
pub struct Engine<C> {
    catalog: ClipCatalog,
    state: BehaviorState,
    chooser: C,
    frame_delay: Duration,
    policy: WakePolicy,
    warned_deaf: bool,
}

impl<C: IdleChooser> Engine<C> {
    pub fn new(catalog: ClipCatalog, chooser: C, frame_delay: Duration, policy: WakePolicy) -> Self {
        debug_assert!(!frame_delay.is_zero());
        Self {
            catalog,
            state: BehaviorState::Idle,
            chooser,
            frame_delay,
            policy,
            warned_deaf: false,
        }
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    /// Run one decision point and play the chosen clip(s).
    pub fn step(&mut self, stage: &mut Stage<'_>, wake: &Wake) -> Result<StepReport> {
        let woke = self.state == BehaviorState::Sleeping
            && match wake {
                // Nothing to wait for: every finished sleep clip ends the nap.
                Wake::Unattached => true,
                Wake::Signal(signal) => signal.take(),
            };
        if woke {
            log::info!("Waking up");
        } else if let (BehaviorState::Sleeping, Wake::Signal(signal)) = (self.state, wake) {
            if !signal.is_connected() && !self.warned_deaf {
                log::warn!("No wake source is connected; the pet will sleep until stopped");
                self.warned_deaf = true;
            }
        }

        let from = self.state;
        let transition = decide(from, woke, &mut self.chooser);
        if transition.falls_asleep(from) {
            // Taps made while awake do not count towards waking up.
            if let Wake::Signal(signal) = wake {
                signal.clear();
            }
        }
        log::debug!(
            "{} -> {} via {:?}",
            from.label(),
            transition.next.label(),
            transition.clips
        );

        let interrupt = || match (self.policy, wake) {
            (WakePolicy::BetweenPasses, Wake::Signal(signal)) => signal.is_pending(),
            _ => false,
        };
        let never = || false;

        let mut outcome = PlayOutcome::Completed;
        let mut presented = 0;
        for &name in transition.clips {
            let spec = self.catalog.required(name);
            let check: &dyn Fn() -> bool = if name == clips::SLEEP {
                &interrupt
            } else {
                &never
            };
            outcome = play_clip(spec, self.frame_delay, stage, check)?;
            if outcome != PlayOutcome::Completed {
                break;
            }
            presented += spec.presentations(self.frame_delay);
        }

        // A clip too short for one pass shows nothing; still spend a frame
        // delay so the loop never spins.
        if outcome == PlayOutcome::Completed && presented == 0 {
            log::debug!("Nothing presented for {:?}", transition.clips);
            stage.pacer.wait(self.frame_delay);
            if stage.cancel.is_cancelled() {
                outcome = PlayOutcome::Cancelled;
            }
        }

        self.state = transition.next;
        Ok(StepReport {
            transition,
            outcome,
            woke,
            presented,
        })
    }

    /// Step until the stage's cancel token is set. Returns `Ok` on a
    /// requested stop; frame and sink errors end the loop early.
    pub fn run(&mut self, stage: &mut Stage<'_>, wake: &Wake) -> Result<()> {
        log::info!("Engine running (wake policy: {:?})", self.policy);
        while !stage.cancel.is_cancelled() {
            if self.step(stage, wake)?.outcome == PlayOutcome::Cancelled {
                break;
            }
        }
        log::info!("Engine stopped in state {}", self.state.label());
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn with_state(mut self, state: BehaviorState) -> Self {
        self.state = state;
        self
    }
}
