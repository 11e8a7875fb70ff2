use super::catalog::clips;

/// The pet's control state. The engine's only mutable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BehaviorState {
    #[default]
    Idle,
    WalkingPositive,
    WalkingNegative,
    Sleeping,
}

impl BehaviorState {
    pub fn label(self) -> &'static str {
        match self {
            BehaviorState::Idle => "Idle",
            BehaviorState::WalkingPositive => "WalkingPositive",
            BehaviorState::WalkingNegative => "WalkingNegative",
            BehaviorState::Sleeping => "Sleeping",
        }
    }
}

/// What an idle pet does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleChoice {
    WalkPositive,
    WalkNegative,
    Sleep,
    Idle,
}

impl IdleChoice {
    pub const ALL: [IdleChoice; 4] = [
        IdleChoice::WalkPositive,
        IdleChoice::WalkNegative,
        IdleChoice::Sleep,
        IdleChoice::Idle,
    ];
}

/// Source of idle decisions. Injected so tests can script or seed it.
pub trait IdleChooser {
    fn choose(&mut self) -> IdleChoice;
}

/// Uniform over the four choices.
impl IdleChooser for fastrand::Rng {
    fn choose(&mut self) -> IdleChoice {
        IdleChoice::ALL[self.usize(0..IdleChoice::ALL.len())]
    }
}

/// Outcome of one decision point: clips to play back to back, then the state
/// the pet is in once they finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub clips: &'static [&'static str],
    pub next: BehaviorState,
}

impl Transition {
    const fn new(clips: &'static [&'static str], next: BehaviorState) -> Self {
        Self { clips, next }
    }

    /// True when this transition puts an awake pet to sleep.
    pub fn falls_asleep(&self, from: BehaviorState) -> bool {
        from != BehaviorState::Sleeping && self.next == BehaviorState::Sleeping
    }
}

/// Pick the next clip(s) and state.
///
/// The chooser is consulted only from `Idle`; every other edge is fixed.
/// `wake_pending` only matters while sleeping.
pub fn decide<C: IdleChooser + ?Sized>(
    state: BehaviorState,
    wake_pending: bool,
    chooser: &mut C,
) -> Transition {
    match state {
        BehaviorState::Sleeping if wake_pending => {
            Transition::new(&[clips::SLEEP_TO_IDLE], BehaviorState::Idle)
        }
        BehaviorState::Sleeping => Transition::new(&[clips::SLEEP], BehaviorState::Sleeping),
        BehaviorState::WalkingPositive | BehaviorState::WalkingNegative => {
            Transition::new(&[clips::IDLE], BehaviorState::Idle)
        }
        BehaviorState::Idle => match chooser.choose() {
            IdleChoice::WalkPositive => Transition::new(
                &[clips::WALKING_POSITIVE],
                BehaviorState::WalkingPositive,
            ),
            IdleChoice::WalkNegative => Transition::new(
                &[clips::WALKING_NEGATIVE],
                BehaviorState::WalkingNegative,
            ),
            IdleChoice::Sleep => Transition::new(
                &[clips::IDLE_TO_SLEEP, clips::SLEEP],
                BehaviorState::Sleeping,
            ),
            IdleChoice::Idle => Transition::new(&[clips::IDLE], BehaviorState::Idle),
        },
    }
}
