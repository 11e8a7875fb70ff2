pub mod behavior;
pub mod catalog;
pub mod engine;
pub mod player;

pub use behavior::{BehaviorState, IdleChoice, IdleChooser};
pub use catalog::{clips, ClipCatalog, ClipSpec};
pub use engine::{Engine, StepReport, WakePolicy};
pub use player::{play_clip, PlayOutcome, Stage};
