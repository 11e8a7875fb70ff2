use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::CatalogError;

/// Clip names the behavior policy plays.
pub mod clips {
    pub const IDLE: &str = "idle";
    pub const IDLE_TO_SLEEP: &str = "idle_to_sleep";
    pub const SLEEP: &str = "sleep";
    pub const SLEEP_TO_IDLE: &str = "sleep_to_idle";
    pub const WALKING_POSITIVE: &str = "walking_positive";
    pub const WALKING_NEGATIVE: &str = "walking_negative";
}

/// One named animation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSpec {
    pub name: String,
    pub frame_count: u32,
    /// `None`: play the frames once. `Some(d)`: loop whole passes to cover `d`.
    pub duration: Option<Duration>,
}

impl ClipSpec {
    pub fn once(name: impl Into<String>, frame_count: u32) -> Self {
        Self {
            name: name.into(),
            frame_count,
            duration: None,
        }
    }

    pub fn looping(name: impl Into<String>, frame_count: u32, seconds: f64) -> Self {
        Self {
            name: name.into(),
            frame_count,
            duration: Some(Duration::from_secs_f64(seconds)),
        }
    }

    /// Number of full passes at `frame_delay`.
    ///
    /// `floor(duration / (frame_delay * frame_count))`, which may be 0: a clip
    /// too short for one pass is skipped entirely.
    pub fn repeats(&self, frame_delay: Duration) -> u32 {
        match self.duration {
            None => 1,
            Some(d) => {
                let pass = frame_delay.as_secs_f64() * self.frame_count as f64;
                (d.as_secs_f64() / pass).floor() as u32
            }
        }
    }

    /// Total frame presentations for one play of this clip.
    pub fn presentations(&self, frame_delay: Duration) -> u64 {
        self.repeats(frame_delay) as u64 * self.frame_count as u64
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.frame_count == 0 {
            return Err(CatalogError::NoFrames(self.name.clone()));
        }
        if self.duration.is_some_and(|d| d.is_zero()) {
            return Err(CatalogError::BadDuration(self.name.clone()));
        }
        Ok(())
    }
}

/// Immutable clip table, validated once at construction.
#[derive(Debug, Clone)]
pub struct ClipCatalog {
    clips: BTreeMap<String, ClipSpec>,
}

impl ClipCatalog {
    pub const REQUIRED: [&'static str; 6] = [
        clips::IDLE,
        clips::IDLE_TO_SLEEP,
        clips::SLEEP,
        clips::SLEEP_TO_IDLE,
        clips::WALKING_POSITIVE,
        clips::WALKING_NEGATIVE,
    ];

    pub fn new(specs: Vec<ClipSpec>) -> Result<Self, CatalogError> {
        let mut clips = BTreeMap::new();
        for spec in specs {
            spec.validate()?;
            if clips.contains_key(&spec.name) {
                return Err(CatalogError::Duplicate(spec.name));
            }
            clips.insert(spec.name.clone(), spec);
        }
        for name in Self::REQUIRED {
            if !clips.contains_key(name) {
                return Err(CatalogError::MissingClip(name));
            }
        }
        Ok(Self { clips })
    }

    pub fn get(&self, name: &str) -> Option<&ClipSpec> {
        self.clips.get(name)
    }

    /// Lookup for one of [`Self::REQUIRED`]; their presence is checked in `new`.
    pub(crate) fn required(&self, name: &'static str) -> &ClipSpec {
        match self.get(name) {
            Some(spec) => spec,
            None => unreachable!("required clip `{name}` missing from catalog"),
        }
    }

    pub fn clips(&self) -> impl Iterator<Item = &ClipSpec> {
        self.clips.values()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }
}

impl Default for ClipCatalog {
    /// The shipped cat animations.
    fn default() -> Self {
        Self {
            clips: [
                ClipSpec::looping(clips::IDLE, 5, 20.0),
                ClipSpec::once(clips::IDLE_TO_SLEEP, 8),
                ClipSpec::looping(clips::SLEEP, 3, 40.0),
                ClipSpec::once(clips::SLEEP_TO_IDLE, 8),
                ClipSpec::looping(clips::WALKING_POSITIVE, 8, 10.0),
                ClipSpec::looping(clips::WALKING_NEGATIVE, 8, 10.0),
            ]
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect(),
        }
    }
}
