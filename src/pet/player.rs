use std::time::Duration;

use super::catalog::ClipSpec;
use crate::error::Result;
use crate::frames::FrameSource;
use crate::sink::{Frame, FrameSink};
use crate::util::{CancelToken, Pacer};

/// Everything a clip needs to reach the screen.
pub struct Stage<'a> {
    pub frames: &'a dyn FrameSource,
    pub sink: &'a mut dyn FrameSink,
    pub pacer: &'a mut dyn Pacer,
    pub cancel: &'a CancelToken,
}

/// How a clip play ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Every pass was presented.
    Completed,
    /// The interrupt check fired between passes; remaining passes skipped.
    Interrupted,
    /// Stop requested; observed after a frame delay.
    Cancelled,
}

/// Present a clip: `repeats` whole passes over `0..frame_count`, with the
/// frame delay after every presentation.
///
/// `interrupt` is asked between passes, never mid-pass, so the pass in
/// flight always finishes.
pub fn play_clip(
    spec: &ClipSpec,
    frame_delay: Duration,
    stage: &mut Stage<'_>,
    interrupt: &dyn Fn() -> bool,
) -> Result<PlayOutcome> {
    let passes = spec.repeats(frame_delay);
    log::debug!(
        "Playing '{}': {} pass(es) x {} frames",
        spec.name,
        passes,
        spec.frame_count
    );

    for pass in 0..passes {
        for index in 0..spec.frame_count {
            let bitmap = stage.frames.load_frame(&spec.name, index)?;
            stage.sink.present(Frame {
                clip: &spec.name,
                index,
                bitmap: &bitmap,
            })?;
            stage.pacer.wait(frame_delay);
            if stage.cancel.is_cancelled() {
                return Ok(PlayOutcome::Cancelled);
            }
        }
        if pass + 1 < passes && interrupt() {
            log::debug!("'{}' interrupted after pass {}/{}", spec.name, pass + 1, passes);
            return Ok(PlayOutcome::Interrupted);
        }
    }
    Ok(PlayOutcome::Completed)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{Error, SinkError};
    use crate::frames::MonoBitmap;
    use std::cell::Cell;

    pub(crate) const DELAY: Duration = Duration::from_millis(500);

    /// Blank frames for any clip with fewer than `max_frames` frames.
    pub(crate) struct BlankFrames {
        pub max_frames: u32,
    }

    impl FrameSource for BlankFrames {
        fn load_frame(&self, clip: &str, index: u32) -> Result<MonoBitmap> {
            if index >= self.max_frames {
                return Err(Error::AssetMissing {
                    clip: clip.to_owned(),
                    index,
                    path: format!("{clip}/frame_{index}.png").into(),
                });
            }
            Ok(MonoBitmap::blank(16, 8))
        }
    }

    /// Records every presentation; can run a hook after the n-th one.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub shown: Vec<(String, u32)>,
        pub fail_at: Option<usize>,
        pub hook_at: Option<usize>,
        pub hook: Option<Box<dyn FnMut()>>,
    }

    impl RecordingSink {
        pub(crate) fn clips(&self) -> Vec<&str> {
            let mut out: Vec<&str> = Vec::new();
            for (clip, index) in &self.shown {
                if *index == 0 && out.last() != Some(&clip.as_str()) {
                    out.push(clip);
                }
            }
            out
        }

        pub(crate) fn count(&self, clip: &str) -> usize {
            self.shown.iter().filter(|(c, _)| c == clip).count()
        }
    }

    impl FrameSink for RecordingSink {
        fn present(&mut self, frame: Frame<'_>) -> std::result::Result<(), SinkError> {
            if self.fail_at == Some(self.shown.len()) {
                return Err(SinkError::Bus("write failed".into()));
            }
            self.shown.push((frame.clip.to_owned(), frame.index));
            if self.hook_at == Some(self.shown.len()) {
                if let Some(hook) = self.hook.as_mut() {
                    hook();
                }
            }
            Ok(())
        }
    }

    /// Records waits instead of sleeping.
    #[derive(Default)]
    pub(crate) struct CountingPacer {
        pub waits: Vec<Duration>,
    }

    impl Pacer for CountingPacer {
        fn wait(&mut self, delay: Duration) {
            self.waits.push(delay);
        }
    }

    fn play(spec: &ClipSpec, sink: &mut RecordingSink, pacer: &mut CountingPacer) -> PlayOutcome {
        let frames = BlankFrames { max_frames: 100 };
        let cancel = CancelToken::new();
        let mut stage = Stage {
            frames: &frames,
            sink,
            pacer,
            cancel: &cancel,
        };
        play_clip(spec, DELAY, &mut stage, &|| false).unwrap()
    }

    #[test]
    fn once_clip_presents_each_frame_in_order() {
        let mut sink = RecordingSink::default();
        let mut pacer = CountingPacer::default();
        let out = play(&ClipSpec::once("idle_to_sleep", 8), &mut sink, &mut pacer);

        assert_eq!(out, PlayOutcome::Completed);
        let indices: Vec<u32> = sink.shown.iter().map(|(_, i)| *i).collect();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
        // Delay after every presentation, including the last.
        assert_eq!(pacer.waits, vec![DELAY; 8]);
    }

    #[test]
    fn looping_clip_plays_whole_passes() {
        let mut sink = RecordingSink::default();
        let mut pacer = CountingPacer::default();
        play(&ClipSpec::looping("idle", 5, 10.0), &mut sink, &mut pacer);

        assert_eq!(sink.shown.len(), 20);
        for (n, (clip, index)) in sink.shown.iter().enumerate() {
            assert_eq!(clip, "idle");
            assert_eq!(*index, n as u32 % 5);
        }
        assert_eq!(pacer.waits.len(), 20);
    }

    #[test]
    fn zero_pass_clip_presents_nothing() {
        let mut sink = RecordingSink::default();
        let mut pacer = CountingPacer::default();
        let out = play(&ClipSpec::looping("walking_positive", 8, 1.0), &mut sink, &mut pacer);

        assert_eq!(out, PlayOutcome::Completed);
        assert!(sink.shown.is_empty());
        assert!(pacer.waits.is_empty());
    }

    #[test]
    fn interrupt_is_checked_between_passes_only() {
        let frames = BlankFrames { max_frames: 100 };
        let cancel = CancelToken::new();
        let mut sink = RecordingSink::default();
        let mut pacer = CountingPacer::default();
        let checks = Cell::new(0);
        let mut stage = Stage {
            frames: &frames,
            sink: &mut sink,
            pacer: &mut pacer,
            cancel: &cancel,
        };
        let out = play_clip(&ClipSpec::looping("sleep", 3, 40.0), DELAY, &mut stage, &|| {
            checks.set(checks.get() + 1);
            checks.get() == 2
        })
        .unwrap();

        assert_eq!(out, PlayOutcome::Interrupted);
        // Two full passes, never a partial one.
        assert_eq!(sink.shown.len(), 6);
        assert_eq!(checks.get(), 2);
    }

    #[test]
    fn cancel_is_seen_after_the_frame_delay() {
        let frames = BlankFrames { max_frames: 100 };
        let cancel = CancelToken::new();
        let in_hook = cancel.clone();
        let mut sink = RecordingSink {
            hook_at: Some(3),
            hook: Some(Box::new(move || in_hook.cancel())),
            ..Default::default()
        };
        let mut pacer = CountingPacer::default();
        let mut stage = Stage {
            frames: &frames,
            sink: &mut sink,
            pacer: &mut pacer,
            cancel: &cancel,
        };
        let out = play_clip(&ClipSpec::looping("idle", 5, 20.0), DELAY, &mut stage, &|| false)
            .unwrap();

        assert_eq!(out, PlayOutcome::Cancelled);
        assert_eq!(sink.shown.len(), 3);
        assert_eq!(pacer.waits.len(), 3);
    }

    #[test]
    fn sink_failure_aborts_the_clip() {
        let frames = BlankFrames { max_frames: 100 };
        let cancel = CancelToken::new();
        let mut sink = RecordingSink {
            fail_at: Some(2),
            ..Default::default()
        };
        let mut pacer = CountingPacer::default();
        let mut stage = Stage {
            frames: &frames,
            sink: &mut sink,
            pacer: &mut pacer,
            cancel: &cancel,
        };
        let err = play_clip(&ClipSpec::once("idle_to_sleep", 8), DELAY, &mut stage, &|| false)
            .unwrap_err();

        assert!(matches!(err, Error::Sink(SinkError::Bus(_))));
        assert_eq!(sink.shown.len(), 2);
    }

    #[test]
    fn missing_frame_aborts_the_clip() {
        let frames = BlankFrames { max_frames: 4 };
        let cancel = CancelToken::new();
        let mut sink = RecordingSink::default();
        let mut pacer = CountingPacer::default();
        let mut stage = Stage {
            frames: &frames,
            sink: &mut sink,
            pacer: &mut pacer,
            cancel: &cancel,
        };
        let err = play_clip(&ClipSpec::once("sleep_to_idle", 8), DELAY, &mut stage, &|| false)
            .unwrap_err();

        assert!(matches!(err, Error::AssetMissing { index: 4, .. }));
        assert_eq!(sink.shown.len(), 4);
    }
}
