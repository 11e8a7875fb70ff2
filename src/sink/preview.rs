use winit::event_loop::EventLoopProxy;

use super::{Frame, FrameSink};
use crate::error::SinkError;
use crate::frames::MonoBitmap;

/// Messages from the engine thread to the preview window.
#[derive(Debug)]
pub enum PreviewEvent {
    Frame(MonoBitmap),
    /// The engine loop has returned; close the window.
    Stopped,
}

/// Mirrors frames into the preview window through its event loop.
pub struct PreviewSink {
    proxy: EventLoopProxy<PreviewEvent>,
}

impl PreviewSink {
    pub fn new(proxy: EventLoopProxy<PreviewEvent>) -> Self {
        Self { proxy }
    }

    /// Tell the window the engine is done. Ignored if it is already gone.
    pub fn finish(&self) {
        let _ = self.proxy.send_event(PreviewEvent::Stopped);
    }
}

impl FrameSink for PreviewSink {
    fn present(&mut self, frame: Frame<'_>) -> Result<(), SinkError> {
        self.proxy
            .send_event(PreviewEvent::Frame(frame.bitmap.clone()))
            .map_err(|_| SinkError::Closed)
    }
}
