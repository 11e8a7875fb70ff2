pub mod panel;
pub mod preview;

pub use panel::{Color, Panel, PanelSink, RefreshMode};
pub use preview::{PreviewEvent, PreviewSink};

use crate::error::SinkError;
use crate::frames::MonoBitmap;

/// A frame on its way to a display.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub clip: &'a str,
    pub index: u32,
    pub bitmap: &'a MonoBitmap,
}

/// Anything that can show a frame: the e-paper panel or the preview window.
pub trait FrameSink {
    fn present(&mut self, frame: Frame<'_>) -> Result<(), SinkError>;
}

impl<T: FrameSink + ?Sized> FrameSink for &mut T {
    fn present(&mut self, frame: Frame<'_>) -> Result<(), SinkError> {
        (**self).present(frame)
    }
}
