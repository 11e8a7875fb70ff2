use super::{Frame, FrameSink};
use crate::error::SinkError;
use crate::frames::MonoBitmap;

/// Panel fill color for `clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Byte value for 8 packed pixels.
    pub fn fill_byte(self) -> u8 {
        match self {
            Color::White => 0xFF,
            Color::Black => 0x00,
        }
    }
}

/// Waveform set the controller is initialised with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    Full,
    Partial,
}

/// Bistable display driver contract.
pub trait Panel {
    fn init(&mut self, mode: RefreshMode) -> Result<(), SinkError>;
    fn clear(&mut self, color: Color) -> Result<(), SinkError>;
    /// Show `bitmap` with a full refresh and keep it as the reference
    /// partial refreshes are diffed against.
    fn set_base(&mut self, bitmap: &MonoBitmap) -> Result<(), SinkError>;
    fn display_full(&mut self, bitmap: &MonoBitmap) -> Result<(), SinkError>;
    fn display_partial(&mut self, bitmap: &MonoBitmap) -> Result<(), SinkError>;
    /// Deep sleep. The panel keeps its image without power.
    fn sleep(&mut self) -> Result<(), SinkError>;

    fn supports_partial(&self) -> bool {
        false
    }
}

/// Presents engine frames on a [`Panel`].
///
/// The first frame of a session goes out once as the full-refresh partial
/// base; the rest use partial refresh when the panel has it.
pub struct PanelSink<P> {
    panel: P,
    primed: bool,
    presented: u64,
}

impl<P: Panel> PanelSink<P> {
    pub fn new(panel: P) -> Self {
        Self {
            panel,
            primed: false,
            presented: 0,
        }
    }

    /// Bring the panel up blank.
    pub fn start(&mut self) -> Result<(), SinkError> {
        self.panel.init(RefreshMode::Full)?;
        self.panel.clear(Color::White)?;
        self.primed = false;
        log::info!("Panel initialised (partial refresh: {})", self.panel.supports_partial());
        Ok(())
    }

    /// Leave the panel blank and powered down.
    pub fn shutdown(&mut self) -> Result<(), SinkError> {
        self.panel.init(RefreshMode::Full)?;
        self.panel.clear(Color::White)?;
        self.panel.sleep()?;
        self.primed = false;
        log::info!("Panel cleared and asleep after {} frames", self.presented);
        Ok(())
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }
}

impl<P: Panel> FrameSink for PanelSink<P> {
    fn present(&mut self, frame: Frame<'_>) -> Result<(), SinkError> {
        if !self.panel.supports_partial() {
            self.panel.display_full(frame.bitmap)?;
        } else if !self.primed {
            self.panel.set_base(frame.bitmap)?;
            self.panel.init(RefreshMode::Partial)?;
            self.primed = true;
        } else {
            self.panel.display_partial(frame.bitmap)?;
        }
        self.presented += 1;
        log::trace!("{} #{} on panel", frame.clip, frame.index);
        Ok(())
    }
}
