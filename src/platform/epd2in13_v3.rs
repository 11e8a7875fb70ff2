use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::error::SinkError;
use crate::frames::MonoBitmap;
use crate::sink::{Color, Panel, RefreshMode};

/// Native (portrait) width in pixels.
pub const WIDTH: u32 = 122;
/// Native height in pixels.
pub const HEIGHT: u32 = 250;
/// RAM bytes per source line (122 bits rounded up).
const LINE_BYTES: usize = 16;
const FRAME_BYTES: usize = LINE_BYTES * HEIGHT as usize;

/// Give up on BUSY after this long.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);
const BUSY_POLL_MS: u32 = 10;
/// spidev's default transfer limit.
const SPI_CHUNK: usize = 4096;

mod cmd {
    pub const DRIVER_OUTPUT: u8 = 0x01;
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const TEMP_SENSOR: u8 = 0x18;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const UPDATE_CONTROL_1: u8 = 0x21;
    pub const UPDATE_CONTROL_2: u8 = 0x22;
    pub const WRITE_RAM_BW: u8 = 0x24;
    pub const WRITE_RAM_RED: u8 = 0x26;
    pub const BORDER: u8 = 0x3C;
    pub const RAM_X_RANGE: u8 = 0x44;
    pub const RAM_Y_RANGE: u8 = 0x45;
    pub const RAM_X_COUNTER: u8 = 0x4E;
    pub const RAM_Y_COUNTER: u8 = 0x4F;
}

/// Display update sequences (command 0x22 payloads).
const SEQ_FULL: u8 = 0xF7;
const SEQ_PARTIAL: u8 = 0xFF;

/// Waveshare 2.13" V3 e-paper (SSD1680 controller, 122x250, 1-bit).
///
/// Uses the controller's built-in waveforms for both full and partial
/// refresh. Frames are landscape 250x122 and are rotated into the panel's
/// portrait RAM layout before upload.
pub struct Epd2in13V3<SPI, BUSY, DC, RST, DELAY> {
    spi: SPI,
    busy: BUSY,
    dc: DC,
    rst: RST,
    delay: DELAY,
    mode: RefreshMode,
}

fn bus<E: core::fmt::Debug>(e: E) -> SinkError {
    SinkError::Bus(format!("{e:?}"))
}

impl<SPI, BUSY, DC, RST, DELAY> Epd2in13V3<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    pub fn new(spi: SPI, busy: BUSY, dc: DC, rst: RST, delay: DELAY) -> Self {
        Self {
            spi,
            busy,
            dc,
            rst,
            delay,
            mode: RefreshMode::Full,
        }
    }

    fn reset(&mut self) -> Result<(), SinkError> {
        self.rst.set_high().map_err(bus)?;
        self.delay.delay_ms(20);
        self.rst.set_low().map_err(bus)?;
        self.delay.delay_ms(2);
        self.rst.set_high().map_err(bus)?;
        self.delay.delay_ms(20);
        Ok(())
    }

    /// BUSY is high while the controller works.
    fn wait_busy(&mut self) -> Result<(), SinkError> {
        let mut waited = 0u32;
        while self.busy.is_high().map_err(bus)? {
            if Duration::from_millis(waited as u64) >= BUSY_TIMEOUT {
                return Err(SinkError::Busy(BUSY_TIMEOUT));
            }
            self.delay.delay_ms(BUSY_POLL_MS);
            waited += BUSY_POLL_MS;
        }
        Ok(())
    }

    fn command(&mut self, c: u8) -> Result<(), SinkError> {
        self.dc.set_low().map_err(bus)?;
        self.spi.write(&[c]).map_err(bus)
    }

    fn data(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.dc.set_high().map_err(bus)?;
        for chunk in bytes.chunks(SPI_CHUNK) {
            self.spi.write(chunk).map_err(bus)?;
        }
        Ok(())
    }

    fn command_with(&mut self, c: u8, bytes: &[u8]) -> Result<(), SinkError> {
        self.command(c)?;
        self.data(bytes)
    }

    fn set_window(&mut self, x0: u32, y0: u32, x1: u32, y1: u32) -> Result<(), SinkError> {
        self.command_with(cmd::RAM_X_RANGE, &[(x0 >> 3) as u8, (x1 >> 3) as u8])?;
        self.command_with(
            cmd::RAM_Y_RANGE,
            &[y0 as u8, (y0 >> 8) as u8, y1 as u8, (y1 >> 8) as u8],
        )
    }

    fn set_cursor(&mut self, x: u32, y: u32) -> Result<(), SinkError> {
        self.command_with(cmd::RAM_X_COUNTER, &[(x >> 3) as u8])?;
        self.command_with(cmd::RAM_Y_COUNTER, &[y as u8, (y >> 8) as u8])
    }

    fn setup_ram(&mut self) -> Result<(), SinkError> {
        self.command_with(cmd::DRIVER_OUTPUT, &[((HEIGHT - 1) & 0xFF) as u8, ((HEIGHT - 1) >> 8) as u8, 0x00])?;
        self.command_with(cmd::DATA_ENTRY_MODE, &[0x03])?;
        self.set_window(0, 0, WIDTH - 1, HEIGHT - 1)?;
        self.set_cursor(0, 0)
    }

    fn update(&mut self, sequence: u8) -> Result<(), SinkError> {
        self.command_with(cmd::UPDATE_CONTROL_2, &[sequence])?;
        self.command(cmd::MASTER_ACTIVATION)?;
        self.wait_busy()
    }

    /// Panel RAM image for `bitmap`: landscape frames are rotated, portrait
    /// frames pass through.
    fn frame_bytes(bitmap: &MonoBitmap) -> Result<Vec<u8>, SinkError> {
        let portrait = match (bitmap.width(), bitmap.height()) {
            (HEIGHT, WIDTH) => bitmap.rotated_ccw(),
            (WIDTH, HEIGHT) => bitmap.clone(),
            (w, h) => {
                return Err(SinkError::Geometry {
                    got_w: w,
                    got_h: h,
                    want_w: HEIGHT,
                    want_h: WIDTH,
                })
            }
        };
        debug_assert_eq!(portrait.as_bytes().len(), FRAME_BYTES);
        Ok(portrait.as_bytes().to_vec())
    }
}

impl<SPI, BUSY, DC, RST, DELAY> Panel for Epd2in13V3<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    fn init(&mut self, mode: RefreshMode) -> Result<(), SinkError> {
        self.mode = mode;
        if mode == RefreshMode::Partial {
            // Partial setup happens per frame, after a short reset.
            return Ok(());
        }
        self.reset()?;
        self.wait_busy()?;
        self.command(cmd::SW_RESET)?;
        self.wait_busy()?;
        self.setup_ram()?;
        self.command_with(cmd::BORDER, &[0x05])?;
        self.command_with(cmd::UPDATE_CONTROL_1, &[0x00, 0x80])?;
        // Internal temperature sensor.
        self.command_with(cmd::TEMP_SENSOR, &[0x80])?;
        self.wait_busy()
    }

    fn clear(&mut self, color: Color) -> Result<(), SinkError> {
        self.command_with(cmd::WRITE_RAM_BW, &[color.fill_byte(); FRAME_BYTES])?;
        self.update(SEQ_FULL)
    }

    fn set_base(&mut self, bitmap: &MonoBitmap) -> Result<(), SinkError> {
        let bytes = Self::frame_bytes(bitmap)?;
        self.command_with(cmd::WRITE_RAM_BW, &bytes)?;
        self.command_with(cmd::WRITE_RAM_RED, &bytes)?;
        self.update(SEQ_FULL)
    }

    fn display_full(&mut self, bitmap: &MonoBitmap) -> Result<(), SinkError> {
        let bytes = Self::frame_bytes(bitmap)?;
        self.command_with(cmd::WRITE_RAM_BW, &bytes)?;
        self.update(SEQ_FULL)
    }

    fn display_partial(&mut self, bitmap: &MonoBitmap) -> Result<(), SinkError> {
        if self.mode != RefreshMode::Partial {
            return self.display_full(bitmap);
        }
        let bytes = Self::frame_bytes(bitmap)?;
        self.rst.set_low().map_err(bus)?;
        self.delay.delay_ms(1);
        self.rst.set_high().map_err(bus)?;
        self.command_with(cmd::BORDER, &[0x80])?;
        self.setup_ram()?;
        self.command_with(cmd::WRITE_RAM_BW, &bytes)?;
        self.update(SEQ_PARTIAL)
    }

    fn sleep(&mut self) -> Result<(), SinkError> {
        self.command_with(cmd::DEEP_SLEEP, &[0x01])?;
        self.delay.delay_ms(100);
        Ok(())
    }

    fn supports_partial(&self) -> bool {
        true
    }
}
