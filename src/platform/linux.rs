use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, I2cdev, SpidevDevice, SysfsPin};

use super::epd2in13_v3::Epd2in13V3;
use super::gt1151::Gt1151;
use crate::error::{SensorError, SinkError};

const SPI_PATH: &str = "/dev/spidev0.0";
const SPI_SPEED_HZ: u32 = 4_000_000;
const I2C_PATH: &str = "/dev/i2c-1";

// BCM pin numbers.
const EPD_RST: u64 = 17;
const EPD_DC: u64 = 25;
const EPD_BUSY: u64 = 24;
const TP_RST: u64 = 22;
const TP_INT: u64 = 27;

/// The Waveshare 2.13" Touch e-Paper HAT as wired on a Raspberry Pi.
pub type HatPanel = Epd2in13V3<SpidevDevice, SysfsPin, SysfsPin, SysfsPin, Delay>;
pub type HatTouch = Gt1151<I2cdev, SysfsPin, SysfsPin, Delay>;

fn pin(number: u64, direction: Direction) -> Result<SysfsPin, String> {
    let pin = SysfsPin::new(number);
    pin.0
        .export()
        .map_err(|e| format!("export gpio{number}: {e:?}"))?;
    pin.0
        .set_direction(direction)
        .map_err(|e| format!("gpio{number} direction: {e:?}"))?;
    Ok(pin)
}

pub fn open_panel() -> Result<HatPanel, SinkError> {
    let mut spi = SpidevDevice::open(SPI_PATH)
        .map_err(|e| SinkError::Bus(format!("{SPI_PATH}: {e:?}")))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(SPI_SPEED_HZ)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.0
        .configure(&options)
        .map_err(|e| SinkError::Bus(format!("{SPI_PATH}: {e}")))?;

    let busy = pin(EPD_BUSY, Direction::In).map_err(SinkError::Bus)?;
    let dc = pin(EPD_DC, Direction::Out).map_err(SinkError::Bus)?;
    let rst = pin(EPD_RST, Direction::Out).map_err(SinkError::Bus)?;

    log::info!("Opened e-paper panel on {SPI_PATH}");
    Ok(Epd2in13V3::new(spi, busy, dc, rst, Delay))
}

pub fn open_touch() -> Result<HatTouch, SensorError> {
    let i2c = I2cdev::new(I2C_PATH).map_err(|e| SensorError::Bus(format!("{I2C_PATH}: {e}")))?;
    let int = pin(TP_INT, Direction::In).map_err(SensorError::Bus)?;
    let rst = pin(TP_RST, Direction::Out).map_err(SensorError::Bus)?;
    Ok(Gt1151::new(i2c, int, rst, Delay))
}
